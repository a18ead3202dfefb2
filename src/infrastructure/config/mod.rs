use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::error::{AppError, Result};
use crate::domain::session::UserRole;
use crate::domain::tabular::ImportConfig;

/// Default config file looked up in the working directory
pub const CONFIG_FILE: &str = "rfpmatch.toml";

/// Prefix for environment overrides, e.g. `RFPMATCH_SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "RFPMATCH_";

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    #[validate(range(min = 1))]
    pub port: u16,
    /// Transport ceiling on request bodies
    #[validate(range(min = 1))]
    pub max_upload_bytes: usize,
    /// Dashboard origin allowed by CORS; any origin when unset
    pub allowed_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_upload_bytes: 12 * 1024 * 1024,
            allowed_origin: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory receiving a copy of every generated export
    pub archive_dir: Option<PathBuf>,
    #[validate(length(min = 1))]
    pub inventory_base_name: String,
    #[validate(length(min = 1))]
    pub matches_base_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            archive_dir: None,
            inventory_base_name: "estoque".to_string(),
            matches_base_name: "sugestoes".to_string(),
        }
    }
}

/// A token accepted by the static session provider
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SessionSeed {
    #[validate(length(min = 8))]
    pub token: String,
    pub user_id: String,
    pub email: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub import: ImportConfig,
    pub export: ExportConfig,
    pub log_filter: String,
    pub sessions: Vec<SessionSeed>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            import: ImportConfig::default(),
            export: ExportConfig::default(),
            log_filter: "info".to_string(),
            sessions: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Defaults, then `rfpmatch.toml`, then `RFPMATCH_*` environment variables
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_figment(Self::figment(Path::new(CONFIG_FILE)))
    }

    pub fn figment(config_file: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: AppConfig = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.server
            .validate()
            .map_err(|e| AppError::ConfigError(format!("Invalid server config: {}", e)))?;
        self.import
            .validate()
            .map_err(|e| AppError::ConfigError(format!("Invalid import config: {}", e)))?;
        self.import
            .delimiter_byte()
            .map_err(|e| AppError::ConfigError(format!("Invalid import config: {}", e)))?;
        self.export
            .validate()
            .map_err(|e| AppError::ConfigError(format!("Invalid export config: {}", e)))?;
        for seed in &self.sessions {
            seed.validate().map_err(|e| {
                AppError::ConfigError(format!("Invalid session for {}: {}", seed.user_id, e))
            })?;
        }
        Ok(())
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}
