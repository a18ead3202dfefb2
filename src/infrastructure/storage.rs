use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::error::{AppError, Result};

/// A generated file ready to be handed to the user
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Host-side save mechanism for generated files
pub trait FileSink: Send + Sync {
    /// Persist or deliver the file, returning where it ended up
    fn save(&self, file: &ExportFile) -> Result<String>;
}

/// Writes export files into a fixed directory
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileSink for DirectorySink {
    fn save(&self, file: &ExportFile) -> Result<String> {
        ensure_dir(&self.root)?;
        let target = self.root.join(safe_file_name(&file.file_name)?);
        fs::write(&target, &file.bytes)?;
        Ok(target.display().to_string())
    }
}

fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Reject names that would escape the sink directory
fn safe_file_name(name: &str) -> Result<&str> {
    let is_plain = !name.is_empty()
        && !name.contains(['/', '\\'])
        && name != "."
        && name != "..";
    if is_plain {
        Ok(name)
    } else {
        Err(AppError::ValidationError(format!(
            "Invalid export file name: {}",
            name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_file(name: &str) -> ExportFile {
        ExportFile {
            file_name: name.to_string(),
            mime_type: "text/csv;charset=utf-8",
            bytes: b"A,B\n1,x\n".to_vec(),
        }
    }

    #[test]
    fn test_directory_sink_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path().join("exports"));

        let saved = sink.save(&sample_file("estoque-2024-05-01.csv")).unwrap();

        let written = fs::read(dir.path().join("exports/estoque-2024-05-01.csv")).unwrap();
        assert_eq!(written, b"A,B\n1,x\n");
        assert!(saved.ends_with("estoque-2024-05-01.csv"));
    }

    #[test]
    fn test_directory_sink_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());

        assert!(matches!(
            sink.save(&sample_file("../escape.csv")),
            Err(AppError::ValidationError(_))
        ));
    }
}
