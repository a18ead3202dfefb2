pub mod use_cases;

pub use use_cases::access::AccessGuard;
pub use use_cases::exporter::Exporter;
pub use use_cases::importer::Importer;
pub use use_cases::inventory_import::{ImportReport, InventoryImport, RowIssue};
pub use use_cases::match_review::MatchReview;
