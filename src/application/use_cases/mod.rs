pub mod access;
pub mod exporter;
pub mod importer;
pub mod inventory_import;
pub mod match_review;
