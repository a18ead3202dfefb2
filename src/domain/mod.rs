pub mod error;
pub mod inventory;
pub mod rfp;
pub mod session;

// Import/export pipeline types
pub mod tabular;
