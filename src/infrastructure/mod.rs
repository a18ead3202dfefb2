pub mod config;
pub mod session;
pub mod storage;
pub mod store;
pub mod tabular;
