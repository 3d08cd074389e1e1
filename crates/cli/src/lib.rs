//! ezballot-cli: operate an election ledger stored in a JSON file.

pub mod cli;
pub mod config;
pub mod store;

pub use config::AppConfig;
pub use store::LedgerStore;
