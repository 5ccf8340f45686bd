//! Core primitives for the wallet initializer.
//!
//! This crate provides the request and response types exchanged with a node's
//! administrative API, and the seed backup record written to disk once a
//! wallet has been created.

pub mod backup;
pub mod errors;
pub mod types;

// Re-export commonly used types
pub use backup::{BackupContents, SeedBackupRecord};
pub use errors::CoreError;
pub use types::{Mnemonic, Network, Password, WalletInitRequest, WalletInitResult};
