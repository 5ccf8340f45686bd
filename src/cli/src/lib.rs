//! Initializes a Lightning node wallet and backs up its seed.

pub mod api;
pub mod commands;
pub mod config;
pub mod errors;
pub mod interactive;
pub mod report;
#[cfg(unix)]
pub mod terminal;

// Re-export commonly used types and functions
pub use commands::init_wallet::{self, InitOutcome, InitPath};
pub use config::InitConfig;
pub use errors::WalletError;
pub use report::Reporter;
