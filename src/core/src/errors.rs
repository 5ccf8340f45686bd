//! Error types for the core crate.

use thiserror::Error;

/// Errors that can occur in the core crate.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Error when a network label is not recognized.
    #[error("Unknown network: {0} (expected mainnet, testnet, regtest, simnet or signet)")]
    UnknownNetwork(String),

    /// Error when the node answers without any recovery words.
    #[error("Response did not contain a cipher seed mnemonic")]
    MissingMnemonic,

    /// Error when the backup file cannot be written.
    #[error("Failed to write backup file {path}: {source}")]
    BackupWrite {
        /// The path of the backup file
        path: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
