//! Error types for the wallet initializer.

use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;
use walletinit_core::CoreError;

/// Errors that can occur while initializing a wallet.
#[derive(Debug)]
pub enum WalletError {
    /// Error when a file operation fails.
    FileError(std::io::Error),

    /// Error when JSON serialization or deserialization fails.
    JsonError(serde_json::Error),

    /// Error raised by the core types.
    CoreError(CoreError),

    /// Error when the configuration is invalid.
    ConfigError(String),

    /// Error when the administrative API answers with a non-success status.
    HttpError {
        /// The HTTP status code
        status: u16,
        /// The response body
        body: String,
    },

    /// Error when the administrative API cannot be reached at all.
    TransportError(String),

    /// Error when the administrative API answers with something unusable.
    InvalidResponse(String),

    /// Error when an expected prompt does not show up in time.
    PromptTimeout {
        /// The text that was expected
        prompt: String,
        /// How long we waited
        waited: Duration,
    },

    /// Error when the interactive program stops talking before a prompt.
    UnexpectedEof {
        /// The text that was expected
        prompt: String,
    },

    /// Error when the interactive program cannot be started.
    ProcessLaunch {
        /// The program we tried to run
        program: String,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// Error when the interactive program exits unsuccessfully.
    ProcessFailed(String),
}

impl fmt::Display for WalletError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletError::FileError(e) => write!(f, "File error: {}", e),
            WalletError::JsonError(e) => write!(f, "JSON error: {}", e),
            WalletError::CoreError(e) => write!(f, "{}", e),
            WalletError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            WalletError::HttpError { status, body } => {
                write!(f, "HTTP Error {}: {}", status, body)
            }
            WalletError::TransportError(msg) => write!(f, "Transport error: {}", msg),
            WalletError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            WalletError::PromptTimeout { prompt, waited } => write!(
                f,
                "Timeout after {:.1}s waiting for prompt {:?}",
                waited.as_secs_f64(),
                prompt
            ),
            WalletError::UnexpectedEof { prompt } => {
                write!(f, "Output ended while waiting for prompt {:?}", prompt)
            }
            WalletError::ProcessLaunch { program, source } => {
                write!(f, "Failed to start {}: {}", program, source)
            }
            WalletError::ProcessFailed(msg) => write!(f, "Process failed: {}", msg),
        }
    }
}

impl StdError for WalletError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            WalletError::FileError(e) => Some(e),
            WalletError::JsonError(e) => Some(e),
            WalletError::CoreError(e) => Some(e),
            WalletError::ProcessLaunch { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for WalletError {
    fn from(error: std::io::Error) -> Self {
        WalletError::FileError(error)
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(error: serde_json::Error) -> Self {
        WalletError::JsonError(error)
    }
}

impl From<CoreError> for WalletError {
    fn from(error: CoreError) -> Self {
        WalletError::CoreError(error)
    }
}
