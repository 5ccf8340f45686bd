//! Core types for the wallet initializer.

use crate::errors::CoreError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

/// A wallet password held in memory that is wiped on drop.
pub type Password = Zeroizing<String>;

/// Recovery window sent when generating a fresh seed.
pub const DEFAULT_RECOVERY_WINDOW: u32 = 0;

/// The chain network the node runs on, as understood by `lncli --network`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Bitcoin mainnet
    Mainnet,
    /// Bitcoin testnet
    #[default]
    Testnet,
    /// Local regression test network
    Regtest,
    /// btcd simulation network
    Simnet,
    /// Bitcoin signet
    Signet,
}

impl Network {
    /// Returns the label used on the command line and in backup files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Regtest => "regtest",
            Network::Simnet => "simnet",
            Network::Signet => "signet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            "regtest" => Ok(Network::Regtest),
            "simnet" => Ok(Network::Simnet),
            "signet" => Ok(Network::Signet),
            other => Err(CoreError::UnknownNetwork(other.to_string())),
        }
    }
}

/// An ordered list of recovery words.
///
/// The words are wiped from memory when the value is dropped.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "Vec<String>")]
pub struct Mnemonic(Zeroizing<Vec<String>>);

impl Mnemonic {
    /// Creates a mnemonic from its words, in order.
    pub fn new(words: Vec<String>) -> Self {
        Self(Zeroizing::new(words))
    }

    /// Gets the words of the mnemonic.
    pub fn words(&self) -> &[String] {
        &self.0
    }

    /// Returns the number of words.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no words.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Renders each word as a 1-indexed line, e.g. ` 1. abandon`.
    pub fn enumerated(&self) -> impl Iterator<Item = String> + '_ {
        self.0
            .iter()
            .enumerate()
            .map(|(i, word)| format!("{:2}. {}", i + 1, word))
    }
}

impl From<Vec<String>> for Mnemonic {
    fn from(words: Vec<String>) -> Self {
        Mnemonic::new(words)
    }
}

impl fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mnemonic({} words)", self.0.len())
    }
}

/// Request body for the node's `initwallet` endpoint.
///
/// Byte fields are base64 encoded on the wire, the way the REST gateway
/// expects them. Only the "generate a new seed" form can be built, so the
/// mnemonic is always empty.
#[derive(Serialize)]
pub struct WalletInitRequest {
    /// The password protecting the new wallet
    #[serde(serialize_with = "serialize_base64")]
    wallet_password: Password,
    /// Existing seed to restore from; empty when generating a fresh one
    cipher_seed_mnemonic: Vec<String>,
    /// Optional passphrase protecting the seed itself
    #[serde(serialize_with = "serialize_base64")]
    aezeed_passphrase: Password,
    /// Number of addresses to scan when restoring
    recovery_window: u32,
    /// Static channel backups to import; never sent by this tool
    channel_backups: Option<serde_json::Value>,
    /// Whether the node should hand the admin macaroon back instead of storing it
    stateless_init: bool,
}

impl WalletInitRequest {
    /// Builds a request that asks the node to generate a new seed.
    pub fn generate(password: Password) -> Self {
        Self {
            wallet_password: password,
            cipher_seed_mnemonic: Vec::new(),
            aezeed_passphrase: Password::new(String::new()),
            recovery_window: DEFAULT_RECOVERY_WINDOW,
            channel_backups: None,
            stateless_init: false,
        }
    }

    /// Sets the stateless-init flag.
    pub fn with_stateless_init(mut self, stateless_init: bool) -> Self {
        self.stateless_init = stateless_init;
        self
    }

    /// Returns true if this request asks for a freshly generated seed.
    pub fn is_generate(&self) -> bool {
        self.cipher_seed_mnemonic.is_empty()
    }
}

impl fmt::Debug for WalletInitRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletInitRequest")
            .field("wallet_password", &"<redacted>")
            .field("cipher_seed_mnemonic", &self.cipher_seed_mnemonic.len())
            .field("recovery_window", &self.recovery_window)
            .field("stateless_init", &self.stateless_init)
            .finish()
    }
}

fn serialize_base64<S>(value: &Password, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let encoded = Zeroizing::new(STANDARD.encode(value.as_bytes()));
    serializer.serialize_str(&encoded)
}

/// Successful response of the `initwallet` endpoint.
#[derive(Debug, Deserialize)]
pub struct WalletInitResult {
    /// The generated recovery words
    #[serde(default)]
    cipher_seed_mnemonic: Option<Mnemonic>,
}

impl WalletInitResult {
    /// Takes the mnemonic out of the response, failing if the node sent none.
    pub fn into_mnemonic(self) -> Result<Mnemonic, CoreError> {
        match self.cipher_seed_mnemonic {
            Some(mnemonic) if !mnemonic.is_empty() => Ok(mnemonic),
            _ => Err(CoreError::MissingMnemonic),
        }
    }
}
