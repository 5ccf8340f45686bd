//! Configuration for the wallet initializer.

use crate::errors::WalletError;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs::File;
use std::io::Read;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use walletinit_core::{Network, Password};

/// Name of the seed backup file inside the output directory.
pub const BACKUP_FILE_NAME: &str = "wallet-seed-backup.txt";

/// Name of the interactive session log inside the output directory.
pub const TRANSCRIPT_FILE_NAME: &str = "wallet-creation.log";

/// Environment variable holding the wallet password.
pub const PASSWORD_ENV: &str = "WALLETINIT_PASSWORD";

/// Configuration for the wallet initializer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InitConfig {
    /// The `initwallet` endpoint of the node's REST API
    pub endpoint: String,
    /// The network the node runs on
    pub network: Network,
    /// Where the backup and the session log are written
    pub output_dir: PathBuf,
    /// Skip TLS certificate verification (loopback endpoints only)
    pub accept_invalid_certs: bool,
    /// PEM certificate to trust for the endpoint, e.g. the node's tls.cert
    pub tls_cert: Option<PathBuf>,
    /// Timeout for the API call, in seconds
    pub request_timeout_secs: u64,
    /// Also fall back to the interactive prompt when the API is unreachable
    pub fallback_on_transport_error: bool,
    /// Ask the node to return the admin macaroon instead of storing it
    pub stateless_init: bool,
    /// The command line client used for the interactive fallback
    pub lncli_path: String,
    /// Directories appended to PATH when looking up the command line client
    pub extra_search_dirs: Vec<PathBuf>,
    /// How long to wait for each prompt, in seconds
    pub prompt_timeout_secs: u64,
    /// How long to wait for the client to finish after the last prompt, in seconds
    pub completion_timeout_secs: u64,
}

impl Default for InitConfig {
    fn default() -> Self {
        let output_dir = {
            let mut dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
            dir.push("walletinit");
            dir
        };
        let extra_search_dirs = match dirs::home_dir() {
            Some(home) => vec![home.join("go").join("bin"), home.join("bin")],
            None => Vec::new(),
        };

        Self {
            endpoint: "https://localhost:8080/v1/initwallet".to_string(),
            network: Network::Testnet,
            output_dir,
            accept_invalid_certs: false,
            tls_cert: None,
            request_timeout_secs: 30,
            fallback_on_transport_error: false,
            stateless_init: false,
            lncli_path: "lncli".to_string(),
            extra_search_dirs,
            prompt_timeout_secs: 10,
            completion_timeout_secs: 30,
        }
    }
}

impl InitConfig {
    /// Loads configuration from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, WalletError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Saves configuration to a file.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), WalletError> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Checks the configuration and returns the parsed endpoint.
    ///
    /// Certificate verification may only be switched off for loopback hosts.
    pub fn validate(&self) -> Result<Url, WalletError> {
        let url = Url::parse(&self.endpoint).map_err(|e| {
            WalletError::ConfigError(format!("invalid endpoint {:?}: {}", self.endpoint, e))
        })?;

        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(WalletError::ConfigError(format!(
                "unsupported endpoint scheme {:?}",
                url.scheme()
            )));
        }

        let host = url.host_str().unwrap_or_default();
        if self.accept_invalid_certs && !is_loopback(host) {
            return Err(WalletError::ConfigError(format!(
                "refusing to skip certificate verification for non-loopback host {:?}",
                host
            )));
        }

        if self.prompt_timeout_secs == 0 || self.completion_timeout_secs == 0 {
            return Err(WalletError::ConfigError(
                "prompt timeouts must be greater than zero".to_string(),
            ));
        }

        Ok(url)
    }

    /// Path of the seed backup file.
    pub fn backup_path(&self) -> PathBuf {
        self.output_dir.join(BACKUP_FILE_NAME)
    }

    /// Path of the interactive session log.
    pub fn transcript_path(&self) -> PathBuf {
        self.output_dir.join(TRANSCRIPT_FILE_NAME)
    }

    /// Timeout for the API call.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Timeout for each interactive prompt.
    pub fn prompt_timeout(&self) -> Duration {
        Duration::from_secs(self.prompt_timeout_secs)
    }

    /// Timeout for the interactive client to finish.
    pub fn completion_timeout(&self) -> Duration {
        Duration::from_secs(self.completion_timeout_secs)
    }

    /// The inherited PATH followed by the extra search directories.
    pub fn search_path(&self) -> Result<OsString, WalletError> {
        let mut dirs: Vec<PathBuf> = std::env::var_os("PATH")
            .map(|path| std::env::split_paths(&path).collect())
            .unwrap_or_default();
        for dir in &self.extra_search_dirs {
            if !dirs.contains(dir) {
                dirs.push(dir.clone());
            }
        }

        std::env::join_paths(dirs)
            .map_err(|e| WalletError::ConfigError(format!("invalid search path: {}", e)))
    }

    /// Manual command the operator can run if everything else fails.
    pub fn manual_command(&self) -> String {
        format!("lncli --network={} create", self.network)
    }
}

/// Reads the wallet password from `password_file`, or from the environment.
///
/// A single trailing newline in the file is ignored.
pub fn load_password(password_file: Option<&Path>) -> Result<Password, WalletError> {
    if let Some(path) = password_file {
        let contents = Password::new(std::fs::read_to_string(path)?);
        let line = contents
            .strip_suffix('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .unwrap_or(contents.as_str());
        return Ok(Password::new(line.to_string()));
    }

    std::env::var(PASSWORD_ENV).map(Password::new).map_err(|_| {
        WalletError::ConfigError(format!(
            "no wallet password given; use --password-file or set {}",
            PASSWORD_ENV
        ))
    })
}

fn is_loopback(host: &str) -> bool {
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }

    host.trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .map(|ip| ip.is_loopback())
        .unwrap_or(false)
}
