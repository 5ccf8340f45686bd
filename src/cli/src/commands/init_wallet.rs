//! Initialize wallet command.
//!
//! Tries the node's REST API first and falls back to driving `lncli create`.
//! Every path ends either with a written backup or with instructions for
//! creating the wallet by hand.

use crate::api::AdminClient;
use crate::config::InitConfig;
use crate::errors::WalletError;
use crate::interactive;
use crate::report::Reporter;
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};
use walletinit_core::{BackupContents, Password, SeedBackupRecord, WalletInitRequest};

/// Which path created the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitPath {
    /// The administrative REST API
    Api,
    /// The interactive command line client
    Interactive,
}

/// How a run ended.
#[derive(Debug)]
pub enum InitOutcome {
    /// The wallet was created and its seed backed up.
    Done {
        /// The path that created the wallet
        via: InitPath,
        /// Where the backup was written
        backup: PathBuf,
    },
    /// Nothing worked; the operator was told how to proceed by hand.
    ManualOnly {
        /// Why the last attempt failed
        reason: String,
    },
}

enum Stage {
    TryApi,
    TryInteractive,
    ManualOnly(String),
    Done(InitOutcome),
}

/// Runs the init-wallet command.
pub async fn run<W: Write>(
    config: &InitConfig,
    password: &Password,
    reporter: &mut Reporter<W>,
) -> Result<InitOutcome, WalletError> {
    let client = AdminClient::new(config)?;

    let mut stage = Stage::TryApi;
    loop {
        stage = match stage {
            Stage::TryApi => try_api(config, &client, password, reporter).await?,
            Stage::TryInteractive => try_interactive(config, password, reporter).await?,
            Stage::ManualOnly(reason) => {
                reporter.manual_instructions(&config.manual_command())?;
                return Ok(InitOutcome::ManualOnly { reason });
            }
            Stage::Done(outcome) => return Ok(outcome),
        };
    }
}

async fn try_api<W: Write>(
    config: &InitConfig,
    client: &AdminClient,
    password: &Password,
    reporter: &mut Reporter<W>,
) -> Result<Stage, WalletError> {
    reporter.progress("Creating LND wallet via API...")?;

    let request =
        WalletInitRequest::generate(password.clone()).with_stateless_init(config.stateless_init);
    let result = client.init_wallet(&request).await;
    drop(request);

    match result {
        Ok(mnemonic) => {
            info!("Wallet created through {}", client.endpoint());
            reporter.success("Wallet created successfully!")?;
            reporter.mnemonic(&mnemonic)?;

            let backup = persist(config, BackupContents::Mnemonic(mnemonic))?;
            reporter.backup_saved(&backup)?;
            Ok(Stage::Done(InitOutcome::Done {
                via: InitPath::Api,
                backup,
            }))
        }
        Err(e @ WalletError::HttpError { .. }) => {
            warn!("Wallet API refused the request: {}", e);
            reporter.failure(&e.to_string())?;
            reporter.progress("\nTrying alternative method...")?;
            Ok(Stage::TryInteractive)
        }
        Err(WalletError::TransportError(reason)) => {
            warn!("Wallet API unreachable: {}", reason);
            reporter.failure(&format!("Error: {}", reason))?;
            if config.fallback_on_transport_error {
                reporter.progress("\nTrying alternative method...")?;
                Ok(Stage::TryInteractive)
            } else {
                Ok(Stage::ManualOnly(
                    WalletError::TransportError(reason).to_string(),
                ))
            }
        }
        Err(e) => {
            warn!("Wallet API failed: {}", e);
            reporter.failure(&format!("Error: {}", e))?;
            Ok(Stage::ManualOnly(e.to_string()))
        }
    }
}

async fn try_interactive<W: Write>(
    config: &InitConfig,
    password: &Password,
    reporter: &mut Reporter<W>,
) -> Result<Stage, WalletError> {
    reporter.progress("Using interactive wallet creation...")?;

    match interactive::create_wallet(config, password).await {
        Ok(raw) => {
            info!("Wallet created through the interactive client");
            reporter.success("Wallet created successfully!")?;
            reporter.transcript(&raw)?;

            let backup = persist(config, BackupContents::Transcript(raw))?;
            reporter.backup_saved(&backup)?;
            Ok(Stage::Done(InitOutcome::Done {
                via: InitPath::Interactive,
                backup,
            }))
        }
        Err(e) => {
            warn!("Interactive wallet creation failed: {}", e);
            reporter.failure(&format!("Alternative method failed: {}", e))?;
            Ok(Stage::ManualOnly(e.to_string()))
        }
    }
}

fn persist(config: &InitConfig, contents: BackupContents) -> Result<PathBuf, WalletError> {
    let path = config.backup_path();
    SeedBackupRecord::new(config.network, contents).write_to(&path)?;
    Ok(path)
}
