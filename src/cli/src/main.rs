//! Initializes a Lightning node wallet and backs up its seed.

use anyhow::Result;
use std::path::PathBuf;
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use walletinit::config::load_password;
use walletinit::{init_wallet, InitConfig, InitOutcome, Reporter};
use walletinit_core::Network;

/// Command line arguments for the wallet initializer.
#[derive(Debug, StructOpt)]
#[structopt(name = "walletinit", about = "Create a node wallet and back up its seed")]
struct Opt {
    /// Path to the configuration file
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Directory for the seed backup and the session log
    #[structopt(short, long, parse(from_os_str))]
    output_dir: Option<PathBuf>,

    /// The node's initwallet endpoint
    #[structopt(short, long)]
    endpoint: Option<String>,

    /// Network the node runs on (mainnet, testnet, regtest, simnet, signet)
    #[structopt(short, long)]
    network: Option<Network>,

    /// Command line client used for the interactive fallback
    #[structopt(long)]
    lncli: Option<String>,

    /// PEM certificate to trust for the endpoint
    #[structopt(long, parse(from_os_str))]
    tls_cert: Option<PathBuf>,

    /// Skip TLS certificate verification (loopback endpoints only)
    #[structopt(long)]
    accept_invalid_certs: bool,

    /// Fall back to the interactive client when the API is unreachable
    #[structopt(long)]
    fallback_on_transport_error: bool,

    /// File holding the wallet password (defaults to $WALLETINIT_PASSWORD)
    #[structopt(short, long, parse(from_os_str))]
    password_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Parse command line arguments
    let opt = Opt::from_args();

    // Load configuration
    let mut config = match &opt.config {
        Some(path) => InitConfig::from_file(path)?,
        None => InitConfig::default(),
    };

    // Apply overrides
    if let Some(dir) = opt.output_dir {
        config.output_dir = dir;
    }
    if let Some(endpoint) = opt.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(network) = opt.network {
        config.network = network;
    }
    if let Some(lncli) = opt.lncli {
        config.lncli_path = lncli;
    }
    if let Some(cert) = opt.tls_cert {
        config.tls_cert = Some(cert);
    }
    if opt.accept_invalid_certs {
        config.accept_invalid_certs = true;
    }
    if opt.fallback_on_transport_error {
        config.fallback_on_transport_error = true;
    }
    config.validate()?;

    let password = load_password(opt.password_file.as_deref())?;

    let mut reporter = Reporter::stdout();
    match init_wallet::run(&config, &password, &mut reporter).await? {
        InitOutcome::Done { via, backup } => {
            info!("Wallet initialized via {:?}, backup at {}", via, backup.display());
            Ok(())
        }
        InitOutcome::ManualOnly { reason } => {
            anyhow::bail!("wallet was not created: {}", reason)
        }
    }
}
