//! Seed backup record written to disk after a wallet has been created.

use crate::errors::CoreError;
use crate::types::{Mnemonic, Network};
use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::debug;
use zeroize::Zeroizing;

const RULE: &str = "==================================================";

/// What the backup holds: the recovery words, or the raw output of the
/// interactive wallet creation when the words could not be parsed out.
#[derive(Debug)]
pub enum BackupContents {
    /// Recovery words returned by the administrative API
    Mnemonic(Mnemonic),
    /// Raw output captured from the interactive prompt
    Transcript(Zeroizing<String>),
}

/// A seed backup, ready to be rendered and persisted.
#[derive(Debug)]
pub struct SeedBackupRecord {
    /// When the wallet was created
    generated_at: DateTime<Local>,
    /// The network the wallet belongs to
    network: Network,
    /// The recovery material
    contents: BackupContents,
}

impl SeedBackupRecord {
    /// Creates a record stamped with the current local time.
    pub fn new(network: Network, contents: BackupContents) -> Self {
        Self::with_timestamp(Local::now(), network, contents)
    }

    /// Creates a record with an explicit timestamp.
    pub fn with_timestamp(
        generated_at: DateTime<Local>,
        network: Network,
        contents: BackupContents,
    ) -> Self {
        Self {
            generated_at,
            network,
            contents,
        }
    }

    /// Renders the record as the text stored in the backup file.
    pub fn render(&self) -> Zeroizing<String> {
        let mut out = Zeroizing::new(String::new());
        out.push_str("LND WALLET SEED PHRASE\n");
        out.push_str(RULE);
        out.push('\n');
        out.push_str(&format!(
            "Generated: {}\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        ));
        out.push_str(&format!("Network: {}\n", self.network));
        out.push_str(RULE);
        out.push_str("\n\n");

        match &self.contents {
            BackupContents::Mnemonic(mnemonic) => {
                for line in mnemonic.enumerated() {
                    let line = Zeroizing::new(line);
                    out.push_str(&line);
                    out.push('\n');
                }
            }
            BackupContents::Transcript(raw) => {
                out.push_str(raw);
                if !raw.ends_with('\n') {
                    out.push('\n');
                }
            }
        }

        out.push('\n');
        out.push_str(RULE);
        out.push('\n');
        out.push_str("KEEP THIS SAFE! This is your wallet backup.\n");
        out
    }

    /// Writes the record to `path`, replacing any previous backup.
    ///
    /// On Unix the file is readable by its owner only.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), CoreError> {
        let path = path.as_ref();
        let wrap = |source: std::io::Error| CoreError::BackupWrite {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(wrap)?;
            }
        }

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(path).map_err(wrap)?;
        #[cfg(unix)]
        {
            // mode() only applies on creation
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(wrap)?;
        }

        file.write_all(self.render().as_bytes()).map_err(wrap)?;
        file.sync_all().map_err(wrap)?;
        debug!("Wrote seed backup to {}", path.display());
        Ok(())
    }
}
