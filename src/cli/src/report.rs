//! Operator-facing console output.

use colored::Colorize;
use std::io::{self, Write};
use std::path::Path;
use walletinit_core::Mnemonic;

const RULE: &str = "==================================================";

/// Writes progress, the recovery phrase and instructions for the operator.
pub struct Reporter<W> {
    out: W,
}

impl Reporter<io::Stdout> {
    /// A reporter printing to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Reporter<W> {
    /// Creates a reporter writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Prints a plain progress line.
    pub fn progress(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "{}", message)
    }

    /// Prints a line in green.
    pub fn success(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "{}", message.green())
    }

    /// Prints a line in red.
    pub fn failure(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "{}", message.red())
    }

    /// Prints the recovery words, one per line, numbered from 1.
    pub fn mnemonic(&mut self, mnemonic: &Mnemonic) -> io::Result<()> {
        writeln!(
            self.out,
            "\n{}",
            "IMPORTANT: Save this seed phrase securely!".yellow().bold()
        )?;
        writeln!(self.out, "{}", RULE)?;
        for line in mnemonic.enumerated() {
            writeln!(self.out, "{}", line)?;
        }
        writeln!(self.out, "{}", RULE)?;
        self.out.flush()
    }

    /// Prints the raw output of the interactive wallet creation.
    pub fn transcript(&mut self, raw: &str) -> io::Result<()> {
        writeln!(self.out, "{}", raw)?;
        self.out.flush()
    }

    /// Tells the operator where the seed backup was written.
    pub fn backup_saved(&mut self, path: &Path) -> io::Result<()> {
        writeln!(
            self.out,
            "\n{} {}",
            "Seed phrase backed up to:".green(),
            path.display()
        )
    }

    /// Tells the operator how to create the wallet by hand.
    pub fn manual_instructions(&mut self, command: &str) -> io::Result<()> {
        writeln!(self.out, "\nPlease create wallet manually with:")?;
        writeln!(self.out, "{}", command)?;
        self.out.flush()
    }
}
