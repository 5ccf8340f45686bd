//! Interactive fallback: drives `lncli create` through its prompts.
//!
//! The session is a small state machine. Each state waits for one trigger
//! string with its own deadline, answers it, and moves on; after the last
//! prompt the remaining output is drained until the program closes it.
//! On Unix the client runs on a pseudo-terminal, see [`crate::terminal`].

use crate::config::InitConfig;
use crate::errors::WalletError;
#[cfg(unix)]
use crate::terminal::Terminal;
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use walletinit_core::Password;
use zeroize::Zeroizing;

/// How a prompt is answered.
#[derive(Debug, Clone, Copy)]
pub enum Reply {
    /// Send the wallet password
    Secret,
    /// Send a fixed line
    Text(&'static str),
}

/// One expected prompt and its answer.
#[derive(Debug, Clone, Copy)]
pub struct PromptStep {
    /// Substring that marks the prompt
    pub trigger: &'static str,
    /// What to answer
    pub reply: Reply,
}

/// The prompts `lncli create` shows when generating a fresh seed without a
/// passphrase.
pub const CREATE_WALLET_STEPS: &[PromptStep] = &[
    PromptStep {
        trigger: "Input wallet password:",
        reply: Reply::Secret,
    },
    PromptStep {
        trigger: "Confirm password:",
        reply: Reply::Secret,
    },
    PromptStep {
        trigger: "Do you have an existing cipher seed",
        reply: Reply::Text("n"),
    },
    PromptStep {
        trigger: "Input your passphrase",
        reply: Reply::Text(""),
    },
    PromptStep {
        trigger: "Confirm passphrase:",
        reply: Reply::Text(""),
    },
];

/// Deadlines for a prompt session.
#[derive(Debug, Clone, Copy)]
pub struct PromptTimeouts {
    /// Bound on the wait for each prompt
    pub per_prompt: Duration,
    /// Bound on the wait for end of output after the last prompt
    pub completion: Duration,
}

impl PromptTimeouts {
    /// Reads the deadlines from the configuration.
    pub fn from_config(config: &InitConfig) -> Self {
        Self {
            per_prompt: config.prompt_timeout(),
            completion: config.completion_timeout(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Awaiting(usize),
    Draining,
    Finished,
}

/// A scripted conversation over a pair of byte streams.
pub struct PromptSession<R, W> {
    /// Output of the driven program
    reader: R,
    /// Input of the driven program
    writer: W,
    /// Output received but not yet consumed by a match
    pending: Zeroizing<Vec<u8>>,
    /// Write-through copy of the session
    transcript: Option<File>,
    /// Deadlines
    timeouts: PromptTimeouts,
}

impl<R, W> PromptSession<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a session reading from `reader` and answering on `writer`.
    pub fn new(reader: R, writer: W, timeouts: PromptTimeouts) -> Self {
        Self {
            reader,
            writer,
            pending: Zeroizing::new(Vec::new()),
            transcript: None,
            timeouts,
        }
    }

    /// Mirrors everything the program prints, and our answers, to `file`.
    pub fn with_transcript(mut self, file: File) -> Self {
        self.transcript = Some(file);
        self
    }

    /// Walks through `steps` and returns the output printed after the last one.
    pub async fn run(
        &mut self,
        steps: &[PromptStep],
        secret: &str,
    ) -> Result<Zeroizing<String>, WalletError> {
        let mut state = if steps.is_empty() {
            SessionState::Draining
        } else {
            SessionState::Awaiting(0)
        };

        loop {
            state = match state {
                SessionState::Awaiting(index) => {
                    let step = &steps[index];
                    self.expect(step.trigger).await?;
                    debug!("Matched prompt {:?}", step.trigger);

                    match step.reply {
                        Reply::Secret => self.send_line(secret, true).await?,
                        Reply::Text(text) => self.send_line(text, false).await?,
                    }

                    if index + 1 < steps.len() {
                        SessionState::Awaiting(index + 1)
                    } else {
                        SessionState::Draining
                    }
                }
                SessionState::Draining => {
                    let waited = self.timeouts.completion;
                    match timeout(waited, self.read_to_end()).await {
                        Ok(result) => result.map_err(session_io)?,
                        Err(_) => {
                            return Err(WalletError::PromptTimeout {
                                prompt: "end of output".to_string(),
                                waited,
                            })
                        }
                    }
                    SessionState::Finished
                }
                SessionState::Finished => break,
            };
        }

        Ok(Zeroizing::new(
            String::from_utf8_lossy(&self.pending).into_owned(),
        ))
    }

    /// Waits for `trigger` and consumes everything up to and including it.
    async fn expect(&mut self, trigger: &str) -> Result<(), WalletError> {
        let waited = self.timeouts.per_prompt;
        let found = match timeout(waited, self.read_until(trigger.as_bytes())).await {
            Ok(result) => result.map_err(session_io)?,
            Err(_) => {
                return Err(WalletError::PromptTimeout {
                    prompt: trigger.to_string(),
                    waited,
                })
            }
        };

        if found {
            Ok(())
        } else {
            Err(WalletError::UnexpectedEof {
                prompt: trigger.to_string(),
            })
        }
    }

    /// Returns false if the output ends before `trigger` shows up.
    async fn read_until(&mut self, trigger: &[u8]) -> io::Result<bool> {
        loop {
            if let Some(at) = find(&self.pending, trigger) {
                self.pending.drain(..at + trigger.len());
                return Ok(true);
            }
            if self.read_chunk().await? == 0 {
                return Ok(false);
            }
        }
    }

    async fn read_to_end(&mut self) -> io::Result<()> {
        while self.read_chunk().await? > 0 {}
        Ok(())
    }

    async fn read_chunk(&mut self) -> io::Result<usize> {
        let mut chunk = Zeroizing::new([0u8; 1024]);
        let n = self.reader.read(&mut chunk[..]).await?;
        if n > 0 {
            self.pending.extend_from_slice(&chunk[..n]);
            self.log(&chunk[..n]).await?;
        }
        Ok(n)
    }

    async fn send_line(&mut self, line: &str, secret: bool) -> Result<(), WalletError> {
        let mut bytes = Zeroizing::new(Vec::with_capacity(line.len() + 1));
        bytes.extend_from_slice(line.as_bytes());
        bytes.push(b'\n');

        self.writer.write_all(&bytes).await.map_err(session_io)?;
        self.writer.flush().await.map_err(session_io)?;

        if secret {
            self.log(b"<redacted>\n").await.map_err(session_io)?;
        } else {
            self.log(&bytes).await.map_err(session_io)?;
        }
        Ok(())
    }

    async fn log(&mut self, bytes: &[u8]) -> io::Result<()> {
        if let Some(file) = self.transcript.as_mut() {
            file.write_all(bytes).await?;
            file.flush().await?;
        }
        Ok(())
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn session_io(error: io::Error) -> WalletError {
    WalletError::ProcessFailed(format!("I/O error during interactive session: {}", error))
}

/// Finds `program` on `search_path`, or checks it directly if it is a path.
pub fn resolve_program(program: &str, search_path: &OsStr) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.is_absolute() || candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    std::env::split_paths(search_path)
        .map(|dir| dir.join(program))
        .find(|path| path.is_file())
}

/// Runs `lncli --network=<network> create` and answers its prompts.
///
/// Returns the output printed after the last prompt, which holds the
/// generated seed.
pub async fn create_wallet(
    config: &InitConfig,
    password: &Password,
) -> Result<Zeroizing<String>, WalletError> {
    let search_path = config.search_path()?;
    let program = resolve_program(&config.lncli_path, &search_path).ok_or_else(|| {
        WalletError::ProcessLaunch {
            program: config.lncli_path.clone(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found in PATH"),
        }
    })?;

    run_on_terminal(config, &program, &search_path, password).await
}

#[cfg(unix)]
async fn run_on_terminal(
    config: &InitConfig,
    program: &Path,
    search_path: &OsStr,
    password: &Password,
) -> Result<Zeroizing<String>, WalletError> {
    tokio::fs::create_dir_all(&config.output_dir).await?;
    let transcript = File::create(config.transcript_path()).await?;

    let terminal = Terminal::open().map_err(|e| {
        WalletError::ProcessFailed(format!("failed to open a pseudo-terminal: {}", e))
    })?;

    let mut command = Command::new(program);
    command
        .arg(format!("--network={}", config.network))
        .arg("create")
        .env("PATH", search_path)
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    terminal.attach(&mut command)?;

    info!("Starting {} --network={} create", program.display(), config.network);
    let mut child = command.spawn().map_err(|source| WalletError::ProcessLaunch {
        program: program.display().to_string(),
        source,
    })?;
    // Releases the slave copies held for the child
    drop(command);

    let (reader, writer) = terminal.into_master()?;
    let stderr = child.stderr.take().ok_or_else(|| {
        WalletError::ProcessFailed("child stderr is not available".to_string())
    })?;

    // Drained on its own so a chatty child never blocks on a full pipe
    let stderr_task = tokio::spawn(async move {
        let mut stderr = stderr;
        let mut text = String::new();
        let _ = stderr.read_to_string(&mut text).await;
        text
    });

    let timeouts = PromptTimeouts::from_config(config);
    let mut session = PromptSession::new(reader, writer, timeouts).with_transcript(transcript);
    let result = session.run(CREATE_WALLET_STEPS, password).await;
    drop(session);

    let output = match result {
        Ok(output) => output,
        Err(e) => {
            // A child that already failed explains more than the broken session
            if let Ok(Ok(status)) = timeout(Duration::from_secs(1), child.wait()).await {
                if !status.success() {
                    let stderr = stderr_task.await.unwrap_or_default();
                    return Err(WalletError::ProcessFailed(describe_exit(
                        program, status, &stderr,
                    )));
                }
            }
            warn!("Interactive session aborted: {}", e);
            let _ = child.start_kill();
            return Err(e);
        }
    };

    let status = match timeout(timeouts.completion, child.wait()).await {
        Ok(status) => status?,
        Err(_) => {
            let _ = child.start_kill();
            return Err(WalletError::ProcessFailed(format!(
                "{} did not exit after closing its output",
                program.display()
            )));
        }
    };

    let stderr = stderr_task.await.unwrap_or_default();
    if !status.success() {
        return Err(WalletError::ProcessFailed(describe_exit(program, status, &stderr)));
    }

    debug!("{} exited with {}", program.display(), status);
    Ok(output)
}

#[cfg(not(unix))]
async fn run_on_terminal(
    _config: &InitConfig,
    program: &Path,
    _search_path: &OsStr,
    _password: &Password,
) -> Result<Zeroizing<String>, WalletError> {
    Err(WalletError::ProcessFailed(format!(
        "driving {} needs a pseudo-terminal, which is only available on Unix",
        program.display()
    )))
}

fn describe_exit(program: &Path, status: std::process::ExitStatus, stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("{} exited with {}", program.display(), status)
    } else {
        format!("{} exited with {}: {}", program.display(), status, stderr)
    }
}
