//! Pseudo-terminal for the interactive client.
//!
//! `lncli` reads passwords through terminal ioctls that fail on pipes, so the
//! child gets the slave side of a pty as its stdin and stdout. Echo is off so
//! answers never show up in the captured output, and output post-processing
//! is off so lines keep plain `\n` endings.

use nix::errno::Errno;
use nix::pty::{openpty, OpenptyResult};
use nix::sys::termios::{tcgetattr, tcsetattr, LocalFlags, OutputFlags, SetArg};
use std::io;
use std::pin::Pin;
use std::process::Stdio;
use std::task::{Context, Poll};
use tokio::fs::File;
use tokio::io::{AsyncRead, ReadBuf};
use tokio::process::Command;

/// Both sides of a freshly opened pty.
pub struct Terminal {
    master: std::fs::File,
    slave: std::fs::File,
}

impl Terminal {
    /// Opens a pty with echo and output processing switched off.
    pub fn open() -> io::Result<Self> {
        let OpenptyResult { master, slave } = openpty(None, None).map_err(io::Error::from)?;

        let mut termios = tcgetattr(&slave).map_err(io::Error::from)?;
        termios.local_flags.remove(LocalFlags::ECHO);
        termios.output_flags.remove(OutputFlags::OPOST);
        tcsetattr(&slave, SetArg::TCSANOW, &termios).map_err(io::Error::from)?;

        Ok(Self {
            master: master.into(),
            slave: slave.into(),
        })
    }

    /// Connects the child's stdin and stdout to the terminal.
    ///
    /// `command` keeps copies of the slave side until it is dropped, and the
    /// master only reports end of output once every copy is closed.
    pub fn attach(&self, command: &mut Command) -> io::Result<()> {
        command
            .stdin(Stdio::from(self.slave.try_clone()?))
            .stdout(Stdio::from(self.slave.try_clone()?));
        Ok(())
    }

    /// Closes our slave side and returns the master as a reader and a writer.
    pub fn into_master(self) -> io::Result<(TerminalReader, File)> {
        let Self { master, slave } = self;
        drop(slave);

        let reader = master.try_clone()?;
        Ok((TerminalReader(File::from_std(reader)), File::from_std(master)))
    }
}

/// Read half of the master side.
pub struct TerminalReader(File);

impl AsyncRead for TerminalReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match Pin::new(&mut self.0).poll_read(cx, buf) {
            // A hung-up pty reads as EIO on Linux rather than end of file
            Poll::Ready(Err(e)) if e.raw_os_error() == Some(Errno::EIO as i32) => {
                Poll::Ready(Ok(()))
            }
            other => other,
        }
    }
}
