//! External command execution.
//!
//! Every registry operation shells out to the `gh` CLI, so all children
//! run with a search path extended to cover Homebrew install locations
//! that are missing from the ambient `PATH` on some macOS setups.

use std::ffi::OsString;
use std::process::{Command, Stdio};

use crate::error::{Error, Result};

/// Extra directories prepended to the child's `PATH`.
const EXTRA_PATHS: &str = "/opt/homebrew/bin:/usr/local/bin";

/// Captured output of a finished external command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code; -1 when the process was killed by a signal.
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Returns true when the command exited zero.
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Runs external commands with an augmented search path.
#[derive(Debug, Clone, Default)]
pub struct CommandRunner;

impl CommandRunner {
    /// Creates a new command runner.
    pub fn new() -> Self {
        Self
    }

    /// Returns the `PATH` value children run with.
    fn child_path() -> OsString {
        let mut path = OsString::from(EXTRA_PATHS);
        path.push(":");
        path.push(std::env::var_os("PATH").unwrap_or_default());
        path
    }

    /// Runs a command to completion, capturing stdout and stderr.
    ///
    /// A non-zero exit is not an error here; callers inspect the code.
    /// Blocks the calling thread until the child exits.
    pub fn capture(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        let output = Command::new(program)
            .args(args)
            .env("PATH", Self::child_path())
            .stdin(Stdio::null())
            .output()?;

        Ok(CommandOutput {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Runs a command like [`capture`](Self::capture), but a non-zero
    /// exit becomes [`Error::CommandFailed`] carrying the argv and stderr.
    pub fn checked(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        let output = self.capture(program, args)?;

        if !output.success() {
            return Err(Error::CommandFailed {
                program: program.to_string(),
                args: args.iter().map(|a| a.to_string()).collect(),
                code: output.code,
                stderr: output.stderr.trim().to_string(),
            });
        }

        Ok(output)
    }

    /// Runs a command with inherited stdio so it owns the terminal.
    ///
    /// The exit code is returned raw and never checked: a user closing
    /// an interactive session is not an error.
    pub async fn interactive(&self, program: &str, args: &[&str]) -> Result<i32> {
        tracing::info!(program = %program, ?args, "starting interactive command");

        let status = tokio::process::Command::new(program)
            .args(args)
            .env("PATH", Self::child_path())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await?;

        Ok(status.code().unwrap_or(-1))
    }
}
