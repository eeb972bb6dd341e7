//! Error types for codespace lifecycle operations.

use thiserror::Error;

/// Top-level error type for codespace operations.
#[derive(Error, Debug)]
pub enum Error {
    /// An external command exited non-zero.
    #[error("command `{program} {}` failed with exit code {code}: {stderr}", .args.join(" "))]
    CommandFailed {
        program: String,
        args: Vec<String>,
        code: i32,
        stderr: String,
    },

    /// The registry refused to create a codespace.
    #[error("failed to create codespace: {0}")]
    CreateFailed(String),

    /// No codespace appeared in the listing after retries.
    #[error("failed to get codespace name after {attempts} attempts")]
    HandleNotFound { attempts: u32 },

    /// The codespace never reached the Available state.
    #[error("codespace did not become ready within {attempts} attempts")]
    ReadyTimeout { attempts: u32 },

    /// The user interrupted the session. Not a failure.
    #[error("interrupted")]
    Interrupted,

    /// IO error while spawning or talking to a child process.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for codespace operations.
pub type Result<T> = std::result::Result<T, Error>;
