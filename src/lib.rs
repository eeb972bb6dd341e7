//! codespace-pilot - ephemeral GitHub Codespace sessions
//!
//! This library automates the lifecycle of a single remote development
//! sandbox: create it, wait for readiness, hand the terminal to an
//! interactive session, and guarantee teardown on every exit path. A
//! bulk delete-all mode tears down every codespace the registry lists.

pub mod cleanup;
pub mod command;
pub mod error;
pub mod poller;
pub mod registry;
pub mod session;
pub mod state;
pub mod status;

pub use cleanup::delete_all;
pub use command::{CommandOutput, CommandRunner};
pub use error::{Error, Result};
pub use poller::{PollConfig, ReadinessPoller};
pub use registry::{GhRegistry, Registry, SandboxHandle, SandboxRequest};
pub use session::{SessionConfig, SessionRunner};
pub use state::SandboxState;
pub use status::{CursorGuard, StatusLine};
