//! Codespace registry client.
//!
//! Wraps the `gh codespace` CLI for create/list/view/delete operations,
//! parsing its tabular text output into structured state. The trait
//! seam exists so the poller and orchestrator are tested against
//! scripted registries instead of a live `gh`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::command::CommandRunner;
use crate::error::{Error, Result};
use crate::state::{self, SandboxState};

/// Idle timeout passed to `create`; codespaces stop themselves when idle.
const IDLE_TIMEOUT: &str = "5m";

/// Retention period passed to `create`; codespaces auto-expire even if
/// cleanup never runs.
const RETENTION_PERIOD: &str = "1h";

/// Immutable description of the codespace to create, supplied once per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxRequest {
    /// Repository in `owner/repo` format.
    pub repository: String,
    /// Branch to check out.
    pub branch: String,
    /// Machine type (e.g. `basicLinux32gb`).
    pub machine_type: String,
    /// Optional prompt. Accepted but not consumed by the interactive
    /// handoff yet.
    pub prompt: Option<String>,
}

impl SandboxRequest {
    /// Creates a request with the given coordinates.
    pub fn new(
        repository: impl Into<String>,
        branch: impl Into<String>,
        machine_type: impl Into<String>,
    ) -> Self {
        Self {
            repository: repository.into(),
            branch: branch.into(),
            machine_type: machine_type.into(),
            prompt: None,
        }
    }

    /// Attaches a prompt to the request.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }
}

/// Opaque registry-assigned codespace name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxHandle {
    /// The codespace name; the only selector later operations need.
    pub name: String,
}

impl SandboxHandle {
    /// Wraps a registry-assigned name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl std::fmt::Display for SandboxHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Operations against the external codespace registry.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Creates a codespace for the request. Does not return a handle;
    /// the registry may not list the codespace immediately, so callers
    /// follow up with retried [`find`](Self::find) calls.
    fn create(&self, request: &SandboxRequest) -> Result<()>;

    /// Finds a codespace for the repository. Prefers an available one,
    /// falling back to the most recently created.
    fn find(&self, repository: &str) -> Result<Option<SandboxHandle>>;

    /// Queries the current state of a codespace.
    ///
    /// Infallible by contract: every error is reported as
    /// [`SandboxState::Unknown`] so polling continues instead of aborting.
    fn view(&self, handle: &SandboxHandle) -> SandboxState;

    /// Deletes a codespace. Callers decide whether failure matters.
    fn delete(&self, handle: &SandboxHandle) -> Result<()>;

    /// Lists every codespace name, regardless of repository.
    fn list_all_names(&self) -> Result<Vec<String>>;

    /// Hands the terminal to an interactive session with the codespace,
    /// returning the session's raw exit code.
    async fn connect(&self, handle: &SandboxHandle) -> Result<i32>;
}

/// Builds the argv for `gh codespace create`.
fn create_args(request: &SandboxRequest) -> Vec<String> {
    vec![
        "codespace".to_string(),
        "create".to_string(),
        "-R".to_string(),
        request.repository.clone(),
        "-b".to_string(),
        request.branch.clone(),
        "-m".to_string(),
        request.machine_type.clone(),
        "--idle-timeout".to_string(),
        IDLE_TIMEOUT.to_string(),
        "--retention-period".to_string(),
        RETENTION_PERIOD.to_string(),
    ]
}

/// Registry client backed by the `gh` CLI.
pub struct GhRegistry {
    runner: CommandRunner,
}

impl Default for GhRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GhRegistry {
    /// Creates a client using the ambient `gh` binary.
    pub fn new() -> Self {
        Self {
            runner: CommandRunner::new(),
        }
    }
}

#[async_trait]
impl Registry for GhRegistry {
    fn create(&self, request: &SandboxRequest) -> Result<()> {
        let args = create_args(request);
        let argv: Vec<&str> = args.iter().map(String::as_str).collect();

        self.runner.checked("gh", &argv).map_err(|e| {
            let detail = match e {
                Error::CommandFailed { stderr, code, .. } => {
                    format!("gh exited {}: {}", code, stderr)
                }
                other => other.to_string(),
            };
            Error::CreateFailed(detail)
        })?;

        tracing::info!(repository = %request.repository, branch = %request.branch, "issued codespace create");
        Ok(())
    }

    fn find(&self, repository: &str) -> Result<Option<SandboxHandle>> {
        let output = self
            .runner
            .checked("gh", &["codespace", "list", "-R", repository])?;

        Ok(state::select_handle(&output.stdout).map(SandboxHandle::new))
    }

    fn view(&self, handle: &SandboxHandle) -> SandboxState {
        // First source: the detail view.
        if let Ok(output) = self
            .runner
            .capture("gh", &["codespace", "view", "-c", &handle.name])
        {
            let parsed = state::parse_detail_state(&output.stdout);
            if parsed != SandboxState::Unknown {
                return parsed;
            }
        }

        // Fallback: scan the listing filtered to this codespace.
        if let Ok(output) = self
            .runner
            .capture("gh", &["codespace", "list", "-c", &handle.name])
        {
            let parsed = state::scan_list_state(&output.stdout, &handle.name);
            if parsed != SandboxState::Unknown {
                return parsed;
            }
        }

        SandboxState::Unknown
    }

    fn delete(&self, handle: &SandboxHandle) -> Result<()> {
        self.runner
            .checked("gh", &["codespace", "delete", "-c", &handle.name, "--force"])?;

        tracing::info!(codespace = %handle, "deleted codespace");
        Ok(())
    }

    fn list_all_names(&self) -> Result<Vec<String>> {
        let output = self.runner.checked("gh", &["codespace", "list"])?;

        Ok(state::parse_list_entries(&output.stdout)
            .into_iter()
            .map(|entry| entry.name)
            .collect())
    }

    async fn connect(&self, handle: &SandboxHandle) -> Result<i32> {
        self.runner
            .interactive("gh", &["codespace", "ssh", "-c", &handle.name])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder_carries_coordinates() {
        let request = SandboxRequest::new("acme/repo", "main", "basicLinux32gb")
            .with_prompt("fix the login bug");

        assert_eq!(request.repository, "acme/repo");
        assert_eq!(request.branch, "main");
        assert_eq!(request.machine_type, "basicLinux32gb");
        assert_eq!(request.prompt.as_deref(), Some("fix the login bug"));
    }

    #[test]
    fn create_args_include_operational_policy() {
        let request = SandboxRequest::new("acme/repo", "main", "basicLinux32gb");
        let args = create_args(&request);

        assert_eq!(args[0], "codespace");
        assert_eq!(args[1], "create");
        assert!(args.windows(2).any(|w| w == ["-R", "acme/repo"]));
        assert!(args.windows(2).any(|w| w == ["-b", "main"]));
        assert!(args.windows(2).any(|w| w == ["-m", "basicLinux32gb"]));
        assert!(args.windows(2).any(|w| w == ["--idle-timeout", "5m"]));
        assert!(args.windows(2).any(|w| w == ["--retention-period", "1h"]));
    }

    #[test]
    fn handle_displays_its_name() {
        let handle = SandboxHandle::new("acme-repo-abcd");
        assert_eq!(handle.to_string(), "acme-repo-abcd");
    }
}
