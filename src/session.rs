//! Single-session lifecycle orchestration.
//!
//! Sequences create → locate → await-ready → interactive handoff →
//! guaranteed delete. Every exit path — normal completion, user
//! interruption, or error — funnels through one finalize step guarded
//! by an "already deleted" flag, so a created codespace is deleted at
//! most once and never leaks.

use std::future::Future;
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::poller::{PollConfig, ReadinessPoller};
use crate::registry::{GhRegistry, Registry, SandboxHandle, SandboxRequest};
use crate::status::StatusLine;

/// Timing and retry bounds for a session run.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Attempts to locate the codespace in the listing after create.
    pub find_attempts: u32,
    /// Backoff between find attempts (registry-list lag).
    pub find_backoff: Duration,
    /// Settle delay after create before the first listing query.
    pub create_settle: Duration,
    /// Readiness polling bounds.
    pub poll: PollConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            find_attempts: 5,
            find_backoff: Duration::from_secs(2),
            create_settle: Duration::from_secs(5),
            poll: PollConfig::default(),
        }
    }
}

/// Tracks the one handle of this run and whether it was deleted yet.
#[derive(Debug, Default)]
struct CleanupGuard {
    handle: Option<SandboxHandle>,
    deleted: bool,
}

fn lock(guard: &Mutex<CleanupGuard>) -> MutexGuard<'_, CleanupGuard> {
    match guard.lock() {
        Ok(inner) => inner,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Runs the create → connect → delete workflow for one codespace.
pub struct SessionRunner<R, W: Write> {
    registry: R,
    status: StatusLine<W>,
    config: SessionConfig,
}

impl SessionRunner<GhRegistry, io::Stdout> {
    /// Creates a runner over the live `gh` registry, reporting to stdout.
    pub fn with_defaults() -> Self {
        Self::new(
            GhRegistry::new(),
            StatusLine::stdout(),
            SessionConfig::default(),
        )
    }
}

impl<R: Registry, W: Write> SessionRunner<R, W> {
    /// Creates a runner with explicit collaborators.
    pub fn new(registry: R, status: StatusLine<W>, config: SessionConfig) -> Self {
        Self {
            registry,
            status,
            config,
        }
    }

    /// Runs one full session and returns the process exit code.
    ///
    /// Exit codes: 0 for normal completion or user interruption, 1 for
    /// any create/find/ready/unexpected failure. Cleanup runs on every
    /// path that obtained a handle.
    pub async fn run(&self, request: &SandboxRequest) -> i32 {
        self.run_until(request, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
    }

    /// Runs the workflow, treating completion of `interrupt` as user
    /// interruption. [`run`](Self::run) wires this to ctrl-c.
    async fn run_until<F>(&self, request: &SandboxRequest, interrupt: F) -> i32
    where
        F: Future<Output = ()>,
    {
        let guard = Mutex::new(CleanupGuard::default());
        let cursor = self.status.cursor_hidden();

        // Interruption drops the workflow future at its current await
        // point. The handle lives in `guard`, outside that future, so
        // the finalize below still sees it.
        let outcome = tokio::select! {
            outcome = self.drive(request, &guard) => outcome,
            () = interrupt => Err(Error::Interrupted),
        };

        drop(cursor);

        let code = match outcome {
            Ok(()) => 0,
            Err(Error::Interrupted) => {
                self.status.finish("⚠️  Interrupted");
                tracing::info!("session interrupted by user");
                0
            }
            Err(e) => {
                self.status.finish(&format!("❌ Error: {}", e));
                tracing::error!(error = %e, "session failed");
                1
            }
        };

        self.finalize(&guard);
        code
    }

    /// The forward path of the workflow. Cleanup is not handled here;
    /// [`run`](Self::run) finalizes regardless of how this returns.
    async fn drive(&self, request: &SandboxRequest, guard: &Mutex<CleanupGuard>) -> Result<()> {
        self.status.set(&format!(
            "🚀 Creating codespace for {}...",
            request.repository
        ));
        self.registry.create(request)?;

        // The registry may not list a just-created codespace yet.
        self.status.set("⏳ Waiting for codespace to register...");
        tokio::time::sleep(self.config.create_settle).await;

        let handle = self.locate(request).await?;
        lock(guard).handle = Some(handle.clone());
        self.status.set(&format!("✅ Found codespace: {}", handle));

        let poller = ReadinessPoller::new(self.config.poll);
        if !poller
            .await_ready(&self.registry, &self.status, &handle)
            .await
        {
            return Err(Error::ReadyTimeout {
                attempts: self.config.poll.max_attempts,
            });
        }

        self.status.set("🔌 Connecting to codespace...");
        self.status.clear();
        self.status.show_cursor();

        // The session owns the terminal; a user exiting it is not an
        // error, and even a failed connect still proceeds to cleanup.
        match self.registry.connect(&handle).await {
            Ok(code) => tracing::info!(code, codespace = %handle, "interactive session ended"),
            Err(e) => self.status.finish(&format!("⚠️  Session ended: {}", e)),
        }

        Ok(())
    }

    /// Finds the codespace created for this request, retrying while the
    /// registry listing catches up.
    async fn locate(&self, request: &SandboxRequest) -> Result<SandboxHandle> {
        self.status.set("🔍 Finding codespace...");

        for attempt in 1..=self.config.find_attempts {
            if let Some(handle) = self.registry.find(&request.repository)? {
                return Ok(handle);
            }

            if attempt < self.config.find_attempts {
                self.status.set(&format!(
                    "🔍 Retrying to find codespace... (attempt {}/{})",
                    attempt, self.config.find_attempts
                ));
                tokio::time::sleep(self.config.find_backoff).await;
            }
        }

        Err(Error::HandleNotFound {
            attempts: self.config.find_attempts,
        })
    }

    /// Deletes the session's codespace at most once.
    ///
    /// Safe to call from every exit path; the guard flag makes repeat
    /// calls no-ops. Deletion failure is reported but never escalated —
    /// the retention period deletes stragglers server-side.
    fn finalize(&self, guard: &Mutex<CleanupGuard>) {
        let mut inner = lock(guard);

        let Some(handle) = inner.handle.clone() else {
            return;
        };
        if inner.deleted {
            return;
        }
        inner.deleted = true;

        self.status.hide_cursor();
        self.status.set("🗑️  Deleting codespace...");

        match self.registry.delete(&handle) {
            Ok(()) => self.status.finish("✅ Codespace deleted"),
            Err(e) => {
                self.status
                    .finish(&format!("⚠️  Failed to delete {}: {}", handle, e));
                tracing::warn!(codespace = %handle, error = %e, "cleanup delete failed");
            }
        }

        self.status.show_cursor();
    }
}
