//! Bounded readiness polling.

use std::io::Write;
use std::time::Duration;

use crate::registry::{Registry, SandboxHandle};
use crate::state::SandboxState;
use crate::status::StatusLine;

/// Polling bounds for [`ReadinessPoller`].
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    /// Maximum number of state queries before giving up.
    pub max_attempts: u32,
    /// Sleep between queries.
    pub interval: Duration,
    /// Short settle sleep after Available is first observed.
    pub settle: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: 60,
            interval: Duration::from_secs(5),
            settle: Duration::from_secs(1),
        }
    }
}

/// Polls a codespace until it reports `Available` or attempts run out.
pub struct ReadinessPoller {
    config: PollConfig,
}

impl ReadinessPoller {
    /// Creates a poller with the given bounds.
    pub fn new(config: PollConfig) -> Self {
        Self { config }
    }

    /// Creates a poller with default bounds (60 attempts, 5s apart).
    pub fn with_defaults() -> Self {
        Self::new(PollConfig::default())
    }

    /// Waits for the codespace to become available.
    ///
    /// Issues up to `max_attempts` state queries. Query errors are
    /// already folded into `Unknown` by the [`Registry::view`] contract,
    /// so a bad attempt neither aborts the loop nor counts as success.
    /// Returns false once attempts are exhausted.
    ///
    /// Cancellation (user interruption) propagates through the await
    /// points; it is never caught here.
    pub async fn await_ready<R, W>(
        &self,
        registry: &R,
        status: &StatusLine<W>,
        handle: &SandboxHandle,
    ) -> bool
    where
        R: Registry + ?Sized,
        W: Write,
    {
        status.set("⏳ Waiting for codespace to be ready...");

        for attempt in 1..=self.config.max_attempts {
            let state = registry.view(handle);

            status.set(&format!(
                "⏳ Waiting for codespace to be ready... ({}) [Attempt {}/{}]",
                state, attempt, self.config.max_attempts
            ));
            tracing::debug!(codespace = %handle, %state, attempt, "polled codespace state");

            if state == SandboxState::Available {
                status.set("✅ Codespace is ready!");
                tokio::time::sleep(self.config.settle).await;
                return true;
            }

            tokio::time::sleep(self.config.interval).await;
        }

        tracing::warn!(
            codespace = %handle,
            attempts = self.config.max_attempts,
            "codespace never became available"
        );
        false
    }
}
