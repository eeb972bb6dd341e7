//! End-to-end session scenarios against a scripted registry.
//!
//! Exercises the public API the way the binary does: a full run from
//! create through interactive handoff to cleanup, with the registry
//! replaced by a fake that replays listing lag and state transitions.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use codespace_pilot::{
    Error, PollConfig, Registry, Result, SandboxHandle, SandboxRequest, SandboxState,
    SessionConfig, SessionRunner, StatusLine,
};

#[derive(Default)]
struct Script {
    create_error: Option<String>,
    find_results: Mutex<Vec<Option<SandboxHandle>>>,
    states: Mutex<Vec<SandboxState>>,
    calls: Mutex<Vec<String>>,
}

/// Scripted registry recording the calls a session makes. Clones share
/// the script, so the test keeps a handle on the call log after the
/// runner takes ownership of its copy.
#[derive(Clone, Default)]
struct ScriptedRegistry {
    script: Arc<Script>,
}

impl ScriptedRegistry {
    fn new(script: Script) -> Self {
        Self {
            script: Arc::new(script),
        }
    }

    fn record(&self, call: impl Into<String>) {
        self.script.calls.lock().unwrap().push(call.into());
    }

    fn calls(&self) -> Vec<String> {
        self.script.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Registry for ScriptedRegistry {
    fn create(&self, request: &SandboxRequest) -> Result<()> {
        self.record(format!("create:{}", request.repository));
        match &self.script.create_error {
            Some(reason) => Err(Error::CreateFailed(reason.clone())),
            None => Ok(()),
        }
    }

    fn find(&self, repository: &str) -> Result<Option<SandboxHandle>> {
        self.record(format!("find:{}", repository));
        let mut results = self.script.find_results.lock().unwrap();
        if results.is_empty() {
            Ok(None)
        } else {
            Ok(results.remove(0))
        }
    }

    fn view(&self, handle: &SandboxHandle) -> SandboxState {
        self.record(format!("view:{}", handle));
        let mut states = self.script.states.lock().unwrap();
        if states.len() > 1 {
            states.remove(0)
        } else {
            states.first().copied().unwrap_or_default()
        }
    }

    fn delete(&self, handle: &SandboxHandle) -> Result<()> {
        self.record(format!("delete:{}", handle));
        Ok(())
    }

    fn list_all_names(&self) -> Result<Vec<String>> {
        self.record("list_all");
        Ok(vec![])
    }

    async fn connect(&self, handle: &SandboxHandle) -> Result<i32> {
        self.record(format!("connect:{}", handle));
        Ok(0)
    }
}

fn fast_config() -> SessionConfig {
    SessionConfig {
        find_attempts: 5,
        find_backoff: Duration::ZERO,
        create_settle: Duration::ZERO,
        poll: PollConfig {
            max_attempts: 10,
            interval: Duration::ZERO,
            settle: Duration::ZERO,
        },
    }
}

fn runner_for(registry: &ScriptedRegistry) -> SessionRunner<ScriptedRegistry, Vec<u8>> {
    SessionRunner::new(registry.clone(), StatusLine::new(Vec::new()), fast_config())
}

#[tokio::test]
async fn full_session_with_lagging_registry() {
    // find misses twice before the listing catches up; the codespace
    // becomes available on the fifth poll.
    let registry = ScriptedRegistry::new(Script {
        find_results: Mutex::new(vec![None, None, Some(SandboxHandle::new("acme-repo-abcd"))]),
        states: Mutex::new(vec![
            SandboxState::Creating,
            SandboxState::Creating,
            SandboxState::Unknown,
            SandboxState::Creating,
            SandboxState::Available,
        ]),
        ..Default::default()
    });
    let runner = runner_for(&registry);
    let request = SandboxRequest::new("acme/repo", "main", "basicLinux32gb");

    let code = runner.run(&request).await;

    assert_eq!(code, 0);
    let calls = registry.calls();
    assert_eq!(calls.iter().filter(|c| *c == "find:acme/repo").count(), 3);
    assert_eq!(
        calls.iter().filter(|c| *c == "view:acme-repo-abcd").count(),
        5
    );
    assert!(calls.contains(&"connect:acme-repo-abcd".to_string()));
    assert_eq!(
        calls
            .iter()
            .filter(|c| *c == "delete:acme-repo-abcd")
            .count(),
        1
    );
}

#[tokio::test]
async fn create_failure_means_no_find_and_no_delete() {
    let registry = ScriptedRegistry::new(Script {
        create_error: Some("machine type not allowed".to_string()),
        ..Default::default()
    });
    let runner = runner_for(&registry);
    let request = SandboxRequest::new("acme/repo", "main", "basicLinux32gb");

    let code = runner.run(&request).await;

    assert_eq!(code, 1);
    assert_eq!(registry.calls(), vec!["create:acme/repo".to_string()]);
}

#[tokio::test]
async fn inert_prompt_changes_nothing_about_the_flow() {
    let registry = ScriptedRegistry::new(Script {
        find_results: Mutex::new(vec![Some(SandboxHandle::new("box-1"))]),
        states: Mutex::new(vec![SandboxState::Available]),
        ..Default::default()
    });
    let runner = runner_for(&registry);
    let request =
        SandboxRequest::new("acme/repo", "main", "basicLinux32gb").with_prompt("do the thing");

    let code = runner.run(&request).await;

    assert_eq!(code, 0);
    let calls = registry.calls();
    assert!(calls.contains(&"connect:box-1".to_string()));
    assert!(calls.contains(&"delete:box-1".to_string()));
}
