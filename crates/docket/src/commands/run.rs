//! Session execution command.

use anyhow::Result;
use docket_session::{ProcessRunner, SessionRegistry, SystemRunner};

use crate::config::DocketConfig;

/// Run the named sessions, or the defaults when none are named.
///
/// Returns the exit code of the last session run. Stops at the first
/// session that does not succeed.
pub async fn run(names: &[String], config: &DocketConfig) -> Result<i32> {
    let registry = SessionRegistry::builtin();
    run_with(&registry, &SystemRunner::new(), names, config).await
}

async fn run_with(
    registry: &SessionRegistry,
    runner: &dyn ProcessRunner,
    names: &[String],
    config: &DocketConfig,
) -> Result<i32> {
    let names = if names.is_empty() {
        super::default_sessions(registry, config)
    } else {
        names.to_vec()
    };

    if names.is_empty() {
        tracing::warn!("No sessions selected");
        return Ok(0);
    }

    // Resolve everything first so a typo runs nothing.
    let sessions = registry.select(&names[..])?;

    let mut code = 0;
    for session in sessions {
        let status = session.run(runner).await?;
        code = status.exit_code();
        if !status.success() {
            break;
        }
    }

    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionsConfig;
    use async_trait::async_trait;
    use docket_session::{Invocation, RunError, Session, SessionStatus};
    use std::sync::Mutex;

    /// Exits with the code given as the program's first argument.
    #[derive(Default)]
    struct ScriptedRunner {
        ran: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ProcessRunner for ScriptedRunner {
        async fn run(&self, invocation: &Invocation) -> Result<SessionStatus, RunError> {
            self.ran.lock().unwrap().push(invocation.program().to_string());
            let code = invocation.arguments()[0].parse().unwrap();
            Ok(SessionStatus::Exited(code))
        }
    }

    fn registry() -> SessionRegistry {
        let mut registry = SessionRegistry::new();
        registry.register(Session {
            name: "ok",
            description: "succeeds",
            invocation: Invocation::new("ok").arg("0"),
        });
        registry.register(Session {
            name: "fail",
            description: "fails",
            invocation: Invocation::new("fail").arg("3"),
        });
        registry
    }

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[tokio::test]
    async fn runs_named_sessions_in_order() {
        let runner = ScriptedRunner::default();
        let code = run_with(&registry(), &runner, &names(&["ok", "ok"]), &DocketConfig::default())
            .await
            .unwrap();

        assert_eq!(code, 0);
        assert_eq!(*runner.ran.lock().unwrap(), ["ok", "ok"]);
    }

    #[tokio::test]
    async fn stops_at_first_failure() {
        let runner = ScriptedRunner::default();
        let code = run_with(
            &registry(),
            &runner,
            &names(&["fail", "ok"]),
            &DocketConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(code, 3);
        assert_eq!(*runner.ran.lock().unwrap(), ["fail"]);
    }

    #[tokio::test]
    async fn runs_everything_without_defaults() {
        let runner = ScriptedRunner::default();
        let code = run_with(&registry(), &runner, &[], &DocketConfig::default())
            .await
            .unwrap();

        assert_eq!(code, 3);
        assert_eq!(*runner.ran.lock().unwrap(), ["ok", "fail"]);
    }

    #[tokio::test]
    async fn uses_configured_defaults() {
        let runner = ScriptedRunner::default();
        let config = DocketConfig {
            sessions: SessionsConfig {
                default: Some(names(&["ok"])),
            },
            ..Default::default()
        };

        let code = run_with(&registry(), &runner, &[], &config).await.unwrap();

        assert_eq!(code, 0);
        assert_eq!(*runner.ran.lock().unwrap(), ["ok"]);
    }

    #[tokio::test]
    async fn unknown_session_runs_nothing() {
        let runner = ScriptedRunner::default();
        let err = run_with(
            &registry(),
            &runner,
            &names(&["ok", "missing"]),
            &DocketConfig::default(),
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("Session not found: missing"));
        assert!(runner.ran.lock().unwrap().is_empty());
    }
}
