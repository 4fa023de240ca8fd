//! CLI command implementations.

use docket_session::SessionRegistry;

use crate::config::DocketConfig;

pub mod list;
pub mod run;

/// Names run when none are given: the configured defaults, else every
/// registered session.
fn default_sessions(registry: &SessionRegistry, config: &DocketConfig) -> Vec<String> {
    match &config.sessions.default {
        Some(names) => names.clone(),
        None => registry.iter().map(|s| s.name.to_string()).collect(),
    }
}
