//! Session listing command.

use anyhow::Result;
use docket_session::SessionRegistry;

use crate::config::DocketConfig;

/// Run the list command.
pub fn run(config: &DocketConfig) -> Result<()> {
    let registry = SessionRegistry::builtin();
    let defaults = super::default_sessions(&registry, config);

    println!("Sessions defined in docket:\n");
    for session in registry.iter() {
        let marker = if defaults.iter().any(|d| d == session.name) {
            '*'
        } else {
            '-'
        };
        println!("{} {} -> {}", marker, session.name, session.description);
    }
    println!("\nsessions marked with * are selected, sessions marked with - are skipped.");

    Ok(())
}
