//! Named sessions for the docket task runner.
//!
//! A session is a parameterless operation that hands a fixed command line to
//! an external program and reports that program's exit status as its own.

pub mod invocation;
pub mod runner;
pub mod session;

pub use invocation::Invocation;
pub use runner::{ProcessRunner, RunError, SessionStatus, SystemRunner};
pub use session::{serve_docs, RegistryError, Session, SessionRegistry};
