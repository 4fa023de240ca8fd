//! Process runners.
//!
//! [`SystemRunner`] spawns a real child process and waits for it. The
//! [`ProcessRunner`] trait exists so sessions can be driven by a stub in
//! tests.

use std::fmt;
use std::io;
use std::process::ExitStatus;

use async_trait::async_trait;
use tokio::process::Command;

use crate::invocation::Invocation;

/// How a session's process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// The process exited with this code.
    Exited(i32),

    /// The process was killed by this signal without an operator interrupt.
    Signaled(i32),

    /// The operator interrupted the run. Treated as a normal shutdown.
    Interrupted,
}

impl SessionStatus {
    /// The code a shell would report for this status.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Exited(code) => code,
            Self::Signaled(signal) => 128 + signal,
            Self::Interrupted => 0,
        }
    }

    pub fn success(self) -> bool {
        self.exit_code() == 0
    }

    fn from_exit_status(status: ExitStatus, interrupted: bool) -> Self {
        if interrupted {
            return Self::Interrupted;
        }
        if let Some(code) = status.code() {
            return Self::Exited(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Self::Signaled(signal);
            }
        }
        Self::Exited(1)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "exit code {}", code),
            Self::Signaled(signal) => write!(f, "killed by signal {}", signal),
            Self::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// Errors raised before a process status is available.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Program {program} not found")]
    ProgramNotFound { program: String },

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl RunError {
    /// Exit code following shell conventions: 127 for a missing command,
    /// 126 for one that could not be executed.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ProgramNotFound { .. } => 127,
            Self::Spawn { .. } => 126,
            Self::Wait { .. } => 1,
        }
    }
}

/// Executes an [`Invocation`] and reports how it ended.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> Result<SessionStatus, RunError>;
}

/// Runs invocations as child processes of the current process.
///
/// The child inherits the working directory, environment and stdio.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> Result<SessionStatus, RunError> {
        let program = invocation.program();

        match which::which(program) {
            Ok(resolved) => tracing::debug!("Resolved {} to {}", program, resolved.display()),
            Err(e) => tracing::debug!("{} not resolved on PATH: {}", program, e),
        }

        // Spawn decides: a missing program is NotFound, one that exists but
        // cannot be executed is PermissionDenied.
        let mut child = Command::new(program)
            .args(invocation.arguments())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => RunError::ProgramNotFound {
                    program: program.to_string(),
                },
                _ => RunError::Spawn {
                    program: program.to_string(),
                    source: e,
                },
            })?;

        // First Ctrl-C is passed on to the child, the second kills it.
        let mut interrupts = 0u32;
        let mut listen = true;
        let status = loop {
            tokio::select! {
                status = child.wait() => {
                    break status.map_err(|e| RunError::Wait {
                        program: program.to_string(),
                        source: e,
                    })?;
                }
                signal = tokio::signal::ctrl_c(), if listen => {
                    if let Err(e) = signal {
                        tracing::warn!("Cannot listen for Ctrl-C: {}", e);
                        listen = false;
                        continue;
                    }
                    interrupts += 1;
                    if interrupts == 1 {
                        tracing::info!("Interrupted, waiting for {} to exit", program);
                        forward_interrupt(&child);
                    } else {
                        tracing::warn!("Interrupted again, killing {}", program);
                        if let Err(e) = child.start_kill() {
                            tracing::warn!("Failed to kill {}: {}", program, e);
                        }
                    }
                }
            }
        };

        Ok(SessionStatus::from_exit_status(status, interrupts > 0))
    }
}

/// Send SIGINT to the child. A terminal Ctrl-C already reaches it through
/// the process group, a signal aimed at docket alone does not.
#[cfg(unix)]
fn forward_interrupt(child: &tokio::process::Child) {
    // `id` is None once the child has been reaped.
    let Some(pid) = child.id() else {
        return;
    };
    // SAFETY: signalling a PID taken from our own un-reaped Child.
    let ret = unsafe { libc::kill(pid as libc::pid_t, libc::SIGINT) };
    if ret != 0 {
        tracing::warn!(
            "Failed to forward interrupt to {}: {}",
            pid,
            io::Error::last_os_error()
        );
    }
}

#[cfg(not(unix))]
fn forward_interrupt(_child: &tokio::process::Child) {}
