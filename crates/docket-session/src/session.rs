//! Named sessions and the registry that looks them up.

use crate::invocation::Invocation;
use crate::runner::{ProcessRunner, RunError, SessionStatus};

/// Live-reloading documentation builder.
const DOCS_TOOL: &str = "sphinx-autobuild";
/// Documentation source directory, relative to the working directory.
const DOCS_SOURCE_DIR: &str = "source";
/// Build output directory, relative to the working directory.
const DOCS_BUILD_DIR: &str = "build";
const DOCS_PORT: u16 = 8787;

/// A named, parameterless operation backed by one external command.
#[derive(Debug, Clone)]
pub struct Session {
    /// Name used to select the session
    pub name: &'static str,

    /// One-line summary shown when listing sessions
    pub description: &'static str,

    /// Command line handed to the runner
    pub invocation: Invocation,
}

impl Session {
    /// Run the session's command once and return its status unchanged.
    pub async fn run<R>(&self, runner: &R) -> Result<SessionStatus, RunError>
    where
        R: ProcessRunner + ?Sized,
    {
        tracing::info!("Running session {}", self.name);
        tracing::info!("{}", self.invocation);

        let status = runner.run(&self.invocation).await?;

        if status.success() {
            tracing::info!("Session {} was successful.", self.name);
        } else {
            tracing::error!("Session {} failed: {}", self.name, status);
        }

        Ok(status)
    }
}

/// Build the docs and open a browser with hot reloading.
pub fn serve_docs() -> Session {
    Session {
        name: "serve_docs",
        description: "Build the docs and open a browser with hot reloading",
        invocation: Invocation::new(DOCS_TOOL)
            .args([DOCS_SOURCE_DIR, DOCS_BUILD_DIR])
            .arg("--port")
            .arg(DOCS_PORT.to_string())
            .arg("--open-browser"),
    }
}

/// Errors raised when looking up sessions.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Session not found: {0}")]
    UnknownSession(String),
}

/// Sessions in registration order.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Vec<Session>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every session docket ships with.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(serve_docs());
        registry
    }

    /// Add a session. A session with the same name is replaced in place.
    pub fn register(&mut self, session: Session) {
        match self.sessions.iter_mut().find(|s| s.name == session.name) {
            Some(existing) => *existing = session,
            None => self.sessions.push(session),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.iter()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Look up every name, failing on the first unknown one.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<&Session>, RegistryError> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.get(name)
                    .ok_or_else(|| RegistryError::UnknownSession(name.to_string()))
            })
            .collect()
    }
}
