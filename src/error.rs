//! Error types for session construction and backend calls.
//!
//! Only construction can fail loudly. Everything that happens while events
//! are being handled is absorbed and logged by the session.

/// Errors surfaced to the code that builds or configures a session.
#[derive(Debug)]
pub enum SessionError {
    /// `plugins` option names a plugin the registry does not know.
    UnknownPlugin(String),
    /// A registered plugin failed while initializing.
    Plugin { name: String, message: String },
    /// An option has the wrong shape.
    InvalidOption { key: String, message: String },
    /// Operation attempted on a disposed session.
    Disposed,
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::UnknownPlugin(name) => write!(f, "Plugin {} not exist", name),
            SessionError::Plugin { name, message } => {
                write!(f, "Plugin {} failed to initialize: {}", name, message)
            }
            SessionError::InvalidOption { key, message } => {
                write!(f, "Invalid option '{}': {}", key, message)
            }
            SessionError::Disposed => write!(f, "Session already disposed"),
        }
    }
}

impl std::error::Error for SessionError {}

/// Failure of one imperative call on the media backend.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendError {
    /// The backend does not implement this operation.
    Unsupported(&'static str),
    /// The backend refused the value or the call.
    Rejected { op: &'static str, reason: String },
    /// The call needs data the backend does not have yet.
    NotReady(&'static str),
}

impl BackendError {
    pub fn rejected(op: &'static str, reason: impl Into<String>) -> Self {
        BackendError::Rejected {
            op,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::Unsupported(op) => write!(f, "{} is not supported by the backend", op),
            BackendError::Rejected { op, reason } => write!(f, "{} rejected: {}", op, reason),
            BackendError::NotReady(op) => write!(f, "{} called before the media is ready", op),
        }
    }
}

impl std::error::Error for BackendError {}
