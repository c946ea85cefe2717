//! PLAYCTL - playback session control library
//!
//! Re-exports all modules for use by binary targets.

// Core engine (backend contract, events, session, timers)
pub mod core;

// App modules
pub mod attrs;
pub mod cli;
pub mod config;
pub mod error;
pub mod shell;

// Re-export commonly used types from core
pub use core::backend::{MediaBackend, NetworkState, ReadyState};
pub use core::event_bus::{BusEvent, EventBus, ListenerId};
pub use core::plugins::Registry;
pub use core::session::Session;
pub use core::session_events::{SessionEvent, SessionEventKind};
pub use core::sim_backend::SimBackend;
pub use core::state::{StateFlag, StateFlags};

pub use attrs::{AttrValue, MediaAttribute};
pub use config::SessionOptions;
pub use error::{BackendError, SessionError};
