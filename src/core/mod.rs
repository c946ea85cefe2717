//! Core engine modules - backend contract, events, session, timers
//!
//! These modules form the playback control layer, independent of any UI.

pub mod activity;
pub mod backend;
pub mod clock;
pub mod event_bus;
pub mod fullscreen;
pub mod idle_timer;
pub mod media_events;
pub mod plugins;
pub mod reconciler;
pub mod session;
pub mod session_events;
pub mod sim_backend;
pub mod state;

// Re-exports for convenience
pub use activity::{ActivityTracker, InteractionTarget};
pub use backend::{MediaBackend, MediaError, MediaSource, NetworkState, ReadyState};
pub use clock::{Clock, ManualClock, SystemClock};
pub use event_bus::EventBus;
pub use fullscreen::{FullscreenApi, FullscreenCoordinator};
pub use idle_timer::IdleTimer;
pub use media_events::{MediaEvent, MediaEventKind};
pub use plugins::{Registry, Widget};
pub use session::Session;
pub use session_events::{SessionEvent, SessionEventKind};
pub use sim_backend::SimBackend;
pub use state::{StateFlag, StateFlags};
