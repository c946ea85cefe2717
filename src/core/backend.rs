//! Media backend contract.
//!
//! The session never decodes or renders anything. It drives an opaque
//! backend through this trait and listens to the backend's raw event stream.
//!
//! # Threshold contract
//!
//! [`NetworkState`] and [`ReadyState`] mirror the media element readiness
//! enums and their numeric values (0..=3 and 0..=4). Late-init reconciliation
//! compares against these values, so a backend must report them with the same
//! meaning:
//!
//! - `ReadyState::HaveNothing` (0): no metadata yet
//! - `ReadyState::HaveMetadata` (1): duration and dimensions known
//! - `ReadyState::HaveCurrentData` (2): current frame available
//! - `ReadyState::HaveFutureData` (3): current frame plus a little ahead
//! - `ReadyState::HaveEnoughData` (4): can play through at current rate

use crate::attrs::{AttrValue, MediaAttribute};
use crate::core::event_bus::EventBus;
use crate::core::media_events::{MediaEvent, PlayRequestId};
use crate::error::BackendError;
use serde::{Deserialize, Serialize};

/// Network state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkState {
    #[default]
    Empty = 0,
    Idle = 1,
    Loading = 2,
    NoSource = 3,
}

impl NetworkState {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(NetworkState::Empty),
            1 => Some(NetworkState::Idle),
            2 => Some(NetworkState::Loading),
            3 => Some(NetworkState::NoSource),
            _ => None,
        }
    }
}

/// Ready state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReadyState {
    #[default]
    HaveNothing = 0,
    HaveMetadata = 1,
    HaveCurrentData = 2,
    HaveFutureData = 3,
    HaveEnoughData = 4,
}

impl ReadyState {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ReadyState::HaveNothing),
            1 => Some(ReadyState::HaveMetadata),
            2 => Some(ReadyState::HaveCurrentData),
            3 => Some(ReadyState::HaveFutureData),
            4 => Some(ReadyState::HaveEnoughData),
            _ => None,
        }
    }
}

/// Media error reported by the backend. Passed through to listeners as is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaError {
    pub code: MediaErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaErrorCode {
    Aborted = 1,
    Network = 2,
    Decode = 3,
    SrcNotSupported = 4,
}

/// Time ranges
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeRanges {
    ranges: Vec<(f64, f64)>,
}

impl TimeRanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, start: f64, end: f64) {
        self.ranges.push((start, end));
    }

    pub fn length(&self) -> usize {
        self.ranges.len()
    }

    pub fn start(&self, index: usize) -> Option<f64> {
        self.ranges.get(index).map(|(s, _)| *s)
    }

    pub fn end(&self, index: usize) -> Option<f64> {
        self.ranges.get(index).map(|(_, e)| *e)
    }

    /// End of the last range
    pub fn last_end(&self) -> Option<f64> {
        self.ranges.last().map(|(_, e)| *e)
    }
}

/// One candidate source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSource {
    pub src: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl MediaSource {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            mime_type: None,
        }
    }
}

/// Outcome of [`MediaBackend::play`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayRequest {
    /// Playback was started synchronously.
    Started,
    /// The backend settles the request later with [`MediaEvent::PlaySettled`].
    Pending(PlayRequestId),
}

/// Opaque media capability driven by a session.
///
/// Implementations deliver lifecycle events on [`MediaBackend::events`]. Events
/// may be emitted from inside any of the imperative calls below (synchronous
/// backends) or later from the host's loop; the session handles both.
pub trait MediaBackend: Send {
    /// Raw lifecycle event stream.
    fn events(&self) -> &EventBus<MediaEvent>;

    // === Getters ===

    /// Current source URL, empty when none is set.
    fn src(&self) -> String;
    fn sources(&self) -> Vec<MediaSource>;
    fn current_time(&self) -> f64;
    /// Duration in seconds, NaN while unknown.
    fn duration(&self) -> f64;
    fn volume(&self) -> f64;
    fn muted(&self) -> bool;
    fn playback_rate(&self) -> f64;
    fn default_playback_rate(&self) -> f64;
    fn paused(&self) -> bool;
    fn ended(&self) -> bool;
    fn seeking(&self) -> bool;
    fn buffered(&self) -> TimeRanges;
    fn played(&self) -> TimeRanges;
    fn seekable(&self) -> TimeRanges;
    fn network_state(&self) -> NetworkState;
    fn ready_state(&self) -> ReadyState;
    fn error(&self) -> Option<MediaError>;
    fn video_width(&self) -> u32;
    fn video_height(&self) -> u32;
    fn attribute(&self, attr: MediaAttribute) -> Option<AttrValue>;

    // === Setters ===

    fn set_current_time(&mut self, secs: f64) -> Result<(), BackendError>;
    fn set_volume(&mut self, volume: f64) -> Result<(), BackendError>;
    fn set_muted(&mut self, muted: bool) -> Result<(), BackendError>;
    fn set_playback_rate(&mut self, rate: f64) -> Result<(), BackendError>;
    fn set_default_playback_rate(&mut self, rate: f64) -> Result<(), BackendError>;
    fn set_src(&mut self, src: &str) -> Result<(), BackendError>;
    fn set_sources(&mut self, sources: &[MediaSource]) -> Result<(), BackendError>;
    fn set_attribute(&mut self, attr: MediaAttribute, value: &AttrValue) -> Result<(), BackendError>;

    // === Imperative control ===

    fn play(&mut self) -> Result<PlayRequest, BackendError>;
    fn pause(&mut self) -> Result<(), BackendError>;
    fn load(&mut self) -> Result<(), BackendError>;
    /// Drop the source and return to the empty state.
    fn reset(&mut self) -> Result<(), BackendError>;

    // === Capabilities ===

    fn supports_playback_rate(&self) -> bool {
        true
    }

    /// Whether the backend has its own fullscreen mode.
    fn supports_fullscreen(&self) -> bool {
        false
    }

    fn enter_fullscreen(&mut self) -> Result<(), BackendError> {
        Err(BackendError::Unsupported("enter_fullscreen"))
    }

    fn exit_fullscreen(&mut self) -> Result<(), BackendError> {
        Err(BackendError::Unsupported("exit_fullscreen"))
    }

    /// Release backend resources. Called once by the session on disposal.
    fn dispose(&mut self) {}
}
