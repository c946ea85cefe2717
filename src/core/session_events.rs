//! Canonical events re-emitted by a session.
//!
//! Listeners see the same stream whatever backend is underneath. For every
//! event the session state has already been updated when listeners run.

use crate::core::backend::MediaError;
use crate::core::event_bus::BusEvent;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum SessionEvent {
    /// Session finished its deferred setup. Fires exactly once.
    Ready,
    LoadStart,
    LoadedMetadata,
    LoadedData,
    CanPlay,
    CanPlayThrough,
    Play,
    Playing,
    Waiting,
    Seeking,
    Seeked,
    Pause,
    Ended,
    DurationChange {
        duration: f64,
    },
    TimeUpdate {
        #[serde(rename = "currentTime")]
        current_time: f64,
    },
    /// Backend error, passed through unexamined.
    Error {
        error: Option<MediaError>,
    },
    /// First `play` since the current source was set.
    FirstPlay,
    FullscreenChange {
        #[serde(rename = "isFullscreen")]
        is_fullscreen: bool,
    },
    FullscreenError,
    Suspend,
    Abort,
    Emptied,
    Stalled,
    Progress,
    RateChange,
    Resize,
    VolumeChange,
    /// Controls overlay became visible.
    UserActive,
    /// Controls overlay idle window elapsed.
    UserInactive,
    Reset,
    Dispose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionEventKind {
    Ready,
    LoadStart,
    LoadedMetadata,
    LoadedData,
    CanPlay,
    CanPlayThrough,
    Play,
    Playing,
    Waiting,
    Seeking,
    Seeked,
    Pause,
    Ended,
    DurationChange,
    TimeUpdate,
    Error,
    FirstPlay,
    FullscreenChange,
    FullscreenError,
    Suspend,
    Abort,
    Emptied,
    Stalled,
    Progress,
    RateChange,
    Resize,
    VolumeChange,
    UserActive,
    UserInactive,
    Reset,
    Dispose,
}

impl SessionEventKind {
    pub const ALL: [SessionEventKind; 31] = [
        SessionEventKind::Ready,
        SessionEventKind::LoadStart,
        SessionEventKind::LoadedMetadata,
        SessionEventKind::LoadedData,
        SessionEventKind::CanPlay,
        SessionEventKind::CanPlayThrough,
        SessionEventKind::Play,
        SessionEventKind::Playing,
        SessionEventKind::Waiting,
        SessionEventKind::Seeking,
        SessionEventKind::Seeked,
        SessionEventKind::Pause,
        SessionEventKind::Ended,
        SessionEventKind::DurationChange,
        SessionEventKind::TimeUpdate,
        SessionEventKind::Error,
        SessionEventKind::FirstPlay,
        SessionEventKind::FullscreenChange,
        SessionEventKind::FullscreenError,
        SessionEventKind::Suspend,
        SessionEventKind::Abort,
        SessionEventKind::Emptied,
        SessionEventKind::Stalled,
        SessionEventKind::Progress,
        SessionEventKind::RateChange,
        SessionEventKind::Resize,
        SessionEventKind::VolumeChange,
        SessionEventKind::UserActive,
        SessionEventKind::UserInactive,
        SessionEventKind::Reset,
        SessionEventKind::Dispose,
    ];

    /// Event name as listeners know it.
    pub fn name(self) -> &'static str {
        match self {
            SessionEventKind::Ready => "ready",
            SessionEventKind::LoadStart => "loadstart",
            SessionEventKind::LoadedMetadata => "loadedmetadata",
            SessionEventKind::LoadedData => "loadeddata",
            SessionEventKind::CanPlay => "canplay",
            SessionEventKind::CanPlayThrough => "canplaythrough",
            SessionEventKind::Play => "play",
            SessionEventKind::Playing => "playing",
            SessionEventKind::Waiting => "waiting",
            SessionEventKind::Seeking => "seeking",
            SessionEventKind::Seeked => "seeked",
            SessionEventKind::Pause => "pause",
            SessionEventKind::Ended => "ended",
            SessionEventKind::DurationChange => "durationchange",
            SessionEventKind::TimeUpdate => "timeupdate",
            SessionEventKind::Error => "error",
            SessionEventKind::FirstPlay => "firstplay",
            SessionEventKind::FullscreenChange => "fullscreenchange",
            SessionEventKind::FullscreenError => "fullscreenerror",
            SessionEventKind::Suspend => "suspend",
            SessionEventKind::Abort => "abort",
            SessionEventKind::Emptied => "emptied",
            SessionEventKind::Stalled => "stalled",
            SessionEventKind::Progress => "progress",
            SessionEventKind::RateChange => "ratechange",
            SessionEventKind::Resize => "resize",
            SessionEventKind::VolumeChange => "volumechange",
            SessionEventKind::UserActive => "useractive",
            SessionEventKind::UserInactive => "userinactive",
            SessionEventKind::Reset => "reset",
            SessionEventKind::Dispose => "dispose",
        }
    }
}

impl BusEvent for SessionEvent {
    type Kind = SessionEventKind;

    fn kind(&self) -> SessionEventKind {
        match self {
            SessionEvent::Ready => SessionEventKind::Ready,
            SessionEvent::LoadStart => SessionEventKind::LoadStart,
            SessionEvent::LoadedMetadata => SessionEventKind::LoadedMetadata,
            SessionEvent::LoadedData => SessionEventKind::LoadedData,
            SessionEvent::CanPlay => SessionEventKind::CanPlay,
            SessionEvent::CanPlayThrough => SessionEventKind::CanPlayThrough,
            SessionEvent::Play => SessionEventKind::Play,
            SessionEvent::Playing => SessionEventKind::Playing,
            SessionEvent::Waiting => SessionEventKind::Waiting,
            SessionEvent::Seeking => SessionEventKind::Seeking,
            SessionEvent::Seeked => SessionEventKind::Seeked,
            SessionEvent::Pause => SessionEventKind::Pause,
            SessionEvent::Ended => SessionEventKind::Ended,
            SessionEvent::DurationChange { .. } => SessionEventKind::DurationChange,
            SessionEvent::TimeUpdate { .. } => SessionEventKind::TimeUpdate,
            SessionEvent::Error { .. } => SessionEventKind::Error,
            SessionEvent::FirstPlay => SessionEventKind::FirstPlay,
            SessionEvent::FullscreenChange { .. } => SessionEventKind::FullscreenChange,
            SessionEvent::FullscreenError => SessionEventKind::FullscreenError,
            SessionEvent::Suspend => SessionEventKind::Suspend,
            SessionEvent::Abort => SessionEventKind::Abort,
            SessionEvent::Emptied => SessionEventKind::Emptied,
            SessionEvent::Stalled => SessionEventKind::Stalled,
            SessionEvent::Progress => SessionEventKind::Progress,
            SessionEvent::RateChange => SessionEventKind::RateChange,
            SessionEvent::Resize => SessionEventKind::Resize,
            SessionEvent::VolumeChange => SessionEventKind::VolumeChange,
            SessionEvent::UserActive => SessionEventKind::UserActive,
            SessionEvent::UserInactive => SessionEventKind::UserInactive,
            SessionEvent::Reset => SessionEventKind::Reset,
            SessionEvent::Dispose => SessionEventKind::Dispose,
        }
    }
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }
}
