//! Raw events delivered by a media backend.
//!
//! Names follow the media element lifecycle. These carry no state of their
//! own; the session reads whatever it needs from the backend when handling them.

use crate::core::event_bus::BusEvent;
use serde::{Deserialize, Serialize};

/// Identifier of a `play()` request that settles asynchronously.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayRequestId(pub u64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum MediaEvent {
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
    Suspend,
    Abort,
    Emptied,
    Stalled,
    Progress,
    RateChange,
    Resize,
    VolumeChange,
    /// Backend-native fullscreen toggled. `is_fullscreen` is the backend's own
    /// report when it has one.
    FullscreenChange {
        #[serde(default)]
        is_fullscreen: Option<bool>,
    },
    FullscreenError,
    /// A pending `play()` request settled.
    PlaySettled {
        request: PlayRequestId,
        result: Result<(), String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaEventKind {
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
    Suspend,
    Abort,
    Emptied,
    Stalled,
    Progress,
    RateChange,
    Resize,
    VolumeChange,
    FullscreenChange,
    FullscreenError,
    PlaySettled,
}

impl MediaEventKind {
    pub const ALL: [MediaEventKind; 26] = [
        MediaEventKind::LoadStart,
        MediaEventKind::LoadedMetadata,
        MediaEventKind::LoadedData,
        MediaEventKind::CanPlay,
        MediaEventKind::CanPlayThrough,
        MediaEventKind::Play,
        MediaEventKind::Playing,
        MediaEventKind::Waiting,
        MediaEventKind::Seeking,
        MediaEventKind::Seeked,
        MediaEventKind::Pause,
        MediaEventKind::Ended,
        MediaEventKind::DurationChange,
        MediaEventKind::TimeUpdate,
        MediaEventKind::Error,
        MediaEventKind::Suspend,
        MediaEventKind::Abort,
        MediaEventKind::Emptied,
        MediaEventKind::Stalled,
        MediaEventKind::Progress,
        MediaEventKind::RateChange,
        MediaEventKind::Resize,
        MediaEventKind::VolumeChange,
        MediaEventKind::FullscreenChange,
        MediaEventKind::FullscreenError,
        MediaEventKind::PlaySettled,
    ];
}

impl BusEvent for MediaEvent {
    type Kind = MediaEventKind;

    fn kind(&self) -> MediaEventKind {
        match self {
            MediaEvent::LoadStart => MediaEventKind::LoadStart,
            MediaEvent::LoadedMetadata => MediaEventKind::LoadedMetadata,
            MediaEvent::LoadedData => MediaEventKind::LoadedData,
            MediaEvent::CanPlay => MediaEventKind::CanPlay,
            MediaEvent::CanPlayThrough => MediaEventKind::CanPlayThrough,
            MediaEvent::Play => MediaEventKind::Play,
            MediaEvent::Playing => MediaEventKind::Playing,
            MediaEvent::Waiting => MediaEventKind::Waiting,
            MediaEvent::Seeking => MediaEventKind::Seeking,
            MediaEvent::Seeked => MediaEventKind::Seeked,
            MediaEvent::Pause => MediaEventKind::Pause,
            MediaEvent::Ended => MediaEventKind::Ended,
            MediaEvent::DurationChange => MediaEventKind::DurationChange,
            MediaEvent::TimeUpdate => MediaEventKind::TimeUpdate,
            MediaEvent::Error => MediaEventKind::Error,
            MediaEvent::Suspend => MediaEventKind::Suspend,
            MediaEvent::Abort => MediaEventKind::Abort,
            MediaEvent::Emptied => MediaEventKind::Emptied,
            MediaEvent::Stalled => MediaEventKind::Stalled,
            MediaEvent::Progress => MediaEventKind::Progress,
            MediaEvent::RateChange => MediaEventKind::RateChange,
            MediaEvent::Resize => MediaEventKind::Resize,
            MediaEvent::VolumeChange => MediaEventKind::VolumeChange,
            MediaEvent::FullscreenChange { .. } => MediaEventKind::FullscreenChange,
            MediaEvent::FullscreenError => MediaEventKind::FullscreenError,
            MediaEvent::PlaySettled { .. } => MediaEventKind::PlaySettled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trace_entries() {
        let ev: MediaEvent = serde_json::from_str(r#"{"event":"loadedmetadata"}"#).unwrap();
        assert_eq!(ev, MediaEvent::LoadedMetadata);

        let ev: MediaEvent =
            serde_json::from_str(r#"{"event":"fullscreenchange","is_fullscreen":true}"#).unwrap();
        assert_eq!(ev, MediaEvent::FullscreenChange { is_fullscreen: Some(true) });

        let ev: MediaEvent = serde_json::from_str(r#"{"event":"fullscreenchange"}"#).unwrap();
        assert_eq!(ev, MediaEvent::FullscreenChange { is_fullscreen: None });
    }

    #[test]
    fn all_kinds_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for kind in MediaEventKind::ALL {
            assert!(seen.insert(kind));
        }
    }
}
