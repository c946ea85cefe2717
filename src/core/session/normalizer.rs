//! Raw event -> canonical event mapping.
//!
//! One handler per raw event kind, looked up in a fixed table. A handler
//! first updates the session flags and only then emits, so listeners always
//! see state that matches the event they receive.

use super::Session;
use crate::core::backend::MediaBackend;
use crate::core::event_bus::BusEvent;
use crate::core::media_events::{MediaEvent, MediaEventKind};
use crate::core::session_events::SessionEvent;
use crate::core::state::StateFlag;
use log::{debug, warn};

type Handler<B> = fn(&mut Session<B>, &MediaEvent);

/// Mapping table.
fn handler<B: MediaBackend>(kind: MediaEventKind) -> Handler<B> {
    match kind {
        MediaEventKind::LoadStart => on_load_start,
        MediaEventKind::Play => on_play,
        MediaEventKind::Waiting => on_waiting,
        MediaEventKind::CanPlay => on_can_play,
        MediaEventKind::CanPlayThrough => on_can_play_through,
        MediaEventKind::Playing => on_playing,
        MediaEventKind::Seeking => on_seeking,
        MediaEventKind::Seeked => on_seeked,
        MediaEventKind::Pause => on_pause,
        MediaEventKind::Ended => on_ended,
        MediaEventKind::DurationChange => on_duration_change,
        MediaEventKind::TimeUpdate => on_time_update,
        MediaEventKind::Error => on_error,
        MediaEventKind::FullscreenChange => on_fullscreen_change,
        MediaEventKind::PlaySettled => on_play_settled,
        MediaEventKind::LoadedMetadata
        | MediaEventKind::LoadedData
        | MediaEventKind::FullscreenError
        | MediaEventKind::Suspend
        | MediaEventKind::Abort
        | MediaEventKind::Emptied
        | MediaEventKind::Stalled
        | MediaEventKind::Progress
        | MediaEventKind::RateChange
        | MediaEventKind::Resize
        | MediaEventKind::VolumeChange => passthrough,
    }
}

/// Run one raw (or synthesized) event through the table.
pub(super) fn apply<B: MediaBackend>(session: &mut Session<B>, event: &MediaEvent) {
    if session.disposed {
        return;
    }
    handler::<B>(event.kind())(session, event);
}

/// Events re-emitted as is, without touching state.
fn passthrough_event(event: &MediaEvent) -> Option<SessionEvent> {
    let mapped = match event {
        MediaEvent::LoadedMetadata => SessionEvent::LoadedMetadata,
        MediaEvent::LoadedData => SessionEvent::LoadedData,
        MediaEvent::FullscreenError => SessionEvent::FullscreenError,
        MediaEvent::Suspend => SessionEvent::Suspend,
        MediaEvent::Abort => SessionEvent::Abort,
        MediaEvent::Emptied => SessionEvent::Emptied,
        MediaEvent::Stalled => SessionEvent::Stalled,
        MediaEvent::Progress => SessionEvent::Progress,
        MediaEvent::RateChange => SessionEvent::RateChange,
        MediaEvent::Resize => SessionEvent::Resize,
        MediaEvent::VolumeChange => SessionEvent::VolumeChange,
        _ => return None,
    };
    Some(mapped)
}

fn passthrough<B: MediaBackend>(session: &mut Session<B>, event: &MediaEvent) {
    match passthrough_event(event) {
        Some(mapped) => session.emit(mapped),
        None => warn!("Session {}: no passthrough for {:?}", session.id, event),
    }
}

fn on_load_start<B: MediaBackend>(session: &mut Session<B>, _: &MediaEvent) {
    session.flags.set(StateFlag::LoadStart);
    session.emit(SessionEvent::LoadStart);
}

fn on_play<B: MediaBackend>(session: &mut Session<B>, _: &MediaEvent) {
    session.flags.clear_all(&[
        StateFlag::LoadStart,
        StateFlag::Ended,
        StateFlag::Paused,
        StateFlag::Error,
        StateFlag::Seeking,
        StateFlag::Waiting,
    ]);
    session.flags.set(StateFlag::Playing);
    session.emit(SessionEvent::Play);

    if session.first_play_armed {
        session.first_play_armed = false;
        session.flags.set(StateFlag::HasStarted);
        debug!("Session {}: first play", session.id);
        session.emit(SessionEvent::FirstPlay);
        session.seed_activity();
    }
}

fn on_waiting<B: MediaBackend>(session: &mut Session<B>, _: &MediaEvent) {
    session.flags.set(StateFlag::Waiting);
    session.emit(SessionEvent::Waiting);
}

fn on_can_play<B: MediaBackend>(session: &mut Session<B>, _: &MediaEvent) {
    session.flags.clear(StateFlag::Waiting);
    session.emit(SessionEvent::CanPlay);
}

fn on_can_play_through<B: MediaBackend>(session: &mut Session<B>, _: &MediaEvent) {
    session.flags.clear(StateFlag::Waiting);
    session.emit(SessionEvent::CanPlayThrough);
}

fn on_playing<B: MediaBackend>(session: &mut Session<B>, _: &MediaEvent) {
    session.flags.clear_all(&[StateFlag::Waiting, StateFlag::LoadStart]);
    session.emit(SessionEvent::Playing);
}

fn on_seeking<B: MediaBackend>(session: &mut Session<B>, _: &MediaEvent) {
    session.flags.set(StateFlag::Seeking);
    session.emit(SessionEvent::Seeking);
}

fn on_seeked<B: MediaBackend>(session: &mut Session<B>, _: &MediaEvent) {
    session.flags.clear(StateFlag::Seeking);
    session.emit(SessionEvent::Seeked);
}

fn on_pause<B: MediaBackend>(session: &mut Session<B>, _: &MediaEvent) {
    session.flags.set(StateFlag::Paused);
    session.emit(SessionEvent::Pause);
}

/// With the `loop` option the session restarts playback itself; the
/// restart's own `play` follows `ended` with no pause in between.
fn on_ended<B: MediaBackend>(session: &mut Session<B>, _: &MediaEvent) {
    session.flags.set(StateFlag::Ended);

    if session.options.loop_playback {
        if let Err(e) = session.backend.set_current_time(0.0) {
            warn!("Session {}: loop rewind failed: {}", session.id, e);
        }
        session.start_play();
    } else if !session.backend.paused() {
        session.pause_backend();
    }

    session.emit(SessionEvent::Ended);
}

fn on_duration_change<B: MediaBackend>(session: &mut Session<B>, _: &MediaEvent) {
    let duration = session.backend.duration();
    session.emit(SessionEvent::DurationChange { duration });
}

fn on_time_update<B: MediaBackend>(session: &mut Session<B>, _: &MediaEvent) {
    let current_time = session.backend.current_time();
    session.emit(SessionEvent::TimeUpdate { current_time });
}

fn on_error<B: MediaBackend>(session: &mut Session<B>, _: &MediaEvent) {
    session.flags.clear(StateFlag::Playing);
    session.flags.set(StateFlag::Error);
    let error = session.backend.error();
    warn!("Session {}: media error {:?}", session.id, error);
    session.emit(SessionEvent::Error { error });
}

fn on_fullscreen_change<B: MediaBackend>(session: &mut Session<B>, event: &MediaEvent) {
    let reported = match event {
        MediaEvent::FullscreenChange { is_fullscreen } => *is_fullscreen,
        _ => None,
    };
    session.fullscreen_changed(reported);
}

fn on_play_settled<B: MediaBackend>(session: &mut Session<B>, event: &MediaEvent) {
    if let MediaEvent::PlaySettled { request, result } = event {
        session.settle_play(*request, result);
    }
}
