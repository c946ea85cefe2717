use super::*;
use crate::core::backend::MediaErrorCode;
use crate::core::clock::ManualClock;
use crate::core::fullscreen::{FullscreenMechanism, SimFullscreenApi};
use crate::core::plugins::StubWidget;
use crate::core::sim_backend::SimBackend;
use std::sync::atomic::Ordering;

type Log = Arc<Mutex<Vec<SessionEvent>>>;

struct Harness {
    session: Session<SimBackend>,
    log: Log,
    clock: ManualClock,
    api: SimFullscreenApi,
}

impl Harness {
    fn new(backend: SimBackend, options: SessionOptions) -> Self {
        Self::with(backend, options, Registry::with_default_widgets(), false)
    }

    fn with(backend: SimBackend, options: SessionOptions, registry: Registry<SimBackend>, native_fs: bool) -> Self {
        let clock = ManualClock::new();
        let api = SimFullscreenApi::new(native_fs);
        let session = Session::with_env(
            backend,
            options,
            Arc::new(registry),
            Box::new(api.clone()),
            Arc::new(clock.clone()),
        )
        .unwrap();
        let log = record(&session);
        Self {
            session,
            log,
            clock,
            api,
        }
    }

    /// Playable session, ready checkpoint passed, log cleared.
    fn playable(options: SessionOptions) -> Self {
        let backend = SimBackend::preloaded("a.mp4", NetworkState::Idle, ReadyState::HaveEnoughData);
        let mut h = Self::new(backend, options);
        h.session.pump();
        h.clear();
        h
    }

    fn names(&self) -> Vec<&'static str> {
        self.log.lock().unwrap().iter().map(|e| e.name()).collect()
    }

    fn count(&self, name: &str) -> usize {
        self.names().iter().filter(|n| **n == name).count()
    }

    fn clear(&self) {
        self.log.lock().unwrap().clear();
    }

    fn inject(&mut self, event: MediaEvent) {
        self.session.backend().inject(event);
        self.session.pump();
    }
}

fn record(session: &Session<SimBackend>) -> Log {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    for kind in SessionEventKind::ALL {
        let l = Arc::clone(&log);
        session.on(kind, move |e| l.lock().unwrap().push(e.clone()));
    }
    log
}

fn options_with_src(src: &str) -> SessionOptions {
    SessionOptions {
        src: Some(src.to_string()),
        ..Default::default()
    }
}

// ========== Ready checkpoint / late init ==========

#[test]
fn ready_fires_once_on_first_pump() {
    let mut h = Harness::new(SimBackend::new(), SessionOptions::default());
    assert!(!h.session.is_ready());
    assert!(h.names().is_empty());

    h.session.pump();
    h.session.pump();
    assert!(h.session.is_ready());
    assert_eq!(h.names(), vec!["ready"]);
}

#[test]
fn late_init_at_enough_data_synthesizes_full_sequence_once() {
    let backend = SimBackend::preloaded("a.mp4", NetworkState::Idle, ReadyState::HaveEnoughData);
    let mut h = Harness::new(backend, SessionOptions::default());

    h.session.pump();
    h.session.pump();
    assert_eq!(
        h.names(),
        vec!["loadstart", "loadedmetadata", "loadeddata", "canplay", "canplaythrough", "ready"]
    );
    assert!(h.session.has_flag(StateFlag::LoadStart));
}

#[test]
fn late_init_thresholds() {
    let cases = [
        (ReadyState::HaveMetadata, vec!["loadstart", "loadedmetadata", "ready"]),
        (ReadyState::HaveCurrentData, vec!["loadstart", "loadedmetadata", "loadeddata", "ready"]),
        (
            ReadyState::HaveFutureData,
            vec!["loadstart", "loadedmetadata", "loadeddata", "canplay", "ready"],
        ),
    ];
    for (ready, expected) in cases {
        let backend = SimBackend::preloaded("a.mp4", NetworkState::Loading, ready);
        let mut h = Harness::new(backend, SessionOptions::default());
        h.session.pump();
        assert_eq!(h.names(), expected, "{:?}", ready);
    }
}

#[test]
fn late_init_skipped_without_source() {
    for network in [NetworkState::Empty, NetworkState::NoSource] {
        let backend = SimBackend::preloaded("", network, ReadyState::HaveNothing);
        let mut h = Harness::new(backend, SessionOptions::default());
        h.session.pump();
        assert_eq!(h.names(), vec!["ready"]);
    }
}

#[test]
fn late_init_synthesizes_loadstart_when_none_arrives() {
    let backend = SimBackend::preloaded("a.mp4", NetworkState::Loading, ReadyState::HaveNothing);
    let mut h = Harness::new(backend, SessionOptions::default());
    h.session.pump();
    assert_eq!(h.names(), vec!["loadstart", "ready"]);
}

#[test]
fn live_loadstart_before_ready_is_not_duplicated() {
    let backend = SimBackend::preloaded("a.mp4", NetworkState::Loading, ReadyState::HaveNothing);
    let mut h = Harness::new(backend, SessionOptions::default());

    h.inject(MediaEvent::LoadStart);
    h.session.pump();
    assert_eq!(h.count("loadstart"), 1);
    assert_eq!(h.names(), vec!["loadstart", "ready"]);
}

#[test]
fn live_metadata_before_ready_keeps_order() {
    let backend = SimBackend::preloaded("a.mp4", NetworkState::Loading, ReadyState::HaveNothing);
    let mut h = Harness::new(backend, SessionOptions::default());

    h.session.backend().inject(MediaEvent::LoadedMetadata);
    h.session.pump();
    assert_eq!(h.names(), vec!["loadstart", "loadedmetadata", "ready"]);
}

#[test]
fn existing_backend_error_is_refired_at_ready() {
    let error = MediaError {
        code: MediaErrorCode::Network,
        message: "connection reset".to_string(),
    };
    let backend = SimBackend::preloaded("a.mp4", NetworkState::Idle, ReadyState::HaveMetadata)
        .with_error(error.clone());
    let mut h = Harness::new(backend, SessionOptions::default());
    h.session.pump();

    assert_eq!(h.names(), vec!["loadstart", "loadedmetadata", "error", "ready"]);
    assert!(h.session.has_flag(StateFlag::Error));
    let log = h.log.lock().unwrap();
    assert_eq!(log[2], SessionEvent::Error { error: Some(error) });
}

#[test]
fn control_calls_before_ready_do_not_overtake_late_init() {
    let backend = SimBackend::preloaded("a.mp4", NetworkState::Idle, ReadyState::HaveEnoughData);
    let mut h = Harness::new(backend, SessionOptions::default());

    // Reaches the ready checkpoint but never the backend
    h.session.play();
    assert_eq!(h.session.backend().call_count("play"), 0);
    assert_eq!(
        h.names(),
        vec!["loadstart", "loadedmetadata", "loadeddata", "canplay", "canplaythrough", "ready"]
    );

    h.session.play();
    assert_eq!(h.session.backend().call_count("play"), 1);
    let names = h.names();
    let loadstart = names.iter().position(|n| *n == "loadstart").unwrap();
    let play = names.iter().position(|n| *n == "play").unwrap();
    assert!(loadstart < play);
    assert!(!h.session.has_flag(StateFlag::LoadStart));
    assert!(h.session.has_flag(StateFlag::Playing));
}

#[test]
fn interaction_before_ready_does_not_resume() {
    let backend = SimBackend::preloaded("a.mp4", NetworkState::Idle, ReadyState::HaveEnoughData);
    let mut h = Harness::new(backend, SessionOptions::default());

    h.session.interact(InteractionTarget::Surface);
    assert_eq!(h.session.backend().call_count("play"), 0);
    assert!(h.session.is_ready());
    assert!(h.session.backend().paused());
    assert!(!h.session.has_flag(StateFlag::Playing));
}

// ========== Source option scenario ==========

#[test]
fn play_before_source_is_applied_is_a_noop() {
    let mut h = Harness::new(SimBackend::new(), options_with_src("a.mp4"));
    assert_eq!(h.session.src(), "");

    h.session.play();
    assert_eq!(h.session.backend().call_count("play"), 0);
    assert!(h.session.has_flag(StateFlag::Paused));
    // The same call reached the ready checkpoint, which applied the source
    assert_eq!(h.session.src(), "a.mp4");
    assert_eq!(h.names(), vec!["ready", "loadstart"]);

    h.session.backend_mut().advance_to(ReadyState::HaveFutureData);
    h.session.pump();
    h.session.play();

    assert_eq!(h.session.backend().call_count("play"), 1);
    assert!(h.session.has_flag(StateFlag::Playing));
    assert!(!h.session.has_flag(StateFlag::Paused));
    assert_eq!(h.count("play"), 1);
}

#[test]
fn source_list_option_is_applied() {
    let mut options = SessionOptions::default();
    options.source = vec![MediaSource {
        src: "a.m3u8".to_string(),
        mime_type: Some("application/x-mpegURL".to_string()),
    }];
    let mut h = Harness::new(SimBackend::new(), options);
    h.session.pump();
    assert_eq!(h.session.sources().len(), 1);
    assert_eq!(h.session.src(), "a.m3u8");
}

// ========== Normalizer ==========

#[test]
fn playing_and_paused_never_coexist() {
    let mut h = Harness::playable(SessionOptions::default());
    let sequence = [
        MediaEvent::Play,
        MediaEvent::Waiting,
        MediaEvent::Playing,
        MediaEvent::Pause,
        MediaEvent::Seeking,
        MediaEvent::Play,
        MediaEvent::Seeked,
        MediaEvent::Error,
        MediaEvent::Play,
        MediaEvent::Ended,
        MediaEvent::Pause,
        MediaEvent::Play,
        MediaEvent::Pause,
        MediaEvent::Pause,
        MediaEvent::Playing,
    ];
    for event in sequence {
        h.inject(event.clone());
        let flags = h.session.flags();
        assert!(
            !(flags.has(StateFlag::Playing) && flags.has(StateFlag::Paused)),
            "after {:?}: {}",
            event,
            flags
        );
    }
}

#[test]
fn waiting_cleared_by_canplay_and_playing() {
    let mut h = Harness::playable(SessionOptions::default());

    h.inject(MediaEvent::Waiting);
    assert!(h.session.has_flag(StateFlag::Waiting));
    h.inject(MediaEvent::CanPlay);
    assert!(!h.session.has_flag(StateFlag::Waiting));

    h.inject(MediaEvent::Waiting);
    h.inject(MediaEvent::Playing);
    assert!(!h.session.has_flag(StateFlag::Waiting));

    h.inject(MediaEvent::Waiting);
    h.inject(MediaEvent::CanPlayThrough);
    assert!(!h.session.has_flag(StateFlag::Waiting));
}

#[test]
fn ended_cleared_only_by_play() {
    let mut h = Harness::playable(SessionOptions::default());

    h.inject(MediaEvent::Ended);
    for event in [
        MediaEvent::Pause,
        MediaEvent::Seeking,
        MediaEvent::Seeked,
        MediaEvent::CanPlay,
        MediaEvent::Playing,
        MediaEvent::TimeUpdate,
    ] {
        h.inject(event);
        assert!(h.session.has_flag(StateFlag::Ended));
    }
    h.inject(MediaEvent::Play);
    assert!(!h.session.has_flag(StateFlag::Ended));
}

#[test]
fn error_clears_playing() {
    let mut h = Harness::playable(SessionOptions::default());
    h.inject(MediaEvent::Play);
    h.inject(MediaEvent::Error);

    assert!(!h.session.has_flag(StateFlag::Playing));
    assert!(h.session.has_flag(StateFlag::Error));
    assert_eq!(h.log.lock().unwrap().last(), Some(&SessionEvent::Error { error: None }));
}

#[test]
fn unmapped_events_pass_through() {
    let mut h = Harness::playable(SessionOptions::default());
    let before = h.session.flags();
    for event in [
        MediaEvent::Suspend,
        MediaEvent::Abort,
        MediaEvent::Emptied,
        MediaEvent::Stalled,
        MediaEvent::Progress,
        MediaEvent::RateChange,
        MediaEvent::Resize,
        MediaEvent::VolumeChange,
    ] {
        h.inject(event);
    }
    assert_eq!(
        h.names(),
        vec!["suspend", "abort", "emptied", "stalled", "progress", "ratechange", "resize", "volumechange"]
    );
    assert_eq!(h.session.flags(), before);
}

#[test]
fn payloads_read_from_backend() {
    let backend = SimBackend::new().with_duration(42.0);
    let mut h = Harness::new(backend, options_with_src("a.mp4"));
    h.session.pump();
    h.session.backend_mut().advance_to(ReadyState::HaveMetadata);
    h.session.pump();
    h.session.set_current_time(7.5);

    let log = h.log.lock().unwrap();
    assert!(log.contains(&SessionEvent::DurationChange { duration: 42.0 }));
    assert!(log.contains(&SessionEvent::TimeUpdate { current_time: 7.5 }));
}

#[test]
fn seeking_flag_follows_seek() {
    let mut h = Harness::playable(SessionOptions::default());
    h.session.set_current_time(10.0);
    assert!(!h.session.has_flag(StateFlag::Seeking));
    assert_eq!(h.names(), vec!["seeking", "timeupdate", "seeked"]);
    assert_eq!(h.session.current_time(), 10.0);
}

// ========== Ended / loop ==========

#[test]
fn ended_with_loop_restarts_without_pause() {
    let backend = SimBackend::preloaded("a.mp4", NetworkState::Idle, ReadyState::HaveEnoughData)
        .with_native_loop(false);
    let options = SessionOptions {
        loop_playback: true,
        ..Default::default()
    };
    let mut h = Harness::new(backend, options);
    h.session.pump();
    h.session.play();
    h.clear();

    h.session.backend_mut().finish();
    h.session.pump();

    let names = h.names();
    let ended = names.iter().position(|n| *n == "ended").unwrap();
    let play = names.iter().position(|n| *n == "play").unwrap();
    assert!(ended < play);
    assert!(!names.contains(&"pause"));
    assert!(h.session.has_flag(StateFlag::Playing));
    assert!(!h.session.has_flag(StateFlag::Paused));
    assert!(!h.session.has_flag(StateFlag::Ended));
    assert_eq!(h.session.current_time(), 0.0);
    // Loop restart is not a first play
    assert_eq!(h.count("firstplay"), 0);
}

#[test]
fn loop_option_reaches_backend_attribute() {
    let options = SessionOptions {
        loop_playback: true,
        ..Default::default()
    };
    let h = Harness::new(SimBackend::new(), options);
    assert_eq!(
        h.session.backend().attribute(MediaAttribute::Loop),
        Some(AttrValue::Bool(true))
    );
}

#[test]
fn ended_without_loop_pauses() {
    let mut h = Harness::playable(SessionOptions::default());
    h.session.play();
    h.clear();

    h.session.backend_mut().finish();
    h.session.pump();

    assert_eq!(h.names(), vec!["timeupdate", "ended", "timeupdate", "pause"]);
    assert!(h.session.has_flag(StateFlag::Ended));
    assert!(h.session.has_flag(StateFlag::Paused));
    assert!(!h.session.has_flag(StateFlag::Playing));
}

// ========== First play ==========

#[test]
fn firstplay_once_per_source() {
    let mut h = Harness::playable(SessionOptions::default());

    h.session.play();
    h.session.pause();
    h.session.play();
    assert_eq!(h.count("firstplay"), 1);
    assert!(h.session.has_flag(StateFlag::HasStarted));

    h.session.set_src("b.mp4");
    assert!(!h.session.has_flag(StateFlag::HasStarted));
    h.session.backend_mut().advance_to(ReadyState::HaveEnoughData);
    h.session.pump();
    h.session.play();
    assert_eq!(h.count("firstplay"), 2);

    let names = h.names();
    let play = names.iter().position(|n| *n == "play").unwrap();
    let first = names.iter().position(|n| *n == "firstplay").unwrap();
    assert!(play < first);
}

#[test]
fn same_src_is_noop() {
    let mut h = Harness::playable(SessionOptions::default());
    h.session.set_src("a.mp4");
    assert_eq!(h.session.backend().call_count("set_src"), 0);
}

#[test]
fn src_change_pauses_first() {
    let mut h = Harness::playable(SessionOptions::default());
    h.session.play();
    h.session.set_src("b.mp4");

    let calls = h.session.backend().calls();
    let pause = calls.iter().position(|c| c == "pause").unwrap();
    let set = calls.iter().position(|c| c == "set_src b.mp4").unwrap();
    assert!(pause < set);
}

// ========== Controls overlay ==========

fn timed(timeout_ms: u64) -> Harness {
    let options = SessionOptions {
        active_timeout_ms: timeout_ms,
        ..Default::default()
    };
    Harness::playable(options)
}

#[test]
fn first_play_seeds_active_burst() {
    let mut h = timed(3000);
    h.session.play();
    assert!(h.session.is_user_active());
    assert_eq!(h.count("useractive"), 1);

    h.clock.advance_ms(2999);
    h.session.tick();
    assert!(h.session.is_user_active());

    h.clock.advance_ms(1);
    h.session.tick();
    assert!(!h.session.is_user_active());
    assert_eq!(h.count("userinactive"), 1);
}

#[test]
fn repeated_interaction_keeps_overlay_active() {
    let mut h = timed(1000);
    h.session.play();

    for _ in 0..5 {
        h.clock.advance_ms(600);
        h.session.interact(InteractionTarget::Control);
        h.session.tick();
        assert!(h.session.is_user_active());
    }
    assert_eq!(h.count("userinactive"), 0);

    h.clock.advance_ms(999);
    h.session.tick();
    assert!(h.session.is_user_active());
    h.clock.advance_ms(1);
    h.session.tick();
    h.session.tick();
    assert!(!h.session.is_user_active());
    assert_eq!(h.count("userinactive"), 1);
    assert_eq!(h.count("useractive"), 1);
}

#[test]
fn surface_interaction_toggles() {
    let mut h = timed(3000);
    h.session.play();
    assert!(h.session.is_user_active());

    h.session.interact(InteractionTarget::Surface);
    assert!(!h.session.is_user_active());
    h.session.interact(InteractionTarget::Surface);
    assert!(h.session.is_user_active());
    assert_eq!(h.names().iter().filter(|n| n.starts_with("user")).count(), 3);
}

#[test]
fn control_interaction_while_hidden_stays_hidden() {
    let mut h = timed(3000);
    h.session.play();
    h.clock.advance_ms(3000);
    h.session.tick();
    assert!(!h.session.is_user_active());

    h.session.interact(InteractionTarget::Control);
    assert!(!h.session.is_user_active());
}

#[test]
fn tap_resumes_paused_session() {
    let mut h = timed(3000);
    assert!(h.session.paused());

    h.session.interact(InteractionTarget::Surface);
    assert_eq!(h.session.backend().call_count("play"), 1);
    assert!(h.session.has_flag(StateFlag::Playing));
    assert!(h.session.is_user_active());
}

// ========== Fullscreen ==========

#[test]
fn full_window_fallback_emits_immediately() {
    let mut h = Harness::playable(SessionOptions::default());

    h.session.request_fullscreen();
    assert!(h.session.is_fullscreen());
    assert!(h.session.fullscreen().is_full_window());
    h.session.exit_fullscreen();

    assert!(!h.session.is_fullscreen());
    assert!(!h.session.fullscreen().is_full_window());
    let log = h.log.lock().unwrap();
    assert_eq!(
        *log,
        vec![
            SessionEvent::FullscreenChange { is_fullscreen: true },
            SessionEvent::FullscreenChange { is_fullscreen: false },
        ]
    );
}

#[test]
fn native_fullscreen_waits_for_platform() {
    let backend = SimBackend::preloaded("a.mp4", NetworkState::Idle, ReadyState::HaveEnoughData);
    let mut h = Harness::with(backend, SessionOptions::default(), Registry::new(), true);
    h.session.pump();
    h.clear();

    h.session.request_fullscreen();
    assert!(h.session.is_fullscreen());
    assert!(h.session.fullscreen().has_adjust_marker());
    assert!(h.names().is_empty());

    h.session.notify_fullscreen_change(None);
    h.session.exit_fullscreen();
    h.session.notify_fullscreen_change(None);

    assert_eq!(h.api.requests(), 1);
    assert_eq!(h.api.exits(), 1);
    assert!(!h.session.fullscreen().has_adjust_marker());
    let log = h.log.lock().unwrap();
    assert_eq!(
        *log,
        vec![
            SessionEvent::FullscreenChange { is_fullscreen: true },
            SessionEvent::FullscreenChange { is_fullscreen: false },
        ]
    );
}

#[test]
fn backend_fullscreen_reports_through_raw_events() {
    let backend = SimBackend::preloaded("a.mp4", NetworkState::Idle, ReadyState::HaveEnoughData)
        .with_native_fullscreen(true);
    let mut h = Harness::new(backend, SessionOptions::default());
    h.session.pump();
    h.clear();

    h.session.request_fullscreen();
    assert_eq!(
        h.session.fullscreen().active_mechanism(),
        Some(FullscreenMechanism::Backend)
    );
    h.session.exit_fullscreen();

    assert!(!h.session.backend().in_fullscreen());
    assert_eq!(h.names(), vec!["fullscreenchange", "fullscreenchange"]);
    assert!(!h.session.is_fullscreen());
}

#[test]
fn request_then_exit_leaves_no_marker_for_any_mechanism() {
    for (native, backend_fs) in [(true, false), (false, true), (false, false)] {
        let backend = SimBackend::preloaded("a.mp4", NetworkState::Idle, ReadyState::HaveEnoughData)
            .with_native_fullscreen(backend_fs);
        let mut h = Harness::with(backend, SessionOptions::default(), Registry::new(), native);
        h.session.pump();

        h.session.request_fullscreen();
        h.session.exit_fullscreen();
        assert!(!h.session.is_fullscreen());
        assert!(!h.session.fullscreen().has_adjust_marker());
        assert!(!h.session.fullscreen().is_full_window());
    }
}

#[test]
fn escape_from_native_fullscreen_clears_marker() {
    let backend = SimBackend::preloaded("a.mp4", NetworkState::Idle, ReadyState::HaveEnoughData);
    let mut h = Harness::with(backend, SessionOptions::default(), Registry::new(), true);
    h.session.pump();
    h.session.request_fullscreen();
    h.session.notify_fullscreen_change(None);

    h.api.set_fullscreen(false);
    h.session.notify_fullscreen_change(None);

    assert!(!h.session.is_fullscreen());
    assert!(!h.session.fullscreen().has_adjust_marker());
    assert_eq!(
        h.log.lock().unwrap().last(),
        Some(&SessionEvent::FullscreenChange { is_fullscreen: false })
    );
}

#[test]
fn fullscreen_error_is_reemitted() {
    let mut h = Harness::playable(SessionOptions::default());
    h.inject(MediaEvent::FullscreenError);
    assert_eq!(h.names(), vec!["fullscreenerror"]);
}

// ========== Play intent ==========

fn deferred() -> Harness {
    let backend = SimBackend::preloaded("a.mp4", NetworkState::Idle, ReadyState::HaveEnoughData)
        .with_deferred_play(true);
    let mut h = Harness::new(backend, SessionOptions::default());
    h.session.pump();
    h.clear();
    h
}

#[test]
fn pending_play_coalesces_and_honours_last_pause() {
    let mut h = deferred();

    h.session.play();
    h.session.play();
    h.session.pause();
    assert_eq!(h.session.backend().call_count("play"), 1);
    assert_eq!(h.session.backend().call_count("pause"), 0);

    let request = h.session.backend().pending_plays()[0];
    h.session.backend_mut().settle_play(request, Ok(()));
    h.session.pump();

    assert_eq!(h.session.backend().call_count("pause"), 1);
    assert!(h.session.has_flag(StateFlag::Paused));
    assert!(!h.session.has_flag(StateFlag::Playing));
    assert_eq!(h.names().last(), Some(&"pause"));
}

#[test]
fn pending_play_last_call_wins() {
    let mut h = deferred();

    h.session.play();
    h.session.pause();
    h.session.play();

    let request = h.session.backend().pending_plays()[0];
    h.session.backend_mut().settle_play(request, Ok(()));
    h.session.pump();

    assert_eq!(h.session.backend().call_count("pause"), 0);
    assert!(h.session.has_flag(StateFlag::Playing));
}

#[test]
fn rejected_play_is_absorbed() {
    let mut h = deferred();

    h.session.play();
    let request = h.session.backend().pending_plays()[0];
    h.session
        .backend_mut()
        .settle_play(request, Err("NotAllowedError".to_string()));
    h.session.pump();

    assert!(h.session.has_flag(StateFlag::Paused));
    assert!(h.names().is_empty());

    // Intent cleared: the next play goes to the backend again
    h.session.play();
    assert_eq!(h.session.backend().call_count("play"), 2);
}

// ========== Accessors ==========

#[test]
fn rejected_rate_leaves_state_unchanged() {
    let mut h = Harness::playable(SessionOptions::default());
    h.session.set_playback_rate(100.0);
    assert_eq!(h.session.playback_rate(), 1.0);
    assert!(h.names().is_empty());

    h.session.set_playback_rate(2.0);
    assert_eq!(h.session.playback_rate(), 2.0);
    assert_eq!(h.names(), vec!["ratechange"]);
}

#[test]
fn rate_defaults_without_backend_support() {
    let backend = SimBackend::preloaded("a.mp4", NetworkState::Idle, ReadyState::HaveEnoughData)
        .with_rate_support(false);
    let mut h = Harness::new(backend, SessionOptions::default());
    h.session.set_playback_rate(2.0);
    h.session.set_default_playback_rate(2.0);
    assert_eq!(h.session.playback_rate(), 1.0);
    assert_eq!(h.session.default_playback_rate(), 1.0);
}

#[test]
fn volume_is_clamped() {
    let mut h = Harness::playable(SessionOptions::default());
    h.session.set_volume(1.7);
    assert_eq!(h.session.volume(), 1.0);
    h.session.set_volume(-0.2);
    assert_eq!(h.session.volume(), 0.0);
    h.session.set_volume(f64::NAN);
    assert_eq!(h.session.volume(), 0.0);
    assert_eq!(h.names(), vec!["volumechange"]);
}

#[test]
fn control_calls_without_source_are_noops() {
    let mut h = Harness::new(SimBackend::new(), SessionOptions::default());
    h.session.play();
    h.session.pause();
    h.session.load();
    h.session.reset();
    h.session.set_current_time(3.0);
    h.session.retry();

    assert!(h.session.backend().calls().is_empty());
    assert_eq!(h.names(), vec!["ready"]);
}

#[test]
fn read_only_accessors() {
    let backend = SimBackend::preloaded("a.mp4", NetworkState::Idle, ReadyState::HaveEnoughData)
        .with_duration(30.0);
    let mut h = Harness::new(backend, SessionOptions::default());
    h.session.pump();
    h.session.set_current_time(12.0);

    assert_eq!(h.session.duration(), 30.0);
    assert_eq!(h.session.remaining_time(), 18.0);
    assert_eq!(h.session.buffered_end(), 30.0);
    assert_eq!(h.session.seekable().end(0), Some(30.0));
    assert_eq!(h.session.network_state(), NetworkState::Idle);
    assert_eq!(h.session.ready_state(), ReadyState::HaveEnoughData);
    assert_eq!((h.session.video_width(), h.session.video_height()), (1920, 1080));
    assert!(h.session.paused());
    assert!(!h.session.ended());
    assert!(!h.session.seeking());
    assert!(h.session.error().is_none());
}

#[test]
fn attributes_are_validated() {
    let mut h = Harness::playable(SessionOptions::default());

    h.session.set_attribute(MediaAttribute::Preload, "eager".into());
    assert_eq!(h.session.attribute(MediaAttribute::Preload), None);
    h.session.set_attribute(MediaAttribute::Loop, "yes".into());
    assert_eq!(h.session.attribute(MediaAttribute::Loop), Some(AttrValue::Bool(false)));

    h.session.set_attribute(MediaAttribute::Loop, AttrValue::Bool(true));
    assert!(h.session.options().loop_playback);
    assert_eq!(
        h.session.backend().attribute(MediaAttribute::Loop),
        Some(AttrValue::Bool(true))
    );

    h.session.set_muted(true);
    assert!(h.session.muted());
    assert_eq!(h.session.attribute(MediaAttribute::Muted), Some(AttrValue::Bool(true)));
    assert_eq!(h.names(), vec!["volumechange"]);
}

#[test]
fn dimensions() {
    let mut h = Harness::new(SimBackend::new(), SessionOptions::default());
    h.session.set_width(Some(640.0));
    h.session.set_width(Some(f64::NAN));
    h.session.set_height(Some(f64::INFINITY));
    assert_eq!(h.session.width(), Some(640.0));
    assert_eq!(h.session.height(), None);
}

// ========== Lifecycle ==========

#[test]
fn reset_clears_state_and_resets_children() {
    let stub = StubWidget::new("loading");
    let resets = stub.reset_counter();
    let mut registry = Registry::new();
    registry.register_widget("loading", move || Box::new(stub.clone()));

    let backend = SimBackend::preloaded("a.mp4", NetworkState::Idle, ReadyState::HaveEnoughData);
    let options = SessionOptions {
        children: vec!["loading".to_string(), "nope".to_string()],
        ..Default::default()
    };
    let mut h = Harness::with(backend, options, registry, false);
    assert_eq!(h.session.children(), vec!["loading"]);
    h.session.pump();
    h.session.play();

    h.session.reset();
    assert_eq!(resets.load(Ordering::SeqCst), 1);
    assert_eq!(h.session.flags(), StateFlags::initial());
    assert_eq!(h.session.src(), "");
    assert_eq!(h.names().last(), Some(&"reset"));

    h.session.set_src("a.mp4");
    h.session.backend_mut().advance_to(ReadyState::HaveEnoughData);
    h.session.play();
    assert_eq!(h.count("firstplay"), 2);
}

#[test]
fn retry_reapplies_source() {
    let mut h = Harness::playable(SessionOptions::default());
    h.session.backend_mut().fail(MediaError {
        code: MediaErrorCode::Decode,
        message: "bad frame".to_string(),
    });
    h.session.pump();
    assert!(h.session.has_flag(StateFlag::Error));

    h.session.retry();
    let calls = h.session.backend().calls();
    let reset = calls.iter().position(|c| c == "reset").unwrap();
    let set = calls.iter().position(|c| c == "set_src a.mp4").unwrap();
    assert!(reset < set);
    assert!(!h.session.has_flag(StateFlag::Error));
    assert_eq!(h.session.src(), "a.mp4");
}

#[test]
fn dispose_twice_runs_teardown_once() {
    let mut h = Harness::playable(SessionOptions::default());
    h.session.play();

    h.session.dispose();
    h.session.dispose();

    assert!(h.session.is_disposed());
    assert_eq!(h.count("dispose"), 1);
    assert_eq!(h.session.backend().call_count("dispose"), 1);
    assert!(!h.session.backend().events().has_subscribers(MediaEventKind::Play));

    // Disposed session ignores everything
    h.session.play();
    h.session.interact(InteractionTarget::Surface);
    h.session.tick();
    assert_eq!(h.session.backend().call_count("play"), 1);
}

#[test]
fn session_id() {
    let h = Harness::new(SimBackend::new(), SessionOptions::default());
    assert!(h.session.id().starts_with("playctl-"));

    let options = SessionOptions {
        id: Some("main".to_string()),
        ..Default::default()
    };
    let h = Harness::new(SimBackend::new(), options);
    assert_eq!(h.session.id(), "main");
}

#[test]
fn queued_events_can_be_polled() {
    let options = SessionOptions {
        queue_events: true,
        ..Default::default()
    };
    let mut h = Harness::new(SimBackend::new(), options);
    h.session.pump();
    assert_eq!(h.session.events().poll(), vec![SessionEvent::Ready]);
}

// ========== Plugins ==========

#[test]
fn unknown_plugin_fails_construction() {
    let mut options = SessionOptions::default();
    options.plugins.insert("hls".to_string(), serde_json::json!({}));

    let result = Session::new(SimBackend::new(), options, Arc::new(Registry::new()));
    match result {
        Err(SessionError::UnknownPlugin(name)) => assert_eq!(name, "hls"),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn failing_plugin_fails_construction() {
    let mut registry: Registry<SimBackend> = Registry::new();
    registry.register_plugin("boom", |_, _| anyhow::bail!("no license"));
    let mut options = SessionOptions::default();
    options.plugins.insert("boom".to_string(), serde_json::Value::Null);

    match Session::new(SimBackend::new(), options, Arc::new(registry)) {
        Err(SessionError::Plugin { name, message }) => {
            assert_eq!(name, "boom");
            assert!(message.contains("no license"));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn plugins_run_before_ready_with_their_options() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut registry: Registry<SimBackend> = Registry::new();
    let s = Arc::clone(&seen);
    registry.register_plugin("volume", move |session, value| {
        let level = value.as_f64().ok_or_else(|| anyhow::anyhow!("volume needs a number"))?;
        session.set_volume(level);
        let s = Arc::clone(&s);
        session.once(SessionEventKind::Ready, move |e| s.lock().unwrap().push(e.clone()));
        Ok(())
    });
    let mut options = SessionOptions::default();
    options.plugins.insert("volume".to_string(), serde_json::json!(0.25));

    let mut session = Session::new(SimBackend::new(), options, Arc::new(registry)).unwrap();
    assert!(!session.is_ready());
    assert_eq!(session.volume(), 0.25);

    session.pump();
    assert_eq!(*seen.lock().unwrap(), vec![SessionEvent::Ready]);
}

#[test]
fn apply_plugin_after_dispose() {
    let mut h = Harness::new(SimBackend::new(), SessionOptions::default());
    h.session.dispose();
    assert!(matches!(
        h.session.apply_plugin("any", &serde_json::Value::Null),
        Err(SessionError::Disposed)
    ));
}
