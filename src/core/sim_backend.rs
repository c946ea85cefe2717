//! In-memory media backend.
//!
//! Models just enough of a media element for the session to drive: source,
//! readiness, clock position, volume and rate, plus the raw event stream.
//! Nothing is decoded. The host (or a test) moves the lifecycle forward with
//! [`SimBackend::advance_to`], [`SimBackend::finish`], [`SimBackend::fail`]
//! or pushes arbitrary raw events with [`SimBackend::inject`].
//!
//! Every imperative call made on it is recorded in [`SimBackend::calls`].
//!
//! End of media: with the `loop` attribute (and native loop enabled) the
//! playhead silently wraps to zero. Otherwise playback stops at the end and
//! `ended` fires, but `paused` stays false; the next `play()` restarts from
//! zero and fires `play` again.

use crate::attrs::{AttrValue, MediaAttribute};
use crate::core::backend::{
    MediaBackend, MediaError, MediaSource, NetworkState, PlayRequest, ReadyState, TimeRanges,
};
use crate::core::event_bus::EventBus;
use crate::core::media_events::{MediaEvent, PlayRequestId};
use crate::error::BackendError;
use log::{debug, trace};
use std::collections::HashMap;

/// Accepted playback rate range
const MIN_RATE: f64 = 0.0625;
const MAX_RATE: f64 = 16.0;

/// Duration reported once metadata is "loaded", unless configured.
const DEFAULT_DURATION: f64 = 60.0;

#[derive(Debug)]
pub struct SimBackend {
    events: EventBus<MediaEvent>,
    src: String,
    sources: Vec<MediaSource>,
    network_state: NetworkState,
    ready_state: ReadyState,
    current_time: f64,
    /// Duration applied when metadata arrives
    media_duration: f64,
    duration: f64,
    volume: f64,
    muted: bool,
    playback_rate: f64,
    default_playback_rate: f64,
    paused: bool,
    ended: bool,
    /// Stopped at the end while not paused
    stopped: bool,
    seeking: bool,
    buffered: TimeRanges,
    played: TimeRanges,
    error: Option<MediaError>,
    video_size: (u32, u32),
    attrs: HashMap<MediaAttribute, AttrValue>,
    /// play() returns Pending and waits for settle_play()
    deferred_play: bool,
    next_request: u64,
    pending_plays: Vec<PlayRequestId>,
    native_fullscreen: bool,
    in_fullscreen: bool,
    /// Honour the `loop` attribute
    native_loop: bool,
    rate_supported: bool,
    calls: Vec<String>,
    disposed: bool,
}

impl Default for SimBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SimBackend {
    /// Empty backend: no source, nothing loaded.
    pub fn new() -> Self {
        Self {
            events: EventBus::new(),
            src: String::new(),
            sources: Vec::new(),
            network_state: NetworkState::Empty,
            ready_state: ReadyState::HaveNothing,
            current_time: 0.0,
            media_duration: DEFAULT_DURATION,
            duration: f64::NAN,
            volume: 1.0,
            muted: false,
            playback_rate: 1.0,
            default_playback_rate: 1.0,
            paused: true,
            ended: false,
            stopped: false,
            seeking: false,
            buffered: TimeRanges::new(),
            played: TimeRanges::new(),
            error: None,
            video_size: (0, 0),
            attrs: HashMap::new(),
            deferred_play: false,
            next_request: 1,
            pending_plays: Vec::new(),
            native_fullscreen: false,
            in_fullscreen: false,
            native_loop: true,
            rate_supported: true,
            calls: Vec::new(),
            disposed: false,
        }
    }

    /// Backend that already went through part of its lifecycle before anyone
    /// subscribed. No events are emitted for the skipped steps.
    pub fn preloaded(src: &str, network: NetworkState, ready: ReadyState) -> Self {
        let mut sim = Self::new();
        sim.src = src.to_string();
        sim.network_state = network;
        sim.ready_state = ready;
        if ready >= ReadyState::HaveMetadata {
            sim.apply_metadata();
        }
        sim
    }

    pub fn with_duration(mut self, secs: f64) -> Self {
        self.media_duration = secs;
        if self.ready_state >= ReadyState::HaveMetadata {
            self.duration = secs;
        }
        self
    }

    /// play() settles later through [`SimBackend::settle_play`].
    pub fn with_deferred_play(mut self, deferred: bool) -> Self {
        self.deferred_play = deferred;
        self
    }

    pub fn with_native_fullscreen(mut self, supported: bool) -> Self {
        self.native_fullscreen = supported;
        self
    }

    /// Whether the `loop` attribute makes the backend wrap by itself.
    pub fn with_native_loop(mut self, native: bool) -> Self {
        self.native_loop = native;
        self
    }

    pub fn with_rate_support(mut self, supported: bool) -> Self {
        self.rate_supported = supported;
        self
    }

    pub fn with_error(mut self, error: MediaError) -> Self {
        self.error = Some(error);
        self
    }

    // === Inspection ===

    /// Imperative calls received so far, e.g. `["set_src a.mp4", "play"]`.
    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls
            .iter()
            .filter(|c| c.split_whitespace().next() == Some(name))
            .count()
    }

    pub fn pending_plays(&self) -> &[PlayRequestId] {
        &self.pending_plays
    }

    pub fn in_fullscreen(&self) -> bool {
        self.in_fullscreen
    }

    // === Lifecycle driving ===

    /// Push a raw event as is, without touching the model.
    pub fn inject(&self, event: MediaEvent) {
        self.events.emit(event);
    }

    /// Move readiness forward, emitting every lifecycle event in between.
    pub fn advance_to(&mut self, target: ReadyState) {
        if self.src.is_empty() {
            debug!("SimBackend: advance_to({:?}) without a source", target);
            return;
        }
        while self.ready_state < target {
            match self.ready_state {
                ReadyState::HaveNothing => {
                    self.ready_state = ReadyState::HaveMetadata;
                    self.apply_metadata();
                    self.emit(MediaEvent::DurationChange);
                    self.emit(MediaEvent::Resize);
                    self.emit(MediaEvent::LoadedMetadata);
                }
                ReadyState::HaveMetadata => {
                    self.ready_state = ReadyState::HaveCurrentData;
                    self.emit(MediaEvent::LoadedData);
                }
                ReadyState::HaveCurrentData => {
                    self.ready_state = ReadyState::HaveFutureData;
                    self.emit(MediaEvent::CanPlay);
                    if !self.paused {
                        self.emit(MediaEvent::Playing);
                    }
                }
                ReadyState::HaveFutureData => {
                    self.ready_state = ReadyState::HaveEnoughData;
                    self.network_state = NetworkState::Idle;
                    self.emit(MediaEvent::CanPlayThrough);
                    if self.paused && self.attr_flag(MediaAttribute::Autoplay) {
                        debug!("SimBackend: autoplay");
                        self.start_playback();
                    }
                }
                ReadyState::HaveEnoughData => break,
            }
        }
    }

    /// Move the playhead forward while playing.
    pub fn advance_time(&mut self, secs: f64) {
        if self.paused || self.stopped {
            return;
        }
        let end = if self.duration.is_finite() { self.duration } else { f64::MAX };
        let start = self.current_time;
        self.current_time = (self.current_time + secs * self.playback_rate).min(end);
        self.played.add(start, self.current_time);
        self.emit(MediaEvent::TimeUpdate);
        if self.current_time >= end {
            self.finish();
        }
    }

    /// Playback reached the end of the media.
    pub fn finish(&mut self) {
        if self.native_loop && self.attr_flag(MediaAttribute::Loop) {
            self.current_time = 0.0;
            self.emit(MediaEvent::Seeking);
            self.emit(MediaEvent::TimeUpdate);
            self.emit(MediaEvent::Seeked);
            return;
        }
        if self.duration.is_finite() {
            self.current_time = self.duration;
        }
        self.ended = true;
        self.stopped = !self.paused;
        self.emit(MediaEvent::TimeUpdate);
        self.emit(MediaEvent::Ended);
    }

    /// Playback stalls on an empty buffer.
    pub fn stall(&mut self) {
        if self.ready_state > ReadyState::HaveCurrentData {
            self.ready_state = ReadyState::HaveCurrentData;
        }
        self.emit(MediaEvent::Waiting);
    }

    /// Decoding or network failure.
    pub fn fail(&mut self, error: MediaError) {
        self.error = Some(error);
        self.network_state = NetworkState::Idle;
        self.emit(MediaEvent::Error);
    }

    /// Settle a deferred play() request.
    pub fn settle_play(&mut self, request: PlayRequestId, result: Result<(), String>) {
        let Some(pos) = self.pending_plays.iter().position(|r| *r == request) else {
            debug!("SimBackend: settle for unknown request {:?}", request);
            return;
        };
        self.pending_plays.remove(pos);
        if result.is_ok() {
            self.start_playback();
        }
        self.emit(MediaEvent::PlaySettled { request, result });
    }

    /// Platform-level fullscreen toggle not requested through the backend
    /// (for example the user pressing escape).
    pub fn external_fullscreen_change(&mut self, is_fullscreen: bool) {
        self.in_fullscreen = is_fullscreen;
        self.emit(MediaEvent::FullscreenChange {
            is_fullscreen: Some(is_fullscreen),
        });
    }

    fn apply_metadata(&mut self) {
        self.duration = self.media_duration;
        self.video_size = (1920, 1080);
        self.buffered = TimeRanges::new();
        self.buffered.add(0.0, self.media_duration);
    }

    fn attr_flag(&self, attr: MediaAttribute) -> bool {
        self.attrs.get(&attr).and_then(AttrValue::as_bool).unwrap_or(false)
    }

    fn start_playback(&mut self) {
        if !self.paused && !self.stopped {
            return;
        }
        if self.ended {
            self.current_time = 0.0;
        }
        self.paused = false;
        self.ended = false;
        self.stopped = false;
        self.emit(MediaEvent::Play);
        if self.ready_state >= ReadyState::HaveFutureData {
            self.emit(MediaEvent::Playing);
        } else {
            self.emit(MediaEvent::Waiting);
        }
    }

    fn emit(&self, event: MediaEvent) {
        trace!("SimBackend: emit {:?}", event);
        self.events.emit(event);
    }

    fn record(&mut self, call: String) {
        self.calls.push(call);
    }

    fn clear_media(&mut self) {
        self.ready_state = ReadyState::HaveNothing;
        self.current_time = 0.0;
        self.duration = f64::NAN;
        self.paused = true;
        self.ended = false;
        self.stopped = false;
        self.seeking = false;
        self.buffered = TimeRanges::new();
        self.played = TimeRanges::new();
        self.error = None;
        self.video_size = (0, 0);
        self.pending_plays.clear();
    }

    /// Media element load algorithm, reduced.
    fn begin_load(&mut self) {
        let had_media = self.network_state != NetworkState::Empty;
        self.clear_media();
        if had_media {
            self.emit(MediaEvent::Emptied);
        }
        if self.src.is_empty() {
            self.network_state = NetworkState::Empty;
            return;
        }
        self.network_state = NetworkState::Loading;
        self.emit(MediaEvent::LoadStart);
    }
}

impl MediaBackend for SimBackend {
    fn events(&self) -> &EventBus<MediaEvent> {
        &self.events
    }

    fn src(&self) -> String {
        self.src.clone()
    }

    fn sources(&self) -> Vec<MediaSource> {
        self.sources.clone()
    }

    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn muted(&self) -> bool {
        self.muted
    }

    fn playback_rate(&self) -> f64 {
        self.playback_rate
    }

    fn default_playback_rate(&self) -> f64 {
        self.default_playback_rate
    }

    fn paused(&self) -> bool {
        self.paused
    }

    fn ended(&self) -> bool {
        self.ended
    }

    fn seeking(&self) -> bool {
        self.seeking
    }

    fn buffered(&self) -> TimeRanges {
        self.buffered.clone()
    }

    fn played(&self) -> TimeRanges {
        self.played.clone()
    }

    fn seekable(&self) -> TimeRanges {
        let mut ranges = TimeRanges::new();
        if self.duration.is_finite() {
            ranges.add(0.0, self.duration);
        }
        ranges
    }

    fn network_state(&self) -> NetworkState {
        self.network_state
    }

    fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    fn error(&self) -> Option<MediaError> {
        self.error.clone()
    }

    fn video_width(&self) -> u32 {
        self.video_size.0
    }

    fn video_height(&self) -> u32 {
        self.video_size.1
    }

    fn attribute(&self, attr: MediaAttribute) -> Option<AttrValue> {
        match attr {
            MediaAttribute::Muted => Some(AttrValue::Bool(self.muted)),
            _ => self.attrs.get(&attr).cloned(),
        }
    }

    fn set_current_time(&mut self, secs: f64) -> Result<(), BackendError> {
        if !secs.is_finite() {
            return Err(BackendError::rejected("set_current_time", format!("{} is not finite", secs)));
        }
        self.record(format!("set_current_time {}", secs));
        let end = if self.duration.is_finite() { self.duration } else { secs.max(0.0) };
        self.seeking = true;
        self.emit(MediaEvent::Seeking);
        self.current_time = secs.clamp(0.0, end);
        self.seeking = false;
        self.emit(MediaEvent::TimeUpdate);
        self.emit(MediaEvent::Seeked);
        Ok(())
    }

    fn set_volume(&mut self, volume: f64) -> Result<(), BackendError> {
        if !(0.0..=1.0).contains(&volume) {
            return Err(BackendError::rejected("set_volume", format!("{} outside [0, 1]", volume)));
        }
        self.record(format!("set_volume {}", volume));
        if self.volume != volume {
            self.volume = volume;
            self.emit(MediaEvent::VolumeChange);
        }
        Ok(())
    }

    fn set_muted(&mut self, muted: bool) -> Result<(), BackendError> {
        self.record(format!("set_muted {}", muted));
        if self.muted != muted {
            self.muted = muted;
            self.emit(MediaEvent::VolumeChange);
        }
        Ok(())
    }

    fn set_playback_rate(&mut self, rate: f64) -> Result<(), BackendError> {
        if !self.rate_supported {
            return Err(BackendError::Unsupported("set_playback_rate"));
        }
        if !(MIN_RATE..=MAX_RATE).contains(&rate) {
            return Err(BackendError::rejected(
                "set_playback_rate",
                format!("rate {} out of range", rate),
            ));
        }
        self.record(format!("set_playback_rate {}", rate));
        if self.playback_rate != rate {
            self.playback_rate = rate;
            self.emit(MediaEvent::RateChange);
        }
        Ok(())
    }

    fn set_default_playback_rate(&mut self, rate: f64) -> Result<(), BackendError> {
        if !self.rate_supported {
            return Err(BackendError::Unsupported("set_default_playback_rate"));
        }
        if !(MIN_RATE..=MAX_RATE).contains(&rate) {
            return Err(BackendError::rejected(
                "set_default_playback_rate",
                format!("rate {} out of range", rate),
            ));
        }
        self.record(format!("set_default_playback_rate {}", rate));
        self.default_playback_rate = rate;
        Ok(())
    }

    fn set_src(&mut self, src: &str) -> Result<(), BackendError> {
        self.record(format!("set_src {}", src));
        self.src = src.to_string();
        self.sources.clear();
        self.begin_load();
        Ok(())
    }

    fn set_sources(&mut self, sources: &[MediaSource]) -> Result<(), BackendError> {
        self.record(format!("set_sources {}", sources.len()));
        self.sources = sources.to_vec();
        // First candidate wins, type sniffing is not modelled
        self.src = sources.first().map(|s| s.src.clone()).unwrap_or_default();
        self.begin_load();
        Ok(())
    }

    fn set_attribute(&mut self, attr: MediaAttribute, value: &AttrValue) -> Result<(), BackendError> {
        if !attr.accepts(value) {
            return Err(BackendError::rejected("set_attribute", format!("bad value for {}", attr)));
        }
        self.record(format!("set_attribute {}", attr));
        match (attr, value) {
            (MediaAttribute::Muted, AttrValue::Bool(muted)) => {
                if self.muted != *muted {
                    self.muted = *muted;
                    self.emit(MediaEvent::VolumeChange);
                }
            }
            _ => {
                self.attrs.insert(attr, value.clone());
            }
        }
        Ok(())
    }

    fn play(&mut self) -> Result<PlayRequest, BackendError> {
        if self.src.is_empty() {
            return Err(BackendError::NotReady("play"));
        }
        self.record("play".to_string());
        if self.deferred_play {
            let request = PlayRequestId(self.next_request);
            self.next_request += 1;
            self.pending_plays.push(request);
            return Ok(PlayRequest::Pending(request));
        }
        self.start_playback();
        Ok(PlayRequest::Started)
    }

    fn pause(&mut self) -> Result<(), BackendError> {
        self.record("pause".to_string());
        if !self.paused {
            self.paused = true;
            self.stopped = false;
            self.emit(MediaEvent::TimeUpdate);
            self.emit(MediaEvent::Pause);
        }
        Ok(())
    }

    fn load(&mut self) -> Result<(), BackendError> {
        self.record("load".to_string());
        self.begin_load();
        Ok(())
    }

    fn reset(&mut self) -> Result<(), BackendError> {
        self.record("reset".to_string());
        let had_media = self.network_state != NetworkState::Empty;
        if !self.paused {
            self.paused = true;
            self.emit(MediaEvent::Pause);
        }
        self.src.clear();
        self.sources.clear();
        self.clear_media();
        self.network_state = NetworkState::Empty;
        if had_media {
            self.emit(MediaEvent::Emptied);
        }
        Ok(())
    }

    fn supports_playback_rate(&self) -> bool {
        self.rate_supported
    }

    fn supports_fullscreen(&self) -> bool {
        self.native_fullscreen
    }

    fn enter_fullscreen(&mut self) -> Result<(), BackendError> {
        if !self.native_fullscreen {
            return Err(BackendError::Unsupported("enter_fullscreen"));
        }
        self.record("enter_fullscreen".to_string());
        self.external_fullscreen_change(true);
        Ok(())
    }

    fn exit_fullscreen(&mut self) -> Result<(), BackendError> {
        if !self.native_fullscreen {
            return Err(BackendError::Unsupported("exit_fullscreen"));
        }
        self.record("exit_fullscreen".to_string());
        self.external_fullscreen_change(false);
        Ok(())
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.record("dispose".to_string());
        self.disposed = true;
        self.events.clear();
    }
}
