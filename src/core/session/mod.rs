//! Playback session - the state machine of record for one backend.
//!
//! The session owns the backend, listens to its raw events and turns them
//! into canonical [`SessionEvent`]s with consistent [`StateFlags`].
//!
//! # Dispatch model
//!
//! Backend callbacks never touch the session directly. They push raw events
//! into an inbox, and [`Session::pump`] drains it, running each event
//! through the mapping table in [`normalizer`] to completion (flags updated,
//! then the canonical event emitted) before the next one is taken.
//!
//! Every public call pumps before returning, so a synchronous backend's
//! events are fully applied by the time the call returns. A call made from
//! inside dispatch (e.g. the loop restart in the `ended` handler) does not
//! pump again; its events are picked up by the drain already in progress.
//!
//! # Ready checkpoint
//!
//! A new session is not ready. The first pump runs the deferred ready
//! actions in order (apply the `src`/`source` option, synthesize missed
//! lifecycle events, re-fire a pre-existing backend error) and then emits
//! [`SessionEvent::Ready`] once. Listeners attached between construction
//! and that point see the complete lifecycle.

mod normalizer;
#[cfg(test)]
mod tests;

use crate::attrs::{AttrValue, MediaAttribute};
use crate::config::SessionOptions;
use crate::core::activity::{ActivityTracker, InteractionTarget};
use crate::core::backend::{
    MediaBackend, MediaError, MediaSource, NetworkState, PlayRequest, ReadyState, TimeRanges,
};
use crate::core::clock::{Clock, SystemClock};
use crate::core::event_bus::{EventBus, ListenerId};
use crate::core::fullscreen::{
    FullscreenApi, FullscreenCoordinator, FullscreenTransition, NoFullscreenApi,
};
use crate::core::media_events::{MediaEvent, MediaEventKind, PlayRequestId};
use crate::core::plugins::{Registry, Widget};
use crate::core::reconciler::{LateInitReconciler, LoadStage};
use crate::core::session_events::{SessionEvent, SessionEventKind};
use crate::core::state::{StateFlag, StateFlags};
use crate::error::SessionError;
use log::{debug, info, trace, warn};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

type Inbox = Arc<Mutex<VecDeque<MediaEvent>>>;

/// Work deferred to the ready checkpoint.
#[derive(Debug, Clone)]
enum ReadyAction {
    ApplySource(Vec<MediaSource>),
    Reconcile,
    RefireError,
}

/// Outstanding asynchronous `play()` and the latest intent issued meanwhile.
#[derive(Debug, Default)]
struct PlayIntent {
    pending: Option<PlayRequestId>,
    pause_requested: bool,
}

pub struct Session<B: MediaBackend> {
    id: String,
    backend: B,
    options: SessionOptions,
    registry: Arc<Registry<B>>,
    events: EventBus<SessionEvent>,
    inbox: Inbox,
    backend_listeners: Vec<ListenerId>,
    flags: StateFlags,
    fullscreen: FullscreenCoordinator,
    fullscreen_api: Box<dyn FullscreenApi>,
    activity: ActivityTracker,
    clock: Arc<dyn Clock>,
    reconciler: LateInitReconciler,
    ready: bool,
    ready_actions: Vec<ReadyAction>,
    /// `firstplay` not yet emitted for the current source
    first_play_armed: bool,
    play_intent: PlayIntent,
    children: Vec<Box<dyn Widget>>,
    dispatching: bool,
    disposed: bool,
}

impl<B: MediaBackend> std::fmt::Debug for Session<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("flags", &self.flags)
            .field("ready", &self.ready)
            .field("fullscreen", &self.fullscreen.is_fullscreen())
            .field("user_active", &self.activity.is_active())
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl<B: MediaBackend> Session<B> {
    /// Attach a session to `backend`, with no native fullscreen and the
    /// system clock.
    pub fn new(backend: B, options: SessionOptions, registry: Arc<Registry<B>>) -> Result<Self, SessionError> {
        Self::with_env(
            backend,
            options,
            registry,
            Box::new(NoFullscreenApi),
            Arc::new(SystemClock),
        )
    }

    /// Attach a session with an explicit fullscreen environment and clock.
    ///
    /// Fails only on configuration errors: an unknown plugin name or a
    /// plugin that fails to initialize.
    pub fn with_env(
        backend: B,
        options: SessionOptions,
        registry: Arc<Registry<B>>,
        fullscreen_api: Box<dyn FullscreenApi>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SessionError> {
        let id = options
            .id
            .clone()
            .unwrap_or_else(|| format!("playctl-{}", uuid::Uuid::new_v4()));
        let events = if options.queue_events {
            EventBus::buffered()
        } else {
            EventBus::new()
        };

        let mut session = Self {
            id,
            activity: ActivityTracker::new(options.active_timeout_ms),
            backend,
            options,
            registry,
            events,
            inbox: Arc::new(Mutex::new(VecDeque::new())),
            backend_listeners: Vec::new(),
            flags: StateFlags::initial(),
            fullscreen: FullscreenCoordinator::new(),
            fullscreen_api,
            clock,
            reconciler: LateInitReconciler::default(),
            ready: false,
            ready_actions: Vec::new(),
            first_play_armed: true,
            play_intent: PlayIntent::default(),
            children: Vec::new(),
            dispatching: false,
            disposed: false,
        };
        info!("Session {}: attaching", session.id);

        session.subscribe_backend();
        session.push_attributes();
        session.init_children();

        session.reconciler =
            LateInitReconciler::plan(session.backend.network_state(), session.backend.ready_state());

        let sources = session.options.initial_sources();
        if !sources.is_empty() {
            session.ready_actions.push(ReadyAction::ApplySource(sources));
        }
        session.ready_actions.push(ReadyAction::Reconcile);

        // Plugins run before the ready checkpoint
        session.dispatching = true;
        let plugins = session.init_plugins();
        session.dispatching = false;
        if let Err(e) = plugins {
            session.dispose();
            return Err(e);
        }

        if session.backend.error().is_some() {
            session.ready_actions.push(ReadyAction::RefireError);
        }

        Ok(session)
    }

    fn subscribe_backend(&mut self) {
        for kind in MediaEventKind::ALL {
            let inbox = Arc::clone(&self.inbox);
            let id = self.backend.events().on(kind, move |event| {
                inbox
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .push_back(event.clone());
            });
            self.backend_listeners.push(id);
        }
    }

    fn unsubscribe_backend(&mut self) {
        for id in self.backend_listeners.drain(..) {
            self.backend.events().off(id);
        }
    }

    /// Push attribute-style options to the backend.
    fn push_attributes(&mut self) {
        for (attr, value) in self.options.backend_attributes() {
            if let Err(e) = self.backend.set_attribute(attr, &value) {
                warn!("Session {}: backend refused {}: {}", self.id, attr, e);
            }
        }
    }

    fn init_children(&mut self) {
        for name in self.options.children.clone() {
            match self.registry.create_widget(&name) {
                Some(widget) => self.children.push(widget),
                None => warn!("Session {}: unknown child widget {}, skipped", self.id, name),
            }
        }
    }

    fn init_plugins(&mut self) -> Result<(), SessionError> {
        let plugins: Vec<(String, serde_json::Value)> = self
            .options
            .plugins
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        for (name, value) in plugins {
            self.apply_plugin(&name, &value)?;
        }
        Ok(())
    }

    /// Run a registered plugin against this session.
    pub fn apply_plugin(&mut self, name: &str, value: &serde_json::Value) -> Result<(), SessionError> {
        if self.disposed {
            return Err(SessionError::Disposed);
        }
        let registry = Arc::clone(&self.registry);
        let plugin = registry
            .plugin(name)
            .ok_or_else(|| SessionError::UnknownPlugin(name.to_string()))?;
        debug!("Session {}: plugin {}", self.id, name);
        plugin(self, value).map_err(|e| SessionError::Plugin {
            name: name.to_string(),
            message: format!("{:#}", e),
        })
    }

    // ========== Dispatch ==========

    fn next_raw(&self) -> Option<MediaEvent> {
        self.inbox.lock().unwrap_or_else(|e| e.into_inner()).pop_front()
    }

    /// Apply every raw event received so far, reaching the ready checkpoint
    /// on the first call.
    pub fn pump(&mut self) {
        if self.disposed || self.dispatching {
            return;
        }
        self.dispatching = true;
        loop {
            while let Some(event) = self.next_raw() {
                self.handle_raw(event);
                if self.disposed {
                    break;
                }
            }
            if !self.ready && !self.disposed {
                self.run_ready();
                continue;
            }
            break;
        }
        self.dispatching = false;
    }

    /// Reach the ready checkpoint now. Same as the first [`Session::pump`].
    pub fn trigger_ready(&mut self) {
        self.pump();
    }

    fn handle_raw(&mut self, event: MediaEvent) {
        trace!("Session {}: raw {:?}", self.id, event);
        if !self.ready {
            if let Some(stage) = LoadStage::from_event(&event) {
                for missed in self.reconciler.observe_live(stage) {
                    normalizer::apply(self, &missed.to_event());
                }
            }
        }
        normalizer::apply(self, &event);
    }

    fn run_ready(&mut self) {
        self.ready = true;
        for action in std::mem::take(&mut self.ready_actions) {
            match action {
                ReadyAction::ApplySource(sources) => self.apply_sources(&sources),
                ReadyAction::Reconcile => {
                    for missed in self.reconciler.take_remaining() {
                        debug!("Session {}: synthesizing {:?}", self.id, missed);
                        normalizer::apply(self, &missed.to_event());
                    }
                }
                ReadyAction::RefireError => normalizer::apply(self, &MediaEvent::Error),
            }
        }
        debug!("Session {}: ready", self.id);
        self.emit(SessionEvent::Ready);
    }

    /// Pump unless already inside dispatch.
    fn settle(&mut self) {
        if !self.dispatching {
            self.pump();
        }
    }

    fn emit(&self, event: SessionEvent) {
        self.events.emit(event);
    }

    /// Drive timers. Call from the host loop.
    pub fn tick(&mut self) {
        if self.disposed {
            return;
        }
        self.pump();
        if self.activity.tick(self.clock.now()) {
            debug!("Session {}: user inactive", self.id);
            self.emit(SessionEvent::UserInactive);
        }
    }

    // ========== Listeners ==========

    /// Canonical event stream. Use `poll()` on it when `queueEvents` is set.
    pub fn events(&self) -> &EventBus<SessionEvent> {
        &self.events
    }

    pub fn on<F>(&self, kind: SessionEventKind, callback: F) -> ListenerId
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.events.on(kind, callback)
    }

    pub fn once<F>(&self, kind: SessionEventKind, callback: F) -> ListenerId
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.events.once(kind, callback)
    }

    pub fn off(&self, id: ListenerId) -> bool {
        self.events.off(id)
    }

    // ========== State ==========

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Direct backend access. Events it emits are applied on the next pump.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn flags(&self) -> StateFlags {
        self.flags
    }

    pub fn has_flag(&self, flag: StateFlag) -> bool {
        self.flags.has(flag)
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn children(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.name()).collect()
    }

    fn has_source(&self) -> bool {
        !self.backend.src().is_empty() || !self.backend.sources().is_empty()
    }

    /// Guard for control calls. Nothing reaches the backend before the
    /// ready checkpoint; no source is a warning, not an error.
    fn require_source(&self, op: &str) -> bool {
        if self.disposed {
            debug!("Session {}: {} on disposed session", self.id, op);
            return false;
        }
        if !self.ready {
            debug!("Session {}: {}() ignored before ready", self.id, op);
            return false;
        }
        if !self.has_source() {
            warn!("Session {}: {}() ignored, no media source applied", self.id, op);
            return false;
        }
        true
    }

    // ========== Playback control ==========

    pub fn play(&mut self) {
        if self.require_source("play") {
            self.start_play();
        }
        self.settle();
    }

    fn start_play(&mut self) {
        if let Some(request) = self.play_intent.pending {
            debug!("Session {}: play() coalesced into {:?}", self.id, request);
            self.play_intent.pause_requested = false;
            return;
        }
        match self.backend.play() {
            Ok(PlayRequest::Started) => {}
            Ok(PlayRequest::Pending(request)) => {
                self.play_intent = PlayIntent {
                    pending: Some(request),
                    pause_requested: false,
                };
            }
            Err(e) => warn!("Session {}: play() failed: {}", self.id, e),
        }
    }

    pub fn pause(&mut self) {
        if self.require_source("pause") {
            self.pause_backend();
        }
        self.settle();
    }

    fn pause_backend(&mut self) {
        if self.play_intent.pending.is_some() {
            debug!("Session {}: pause() deferred until play settles", self.id);
            self.play_intent.pause_requested = true;
            return;
        }
        if let Err(e) = self.backend.pause() {
            warn!("Session {}: pause() failed: {}", self.id, e);
        }
    }

    /// Pending `play()` settled.
    fn settle_play(&mut self, request: PlayRequestId, result: &Result<(), String>) {
        if self.play_intent.pending != Some(request) {
            debug!("Session {}: stale play settlement {:?}", self.id, request);
            return;
        }
        let pause_requested = self.play_intent.pause_requested;
        self.play_intent = PlayIntent::default();
        match result {
            Ok(()) if pause_requested => self.pause_backend(),
            Ok(()) => {}
            Err(reason) => warn!("Session {}: play() rejected: {}", self.id, reason),
        }
    }

    pub fn load(&mut self) {
        if self.require_source("load") {
            if let Err(e) = self.backend.load() {
                warn!("Session {}: load() failed: {}", self.id, e);
            }
        }
        self.settle();
    }

    /// Stop playback, drop the source and return every child to its
    /// no-source state.
    pub fn reset(&mut self) {
        if !self.require_source("reset") {
            return;
        }
        self.pause_backend();
        if let Err(e) = self.backend.reset() {
            warn!("Session {}: reset() failed: {}", self.id, e);
        }
        self.play_intent = PlayIntent::default();
        self.first_play_armed = true;
        for child in self.children.iter_mut() {
            child.reset();
        }
        self.settle();
        // Source-derived state goes after the backend's own events are in
        self.flags = StateFlags::initial();
        self.emit(SessionEvent::Reset);
    }

    /// Reset and re-apply the same source.
    pub fn retry(&mut self) {
        if !self.require_source("retry") {
            return;
        }
        let src = self.backend.src();
        let sources = self.backend.sources();
        info!("Session {}: retrying {}", self.id, src);
        self.reset();
        if sources.is_empty() {
            self.set_src(&src);
        } else {
            self.set_sources(sources);
        }
    }

    /// Detach from the backend and release everything. Safe to call again.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        info!("Session {}: dispose", self.id);
        self.emit(SessionEvent::Dispose);
        self.disposed = true;
        self.activity.cancel();
        self.unsubscribe_backend();
        self.inbox.lock().unwrap_or_else(|e| e.into_inner()).clear();
        self.ready_actions.clear();
        self.backend.dispose();
        self.events.clear();
    }

    // ========== Source ==========

    pub fn src(&self) -> String {
        self.backend.src()
    }

    /// Change the source. Same source is a no-op.
    pub fn set_src(&mut self, src: &str) {
        if self.disposed || src == self.backend.src() {
            return;
        }
        self.apply_sources(&[MediaSource::new(src)]);
        self.settle();
    }

    pub fn sources(&self) -> Vec<MediaSource> {
        self.backend.sources()
    }

    pub fn set_sources(&mut self, sources: Vec<MediaSource>) {
        if self.disposed {
            return;
        }
        self.apply_sources(&sources);
        self.settle();
    }

    fn apply_sources(&mut self, sources: &[MediaSource]) {
        if self.has_source() {
            self.pause_backend();
        }
        let result = match sources {
            [single] if single.mime_type.is_none() => self.backend.set_src(&single.src),
            _ => self.backend.set_sources(sources),
        };
        if let Err(e) = result {
            warn!("Session {}: setting source failed: {}", self.id, e);
            return;
        }
        // New source: the next play is a first play again
        self.first_play_armed = true;
        self.flags.clear(StateFlag::HasStarted);
    }

    // ========== Time / volume / rate ==========

    pub fn current_time(&self) -> f64 {
        self.backend.current_time()
    }

    pub fn set_current_time(&mut self, secs: f64) {
        if self.require_source("set_current_time") {
            if let Err(e) = self.backend.set_current_time(secs) {
                warn!("Session {}: seek to {} failed: {}", self.id, secs, e);
            }
        }
        self.settle();
    }

    pub fn duration(&self) -> f64 {
        self.backend.duration()
    }

    /// Seconds left, 0 while the duration is unknown.
    pub fn remaining_time(&self) -> f64 {
        let duration = self.duration();
        if duration.is_finite() {
            (duration - self.current_time()).max(0.0)
        } else {
            0.0
        }
    }

    pub fn buffered(&self) -> TimeRanges {
        self.backend.buffered()
    }

    /// End of the last buffered range, capped at the duration.
    pub fn buffered_end(&self) -> f64 {
        let end = self.buffered().last_end().unwrap_or(0.0);
        let duration = self.duration();
        if duration.is_finite() { end.min(duration) } else { end }
    }

    pub fn played(&self) -> TimeRanges {
        self.backend.played()
    }

    pub fn seekable(&self) -> TimeRanges {
        self.backend.seekable()
    }

    pub fn seeking(&self) -> bool {
        self.backend.seeking()
    }

    pub fn ended(&self) -> bool {
        self.backend.ended()
    }

    pub fn paused(&self) -> bool {
        self.backend.paused()
    }

    pub fn network_state(&self) -> NetworkState {
        self.backend.network_state()
    }

    pub fn ready_state(&self) -> ReadyState {
        self.backend.ready_state()
    }

    pub fn error(&self) -> Option<MediaError> {
        self.backend.error()
    }

    pub fn video_width(&self) -> u32 {
        self.backend.video_width()
    }

    pub fn video_height(&self) -> u32 {
        self.backend.video_height()
    }

    pub fn volume(&self) -> f64 {
        self.backend.volume()
    }

    /// Set volume, clamped to [0, 1].
    pub fn set_volume(&mut self, volume: f64) {
        if self.disposed {
            return;
        }
        if volume.is_nan() {
            warn!("Session {}: volume NaN ignored", self.id);
            return;
        }
        if let Err(e) = self.backend.set_volume(volume.clamp(0.0, 1.0)) {
            warn!("Session {}: set_volume failed: {}", self.id, e);
        }
        self.settle();
    }

    pub fn muted(&self) -> bool {
        self.backend.muted()
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.set_attribute(MediaAttribute::Muted, AttrValue::Bool(muted));
    }

    /// 1.0 when the backend has no rate control.
    pub fn playback_rate(&self) -> f64 {
        if self.backend.supports_playback_rate() {
            self.backend.playback_rate()
        } else {
            1.0
        }
    }

    pub fn set_playback_rate(&mut self, rate: f64) {
        if self.disposed {
            return;
        }
        if let Err(e) = self.backend.set_playback_rate(rate) {
            warn!("Session {}: set_playback_rate({}) failed: {}", self.id, rate, e);
        }
        self.settle();
    }

    pub fn default_playback_rate(&self) -> f64 {
        if self.backend.supports_playback_rate() {
            self.backend.default_playback_rate()
        } else {
            1.0
        }
    }

    pub fn set_default_playback_rate(&mut self, rate: f64) {
        if self.disposed {
            return;
        }
        if let Err(e) = self.backend.set_default_playback_rate(rate) {
            warn!("Session {}: set_default_playback_rate({}) failed: {}", self.id, rate, e);
        }
        self.settle();
    }

    // ========== Attributes / dimensions ==========

    pub fn attribute(&self, attr: MediaAttribute) -> Option<AttrValue> {
        match attr {
            MediaAttribute::Muted => Some(AttrValue::Bool(self.backend.muted())),
            _ => self.options.attribute(attr),
        }
    }

    /// Set an allow-listed attribute. A value of the wrong type is ignored.
    pub fn set_attribute(&mut self, attr: MediaAttribute, value: AttrValue) {
        if self.disposed {
            return;
        }
        if !attr.accepts(&value) {
            warn!("Session {}: invalid value {:?} for {}, ignored", self.id, value, attr);
            return;
        }
        self.options.set_attribute(attr, &value);
        if let Err(e) = self.backend.set_attribute(attr, &value) {
            warn!("Session {}: backend refused {}: {}", self.id, attr, e);
        }
        self.settle();
    }

    pub fn width(&self) -> Option<f64> {
        self.options.width
    }

    pub fn set_width(&mut self, width: Option<f64>) {
        if let Some(w) = width.filter(|w| !w.is_finite()) {
            warn!("Session {}: width {} ignored", self.id, w);
            return;
        }
        self.options.width = width;
    }

    pub fn height(&self) -> Option<f64> {
        self.options.height
    }

    pub fn set_height(&mut self, height: Option<f64>) {
        if let Some(h) = height.filter(|h| !h.is_finite()) {
            warn!("Session {}: height {} ignored", self.id, h);
            return;
        }
        self.options.height = height;
    }

    // ========== Fullscreen ==========

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen.is_fullscreen()
    }

    pub fn fullscreen(&self) -> &FullscreenCoordinator {
        &self.fullscreen
    }

    pub fn request_fullscreen(&mut self) {
        if self.disposed {
            return;
        }
        let transition = self
            .fullscreen
            .request(self.fullscreen_api.as_mut(), &mut self.backend);
        self.apply_fullscreen_transition(transition);
        self.settle();
    }

    pub fn exit_fullscreen(&mut self) {
        if self.disposed {
            return;
        }
        let transition = self
            .fullscreen
            .exit(self.fullscreen_api.as_mut(), &mut self.backend);
        self.apply_fullscreen_transition(transition);
        self.settle();
    }

    fn apply_fullscreen_transition(&mut self, transition: FullscreenTransition) {
        match transition {
            FullscreenTransition::Immediate(is_fullscreen) => {
                self.emit(SessionEvent::FullscreenChange { is_fullscreen });
            }
            FullscreenTransition::Failed => self.emit(SessionEvent::FullscreenError),
            FullscreenTransition::Pending | FullscreenTransition::Unchanged => {}
        }
    }

    /// Platform fullscreen changed outside the session (document-level
    /// change notification). `reported` is the platform's value if known.
    pub fn notify_fullscreen_change(&mut self, reported: Option<bool>) {
        if self.disposed {
            return;
        }
        self.fullscreen_changed(reported);
        self.settle();
    }

    fn fullscreen_changed(&mut self, reported: Option<bool>) {
        let is_fullscreen = self
            .fullscreen
            .notify_change(reported, self.fullscreen_api.as_ref());
        self.emit(SessionEvent::FullscreenChange { is_fullscreen });
    }

    // ========== Controls overlay ==========

    pub fn is_user_active(&self) -> bool {
        self.activity.is_active()
    }

    /// Pointer/touch interaction ended on the player.
    pub fn interact(&mut self, target: InteractionTarget) {
        if self.disposed {
            return;
        }
        // Tap to resume
        if self.ready && self.backend.paused() && self.has_source() {
            self.start_play();
        }
        if let Some(active) = self.activity.interact(target, self.clock.now()) {
            self.emit_activity(active);
        }
        self.settle();
    }

    fn seed_activity(&mut self) {
        if self.activity.seed(self.clock.now()) {
            self.emit_activity(true);
        }
    }

    fn emit_activity(&self, active: bool) {
        debug!("Session {}: user {}", self.id, if active { "active" } else { "inactive" });
        self.emit(if active {
            SessionEvent::UserActive
        } else {
            SessionEvent::UserInactive
        });
    }
}

impl<B: MediaBackend> Drop for Session<B> {
    fn drop(&mut self) {
        self.unsubscribe_backend();
    }
}
