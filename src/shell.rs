//! Trace replay shell for the `playctl` binary.
//!
//! Wraps a [`Session`] over a [`SimBackend`] with a manual clock and a
//! buffered event bus. A trace is a JSON array of steps:
//!
//! ```json
//! [
//!   {"call": "play"},
//!   {"media": {"ready_state": 4}},
//!   {"raw": "waiting"},
//!   {"advance_ms": 3000},
//!   {"interact": "surface"}
//! ]
//! ```
//!
//! After each step the queued canonical events are drained and reported,
//! each with the flag set as it stands once the step has settled.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, info};
use serde::Deserialize;

use crate::config::SessionOptions;
use crate::core::activity::InteractionTarget;
use crate::core::backend::{MediaError, MediaErrorCode, NetworkState, ReadyState};
use crate::core::clock::ManualClock;
use crate::core::fullscreen::SimFullscreenApi;
use crate::core::media_events::MediaEvent;
use crate::core::plugins::Registry;
use crate::core::session::Session;
use crate::core::session_events::SessionEvent;
use crate::core::sim_backend::SimBackend;
use crate::core::state::StateFlags;

/// Session-level call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Call {
    Play,
    Pause,
    Load,
    Reset,
    Retry,
    Dispose,
    RequestFullscreen,
    ExitFullscreen,
    Seek(f64),
    Volume(f64),
    Rate(f64),
    Muted(bool),
    Src(String),
}

/// Simulated media progress, driven on the backend directly.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaStep {
    ReadyState(u8),
    Time(f64),
    Finish,
    Stall,
    Fail(String),
    Fullscreen(bool),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Raw backend event by name, injected as is
    Raw(String),
    Call(Call),
    Media(MediaStep),
    AdvanceMs(u64),
    Interact(InteractionTarget),
}

/// One reported canonical event.
#[derive(Debug, Clone, PartialEq)]
pub struct Reported {
    pub event: SessionEvent,
    pub flags: StateFlags,
}

impl std::fmt::Display for Reported {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::to_string(&self.event).map_err(|_| std::fmt::Error)?;
        write!(f, "{} {}", json, self.flags)
    }
}

pub fn load_trace(path: &Path) -> Result<Vec<Step>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read trace {}", path.display()))?;
    parse_trace(&text).with_context(|| format!("Failed to parse trace {}", path.display()))
}

pub fn parse_trace(json: &str) -> Result<Vec<Step>> {
    Ok(serde_json::from_str(json)?)
}

/// Raw event from its wire name (`"canplay"`, `"timeupdate"`, ...).
pub fn raw_event(name: &str) -> Result<MediaEvent> {
    serde_json::from_value(serde_json::json!({ "event": name }))
        .with_context(|| format!("Unknown media event '{}'", name))
}

/// Replay state
pub struct Shell {
    pub session: Session<SimBackend>,
    pub clock: ManualClock,
    pub fullscreen_api: SimFullscreenApi,
}

impl Shell {
    /// Build the session. `network` defaults to Idle with a source, Empty
    /// without one.
    pub fn new(
        mut options: SessionOptions,
        src: Option<&str>,
        network: Option<NetworkState>,
        ready: ReadyState,
    ) -> Result<Self> {
        options.queue_events = true;
        let backend = match src {
            Some(src) => SimBackend::preloaded(src, network.unwrap_or(NetworkState::Idle), ready),
            None => SimBackend::preloaded("", network.unwrap_or(NetworkState::Empty), ReadyState::HaveNothing),
        };
        let clock = ManualClock::new();
        let fullscreen_api = SimFullscreenApi::new(false);
        let session = Session::with_env(
            backend,
            options,
            Arc::new(Registry::with_default_widgets()),
            Box::new(fullscreen_api.clone()),
            Arc::new(clock.clone()),
        )?;
        info!("Shell: session {} attached", session.id());

        Ok(Self {
            session,
            clock,
            fullscreen_api,
        })
    }

    /// Reach the ready checkpoint and report what it emitted.
    pub fn start(&mut self) -> Vec<Reported> {
        self.session.trigger_ready();
        self.drain()
    }

    pub fn run_step(&mut self, step: &Step) -> Result<Vec<Reported>> {
        debug!("Shell: step {:?}", step);
        match step {
            Step::Raw(name) => {
                let event = raw_event(name)?;
                self.session.backend().inject(event);
                self.session.pump();
            }
            Step::Call(call) => self.call(call),
            Step::Media(media) => {
                self.media(media)?;
                self.session.pump();
            }
            Step::AdvanceMs(ms) => {
                self.clock.advance_ms(*ms);
                self.session.tick();
            }
            Step::Interact(target) => self.session.interact(*target),
        }
        Ok(self.drain())
    }

    pub fn run(&mut self, steps: &[Step]) -> Result<Vec<Reported>> {
        let mut reported = Vec::new();
        for (i, step) in steps.iter().enumerate() {
            let out = self
                .run_step(step)
                .with_context(|| format!("Step {} failed", i))?;
            reported.extend(out);
        }
        Ok(reported)
    }

    fn call(&mut self, call: &Call) {
        let s = &mut self.session;
        match call {
            Call::Play => s.play(),
            Call::Pause => s.pause(),
            Call::Load => s.load(),
            Call::Reset => s.reset(),
            Call::Retry => s.retry(),
            Call::Dispose => s.dispose(),
            Call::RequestFullscreen => s.request_fullscreen(),
            Call::ExitFullscreen => s.exit_fullscreen(),
            Call::Seek(secs) => s.set_current_time(*secs),
            Call::Volume(v) => s.set_volume(*v),
            Call::Rate(r) => s.set_playback_rate(*r),
            Call::Muted(m) => s.set_muted(*m),
            Call::Src(src) => s.set_src(src),
        }
    }

    fn media(&mut self, step: &MediaStep) -> Result<()> {
        let backend = self.session.backend_mut();
        match step {
            MediaStep::ReadyState(code) => {
                let ready = ReadyState::from_code(*code)
                    .with_context(|| format!("Invalid ready state {}", code))?;
                backend.advance_to(ready);
            }
            MediaStep::Time(secs) => backend.advance_time(*secs),
            MediaStep::Finish => backend.finish(),
            MediaStep::Stall => backend.stall(),
            MediaStep::Fail(message) => backend.fail(MediaError {
                code: MediaErrorCode::Network,
                message: message.clone(),
            }),
            MediaStep::Fullscreen(on) => backend.external_fullscreen_change(*on),
        }
        Ok(())
    }

    /// Drain queued canonical events.
    pub fn drain(&self) -> Vec<Reported> {
        let flags = self.session.flags();
        self.session
            .events()
            .poll()
            .into_iter()
            .map(|event| Reported { event, flags })
            .collect()
    }
}
