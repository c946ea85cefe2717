//! Fullscreen coordination.
//!
//! Three ways to go fullscreen exist and exactly one is used per request,
//! picked at request time in this order:
//!
//! 1. Native document-level fullscreen ([`FullscreenApi`]), when enabled
//! 2. Backend-native fullscreen, when the backend supports it
//! 3. Full window: the session just marks itself as covering the viewport
//!
//! Paths 1 and 2 report the change later through the platform's own
//! notification. Path 3 has no platform behind it, so the change is known
//! immediately.

use crate::core::backend::MediaBackend;
use log::{debug, warn};
use std::sync::{Arc, Mutex};

/// Document-level fullscreen capability of the host environment.
pub trait FullscreenApi: Send {
    /// Whether the environment allows native fullscreen at all.
    fn enabled(&self) -> bool;
    /// Whether the document is currently fullscreen.
    fn is_fullscreen(&self) -> bool;
    fn request(&mut self) -> Result<(), String>;
    fn exit(&mut self) -> Result<(), String>;
}

/// Environment without native fullscreen.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFullscreenApi;

impl FullscreenApi for NoFullscreenApi {
    fn enabled(&self) -> bool {
        false
    }

    fn is_fullscreen(&self) -> bool {
        false
    }

    fn request(&mut self) -> Result<(), String> {
        Err("fullscreen not available".to_string())
    }

    fn exit(&mut self) -> Result<(), String> {
        Err("fullscreen not available".to_string())
    }
}

#[derive(Debug, Default)]
struct SimDocument {
    enabled: bool,
    fullscreen: bool,
    requests: u32,
    exits: u32,
}

/// In-memory document fullscreen. Clones share one document, so a host can
/// keep a handle and play the user (e.g. leave fullscreen with escape).
#[derive(Debug, Clone, Default)]
pub struct SimFullscreenApi {
    doc: Arc<Mutex<SimDocument>>,
}

impl SimFullscreenApi {
    pub fn new(enabled: bool) -> Self {
        Self {
            doc: Arc::new(Mutex::new(SimDocument {
                enabled,
                ..Default::default()
            })),
        }
    }

    /// Fullscreen left or entered outside the session.
    pub fn set_fullscreen(&self, fullscreen: bool) {
        self.doc.lock().unwrap_or_else(|e| e.into_inner()).fullscreen = fullscreen;
    }

    pub fn requests(&self) -> u32 {
        self.doc.lock().unwrap_or_else(|e| e.into_inner()).requests
    }

    pub fn exits(&self) -> u32 {
        self.doc.lock().unwrap_or_else(|e| e.into_inner()).exits
    }
}

impl FullscreenApi for SimFullscreenApi {
    fn enabled(&self) -> bool {
        self.doc.lock().unwrap_or_else(|e| e.into_inner()).enabled
    }

    fn is_fullscreen(&self) -> bool {
        self.doc.lock().unwrap_or_else(|e| e.into_inner()).fullscreen
    }

    fn request(&mut self) -> Result<(), String> {
        let mut doc = self.doc.lock().unwrap_or_else(|e| e.into_inner());
        if !doc.enabled {
            return Err("fullscreen not enabled".to_string());
        }
        doc.requests += 1;
        doc.fullscreen = true;
        Ok(())
    }

    fn exit(&mut self) -> Result<(), String> {
        let mut doc = self.doc.lock().unwrap_or_else(|e| e.into_inner());
        doc.exits += 1;
        doc.fullscreen = false;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenMechanism {
    Native,
    Backend,
    FullWindow,
}

/// What the session has to do after a request/exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenTransition {
    /// Platform notification will follow.
    Pending,
    /// Change is effective now; emit it.
    Immediate(bool),
    /// Selected mechanism refused.
    Failed,
    /// Nothing to do.
    Unchanged,
}

#[derive(Debug, Default)]
pub struct FullscreenCoordinator {
    is_fullscreen: bool,
    active: Option<FullscreenMechanism>,
    /// Layout adjustment applied while native fullscreen is in use
    adjust_marker: bool,
    full_window: bool,
}

impl FullscreenCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.is_fullscreen
    }

    pub fn active_mechanism(&self) -> Option<FullscreenMechanism> {
        self.active
    }

    pub fn has_adjust_marker(&self) -> bool {
        self.adjust_marker
    }

    pub fn is_full_window(&self) -> bool {
        self.full_window
    }

    pub fn request(
        &mut self,
        api: &mut dyn FullscreenApi,
        backend: &mut dyn MediaBackend,
    ) -> FullscreenTransition {
        if let Some(active) = self.active {
            debug!("Fullscreen: already active via {:?}", active);
            return FullscreenTransition::Unchanged;
        }

        // Optimistic
        self.is_fullscreen = true;

        if api.enabled() {
            self.adjust_marker = true;
            return match api.request() {
                Ok(()) => {
                    self.active = Some(FullscreenMechanism::Native);
                    FullscreenTransition::Pending
                }
                Err(e) => {
                    warn!("Fullscreen: native request failed: {}", e);
                    self.clear();
                    FullscreenTransition::Failed
                }
            };
        }

        if backend.supports_fullscreen() {
            self.active = Some(FullscreenMechanism::Backend);
            return match backend.enter_fullscreen() {
                Ok(()) => FullscreenTransition::Pending,
                Err(e) => {
                    warn!("Fullscreen: backend request failed: {}", e);
                    self.clear();
                    FullscreenTransition::Failed
                }
            };
        }

        self.full_window = true;
        self.active = Some(FullscreenMechanism::FullWindow);
        FullscreenTransition::Immediate(true)
    }

    pub fn exit(
        &mut self,
        api: &mut dyn FullscreenApi,
        backend: &mut dyn MediaBackend,
    ) -> FullscreenTransition {
        let mechanism = match self.active {
            Some(m) => m,
            None if api.enabled() && api.is_fullscreen() => FullscreenMechanism::Native,
            None if backend.supports_fullscreen() => FullscreenMechanism::Backend,
            None => FullscreenMechanism::FullWindow,
        };
        let was_fullscreen = self.is_fullscreen;
        self.clear();

        match mechanism {
            FullscreenMechanism::Native => {
                if !api.is_fullscreen() {
                    // Already left through the platform, only our state was stale
                    return FullscreenTransition::Immediate(false);
                }
                if let Err(e) = api.exit() {
                    warn!("Fullscreen: native exit failed: {}", e);
                    return FullscreenTransition::Failed;
                }
                FullscreenTransition::Pending
            }
            FullscreenMechanism::Backend => match backend.exit_fullscreen() {
                Ok(()) => FullscreenTransition::Pending,
                Err(e) => {
                    warn!("Fullscreen: backend exit failed: {}", e);
                    FullscreenTransition::Failed
                }
            },
            FullscreenMechanism::FullWindow if was_fullscreen => FullscreenTransition::Immediate(false),
            FullscreenMechanism::FullWindow => FullscreenTransition::Unchanged,
        }
    }

    /// Platform reported a change. `reported` is the platform's own value;
    /// when absent the document API is asked, and failing that the current
    /// state is kept. Returns the resulting state.
    pub fn notify_change(&mut self, reported: Option<bool>, api: &dyn FullscreenApi) -> bool {
        let value = reported
            .or_else(|| api.enabled().then(|| api.is_fullscreen()))
            .unwrap_or(self.is_fullscreen);

        if value {
            self.is_fullscreen = true;
        } else {
            self.clear();
        }
        value
    }

    fn clear(&mut self) {
        self.is_fullscreen = false;
        self.active = None;
        self.adjust_marker = false;
        self.full_window = false;
    }
}
