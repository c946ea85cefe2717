//! Late-init reconciliation.
//!
//! A session can attach to a backend that already has a source and went
//! through part of its load lifecycle. Those events were emitted before
//! anyone listened. The reconciler works out which ones were missed from
//! `network_state`/`ready_state` and hands them back for synthesis at the
//! ready checkpoint.
//!
//! Live events may still arrive before the checkpoint: a backend at
//! `HaveNothing` may simply not have emitted `loadstart` yet. A live
//! lifecycle event therefore drops itself from the pending set and flushes
//! every pending event ranked below it first, so the stream stays ordered
//! and nothing is emitted twice.

use crate::core::backend::{NetworkState, ReadyState};
use crate::core::media_events::MediaEvent;
use log::debug;

/// Load lifecycle stages, in the order they are guaranteed to be seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoadStage {
    LoadStart,
    LoadedMetadata,
    LoadedData,
    CanPlay,
    CanPlayThrough,
}

impl LoadStage {
    pub fn from_event(event: &MediaEvent) -> Option<Self> {
        match event {
            MediaEvent::LoadStart => Some(LoadStage::LoadStart),
            MediaEvent::LoadedMetadata => Some(LoadStage::LoadedMetadata),
            MediaEvent::LoadedData => Some(LoadStage::LoadedData),
            MediaEvent::CanPlay => Some(LoadStage::CanPlay),
            MediaEvent::CanPlayThrough => Some(LoadStage::CanPlayThrough),
            _ => None,
        }
    }

    pub fn to_event(self) -> MediaEvent {
        match self {
            LoadStage::LoadStart => MediaEvent::LoadStart,
            LoadStage::LoadedMetadata => MediaEvent::LoadedMetadata,
            LoadStage::LoadedData => MediaEvent::LoadedData,
            LoadStage::CanPlay => MediaEvent::CanPlay,
            LoadStage::CanPlayThrough => MediaEvent::CanPlayThrough,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LateInitReconciler {
    /// Missed stages, ascending
    pending: Vec<LoadStage>,
}

impl LateInitReconciler {
    /// Decide what was missed, from the backend state at attach time.
    pub fn plan(network: NetworkState, ready: ReadyState) -> Self {
        let pending = match network {
            // No source, or nothing ever started: live events are complete
            NetworkState::Empty | NetworkState::NoSource => Vec::new(),
            NetworkState::Idle | NetworkState::Loading => match ready {
                ReadyState::HaveNothing => vec![LoadStage::LoadStart],
                ReadyState::HaveMetadata => vec![LoadStage::LoadStart, LoadStage::LoadedMetadata],
                ReadyState::HaveCurrentData => vec![
                    LoadStage::LoadStart,
                    LoadStage::LoadedMetadata,
                    LoadStage::LoadedData,
                ],
                ReadyState::HaveFutureData => vec![
                    LoadStage::LoadStart,
                    LoadStage::LoadedMetadata,
                    LoadStage::LoadedData,
                    LoadStage::CanPlay,
                ],
                ReadyState::HaveEnoughData => vec![
                    LoadStage::LoadStart,
                    LoadStage::LoadedMetadata,
                    LoadStage::LoadedData,
                    LoadStage::CanPlay,
                    LoadStage::CanPlayThrough,
                ],
            },
        };
        if !pending.is_empty() {
            debug!(
                "Late init: network {:?}, ready {:?}, pending {:?}",
                network, ready, pending
            );
        }
        Self { pending }
    }

    pub fn pending(&self) -> &[LoadStage] {
        &self.pending
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// A live lifecycle event arrived before the ready checkpoint.
    /// Returns the stages to synthesize before handling it.
    pub fn observe_live(&mut self, live: LoadStage) -> Vec<LoadStage> {
        let split = self.pending.partition_point(|s| *s < live);
        let flushed: Vec<LoadStage> = self.pending.drain(..split).collect();
        if self.pending.first() == Some(&live) {
            self.pending.remove(0);
        }
        if !flushed.is_empty() {
            debug!("Late init: live {:?} flushes {:?}", live, flushed);
        }
        flushed
    }

    /// Ready checkpoint reached: everything still pending is synthesized.
    pub fn take_remaining(&mut self) -> Vec<LoadStage> {
        std::mem::take(&mut self.pending)
    }
}
