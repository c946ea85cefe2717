//! Session options.
//!
//! Options are captured once at construction. Keys use the camelCase names
//! hosts already know (`activeTimeoutMs`, `playsinline`, ...). Keys this
//! crate does not recognize are kept, in order, in [`SessionOptions::extra`]
//! so plugins can read their own settings.

use crate::attrs::{AttrValue, MediaAttribute};
use crate::core::backend::MediaSource;
use crate::core::idle_timer::DEFAULT_IDLE_MS;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Children instantiated when the options do not list any.
pub const DEFAULT_CHILDREN: [&str; 5] = ["playButton", "progressBarSimple", "controlBar", "loading", "error"];

fn default_children() -> Vec<String> {
    DEFAULT_CHILDREN.iter().map(|s| s.to_string()).collect()
}

fn default_active_timeout() -> u64 {
    DEFAULT_IDLE_MS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOptions {
    /// Session id; generated when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub autoplay: bool,
    #[serde(default, rename = "loop")]
    pub loop_playback: bool,
    #[serde(default)]
    pub muted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preload: Option<String>,
    #[serde(default)]
    pub playsinline: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Source applied at the ready checkpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Source list applied at the ready checkpoint (takes precedence over `src`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source: Vec<MediaSource>,
    /// Plugin name -> plugin options, run in this order
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub plugins: IndexMap<String, serde_json::Value>,
    #[serde(default = "default_children")]
    pub children: Vec<String>,
    #[serde(default = "default_active_timeout")]
    pub active_timeout_ms: u64,
    /// Keep emitted session events for `poll()`
    #[serde(default)]
    pub queue_events: bool,
    /// Unrecognized keys, preserved but ignored
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            id: None,
            autoplay: false,
            loop_playback: false,
            muted: false,
            poster: None,
            preload: None,
            playsinline: false,
            width: None,
            height: None,
            src: None,
            source: Vec::new(),
            plugins: IndexMap::new(),
            children: default_children(),
            active_timeout_ms: DEFAULT_IDLE_MS,
            queue_events: false,
            extra: IndexMap::new(),
        }
    }
}

impl SessionOptions {
    /// Parse options from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse session options")
    }

    /// Source list to apply at the ready checkpoint, if any.
    pub fn initial_sources(&self) -> Vec<MediaSource> {
        if !self.source.is_empty() {
            return self.source.clone();
        }
        match &self.src {
            Some(src) if !src.is_empty() => vec![MediaSource::new(src.clone())],
            _ => Vec::new(),
        }
    }

    /// Current value of an attribute-style option.
    pub fn attribute(&self, attr: MediaAttribute) -> Option<AttrValue> {
        match attr {
            MediaAttribute::Muted => Some(self.muted.into()),
            MediaAttribute::DefaultMuted => self.extra_bool("defaultMuted").map(AttrValue::Bool),
            MediaAttribute::Autoplay => Some(self.autoplay.into()),
            MediaAttribute::Loop => Some(self.loop_playback.into()),
            MediaAttribute::Playsinline => Some(self.playsinline.into()),
            MediaAttribute::Poster => self.poster.clone().map(AttrValue::Str),
            MediaAttribute::Preload => self.preload.clone().map(AttrValue::Str),
        }
    }

    /// Record an attribute-style option. The value must already be validated.
    pub fn set_attribute(&mut self, attr: MediaAttribute, value: &AttrValue) {
        match (attr, value) {
            (MediaAttribute::Muted, AttrValue::Bool(v)) => self.muted = *v,
            (MediaAttribute::DefaultMuted, AttrValue::Bool(v)) => {
                self.extra.insert("defaultMuted".to_string(), (*v).into());
            }
            (MediaAttribute::Autoplay, AttrValue::Bool(v)) => self.autoplay = *v,
            (MediaAttribute::Loop, AttrValue::Bool(v)) => self.loop_playback = *v,
            (MediaAttribute::Playsinline, AttrValue::Bool(v)) => self.playsinline = *v,
            (MediaAttribute::Poster, AttrValue::Str(s)) => self.poster = Some(s.clone()),
            (MediaAttribute::Preload, AttrValue::Str(s)) => self.preload = Some(s.clone()),
            _ => {}
        }
    }

    /// Attribute-style options that are set and should reach the backend.
    pub fn backend_attributes(&self) -> Vec<(MediaAttribute, AttrValue)> {
        MediaAttribute::ALL
            .into_iter()
            .filter_map(|attr| self.attribute(attr).map(|v| (attr, v)))
            .filter(|(_, v)| v.as_bool() != Some(false))
            .collect()
    }

    fn extra_bool(&self, key: &str) -> Option<bool> {
        self.extra.get(key).and_then(|v| v.as_bool())
    }
}

/// Load options from a JSON file.
pub fn load_options(path: &Path) -> Result<SessionOptions> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read options file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse options file {}", path.display()))
}
