//! Media element attributes settable through the session.
//!
//! A fixed allow-list: every attribute has one expected value type, checked
//! before anything reaches the backend.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Str(String),
}

impl AttrValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Str(v.to_string())
    }
}

/// Expected value type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrType {
    Bool,
    Str,
}

/// Allow-listed backend attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaAttribute {
    Muted,
    DefaultMuted,
    Autoplay,
    Loop,
    Playsinline,
    Poster,
    Preload,
}

impl MediaAttribute {
    pub const ALL: [MediaAttribute; 7] = [
        MediaAttribute::Muted,
        MediaAttribute::DefaultMuted,
        MediaAttribute::Autoplay,
        MediaAttribute::Loop,
        MediaAttribute::Playsinline,
        MediaAttribute::Poster,
        MediaAttribute::Preload,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MediaAttribute::Muted => "muted",
            MediaAttribute::DefaultMuted => "defaultMuted",
            MediaAttribute::Autoplay => "autoplay",
            MediaAttribute::Loop => "loop",
            MediaAttribute::Playsinline => "playsinline",
            MediaAttribute::Poster => "poster",
            MediaAttribute::Preload => "preload",
        }
    }

    pub fn value_type(self) -> AttrType {
        match self {
            MediaAttribute::Poster | MediaAttribute::Preload => AttrType::Str,
            _ => AttrType::Bool,
        }
    }

    /// True when `value` has the type this attribute expects.
    /// `preload` additionally only takes `none`, `metadata` or `auto`.
    pub fn accepts(self, value: &AttrValue) -> bool {
        match (self, value) {
            (MediaAttribute::Preload, AttrValue::Str(s)) => {
                matches!(s.as_str(), "none" | "metadata" | "auto")
            }
            (attr, AttrValue::Str(_)) => attr.value_type() == AttrType::Str,
            (attr, AttrValue::Bool(_)) => attr.value_type() == AttrType::Bool,
        }
    }
}

impl fmt::Display for MediaAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown attribute name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAttribute(pub String);

impl fmt::Display for UnknownAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown media attribute '{}'", self.0)
    }
}

impl std::error::Error for UnknownAttribute {}

impl FromStr for MediaAttribute {
    type Err = UnknownAttribute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaAttribute::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| UnknownAttribute(s.to_string()))
    }
}
