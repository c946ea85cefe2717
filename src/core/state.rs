//! Session state flags.
//!
//! Playback state is a set of independent tags rather than one exclusive
//! enum: a session can be `waiting` and `seeking` at once, `ended` stays
//! up while `paused` is set, and so on. The only hard exclusion is between
//! `playing` and `paused`, enforced here.

use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateFlag {
    LoadStart,
    Playing,
    Paused,
    Waiting,
    Seeking,
    Ended,
    Error,
    HasStarted,
}

impl StateFlag {
    pub const ALL: [StateFlag; 8] = [
        StateFlag::LoadStart,
        StateFlag::Playing,
        StateFlag::Paused,
        StateFlag::Waiting,
        StateFlag::Seeking,
        StateFlag::Ended,
        StateFlag::Error,
        StateFlag::HasStarted,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StateFlag::LoadStart => "loadstart",
            StateFlag::Playing => "playing",
            StateFlag::Paused => "paused",
            StateFlag::Waiting => "waiting",
            StateFlag::Seeking => "seeking",
            StateFlag::Ended => "ended",
            StateFlag::Error => "error",
            StateFlag::HasStarted => "hasStarted",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }

    /// Flag that can never be set together with this one.
    fn exclusive_with(self) -> Option<StateFlag> {
        match self {
            StateFlag::Playing => Some(StateFlag::Paused),
            StateFlag::Paused => Some(StateFlag::Playing),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct StateFlags(u8);

impl StateFlags {
    /// Initial state of a fresh session: nothing but `paused`.
    pub fn initial() -> Self {
        let mut flags = Self::default();
        flags.set(StateFlag::Paused);
        flags
    }

    pub fn has(self, flag: StateFlag) -> bool {
        self.0 & flag.bit() != 0
    }

    /// Set `flag`, dropping its exclusive counterpart.
    pub fn set(&mut self, flag: StateFlag) {
        if let Some(other) = flag.exclusive_with() {
            self.0 &= !other.bit();
        }
        self.0 |= flag.bit();
    }

    pub fn clear(&mut self, flag: StateFlag) {
        self.0 &= !flag.bit();
    }

    pub fn clear_all(&mut self, flags: &[StateFlag]) {
        for flag in flags {
            self.clear(*flag);
        }
    }

    pub fn iter(self) -> impl Iterator<Item = StateFlag> {
        StateFlag::ALL.into_iter().filter(move |f| self.has(*f))
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for StateFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(StateFlag::name)).finish()
    }
}

impl fmt::Display for StateFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(StateFlag::name).collect();
        write!(f, "[{}]", names.join(" "))
    }
}

impl Serialize for StateFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter().map(StateFlag::name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_is_paused_only() {
        let flags = StateFlags::initial();
        assert!(flags.has(StateFlag::Paused));
        assert_eq!(flags.iter().count(), 1);
    }

    #[test]
    fn playing_and_paused_exclude_each_other() {
        let mut flags = StateFlags::initial();
        flags.set(StateFlag::Playing);
        assert!(flags.has(StateFlag::Playing));
        assert!(!flags.has(StateFlag::Paused));

        flags.set(StateFlag::Paused);
        assert!(!flags.has(StateFlag::Playing));
        assert!(flags.has(StateFlag::Paused));
    }

    #[test]
    fn independent_flags_coexist() {
        let mut flags = StateFlags::default();
        flags.set(StateFlag::Waiting);
        flags.set(StateFlag::Seeking);
        flags.set(StateFlag::Ended);
        flags.clear_all(&[StateFlag::Waiting, StateFlag::Seeking]);
        assert_eq!(flags.iter().collect::<Vec<_>>(), vec![StateFlag::Ended]);
    }

    #[test]
    fn display_and_serialize() {
        let mut flags = StateFlags::initial();
        flags.set(StateFlag::HasStarted);
        assert_eq!(flags.to_string(), "[paused hasStarted]");
        assert_eq!(
            serde_json::to_string(&flags).unwrap(),
            r#"["paused","hasStarted"]"#
        );
    }
}
