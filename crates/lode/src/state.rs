use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a module record.
///
/// Transitions are monotonic:
/// `Uninitialized -> Initializing -> { Initialized | Blacklisted }`.
/// `Blacklisted` is also reachable directly from `Uninitialized` when a
/// previous run's cache already condemned the module. Nothing ever leaves
/// a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleState {
    /// Defined but its factory has not run yet.
    Uninitialized,
    /// Factory is currently executing.
    Initializing,
    /// Factory ran and produced usable exports.
    Initialized,
    /// Exports were unusable; permanently excluded from matching.
    Blacklisted,
}

impl ModuleState {
    /// Whether the state admits no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Initialized | Self::Blacklisted)
    }

    /// Whether moving from `self` to `next` is a legal forward transition.
    pub fn can_transition_to(self, next: ModuleState) -> bool {
        use ModuleState::*;
        matches!(
            (self, next),
            (Uninitialized, Initializing)
                | (Uninitialized, Blacklisted)
                | (Initializing, Initialized)
                | (Initializing, Blacklisted)
        )
    }
}

impl fmt::Display for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Initialized => "initialized",
            Self::Blacklisted => "blacklisted",
        };
        f.write_str(name)
    }
}
