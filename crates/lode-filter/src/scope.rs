use lode::ModuleState;

/// Which registry lifecycle states a filter should be evaluated against.
///
/// Exports-needing filters only make sense for `Initialized` modules;
/// dependency-only filters can run as soon as a module is defined.
/// `Blacklisted` is never in scope. Composites take the union of their
/// operands' scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope(u8);

const UNINITIALIZED: u8 = 1 << 0;
const INITIALIZING: u8 = 1 << 1;
const INITIALIZED: u8 = 1 << 2;

impl Scope {
    /// Only modules with usable exports.
    pub const EXPORTS: Scope = Scope(INITIALIZED);

    /// Any module whose dependency list is known.
    pub const STRUCTURAL: Scope = Scope(UNINITIALIZED | INITIALIZING | INITIALIZED);

    /// Whether `state` falls inside this scope.
    pub fn contains(self, state: ModuleState) -> bool {
        let bit = match state {
            ModuleState::Uninitialized => UNINITIALIZED,
            ModuleState::Initializing => INITIALIZING,
            ModuleState::Initialized => INITIALIZED,
            ModuleState::Blacklisted => return false,
        };
        self.0 & bit != 0
    }

    /// Combine two scopes (composite filters concatenate their operands'
    /// scopes).
    pub fn union(self, other: Scope) -> Scope {
        Scope(self.0 | other.0)
    }
}
