use thiserror::Error;

use crate::id::ModuleId;
use crate::state::ModuleState;

/// Error types for registry and loader operations.
///
/// Structural mismatches are never errors - a filter that doesn't match
/// yields `false`/`None`. These variants cover genuine misuse of the
/// lifecycle machinery; each is local to the call that triggered it and
/// leaves registry integrity intact.
#[derive(Debug, Error)]
pub enum Error {
    /// The id was never defined through the loader shim.
    #[error("unknown module id {0}")]
    UnknownModule(ModuleId),

    /// A lifecycle transition that the state machine does not admit.
    #[error("invalid state transition for module {id}: {from} -> {to}")]
    InvalidTransition {
        id: ModuleId,
        from: ModuleState,
        to: ModuleState,
    },

    /// The module was defined without a factory (or its factory was
    /// already consumed) and has no exports to hand out.
    #[error("no factory available for module {0}")]
    MissingFactory(ModuleId),
}

/// Result type alias for lode operations.
pub type Result<T> = std::result::Result<T, Error>;
