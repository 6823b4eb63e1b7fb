use serde::{Deserialize, Serialize};

/// Which face of a module's exports a filter matched.
///
/// ES-module interop means a single filter evaluation can succeed against
/// three different values; the flag tells the caller which one to actually
/// receive, and is what the result cache persists (as a small integer) so
/// a later run can hand back the same face without re-scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum MatchKind {
    /// Plain (non-ES) exports matched directly.
    Plain,
    /// The ES module's default export matched.
    Default,
    /// The full ES module namespace matched.
    Namespace,
}

impl From<MatchKind> for u8 {
    fn from(kind: MatchKind) -> u8 {
        match kind {
            MatchKind::Plain => 0,
            MatchKind::Default => 1,
            MatchKind::Namespace => 2,
        }
    }
}

impl TryFrom<u8> for MatchKind {
    type Error = String;

    fn try_from(flag: u8) -> Result<Self, Self::Error> {
        match flag {
            0 => Ok(MatchKind::Plain),
            1 => Ok(MatchKind::Default),
            2 => Ok(MatchKind::Namespace),
            other => Err(format!("unknown match flag: {other}")),
        }
    }
}
