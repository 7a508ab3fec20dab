use serde::Serialize;
use std::fmt;

/// Lifecycle phase of a crawl session
///
/// `Idle → Running → (Stopping) → Idle`, with `Errored` reachable from the
/// active phases when an internal invariant breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    Running,
    Stopping,
    Errored,
}

impl SessionPhase {
    /// Running and Stopping sessions block a new start
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running | Self::Stopping)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: SessionPhase) -> bool {
        use SessionPhase::*;
        matches!(
            (self, next),
            (Idle, Running)
                | (Running, Stopping)
                | (Running, Idle)
                | (Stopping, Idle)
                | (Running, Errored)
                | (Stopping, Errored)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Errored => "errored",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
