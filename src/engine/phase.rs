//! Agent reasoning phases.
//!
//! The agent cycles through a fixed four-phase loop modeled on
//! observe-orient-decide-act reasoning. `Idle` sits outside the loop:
//! it is the resting phase before the engine starts and after it stops.

use serde::{Deserialize, Serialize};

/// A phase of the agent reasoning cycle.
///
/// Serialized in the dashboard wire form (`"MONITOR"`, `"ANALYZE"`, …).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentPhase {
    /// Resting phase outside the cycle (pre-start / post-stop).
    Idle,
    /// Passive traffic observation.
    Monitor,
    /// Anomaly scoring against the learned baseline.
    Analyze,
    /// Response-intent selection.
    Decide,
    /// Deception deployment. Terminal phase of the cycle: the active
    /// threat is resolved here.
    Deploy,
}

impl AgentPhase {
    /// The fixed cycle sequence. The cycle driver advances strictly in
    /// this order and never skips a step.
    pub const CYCLE: [Self; 4] = [Self::Monitor, Self::Analyze, Self::Decide, Self::Deploy];

    /// Returns the next phase in the cycle.
    ///
    /// `Idle` maps to `Monitor`, the cycle entry point.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Idle | Self::Deploy => Self::Monitor,
            Self::Monitor => Self::Analyze,
            Self::Analyze => Self::Decide,
            Self::Decide => Self::Deploy,
        }
    }

    /// Whether this is the terminal phase, at which the reactor resolves
    /// the active threat.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Deploy)
    }

    /// The dashboard wire form of the phase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Monitor => "MONITOR",
            Self::Analyze => "ANALYZE",
            Self::Decide => "DECIDE",
            Self::Deploy => "DEPLOY",
        }
    }
}

impl std::fmt::Display for AgentPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
