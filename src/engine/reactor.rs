//! Phase reactor.
//!
//! The reactor is not independently clocked: it runs inside the same
//! critical section as whichever mutation last changed the
//! `(phase, active threat)` pair, observing a consistent view of both.
//! It synthesizes the phase-appropriate agent log lines and, at the
//! terminal phase, resolves the active threat into the honeypot.

use rand::Rng;
use rand::rngs::StdRng;

use super::phase::AgentPhase;
use super::state::{LogLevel, SimulationState, ThreatEvent};

/// Component tag of the agent reasoning core.
pub(crate) const COMPONENT_BRAIN: &str = "core.agent.brain";

/// Component tag of the analysis entry point.
pub(crate) const COMPONENT_MAIN: &str = "__main__";

/// Component tag of the deception orchestrator.
pub(crate) const COMPONENT_DECEPTION: &str = "core.deception.deception";

/// What one reactor firing did, for telemetry and event emission.
#[derive(Debug)]
pub(crate) struct Reaction {
    /// The phase the reactor fired for.
    pub phase: AgentPhase,
    /// The threat resolved at the terminal phase, when this firing
    /// resolved one.
    pub contained: Option<ThreatEvent>,
}

/// Fires the reactor if the `(phase, active threat)` pair changed since
/// the last firing.
///
/// A no-op (returning `None`) while no threat is active or when the pair
/// is unchanged — the reactor triggers strictly on change, never on
/// poll. Synthetic numerics in the log lines are drawn from the engine
/// RNG so a seeded run replays byte-identical log text.
pub(crate) fn react(state: &mut SimulationState, rng: &mut StdRng) -> Option<Reaction> {
    let (phase, _id) = state.observe_reaction_pair()?;
    let threat = state.active_threat()?;
    let addr = threat.source_address.clone();
    let anomaly_score = threat.anomaly_score;

    let mut contained = None;
    match phase {
        AgentPhase::Monitor => {
            state.push_log(LogLevel::Info, COMPONENT_BRAIN, "Agent State: MONITOR");
            state.push_log(
                LogLevel::Debug,
                COMPONENT_MAIN,
                format!(
                    "Processing batch of {} packets...",
                    rng.random_range(30..80)
                ),
            );
        }
        AgentPhase::Analyze => {
            state.push_log(LogLevel::Info, COMPONENT_BRAIN, "Agent State: ANALYZE");
            state.push_log(
                LogLevel::Debug,
                COMPONENT_MAIN,
                format!(
                    "Z-Score: {:.2} | Base: {} \u{b1} {}",
                    rng.random_range(0.0..2.0),
                    rng.random_range(0..200_000),
                    rng.random_range(0..80_000),
                ),
            );
            state.push_log(
                LogLevel::Info,
                COMPONENT_MAIN,
                format!("[DEFENSE] Anomaly Score: {:.4}", f64::from(anomaly_score)),
            );
        }
        AgentPhase::Decide => {
            state.push_log(LogLevel::Info, COMPONENT_BRAIN, "Agent State: DECIDE");
            state.push_log(
                LogLevel::Critical,
                COMPONENT_MAIN,
                format!("AGENT RESPONSE: {{'intent': 'DEPLOY_HONEYPOT', 'target': '{addr}'}}"),
            );
        }
        AgentPhase::Deploy => {
            state.push_log(LogLevel::Info, COMPONENT_BRAIN, "Agent State: DEPLOY");
            state.push_log(
                LogLevel::Info,
                COMPONENT_DECEPTION,
                format!("[DECEPTION] HONEYPOTTED Attacker {addr} redirected to Cowrie honeypot"),
            );
            state.push_log(
                LogLevel::Info,
                COMPONENT_DECEPTION,
                format!(
                    "[DECEPTION] FAKE DATA SENT Sent {} bytes of fake RTSP data to {addr}",
                    rng.random_range(50..150)
                ),
            );
            state.push_log(
                LogLevel::Success,
                COMPONENT_DECEPTION,
                format!("[DECEPTION] SUCCESS Attacker {addr} is now receiving fake data!"),
            );
            contained = state.resolve_active_threat();
        }
        // observe_reaction_pair never yields Idle.
        AgentPhase::Idle => {}
    }

    Some(Reaction { phase, contained })
}

// ============================================================================
// Tests
// ============================================================================
