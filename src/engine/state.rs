//! Shared simulation state.
//!
//! One `SimulationState` aggregate holds everything the drivers mutate
//! and the presentation layer reads: the current phase, the bounded
//! agent log buffer, the bounded threat history, the active-threat
//! reference, and the aggregate metrics. Readers receive owned
//! [`StateSnapshot`] copies; the concurrency discipline lives in
//! [`runtime`](super::runtime).

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::phase::AgentPhase;

/// Maximum number of retained agent log entries.
pub const LOG_CAPACITY: usize = 50;

/// Maximum number of retained threat events.
pub const THREAT_CAPACITY: usize = 10;

// ============================================================================
// Log entries
// ============================================================================

/// Severity level of an agent log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Routine agent activity.
    Info,
    /// Verbose internals (packet batches, z-scores).
    Debug,
    /// Degraded but non-critical conditions.
    Warning,
    /// Attack detections and response decisions.
    Critical,
    /// Confirmed deception engagement.
    Success,
}

/// A single agent log line. Immutable once created; owned exclusively
/// by the log buffer.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    /// When the line was emitted.
    pub timestamp: DateTime<Utc>,
    /// Severity level.
    pub level: LogLevel,
    /// Rendered message text.
    pub message: String,
    /// Emitting component, in the agent core's module notation
    /// (e.g. `core.agent.brain`).
    pub component: String,
}

// ============================================================================
// Threat events
// ============================================================================

/// Lifecycle status of a threat event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThreatStatus {
    /// Freshly synthesized, not yet acted upon.
    Detected,
    /// Under analysis.
    Analyzing,
    /// Redirected into the honeypot at the terminal phase.
    Honeypotted,
    /// Hard-blocked at the network layer.
    Blocked,
}

/// A synthetic attacker event.
///
/// Created by the threat generator; its `status` is mutated in place
/// only by the reactor when the owning cycle reaches the terminal phase.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatEvent {
    /// Opaque unique id.
    pub id: Uuid,
    /// Attacker source address, drawn from the synthetic pool.
    pub source_address: String,
    /// When the threat was synthesized.
    pub timestamp: DateTime<Utc>,
    /// Severity in `[60, 100)`.
    pub severity: u8,
    /// Anomaly score in `[0, 1_000_000)`.
    pub anomaly_score: u32,
    /// Current lifecycle status.
    pub status: ThreatStatus,
    /// Free-form resolution note; currently always empty.
    pub reason: String,
}

// ============================================================================
// Metrics
// ============================================================================

/// Running aggregate counters consumed by the dashboard stat tiles.
///
/// `total_threats` and `blocked` are monotonically non-decreasing.
/// `health_score` is a static indicator: nothing updates it after
/// seeding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    /// Threats generated, +1 per generator tick exactly.
    pub total_threats: u64,
    /// Threats resolved at the terminal phase, at most once each.
    pub blocked: u64,
    /// Anomaly observations, incremented only by the generator.
    pub anomalies: u64,
    /// Overall system health indicator.
    pub health_score: f64,
}

impl Default for Metrics {
    /// Seed values the dashboard stat tiles start from.
    fn default() -> Self {
        Self {
            total_threats: 28,
            blocked: 27,
            anomalies: 142,
            health_score: 99.8,
        }
    }
}

// ============================================================================
// Simulation state
// ============================================================================

/// The process-wide simulation aggregate.
///
/// All mutators are plain `&mut self` methods; atomicity with respect to
/// concurrent readers is provided by the engine runtime, which wraps one
/// instance in a mutex and keeps every mutation inside a single critical
/// section.
#[derive(Debug)]
pub struct SimulationState {
    phase: AgentPhase,
    logs: VecDeque<LogEntry>,
    threats: VecDeque<ThreatEvent>,
    active_threat: Option<Uuid>,
    metrics: Metrics,
    /// Last `(phase, active threat)` pair the reactor fired for.
    last_reaction: Option<(AgentPhase, Uuid)>,
}

impl SimulationState {
    /// Creates the resting pre-start state: `Idle`, empty buffers,
    /// seeded metrics.
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: AgentPhase::Idle,
            logs: VecDeque::with_capacity(LOG_CAPACITY),
            threats: VecDeque::with_capacity(THREAT_CAPACITY),
            active_threat: None,
            metrics: Metrics::default(),
            last_reaction: None,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> AgentPhase {
        self.phase
    }

    pub(crate) const fn set_phase(&mut self, phase: AgentPhase) {
        self.phase = phase;
    }

    /// Retained log entries, oldest first.
    #[must_use]
    pub const fn logs(&self) -> &VecDeque<LogEntry> {
        &self.logs
    }

    /// Retained threat events, newest first.
    #[must_use]
    pub const fn threats(&self) -> &VecDeque<ThreatEvent> {
        &self.threats
    }

    /// Aggregate metrics.
    #[must_use]
    pub const fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// The active threat, resolved through its history entry.
    #[must_use]
    pub fn active_threat(&self) -> Option<&ThreatEvent> {
        let id = self.active_threat?;
        self.threats.iter().find(|t| t.id == id)
    }

    /// Appends a log line, evicting the oldest entry past capacity.
    pub fn push_log(&mut self, level: LogLevel, component: &str, message: impl Into<String>) {
        if self.logs.len() == LOG_CAPACITY {
            self.logs.pop_front();
        }
        self.logs.push_back(LogEntry {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            component: component.to_owned(),
        });
    }

    /// Records a freshly synthesized threat.
    ///
    /// Pushes it onto the history (evicting the oldest past capacity),
    /// makes it the active threat, and applies the generator's counter
    /// increments. The superseded threat, if any, stays in history with
    /// whatever status it last had.
    pub fn record_threat(&mut self, threat: ThreatEvent, anomaly_delta: u64) {
        self.active_threat = Some(threat.id);
        self.threats.push_front(threat);
        self.threats.truncate(THREAT_CAPACITY);
        self.metrics.total_threats += 1;
        self.metrics.anomalies += anomaly_delta;
    }

    /// Marks the active threat `Honeypotted` and counts it blocked.
    ///
    /// Returns a copy of the resolved event, or `None` when there is no
    /// active threat or it was already resolved — the blocked counter is
    /// never incremented twice for one threat.
    pub(crate) fn resolve_active_threat(&mut self) -> Option<ThreatEvent> {
        let id = self.active_threat?;
        let threat = self.threats.iter_mut().find(|t| t.id == id)?;
        if threat.status == ThreatStatus::Honeypotted {
            return None;
        }
        threat.status = ThreatStatus::Honeypotted;
        self.metrics.blocked += 1;
        Some(threat.clone())
    }

    /// Returns the current `(phase, active threat)` pair when it differs
    /// from the last pair the reactor fired for, recording it as
    /// observed. Returns `None` while no threat is active, in `Idle`,
    /// or when the pair is unchanged — re-observing the same pair must
    /// not re-fire the reactor.
    pub(crate) fn observe_reaction_pair(&mut self) -> Option<(AgentPhase, Uuid)> {
        let id = self.active_threat?;
        if self.phase == AgentPhase::Idle {
            return None;
        }
        let pair = (self.phase, id);
        if self.last_reaction == Some(pair) {
            return None;
        }
        self.last_reaction = Some(pair);
        Some(pair)
    }

    /// Takes an owned, consistent copy of the state for readers.
    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            phase: self.phase,
            logs: self.logs.iter().cloned().collect(),
            threats: self.threats.iter().cloned().collect(),
            active_threat: self.active_threat().cloned(),
            metrics: self.metrics,
        }
    }
}

impl Default for SimulationState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Read-only copy of the simulation state handed to the presentation
/// layer. Field names serialize in the dashboard wire form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    /// Phase at snapshot time.
    pub phase: AgentPhase,
    /// Log entries, oldest first.
    pub logs: Vec<LogEntry>,
    /// Threat history, newest first.
    pub threats: Vec<ThreatEvent>,
    /// The active threat, if one exists.
    pub active_threat: Option<ThreatEvent>,
    /// Aggregate metrics.
    pub metrics: Metrics,
}

// ============================================================================
// Tests
// ============================================================================
