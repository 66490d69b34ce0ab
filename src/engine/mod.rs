//! Simulation engine.
//!
//! Three cooperating parts mutate one shared state:
//!
//! - the **cycle driver** advances the four-phase reasoning loop on a
//!   fixed period,
//! - the **threat generator** synthesizes attacker events on its own
//!   fixed period,
//! - the **phase reactor** fires synchronously — inside the same
//!   critical section — whenever either driver changes the
//!   `(phase, active threat)` pair, emitting agent log lines and
//!   resolving the active threat at the terminal phase.
//!
//! # Architecture
//!
//! - [`AgentPhase`] — the reasoning cycle and its fixed sequence
//! - [`SimulationState`] — phase, bounded log/threat buffers, metrics
//! - [`SimulationEngine`] — mutex-guarded runtime, periodic drivers,
//!   race-free shutdown, read-only snapshots

pub mod phase;
pub(crate) mod reactor;
pub mod runtime;
pub mod state;
pub mod synth;

pub use phase::AgentPhase;
pub use runtime::{CYCLE_PERIOD, DriverHandles, SimulationEngine, THREAT_PERIOD};
pub use state::{
    LOG_CAPACITY, LogEntry, LogLevel, Metrics, SimulationState, StateSnapshot, THREAT_CAPACITY,
    ThreatEvent, ThreatStatus,
};
