//! `Sentra` simulation engine
//!
//! This library simulates the Sentra autonomous deception-defense agent:
//! a four-phase reasoning cycle (Monitor → Analyze → Decide → Deploy)
//! advanced by one periodic driver, a second periodic driver that
//! synthesizes attacker threat events, and a reactor that turns every
//! change of the `(phase, active threat)` pair into agent log lines and,
//! at the Deploy phase, a honeypot containment. Presentation surfaces
//! consume read-only snapshots of the shared state.

pub mod cli;
pub mod engine;
pub mod error;
pub mod observability;
