//! Synthetic threat generation.
//!
//! Threats are drawn from a deliberately small, recognizable parameter
//! space: one /24 attacker pool and bounded severity/anomaly ranges, so
//! dashboard fixtures stay plausible run over run. Generation is driven
//! by a seedable RNG — the same seed replays the same attack sequence.

use chrono::Utc;
use rand::Rng;
use rand::rngs::StdRng;
use uuid::Uuid;

use super::state::{ThreatEvent, ThreatStatus};

/// Synthetic attacker pool: one /24, host octet in `[1, 10]`.
const ADDRESS_PREFIX: &str = "172.18.0.";
const HOST_OCTET_MIN: u8 = 1;
const HOST_OCTET_MAX: u8 = 10;

/// Severity range, `[60, 100)`.
const SEVERITY_MIN: u8 = 60;
const SEVERITY_MAX: u8 = 100;

/// Anomaly score range, `[0, 1_000_000)`.
const ANOMALY_SCORE_MAX: u32 = 1_000_000;

/// Per-generation anomaly counter delta, `[5, 15)`.
const ANOMALY_DELTA_MIN: u64 = 5;
const ANOMALY_DELTA_MAX: u64 = 15;

/// Draws a source address from the synthetic attacker pool.
#[must_use]
pub fn synth_source_address(rng: &mut StdRng) -> String {
    let host = rng.random_range(HOST_OCTET_MIN..=HOST_OCTET_MAX);
    format!("{ADDRESS_PREFIX}{host}")
}

/// Synthesizes one freshly detected threat event.
#[must_use]
pub fn synth_threat(rng: &mut StdRng) -> ThreatEvent {
    ThreatEvent {
        id: Uuid::new_v4(),
        source_address: synth_source_address(rng),
        timestamp: Utc::now(),
        severity: rng.random_range(SEVERITY_MIN..SEVERITY_MAX),
        anomaly_score: rng.random_range(0..ANOMALY_SCORE_MAX),
        status: ThreatStatus::Detected,
        reason: String::new(),
    }
}

/// Draws the anomaly-counter increment that accompanies one generation
/// tick.
#[must_use]
pub fn anomaly_delta(rng: &mut StdRng) -> u64 {
    rng.random_range(ANOMALY_DELTA_MIN..ANOMALY_DELTA_MAX)
}
