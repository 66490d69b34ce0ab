//! Cycle-driver behavior through the public engine API.

use std::sync::Arc;

use sentra_sim::engine::{AgentPhase, SimulationEngine};
use sentra_sim::observability::EventEmitter;

fn engine(seed: u64) -> Arc<SimulationEngine> {
    Arc::new(SimulationEngine::with_seed(
        seed,
        Arc::new(EventEmitter::noop()),
    ))
}

#[tokio::test]
async fn phase_follows_fixed_sequence_from_start() {
    let engine = engine(1);
    let handles = engine.start().unwrap();
    assert_eq!(engine.snapshot().phase, AgentPhase::Monitor);

    // Phase after tick N equals CYCLE[N mod 4] from the initial phase.
    for tick in 1..=16 {
        let phase = engine.advance_cycle().unwrap();
        assert_eq!(phase, AgentPhase::CYCLE[tick % 4], "wrong phase at tick {tick}");
        assert_eq!(engine.snapshot().phase, phase);
    }

    engine.shutdown("test over");
    handles.join().await;
}

#[tokio::test]
async fn full_cycle_without_threat_stays_silent() {
    // Scenario A: four ticks with no threat generated — the cycle runs
    // Monitor → Analyze → Decide → Deploy → Monitor and the reactor
    // emits nothing.
    let engine = engine(2);
    let handles = engine.start().unwrap();

    for expected in [
        AgentPhase::Analyze,
        AgentPhase::Decide,
        AgentPhase::Deploy,
        AgentPhase::Monitor,
    ] {
        assert_eq!(engine.advance_cycle().unwrap(), expected);
    }

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.phase, AgentPhase::Monitor);
    assert!(snapshot.logs.is_empty(), "reactor fired without a threat");
    assert!(snapshot.active_threat.is_none());

    engine.shutdown("test over");
    handles.join().await;
}

#[tokio::test]
async fn snapshots_are_read_only() {
    let engine = engine(3);
    let handles = engine.start().unwrap();
    engine.generate_threat().unwrap();

    // Polling snapshots must not re-fire the reactor or mutate anything.
    let first = engine.snapshot();
    let second = engine.snapshot();
    assert_eq!(first.logs.len(), second.logs.len());
    assert_eq!(first.metrics, second.metrics);

    engine.shutdown("test over");
    handles.join().await;
}
