//! Bounded-buffer invariants through the public API.

use std::sync::Arc;

use sentra_sim::engine::{
    LOG_CAPACITY, SimulationEngine, THREAT_CAPACITY,
};
use sentra_sim::observability::EventEmitter;

fn engine(seed: u64) -> Arc<SimulationEngine> {
    Arc::new(SimulationEngine::with_seed(
        seed,
        Arc::new(EventEmitter::noop()),
    ))
}

#[tokio::test]
async fn threat_history_keeps_ten_most_recent() {
    // Scenario C: generate 11 threats in sequence.
    let engine = engine(20);
    let handles = engine.start().unwrap();

    let mut ids = Vec::new();
    for _ in 0..11 {
        ids.push(engine.generate_threat().unwrap().id);
    }

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.threats.len(), THREAT_CAPACITY);

    // The first threat was discarded; the remaining ten are the most
    // recent, newest first.
    let retained: Vec<_> = snapshot.threats.iter().map(|t| t.id).collect();
    assert!(!retained.contains(&ids[0]));
    for id in &ids[1..] {
        assert!(retained.contains(id));
    }
    assert_eq!(retained[0], ids[10]);

    // The active reference tracks the newest entry.
    assert_eq!(snapshot.active_threat.unwrap().id, ids[10]);
    assert_eq!(snapshot.metrics.total_threats, 28 + 11);

    engine.shutdown("test over");
    handles.join().await;
}

#[tokio::test]
async fn log_buffer_never_exceeds_capacity() {
    let engine = engine(21);
    let handles = engine.start().unwrap();

    engine.generate_threat().unwrap();

    // Each full revolution with an active threat emits 11 lines; run
    // enough of them to pass the cap several times over.
    for _ in 0..40 {
        engine.advance_cycle().unwrap();
        assert!(engine.snapshot().logs.len() <= LOG_CAPACITY);
    }

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.logs.len(), LOG_CAPACITY);

    // Oldest-first eviction: the initial detection line is long gone.
    assert!(
        !snapshot
            .logs
            .iter()
            .any(|l| l.message.starts_with("!!! ATTACK DETECTED !!!")),
        "oldest entries should have been evicted first"
    );

    engine.shutdown("test over");
    handles.join().await;
}

#[tokio::test]
async fn log_buffer_stays_in_emission_order() {
    let engine = engine(22);
    let handles = engine.start().unwrap();

    engine.generate_threat().unwrap();
    for _ in 0..4 {
        engine.advance_cycle().unwrap();
    }

    let snapshot = engine.snapshot();
    for pair in snapshot.logs.windows(2) {
        assert!(
            pair[0].timestamp <= pair[1].timestamp,
            "log buffer out of order"
        );
    }

    engine.shutdown("test over");
    handles.join().await;
}
