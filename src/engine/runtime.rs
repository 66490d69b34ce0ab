//! Engine runtime.
//!
//! The `SimulationEngine` wraps one [`SimulationState`] behind a mutex
//! and serializes every mutation — phase advance, threat generation,
//! reactor output, metrics update — into a single short critical
//! section, so a concurrent snapshot never observes a partially-applied
//! update. Two background tasks drive the timers; a cancellation token
//! plus a `running` flag checked under the state mutex give race-free
//! shutdown: once `shutdown()` returns, no tick mutates the state.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::EngineError;
use crate::observability::events::{Event, EventEmitter};
use crate::observability::metrics as telemetry;

use super::phase::AgentPhase;
use super::reactor::{self, COMPONENT_BRAIN, Reaction};
use super::state::{LogLevel, SimulationState, StateSnapshot, ThreatEvent};
use super::synth;

/// Cycle driver period.
pub const CYCLE_PERIOD: Duration = Duration::from_secs(8);

/// Threat generator period.
pub const THREAT_PERIOD: Duration = Duration::from_secs(12);

/// Everything the mutex guards: the shared state, the RNG feeding
/// synthesis and reactor numerics, and the running flag consulted by
/// every tick body.
struct EngineInner {
    state: SimulationState,
    rng: StdRng,
    running: bool,
}

/// Join handles for the two driver tasks, returned from
/// [`SimulationEngine::start`].
#[derive(Debug)]
pub struct DriverHandles {
    /// The cycle driver task.
    pub cycle: JoinHandle<()>,
    /// The threat generator task.
    pub threats: JoinHandle<()>,
}

impl DriverHandles {
    /// Awaits both driver tasks. Join errors are ignored — the tasks
    /// carry no results and abort only at shutdown.
    pub async fn join(self) {
        let _ = self.cycle.await;
        let _ = self.threats.await;
    }
}

/// The simulation engine.
///
/// One engine runs at most once: [`start`](Self::start) spawns the two
/// periodic drivers, [`shutdown`](Self::shutdown) stops them and parks
/// the state in `Idle`. Presentation surfaces call
/// [`snapshot`](Self::snapshot) and never mutate.
pub struct SimulationEngine {
    inner: Mutex<EngineInner>,
    cancel: CancellationToken,
    emitter: Arc<EventEmitter>,
}

impl SimulationEngine {
    /// Creates an engine with an OS-seeded RNG.
    #[must_use]
    pub fn new(emitter: Arc<EventEmitter>) -> Self {
        Self::from_rng(StdRng::from_os_rng(), emitter)
    }

    /// Creates an engine whose simulation replays deterministically for
    /// the given seed.
    #[must_use]
    pub fn with_seed(seed: u64, emitter: Arc<EventEmitter>) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed), emitter)
    }

    fn from_rng(rng: StdRng, emitter: Arc<EventEmitter>) -> Self {
        Self {
            inner: Mutex::new(EngineInner {
                state: SimulationState::new(),
                rng,
                running: false,
            }),
            cancel: CancellationToken::new(),
            emitter,
        }
    }

    fn lock_inner(&self) -> MutexGuard<'_, EngineInner> {
        self.inner.lock().expect("engine state lock poisoned")
    }

    /// Whether the engine is currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.lock_inner().running
    }

    /// Starts the simulation: enters `Monitor` and spawns the cycle
    /// driver and threat generator tasks.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::AlreadyRunning`] if the engine is running,
    /// or [`EngineError::Stopped`] if it was already shut down — a
    /// stopped engine is discarded, not restarted.
    pub fn start(self: &Arc<Self>) -> Result<DriverHandles, EngineError> {
        {
            let mut inner = self.lock_inner();
            if inner.running {
                return Err(EngineError::AlreadyRunning);
            }
            if self.cancel.is_cancelled() {
                return Err(EngineError::Stopped);
            }
            inner.state.set_phase(AgentPhase::Monitor);
            inner.running = true;
            telemetry::set_current_phase(AgentPhase::Monitor.as_str(), None);
            telemetry::set_domain_gauges(inner.state.metrics());
        }

        info!(
            cycle_period_secs = CYCLE_PERIOD.as_secs(),
            threat_period_secs = THREAT_PERIOD.as_secs(),
            "simulation engine started"
        );
        self.emitter.emit(Event::EngineStarted {
            timestamp: Utc::now(),
            cycle_period_secs: CYCLE_PERIOD.as_secs(),
            threat_period_secs: THREAT_PERIOD.as_secs(),
        });

        Ok(DriverHandles {
            cycle: self.spawn_cycle_driver(),
            threats: self.spawn_threat_driver(),
        })
    }

    /// Stops the simulation.
    ///
    /// The running flag is cleared under the state mutex before the
    /// token is cancelled, so a tick racing with shutdown observes the
    /// stop inside its critical section and becomes a no-op — no timer
    /// work lands after this returns. Idempotent.
    pub fn shutdown(&self, reason: &str) {
        let was_running = {
            let mut inner = self.lock_inner();
            let was_running = inner.running;
            inner.running = false;
            inner.state.set_phase(AgentPhase::Idle);
            was_running
        };
        self.cancel.cancel();

        if was_running {
            info!(reason, "simulation engine stopped");
            self.emitter.emit(Event::EngineStopped {
                timestamp: Utc::now(),
                reason: reason.to_owned(),
            });
        }
    }

    /// Takes a consistent read-only snapshot of the simulation state.
    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        self.lock_inner().state.snapshot()
    }

    /// Advances the cycle one step.
    ///
    /// One atomic unit: the phase moves to its successor and the reactor
    /// fires for the new `(phase, active threat)` pair before the lock
    /// is released. Returns the new phase, or `None` when the engine is
    /// not running (ticks racing with shutdown land here).
    pub fn advance_cycle(&self) -> Option<AgentPhase> {
        let (events, next) = {
            let mut inner = self.lock_inner();
            if !inner.running {
                return None;
            }

            let prev = inner.state.phase();
            let next = prev.next();
            inner.state.set_phase(next);
            debug!(from = %prev, to = %next, "cycle advanced");
            telemetry::record_phase_transition(prev.as_str(), next.as_str());
            telemetry::set_current_phase(next.as_str(), Some(prev.as_str()));

            let mut events = vec![Event::PhaseEntered {
                timestamp: Utc::now(),
                phase: next,
            }];
            let inner = &mut *inner;
            collect_reaction(
                reactor::react(&mut inner.state, &mut inner.rng),
                &mut events,
            );
            telemetry::set_domain_gauges(inner.state.metrics());
            (events, next)
        };

        for event in events {
            self.emitter.emit(event);
        }
        Some(next)
    }

    /// Generates one synthetic threat.
    ///
    /// One atomic unit: the threat is recorded and made active, the
    /// detection log line is appended, the counters move, and the
    /// reactor fires for the changed pair — all before the lock is
    /// released. Returns a copy of the generated threat, or `None` when
    /// the engine is not running.
    pub fn generate_threat(&self) -> Option<ThreatEvent> {
        let (events, threat) = {
            let mut inner = self.lock_inner();
            if !inner.running {
                return None;
            }

            let threat = synth::synth_threat(&mut inner.rng);
            let delta = synth::anomaly_delta(&mut inner.rng);
            info!(
                source = %threat.source_address,
                severity = threat.severity,
                "threat generated"
            );

            inner.state.record_threat(threat.clone(), delta);
            inner.state.push_log(
                LogLevel::Critical,
                COMPONENT_BRAIN,
                format!("!!! ATTACK DETECTED !!! Severity: {}", threat.severity),
            );
            telemetry::record_threat_detected(threat.severity);
            telemetry::record_anomaly_delta(delta);

            let mut events = vec![Event::ThreatDetected {
                timestamp: Utc::now(),
                threat_id: threat.id,
                source_address: threat.source_address.clone(),
                severity: threat.severity,
                anomaly_score: threat.anomaly_score,
            }];
            let inner = &mut *inner;
            collect_reaction(
                reactor::react(&mut inner.state, &mut inner.rng),
                &mut events,
            );
            telemetry::set_domain_gauges(inner.state.metrics());
            (events, threat)
        };

        for event in events {
            self.emitter.emit(event);
        }
        Some(threat)
    }

    /// Spawns the cycle driver task.
    fn spawn_cycle_driver(self: &Arc<Self>) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CYCLE_PERIOD);
            // The first tick completes immediately — consume it so the
            // initial phase holds for a full period.
            interval.tick().await;
            loop {
                tokio::select! {
                    () = engine.cancel.cancelled() => {
                        debug!("cycle driver cancelled");
                        break;
                    }
                    _ = interval.tick() => {
                        engine.advance_cycle();
                    }
                }
            }
        })
    }

    /// Spawns the threat generator task.
    fn spawn_threat_driver(self: &Arc<Self>) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(THREAT_PERIOD);
            interval.tick().await;
            loop {
                tokio::select! {
                    () = engine.cancel.cancelled() => {
                        debug!("threat driver cancelled");
                        break;
                    }
                    _ = interval.tick() => {
                        engine.generate_threat();
                    }
                }
            }
        })
    }
}

/// Folds a reactor firing into the pending event batch and telemetry.
fn collect_reaction(reaction: Option<Reaction>, events: &mut Vec<Event>) {
    if let Some(Reaction {
        contained: Some(threat),
        ..
    }) = reaction
    {
        telemetry::record_threat_contained();
        info!(
            source = %threat.source_address,
            severity = threat.severity,
            "threat honeypotted"
        );
        events.push(Event::ThreatContained {
            timestamp: Utc::now(),
            threat_id: threat.id,
            source_address: threat.source_address,
        });
    }
}

impl std::fmt::Debug for SimulationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock_inner();
        f.debug_struct("SimulationEngine")
            .field("phase", &inner.state.phase())
            .field("running", &inner.running)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Lets freshly spawned driver tasks run far enough to register
    /// their interval timers with the paused clock.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    fn seeded_engine() -> Arc<SimulationEngine> {
        Arc::new(SimulationEngine::with_seed(
            42,
            Arc::new(EventEmitter::noop()),
        ))
    }

    #[tokio::test]
    async fn test_start_enters_monitor() {
        let engine = seeded_engine();
        assert_eq!(engine.snapshot().phase, AgentPhase::Idle);

        let handles = engine.start().unwrap();
        assert!(engine.is_running());
        assert_eq!(engine.snapshot().phase, AgentPhase::Monitor);

        engine.shutdown("test over");
        handles.join().await;
    }

    #[tokio::test]
    async fn test_double_start_rejected() {
        let engine = seeded_engine();
        let handles = engine.start().unwrap();
        assert_eq!(engine.start().unwrap_err(), EngineError::AlreadyRunning);
        engine.shutdown("test over");
        handles.join().await;
    }

    #[tokio::test]
    async fn test_start_after_shutdown_rejected() {
        let engine = seeded_engine();
        let handles = engine.start().unwrap();
        engine.shutdown("test over");
        handles.join().await;
        assert_eq!(engine.start().unwrap_err(), EngineError::Stopped);
    }

    #[test]
    fn test_ticks_are_noops_before_start() {
        let engine = Arc::new(SimulationEngine::with_seed(
            1,
            Arc::new(EventEmitter::noop()),
        ));
        assert!(engine.advance_cycle().is_none());
        assert!(engine.generate_threat().is_none());
        assert_eq!(engine.snapshot().phase, AgentPhase::Idle);
    }

    #[tokio::test]
    async fn test_cycle_follows_fixed_sequence() {
        let engine = seeded_engine();
        let handles = engine.start().unwrap();

        // Phase after tick N is CYCLE[N mod 4], starting from Monitor.
        for tick in 1..=8 {
            let phase = engine.advance_cycle().unwrap();
            assert_eq!(phase, AgentPhase::CYCLE[tick % 4]);
        }

        engine.shutdown("test over");
        handles.join().await;
    }

    #[tokio::test]
    async fn test_generation_counts_exactly_once() {
        let engine = seeded_engine();
        let handles = engine.start().unwrap();
        let before = engine.snapshot().metrics.total_threats;

        engine.generate_threat().unwrap();
        let after = engine.snapshot().metrics;
        assert_eq!(after.total_threats, before + 1);
        assert!((147..157).contains(&after.anomalies));

        engine.shutdown("test over");
        handles.join().await;
    }

    #[tokio::test]
    async fn test_generation_appends_detection_log_and_reacts() {
        let engine = seeded_engine();
        let handles = engine.start().unwrap();

        let threat = engine.generate_threat().unwrap();
        let snapshot = engine.snapshot();

        // Detection line plus the Monitor-phase reaction lines.
        let detection = &snapshot.logs[0];
        assert_eq!(detection.level, LogLevel::Critical);
        assert_eq!(
            detection.message,
            format!("!!! ATTACK DETECTED !!! Severity: {}", threat.severity)
        );
        assert_eq!(snapshot.logs[1].message, "Agent State: MONITOR");
        assert_eq!(snapshot.active_threat.unwrap().id, threat.id);

        engine.shutdown("test over");
        handles.join().await;
    }

    #[tokio::test]
    async fn test_shutdown_parks_in_idle_and_blocks_ticks() {
        let engine = seeded_engine();
        let handles = engine.start().unwrap();
        engine.generate_threat().unwrap();

        engine.shutdown("test over");
        handles.join().await;

        let parked = engine.snapshot();
        assert_eq!(parked.phase, AgentPhase::Idle);

        // A tick dispatched after shutdown must not mutate anything.
        assert!(engine.advance_cycle().is_none());
        assert!(engine.generate_threat().is_none());
        let still = engine.snapshot();
        assert_eq!(still.metrics.total_threats, parked.metrics.total_threats);
        assert_eq!(still.logs.len(), parked.logs.len());
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let engine = seeded_engine();
        let handles = engine.start().unwrap();
        engine.shutdown("first");
        engine.shutdown("second");
        handles.join().await;
        assert!(!engine.is_running());
    }

    #[tokio::test]
    async fn test_emitter_sees_lifecycle_and_threats() {
        let emitter = Arc::new(EventEmitter::noop());
        let engine = Arc::new(SimulationEngine::with_seed(9, Arc::clone(&emitter)));
        let handles = engine.start().unwrap();
        engine.generate_threat().unwrap();
        engine.shutdown("test over");
        handles.join().await;

        // EngineStarted, ThreatDetected, EngineStopped at minimum.
        assert!(emitter.event_count() >= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycle_driver_ticks_on_schedule() {
        let engine = seeded_engine();
        let handles = engine.start().unwrap();
        settle().await;

        tokio::time::advance(CYCLE_PERIOD).await;
        settle().await;

        assert_eq!(engine.snapshot().phase, AgentPhase::Analyze);

        engine.shutdown("test over");
        handles.join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_threat_driver_ticks_on_schedule() {
        let engine = seeded_engine();
        let handles = engine.start().unwrap();
        let before = engine.snapshot().metrics.total_threats;
        settle().await;

        tokio::time::advance(THREAT_PERIOD).await;
        settle().await;

        assert_eq!(engine.snapshot().metrics.total_threats, before + 1);

        engine.shutdown("test over");
        handles.join().await;
    }

    #[tokio::test]
    async fn test_shutdown_stops_drivers_promptly() {
        let engine = seeded_engine();
        let handles = engine.start().unwrap();
        engine.shutdown("test over");

        tokio::time::timeout(Duration::from_secs(5), handles.join())
            .await
            .expect("driver tasks should stop after shutdown");
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_tick_lands_after_shutdown() {
        let engine = seeded_engine();
        let handles = engine.start().unwrap();
        engine.shutdown("test over");
        let parked = engine.snapshot();

        // Even with both periods elapsed many times over, nothing moves.
        settle().await;
        tokio::time::advance(Duration::from_secs(120)).await;
        settle().await;

        let still = engine.snapshot();
        assert_eq!(still.phase, AgentPhase::Idle);
        assert_eq!(still.metrics.total_threats, parked.metrics.total_threats);
        assert!(still.logs.is_empty());

        handles.join().await;
    }
}
