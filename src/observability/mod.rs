//! Observability: engine diagnostics, telemetry metrics, and the
//! structured engine-event stream.

pub mod events;
pub mod logging;
pub mod metrics;

pub use events::{Event, EventEmitter};
pub use logging::{LogFormat, init_logging};
