//! Error types for `sentra-sim`.
//!
//! The engine itself has no runtime failure path — timers tick and
//! generation never fails — so the hierarchy covers lifecycle misuse,
//! observability I/O, and serialization only.

use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for the `sentra-sim` binary.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Engine lifecycle error (double start, start after stop)
    pub const ENGINE_ERROR: i32 = 2;

    /// I/O error (event stream file, metrics listener)
    pub const IO_ERROR: i32 = 3;

    /// Usage error (invalid arguments)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `sentra-sim` operations.
#[derive(Debug, Error)]
pub enum SentraError {
    /// Engine lifecycle error
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SentraError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Engine(_) => ExitCode::ENGINE_ERROR,
            Self::Io(_) | Self::Json(_) => ExitCode::IO_ERROR,
        }
    }
}

// ============================================================================
// Engine Errors
// ============================================================================

/// Engine lifecycle errors.
///
/// The simulation has no fallible operations while running; these cover
/// caller misuse of the start/stop lifecycle only.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The engine is already running and cannot be started twice.
    #[error("engine is already running")]
    AlreadyRunning,

    /// The engine was shut down; a stopped engine cannot be restarted.
    #[error("engine was shut down")]
    Stopped,
}

/// Result type alias for `sentra-sim` operations.
pub type Result<T> = std::result::Result<T, SentraError>;

// ============================================================================
// Tests
// ============================================================================
