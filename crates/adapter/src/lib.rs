//! Adapter - drives an external solitaire engine over stdin/stdout
//!
//! The engine is a child process. After launch it prints one turn; every
//! action id line written to its stdin is answered by exactly one more turn.
//!
//! # Session Lifecycle
//!
//! ```text
//! start() -> NotStarted -- initial_turn() --> Running -- step()* --> ...
//!                                                |
//!             close() from any state --> Closed  |  fatal error --> Crashed
//! ```
//!
//! - Out-of-range or illegal ids are refused before anything is written and
//!   leave the session running.
//! - Timeouts, malformed turns, and mid-turn end of stream kill the engine.
//! - A clean exit between turns is reported as `ProcessExited`.
//!
//! # Environment Variables
//!
//! - `SOLITAIRE_ENGINE`: engine executable (default: `./solitaire.exe`)
//! - `SOLITAIRE_ENGINE_ARGS`: whitespace separated engine arguments
//! - `SOLITAIRE_DUMP_LAYOUT`: `standard` or `facedown-counts` (default: standard)
//! - `SOLITAIRE_READ_TIMEOUT_MS`: per-turn read timeout (default: 5000)
//! - `SOLITAIRE_ENFORCE_LEGAL`: refuse ids outside the legal set (default: true)
//! - `SOLITAIRE_WIRE_LOG`: append a transcript of the pipe to this file

pub mod config;
pub mod error;
pub mod runtime;
pub mod session;
pub mod wire_log;

pub use solitaire_gym_core as core;
pub use solitaire_gym_types as types;

pub use config::EngineConfig;
pub use error::EngineError;
pub use runtime::Session;
pub use session::{EngineSession, SessionState, StepOutcome};
pub use wire_log::{WireLog, WireRecord};
