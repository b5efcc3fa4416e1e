use std::time::Duration;

use thiserror::Error;

use crate::core::{ActionError, DecodeError};
use crate::session::SessionState;
use crate::types::{ActionId, ACTION_SPACE_SIZE};

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code".to_string(),
    }
}

/// Session-level failure.
///
/// Only [`EngineError::ActionIdOutOfRange`] and [`EngineError::IllegalAction`]
/// leave the session usable; everything else ends it.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("failed to launch engine {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("action codec self-check failed: {0}")]
    SelfCheck(ActionError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("action id {0} outside [0, {max})", max = ACTION_SPACE_SIZE)]
    ActionIdOutOfRange(u32),
    #[error("action {0} is not in this turn's legal set")]
    IllegalAction(ActionId),
    #[error("engine process exited ({})", exit_label(.code))]
    ProcessExited { code: Option<i32> },
    #[error("engine sent no full turn within {0:?}")]
    Timeout(Duration),
    #[error("{op} called while the session is {state}")]
    InvalidState {
        op: &'static str,
        state: SessionState,
    },
    #[error("engine pipe error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// The caller may pick another action and keep going.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::ActionIdOutOfRange(_) | EngineError::IllegalAction(_)
        )
    }
}
