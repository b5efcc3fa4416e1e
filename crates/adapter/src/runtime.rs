//! Blocking session.
//!
//! Wraps [`EngineSession`] with its own current-thread runtime so training
//! loops without an executor can drive the engine. Do not use from inside
//! another tokio runtime.

use tokio::runtime::{Builder, Runtime};

use crate::config::EngineConfig;
use crate::core::Turn;
use crate::error::EngineError;
use crate::session::{EngineSession, SessionState, StepOutcome};
use crate::types::ActionId;

pub struct Session {
    inner: EngineSession,
    rt: Runtime,
}

impl Session {
    pub fn start(config: EngineConfig) -> Result<Self, EngineError> {
        let rt = Builder::new_current_thread().enable_all().build()?;
        let inner = rt.block_on(EngineSession::start(config))?;
        Ok(Self { inner, rt })
    }

    pub fn start_from_env() -> Result<Self, EngineError> {
        Self::start(EngineConfig::from_env())
    }

    pub fn initial_turn(&mut self) -> Result<Turn, EngineError> {
        self.rt.block_on(self.inner.initial_turn())
    }

    pub fn step(&mut self, id: ActionId) -> Result<StepOutcome, EngineError> {
        self.rt.block_on(self.inner.step(id))
    }

    pub fn step_raw(&mut self, raw: u32) -> Result<StepOutcome, EngineError> {
        self.rt.block_on(self.inner.step_raw(raw))
    }

    pub fn close(&mut self) -> Option<i32> {
        self.rt.block_on(self.inner.close())
    }

    pub fn state(&self) -> SessionState {
        self.inner.state()
    }

    pub fn last_turn(&self) -> Option<&Turn> {
        self.inner.last_turn()
    }

    pub fn steps(&self) -> u64 {
        self.inner.steps()
    }

    pub fn config(&self) -> &EngineConfig {
        self.inner.config()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.inner.state() != SessionState::Closed {
            self.rt.block_on(self.inner.close());
        }
    }
}
