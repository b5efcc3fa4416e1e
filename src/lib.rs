//! Solitaire gym (workspace facade crate).
//!
//! Re-exports the workspace crates under one name so agents can depend on
//! `solitaire_gym::{types,core,adapter}` without tracking the crate split.

pub use solitaire_gym_adapter as adapter;
pub use solitaire_gym_core as core;
pub use solitaire_gym_types as types;
