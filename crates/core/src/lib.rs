//! Core protocol logic - codecs and turn decoding, no process handling
//!
//! Everything in this crate is synchronous and side-effect free apart from
//! reading from a caller-supplied `BufRead`, so the whole wire contract can be
//! tested without spawning an engine.
//!
//! # Module Structure
//!
//! - [`card_codec`]: engine tokens <-> [`Card`](types::Card), with the `-1` face-down sentinel
//! - [`action_codec`]: the dense [`Action`](types::Action) <-> [`ActionId`](types::ActionId) bijection and its startup self-check
//! - [`board`]: the decoded table snapshot and its one-deck invariant
//! - [`legal`]: the engine-reported legal set, its dense mask, and [`Turn`]
//! - [`decoder`]: line layouts, [`decode_turn`] and [`read_turn`]
//! - [`rng`]: seeded LCG shared by the runner and the fixture engine
//! - [`error`]: typed failures for all of the above
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//! use solitaire_gym_core::{action_codec, read_turn, DumpLayout};
//!
//! action_codec::ensure_self_check().unwrap();
//!
//! let mut dump = String::new();
//! dump.push_str(&vec!["-1"; 24].join(" "));
//! dump.push_str("\n\n");
//! for i in 0..7 {
//!     let mut line = vec!["-1".to_string(); i];
//!     line.push((45 + i).to_string());
//!     dump.push_str(&line.join(" "));
//!     dump.push('\n');
//! }
//! dump.push_str("\n\n\n\n0\n");
//!
//! let turn = read_turn(&mut Cursor::new(dump), DumpLayout::Standard).unwrap();
//! assert_eq!(turn.board.draw_hidden, 24);
//! assert!(turn.legal.mask()[0]);
//! ```

pub mod action_codec;
pub mod board;
pub mod card_codec;
pub mod decoder;
pub mod error;
pub mod legal;
pub mod rng;

pub use solitaire_gym_types as types;

pub use board::{Board, Pile, TableauPile};
pub use decoder::{decode_turn, read_turn, DumpLayout, LineKind};
pub use error::{ActionError, CardError, DecodeError};
pub use legal::{LegalActionSet, Turn};
pub use rng::SimpleRng;
