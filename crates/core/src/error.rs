//! Error taxonomy for the codecs and the turn decoder.

use thiserror::Error;

use crate::decoder::LineKind;
use crate::types::{Card, ACTION_SPACE_SIZE};

/// Card token outside 0..=51 that is not the face-down sentinel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CardError {
    #[error("malformed card token {0}")]
    MalformedToken(i32),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// Recoverable: pick another id.
    #[error("action id {0} outside [0, {max})", max = ACTION_SPACE_SIZE)]
    ActionIdOutOfRange(u32),
    #[error("tableau move onto its own source pile")]
    SameTableau,
    /// Codec no longer round-trips; fatal before any training.
    #[error("action codec mismatch at id {id}: {detail}")]
    EncodeDecodeMismatch { id: u32, detail: String },
}

/// Fatal turn decoding failure. The stream cannot be resynchronised after any of these.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("malformed token {token:?} on line {line} ({kind}): {reason}")]
    MalformedToken {
        line: usize,
        kind: LineKind,
        token: String,
        reason: &'static str,
    },
    #[error("protocol desync: got {read} of {expected} turn lines")]
    ProtocolDesync { read: usize, expected: usize },
    #[error("board does not hold one deck: {face_up} face-up + {face_down} face-down")]
    DeckMismatch { face_up: usize, face_down: usize },
    #[error("card {0} appears more than once")]
    DuplicateCard(Card),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DecodeError {
    pub(crate) fn malformed(line: usize, kind: LineKind, token: &str, reason: &'static str) -> Self {
        DecodeError::MalformedToken {
            line,
            kind,
            token: token.to_string(),
            reason,
        }
    }
}
