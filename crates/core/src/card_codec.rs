//! Card codec: wire tokens <-> cards.

use crate::error::CardError;
use crate::types::{Card, CardToken, DECK_SIZE, FACE_DOWN_TOKEN};

/// Decode one engine token.
///
/// `0..=51` is a face-up card, [`FACE_DOWN_TOKEN`] a hidden one; anything else is malformed.
pub fn decode(token: i32) -> Result<CardToken, CardError> {
    if token == FACE_DOWN_TOKEN {
        return Ok(CardToken::FaceDown);
    }
    u8::try_from(token)
        .ok()
        .and_then(Card::from_index)
        .map(CardToken::Up)
        .ok_or(CardError::MalformedToken(token))
}

/// Wire index of a face-up card. Hidden cards have no encoding.
pub fn encode(card: Card) -> u8 {
    card.index()
}

/// Number of distinct face-up tokens.
pub const CARD_TOKENS: usize = DECK_SIZE as usize;
