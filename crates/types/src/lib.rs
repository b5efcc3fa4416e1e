//! Core types module - shared data structures and constants
//!
//! This crate defines the plain data exchanged between the RL agent and the
//! external Klondike engine. Everything here is a `Copy` value type with no I/O,
//! so it can be used from the decoder, the session layer and the binaries alike.
//!
//! # Deck Layout
//!
//! A card's wire index is `suit * 13 + rank`, with rank 0-indexed (Ace = 0):
//!
//! | Suit | Index range |
//! |------|-------------|
//! | Clubs | 0-12 |
//! | Diamonds | 13-25 |
//! | Hearts | 26-38 |
//! | Spades | 39-51 |
//!
//! The engine reports a hidden card with [`FACE_DOWN_TOKEN`] (`-1`).
//!
//! # Table Layout
//!
//! - **Draw**: the undealt stock
//! - **Waste**: face-up discards from the stock
//! - **Foundations**: 4 piles, built up from Ace by suit
//! - **Tableaus**: 7 piles, a face-down prefix plus a face-up run
//!
//! # Action Space
//!
//! Every move shape maps to one id in `[0, ACTION_SPACE_SIZE)`:
//!
//! | Kind | Count |
//! |------|-------|
//! | Draw | 1 |
//! | Flip | 1 |
//! | Waste -> Foundation | 4 |
//! | Waste -> Tableau | 7 |
//! | Tableau -> Foundation | 28 |
//! | Tableau -> Tableau | 546 |
//! | Foundation -> Tableau | 28 |
//!
//! # Examples
//!
//! ```
//! use solitaire_gym_types::{Action, ActionId, Card, Rank, Suit, ACTION_SPACE_SIZE};
//!
//! let card = Card::new(Suit::Clubs, Rank::Four);
//! assert_eq!(card.index(), 3);
//! assert_eq!(card.to_string(), "4C");
//!
//! assert_eq!(ACTION_SPACE_SIZE, 615);
//! assert!(ActionId::new(614).is_some());
//! assert!(ActionId::new(615).is_none());
//! assert_eq!(Action::Draw.to_string(), "draw");
//! ```

pub mod action;
pub mod card;

pub use action::{
    Action, ActionId, ActionKind, FoundationIndex, RunLength, TableauIndex, ACTION_SPACE_SIZE,
    DRAW_ACTIONS, FLIP_ACTIONS, FOUNDATION_TO_TABLEAU_ACTIONS, TABLEAU_TO_FOUNDATION_ACTIONS,
    TABLEAU_TO_TABLEAU_ACTIONS, WASTE_TO_FOUNDATION_ACTIONS, WASTE_TO_TABLEAU_ACTIONS,
};
pub use card::{Card, CardToken, Rank, Suit};

/// Number of suits (4)
pub const SUITS: u8 = 4;

/// Number of ranks per suit (13)
pub const RANKS: u8 = 13;

/// Cards in a full deck (52)
pub const DECK_SIZE: u8 = SUITS * RANKS;

/// Number of tableau piles (7)
pub const TABLEAUS: u8 = 7;

/// Number of foundation piles, one per suit (4)
pub const FOUNDATIONS: u8 = SUITS;

/// Longest face-up run a tableau can hold (King down to Ace)
pub const MAX_RUN_LENGTH: u8 = RANKS;

/// Token the engine writes for a card whose identity is hidden.
pub const FACE_DOWN_TOKEN: i32 = -1;
