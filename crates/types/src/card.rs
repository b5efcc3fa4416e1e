//! Card, Suit and Rank for a standard 52-card deck.

use std::fmt;

use serde::Serialize;

use crate::{DECK_SIZE, RANKS};

/// Card suits, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Suit {
    Clubs = 0,
    Diamonds = 1,
    Hearts = 2,
    Spades = 3,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn is_red(self) -> bool {
        matches!(self, Suit::Diamonds | Suit::Hearts)
    }

    pub fn as_char(self) -> char {
        match self {
            Suit::Clubs => 'C',
            Suit::Diamonds => 'D',
            Suit::Hearts => 'H',
            Suit::Spades => 'S',
        }
    }
}

/// Card ranks, Ace low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Rank {
    Ace = 0,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Rank number in 1..=13 (Ace = 1, King = 13).
    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    pub fn as_char(self) -> char {
        match self {
            Rank::Ace => 'A',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            r => (b'0' + r.number()) as char,
        }
    }
}

/// A face-up card, stored as its wire index in 0..=51.
///
/// ```text
/// index = suit * 13 + rank
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Card(u8);

impl Card {
    pub fn new(suit: Suit, rank: Rank) -> Self {
        Card(suit as u8 * RANKS + rank as u8)
    }

    /// Card for a wire index, `None` outside 0..=51.
    pub fn from_index(index: u8) -> Option<Self> {
        (index < DECK_SIZE).then_some(Card(index))
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn suit(self) -> Suit {
        match self.0 / RANKS {
            0 => Suit::Clubs,
            1 => Suit::Diamonds,
            2 => Suit::Hearts,
            _ => Suit::Spades,
        }
    }

    pub fn rank(self) -> Rank {
        Rank::ALL[(self.0 % RANKS) as usize]
    }

    pub fn is_red(self) -> bool {
        self.suit().is_red()
    }

    /// All 52 cards in index order.
    pub fn deck() -> impl Iterator<Item = Card> {
        (0..DECK_SIZE).map(Card)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank().as_char(), self.suit().as_char())
    }
}

impl Serialize for Card {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.0)
    }
}

/// One decoded card token: a known card, or a hidden one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardToken {
    Up(Card),
    FaceDown,
}

impl CardToken {
    pub fn card(self) -> Option<Card> {
        match self {
            CardToken::Up(card) => Some(card),
            CardToken::FaceDown => None,
        }
    }
}
