//! Decoded table snapshot.
//!
//! A `Board` is rebuilt from scratch every turn; the engine is the only
//! source of truth, so nothing here is ever patched in place across turns.

use arrayvec::ArrayVec;
use serde::Serialize;

use crate::error::DecodeError;
use crate::types::{Card, FoundationIndex, TableauIndex, DECK_SIZE, FOUNDATIONS, RANKS, TABLEAUS};

pub const PILE_CAPACITY: usize = DECK_SIZE as usize;

/// Cards bottom to top; the last element is the top card.
pub type Pile = ArrayVec<Card, PILE_CAPACITY>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct TableauPile {
    pub face_down: u8,
    pub face_up: Pile,
}

impl TableauPile {
    pub fn len(&self) -> usize {
        self.face_down as usize + self.face_up.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn top(&self) -> Option<Card> {
        self.face_up.last().copied()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Board {
    /// Stock cards the engine chose to reveal.
    pub draw: Pile,
    /// Stock cards reported face-down.
    pub draw_hidden: u8,
    pub waste: Pile,
    pub tableau: [TableauPile; TABLEAUS as usize],
    pub foundations: [Pile; FOUNDATIONS as usize],
}

impl Board {
    pub fn tableau(&self, index: TableauIndex) -> &TableauPile {
        &self.tableau[index.get() as usize]
    }

    pub fn foundation(&self, index: FoundationIndex) -> &Pile {
        &self.foundations[index.get() as usize]
    }

    pub fn waste_top(&self) -> Option<Card> {
        self.waste.last().copied()
    }

    pub fn stock_len(&self) -> usize {
        self.draw.len() + self.draw_hidden as usize
    }

    /// Every face-up card on the table, pile by pile.
    pub fn face_up_cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.draw
            .iter()
            .chain(self.waste.iter())
            .chain(self.tableau.iter().flat_map(|t| t.face_up.iter()))
            .chain(self.foundations.iter().flat_map(|f| f.iter()))
            .copied()
    }

    pub fn face_down_count(&self) -> usize {
        self.draw_hidden as usize
            + self
                .tableau
                .iter()
                .map(|t| t.face_down as usize)
                .sum::<usize>()
    }

    /// All four foundations complete.
    pub fn is_won(&self) -> bool {
        self.foundations.iter().all(|f| f.len() == RANKS as usize)
    }

    /// Face-up cards plus face-down counts must make exactly one deck,
    /// with no face-up card repeated.
    pub fn check_deck(&self) -> Result<(), DecodeError> {
        let mut seen = [false; PILE_CAPACITY];
        let mut face_up = 0usize;
        for card in self.face_up_cards() {
            let slot = &mut seen[card.index() as usize];
            if *slot {
                return Err(DecodeError::DuplicateCard(card));
            }
            *slot = true;
            face_up += 1;
        }

        let face_down = self.face_down_count();
        if face_up + face_down != PILE_CAPACITY {
            return Err(DecodeError::DeckMismatch { face_up, face_down });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(i: u8) -> Card {
        Card::from_index(i).unwrap()
    }

    /// Everything in the stock, face up, in index order.
    fn stock_only() -> Board {
        let mut board = Board::default();
        board.draw.extend(Card::deck());
        board
    }

    #[test]
    fn full_stock_is_one_deck() {
        let board = stock_only();
        assert!(board.check_deck().is_ok());
        assert_eq!(board.stock_len(), 52);
        assert!(!board.is_won());
    }

    #[test]
    fn hidden_cards_count_towards_the_deck() {
        let mut board = Board::default();
        board.draw_hidden = 24;
        for (i, pile) in board.tableau.iter_mut().enumerate() {
            pile.face_down = i as u8;
            pile.face_up.push(card(i as u8));
        }
        // 24 hidden stock + 21 hidden tableau + 7 face-up.
        assert_eq!(board.face_down_count(), 45);
        assert!(board.check_deck().is_ok());
        assert_eq!(board.tableau(TableauIndex::new(3).unwrap()).len(), 4);
        assert_eq!(board.tableau(TableauIndex::new(3).unwrap()).top(), Some(card(3)));
    }

    #[test]
    fn duplicate_card_is_reported() {
        let mut board = stock_only();
        board.draw.pop();
        board.waste.push(card(0));
        match board.check_deck() {
            Err(DecodeError::DuplicateCard(c)) => assert_eq!(c, card(0)),
            other => panic!("expected DuplicateCard, got {:?}", other),
        }
    }

    #[test]
    fn missing_card_is_reported() {
        let mut board = stock_only();
        board.draw.pop();
        match board.check_deck() {
            Err(DecodeError::DeckMismatch { face_up, face_down }) => {
                assert_eq!(face_up, 51);
                assert_eq!(face_down, 0);
            }
            other => panic!("expected DeckMismatch, got {:?}", other),
        }
    }

    #[test]
    fn won_when_foundations_are_full() {
        let mut board = Board::default();
        for (suit, pile) in board.foundations.iter_mut().enumerate() {
            pile.extend((0..13).map(|r| card(suit as u8 * 13 + r)));
        }
        assert!(board.check_deck().is_ok());
        assert!(board.is_won());
        assert_eq!(
            board.foundation(FoundationIndex::new(2).unwrap()).last(),
            Some(&card(38))
        );
    }

    #[test]
    fn serializes_cards_as_indices() {
        let mut board = Board::default();
        board.draw.push(card(3));
        board.draw.push(card(15));
        board.tableau[0].face_down = 2;
        let v = serde_json::to_value(&board).unwrap();
        assert_eq!(v["draw"], serde_json::json!([3, 15]));
        assert_eq!(v["tableau"][0]["face_down"], 2);
        assert_eq!(v["foundations"].as_array().unwrap().len(), 4);
    }
}
