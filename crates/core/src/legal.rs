//! Per-turn legality data reported by the engine.

use arrayvec::ArrayVec;
use serde::Serialize;

use crate::board::Board;
use crate::types::{ActionId, ACTION_SPACE_SIZE};

const MASK_WORDS: usize = ACTION_SPACE_SIZE.div_ceil(64);

/// Ordered, duplicate-free set of ids the engine accepts this turn.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LegalActionSet {
    ids: ArrayVec<ActionId, ACTION_SPACE_SIZE>,
    bits: [u64; MASK_WORDS],
}

impl Default for LegalActionSet {
    fn default() -> Self {
        Self::new()
    }
}

impl LegalActionSet {
    pub fn new() -> Self {
        Self {
            ids: ArrayVec::new(),
            bits: [0; MASK_WORDS],
        }
    }

    /// Append `id`, keeping engine order. Returns false if it was already present.
    pub fn insert(&mut self, id: ActionId) -> bool {
        if self.contains(id) {
            return false;
        }
        let i = id.index();
        self.bits[i / 64] |= 1u64 << (i % 64);
        // Unique ids never exceed ACTION_SPACE_SIZE.
        self.ids.push(id);
        true
    }

    pub fn contains(&self, id: ActionId) -> bool {
        let i = id.index();
        self.bits[i / 64] & (1u64 << (i % 64)) != 0
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ActionId> + '_ {
        self.ids.iter().copied()
    }

    pub fn as_slice(&self) -> &[ActionId] {
        &self.ids
    }

    /// Dense mask over the whole action space, `true` where legal.
    pub fn mask(&self) -> [bool; ACTION_SPACE_SIZE] {
        let mut mask = [false; ACTION_SPACE_SIZE];
        for id in &self.ids {
            mask[id.index()] = true;
        }
        mask
    }
}

impl Serialize for LegalActionSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.ids.len()))?;
        for id in &self.ids {
            seq.serialize_element(&id.get())?;
        }
        seq.end()
    }
}

/// One engine turn: the table and what may be played on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub board: Board,
    pub legal: LegalActionSet,
}

impl Turn {
    /// The engine reports game over by offering no moves.
    pub fn is_terminal(&self) -> bool {
        self.legal.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u32) -> ActionId {
        ActionId::new(raw).unwrap()
    }

    #[test]
    fn keeps_engine_order_and_rejects_duplicates() {
        let mut legal = LegalActionSet::new();
        assert!(legal.insert(id(41)));
        assert!(legal.insert(id(0)));
        assert!(legal.insert(id(614)));
        assert!(!legal.insert(id(0)));
        let ids: Vec<u16> = legal.iter().map(ActionId::get).collect();
        assert_eq!(ids, vec![41, 0, 614]);
        assert_eq!(legal.len(), 3);
    }

    #[test]
    fn mask_matches_membership() {
        let mut legal = LegalActionSet::new();
        for raw in [1, 63, 64, 600] {
            legal.insert(id(raw));
        }
        let mask = legal.mask();
        for other in ActionId::all() {
            assert_eq!(mask[other.index()], legal.contains(other));
        }
        assert_eq!(mask.iter().filter(|m| **m).count(), 4);
    }

    #[test]
    fn can_hold_the_whole_space() {
        let mut legal = LegalActionSet::new();
        for a in ActionId::all() {
            assert!(legal.insert(a));
        }
        assert_eq!(legal.len(), ACTION_SPACE_SIZE);
        assert!(legal.mask().iter().all(|m| *m));
    }

    #[test]
    fn empty_set_is_terminal() {
        let turn = Turn {
            board: Board::default(),
            legal: LegalActionSet::new(),
        };
        assert!(turn.is_terminal());
        let json = serde_json::to_string(&turn.legal).unwrap();
        assert_eq!(json, "[]");
    }
}
