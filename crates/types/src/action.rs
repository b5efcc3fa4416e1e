//! Move shapes and action ids.
//!
//! `Action` is the semantic move; `ActionId` is its dense integer form on the
//! wire. The mapping between the two lives in the core crate's action codec.

use std::fmt;

use serde::Serialize;

use crate::{FOUNDATIONS, MAX_RUN_LENGTH, TABLEAUS};

pub const DRAW_ACTIONS: usize = 1;
pub const FLIP_ACTIONS: usize = 1;
pub const WASTE_TO_FOUNDATION_ACTIONS: usize = FOUNDATIONS as usize;
pub const WASTE_TO_TABLEAU_ACTIONS: usize = TABLEAUS as usize;
pub const TABLEAU_TO_FOUNDATION_ACTIONS: usize = TABLEAUS as usize * FOUNDATIONS as usize;
/// Source x destination (never the source itself) x run length.
pub const TABLEAU_TO_TABLEAU_ACTIONS: usize =
    TABLEAUS as usize * (TABLEAUS as usize - 1) * MAX_RUN_LENGTH as usize;
pub const FOUNDATION_TO_TABLEAU_ACTIONS: usize = FOUNDATIONS as usize * TABLEAUS as usize;

/// Size of the dense action space (615).
pub const ACTION_SPACE_SIZE: usize = DRAW_ACTIONS
    + FLIP_ACTIONS
    + WASTE_TO_FOUNDATION_ACTIONS
    + WASTE_TO_TABLEAU_ACTIONS
    + TABLEAU_TO_FOUNDATION_ACTIONS
    + TABLEAU_TO_TABLEAU_ACTIONS
    + FOUNDATION_TO_TABLEAU_ACTIONS;

/// Tableau pile index in 0..7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableauIndex(u8);

impl TableauIndex {
    pub fn new(index: u8) -> Option<Self> {
        (index < TABLEAUS).then_some(Self(index))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (0..TABLEAUS).map(Self)
    }
}

/// Foundation pile index in 0..4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FoundationIndex(u8);

impl FoundationIndex {
    pub fn new(index: u8) -> Option<Self> {
        (index < FOUNDATIONS).then_some(Self(index))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (0..FOUNDATIONS).map(Self)
    }
}

/// Number of cards moved in a tableau-to-tableau move, 1..=13.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunLength(u8);

impl RunLength {
    pub const SINGLE: RunLength = RunLength(1);

    pub fn new(len: u8) -> Option<Self> {
        (1..=MAX_RUN_LENGTH).contains(&len).then_some(Self(len))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (1..=MAX_RUN_LENGTH).map(Self)
    }
}

/// Move partitions, in id order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Draw,
    Flip,
    WasteToFoundation,
    WasteToTableau,
    TableauToFoundation,
    TableauToTableau,
    FoundationToTableau,
}

impl ActionKind {
    pub const ALL: [ActionKind; 7] = [
        ActionKind::Draw,
        ActionKind::Flip,
        ActionKind::WasteToFoundation,
        ActionKind::WasteToTableau,
        ActionKind::TableauToFoundation,
        ActionKind::TableauToTableau,
        ActionKind::FoundationToTableau,
    ];

    /// Number of ids reserved for this partition.
    pub const fn count(self) -> usize {
        match self {
            ActionKind::Draw => DRAW_ACTIONS,
            ActionKind::Flip => FLIP_ACTIONS,
            ActionKind::WasteToFoundation => WASTE_TO_FOUNDATION_ACTIONS,
            ActionKind::WasteToTableau => WASTE_TO_TABLEAU_ACTIONS,
            ActionKind::TableauToFoundation => TABLEAU_TO_FOUNDATION_ACTIONS,
            ActionKind::TableauToTableau => TABLEAU_TO_TABLEAU_ACTIONS,
            ActionKind::FoundationToTableau => FOUNDATION_TO_TABLEAU_ACTIONS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Draw => "draw",
            ActionKind::Flip => "flip",
            ActionKind::WasteToFoundation => "waste_to_foundation",
            ActionKind::WasteToTableau => "waste_to_tableau",
            ActionKind::TableauToFoundation => "tableau_to_foundation",
            ActionKind::TableauToTableau => "tableau_to_tableau",
            ActionKind::FoundationToTableau => "foundation_to_tableau",
        }
    }
}

/// A semantic move. Whether it is legal is decided by the engine alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Deal from the stock (or recycle the waste when the stock is empty).
    Draw,
    /// Turn over the exposed face-down tableau card.
    Flip,
    WasteToFoundation {
        foundation: FoundationIndex,
    },
    WasteToTableau {
        tableau: TableauIndex,
    },
    TableauToFoundation {
        tableau: TableauIndex,
        foundation: FoundationIndex,
    },
    /// Move the top `len` face-up cards of `from` onto `to`.
    TableauToTableau {
        from: TableauIndex,
        to: TableauIndex,
        len: RunLength,
    },
    FoundationToTableau {
        foundation: FoundationIndex,
        tableau: TableauIndex,
    },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Draw => ActionKind::Draw,
            Action::Flip => ActionKind::Flip,
            Action::WasteToFoundation { .. } => ActionKind::WasteToFoundation,
            Action::WasteToTableau { .. } => ActionKind::WasteToTableau,
            Action::TableauToFoundation { .. } => ActionKind::TableauToFoundation,
            Action::TableauToTableau { .. } => ActionKind::TableauToTableau,
            Action::FoundationToTableau { .. } => ActionKind::FoundationToTableau,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Draw => write!(f, "draw"),
            Action::Flip => write!(f, "flip"),
            Action::WasteToFoundation { foundation } => write!(f, "w->f{}", foundation.get()),
            Action::WasteToTableau { tableau } => write!(f, "w->t{}", tableau.get()),
            Action::TableauToFoundation {
                tableau,
                foundation,
            } => write!(f, "t{}->f{}", tableau.get(), foundation.get()),
            Action::TableauToTableau { from, to, len } => {
                write!(f, "t{}->t{} x{}", from.get(), to.get(), len.get())
            }
            Action::FoundationToTableau {
                foundation,
                tableau,
            } => write!(f, "f{}->t{}", foundation.get(), tableau.get()),
        }
    }
}

/// Dense action id in `[0, ACTION_SPACE_SIZE)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "u16")]
pub struct ActionId(u16);

impl ActionId {
    /// Id for a raw integer, `None` outside the action space.
    pub fn new(raw: u32) -> Option<Self> {
        ((raw as usize) < ACTION_SPACE_SIZE).then_some(Self(raw as u16))
    }

    pub fn get(self) -> u16 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Every id in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..ACTION_SPACE_SIZE as u16).map(Self)
    }
}

impl From<ActionId> for u16 {
    fn from(value: ActionId) -> Self {
        value.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
