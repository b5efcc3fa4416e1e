//! Action codec: the fixed bijection between [`Action`] and [`ActionId`].
//!
//! The engine decodes the same ids, so the boundaries below are part of the
//! wire contract. A mismatch does not crash anything; it silently mislabels
//! every training sample. [`ensure_self_check`] guards it once per process.
//!
//! | Kind | Ids | Formula |
//! |------|-----|---------|
//! | Draw | 0 | |
//! | Flip | 1 | |
//! | Waste -> Foundation | 2-5 | `2 + f` |
//! | Waste -> Tableau | 6-12 | `6 + t` |
//! | Tableau -> Foundation | 13-40 | `13 + t*4 + f` |
//! | Tableau -> Tableau | 41-586 | `41 + src*78 + slot*13 + (len-1)` |
//! | Foundation -> Tableau | 587-614 | `587 + f*7 + t` |
//!
//! `slot` is the destination index with the source skipped:
//! `dst` when `dst < src`, otherwise `dst - 1`.

use std::ops::Range;
use std::sync::OnceLock;

use crate::error::ActionError;
use crate::types::{
    Action, ActionId, ActionKind, FoundationIndex, RunLength, TableauIndex, ACTION_SPACE_SIZE,
    FOUNDATIONS, MAX_RUN_LENGTH, TABLEAUS,
};

const T: u16 = TABLEAUS as u16;
const F: u16 = FOUNDATIONS as u16;
const R: u16 = MAX_RUN_LENGTH as u16;

pub const DRAW_ID: u16 = 0;
pub const FLIP_ID: u16 = DRAW_ID + ActionKind::Draw.count() as u16;
pub const WASTE_TO_FOUNDATION_BASE: u16 = FLIP_ID + ActionKind::Flip.count() as u16;
pub const WASTE_TO_TABLEAU_BASE: u16 =
    WASTE_TO_FOUNDATION_BASE + ActionKind::WasteToFoundation.count() as u16;
pub const TABLEAU_TO_FOUNDATION_BASE: u16 =
    WASTE_TO_TABLEAU_BASE + ActionKind::WasteToTableau.count() as u16;
pub const TABLEAU_TO_TABLEAU_BASE: u16 =
    TABLEAU_TO_FOUNDATION_BASE + ActionKind::TableauToFoundation.count() as u16;
pub const FOUNDATION_TO_TABLEAU_BASE: u16 =
    TABLEAU_TO_TABLEAU_BASE + ActionKind::TableauToTableau.count() as u16;

const _: () = assert!(
    FOUNDATION_TO_TABLEAU_BASE as usize + ActionKind::FoundationToTableau.count()
        == ACTION_SPACE_SIZE
);

/// First id of a partition.
pub fn base(kind: ActionKind) -> u16 {
    match kind {
        ActionKind::Draw => DRAW_ID,
        ActionKind::Flip => FLIP_ID,
        ActionKind::WasteToFoundation => WASTE_TO_FOUNDATION_BASE,
        ActionKind::WasteToTableau => WASTE_TO_TABLEAU_BASE,
        ActionKind::TableauToFoundation => TABLEAU_TO_FOUNDATION_BASE,
        ActionKind::TableauToTableau => TABLEAU_TO_TABLEAU_BASE,
        ActionKind::FoundationToTableau => FOUNDATION_TO_TABLEAU_BASE,
    }
}

/// Id range reserved for a partition.
pub fn range(kind: ActionKind) -> Range<u16> {
    let start = base(kind);
    start..start + kind.count() as u16
}

/// Range-checked id for a raw integer.
pub fn action_id(raw: u32) -> Result<ActionId, ActionError> {
    ActionId::new(raw).ok_or(ActionError::ActionIdOutOfRange(raw))
}

pub fn encode(action: Action) -> Result<ActionId, ActionError> {
    let raw = match action {
        Action::Draw => DRAW_ID,
        Action::Flip => FLIP_ID,
        Action::WasteToFoundation { foundation } => {
            WASTE_TO_FOUNDATION_BASE + foundation.get() as u16
        }
        Action::WasteToTableau { tableau } => WASTE_TO_TABLEAU_BASE + tableau.get() as u16,
        Action::TableauToFoundation {
            tableau,
            foundation,
        } => TABLEAU_TO_FOUNDATION_BASE + tableau.get() as u16 * F + foundation.get() as u16,
        Action::TableauToTableau { from, to, len } => {
            if from == to {
                return Err(ActionError::SameTableau);
            }
            let (src, dst) = (from.get() as u16, to.get() as u16);
            let slot = if dst < src { dst } else { dst - 1 };
            TABLEAU_TO_TABLEAU_BASE + (src * (T - 1) + slot) * R + (len.get() as u16 - 1)
        }
        Action::FoundationToTableau {
            foundation,
            tableau,
        } => FOUNDATION_TO_TABLEAU_BASE + foundation.get() as u16 * T + tableau.get() as u16,
    };
    action_id(raw as u32)
}

/// Decode a raw id arithmetically. Fails only outside `[0, ACTION_SPACE_SIZE)`.
pub fn decode_raw(raw: u32) -> Result<Action, ActionError> {
    let id = action_id(raw)?.get();
    let out_of_range = || ActionError::ActionIdOutOfRange(raw);
    let tableau = |i: u16| TableauIndex::new(i as u8).ok_or_else(out_of_range);
    let foundation = |i: u16| FoundationIndex::new(i as u8).ok_or_else(out_of_range);

    let action = if id == DRAW_ID {
        Action::Draw
    } else if id == FLIP_ID {
        Action::Flip
    } else if id < WASTE_TO_TABLEAU_BASE {
        Action::WasteToFoundation {
            foundation: foundation(id - WASTE_TO_FOUNDATION_BASE)?,
        }
    } else if id < TABLEAU_TO_FOUNDATION_BASE {
        Action::WasteToTableau {
            tableau: tableau(id - WASTE_TO_TABLEAU_BASE)?,
        }
    } else if id < TABLEAU_TO_TABLEAU_BASE {
        let off = id - TABLEAU_TO_FOUNDATION_BASE;
        Action::TableauToFoundation {
            tableau: tableau(off / F)?,
            foundation: foundation(off % F)?,
        }
    } else if id < FOUNDATION_TO_TABLEAU_BASE {
        let off = id - TABLEAU_TO_TABLEAU_BASE;
        let src = off / ((T - 1) * R);
        let slot = (off / R) % (T - 1);
        let dst = if slot < src { slot } else { slot + 1 };
        Action::TableauToTableau {
            from: tableau(src)?,
            to: tableau(dst)?,
            len: RunLength::new((off % R + 1) as u8).ok_or_else(out_of_range)?,
        }
    } else {
        let off = id - FOUNDATION_TO_TABLEAU_BASE;
        Action::FoundationToTableau {
            foundation: foundation(off / T)?,
            tableau: tableau(off % T)?,
        }
    };
    Ok(action)
}

/// Every encodable action, in ascending id order.
pub fn all_actions() -> impl Iterator<Item = Action> {
    let fixed = [Action::Draw, Action::Flip].into_iter();
    let waste_foundation =
        FoundationIndex::all().map(|foundation| Action::WasteToFoundation { foundation });
    let waste_tableau = TableauIndex::all().map(|tableau| Action::WasteToTableau { tableau });
    let tableau_foundation = TableauIndex::all().flat_map(|tableau| {
        FoundationIndex::all().map(move |foundation| Action::TableauToFoundation {
            tableau,
            foundation,
        })
    });
    let tableau_tableau = TableauIndex::all().flat_map(|from| {
        TableauIndex::all()
            .filter(move |to| *to != from)
            .flat_map(move |to| {
                RunLength::all().map(move |len| Action::TableauToTableau { from, to, len })
            })
    });
    let foundation_tableau = FoundationIndex::all().flat_map(|foundation| {
        TableauIndex::all().map(move |tableau| Action::FoundationToTableau {
            foundation,
            tableau,
        })
    });

    fixed
        .chain(waste_foundation)
        .chain(waste_tableau)
        .chain(tableau_foundation)
        .chain(tableau_tableau)
        .chain(foundation_tableau)
}

static ACTION_TABLE: OnceLock<Vec<Action>> = OnceLock::new();

fn action_table() -> &'static [Action] {
    ACTION_TABLE.get_or_init(|| all_actions().collect())
}

/// Action for an id. Table lookup; [`self_check`] keeps it in step with [`decode_raw`].
pub fn decode(id: ActionId) -> Action {
    action_table()[id.index()]
}

/// Round-trip every id and every action through the codec.
pub fn self_check() -> Result<(), ActionError> {
    check_table(action_table())?;

    for id in ActionId::all() {
        let action = decode_raw(id.get() as u32)?;
        let back = encode(action)?;
        if back != id {
            return Err(ActionError::EncodeDecodeMismatch {
                id: id.get() as u32,
                detail: format!("decodes to {} which encodes to {}", action, back),
            });
        }
        if !range(action.kind()).contains(&id.get()) {
            return Err(ActionError::EncodeDecodeMismatch {
                id: id.get() as u32,
                detail: format!("{} decoded outside the {} range", action, action.kind().as_str()),
            });
        }
    }

    let mut count = 0usize;
    for (expected, action) in all_actions().enumerate() {
        let id = encode(action)?;
        if id.index() != expected || decode_raw(id.get() as u32)? != action {
            return Err(ActionError::EncodeDecodeMismatch {
                id: id.get() as u32,
                detail: format!("{} expected at id {}", action, expected),
            });
        }
        count += 1;
    }
    if count != ACTION_SPACE_SIZE {
        return Err(ActionError::EncodeDecodeMismatch {
            id: count as u32,
            detail: format!("{} actions for {} ids", count, ACTION_SPACE_SIZE),
        });
    }
    Ok(())
}

/// Compare a lookup table against [`decode_raw`] without indexing past its end.
fn check_table(table: &[Action]) -> Result<(), ActionError> {
    if table.len() != ACTION_SPACE_SIZE {
        return Err(ActionError::EncodeDecodeMismatch {
            id: table.len() as u32,
            detail: format!("table holds {} actions for {} ids", table.len(), ACTION_SPACE_SIZE),
        });
    }
    for (raw, held) in (0u32..).zip(table) {
        let action = decode_raw(raw)?;
        if *held != action {
            return Err(ActionError::EncodeDecodeMismatch {
                id: raw,
                detail: format!("table holds {} where arithmetic gives {}", held, action),
            });
        }
    }
    Ok(())
}

static SELF_CHECK: OnceLock<Result<(), ActionError>> = OnceLock::new();

/// Run [`self_check`] once per process and replay its result afterwards.
pub fn ensure_self_check() -> Result<(), ActionError> {
    SELF_CHECK.get_or_init(self_check).clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(i: u8) -> TableauIndex {
        TableauIndex::new(i).unwrap()
    }

    fn f(i: u8) -> FoundationIndex {
        FoundationIndex::new(i).unwrap()
    }

    fn len(n: u8) -> RunLength {
        RunLength::new(n).unwrap()
    }

    #[test]
    fn partition_boundaries() {
        assert_eq!(DRAW_ID, 0);
        assert_eq!(FLIP_ID, 1);
        assert_eq!(WASTE_TO_FOUNDATION_BASE, 2);
        assert_eq!(WASTE_TO_TABLEAU_BASE, 6);
        assert_eq!(TABLEAU_TO_FOUNDATION_BASE, 13);
        assert_eq!(TABLEAU_TO_TABLEAU_BASE, 41);
        assert_eq!(FOUNDATION_TO_TABLEAU_BASE, 587);
        assert_eq!(range(ActionKind::FoundationToTableau).end as usize, ACTION_SPACE_SIZE);
    }

    #[test]
    fn encode_known_ids() {
        assert_eq!(encode(Action::Draw).unwrap().get(), 0);
        assert_eq!(encode(Action::Flip).unwrap().get(), 1);
        assert_eq!(
            encode(Action::WasteToFoundation { foundation: f(3) }).unwrap().get(),
            5
        );
        assert_eq!(encode(Action::WasteToTableau { tableau: t(0) }).unwrap().get(), 6);
        assert_eq!(
            encode(Action::TableauToFoundation {
                tableau: t(6),
                foundation: f(3)
            })
            .unwrap()
            .get(),
            40
        );
        assert_eq!(
            encode(Action::TableauToTableau {
                from: t(0),
                to: t(1),
                len: len(1)
            })
            .unwrap()
            .get(),
            41
        );
        // src 1 skips itself: dst 0 is slot 0, dst 2 is slot 1.
        assert_eq!(
            encode(Action::TableauToTableau {
                from: t(1),
                to: t(2),
                len: len(2)
            })
            .unwrap()
            .get(),
            41 + 78 + 13 + 1
        );
        assert_eq!(
            encode(Action::TableauToTableau {
                from: t(6),
                to: t(5),
                len: len(13)
            })
            .unwrap()
            .get(),
            586
        );
        assert_eq!(
            encode(Action::FoundationToTableau {
                foundation: f(0),
                tableau: t(0)
            })
            .unwrap()
            .get(),
            587
        );
        assert_eq!(
            encode(Action::FoundationToTableau {
                foundation: f(3),
                tableau: t(6)
            })
            .unwrap()
            .get(),
            614
        );
    }

    #[test]
    fn same_tableau_is_rejected() {
        let err = encode(Action::TableauToTableau {
            from: t(4),
            to: t(4),
            len: len(1),
        })
        .unwrap_err();
        assert_eq!(err, ActionError::SameTableau);
    }

    #[test]
    fn every_id_round_trips() {
        for raw in 0..ACTION_SPACE_SIZE as u32 {
            let action = decode_raw(raw).unwrap();
            assert_eq!(decode(ActionId::new(raw).unwrap()), action);
            assert_eq!(encode(action).unwrap().get() as u32, raw, "id {}", raw);
        }
    }

    #[test]
    fn every_action_round_trips() {
        let actions: Vec<Action> = all_actions().collect();
        assert_eq!(actions.len(), ACTION_SPACE_SIZE);
        for action in actions {
            let id = encode(action).unwrap();
            assert_eq!(decode(id), action);
        }
    }

    #[test]
    fn out_of_range_decode() {
        assert_eq!(decode_raw(615), Err(ActionError::ActionIdOutOfRange(615)));
        assert_eq!(
            decode_raw(u32::MAX),
            Err(ActionError::ActionIdOutOfRange(u32::MAX))
        );
    }

    #[test]
    fn self_check_passes_and_is_memoised() {
        assert_eq!(self_check(), Ok(()));
        assert_eq!(ensure_self_check(), Ok(()));
        assert!(SELF_CHECK.get().is_some());
    }

    #[test]
    fn short_table_is_reported_not_indexed() {
        let table: Vec<Action> = all_actions().take(ACTION_SPACE_SIZE - 1).collect();
        match check_table(&table) {
            Err(ActionError::EncodeDecodeMismatch { id, .. }) => {
                assert_eq!(id as usize, ACTION_SPACE_SIZE - 1)
            }
            other => panic!("expected EncodeDecodeMismatch, got {:?}", other),
        }
        assert!(matches!(
            check_table(&[]),
            Err(ActionError::EncodeDecodeMismatch { id: 0, .. })
        ));
    }

    #[test]
    fn misordered_table_is_reported() {
        let mut table: Vec<Action> = all_actions().collect();
        table.swap(0, 1);
        assert!(matches!(
            check_table(&table),
            Err(ActionError::EncodeDecodeMismatch { id: 0, .. })
        ));
        table.swap(0, 1);
        assert_eq!(check_table(&table), Ok(()));
    }
}
