//! Board decoder - turns the engine's per-turn text dump into a [`Turn`]
//!
//! The engine writes one line per pile, then one line of legal action ids.
//! Every line is whitespace-separated integers; an empty pile is an empty line
//! and a trailing separator is tolerated.
//!
//! # Layouts
//!
//! [`DumpLayout::Standard`] (14 lines):
//!
//! ```text
//! draw            -1 for each hidden stock card, then revealed cards bottom to top
//! waste
//! tableau 0..6    -1 for each face-down card, then face-up cards bottom to top
//! foundation 0..3
//! legal ids
//! ```
//!
//! [`DumpLayout::FaceDownCounts`] (21 lines):
//!
//! ```text
//! draw
//! waste
//! foundation 0..3
//! face-down count 0..6   one plain integer per line
//! tableau 0..6           face-up cards only
//! legal ids
//! ```
//!
//! Any failure is fatal for the stream: the decoder never hands back a
//! partially filled board.

use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

use crate::board::{Board, Pile};
use crate::card_codec;
use crate::error::DecodeError;
use crate::legal::{LegalActionSet, Turn};
use crate::types::{ActionId, Card, CardToken};

/// What a given dump line carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    Draw,
    Waste,
    Tableau(u8),
    FaceDownCount(u8),
    Foundation(u8),
    Legal,
}

impl fmt::Display for LineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineKind::Draw => write!(f, "draw"),
            LineKind::Waste => write!(f, "waste"),
            LineKind::Tableau(i) => write!(f, "tableau {}", i),
            LineKind::FaceDownCount(i) => write!(f, "face-down count {}", i),
            LineKind::Foundation(i) => write!(f, "foundation {}", i),
            LineKind::Legal => write!(f, "legal actions"),
        }
    }
}

const STANDARD_LINES: [LineKind; 14] = [
    LineKind::Draw,
    LineKind::Waste,
    LineKind::Tableau(0),
    LineKind::Tableau(1),
    LineKind::Tableau(2),
    LineKind::Tableau(3),
    LineKind::Tableau(4),
    LineKind::Tableau(5),
    LineKind::Tableau(6),
    LineKind::Foundation(0),
    LineKind::Foundation(1),
    LineKind::Foundation(2),
    LineKind::Foundation(3),
    LineKind::Legal,
];

const FACE_DOWN_COUNT_LINES: [LineKind; 21] = [
    LineKind::Draw,
    LineKind::Waste,
    LineKind::Foundation(0),
    LineKind::Foundation(1),
    LineKind::Foundation(2),
    LineKind::Foundation(3),
    LineKind::FaceDownCount(0),
    LineKind::FaceDownCount(1),
    LineKind::FaceDownCount(2),
    LineKind::FaceDownCount(3),
    LineKind::FaceDownCount(4),
    LineKind::FaceDownCount(5),
    LineKind::FaceDownCount(6),
    LineKind::Tableau(0),
    LineKind::Tableau(1),
    LineKind::Tableau(2),
    LineKind::Tableau(3),
    LineKind::Tableau(4),
    LineKind::Tableau(5),
    LineKind::Tableau(6),
    LineKind::Legal,
];

/// Line order the engine is held to. Fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DumpLayout {
    #[default]
    Standard,
    FaceDownCounts,
}

impl DumpLayout {
    pub fn lines(self) -> &'static [LineKind] {
        match self {
            DumpLayout::Standard => &STANDARD_LINES,
            DumpLayout::FaceDownCounts => &FACE_DOWN_COUNT_LINES,
        }
    }

    /// Lines per turn, legal-action line included.
    pub fn line_count(self) -> usize {
        self.lines().len()
    }

    /// Parse layout name (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Some(DumpLayout::Standard),
            "facedown-counts" | "face-down-counts" | "counts" => Some(DumpLayout::FaceDownCounts),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DumpLayout::Standard => "standard",
            DumpLayout::FaceDownCounts => "facedown-counts",
        }
    }
}

fn parse_int<T: FromStr>(line: usize, kind: LineKind, token: &str) -> Result<T, DecodeError> {
    token
        .parse::<T>()
        .map_err(|_| DecodeError::malformed(line, kind, token, "not an integer"))
}

fn push_card(
    pile: &mut Pile,
    line: usize,
    kind: LineKind,
    token: &str,
    card: Card,
) -> Result<(), DecodeError> {
    pile.try_push(card)
        .map_err(|_| DecodeError::malformed(line, kind, token, "pile holds more than a deck"))
}

fn bump(count: &mut u8, line: usize, kind: LineKind, token: &str) -> Result<(), DecodeError> {
    *count = count
        .checked_add(1)
        .ok_or_else(|| DecodeError::malformed(line, kind, token, "too many face-down cards"))?;
    Ok(())
}

fn decode_line(
    board: &mut Board,
    legal: &mut LegalActionSet,
    layout: DumpLayout,
    line: usize,
    kind: LineKind,
    text: &str,
) -> Result<(), DecodeError> {
    if let LineKind::FaceDownCount(i) = kind {
        let mut tokens = text.split_ascii_whitespace();
        let (Some(token), None) = (tokens.next(), tokens.next()) else {
            return Err(DecodeError::malformed(line, kind, text.trim(), "expected one count"));
        };
        board.tableau[i as usize].face_down = parse_int::<u8>(line, kind, token)?;
        return Ok(());
    }

    for token in text.split_ascii_whitespace() {
        if kind == LineKind::Legal {
            let raw = parse_int::<u32>(line, kind, token)?;
            let id = ActionId::new(raw)
                .ok_or_else(|| DecodeError::malformed(line, kind, token, "action id out of range"))?;
            if !legal.insert(id) {
                return Err(DecodeError::malformed(line, kind, token, "duplicate action id"));
            }
            continue;
        }

        let raw = parse_int::<i32>(line, kind, token)?;
        let card = card_codec::decode(raw)
            .map_err(|_| DecodeError::malformed(line, kind, token, "card token out of range"))?;

        match (kind, card) {
            (LineKind::Draw, CardToken::Up(c)) => push_card(&mut board.draw, line, kind, token, c)?,
            (LineKind::Draw, CardToken::FaceDown) => {
                // Hidden stock cards sit below any revealed ones.
                if !board.draw.is_empty() {
                    return Err(DecodeError::malformed(
                        line,
                        kind,
                        token,
                        "face-down card above a face-up card",
                    ));
                }
                bump(&mut board.draw_hidden, line, kind, token)?
            }
            (LineKind::Waste, CardToken::Up(c)) => push_card(&mut board.waste, line, kind, token, c)?,
            (LineKind::Foundation(i), CardToken::Up(c)) => {
                push_card(&mut board.foundations[i as usize], line, kind, token, c)?
            }
            (LineKind::Tableau(i), CardToken::Up(c)) => {
                push_card(&mut board.tableau[i as usize].face_up, line, kind, token, c)?
            }
            (LineKind::Tableau(i), CardToken::FaceDown) => {
                if layout == DumpLayout::FaceDownCounts {
                    return Err(DecodeError::malformed(
                        line,
                        kind,
                        token,
                        "face-down token where counts are sent separately",
                    ));
                }
                let pile = &mut board.tableau[i as usize];
                if !pile.face_up.is_empty() {
                    return Err(DecodeError::malformed(
                        line,
                        kind,
                        token,
                        "face-down card above a face-up card",
                    ));
                }
                bump(&mut pile.face_down, line, kind, token)?;
            }
            (_, CardToken::FaceDown) => {
                return Err(DecodeError::malformed(
                    line,
                    kind,
                    token,
                    "face-down card on an open pile",
                ));
            }
            (LineKind::FaceDownCount(_) | LineKind::Legal, CardToken::Up(_)) => {}
        }
    }
    Ok(())
}

/// Decode one turn from lines that have already been read.
///
/// `lines` must hold exactly [`DumpLayout::line_count`] entries; line endings are ignored.
pub fn decode_turn<S: AsRef<str>>(layout: DumpLayout, lines: &[S]) -> Result<Turn, DecodeError> {
    let kinds = layout.lines();
    if lines.len() != kinds.len() {
        return Err(DecodeError::ProtocolDesync {
            read: lines.len(),
            expected: kinds.len(),
        });
    }

    let mut board = Board::default();
    let mut legal = LegalActionSet::new();
    for (n, (kind, text)) in kinds.iter().zip(lines).enumerate() {
        let text = text.as_ref().trim_end_matches(['\r', '\n']);
        decode_line(&mut board, &mut legal, layout, n, *kind, text)?;
    }

    board.check_deck()?;
    Ok(Turn { board, legal })
}

/// Block until a full turn has been read from `reader`.
///
/// End of stream before the last line is [`DecodeError::ProtocolDesync`].
pub fn read_turn<R: BufRead>(reader: &mut R, layout: DumpLayout) -> Result<Turn, DecodeError> {
    let expected = layout.line_count();
    let mut lines: Vec<String> = Vec::with_capacity(expected);
    let mut buf = String::new();

    while lines.len() < expected {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            return Err(DecodeError::ProtocolDesync {
                read: lines.len(),
                expected,
            });
        }
        lines.push(buf.clone());
    }

    decode_turn(layout, &lines)
}
