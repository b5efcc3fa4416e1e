//! Deterministic stand-in engine for protocol tests.
//!
//! Deals a seeded Klondike layout and plays draw, flip and foundation moves.
//! The `--*-after` flags make it misbehave on a chosen step so every session
//! failure path can be reproduced.

use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use solitaire_gym::core::{action_codec, DumpLayout, LineKind, SimpleRng};
use solitaire_gym::types::{Action, ActionId, Card, FoundationIndex, TableauIndex, FACE_DOWN_TOKEN};

#[derive(Parser, Debug)]
#[command(name = "fixture-engine", about = "Deterministic solitaire engine for protocol tests")]
struct Args {
    /// Deal seed
    #[arg(long, default_value_t = 1)]
    seed: u32,

    #[arg(long, default_value = "standard", value_parser = parse_layout)]
    layout: DumpLayout,

    /// Exit cleanly once N steps have been answered
    #[arg(long, value_name = "N")]
    exit_after: Option<u64>,

    /// Write half of step N's turn, then exit
    #[arg(long, value_name = "N")]
    truncate_after: Option<u64>,

    /// Never answer step N
    #[arg(long, value_name = "N")]
    stall_after: Option<u64>,

    /// Answer step N with an out-of-range card token on the waste line
    #[arg(long, value_name = "N")]
    garble_after: Option<u64>,

    /// Report no legal actions from step N on
    #[arg(long, value_name = "N")]
    terminal_after: Option<u64>,

    /// Exit with status 3 on an id outside the legal set instead of ignoring it
    #[arg(long)]
    crash_on_illegal: bool,
}

fn parse_layout(s: &str) -> Result<DumpLayout, String> {
    DumpLayout::from_str(s).ok_or_else(|| format!("unknown layout {:?}", s))
}

fn join<T: Display>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn card_tokens(cards: &[Card]) -> impl Iterator<Item = i32> + '_ {
    cards.iter().map(|card| card.index() as i32)
}

struct Table {
    /// Top card last.
    stock: Vec<Card>,
    waste: Vec<Card>,
    down: [Vec<Card>; 7],
    up: [Vec<Card>; 7],
    /// Indexed by suit.
    foundations: [Vec<Card>; 4],
}

impl Table {
    fn deal(seed: u32) -> Self {
        let mut deck: Vec<Card> = Card::deck().collect();
        SimpleRng::new(seed).shuffle(&mut deck);

        let mut down: [Vec<Card>; 7] = Default::default();
        let mut up: [Vec<Card>; 7] = Default::default();
        for i in 0..7 {
            for _ in 0..i {
                down[i].extend(deck.pop());
            }
            up[i].extend(deck.pop());
        }

        Self {
            stock: deck,
            waste: Vec::new(),
            down,
            up,
            foundations: Default::default(),
        }
    }

    fn foundation_for(&self, card: Card) -> Option<FoundationIndex> {
        let suit = card.suit() as u8;
        (self.foundations[suit as usize].len() == card.rank() as usize)
            .then(|| FoundationIndex::new(suit))
            .flatten()
    }

    fn flippable(&self) -> Option<usize> {
        (0..7).find(|&i| self.up[i].is_empty() && !self.down[i].is_empty())
    }

    fn legal(&self) -> Result<Vec<ActionId>> {
        let mut moves = Vec::new();
        if !self.stock.is_empty() || !self.waste.is_empty() {
            moves.push(Action::Draw);
        }
        if self.flippable().is_some() {
            moves.push(Action::Flip);
        }
        if let Some(foundation) = self.waste.last().and_then(|&c| self.foundation_for(c)) {
            moves.push(Action::WasteToFoundation { foundation });
        }
        for tableau in TableauIndex::all() {
            let top = self.up[tableau.get() as usize].last();
            if let Some(foundation) = top.and_then(|&c| self.foundation_for(c)) {
                moves.push(Action::TableauToFoundation {
                    tableau,
                    foundation,
                });
            }
        }

        let mut ids = moves
            .into_iter()
            .map(action_codec::encode)
            .collect::<Result<Vec<_>, _>>()?;
        ids.sort_unstable();
        Ok(ids)
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Draw => match self.stock.pop() {
                Some(card) => self.waste.push(card),
                None => self.stock = self.waste.drain(..).rev().collect(),
            },
            Action::Flip => {
                if let Some(i) = self.flippable() {
                    self.up[i].extend(self.down[i].pop());
                }
            }
            Action::WasteToFoundation { foundation } => {
                let card = self.waste.pop();
                self.foundations[foundation.get() as usize].extend(card);
            }
            Action::TableauToFoundation {
                tableau,
                foundation,
            } => {
                let card = self.up[tableau.get() as usize].pop();
                self.foundations[foundation.get() as usize].extend(card);
            }
            _ => {}
        }
    }

    fn render(&self, layout: DumpLayout, legal: &[ActionId]) -> Vec<String> {
        layout
            .lines()
            .iter()
            .map(|kind| match *kind {
                LineKind::Draw => join(self.stock.iter().map(|_| FACE_DOWN_TOKEN)),
                LineKind::Waste => join(card_tokens(&self.waste)),
                LineKind::Tableau(i) => {
                    let i = i as usize;
                    let hidden = match layout {
                        DumpLayout::Standard => self.down[i].len(),
                        DumpLayout::FaceDownCounts => 0,
                    };
                    join(
                        std::iter::repeat(FACE_DOWN_TOKEN)
                            .take(hidden)
                            .chain(card_tokens(&self.up[i])),
                    )
                }
                LineKind::FaceDownCount(i) => self.down[i as usize].len().to_string(),
                LineKind::Foundation(i) => join(card_tokens(&self.foundations[i as usize])),
                LineKind::Legal => join(legal.iter().map(|id| id.get())),
            })
            .collect()
    }
}

fn write_turn(out: &mut impl Write, lines: &[String]) -> io::Result<()> {
    for line in lines {
        writeln!(out, "{}", line)?;
    }
    out.flush()
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut table = Table::deal(args.seed);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut legal = table.legal()?;
    write_turn(&mut out, &table.render(args.layout, &legal))?;

    let mut answered: u64 = 0;
    let mut buf = String::new();
    loop {
        if args.exit_after == Some(answered) {
            return Ok(());
        }

        buf.clear();
        if input.read_line(&mut buf)? == 0 {
            return Ok(());
        }
        let Ok(raw) = buf.trim().parse::<u32>() else {
            eprintln!("[Fixture] unreadable action {:?}", buf.trim());
            std::process::exit(2);
        };
        let step = answered + 1;

        match ActionId::new(raw).filter(|id| legal.contains(id)) {
            Some(id) => table.apply(action_codec::decode(id)),
            None if args.crash_on_illegal => {
                eprintln!("[Fixture] illegal action {}", raw);
                std::process::exit(3);
            }
            None => {}
        }

        if args.stall_after == Some(step) {
            loop {
                thread::sleep(Duration::from_secs(3600));
            }
        }

        legal = match args.terminal_after {
            Some(n) if step >= n => Vec::new(),
            _ => table.legal()?,
        };
        let mut lines = table.render(args.layout, &legal);

        if args.garble_after == Some(step) {
            if let Some(waste) = lines
                .iter_mut()
                .zip(args.layout.lines())
                .find_map(|(line, kind)| (*kind == LineKind::Waste).then_some(line))
            {
                *waste = "52".to_string();
            }
        }

        if args.truncate_after == Some(step) {
            write_turn(&mut out, &lines[..lines.len() / 2])?;
            return Ok(());
        }

        write_turn(&mut out, &lines)?;
        answered = step;
    }
}
