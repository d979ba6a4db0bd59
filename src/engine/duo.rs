use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use crate::config::RuleContext;
use crate::engine::card::{ACE_HIGH, ACE_LOW, Card, Rank, Suit, other_two_suits};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DuoKind {
    /// Two consecutive ranks of one suit, completed at either end.
    RunAdjacent,
    /// Two ranks of one suit one apart, completed by the middle card.
    RunGap,
    /// Two cards of one rank in different suits.
    Set,
}

/// Two hand cards one card short of a meld.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duo {
    pub kind: DuoKind,
    /// Positions of the two cards in the hand, lower ordinal first for runs.
    pub indices: [usize; 2],
    pub cards: [Card; 2],
    /// Natural cards that would turn the duo into a meld.
    pub missing: Vec<Card>,
}

impl Duo {
    /// Whether `joker` could stand in for a missing card. The enumerator
    /// only pairs a duo with Jokers it accepts.
    pub fn accepts_joker(&self, joker: Card) -> bool {
        joker.is_joker() && self.missing.iter().any(|c| c.color() == joker.color())
    }
}

/// How many copies of each natural face are already on the table.
#[derive(Debug, Default, Clone)]
pub struct TableCounts(HashMap<Card, usize>);

impl TableCounts {
    pub fn new(table: &[Card]) -> Self {
        let mut counts = HashMap::new();
        for card in table.iter().filter(|c| !c.is_joker()) {
            *counts.entry(*card).or_insert(0) += 1;
        }
        Self(counts)
    }

    pub fn count(&self, card: &Card) -> usize {
        self.0.get(card).copied().unwrap_or(0)
    }

    /// Every copy in play has been laid down.
    pub fn is_exhausted(&self, card: &Card, ctx: &RuleContext) -> bool {
        self.count(card) >= ctx.decks as usize
    }

    /// A duo is alive while at least one of its completing cards can still
    /// turn up.
    pub fn is_live(&self, duo: &Duo, ctx: &RuleContext) -> bool {
        duo.missing.iter().any(|c| !self.is_exhausted(c, ctx))
    }
}

fn face_at(ordinal: u8, suit: Suit) -> Option<Card> {
    if !(ACE_LOW..=ACE_HIGH).contains(&ordinal) {
        return None;
    }
    Rank::from_ordinal(ordinal).map(|rank| Card::new(rank, suit))
}

/// Every run duo in `hand`, dead or alive.
///
/// An Ace takes part both as Ace-low and Ace-high, so `A♥ 3♥` and
/// `Q♥ A♥` are both gap duos.
pub fn candidate_duo_runs(hand: &[Card]) -> Vec<Duo> {
    let mut duos = Vec::new();

    for suit in Suit::ALL {
        let mut suited: Vec<(u8, usize)> = Vec::new();
        for (i, card) in hand.iter().enumerate() {
            if let Card::Standard { suit: s, rank } = card
                && *s == suit
            {
                suited.push((rank.ordinal(), i));
                if *rank == Rank::Ace {
                    suited.push((ACE_LOW, i));
                }
            }
        }
        suited.sort();

        for (a, &(low, low_idx)) in suited.iter().enumerate() {
            for &(high, high_idx) in &suited[a + 1..] {
                if low_idx == high_idx {
                    continue;
                }
                let (kind, missing) = match high - low {
                    1 => {
                        let ends = [low.checked_sub(1).and_then(|o| face_at(o, suit)), face_at(high + 1, suit)];
                        (DuoKind::RunAdjacent, ends.into_iter().flatten().collect())
                    }
                    2 => (DuoKind::RunGap, face_at(low + 1, suit).into_iter().collect()),
                    _ => continue,
                };
                duos.push(Duo {
                    kind,
                    indices: [low_idx, high_idx],
                    cards: [hand[low_idx], hand[high_idx]],
                    missing,
                });
            }
        }
    }

    duos
}

/// Every set duo in `hand`, dead or alive.
pub fn candidate_duo_sets(hand: &[Card]) -> Vec<Duo> {
    let mut duos = Vec::new();

    for i in 0..hand.len() {
        for j in (i + 1)..hand.len() {
            let (Card::Standard { suit: s1, rank: r1 }, Card::Standard { suit: s2, rank: r2 }) =
                (hand[i], hand[j])
            else {
                continue;
            };
            if r1 != r2 || s1 == s2 {
                continue;
            }
            let Ok(rest) = other_two_suits(s1, s2) else {
                continue;
            };
            duos.push(Duo {
                kind: DuoKind::Set,
                indices: [i, j],
                cards: [hand[i], hand[j]],
                missing: rest.into_iter().map(|suit| Card::new(r1, suit)).collect(),
            });
        }
    }

    duos
}

/// Run duos whose completing cards have not all been laid down on the table.
pub fn find_duo_runs(hand: &[Card], table: &[Card], ctx: &RuleContext) -> Vec<Duo> {
    let counts = TableCounts::new(table);
    let all = candidate_duo_runs(hand);
    let total = all.len();
    let live: Vec<Duo> = all.into_iter().filter(|d| counts.is_live(d, ctx)).collect();
    debug!(total, live = live.len(), "duo runs");
    live
}

/// Set duos that can still be completed by a natural card.
pub fn find_duo_sets(hand: &[Card], table: &[Card], ctx: &RuleContext) -> Vec<Duo> {
    let counts = TableCounts::new(table);
    let all = candidate_duo_sets(hand);
    let total = all.len();
    let live: Vec<Duo> = all.into_iter().filter(|d| counts.is_live(d, ctx)).collect();
    debug!(total, live = live.len(), "duo sets");
    live
}
