use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::config::RuleContext;
use crate::engine::card::{ACE_HIGH, ACE_LOW, Card, Rank, Suit};
use crate::engine::duo::{DuoKind, candidate_duo_sets, find_duo_runs};
use crate::engine::error::RulesError;
use crate::engine::meld::{Meld, MeldKind};
use crate::engine::rules::{MAX_SET_LEN, MIN_MELD_LEN};

// ─── Core Types ───────────────────────────────────────────────────────────────

/// A bitmask representing which hand positions (indices) are used by a meld.
/// Supports hands up to 64 cards.
pub type HandMask = u64;

pub const MAX_HAND: usize = HandMask::BITS as usize;

/// A validated meld built from hand cards, remembering which ones.
#[derive(Debug, Clone)]
pub struct MeldCandidate {
    pub meld: Meld,
    /// Indices into the hand, in meld order.
    pub card_indices: Vec<usize>,
    /// Precomputed bitmask for fast overlap detection
    pub mask: HandMask,
}

impl MeldCandidate {
    fn new(hand: &[Card], kind: MeldKind, card_indices: Vec<usize>) -> Result<Self, RulesError> {
        if card_indices.iter().any(|&i| i >= MAX_HAND) {
            return Err(RulesError::HandTooLarge {
                len: hand.len(),
                max: MAX_HAND,
            });
        }
        let meld = Meld::new(kind, card_indices.iter().map(|&i| hand[i]).collect())?;
        let mask = card_indices.iter().fold(0, |m, &i| m | (1 << i));
        Ok(Self {
            meld,
            card_indices,
            mask,
        })
    }

    /// True if this meld shares any physical card with another.
    pub fn overlaps(&self, other: &MeldCandidate) -> bool {
        (self.mask & other.mask) != 0
    }
}

/// A lay-down candidate: melds that share no physical card.
///
/// Combos from one search share the candidate list and only record which
/// entries they picked.
#[derive(Debug, Clone)]
pub struct Combo {
    candidates: Arc<[MeldCandidate]>,
    picked: Vec<usize>,
    mask: HandMask,
    value: u32,
    card_count: usize,
}

impl Combo {
    fn empty(candidates: &Arc<[MeldCandidate]>) -> Self {
        Self {
            candidates: Arc::clone(candidates),
            picked: Vec::new(),
            mask: 0,
            value: 0,
            card_count: 0,
        }
    }

    fn with(&self, index: usize, candidate: &MeldCandidate) -> Self {
        let mut picked = self.picked.clone();
        picked.push(index);
        Self {
            candidates: Arc::clone(&self.candidates),
            picked,
            mask: self.mask | candidate.mask,
            value: self.value + candidate.meld.value(),
            card_count: self.card_count + candidate.meld.count(),
        }
    }

    pub fn melds(&self) -> impl ExactSizeIterator<Item = &MeldCandidate> {
        self.picked.iter().map(|&i| &self.candidates[i])
    }

    pub fn meld_count(&self) -> usize {
        self.picked.len()
    }

    pub fn sets(&self) -> impl Iterator<Item = &Meld> {
        self.melds()
            .map(|c| &c.meld)
            .filter(|m| m.kind() == MeldKind::Set)
    }

    pub fn runs(&self) -> impl Iterator<Item = &Meld> {
        self.melds()
            .map(|c| &c.meld)
            .filter(|m| m.kind() == MeldKind::Run)
    }

    pub fn mask(&self) -> HandMask {
        self.mask
    }

    pub fn card_count(&self) -> usize {
        self.card_count
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    /// Same melds by shape, whichever physical cards they use.
    pub fn looks_equal(&self, other: &Combo) -> bool {
        if self.meld_count() != other.meld_count() {
            return false;
        }
        let mut unmatched: Vec<&Meld> = other.melds().map(|c| &c.meld).collect();
        for candidate in self.melds() {
            match unmatched.iter().position(|m| m.looks_equal(&candidate.meld)) {
                Some(pos) => {
                    unmatched.swap_remove(pos);
                }
                None => return false,
            }
        }
        true
    }
}

impl fmt::Display for Combo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, candidate) in self.melds().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", candidate.meld)?;
        }
        Ok(())
    }
}

// ─── Set Candidates ──────────────────────────────────────────────────────────

/// Returns all natural set candidates from the given hand.
///
/// Rules:
/// - 3 or 4 cards of the same rank, pairwise distinct suits
/// - Jokers are not used here, see [`find_joker_candidates`]
/// - Double-deck duplicates yield one candidate per physical choice
pub(crate) fn find_set_candidates(hand: &[Card]) -> Vec<MeldCandidate> {
    let mut by_rank: BTreeMap<Rank, Vec<usize>> = BTreeMap::new();
    for (i, card) in hand.iter().enumerate() {
        if let Card::Standard { rank, .. } = card {
            by_rank.entry(*rank).or_default().push(i);
        }
    }

    let mut candidates = Vec::new();
    for indices in by_rank.values().filter(|g| g.len() >= MIN_MELD_LEN) {
        collect_sets(hand, indices, 0, &mut Vec::new(), &mut candidates);
    }
    candidates
}

fn collect_sets(
    hand: &[Card],
    group: &[usize],
    start: usize,
    current: &mut Vec<usize>,
    out: &mut Vec<MeldCandidate>,
) {
    if current.len() >= MIN_MELD_LEN
        && let Ok(candidate) = MeldCandidate::new(hand, MeldKind::Set, current.clone())
    {
        out.push(candidate);
    }
    if current.len() == MAX_SET_LEN {
        return;
    }
    for (k, &idx) in group.iter().enumerate().skip(start) {
        let suit = hand[idx].suit();
        if current.iter().any(|&c| hand[c].suit() == suit) {
            continue;
        }
        current.push(idx);
        collect_sets(hand, group, k + 1, current, out);
        current.pop();
    }
}

// ─── Run Candidates ──────────────────────────────────────────────────────────

/// Returns all natural run candidates from the given hand.
///
/// Rules:
/// - 3 or more consecutive ranks in the **same suit**
/// - Ace plays low (before Two) or high (after King), never both
/// - Double-deck duplicates yield one candidate per physical choice
pub(crate) fn find_run_candidates(hand: &[Card]) -> Vec<MeldCandidate> {
    let mut candidates = Vec::new();

    for suit in Suit::ALL {
        // slots[o] holds the hand indices whose card can sit at ordinal o
        let mut slots: Vec<Vec<usize>> = vec![Vec::new(); ACE_HIGH as usize + 1];
        for (i, card) in hand.iter().enumerate() {
            if let Card::Standard { suit: s, rank } = card
                && *s == suit
            {
                slots[rank.ordinal() as usize].push(i);
                if *rank == Rank::Ace {
                    slots[ACE_LOW as usize].push(i);
                }
            }
        }

        for start in ACE_LOW..=ACE_HIGH {
            collect_runs(hand, &slots, start, start, &mut Vec::new(), &mut candidates);
        }
    }

    candidates
}

fn collect_runs(
    hand: &[Card],
    slots: &[Vec<usize>],
    start: u8,
    ordinal: u8,
    current: &mut Vec<usize>,
    out: &mut Vec<MeldCandidate>,
) {
    if current.len() >= MIN_MELD_LEN
        && let Ok(candidate) = MeldCandidate::new(hand, MeldKind::Run, current.clone())
    {
        out.push(candidate);
    }
    if ordinal > ACE_HIGH || (start == ACE_LOW && ordinal == ACE_HIGH) {
        return;
    }
    for &idx in &slots[ordinal as usize] {
        current.push(idx);
        collect_runs(hand, slots, start, ordinal + 1, current, out);
        current.pop();
    }
}

// ─── Joker Candidates ────────────────────────────────────────────────────────

/// Three-card melds made of a duo plus one Joker from the hand.
///
/// Set duos are used whether or not a natural card could still complete
/// them, since the Joker does. Run duos are taken live only, judged
/// against the cards already on `table`.
pub(crate) fn find_joker_candidates(hand: &[Card], table: &[Card], ctx: &RuleContext) -> Vec<MeldCandidate> {
    let jokers: Vec<usize> = hand
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_joker())
        .map(|(i, _)| i)
        .collect();
    if jokers.is_empty() {
        return Vec::new();
    }

    let mut shapes: Vec<(MeldKind, Vec<usize>)> = Vec::new();
    for duo in candidate_duo_sets(hand) {
        for &joker in jokers.iter().filter(|&&j| duo.accepts_joker(hand[j])) {
            shapes.push((MeldKind::Set, vec![duo.indices[0], duo.indices[1], joker]));
        }
    }
    for duo in find_duo_runs(hand, table, ctx) {
        let [low, high] = duo.indices;
        for &joker in jokers.iter().filter(|&&j| duo.accepts_joker(hand[j])) {
            match duo.kind {
                DuoKind::RunGap => shapes.push((MeldKind::Run, vec![low, joker, high])),
                DuoKind::RunAdjacent => {
                    shapes.push((MeldKind::Run, vec![joker, low, high]));
                    shapes.push((MeldKind::Run, vec![low, high, joker]));
                }
                DuoKind::Set => {}
            }
        }
    }

    let mut seen = HashSet::new();
    shapes
        .into_iter()
        .filter(|shape| seen.insert(shape.clone()))
        .filter_map(|(kind, indices)| MeldCandidate::new(hand, kind, indices).ok())
        .collect()
}

// ─── Combo Search ────────────────────────────────────────────────────────────

/// Enumerates every combination of pairwise non-overlapping melds the hand
/// can lay down, best first.
///
/// - Ordered by value descending, then by fewer melds.
/// - Unless `allow_laying_all`, combos using the whole hand are dropped.
/// - Look-alike combos built from different physical cards are all kept,
///   see [`dedup_looking_equal`].
pub fn find_all_combos(
    hand: &[Card],
    table: &[Card],
    ctx: &RuleContext,
    allow_laying_all: bool,
) -> Result<Vec<Combo>, RulesError> {
    if hand.len() > MAX_HAND {
        return Err(RulesError::HandTooLarge {
            len: hand.len(),
            max: MAX_HAND,
        }
        .in_round(ctx.round));
    }

    let mut candidates = find_set_candidates(hand);
    candidates.extend(find_run_candidates(hand));
    candidates.extend(find_joker_candidates(hand, table, ctx));
    let candidates: Arc<[MeldCandidate]> = candidates.into();

    let mut combos = Vec::new();
    search(&candidates, 0, Combo::empty(&candidates), &mut combos);
    let found = combos.len();

    combos.retain(|c| c.meld_count() > 0 && (allow_laying_all || c.card_count() < hand.len()));
    combos.sort_by(|a, b| {
        b.value()
            .cmp(&a.value())
            .then(a.meld_count().cmp(&b.meld_count()))
    });

    debug!(
        hand = hand.len(),
        candidates = candidates.len(),
        found,
        kept = combos.len(),
        round = ctx.round,
        "combo search"
    );
    Ok(combos)
}

fn search(candidates: &[MeldCandidate], start: usize, current: Combo, out: &mut Vec<Combo>) {
    for (i, candidate) in candidates.iter().enumerate().skip(start) {
        if (candidate.mask & current.mask) != 0 {
            continue;
        }
        let next = current.with(i, candidate);
        out.push(next.clone());
        search(candidates, i + 1, next, out);
    }
}

/// Keeps the first of every group of look-alike combos. Order is preserved.
pub fn dedup_looking_equal(combos: Vec<Combo>) -> Vec<Combo> {
    let mut kept: Vec<Combo> = Vec::with_capacity(combos.len());
    for combo in combos {
        if !kept.iter().any(|k| k.looks_equal(&combo)) {
            kept.push(combo);
        }
    }
    kept
}

// ─── Tests ────────────────────────────────────────────────────────────────────
