use crate::engine::card::{ACE_HIGH, ACE_LOW, Card, Color, Rank, Suit, ordinal_value};
use crate::engine::error::{RulesError, render_cards};
use crate::engine::meld::MeldKind;

pub const MIN_MELD_LEN: usize = 3;
pub const MAX_SET_LEN: usize = 4;
pub const MAX_RUN_LEN: usize = 14;

// ─── Sets ────────────────────────────────────────────────────────────────────

/// Checks that `cards` form a Set: 3 or 4 cards of one rank, pairwise
/// distinct suits and at most one Joker.
///
/// A Joker is blocked when both suits of its color are already present,
/// because it would have nothing left to stand for.
pub fn validate_set(cards: &[Card]) -> Result<(), RulesError> {
    let invalid = |reason: &str| RulesError::invalid(MeldKind::Set, cards, reason);

    if !(MIN_MELD_LEN..=MAX_SET_LEN).contains(&cards.len()) {
        return Err(invalid("a set holds 3 or 4 cards"));
    }

    let mut jokers: Vec<Color> = Vec::new();
    let mut rank: Option<Rank> = None;
    let mut suits: Vec<Suit> = Vec::with_capacity(cards.len());

    for card in cards {
        match card {
            Card::Joker(color) => jokers.push(*color),
            Card::Standard { suit, rank: r } => {
                match rank {
                    Some(existing) if existing != *r => {
                        return Err(invalid("all natural cards must share one rank"));
                    }
                    _ => rank = Some(*r),
                }
                if suits.contains(suit) {
                    return Err(invalid("suits must be pairwise distinct"));
                }
                suits.push(*suit);
            }
        }
    }

    if jokers.len() > 1 {
        return Err(invalid("at most one joker per set"));
    }
    if let Some(color) = jokers.first() {
        let same_color = suits.iter().filter(|s| s.color() == *color).count();
        if same_color >= 2 {
            return Err(invalid("joker color is blocked by both suits of that color"));
        }
    }
    Ok(())
}

pub fn is_valid_set(cards: &[Card]) -> bool {
    validate_set(cards).is_ok()
}

/// Value of a set: every card counts as the set's rank.
pub fn set_value(cards: &[Card]) -> u32 {
    cards
        .iter()
        .find_map(|c| c.rank())
        .map(|rank| rank.value() * cards.len() as u32)
        .unwrap_or(0)
}

/// The suits a Joker in this set could be standing for.
///
/// Returns an empty list when the set holds no Joker.
pub fn joker_suit_options(cards: &[Card]) -> Vec<Suit> {
    let Some(color) = cards.iter().find_map(|c| match c {
        Card::Joker(color) => Some(*color),
        Card::Standard { .. } => None,
    }) else {
        return Vec::new();
    };
    Suit::ALL
        .into_iter()
        .filter(|s| s.color() == color && !cards.iter().any(|c| c.suit() == Some(*s)))
        .collect()
}

// ─── Runs ────────────────────────────────────────────────────────────────────

/// Ordinal of the natural card at `position`. An Ace opening the run is
/// Ace-low; anywhere else it is Ace-high.
fn natural_ordinal(rank: Rank, position: usize) -> u8 {
    if rank == Rank::Ace && position == 0 {
        ACE_LOW
    } else {
        rank.ordinal()
    }
}

/// Rank the Joker at `position` stands for, inferred from the nearest
/// natural card: forward first, then backward.
pub fn joker_rank(cards: &[Card], position: usize) -> Result<u8, RulesError> {
    let forward = cards
        .iter()
        .enumerate()
        .skip(position + 1)
        .find_map(|(i, c)| c.rank().map(|r| natural_ordinal(r, i) as i32 - (i - position) as i32));
    let backward = || {
        cards[..position.min(cards.len())]
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, c)| c.rank().map(|r| natural_ordinal(r, i) as i32 + (position - i) as i32))
    };

    let resolved = forward.or_else(backward).ok_or_else(|| RulesError::AmbiguousJoker {
        position,
        cards: render_cards(cards),
    })?;

    if !(ACE_LOW as i32..=ACE_HIGH as i32).contains(&resolved) {
        return Err(RulesError::invalid(
            MeldKind::Run,
            cards,
            format!("joker at position {position} falls outside Ace..Ace"),
        ));
    }
    Ok(resolved as u8)
}

/// Resolved ordinal of every position in a run, Jokers included.
pub fn resolved_ordinals(cards: &[Card]) -> Result<Vec<u8>, RulesError> {
    cards
        .iter()
        .enumerate()
        .map(|(i, card)| match card {
            Card::Standard { rank, .. } => Ok(natural_ordinal(*rank, i)),
            Card::Joker(_) => joker_rank(cards, i),
        })
        .collect()
}

/// Checks that `cards`, in order, form a Run: at least 3 cards of one suit
/// with strictly consecutive resolved ranks. Jokers must match the suit's
/// color. An Ace is low only in first position and high only after a King.
pub fn validate_run(cards: &[Card]) -> Result<(), RulesError> {
    let invalid = |reason: &str| RulesError::invalid(MeldKind::Run, cards, reason);

    if cards.len() < MIN_MELD_LEN {
        return Err(invalid("a run holds at least 3 cards"));
    }
    if cards.len() > MAX_RUN_LEN {
        return Err(invalid("a run holds at most 14 cards"));
    }

    let suit = run_suit(cards).ok_or_else(|| invalid("a run needs at least one natural card"))?;
    for card in cards {
        match card {
            Card::Standard { suit: s, .. } if *s != suit => {
                return Err(invalid("all natural cards must share one suit"));
            }
            Card::Joker(color) if *color != suit.color() => {
                return Err(invalid("joker color must match the run's suit"));
            }
            _ => {}
        }
    }

    let ordinals = resolved_ordinals(cards)?;
    if ordinals.windows(2).any(|w| w[1] != w[0] + 1) {
        return Err(invalid("ranks must increase by exactly one"));
    }
    if ordinals.first() == Some(&ACE_LOW) && ordinals.last() == Some(&ACE_HIGH) {
        return Err(invalid("an ace cannot be both low and high"));
    }
    Ok(())
}

pub fn is_valid_run(cards: &[Card]) -> bool {
    validate_run(cards).is_ok()
}

/// Suit of a run, taken from its first natural card.
pub fn run_suit(cards: &[Card]) -> Option<Suit> {
    cards.iter().find_map(|c| c.suit())
}

/// Sum of the resolved rank values. An opening Ace counts 1.
pub fn run_value(cards: &[Card]) -> Result<u32, RulesError> {
    Ok(resolved_ordinals(cards)?
        .into_iter()
        .map(ordinal_value)
        .sum())
}
