use serde::{Deserialize, Serialize};
use std::fmt;

use crate::engine::card::{Card, Rank, Suit};
use crate::engine::error::RulesError;
use crate::engine::rules::{
    resolved_ordinals, run_suit, run_value, set_value, validate_run, validate_set,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MeldKind {
    Run,
    Set,
}

/// A validated Run or Set. Construction fails instead of producing a meld
/// the rules would reject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meld {
    kind: MeldKind,
    cards: Vec<Card>,
    value: u32,
}

impl Meld {
    pub fn new(kind: MeldKind, cards: Vec<Card>) -> Result<Self, RulesError> {
        let value = match kind {
            MeldKind::Run => {
                validate_run(&cards)?;
                run_value(&cards)?
            }
            MeldKind::Set => {
                validate_set(&cards)?;
                set_value(&cards)
            }
        };
        Ok(Self { kind, cards, value })
    }

    pub fn run(cards: Vec<Card>) -> Result<Self, RulesError> {
        Self::new(MeldKind::Run, cards)
    }

    pub fn set(cards: Vec<Card>) -> Result<Self, RulesError> {
        Self::new(MeldKind::Set, cards)
    }

    /// Builds whichever meld `cards` form, trying a Set first.
    pub fn detect(cards: Vec<Card>) -> Result<Self, RulesError> {
        match validate_set(&cards) {
            Ok(()) => Self::set(cards),
            Err(_) => Self::run(cards),
        }
    }

    pub fn kind(&self) -> MeldKind {
        self.kind
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn into_cards(self) -> Vec<Card> {
        self.cards
    }

    pub fn count(&self) -> usize {
        self.cards.len()
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    /// Suit of a run. `None` for sets.
    pub fn suit(&self) -> Option<Suit> {
        match self.kind {
            MeldKind::Run => run_suit(&self.cards),
            MeldKind::Set => None,
        }
    }

    /// Rank shared by a set. `None` for runs.
    pub fn rank(&self) -> Option<Rank> {
        match self.kind {
            MeldKind::Set => self.cards.iter().find_map(|c| c.rank()),
            MeldKind::Run => None,
        }
    }

    /// Resolved ordinal per position. For a set every position carries the
    /// set's rank.
    pub fn resolved(&self) -> Vec<u8> {
        match self.kind {
            MeldKind::Run => resolved_ordinals(&self.cards).unwrap_or_default(),
            MeldKind::Set => {
                let ordinal = self.rank().map(|r| r.ordinal()).unwrap_or_default();
                vec![ordinal; self.cards.len()]
            }
        }
    }

    fn looks_key(&self) -> Vec<(u8, Card)> {
        let mut key: Vec<(u8, Card)> = self.resolved().into_iter().zip(self.cards.iter().copied()).collect();
        key.sort();
        key
    }

    /// Same shape ignoring which physical cards are used: same kind, same
    /// size and the same resolved ranks and faces.
    pub fn looks_equal(&self, other: &Meld) -> bool {
        self.kind == other.kind
            && self.cards.len() == other.cards.len()
            && self.looks_key() == other.looks_key()
    }
}

impl fmt::Display for Meld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, card) in self.cards.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", card)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::card::parse_cards;

    fn cards(s: &str) -> Vec<Card> {
        parse_cards(s).unwrap()
    }

    #[test]
    fn invalid_construction_fails_with_the_cards() {
        let err = Meld::run(cards("5♥ 7♥ 9♥")).unwrap_err();
        match err {
            RulesError::InvalidMeld { kind, cards, .. } => {
                assert_eq!(kind, MeldKind::Run);
                assert_eq!(cards, "5♥ 7♥ 9♥");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(Meld::set(cards("5♥ 5♥ 5♠")).is_err());
    }

    #[test]
    fn run_exposes_suit_and_value() {
        let meld = Meld::run(cards("5♥ 6♥ 7♥")).unwrap();
        assert_eq!(meld.kind(), MeldKind::Run);
        assert_eq!(meld.suit(), Some(Suit::Hearts));
        assert_eq!(meld.rank(), None);
        assert_eq!(meld.count(), 3);
        assert_eq!(meld.value(), 18);
        assert_eq!(meld.to_string(), "[5♥ 6♥ 7♥]");
    }

    #[test]
    fn rebuilding_from_own_cards_keeps_suit_and_rank() {
        let run = Meld::run(cards("🃏B 9♣ 10♣ J♣")).unwrap();
        let again = Meld::run(run.cards().to_vec()).unwrap();
        assert_eq!(again.suit(), run.suit());
        assert_eq!(again.resolved(), vec![8, 9, 10, 11]);
        assert_eq!(again.value(), run.value());

        let set = Meld::set(cards("Q♠ 🃏R Q♣")).unwrap();
        let again = Meld::set(set.cards().to_vec()).unwrap();
        assert_eq!(again.rank(), Some(Rank::Queen));
        assert_eq!(again.value(), 30);
    }

    #[test]
    fn detect_picks_the_matching_kind() {
        assert_eq!(Meld::detect(cards("8♠ 8♥ 8♦")).unwrap().kind(), MeldKind::Set);
        assert_eq!(Meld::detect(cards("8♠ 9♠ 10♠")).unwrap().kind(), MeldKind::Run);
        assert!(Meld::detect(cards("8♠ 9♥ 10♠")).is_err());
    }

    #[test]
    fn looks_equal_ignores_set_order() {
        let a = Meld::set(cards("7♠ 7♥ 🃏B")).unwrap();
        let b = Meld::set(cards("🃏B 7♥ 7♠")).unwrap();
        let c = Meld::set(cards("7♠ 7♦ 🃏B")).unwrap();
        assert!(a.looks_equal(&b));
        assert!(!a.looks_equal(&c));
    }

    #[test]
    fn looks_equal_distinguishes_kind_and_size() {
        let run = Meld::run(cards("5♥ 6♥ 7♥")).unwrap();
        let longer = Meld::run(cards("5♥ 6♥ 7♥ 8♥")).unwrap();
        assert!(run.looks_equal(&run.clone()));
        assert!(!run.looks_equal(&longer));
    }
}
