use serde::Serialize;

use crate::engine::card::{ACE_HIGH, ACE_LOW, Card, Rank};
use crate::engine::error::RulesError;
use crate::engine::meld::{Meld, MeldKind};
use crate::engine::rules::{
    MAX_RUN_LEN, MAX_SET_LEN, joker_suit_options, resolved_ordinals, run_suit,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpotState {
    Empty,
    Run,
    Set,
}

/// Where a card can go on a table meld.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    No,
    /// The card extends the meld.
    Extend,
    /// The card takes the place of the Joker at `position`, which goes back
    /// to whoever laid it.
    ReplaceJoker { position: usize, joker: Card },
}

impl Fit {
    pub fn fits(&self) -> bool {
        !matches!(self, Fit::No)
    }

    /// The Joker that has to leave the meld first, if any.
    pub fn joker(&self) -> Option<Card> {
        match self {
            Fit::ReplaceJoker { joker, .. } => Some(*joker),
            _ => None,
        }
    }
}

/// A meld slot on the table. Its kind is fixed by the first meld laid into
/// it and its cards are kept in canonical order (ascending for runs).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Spot {
    kind: Option<MeldKind>,
    cards: Vec<Card>,
}

impl Spot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_meld(meld: Meld) -> Self {
        Self {
            kind: Some(meld.kind()),
            cards: meld.into_cards(),
        }
    }

    /// Places the first meld into an empty spot.
    pub fn lay_down(&mut self, meld: Meld) -> Result<(), RulesError> {
        if self.kind.is_some() {
            return Err(RulesError::SpotOccupied);
        }
        *self = Self::from_meld(meld);
        Ok(())
    }

    /// Empties the spot for a new round, handing back its cards.
    pub fn reset(&mut self) -> Vec<Card> {
        self.kind = None;
        std::mem::take(&mut self.cards)
    }

    pub fn state(&self) -> SpotState {
        match self.kind {
            None => SpotState::Empty,
            Some(MeldKind::Run) => SpotState::Run,
            Some(MeldKind::Set) => SpotState::Set,
        }
    }

    pub fn kind(&self) -> Option<MeldKind> {
        self.kind
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn as_meld(&self) -> Option<Meld> {
        self.kind
            .and_then(|kind| Meld::new(kind, self.cards.clone()).ok())
    }

    pub fn value(&self) -> u32 {
        self.as_meld().map(|m| m.value()).unwrap_or(0)
    }

    /// Whether nothing more can be added. With `include_jokers` false only
    /// natural cards count, so a Joker that could still be swapped out
    /// keeps the spot open.
    pub fn is_full(&self, include_jokers: bool) -> bool {
        let jokers = self.cards.iter().filter(|c| c.is_joker()).count();
        let count = if include_jokers {
            self.cards.len()
        } else {
            self.cards.len() - jokers
        };
        match self.kind {
            None => false,
            Some(MeldKind::Set) => count >= MAX_SET_LEN,
            Some(MeldKind::Run) => {
                count >= MAX_RUN_LEN || ((include_jokers || jokers == 0) && self.spans_whole_suit())
            }
        }
    }

    fn spans_whole_suit(&self) -> bool {
        match resolved_ordinals(&self.cards) {
            Ok(ords) => matches!(
                (ords.first().copied(), ords.last().copied()),
                (Some(ACE_LOW), Some(13)) | (Some(2), Some(ACE_HIGH))
            ),
            Err(_) => false,
        }
    }

    /// Position at which `card` is inserted to keep the meld in order.
    ///
    /// Sets and runs made only of Jokers just append. In a run an Ace goes
    /// in front unless the run already tops out at King; a Joker goes at
    /// the end unless the run already tops out at Ace; any other card goes
    /// before the first position resolved above it.
    pub fn insert_position(&self, card: Card) -> Result<usize, RulesError> {
        let len = self.cards.len();
        if self.kind != Some(MeldKind::Run) || self.cards.iter().all(|c| c.is_joker()) {
            return Ok(len);
        }

        let ords = resolved_ordinals(&self.cards)?;
        let top = ords.last().copied().unwrap_or_default();
        let ends_natural = self.cards.last().is_some_and(|c| !c.is_joker());

        let position = match card {
            Card::Joker(_) if top == ACE_HIGH => 0,
            Card::Joker(_) => len,
            Card::Standard { rank: Rank::Ace, .. } => {
                if top == 13 || (top == ACE_HIGH && ends_natural) {
                    len
                } else {
                    0
                }
            }
            Card::Standard { rank, .. } => ords
                .iter()
                .position(|o| *o > rank.ordinal())
                .unwrap_or(len),
        };
        Ok(position)
    }

    /// Inserts `card` in order. The spot is left untouched when the result
    /// would not be a legal meld.
    pub fn add_card(&mut self, card: Card) -> Result<usize, RulesError> {
        let kind = self.kind.ok_or(RulesError::SpotEmpty)?;
        let position = self.insert_position(card)?;
        let mut cards = self.cards.clone();
        cards.insert(position, card);
        let meld = Meld::new(kind, cards)?;
        self.cards = meld.into_cards();
        Ok(position)
    }

    /// Decides whether `card` can go into this meld, and whether a Joker
    /// has to be swapped out for it.
    pub fn can_fit(&self, card: Card) -> Fit {
        let Some(kind) = self.kind else {
            return Fit::No;
        };

        if let Some((position, joker)) = self.joker_replaced_by(kind, card) {
            return Fit::ReplaceJoker { position, joker };
        }

        let mut trial = self.clone();
        match trial.add_card(card) {
            Ok(_) => Fit::Extend,
            Err(_) => Fit::No,
        }
    }

    fn joker_replaced_by(&self, kind: MeldKind, card: Card) -> Option<(usize, Card)> {
        let Card::Standard { suit, rank } = card else {
            return None;
        };

        let position = match kind {
            MeldKind::Set => {
                let set_rank = self.cards.iter().find_map(|c| c.rank())?;
                if set_rank != rank || joker_suit_options(&self.cards) != [suit] {
                    return None;
                }
                self.cards.iter().position(|c| c.is_joker())?
            }
            MeldKind::Run => {
                if run_suit(&self.cards) != Some(suit) {
                    return None;
                }
                let ords = resolved_ordinals(&self.cards).ok()?;
                self.cards.iter().enumerate().position(|(i, c)| {
                    let natural = if rank == Rank::Ace && i == 0 {
                        ACE_LOW
                    } else {
                        rank.ordinal()
                    };
                    c.is_joker() && ords[i] == natural
                })?
            }
        };

        let mut cards = self.cards.clone();
        let joker = std::mem::replace(&mut cards[position], card);
        Meld::new(kind, cards).ok()?;
        Some((position, joker))
    }

    /// Puts `card` in place of the Joker it stands for and returns the Joker.
    pub fn replace_joker(&mut self, card: Card) -> Result<Card, RulesError> {
        match self.can_fit(card) {
            Fit::ReplaceJoker { position, joker } => {
                self.cards[position] = card;
                Ok(joker)
            }
            _ => Err(RulesError::NoJokerToReplace { card }),
        }
    }
}

/// A single hand card that can go onto a table meld.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Single {
    pub hand_index: usize,
    pub spot_index: usize,
    pub card: Card,
    /// Joker displaced by the card, to be handed back to its owner.
    pub joker: Option<Card>,
}

/// Every card of `hand` that fits some spot, one entry per (card, spot).
pub fn find_singles(hand: &[Card], spots: &[Spot]) -> Vec<Single> {
    let mut singles = Vec::new();
    for (hand_index, card) in hand.iter().enumerate() {
        for (spot_index, spot) in spots.iter().enumerate() {
            let fit = spot.can_fit(*card);
            if fit.fits() {
                singles.push(Single {
                    hand_index,
                    spot_index,
                    card: *card,
                    joker: fit.joker(),
                });
            }
        }
    }
    singles
}
