use thiserror::Error;

use crate::engine::card::{Card, Suit};
use crate::engine::meld::MeldKind;

/// Renders a card list the way it is shown to players, for error context.
pub fn render_cards(cards: &[Card]) -> String {
    cards
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    #[error("invalid {kind:?} [{cards}]: {reason}")]
    InvalidMeld {
        kind: MeldKind,
        cards: String,
        reason: String,
    },
    #[error("joker at position {position} has no anchor in run [{cards}]")]
    AmbiguousJoker { position: usize, cards: String },
    #[error("expected two different suits, got {0:?} twice")]
    SameSuit(Suit),
    #[error("hand of {len} cards exceeds the supported maximum of {max}")]
    HandTooLarge { len: usize, max: usize },
    #[error("spot already holds a meld")]
    SpotOccupied,
    #[error("spot is empty")]
    SpotEmpty,
    #[error("{card} does not replace a joker in this meld")]
    NoJokerToReplace { card: Card },
    #[error("round {round}: {source}")]
    InRound {
        round: u32,
        #[source]
        source: Box<RulesError>,
    },
}

impl RulesError {
    pub(crate) fn invalid(kind: MeldKind, cards: &[Card], reason: impl Into<String>) -> Self {
        Self::InvalidMeld {
            kind,
            cards: render_cards(cards),
            reason: reason.into(),
        }
    }

    /// Attaches the round the error happened in.
    pub fn in_round(self, round: u32) -> Self {
        match self {
            already @ Self::InRound { .. } => already,
            other => Self::InRound {
                round,
                source: Box::new(other),
            },
        }
    }

    /// The error without any context wrappers.
    pub fn root(&self) -> &RulesError {
        match self {
            Self::InRound { source, .. } => source.root(),
            other => other,
        }
    }
}
