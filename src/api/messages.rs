use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::card::{Card, ParseCardError};
use crate::engine::combo_finder::{Combo, MeldCandidate};
use crate::engine::duo::{Duo, DuoKind};
use crate::engine::error::render_cards;
use crate::engine::meld::MeldKind;
use crate::engine::spot::{Fit, Single, Spot, SpotState};

/// Cards travel as their rendered text (`"10♥"`, `"🃏B"`, or `"10h"`).
pub fn parse_all(cards: &[String]) -> Result<Vec<Card>, ParseCardError> {
    cards.iter().map(|c| c.parse()).collect()
}

// ─── Requests ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub cards: Vec<String>,
    /// Checked as this kind only; detected when absent.
    pub kind: Option<MeldKind>,
}

#[derive(Debug, Deserialize)]
pub struct CombosRequest {
    pub hand: Vec<String>,
    #[serde(default)]
    pub table: Vec<String>,
    /// Takes the table cards from a hosted table instead of `table`.
    pub table_id: Option<Uuid>,
    #[serde(default)]
    pub allow_laying_all: bool,
    #[serde(default)]
    pub dedup: bool,
}

#[derive(Debug, Deserialize)]
pub struct DuosRequest {
    pub hand: Vec<String>,
    #[serde(default)]
    pub table: Vec<String>,
    pub table_id: Option<Uuid>,
}

/// Query string of `POST /api/tables`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateTableRequest {
    pub decks: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct LayDownRequest {
    pub cards: Vec<String>,
    pub kind: Option<MeldKind>,
}

#[derive(Debug, Deserialize)]
pub struct CardRequest {
    pub card: String,
}

#[derive(Debug, Deserialize)]
pub struct HandRequest {
    pub hand: Vec<String>,
}

// ─── Responses ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub kind: Option<MeldKind>,
    pub value: u32,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MeldView {
    pub kind: MeldKind,
    pub cards: String,
    pub card_indices: Vec<usize>,
    pub value: u32,
}

impl From<&MeldCandidate> for MeldView {
    fn from(candidate: &MeldCandidate) -> Self {
        Self {
            kind: candidate.meld.kind(),
            cards: render_cards(candidate.meld.cards()),
            card_indices: candidate.card_indices.clone(),
            value: candidate.meld.value(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ComboView {
    pub text: String,
    pub value: u32,
    pub card_count: usize,
    pub melds: Vec<MeldView>,
}

impl From<&Combo> for ComboView {
    fn from(combo: &Combo) -> Self {
        Self {
            text: combo.to_string(),
            value: combo.value(),
            card_count: combo.card_count(),
            melds: combo.melds().map(MeldView::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CombosResponse {
    pub combos: Vec<ComboView>,
}

#[derive(Debug, Serialize)]
pub struct DuoView {
    pub kind: DuoKind,
    pub indices: [usize; 2],
    pub cards: String,
    pub missing: String,
}

impl From<&Duo> for DuoView {
    fn from(duo: &Duo) -> Self {
        Self {
            kind: duo.kind,
            indices: duo.indices,
            cards: render_cards(&duo.cards),
            missing: render_cards(&duo.missing),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DuosResponse {
    pub runs: Vec<DuoView>,
    pub sets: Vec<DuoView>,
}

#[derive(Debug, Serialize)]
pub struct CreateTableResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SpotView {
    pub index: usize,
    pub state: SpotState,
    pub cards: String,
    pub value: u32,
    pub full: bool,
}

impl SpotView {
    pub fn new(index: usize, spot: &Spot) -> Self {
        Self {
            index,
            state: spot.state(),
            cards: render_cards(spot.cards()),
            value: spot.value(),
            full: spot.is_full(true),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TableView {
    pub id: Uuid,
    pub round: u32,
    pub spots: Vec<SpotView>,
}

#[derive(Debug, Serialize)]
pub struct FitView {
    pub fits: bool,
    pub replaces_joker: bool,
    pub position: Option<usize>,
    pub joker: Option<String>,
}

impl From<Fit> for FitView {
    fn from(fit: Fit) -> Self {
        let position = match fit {
            Fit::ReplaceJoker { position, .. } => Some(position),
            Fit::No | Fit::Extend => None,
        };
        Self {
            fits: fit.fits(),
            replaces_joker: position.is_some(),
            position,
            joker: fit.joker().map(|j| j.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlaceResponse {
    pub spot: SpotView,
    /// Joker handed back to whoever laid it.
    pub joker: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SingleView {
    pub hand_index: usize,
    pub spot_index: usize,
    pub card: String,
    pub joker: Option<String>,
}

impl From<&Single> for SingleView {
    fn from(single: &Single) -> Self {
        Self {
            hand_index: single.hand_index,
            spot_index: single.spot_index,
            card: single.card.to_string(),
            joker: single.joker.map(|j| j.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SinglesResponse {
    pub singles: Vec<SingleView>,
}
