use axum::{Json, extract::State};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::messages::{
    ComboView, CombosRequest, CombosResponse, DuoView, DuosRequest, DuosResponse, ValidateRequest,
    ValidateResponse, parse_all,
};
use crate::api::server::AppState;
use crate::config::RuleContext;
use crate::engine::card::Card;
use crate::engine::combo_finder::{dedup_looking_equal, find_all_combos};
use crate::engine::duo::{find_duo_runs, find_duo_sets};
use crate::engine::error::RulesError;
use crate::engine::meld::Meld;

/// Table cards and rule context for an analysis request: a hosted table
/// when `table_id` is given, the inline card list otherwise.
async fn table_context(
    state: &AppState,
    table_id: Option<Uuid>,
    inline: &[String],
) -> Result<(Vec<Card>, RuleContext), ApiError> {
    match table_id {
        Some(id) => {
            let table = state.tables.get(id).await.ok_or(ApiError::TableNotFound(id))?;
            let table = table.lock().await;
            Ok((table.cards(), *table.ctx()))
        }
        None => Ok((parse_all(inline)?, state.config.rule_context())),
    }
}

pub async fn validate(Json(req): Json<ValidateRequest>) -> Result<Json<ValidateResponse>, ApiError> {
    let cards = parse_all(&req.cards)?;
    let result = match req.kind {
        Some(kind) => Meld::new(kind, cards),
        None => Meld::detect(cards),
    };

    let response = match result {
        Ok(meld) => ValidateResponse {
            valid: true,
            kind: Some(meld.kind()),
            value: meld.value(),
            error: None,
        },
        Err(e) => ValidateResponse {
            valid: false,
            kind: req.kind,
            value: 0,
            error: Some(e.to_string()),
        },
    };
    Ok(Json(response))
}

pub async fn combos(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CombosRequest>,
) -> Result<Json<CombosResponse>, ApiError> {
    let hand = parse_all(&req.hand)?;
    let max = state.config.max_hand_size;
    if hand.len() > max {
        return Err(RulesError::HandTooLarge {
            len: hand.len(),
            max,
        }
        .into());
    }

    let (table, ctx) = table_context(&state, req.table_id, &req.table).await?;
    let mut combos = find_all_combos(&hand, &table, &ctx, req.allow_laying_all)?;
    if req.dedup {
        combos = dedup_looking_equal(combos);
    }

    Ok(Json(CombosResponse {
        combos: combos.iter().map(ComboView::from).collect(),
    }))
}

pub async fn duos(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DuosRequest>,
) -> Result<Json<DuosResponse>, ApiError> {
    let hand = parse_all(&req.hand)?;
    let (table, ctx) = table_context(&state, req.table_id, &req.table).await?;

    Ok(Json(DuosResponse {
        runs: find_duo_runs(&hand, &table, &ctx).iter().map(DuoView::from).collect(),
        sets: find_duo_sets(&hand, &table, &ctx).iter().map(DuoView::from).collect(),
    }))
}
