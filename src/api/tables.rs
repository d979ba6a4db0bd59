use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::messages::{
    CardRequest, CreateTableRequest, CreateTableResponse, FitView, HandRequest, LayDownRequest,
    PlaceResponse, SingleView, SinglesResponse, SpotView, TableView, parse_all,
};
use crate::api::server::AppState;
use crate::config::RuleContext;
use crate::engine::card::Card;
use crate::engine::meld::Meld;
use crate::tables::Table;

async fn find(state: &AppState, id: Uuid) -> Result<Arc<Mutex<Table>>, ApiError> {
    state.tables.get(id).await.ok_or(ApiError::TableNotFound(id))
}

fn view(table: &Table) -> TableView {
    TableView {
        id: table.id,
        round: table.ctx().round,
        spots: table
            .spots()
            .iter()
            .enumerate()
            .map(|(i, spot)| SpotView::new(i, spot))
            .collect(),
    }
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Query(req): Query<CreateTableRequest>,
) -> (StatusCode, Json<CreateTableResponse>) {
    let ctx = match req.decks {
        Some(decks) if decks > 0 => RuleContext::new(decks),
        _ => state.config.rule_context(),
    };
    let id = state.tables.create(ctx).await;
    (StatusCode::CREATED, Json(CreateTableResponse { id }))
}

pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<TableView>, ApiError> {
    let table = find(&state, id).await?;
    let table = table.lock().await;
    Ok(Json(view(&table)))
}

pub async fn close(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.tables.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::TableNotFound(id))
    }
}

/// Starts the next round on the same table.
pub async fn reset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<TableView>, ApiError> {
    let table = find(&state, id).await?;
    let mut table = table.lock().await;
    table.reset();
    Ok(Json(view(&table)))
}

pub async fn lay_down(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<LayDownRequest>,
) -> Result<(StatusCode, Json<SpotView>), ApiError> {
    let cards = parse_all(&req.cards)?;
    let table = find(&state, id).await?;
    let mut table = table.lock().await;

    let round = table.ctx().round;
    let meld = match req.kind {
        Some(kind) => Meld::new(kind, cards),
        None => Meld::detect(cards),
    }
    .map_err(|e| e.in_round(round))?;

    let index = table.lay_down(meld)?;
    let spot = table.spot(index)?;
    Ok((StatusCode::CREATED, Json(SpotView::new(index, spot))))
}

pub async fn fit(
    State(state): State<Arc<AppState>>,
    Path((id, index)): Path<(Uuid, usize)>,
    Json(req): Json<CardRequest>,
) -> Result<Json<FitView>, ApiError> {
    let card: Card = req.card.parse()?;
    let table = find(&state, id).await?;
    let table = table.lock().await;
    Ok(Json(table.fit(index, card)?.into()))
}

pub async fn place(
    State(state): State<Arc<AppState>>,
    Path((id, index)): Path<(Uuid, usize)>,
    Json(req): Json<CardRequest>,
) -> Result<Json<PlaceResponse>, ApiError> {
    let card: Card = req.card.parse()?;
    let table = find(&state, id).await?;
    let mut table = table.lock().await;

    let joker = table.place(index, card)?;
    let spot = table.spot(index)?;
    Ok(Json(PlaceResponse {
        spot: SpotView::new(index, spot),
        joker: joker.map(|j| j.to_string()),
    }))
}

pub async fn singles(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<HandRequest>,
) -> Result<Json<SinglesResponse>, ApiError> {
    let hand = parse_all(&req.hand)?;
    let table = find(&state, id).await?;
    let table = table.lock().await;
    Ok(Json(SinglesResponse {
        singles: table.singles(&hand).iter().map(SingleView::from).collect(),
    }))
}
