use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::engine::card::ParseCardError;
use crate::engine::error::RulesError;
use crate::tables::TableError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Card(#[from] ParseCardError),
    #[error(transparent)]
    Rules(#[from] RulesError),
    #[error("table {0} not found")]
    TableNotFound(Uuid),
    #[error("table has no spot {0}")]
    SpotNotFound(usize),
}

impl From<TableError> for ApiError {
    fn from(err: TableError) -> Self {
        match err {
            TableError::NoSuchSpot(index) => ApiError::SpotNotFound(index),
            TableError::Rules(rules) => ApiError::Rules(rules),
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Card(_) => StatusCode::BAD_REQUEST,
            ApiError::Rules(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::TableNotFound(_) | ApiError::SpotNotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        warn!(status = status.as_u16(), error = %message, "request rejected");
        (status, Json(json!({ "error": message }))).into_response()
    }
}
