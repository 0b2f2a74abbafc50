use crate::{error::ApiError, handlers::AppState, models::TransactionRecord};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

const DEFAULT_LIMIT: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct TransactionsQuery {
    pub limit: Option<i64>,
}

pub async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Json<Vec<TransactionRecord>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).max(1);
    let transactions = state.store.recent_transactions(limit).await?;
    Ok(Json(transactions))
}
