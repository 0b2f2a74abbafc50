use crate::{error::ApiError, handlers::AppState, models::ActivitySnapshot};
use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

const DEFAULT_WINDOW_HOURS: i64 = 24;

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub hours: Option<i64>,
}

pub async fn get_activity(
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Vec<ActivitySnapshot>>, ApiError> {
    let hours = query.hours.unwrap_or(DEFAULT_WINDOW_HOURS).max(1);
    let cutoff = Utc::now().timestamp() - hours * 3600;
    let snapshots = state.store.snapshots_since(cutoff).await?;
    Ok(Json(snapshots))
}
