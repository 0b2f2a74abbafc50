use crate::{error::ApiError, handlers::AppState, models::StatsResponse};
use axum::{extract::State, Json};

pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state.store.stats().await?;
    Ok(Json(stats))
}
