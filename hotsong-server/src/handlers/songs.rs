use crate::{ApiError, AppState};
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use hotsong_core::config::DEFAULT_LIMIT;
use hotsong_core::error::AppError;
use hotsong_core::ranking::top_songs;
use serde::Deserialize;
use sqlx::{ConnectOptions, Connection};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct TopSongsQuery {
    pub limit: Option<i64>,
}

pub async fn get_top_songs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TopSongsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);

    let mut conn = state
        .db
        .connect()
        .await
        .map_err(AppError::Connection)?;

    let rows = top_songs(&mut conn, limit).await;
    if let Err(e) = conn.close().await {
        tracing::warn!("Failed to close database connection: {}", e);
    }

    Ok(Json(rows?))
}
