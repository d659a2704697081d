use crate::handlers::songs;
use crate::AppState;
use axum::{routing::get, Router};
use std::sync::Arc;

pub fn song_routes() -> Router<Arc<AppState>> {
    Router::new().route("/top_songs", get(songs::get_top_songs))
}
