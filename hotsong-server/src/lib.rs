pub mod handlers;
pub mod routes;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use hotsong_core::error::{AppError, ErrorResponse};
use sqlx::postgres::PgConnectOptions;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// 服务状态只保存连接参数；每个请求自行建立并关闭数据库连接。
pub struct AppState {
    pub db: PgConnectOptions,
}

// 定义 Server 本地的错误包装器
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(inner: AppError) -> Self {
        Self(inner)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            AppError::Connection(ref e) => {
                tracing::error!("Error connecting to database: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database connection error".to_string(),
                )
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            other => {
                tracing::error!("Internal error: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .merge(routes::song_routes())
        .layer(axum::middleware::from_fn(
            |req: axum::extract::Request, next: axum::middleware::Next| async move {
                let method = req.method().clone();
                let uri = req.uri().clone();
                // 记录请求审计日志
                tracing::info!("REQ: {} {}", method, uri);
                let response = next.run(req).await;
                tracing::info!("RES: {} -> {}", uri, response.status());
                response
            },
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
