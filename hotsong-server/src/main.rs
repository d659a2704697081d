use hotsong_core::config::DbConfig;
use hotsong_server::AppState;
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    hotsong_core::init_tracing("hotsong_server=info,hotsong_core=info,tower_http=info");

    let db = DbConfig::from_env()?;
    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8000".to_string())
        .parse()?;

    tracing::info!("Using database {} at {}:{}", db.name, db.host, db.port);
    let state = Arc::new(AppState {
        db: db.connect_options(),
    });
    let app = hotsong_server::build_router(state);

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
