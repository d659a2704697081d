use hotsong_core::config::{limit_from_env, DbConfig};
use hotsong_core::error::AppError;
use hotsong_core::ranking::export::{export_to_path, OUTPUT_FILE};
use hotsong_core::ranking::top_songs;
use sqlx::{ConnectOptions, Connection};
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    hotsong_core::init_tracing("export_top_songs=info,hotsong_core=info");

    let db = DbConfig::from_env()?;
    let limit = limit_from_env()?;

    tracing::info!("Connecting to database {} at {}...", db.name, db.host);
    let mut conn = db
        .connect_options()
        .connect()
        .await
        .map_err(AppError::Connection)?;

    let rows = top_songs(&mut conn, limit).await;
    if let Err(e) = conn.close().await {
        tracing::warn!("Failed to close database connection cleanly: {}", e);
    }
    tracing::info!("Database connection closed.");

    // 查询失败时不写文件，保留上一次的导出结果
    let rows = rows?;
    export_to_path(Path::new(OUTPUT_FILE), &rows)?;

    tracing::info!("Done!");
    Ok(())
}
