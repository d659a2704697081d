use hotsong_core::config::SyncConfig;
use hotsong_core::sync;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    hotsong_core::init_tracing("copy_hot_songs=info,hotsong_core=info");

    let config = SyncConfig::from_env()?;

    match sync::run(&config).await? {
        Some(report) => {
            tracing::info!("Process completed.");
            tracing::info!("Copied: {}", report.copied);
            tracing::info!("Already present: {}", report.already_present);
            if !report.failed.is_empty() {
                tracing::warn!(
                    "Copy failures: {} ({})",
                    report.failed.len(),
                    report.failed.join(", ")
                );
            }
        }
        None => tracing::info!("Nothing to sync."),
    }

    Ok(())
}
