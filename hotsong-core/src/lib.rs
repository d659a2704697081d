pub mod config;
pub mod error;
pub mod models;
pub mod ranking;
pub mod sync;

pub use config::*;
pub use error::*;
pub use models::*;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 安装日志订阅者，`RUST_LOG` 优先于 `default_filter`。
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
