use serde::{Deserialize, Serialize};

/// 一首歌的播放统计，每次运行重新计算。
///
/// 对外字段名沿用报表的既有列名。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SongPopularity {
    pub song_id: String,
    #[serde(rename = "ten_bai_hat")]
    #[sqlx(rename = "ten_bai_hat")]
    pub song_name: Option<String>,
    #[serde(rename = "so_luong_chon")]
    #[sqlx(rename = "so_luong_chon")]
    pub play_count: i64,
}

/// 服务端返回的一行，同步工具只关心 `song_id`。
#[derive(Debug, Clone, Deserialize)]
pub struct HotSongRecord {
    #[serde(default)]
    pub song_id: Option<String>,
}
