use crate::error::AppError;
use crate::models::HotSongRecord;
use crate::ranking::is_numeric_song_id;
use std::collections::HashSet;

/// 从统计服务拉取热门歌曲 ID。
pub struct HotSongClient {
    client: reqwest::Client,
    api_url: String,
}

impl HotSongClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
        }
    }

    pub async fn fetch_hot_song_ids(&self, limit: i64) -> Result<HashSet<String>, AppError> {
        tracing::info!("Fetching hot songs from {}...", self.api_url);
        let records: Vec<HotSongRecord> = self
            .client
            .get(&self.api_url)
            .query(&[("limit", limit)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let ids = collect_song_ids(records);
        tracing::info!("Found {} hot songs from API.", ids.len());
        Ok(ids)
    }
}

/// 去掉空 ID 和纯数字 ID。
pub fn collect_song_ids(records: Vec<HotSongRecord>) -> HashSet<String> {
    records
        .into_iter()
        .filter_map(|r| r.song_id)
        .filter(|id| {
            if id.is_empty() {
                return false;
            }
            if is_numeric_song_id(id) {
                tracing::debug!("Ignoring numeric song id from API: {}", id);
                return false;
            }
            true
        })
        .collect()
}
