use crate::error::AppError;
use crate::models::SongPopularity;
use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::PgExecutor;

pub mod export;

// 纯数字 ID 视为无意义的旧数据，与 SQL 中的 !~ 条件保持一致
static NUMERIC_SONG_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());

pub const TOP_SONGS_SQL: &str = r#"
SELECT
    t.metadata ->> 'songId' AS song_id,
    t.metadata ->> 'songName' AS ten_bai_hat,
    COUNT(*) AS so_luong_chon
FROM
    public.tracking AS t
WHERE
    t."event" = 'event_play_song'
    AND (t.metadata ->> 'songId') !~ '^[0-9]+$'
GROUP BY
    t.metadata ->> 'songId',
    t.metadata ->> 'songName'
ORDER BY
    so_luong_chon DESC
LIMIT $1
"#;

pub fn is_numeric_song_id(song_id: &str) -> bool {
    NUMERIC_SONG_ID.is_match(song_id)
}

/// 按播放次数倒序统计歌曲，最多返回 `limit` 行。
///
/// 出错时直接返回错误，不会有部分结果。
pub async fn top_songs<'e, E>(executor: E, limit: i64) -> Result<Vec<SongPopularity>, AppError>
where
    E: PgExecutor<'e>,
{
    tracing::info!(limit, "Executing top songs query...");
    let rows = sqlx::query_as::<_, SongPopularity>(TOP_SONGS_SQL)
        .bind(limit)
        .fetch_all(executor)
        .await?;
    tracing::info!("Retrieved {} rows.", rows.len());
    Ok(rows)
}
