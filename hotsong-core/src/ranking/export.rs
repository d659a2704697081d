use crate::error::AppError;
use crate::models::SongPopularity;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const OUTPUT_FILE: &str = "top_songs.csv";
pub const CSV_HEADER: [&str; 3] = ["song_id", "ten_bai_hat", "so_luong_chon"];

// Excel 需要 BOM 才能正确识别 UTF-8 歌名
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 写出 BOM、表头和全部数据行。没有数据时也会写表头。
pub fn write_csv<W: Write>(mut writer: W, rows: &[SongPopularity]) -> Result<(), AppError> {
    writer.write_all(UTF8_BOM)?;

    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// 覆盖写入目标文件。
pub fn export_to_path(path: &Path, rows: &[SongPopularity]) -> Result<(), AppError> {
    tracing::info!("Writing results to {}...", path.display());
    let file = File::create(path)?;
    write_csv(BufWriter::new(file), rows)?;
    tracing::info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}
