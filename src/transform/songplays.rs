//! Songplays fact table: one row per valid play event.
//!
//! Catalog references are resolved by matching (song title, artist name,
//! duration) against the songs and artists dimensions. The join is
//! best-effort: a play with no catalog match, or missing any join key,
//! still produces a fact row with null song_id/artist_id. The probe side is
//! deduplicated by the full key first, so the left join can never multiply
//! fact rows and the row count stays equal to the valid play count.

use crate::error::Result;
use polars::prelude::*;

/// Songplays fact table from valid plays plus the two catalog dimensions
pub fn songplays_table(
    plays: &DataFrame,
    songs: &DataFrame,
    artists: &DataFrame,
) -> Result<DataFrame> {
    // (title, name, duration) -> (song_id, artist_id), keep first
    let probe = songs
        .clone()
        .lazy()
        .join(
            artists
                .clone()
                .lazy()
                .select([col("artist_id"), col("name")]),
            [col("artist_id")],
            [col("artist_id")],
            JoinArgs::new(JoinType::Inner),
        )
        .select([
            col("title"),
            col("name"),
            col("duration"),
            col("song_id"),
            col("artist_id"),
        ])
        .group_by_stable([col("title"), col("name"), col("duration")])
        .agg([col("song_id").first(), col("artist_id").first()]);

    let df = plays
        .clone()
        .lazy()
        .join(
            probe,
            [col("song"), col("artist"), col("length")],
            [col("title"), col("name"), col("duration")],
            JoinArgs::new(JoinType::Left),
        )
        .select([
            col("start_time"),
            col("user_id"),
            col("level"),
            col("song_id"),
            col("artist_id"),
            col("sessionId").alias("session_id"),
            col("location"),
            col("userAgent").alias("user_agent"),
            col("start_time").dt().year().cast(DataType::Int32).alias("year"),
            col("start_time").dt().month().cast(DataType::Int32).alias("month"),
        ])
        // Deterministic row order before ids are assigned; join output order
        // is not guaranteed by the engine
        .sort(
            ["start_time", "session_id"],
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .with_row_index("songplay_id", None)
        .collect()?;
    Ok(df)
}
