//! Songs and artists dimensions, projected from the raw song catalog.
//!
//! Artist attributes arrive denormalized onto every song record, so both
//! projections deduplicate by their key. Tie-break: first-encountered wins
//! under the stable input ordering established by the Extractor (sorted file
//! paths, in-file row order). Records without a key are unusable as
//! dimension rows and are dropped.

use crate::error::Result;
use polars::prelude::*;

/// Songs dimension: one row per song_id, keep first
pub fn songs_table(raw_songs: &DataFrame) -> Result<DataFrame> {
    let df = raw_songs
        .clone()
        .lazy()
        .filter(col("song_id").is_not_null())
        .group_by_stable([col("song_id")])
        .agg([
            col("title").first(),
            col("artist_id").first(),
            col("year").first(),
            col("duration").first(),
        ])
        .collect()?;
    Ok(df)
}

/// Artists dimension: one row per artist_id, keep first
pub fn artists_table(raw_songs: &DataFrame) -> Result<DataFrame> {
    let df = raw_songs
        .clone()
        .lazy()
        .filter(col("artist_id").is_not_null())
        .group_by_stable([col("artist_id")])
        .agg([
            col("artist_name").first().alias("name"),
            col("artist_location").first().alias("location"),
            col("artist_latitude").first().alias("latitude"),
            col("artist_longitude").first().alias("longitude"),
        ])
        .collect()?;
    Ok(df)
}
