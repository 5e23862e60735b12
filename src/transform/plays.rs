//! Play-event filtering and row-level validity accounting.
//!
//! Only `page == "NextSong"` events represent actual plays; every
//! event-derived table operates on this filtered subset. Two derived columns
//! are added here so downstream operations share one definition:
//! `user_id` (userId coerced to Int64) and `start_time` (epoch millis as a
//! UTC Datetime). Filtered events whose timestamp or user id fails to parse
//! are malformed: dropped and counted, never a hard failure.

use crate::constants::PAGE_NEXT_SONG;
use crate::error::Result;
use crate::schema::start_time_dtype;
use polars::prelude::*;

/// Valid play events plus drop accounting for the run summary
#[derive(Debug)]
pub struct FilteredPlays {
    /// Events with `page == "NextSong"`, non-null ts and user_id
    pub frame: DataFrame,
    /// Events that passed the page filter before validity checks
    pub scanned: usize,
    /// Scanned events dropped for a null timestamp or user id
    pub malformed: usize,
}

/// Filter raw events down to valid plays
pub fn filter_plays(raw_events: &DataFrame) -> Result<FilteredPlays> {
    let next_song = raw_events
        .clone()
        .lazy()
        .filter(col("page").eq(lit(PAGE_NEXT_SONG)))
        .with_columns([
            // Non-strict casts: unparseable values become null and are
            // counted below instead of failing the run
            col("userId").cast(DataType::Int64).alias("user_id"),
            col("ts").cast(start_time_dtype()).alias("start_time"),
        ])
        .collect()?;

    let scanned = next_song.height();

    let frame = next_song
        .lazy()
        .filter(col("ts").is_not_null().and(col("user_id").is_not_null()))
        .collect()?;

    let malformed = scanned - frame.height();

    Ok(FilteredPlays {
        frame,
        scanned,
        malformed,
    })
}
