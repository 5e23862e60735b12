//! Time dimension: calendar decomposition of distinct play timestamps.
//!
//! Decomposition is UTC throughout; epoch-to-calendar conversion must never
//! vary by host locale. Weekday is ISO numbered (Monday = 1 .. Sunday = 7).
//! All derived columns are pinned to Int32 so the output schema does not
//! drift with library defaults.

use crate::error::Result;
use polars::prelude::*;

/// Time dimension from valid play events, one row per distinct start_time
pub fn time_table(plays: &DataFrame) -> Result<DataFrame> {
    let df = plays
        .clone()
        .lazy()
        .select([
            col("start_time"),
            col("start_time").dt().hour().cast(DataType::Int32).alias("hour"),
            col("start_time").dt().day().cast(DataType::Int32).alias("day"),
            col("start_time").dt().week().cast(DataType::Int32).alias("week"),
            col("start_time").dt().month().cast(DataType::Int32).alias("month"),
            col("start_time").dt().year().cast(DataType::Int32).alias("year"),
            col("start_time")
                .dt()
                .weekday()
                .cast(DataType::Int32)
                .alias("weekday"),
        ])
        .group_by_stable([col("start_time")])
        .agg([
            col("hour").first(),
            col("day").first(),
            col("week").first(),
            col("month").first(),
            col("year").first(),
            col("weekday").first(),
        ])
        .collect()?;
    Ok(df)
}
