//! Declared schemas for the raw JSON sources.
//!
//! JSON carries no fixed schema, so each source is read under an explicit
//! declaration: fields absent from a record surface as nulls, fields whose
//! value cannot be parsed into the declared type are nulled by the reader,
//! and fields outside the declaration are dropped. Missing-field handling is
//! therefore a policy of these declarations, not an accident of inference.

use polars::prelude::{DataType, Field, Schema, TimeUnit};

/// Schema for song catalog records. Artist attributes are denormalized onto
/// each song record and split into the artists dimension downstream.
pub fn song_schema() -> Schema {
    Schema::from_iter([
        Field::new("num_songs".into(), DataType::Int64),
        Field::new("artist_id".into(), DataType::String),
        Field::new("artist_latitude".into(), DataType::Float64),
        Field::new("artist_longitude".into(), DataType::Float64),
        Field::new("artist_location".into(), DataType::String),
        Field::new("artist_name".into(), DataType::String),
        Field::new("song_id".into(), DataType::String),
        Field::new("title".into(), DataType::String),
        Field::new("duration".into(), DataType::Float64),
        Field::new("year".into(), DataType::Int32),
    ])
}

/// Schema for app interaction log events. `ts` is epoch milliseconds;
/// `userId` arrives as a string (sometimes empty) and is coerced to Int64 by
/// the transform layer.
pub fn log_schema() -> Schema {
    Schema::from_iter([
        Field::new("artist".into(), DataType::String),
        Field::new("auth".into(), DataType::String),
        Field::new("firstName".into(), DataType::String),
        Field::new("gender".into(), DataType::String),
        Field::new("itemInSession".into(), DataType::Int64),
        Field::new("lastName".into(), DataType::String),
        Field::new("length".into(), DataType::Float64),
        Field::new("level".into(), DataType::String),
        Field::new("location".into(), DataType::String),
        Field::new("method".into(), DataType::String),
        Field::new("page".into(), DataType::String),
        Field::new("registration".into(), DataType::Float64),
        Field::new("sessionId".into(), DataType::Int64),
        Field::new("song".into(), DataType::String),
        Field::new("status".into(), DataType::Int64),
        Field::new("ts".into(), DataType::Int64),
        Field::new("userAgent".into(), DataType::String),
        Field::new("userId".into(), DataType::String),
    ])
}

/// Datetime type used for `start_time` throughout. Naive (no zone) with the
/// epoch interpreted as UTC, so decomposition never varies by host locale.
pub fn start_time_dtype() -> DataType {
    DataType::Datetime(TimeUnit::Milliseconds, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn song_schema_declares_all_catalog_fields() {
        let schema = song_schema();
        assert_eq!(schema.len(), 10);
        assert_eq!(schema.get("song_id"), Some(&DataType::String));
        assert_eq!(schema.get("duration"), Some(&DataType::Float64));
        assert_eq!(schema.get("year"), Some(&DataType::Int32));
    }

    #[test]
    fn log_schema_declares_all_event_fields() {
        let schema = log_schema();
        assert_eq!(schema.len(), 18);
        assert_eq!(schema.get("ts"), Some(&DataType::Int64));
        assert_eq!(schema.get("userId"), Some(&DataType::String));
        assert_eq!(schema.get("length"), Some(&DataType::Float64));
    }
}
