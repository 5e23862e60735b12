//! End-to-end pipeline integration tests.
//!
//! Builds JSON-lines fixtures in a tempdir, runs the full
//! Extract → Transform → Load pipeline, and reads the published Parquet back
//! to verify the star schema's invariants.

use anyhow::Result;
use playlog_processor::config::EtlConfig;
use playlog_processor::error::EtlError;
use playlog_processor::models::Table;
use playlog_processor::pipeline::EtlPipeline;
use polars::prelude::*;
use serde_json::{Value, json};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use walkdir::WalkDir;

fn write_jsonl(path: &Path, records: &[Value]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut body = String::new();
    for record in records {
        body.push_str(&record.to_string());
        body.push('\n');
    }
    fs::write(path, body)?;
    Ok(())
}

/// One-song catalog plus a small event log covering the interesting cases:
/// a matched play, a duration-mismatched play, an out-of-catalog play, a
/// level change for one user, and a non-play page event.
fn write_fixtures(input: &Path) -> Result<()> {
    write_jsonl(
        &input.join("song_data").join("A").join("TRAAA128F.json"),
        &[json!({
            "num_songs": 1,
            "artist_id": "A1",
            "artist_latitude": 53.4,
            "artist_longitude": -2.98,
            "artist_location": "Liverpool",
            "artist_name": "Beatles",
            "song_id": "S1",
            "title": "Let It Be",
            "duration": 240.0,
            "year": 1970
        })],
    )?;

    write_jsonl(
        &input.join("log_data").join("2018").join("11").join("2018-11-05-events.json"),
        &[
            json!({
                "artist": "Beatles", "auth": "Logged In", "firstName": "Lily",
                "gender": "F", "itemInSession": 0, "lastName": "Koch",
                "length": 240.0, "level": "free", "location": "Chicago",
                "method": "PUT", "page": "NextSong", "registration": 1.54e12,
                "sessionId": 100, "song": "Let It Be", "status": 200,
                "ts": 1541440000000i64, "userAgent": "Mozilla", "userId": "7"
            }),
            json!({
                "artist": "Beatles", "auth": "Logged In", "firstName": "Lily",
                "gender": "F", "itemInSession": 1, "lastName": "Koch",
                "length": 99.0, "level": "paid", "location": "Chicago",
                "method": "PUT", "page": "NextSong", "registration": 1.54e12,
                "sessionId": 100, "song": "Let It Be", "status": 200,
                "ts": 1541440060000i64, "userAgent": "Mozilla", "userId": "7"
            }),
        ],
    )?;

    write_jsonl(
        &input.join("log_data").join("2018").join("11").join("2018-11-06-events.json"),
        &[
            json!({
                "artist": null, "auth": "Logged In", "firstName": "Sam",
                "gender": "M", "itemInSession": 0, "lastName": "Hunt",
                "length": null, "level": "free", "location": "Boston",
                "method": "GET", "page": "Login", "registration": 1.54e12,
                "sessionId": 200, "song": null, "status": 307,
                "ts": 1541500000000i64, "userAgent": "Mozilla", "userId": "12"
            }),
            json!({
                "artist": "Prince", "auth": "Logged In", "firstName": "Maia",
                "gender": "F", "itemInSession": 0, "lastName": "Burke",
                "length": 226.0, "level": "free", "location": "Austin",
                "method": "PUT", "page": "NextSong", "registration": 1.54e12,
                "sessionId": 300, "song": "Kiss", "status": 200,
                "ts": 1541520000000i64, "userAgent": "Safari", "userId": "9"
            }),
        ],
    )?;

    Ok(())
}

fn test_config(root: &Path) -> EtlConfig {
    EtlConfig {
        input_path: root.join("input"),
        output_path: root.join("output"),
        max_concurrent_files: 2,
        ..Default::default()
    }
}

/// Read a published table back by concatenating its parquet files
fn read_table(dir: &Path) -> Result<DataFrame> {
    let mut frames = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if entry.path().extension().is_some_and(|ext| ext == "parquet") {
            let file = fs::File::open(entry.path())?;
            frames.push(ParquetReader::new(file).finish()?.lazy());
        }
    }
    Ok(concat(frames, UnionArgs::default())?.collect()?)
}

#[tokio::test]
async fn full_run_produces_star_schema() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_fixtures(&temp_dir.path().join("input"))?;

    let config = test_config(temp_dir.path());
    let output = config.output_path.clone();
    let summary = EtlPipeline::new(config)?.run(&Table::ALL).await?;

    // Three NextSong events, all valid; the Login event is excluded
    assert_eq!(summary.events_scanned, 3);
    assert_eq!(summary.malformed_dropped, 0);
    assert_eq!(summary.rows(Table::Songs), Some(1));
    assert_eq!(summary.rows(Table::Artists), Some(1));
    assert_eq!(summary.rows(Table::Users), Some(2));
    assert_eq!(summary.rows(Table::Time), Some(3));
    assert_eq!(summary.rows(Table::Songplays), Some(3));

    // Partition layout
    assert!(output.join("songs").join("year=1970").join("artist_id=A1").is_dir());
    assert!(output.join("songplays").join("year=2018").join("month=11").is_dir());
    assert!(output.join("time").join("year=2018").join("month=11").is_dir());
    assert!(output.join("artists").join("artists.parquet").is_file());
    assert!(output.join("users").join("users.parquet").is_file());

    // Songs dimension carries the catalog row
    let songs = read_table(&output.join("songs"))?;
    assert_eq!(songs.height(), 1);
    assert_eq!(
        songs.column("song_id")?.str()?.get(0),
        Some("S1")
    );

    // Matched play resolves catalog refs; mismatched duration and unknown
    // song keep their rows with null refs
    let songplays = read_table(&output.join("songplays"))?;
    assert_eq!(songplays.height(), 3);
    assert_eq!(songplays.column("song_id")?.null_count(), 2);
    assert_eq!(songplays.column("artist_id")?.null_count(), 2);
    assert_eq!(songplays.column("start_time")?.null_count(), 0);
    assert_eq!(songplays.column("user_id")?.null_count(), 0);

    let matched: Vec<&str> = songplays
        .column("song_id")?
        .str()?
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(matched, vec!["S1"]);

    // Level change: the later (paid) event wins for user 7; user 12 only
    // appeared on a Login page and must be absent
    let users = read_table(&output.join("users"))?;
    let user_ids = users.column("user_id")?.i64()?;
    let levels = users.column("level")?.str()?;
    let mut seen = HashSet::new();
    for i in 0..users.height() {
        let id = user_ids.get(i).unwrap();
        seen.insert(id);
        if id == 7 {
            assert_eq!(levels.get(i), Some("paid"));
        }
    }
    assert_eq!(seen, HashSet::from([7, 9]));

    Ok(())
}

#[tokio::test]
async fn foreign_keys_resolve_into_dimensions() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_fixtures(&temp_dir.path().join("input"))?;

    let config = test_config(temp_dir.path());
    let output = config.output_path.clone();
    EtlPipeline::new(config)?.run(&Table::ALL).await?;

    let songplays = read_table(&output.join("songplays"))?;
    let time = read_table(&output.join("time"))?;
    let users = read_table(&output.join("users"))?;

    // Every fact start_time exists in the time dimension exactly once
    let time_values: Vec<i64> = time
        .column("start_time")?
        .datetime()?
        .into_iter()
        .flatten()
        .collect();
    let unique_times: HashSet<i64> = time_values.iter().copied().collect();
    assert_eq!(time_values.len(), unique_times.len());

    for value in songplays.column("start_time")?.datetime()?.into_iter() {
        assert!(unique_times.contains(&value.unwrap()));
    }

    // Every fact user_id exists in the users dimension exactly once
    let user_values: Vec<i64> = users.column("user_id")?.i64()?.into_iter().flatten().collect();
    let unique_users: HashSet<i64> = user_values.iter().copied().collect();
    assert_eq!(user_values.len(), unique_users.len());

    for value in songplays.column("user_id")?.i64()?.into_iter() {
        assert!(unique_users.contains(&value.unwrap()));
    }

    // Synthetic fact ids are unique
    let ids = songplays.column("songplay_id")?.as_materialized_series();
    assert_eq!(ids.n_unique()?, songplays.height());

    Ok(())
}

#[tokio::test]
async fn rerun_on_identical_input_is_idempotent() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_fixtures(&temp_dir.path().join("input"))?;

    let config = test_config(temp_dir.path());
    let output = config.output_path.clone();

    let first = EtlPipeline::new(config.clone())?.run(&Table::ALL).await?;
    let second = EtlPipeline::new(config)?.run(&Table::ALL).await?;

    for table in Table::ALL {
        assert_eq!(first.rows(table), second.rows(table), "{table} row count drifted");
    }

    // Re-published artists dimension is identical row-for-row
    let artists = read_table(&output.join("artists"))?;
    assert_eq!(artists.height(), 1);
    assert_eq!(artists.column("name")?.str()?.get(0), Some("Beatles"));

    Ok(())
}

#[tokio::test]
async fn empty_event_source_aborts_before_publishing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("input");
    write_fixtures(&input)?;

    // Replace the event log source with an empty directory
    fs::remove_dir_all(input.join("log_data"))?;
    fs::create_dir_all(input.join("log_data"))?;

    let config = test_config(temp_dir.path());
    let output = config.output_path.clone();
    let result = EtlPipeline::new(config)?.run(&Table::ALL).await;

    assert!(matches!(result, Err(EtlError::EmptyInput { .. })));

    // Nothing may have been published
    assert!(!output.join("songs").exists());
    assert!(!output.join("songplays").exists());

    Ok(())
}

#[tokio::test]
async fn missing_catalog_source_is_reported_distinctly() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("input");
    write_fixtures(&input)?;
    fs::remove_dir_all(input.join("song_data"))?;

    let config = test_config(temp_dir.path());
    let result = EtlPipeline::new(config)?.run(&Table::ALL).await;

    assert!(matches!(result, Err(EtlError::SourceNotFound { .. })));
    Ok(())
}

#[tokio::test]
async fn event_only_subset_ignores_catalog_source() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("input");
    write_fixtures(&input)?;

    // Catalog source gone entirely; users and time must still build
    fs::remove_dir_all(input.join("song_data"))?;

    let config = test_config(temp_dir.path());
    let output = config.output_path.clone();
    let summary = EtlPipeline::new(config)?
        .run(&[Table::Users, Table::Time])
        .await?;

    assert_eq!(summary.rows(Table::Users), Some(2));
    assert_eq!(summary.rows(Table::Time), Some(3));
    assert!(output.join("users").join("users.parquet").is_file());
    assert!(!output.join("songs").exists());

    Ok(())
}
