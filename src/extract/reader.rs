//! Concurrent JSON-lines reading under a declared schema.
//!
//! Files are read with bounded concurrency on the blocking thread pool, then
//! re-ordered by discovery index before concatenation: deduplication
//! tie-breaks downstream are defined in terms of a stable input ordering, so
//! the nondeterministic completion order of concurrent reads must never leak
//! into the combined frame.

use crate::constants::MEMORY_PRESSURE_THRESHOLD;
use crate::error::{EtlError, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use sysinfo::System;
use tokio::task;
use tracing::{debug, warn};

/// Reader for one JSON-lines source
#[derive(Debug)]
pub struct JsonSourceReader {
    schema: SchemaRef,
    max_concurrent_files: usize,
}

impl JsonSourceReader {
    pub fn new(schema: Schema, max_concurrent_files: usize) -> Self {
        Self {
            schema: Arc::new(schema),
            max_concurrent_files,
        }
    }

    /// Read every file into a single DataFrame conforming to the declared
    /// schema. Missing fields are null-filled; unparseable values are nulled
    /// rather than failing the read.
    pub async fn read_all(&self, files: &[PathBuf], label: &str) -> Result<DataFrame> {
        let concurrency = self.effective_concurrency(files.len());

        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        pb.set_message(format!("Reading {label}"));

        let indexed = stream::iter(files.iter().cloned().enumerate())
            .map(|(index, path)| {
                let schema = self.schema.clone();
                let pb = pb.clone();
                async move {
                    let result = task::spawn_blocking({
                        let path = path.clone();
                        move || read_json_lines(&path, schema)
                    })
                    .await
                    .map_err(|e| EtlError::ProcessingFailed {
                        path: path.clone(),
                        reason: format!("read task failed: {e}"),
                    })
                    .and_then(|inner| inner);
                    pb.inc(1);
                    (index, result)
                }
            })
            .buffer_unordered(concurrency)
            .collect::<Vec<_>>()
            .await;

        pb.finish_with_message(format!("Read {} {label} files", files.len()));

        // Restore discovery order before concatenation
        let mut indexed = indexed;
        indexed.sort_by_key(|(index, _)| *index);

        let mut frames = Vec::with_capacity(indexed.len());
        for (_, result) in indexed {
            frames.push(result?.lazy());
        }

        let combined = concat(frames, UnionArgs::default())?.collect()?;
        debug!("Combined {} rows from {} {} files", combined.height(), files.len(), label);

        Ok(combined)
    }

    /// Concurrency cap, halved under memory pressure
    fn effective_concurrency(&self, file_count: usize) -> usize {
        let mut limit = self.max_concurrent_files.min(file_count).max(1);
        if memory_pressure() {
            limit = (limit / 2).max(1);
            warn!("Memory pressure detected, reducing read concurrency to {limit}");
        }
        limit
    }
}

/// Check whether system memory usage is above the backoff threshold
fn memory_pressure() -> bool {
    let mut system = System::new();
    system.refresh_memory();

    let total = system.total_memory() as f64;
    if total == 0.0 {
        return false;
    }
    system.used_memory() as f64 / total > MEMORY_PRESSURE_THRESHOLD
}

/// Read a single JSON-lines file under the declared schema
fn read_json_lines(path: &Path, schema: SchemaRef) -> Result<DataFrame> {
    let file = std::fs::File::open(path)?;
    let df = JsonLineReader::new(file)
        .with_schema(schema)
        .with_ignore_errors(true)
        .finish()?;
    Ok(df)
}
