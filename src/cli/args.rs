//! Command-line argument definitions for the playlog processor.
//!
//! Defines the CLI surface using the clap derive API. The only processing
//! choice beyond paths is which table set to (re)produce; everything else is
//! operator tuning (concurrency, compression, drop threshold, reporting).

use crate::config::{CompressionAlgorithm, EtlConfig, ParquetConfig};
use crate::constants::{DEFAULT_MAX_DROP_RATE, default_max_concurrent_files};
use crate::error::Result;
use crate::models::Table;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

/// CLI arguments for the playlog star-schema processor
///
/// Transforms raw music-streaming JSON datasets (song catalog and listening
/// event logs) into a partitioned Parquet star schema for analytics.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "playlog-processor",
    version,
    about = "Transform music-streaming JSON logs into a partitioned Parquet star schema",
    long_about = "Reads a song catalog and user listening-event logs in JSON-lines format, \
                  derives one fact table (songplays) and four dimensions (songs, artists, \
                  users, time), and publishes them as partitioned, compressed Parquet \
                  directories suitable for analytical querying."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Run the ETL and publish the star schema (main command)
    Run(RunArgs),
}

/// Arguments for the run command
#[derive(Debug, Clone, Parser)]
pub struct RunArgs {
    /// Input prefix containing song_data/ and log_data/
    ///
    /// Both sources are JSON-lines files, arbitrarily partitioned into
    /// sub-directories. Defaults to ./data
    #[arg(
        short = 'i',
        long = "input",
        value_name = "PATH",
        help = "Input prefix containing song_data/ and log_data/"
    )]
    pub input_path: Option<PathBuf>,

    /// Output prefix for the published table directories
    ///
    /// Will be created if it doesn't exist. Each table lands as a named
    /// sub-directory (songs/, artists/, users/, time/, songplays/).
    /// Defaults to ./output
    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        help = "Output prefix for the published table directories"
    )]
    pub output_path: Option<PathBuf>,

    /// Tables to (re)produce (comma-separated list)
    ///
    /// If not specified, all five tables are produced.
    #[arg(
        short = 't',
        long = "tables",
        value_name = "LIST",
        help = "Comma-separated list of tables to produce",
        long_help = "Tables to (re)produce as a comma-separated list.\n\
                     Available tables: songs, artists, users, time, songplays\n\n\
                     If not specified, all five tables are produced."
    )]
    pub tables: Option<TableList>,

    /// Abort when malformed drops exceed this fraction of filtered events
    ///
    /// Malformed records (unparseable timestamp or user id) are always
    /// dropped and counted; the run only aborts when the drop rate exceeds
    /// this threshold. 1.0 never aborts.
    #[arg(
        long = "max-drop-rate",
        value_name = "RATE",
        default_value_t = DEFAULT_MAX_DROP_RATE,
        help = "Abort when the malformed-record drop rate exceeds this fraction"
    )]
    pub max_drop_rate: f64,

    /// Cap on concurrently read source files
    #[arg(
        long = "max-concurrent-files",
        value_name = "N",
        help = "Cap on concurrently read source files (default: CPU-based)"
    )]
    pub max_concurrent_files: Option<usize>,

    /// Parquet compression algorithm
    #[arg(
        long = "compression",
        value_enum,
        default_value = "snappy",
        help = "Parquet compression algorithm"
    )]
    pub compression: CompressionAlgorithm,

    /// Target parquet row group size in rows
    #[arg(
        long = "row-group-size",
        value_name = "ROWS",
        help = "Target parquet row group size in rows"
    )]
    pub row_group_size: Option<usize>,

    /// Final report format
    #[arg(
        long = "format",
        value_enum,
        default_value = "text",
        help = "Final report format"
    )]
    pub format: ReportFormat,

    /// Log level (error, warn, info, debug, trace)
    #[arg(
        long = "log-level",
        value_name = "LEVEL",
        default_value = "warn",
        help = "Log level (error, warn, info, debug, trace)"
    )]
    pub log_level: String,

    /// Suppress progress output, log warnings only
    #[arg(short = 'q', long = "quiet", help = "Suppress progress output")]
    pub quiet: bool,

    /// Show what would be processed without creating any output
    #[arg(
        long = "dry-run",
        help = "Show what would be processed without creating output files"
    )]
    pub dry_run: bool,
}

impl RunArgs {
    /// Tables to produce, defaulting to the full set
    pub fn get_tables(&self) -> Vec<Table> {
        match &self.tables {
            Some(list) => list.0.clone(),
            None => Table::ALL.to_vec(),
        }
    }

    /// Effective log level string for the tracing filter
    pub fn get_log_level(&self) -> &str {
        if self.quiet { "warn" } else { &self.log_level }
    }

    /// Build the run configuration from arguments and defaults
    pub fn to_config(&self) -> Result<EtlConfig> {
        let config = EtlConfig {
            input_path: self
                .input_path
                .clone()
                .unwrap_or_else(|| PathBuf::from("data")),
            output_path: self
                .output_path
                .clone()
                .unwrap_or_else(|| PathBuf::from("output")),
            max_concurrent_files: self
                .max_concurrent_files
                .unwrap_or_else(default_max_concurrent_files),
            max_drop_rate: self.max_drop_rate,
            parquet: ParquetConfig {
                compression: self.compression,
                enable_statistics: true,
                row_group_size: self.row_group_size,
            },
        };
        config.validate()?;
        Ok(config)
    }
}

/// Final report output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable summary
    Text,
    /// Machine-readable JSON summary
    Json,
}

/// Comma-separated table list, order-preserving and deduplicated
#[derive(Debug, Clone)]
pub struct TableList(pub Vec<Table>);

impl FromStr for TableList {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut tables = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let table: Table = part.parse()?;
            if !tables.contains(&table) {
                tables.push(table);
            }
        }
        if tables.is_empty() {
            return Err("no tables specified".to_string());
        }
        Ok(TableList(tables))
    }
}
