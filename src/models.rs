//! Core data structures for star-schema processing.
//!
//! Defines the derived table set, per-table partition policy, and the run
//! summary surfaced to operators.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// The five derived tables of the star schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Songs,
    Artists,
    Users,
    Time,
    Songplays,
}

impl Table {
    /// All tables, in load order
    pub const ALL: [Table; 5] = [
        Table::Songs,
        Table::Artists,
        Table::Users,
        Table::Time,
        Table::Songplays,
    ];

    /// Output sub-directory name for this table
    pub fn name(&self) -> &'static str {
        match self {
            Table::Songs => "songs",
            Table::Artists => "artists",
            Table::Users => "users",
            Table::Time => "time",
            Table::Songplays => "songplays",
        }
    }

    /// Hive partition columns for this table. Empty means a single unsplit
    /// directory; artists and users are small and fully scanned.
    pub fn partition_columns(&self) -> &'static [&'static str] {
        match self {
            Table::Songs => &["year", "artist_id"],
            Table::Time => &["year", "month"],
            Table::Songplays => &["year", "month"],
            Table::Artists | Table::Users => &[],
        }
    }

    /// Whether deriving this table requires the song catalog source
    pub fn needs_catalog(&self) -> bool {
        matches!(self, Table::Songs | Table::Artists | Table::Songplays)
    }

    /// Whether deriving this table requires the event log source
    pub fn needs_events(&self) -> bool {
        matches!(self, Table::Users | Table::Time | Table::Songplays)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Table {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "songs" => Ok(Table::Songs),
            "artists" => Ok(Table::Artists),
            "users" => Ok(Table::Users),
            "time" => Ok(Table::Time),
            "songplays" => Ok(Table::Songplays),
            other => Err(format!(
                "unknown table '{}' (expected one of: songs, artists, users, time, songplays)",
                other
            )),
        }
    }
}

/// Row count and partitioning report for one written table
#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    pub table: Table,
    pub rows: usize,
    pub partitioned_by: Vec<String>,
}

/// Summary of a completed run, surfaced as text or JSON
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// UTC timestamp the run started
    pub started_at: String,
    /// Song catalog files read
    pub catalog_files: usize,
    /// Event log files read
    pub log_files: usize,
    /// Events that passed the NextSong page filter
    pub events_scanned: usize,
    /// Filtered events dropped as malformed (null timestamp or user id)
    pub malformed_dropped: usize,
    /// Per-table written row counts
    pub tables: Vec<TableReport>,
    /// Root the tables were published under
    pub output_path: PathBuf,
    /// Wall-clock processing time in milliseconds
    pub processing_time_ms: u128,
}

impl RunSummary {
    /// Row count for a table in this summary, if it was produced
    pub fn rows(&self, table: Table) -> Option<usize> {
        self.tables.iter().find(|r| r.table == table).map(|r| r.rows)
    }
}
