//! Application constants for the playlog processor.

// =============================================================================
// Source Layout
// =============================================================================

/// Sub-directory of the input prefix holding the song catalog files
pub const SONG_DATA_SUBDIR: &str = "song_data";

/// Sub-directory of the input prefix holding the event log files
pub const LOG_DATA_SUBDIR: &str = "log_data";

/// File extension for raw source files (JSON-lines, one record per line)
pub const SOURCE_FILE_EXTENSION: &str = "json";

// =============================================================================
// Event Semantics
// =============================================================================

/// The `page` value that marks an event as an actual song play. All other
/// pages (Login, Home, ...) are excluded from every derived table.
pub const PAGE_NEXT_SONG: &str = "NextSong";

// =============================================================================
// Processing Defaults
// =============================================================================

/// Default cap on concurrently read source files
pub fn default_max_concurrent_files() -> usize {
    num_cpus::get().clamp(2, 8)
}

/// Default malformed-record drop-rate threshold (1.0 = never abort)
pub const DEFAULT_MAX_DROP_RATE: f64 = 1.0;

/// Memory usage fraction above which read concurrency is halved
pub const MEMORY_PRESSURE_THRESHOLD: f64 = 0.8;

/// Partition file name prefix within each partition directory
pub const PARTITION_FILE_PREFIX: &str = "part";

/// Directory value used for rows whose partition key is null
pub const NULL_PARTITION_VALUE: &str = "__null__";
