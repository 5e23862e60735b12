//! Configuration for a processing run.
//!
//! Configuration is an explicit value threaded into the Extractor, Loader,
//! and pipeline at call time, never ambient global state, so the transform
//! layer stays side-effect free. Credentials are resolved by the invocation
//! layer; this core only ever sees path prefixes.

use crate::constants::{DEFAULT_MAX_DROP_RATE, default_max_concurrent_files};
use crate::error::{EtlError, Result};
use polars::prelude::ParquetCompression;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration for one ETL run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtlConfig {
    /// Input prefix containing `song_data/` and `log_data/`
    pub input_path: PathBuf,

    /// Output prefix the five table directories are published under
    pub output_path: PathBuf,

    /// Cap on concurrently read source files
    pub max_concurrent_files: usize,

    /// Abort the run when malformed drops exceed this fraction of filtered
    /// events. 1.0 disables the abort; the drop count is always reported.
    pub max_drop_rate: f64,

    /// Parquet writer settings
    pub parquet: ParquetConfig,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("data"),
            output_path: PathBuf::from("output"),
            max_concurrent_files: default_max_concurrent_files(),
            max_drop_rate: DEFAULT_MAX_DROP_RATE,
            parquet: ParquetConfig::default(),
        }
    }
}

impl EtlConfig {
    /// Validate ranges that clap cannot express
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.max_drop_rate) {
            return Err(EtlError::Configuration {
                message: format!(
                    "max_drop_rate must be within [0.0, 1.0], got {}",
                    self.max_drop_rate
                ),
            });
        }
        if self.max_concurrent_files == 0 {
            return Err(EtlError::Configuration {
                message: "max_concurrent_files must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Parquet-specific writer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParquetConfig {
    /// Compression algorithm selection
    pub compression: CompressionAlgorithm,

    /// Enable column statistics for query pruning
    pub enable_statistics: bool,

    /// Target row group size (None lets the writer decide)
    pub row_group_size: Option<usize>,
}

impl Default for ParquetConfig {
    fn default() -> Self {
        Self {
            compression: CompressionAlgorithm::Snappy,
            enable_statistics: true,
            row_group_size: None,
        }
    }
}

/// Supported compression algorithms for parquet files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CompressionAlgorithm {
    /// Snappy compression - good balance of speed and compression
    Snappy,
    /// ZSTD compression - better compression ratio, slower
    Zstd,
    /// LZ4 compression - fastest, lower compression ratio
    Lz4,
    /// No compression
    Uncompressed,
}

impl CompressionAlgorithm {
    /// Convert to polars ParquetCompression type
    pub fn to_polars_compression(&self) -> ParquetCompression {
        match self {
            CompressionAlgorithm::Snappy => ParquetCompression::Snappy,
            CompressionAlgorithm::Zstd => ParquetCompression::Zstd(None),
            CompressionAlgorithm::Lz4 => ParquetCompression::Lz4Raw,
            CompressionAlgorithm::Uncompressed => ParquetCompression::Uncompressed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EtlConfig::default().validate().is_ok());
    }

    #[test]
    fn drop_rate_outside_unit_interval_is_rejected() {
        let config = EtlConfig {
            max_drop_rate: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EtlError::Configuration { .. })
        ));
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let config = EtlConfig {
            max_concurrent_files: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn compression_maps_to_polars() {
        assert!(matches!(
            CompressionAlgorithm::Snappy.to_polars_compression(),
            ParquetCompression::Snappy
        ));
        assert!(matches!(
            CompressionAlgorithm::Zstd.to_polars_compression(),
            ParquetCompression::Zstd(None)
        ));
    }
}
