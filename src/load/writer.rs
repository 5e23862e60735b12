//! Partitioned Parquet writing for one derived table.
//!
//! Partitioned tables are split by their policy columns and land as one
//! file per partition under Hive-style paths (`year=2018/month=11/...`),
//! so calendar- and artist-scoped scans prune at the directory level.
//! Unpartitioned tables land as a single file in the table directory.

use crate::config::ParquetConfig;
use crate::constants::{NULL_PARTITION_VALUE, PARTITION_FILE_PREFIX};
use crate::error::Result;
use crate::models::Table;
use polars::prelude::*;
use std::path::Path;
use tracing::debug;

/// Parquet writer applying the per-table partition policy
#[derive(Debug)]
pub struct TableWriter {
    parquet: ParquetConfig,
}

impl TableWriter {
    pub fn new(parquet: ParquetConfig) -> Self {
        Self { parquet }
    }

    /// Write one table under `table_dir`, returning the row count written
    pub fn write_table(&self, df: &DataFrame, table: Table, table_dir: &Path) -> Result<usize> {
        std::fs::create_dir_all(table_dir)?;

        let partition_cols = table.partition_columns();
        if partition_cols.is_empty() {
            let path = table_dir.join(format!("{}.parquet", table.name()));
            self.write_parquet_file(df.clone(), &path)?;
            debug!("Wrote {} rows to {}", df.height(), path.display());
            return Ok(df.height());
        }

        let cols: Vec<String> = partition_cols.iter().map(|c| c.to_string()).collect();
        let parts = df.partition_by_stable(cols, true)?;
        for (index, part) in parts.into_iter().enumerate() {
            let mut dir = table_dir.to_path_buf();
            for col_name in partition_cols {
                dir.push(partition_segment(&part, col_name)?);
            }
            std::fs::create_dir_all(&dir)?;

            let path = dir.join(format!("{}-{:05}.parquet", PARTITION_FILE_PREFIX, index));
            self.write_parquet_file(part, &path)?;
        }

        debug!(
            "Wrote {} rows to {} partitioned by {:?}",
            df.height(),
            table_dir.display(),
            partition_cols
        );
        Ok(df.height())
    }

    fn write_parquet_file(&self, mut df: DataFrame, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let mut writer = ParquetWriter::new(file)
            .with_compression(self.parquet.compression.to_polars_compression())
            .with_statistics(if self.parquet.enable_statistics {
                StatisticsOptions::full()
            } else {
                StatisticsOptions::empty()
            });
        if let Some(row_group_size) = self.parquet.row_group_size {
            writer = writer.with_row_group_size(Some(row_group_size));
        }
        writer.finish(&mut df)?;
        Ok(())
    }
}

/// Render one `column=value` path segment from a partition's key value
fn partition_segment(part: &DataFrame, col_name: &str) -> Result<String> {
    let value = part.column(col_name)?.get(0)?;
    let rendered = match value {
        AnyValue::Null => NULL_PARTITION_VALUE.to_string(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    };
    Ok(format!("{col_name}={rendered}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_time_table() -> DataFrame {
        df!(
            "start_time" => [1541440000000i64, 1543440000000],
            "hour" => [17i32, 20],
            "day" => [5i32, 28],
            "week" => [45i32, 48],
            "month" => [11i32, 11],
            "year" => [2018i32, 2018],
            "weekday" => [1i32, 3],
        )
        .unwrap()
    }

    #[test]
    fn partitioned_table_lands_in_hive_layout() {
        let temp_dir = TempDir::new().unwrap();
        let writer = TableWriter::new(ParquetConfig::default());

        let rows = writer
            .write_table(&sample_time_table(), Table::Time, temp_dir.path())
            .unwrap();

        assert_eq!(rows, 2);
        let partition = temp_dir.path().join("year=2018").join("month=11");
        assert!(partition.is_dir());

        let files: Vec<_> = std::fs::read_dir(&partition)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert!(files.iter().any(|f| f.ends_with(".parquet")));
    }

    #[test]
    fn unpartitioned_table_is_single_file() {
        let temp_dir = TempDir::new().unwrap();
        let writer = TableWriter::new(ParquetConfig::default());

        let users = df!(
            "user_id" => [7i64, 9],
            "first_name" => ["Lily", "Maia"],
            "last_name" => ["Koch", "Burke"],
            "gender" => ["F", "F"],
            "level" => ["paid", "free"],
        )
        .unwrap();

        let rows = writer
            .write_table(&users, Table::Users, temp_dir.path())
            .unwrap();

        assert_eq!(rows, 2);
        assert!(temp_dir.path().join("users.parquet").is_file());
    }

    #[test]
    fn written_partition_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let writer = TableWriter::new(ParquetConfig::default());
        writer
            .write_table(&sample_time_table(), Table::Time, temp_dir.path())
            .unwrap();

        let path = temp_dir
            .path()
            .join("year=2018")
            .join("month=11")
            .join(format!("{}-00000.parquet", PARTITION_FILE_PREFIX));
        let file = std::fs::File::open(path).unwrap();
        let df = ParquetReader::new(file).finish().unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.column("year").unwrap().i32().unwrap().get(0), Some(2018));
    }

    #[test]
    fn string_partition_values_render_bare() {
        let part = df!("artist_id" => ["AR123"], "x" => [1i64]).unwrap();
        assert_eq!(
            partition_segment(&part, "artist_id").unwrap(),
            "artist_id=AR123"
        );
    }

    #[test]
    fn null_partition_values_get_placeholder() {
        let part = df!("year" => [None::<i32>], "x" => [1i64]).unwrap();
        assert_eq!(
            partition_segment(&part, "year").unwrap(),
            format!("year={NULL_PARTITION_VALUE}")
        );
    }
}
