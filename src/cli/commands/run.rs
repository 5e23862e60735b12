//! Run command: the complete ETL workflow.

use super::shared::{print_final_report, setup_logging};
use crate::cli::args::RunArgs;
use crate::constants::{LOG_DATA_SUBDIR, SONG_DATA_SUBDIR};
use crate::error::Result;
use crate::extract::FileDiscovery;
use crate::models::{RunSummary, Table};
use crate::pipeline::EtlPipeline;
use chrono::Utc;
use tracing::{debug, info};

/// Execute the run command
pub async fn run_etl(args: RunArgs) -> Result<RunSummary> {
    setup_logging(&args)?;

    info!("Starting playlog processor");
    debug!("Command line arguments: {:?}", args);

    let config = args.to_config()?;
    let tables = args.get_tables();

    if args.dry_run {
        return dry_run(&config, &tables);
    }

    let pipeline = EtlPipeline::new(config)?;
    let summary = pipeline.run(&tables).await?;

    print_final_report(&summary, args.format)?;
    Ok(summary)
}

/// Show what would be processed without reading records or writing output
fn dry_run(config: &crate::config::EtlConfig, tables: &[Table]) -> Result<RunSummary> {
    info!("Performing dry run - no files will be created");

    let need_catalog = tables.iter().any(|t| t.needs_catalog());
    let need_events = tables.iter().any(|t| t.needs_events());

    let catalog_files = if need_catalog {
        FileDiscovery::new(config.input_path.join(SONG_DATA_SUBDIR))
            .discover()?
            .len()
    } else {
        0
    };
    let log_files = if need_events {
        FileDiscovery::new(config.input_path.join(LOG_DATA_SUBDIR))
            .discover()?
            .len()
    } else {
        0
    };

    println!(
        "Dry run: would read {} catalog files and {} event log files",
        catalog_files, log_files
    );
    for table in tables {
        println!(
            "Dry run: would publish {}",
            config.output_path.join(table.name()).display()
        );
    }

    Ok(RunSummary {
        started_at: Utc::now().to_rfc3339(),
        catalog_files,
        log_files,
        events_scanned: 0,
        malformed_dropped: 0,
        tables: Vec::new(),
        output_path: config.output_path.clone(),
        processing_time_ms: 0,
    })
}
