//! Shared components for CLI commands: logging setup and final reporting.

use crate::cli::args::{ReportFormat, RunArgs};
use crate::error::{EtlError, Result};
use crate::models::RunSummary;
use colored::*;
use indicatif::HumanDuration;
use std::time::Duration;
use tracing::debug;

/// Set up structured logging on stderr
pub fn setup_logging(args: &RunArgs) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("playlog_processor={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Print the final run report in the requested format
pub fn print_final_report(summary: &RunSummary, format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::Json => {
            let rendered =
                serde_json::to_string_pretty(summary).map_err(|e| EtlError::Configuration {
                    message: format!("failed to render JSON report: {e}"),
                })?;
            println!("{rendered}");
        }
        ReportFormat::Text => {
            println!("\n{}", "Run Summary".bright_green().bold());
            println!(
                "  {} {}",
                "Time elapsed:".bright_cyan(),
                HumanDuration(Duration::from_millis(summary.processing_time_ms as u64))
            );
            println!(
                "  {} {} catalog, {} event log",
                "Files read:".bright_cyan(),
                summary.catalog_files,
                summary.log_files
            );
            println!(
                "  {} {}",
                "Events scanned:".bright_cyan(),
                summary.events_scanned
            );
            if summary.malformed_dropped > 0 {
                println!(
                    "  {} {}",
                    "Malformed dropped:".bright_red(),
                    summary.malformed_dropped.to_string().bright_red().bold()
                );
            } else {
                println!("  {} 0", "Malformed dropped:".bright_cyan());
            }
            for report in &summary.tables {
                let partitioning = if report.partitioned_by.is_empty() {
                    "unpartitioned".to_string()
                } else {
                    format!("by {}", report.partitioned_by.join(", "))
                };
                println!(
                    "  {} {} rows ({})",
                    format!("{}:", report.table).bright_cyan(),
                    report.rows.to_string().bright_white().bold(),
                    partitioning
                );
            }
            println!(
                "  {} {}",
                "Published to:".bright_cyan(),
                summary.output_path.display()
            );
        }
    }
    Ok(())
}
