use clap::Parser;
use playlog_processor::cli::{args::Args, commands};
use playlog_processor::error::EtlError;
use std::process;

fn main() {
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        tokio::select! {
            result = commands::run(args) => result,
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\nReceived CTRL+C, shutting down gracefully...");
                Err(EtlError::Interrupted {
                    reason: "interrupted by user".to_string(),
                })
            }
        }
    });

    match result {
        Ok(_summary) => {
            // Success - the summary has already been reported by the command
            process::exit(0);
        }
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Playlog Processor - Streaming Log Star-Schema Builder");
    println!("=====================================================");
    println!();
    println!("Transform a song catalog and user listening-event logs in JSON-lines");
    println!("format into a partitioned Parquet star schema for analytics.");
    println!();
    println!("USAGE:");
    println!("    playlog-processor <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    run     Run the ETL and publish the star schema (main command)");
    println!("    help    Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Produce all five tables:");
    println!("    playlog-processor run --input /srv/raw --output /srv/lake");
    println!();
    println!("    # Rebuild only the event-derived tables:");
    println!("    playlog-processor run --tables users,time,songplays");
    println!();
    println!("    # Preview without writing:");
    println!("    playlog-processor run --dry-run");
    println!();
    println!("For detailed help on any command, use:");
    println!("    playlog-processor run --help");
}
