// jsglue-cli: CLI entry point for jsglue (JS library glue generation).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "jsglue", about = "jsglue: Emscripten JS library glue generator")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the .jslib glue file from the signature catalog.
    Generate {
        /// Path to jsglue.config.toml.
        #[arg(long, default_value = "jsglue.config.toml")]
        config: PathBuf,
        /// Validate and generate without writing the output file.
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    match cli.command {
        Commands::Generate { config, dry_run } => {
            log::debug!("config: {}, dry run: {dry_run}", config.display());
            let report = jsglue_codegen::run_generate(&config, dry_run)
                .with_context(|| format!("generation failed for {}", config.display()))?;
            if report.written {
                println!(
                    "jsglue: wrote {} glue functions to {} ({} bytes)",
                    report.functions,
                    report.output.display(),
                    report.bytes
                );
            } else {
                println!(
                    "jsglue: {} glue functions OK ({} bytes, not written)",
                    report.functions, report.bytes
                );
            }
        }
    }

    Ok(())
}
