use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use interlace::{handle_filter, handle_generate, handle_mixins, GenerateOverrides};

#[derive(Parser)]
#[command(name = "interlace")]
#[command(about = "Generate single-inheritance Java bindings from an interface database", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run filter, rename and generation for every configured target
    Generate {
        /// Interface database (JSON, or YAML by extension)
        #[arg(long)]
        database: PathBuf,

        /// Run configuration (TOML)
        #[arg(short, long, env = "INTERLACE_CONFIG")]
        config: Option<PathBuf>,

        /// Output directory of the first target
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Backends of the first target (interfaces, jso)
        #[arg(short, long = "system")]
        systems: Vec<String>,

        /// Write a JSON report of every target
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Write the filtered and renamed database as JSON
    Filter {
        #[arg(long)]
        database: PathBuf,

        #[arg(short, long, env = "INTERLACE_CONFIG")]
        config: Option<PathBuf>,

        /// Target whose filter and renames apply (defaults to the first)
        #[arg(short, long)]
        target: Option<String>,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print the computed mixin set
    Mixins {
        #[arg(long)]
        database: PathBuf,

        #[arg(short, long, env = "INTERLACE_CONFIG")]
        config: Option<PathBuf>,

        #[arg(short, long)]
        target: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug {
        tracing::Level::TRACE
    } else if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(cli.debug)
        .init();

    match cli.command {
        Commands::Generate {
            database,
            config,
            output,
            systems,
            report,
        } => {
            let overrides = GenerateOverrides { output, systems };
            let reports =
                handle_generate(&database, config.as_deref(), &overrides, report.as_deref())?;
            for report in &reports {
                info!(
                    "{}: {} interfaces, {} callbacks, {} files",
                    report.target,
                    report.interfaces.len(),
                    report.callbacks.len(),
                    report.files.len()
                );
            }
            Ok(())
        }
        Commands::Filter {
            database,
            config,
            target,
            output,
        } => handle_filter(&database, config.as_deref(), target.as_deref(), &output),
        Commands::Mixins {
            database,
            config,
            target,
        } => {
            for id in handle_mixins(&database, config.as_deref(), target.as_deref())? {
                println!("{}", id);
            }
            Ok(())
        }
    }
}
