//! litgraph CLI - navigate and expand literate documents

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use litgraph::config::ExtractorKind;
use litgraph::errors::Result;
use litgraph::interface::Context;
use litgraph::Identifier;

#[derive(Parser)]
#[command(name = "litgraph")]
#[command(author, version, about = "Literate programming reference engine", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    directory: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Block extractor (overrides config file)
    #[arg(short, long, global = true, value_enum)]
    extractor: Option<ExtractorKind>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse every document and report problems
    Check {
        /// Fail when circular references exist
        #[arg(long)]
        deny_cycles: bool,
    },

    /// Print the fully expanded content of an identifier
    Expand {
        identifier: String,
    },

    /// Show where an identifier is first defined
    Definition {
        identifier: String,
    },

    /// List every definition and use of an identifier
    References {
        identifier: String,
    },

    /// List circular references
    Cycles,

    /// List every registered block
    Blocks,

    /// Watch for changes and re-parse automatically
    Watch {
        /// Debounce delay in milliseconds
        #[arg(short, long)]
        debounce: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Determine working directory
    let base_dir = cli
        .directory
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let mut ctx = Context::load(base_dir, cli.config.as_deref())?;

    // Override extractor if specified on command line
    if let Some(kind) = cli.extractor {
        ctx.config.extractor.kind = kind;
        ctx.config.validate()?;
    }

    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Check { deny_cycles } => {
            let options = commands::CheckOptions { deny_cycles };
            commands::check(&ctx, options, &mut out).await
        }

        Commands::Expand { identifier } => {
            commands::expand(&ctx, &Identifier::new(identifier), &mut out).await
        }

        Commands::Definition { identifier } => {
            commands::definition(&ctx, &Identifier::new(identifier), &mut out).await
        }

        Commands::References { identifier } => {
            commands::references(&ctx, &Identifier::new(identifier), &mut out).await
        }

        Commands::Cycles => commands::cycles(&ctx, &mut out).await,

        Commands::Blocks => commands::blocks(&ctx, &mut out).await,

        Commands::Watch { debounce } => {
            let options = commands::WatchOptions {
                debounce_ms: debounce.unwrap_or(ctx.config.watch.debounce_ms),
            };
            commands::watch(&ctx, options).await
        }
    }
}
