mod output;
mod pipeline;

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "gridintel")]
#[command(about = "Grid investment intelligence: scrape, classify, and enrich energy news")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape every configured source, enrich the records, and write the output files
    Run {
        /// Sources file to use instead of `GRIDINTEL_SOURCES_PATH`
        #[arg(long)]
        sources: Option<PathBuf>,

        /// Output directory to use instead of `GRIDINTEL_OUTPUT_DIR`
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Skip the remote model; every record gets the default analysis
        #[arg(long)]
        skip_enrich: bool,
    },
    /// Load and validate the sources file, then list sources in processing order
    CheckConfig {
        /// Sources file to use instead of `GRIDINTEL_SOURCES_PATH`
        #[arg(long)]
        sources: Option<PathBuf>,
    },
}

/// Installs the global `fmt` subscriber. `RUST_LOG` wins over
/// `GRIDINTEL_LOG_LEVEL`; both fall back to `info`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = std::env::var("GRIDINTEL_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"))
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Run {
            sources,
            output_dir,
            skip_enrich,
        }) => {
            let config = if skip_enrich {
                gridintel_core::load_app_config_without_enrichment()?
            } else {
                gridintel_core::load_app_config()?
            };
            let options = pipeline::RunOptions {
                sources_path: sources.unwrap_or_else(|| config.sources_path.clone()),
                output_dir: output_dir.unwrap_or_else(|| config.output_dir.clone()),
            };
            let report = pipeline::run(&config, &options).await?;
            println!("{report}");
        }
        Some(Commands::CheckConfig { sources }) => {
            let config = gridintel_core::load_app_config_without_enrichment()?;
            let path = sources.unwrap_or(config.sources_path);
            let registry = gridintel_core::load_sources(&path)?;
            println!("{} sources in {}", registry.len(), path.display());
            for source in registry.by_priority() {
                println!(
                    "  [{:<6}] {:<24} {:<16} {}",
                    source.priority.to_string(),
                    source.key,
                    source.category,
                    source.url
                );
            }
        }
        None => {
            Cli::command().print_help()?;
        }
    }

    Ok(())
}
