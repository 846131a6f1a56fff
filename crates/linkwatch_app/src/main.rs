mod platform;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use linkwatch_engine::FileSettingsStore;

use platform::logging::{self, LogDestination};
use platform::{RunOptions, SettingsForm};

#[derive(Parser)]
#[command(name = "linkwatch")]
#[command(about = "Watch a chat channel for matching links", long_about = None)]
#[command(version)]
struct Cli {
    /// Settings file (JSON, browser storage keys)
    #[arg(long, global = true, default_value = "linkwatch.json")]
    settings: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Monitor a page replayed from a JSON-lines feed
    Run {
        /// Initial page location (defaults to the configured channel)
        #[arg(long)]
        location: Option<String>,

        /// Feed file (defaults to stdin)
        #[arg(long)]
        feed: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = LogDestination::Both)]
        log: LogDestination,
    },

    /// Validate and store monitoring settings
    Configure(SettingsForm),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            location,
            feed,
            log,
        } => {
            logging::initialize(log);
            platform::run_app(RunOptions {
                settings: cli.settings,
                location,
                feed,
            })
            .await
        }
        Commands::Configure(form) => {
            let store = FileSettingsStore::new(&cli.settings);
            let settings = platform::configure(&store, &form)?;
            println!(
                "saved {} (pattern `{}`, delay {}ms)",
                store.path().display(),
                settings.regex_filter,
                settings.opening_delay
            );
            Ok(())
        }
    }
}
