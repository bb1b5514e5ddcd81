//! landmark CLI: run and inspect palpation assessment sessions.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "landmark",
    version,
    about = "Landmark palpation assessment sessions"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a session from a script file or from stdin
    Run {
        /// Event script: one `reach <landmark>` or `choose <option>` per line
        #[arg(long)]
        script: Option<PathBuf>,

        /// Seed for target selection and option shuffling
        #[arg(long)]
        seed: Option<u64>,

        /// Skip the remote question fetch and use catalog defaults
        #[arg(long)]
        offline: bool,

        /// Output directory for the session report
        #[arg(long, default_value = "./landmark-results")]
        output: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Fetch the remote question bank and list questions per area
    Questions {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate a landmark catalog file
    Validate {
        /// Catalog TOML file (defaults to the embedded reference catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Create a starter config and catalog
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("landmark=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            script,
            seed,
            offline,
            output,
            config,
        } => commands::run::execute(script, seed, offline, output, config).await,
        Commands::Questions { config } => commands::questions::execute(config).await,
        Commands::Validate { catalog } => commands::validate::execute(catalog),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
