mod cmd;
mod config_path;
mod output;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, schedule::ScheduleSubcommand};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "fpkit",
    about = "Closure and pure-function demos: a delay queue runner and an expense report",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file (default: nearest fpkit.yaml walking up from the cwd)
    #[arg(long, global = true, env = "FPKIT_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Queue delayed actions and run them in order
    Schedule {
        #[command(subcommand)]
        subcommand: ScheduleSubcommand,
    },

    /// Print the expense summary and next month's projection
    Report {
        /// Projection multiplier (default from config, 1.10)
        #[arg(long)]
        factor: Option<f64>,

        /// Show categories as a table with current and projected columns
        #[arg(long)]
        table: bool,
    },

    /// Show, validate or create the config file
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    // WARN unless RUST_LOG says otherwise.
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let explicit = cli.config.as_deref();

    let result = match cli.command {
        Commands::Schedule { subcommand } => cmd::schedule::run(explicit, subcommand, cli.json),
        Commands::Report { factor, table } => cmd::report::run(explicit, factor, table, cli.json),
        Commands::Config { subcommand } => cmd::config::run(explicit, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
