use clap::{Parser, Subcommand};
use colored::Colorize;
use layoutpad_cli::commands::{init, inspect, replay, InitArgs, InspectArgs, ReplayArgs};
use tracing_subscriber::EnvFilter;

/// Layoutpad CLI - headless canvas layout editing
#[derive(Parser, Debug)]
#[command(name = "layoutpad")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log editor activity (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new layoutpad project
    Init(InitArgs),

    /// Replay a gesture script against a document
    Replay(ReplayArgs),

    /// Print a document's blocks in paint order
    Inspect(InspectArgs),
}

fn main() {
    let cli = Cli::parse();

    // --verbose wins over RUST_LOG
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.display().to_string(),
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Replay(args) => replay(args, &cwd),
        Command::Inspect(args) => inspect(args, &cwd),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
