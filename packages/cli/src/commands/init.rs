use crate::config::{Config, DEFAULT_CONFIG_NAME, DEFAULT_DOCUMENT_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use layoutpad_common::{Container, Model};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Canvas width for the new document
    #[arg(long, default_value_t = 800.0)]
    pub width: f64,

    /// Canvas height for the new document
    #[arg(long, default_value_t = 1000.0)]
    pub height: f64,

    /// Force overwrite existing config and document
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);
    let document_path = PathBuf::from(cwd).join(DEFAULT_DOCUMENT_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!(
        "{}",
        "📝 Initializing layoutpad project...".bright_blue().bold()
    );

    let container = Container::new(args.width, args.height);
    let config = Config {
        container,
        ..Config::default()
    };

    // Write config file
    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    if !document_path.exists() || args.force {
        Model::new(container).save(&document_path)?;
        println!("  {} Created {}", "✓".green(), DEFAULT_DOCUMENT_NAME);
    }

    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Write a gesture script (see `layoutpad replay --help`)");
    println!("  2. Run: layoutpad replay {} script.json", DEFAULT_DOCUMENT_NAME);
    println!("  3. Run: layoutpad inspect {}", DEFAULT_DOCUMENT_NAME);

    Ok(())
}
