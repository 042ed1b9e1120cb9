use crate::config::Config;
use crate::script::{load_script, run_steps, ReplaySummary};
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use layoutpad_common::Model;
use std::path::PathBuf;
use tracing::instrument;

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Document to edit
    pub document: PathBuf,

    /// JSON array of gesture steps
    pub script: PathBuf,

    /// Write the resulting document here instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[instrument(skip_all, fields(document = %args.document.display()))]
pub fn replay(args: ReplayArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let document_path = PathBuf::from(cwd).join(&args.document);
    let script_path = PathBuf::from(cwd).join(&args.script);

    let model = Model::load(&document_path)
        .with_context(|| format!("Cannot load document {}", document_path.display()))?;
    let steps = load_script(&script_path)?;

    let mut session = config.session(model)?;
    let summary = run_steps(&mut session, &steps)?;
    print_summary(&summary);

    let result = session.model();
    match args.out {
        Some(out) => {
            let out_path = PathBuf::from(cwd).join(out);
            result.save(&out_path)?;
            eprintln!("  {} Wrote {}", "✓".green(), out_path.display());
        }
        None => println!("{}", result.to_json()?),
    }

    Ok(())
}

/// Summary goes to stderr so stdout stays a clean document
fn print_summary(summary: &ReplaySummary) {
    eprintln!(
        "{} {} steps, {} blocks",
        "▶".bright_blue().bold(),
        summary.steps,
        summary.blocks
    );
    eprintln!(
        "  History: [{}] (undo {}, redo {})",
        summary.history.join(", "),
        summary.undo_levels,
        summary.redo_levels
    );
}
