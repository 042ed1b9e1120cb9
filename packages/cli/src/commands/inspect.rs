use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use layoutpad_common::{Block, Model};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Document to inspect
    pub document: PathBuf,
}

pub fn inspect(args: InspectArgs, cwd: &str) -> Result<()> {
    let path = PathBuf::from(cwd).join(&args.document);
    let model =
        Model::load(&path).with_context(|| format!("Cannot load document {}", path.display()))?;

    println!("{}", format!("📄 {}", args.document.display()).bright_blue().bold());
    println!(
        "  Container: {} × {}",
        model.container.width, model.container.height
    );
    println!("  Blocks:    {}", model.blocks.len());

    if model.blocks.is_empty() {
        return Ok(());
    }

    println!();
    for line in render_table(&model) {
        println!("{}", line);
    }
    Ok(())
}

/// Block table in paint order, header first
pub fn render_table(model: &Model) -> Vec<String> {
    let header = format!(
        "{:>3}  {:<12} {:>8} {:>8} {:>8} {:>8} {:>4}  {}",
        "#", "component", "left", "top", "width", "height", "z", "focus"
    );

    let mut lines = vec![header.bold().to_string()];
    lines.extend(
        model
            .paint_order()
            .into_iter()
            .map(|index| render_row(index, &model.blocks[index])),
    );
    lines
}

fn render_row(index: usize, block: &Block) -> String {
    let focus = if block.focus {
        "●".green().to_string()
    } else {
        "·".dimmed().to_string()
    };
    format!(
        "{:>3}  {:<12} {:>8.1} {:>8.1} {:>8.1} {:>8.1} {:>4}  {}",
        index,
        block.component_key,
        block.left,
        block.top,
        block.width,
        block.height,
        block.z_index,
        focus
    )
}
