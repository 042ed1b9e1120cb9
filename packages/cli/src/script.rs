//! Gesture scripts for `layoutpad replay`.
//!
//! A script is a JSON array of steps tagged by `op`:
//!
//! ```json
//! [
//!   { "op": "drop", "component": "button", "left": 50, "top": 50 },
//!   { "op": "settle", "index": 0, "width": 80, "height": 30 },
//!   { "op": "press", "index": 0, "x": 50, "y": 50 },
//!   { "op": "move", "x": 120, "y": 80 },
//!   { "op": "release" },
//!   { "op": "command", "name": "placeTop" },
//!   { "op": "key", "chord": "ctrl+z" }
//! ]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use layoutpad_editor::{EditSession, HandleAxis, KeyChord, KeyInput, PointerInput, ResizeDirection};
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Step {
    /// Drop a palette component
    Drop { component: String, left: f64, top: f64 },

    /// Report the rendered size of a block
    Settle { index: usize, width: f64, height: f64 },

    Click {
        index: usize,
        #[serde(default)]
        shift: bool,
    },

    CanvasClick {
        #[serde(default)]
        shift: bool,
    },

    /// Pointer-down on a block
    Press {
        index: usize,
        x: f64,
        y: f64,
        #[serde(default)]
        shift: bool,
    },

    Move {
        x: f64,
        y: f64,
        #[serde(default)]
        shift: bool,
    },

    Release,

    /// Pointer-down on a resize handle
    ResizePress {
        index: usize,
        x: f64,
        y: f64,
        horizontal: HandleAxis,
        vertical: HandleAxis,
    },

    /// Invoke a registered command without arguments
    Command { name: String },

    /// Edit one block through `updateBlock`
    UpdateBlock {
        index: usize,
        #[serde(default)]
        patch: BlockPatch,
    },

    #[serde(rename_all = "camelCase")]
    Key {
        chord: String,
        #[serde(default)]
        in_text_field: bool,
    },

    Undo,
    Redo,
}

/// Fields to overwrite on a block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockPatch {
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub z_index: Option<i32>,

    #[serde(default)]
    pub props: BTreeMap<String, serde_json::Value>,
}

/// What a replay did
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaySummary {
    pub steps: usize,
    pub blocks: usize,
    pub history: Vec<String>,
    pub undo_levels: usize,
    pub redo_levels: usize,
}

pub fn load_script(path: &Path) -> Result<Vec<Step>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read script {}", path.display()))?;
    let steps = serde_json::from_str(&content)
        .with_context(|| format!("Invalid script {}", path.display()))?;
    Ok(steps)
}

/// Run every step against `session`, stopping at the first failure
#[instrument(skip_all, fields(steps = steps.len()))]
pub fn run_steps(session: &mut EditSession, steps: &[Step]) -> Result<ReplaySummary> {
    for (i, step) in steps.iter().enumerate() {
        apply_step(session, step).with_context(|| format!("Step {} ({:?}) failed", i + 1, step))?;
    }

    let history = session.history();
    let summary = ReplaySummary {
        steps: steps.len(),
        blocks: session.document().block_count(),
        history: history.entries().into_iter().map(str::to_string).collect(),
        undo_levels: history.undo_levels(),
        redo_levels: history.redo_levels(),
    };
    Ok(summary)
}

fn apply_step(session: &mut EditSession, step: &Step) -> Result<()> {
    match step {
        Step::Drop {
            component,
            left,
            top,
        } => {
            session.drop_component(component, *left, *top)?;
        }
        Step::Settle {
            index,
            width,
            height,
        } => session.settle_block(*index, *width, *height)?,
        Step::Click { index, shift } => {
            session.click_block(*index, *shift)?;
        }
        Step::CanvasClick { shift } => session.click_canvas(*shift),
        Step::Press { index, x, y, shift } => {
            session.pointer_down_block(*index, pointer(*x, *y, *shift))?;
        }
        Step::Move { x, y, shift } => {
            session.pointer_move(pointer(*x, *y, *shift));
        }
        Step::Release => {
            session.pointer_up()?;
        }
        Step::ResizePress {
            index,
            x,
            y,
            horizontal,
            vertical,
        } => {
            let direction = ResizeDirection::new(*horizontal, *vertical);
            session.pointer_down_resize(*index, direction, PointerInput::new(*x, *y))?;
        }
        Step::Command { name } => session.run(name)?,
        Step::UpdateBlock { index, patch } => {
            let old_block = session
                .document()
                .blocks()
                .get(*index)
                .cloned()
                .ok_or_else(|| anyhow!("No block at index {}", index))?;

            let mut new_block = old_block.clone();
            if let Some(left) = patch.left {
                new_block.left = left;
            }
            if let Some(top) = patch.top {
                new_block.top = top;
            }
            if let Some(width) = patch.width {
                new_block.width = width;
            }
            if let Some(height) = patch.height {
                new_block.height = height;
            }
            if let Some(z_index) = patch.z_index {
                new_block.z_index = z_index;
            }
            new_block.props.extend(patch.props.clone());

            session.update_block(new_block, old_block)?;
        }
        Step::Key {
            chord,
            in_text_field,
        } => {
            let mut input = KeyInput::new(chord.parse::<KeyChord>()?);
            input.in_text_field = *in_text_field;
            session.handle_key(&input)?;
        }
        Step::Undo => session.undo()?,
        Step::Redo => session.redo()?,
    }
    Ok(())
}

fn pointer(x: f64, y: f64, shift: bool) -> PointerInput {
    let input = PointerInput::new(x, y);
    if shift {
        input.with_shift()
    } else {
        input
    }
}
