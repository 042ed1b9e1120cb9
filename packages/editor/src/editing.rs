//! # Editing Commands
//!
//! Block-editing commands built on the [`CommandRegistry`].
//!
//! Every history-entering command captures a deep copy of the block list
//! when it executes (`before`) and computes the list it wants (`after`).
//! `redo` writes a fresh copy of `after` into the document, `undo` a fresh
//! copy of `before`. Whole-list replacement keeps undo exact even when a
//! command changes the number of blocks.
//!
//! ## Commands
//!
//! | Name          | Args                     | Effect                                   |
//! |---------------|--------------------------|------------------------------------------|
//! | `delete`      | none                     | Remove focused blocks                    |
//! | `clear`       | none                     | Remove every block                       |
//! | `placeTop`    | none                     | Raise focused blocks above the rest      |
//! | `placeBottom` | none                     | Lower focused blocks below the rest      |
//! | `updateBlock` | `EditArgs::UpdateBlock`  | Replace one block by value               |
//! | `updateModel` | `EditArgs::UpdateModel`  | Replace the whole document               |
//! | `selectAll`   | none                     | Focus every block (not recorded)         |
//! | `drag`        | none                     | Commit a drag started by `DragSignals`   |

use std::cell::RefCell;
use std::rc::Rc;

use layoutpad_common::{Block, Model};
use tracing::warn;

use crate::document::DocumentHandle;
use crate::events::DragSignals;
use crate::history::CommandExecute;
use crate::keyboard::KeyChord;
use crate::registry::{CommandRegistry, CommandSpec, Teardown};
use crate::selection::{self, FocusPartition};
use crate::CommandError;

pub const DELETE: &str = "delete";
pub const CLEAR: &str = "clear";
pub const PLACE_TOP: &str = "placeTop";
pub const PLACE_BOTTOM: &str = "placeBottom";
pub const UPDATE_BLOCK: &str = "updateBlock";
pub const UPDATE_MODEL: &str = "updateModel";
pub const SELECT_ALL: &str = "selectAll";
pub const DRAG: &str = "drag";

/// Arguments accepted by the editing commands
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EditArgs {
    #[default]
    None,

    /// Replace `old_block` (matched by value) with `new_block`
    UpdateBlock { new_block: Block, old_block: Block },

    UpdateModel(Model),
}

/// `redo`/`undo` pair that swaps the block list between two snapshots
fn replace_blocks(doc: &DocumentHandle, before: Vec<Block>, after: Vec<Block>) -> CommandExecute {
    let (redo_doc, undo_doc) = (doc.clone(), doc.clone());
    CommandExecute::new(move || redo_doc.update_blocks(after.clone()))
        .with_undo(move || undo_doc.update_blocks(before.clone()))
}

pub fn delete_command(doc: DocumentHandle) -> CommandSpec<EditArgs> {
    CommandSpec::new(DELETE, move |_| {
        let before = doc.blocks();
        let after = FocusPartition::of(&before).unfocused_blocks(&before);
        Ok(replace_blocks(&doc, before, after))
    })
    .bind(KeyChord::new("backspace"))
    .bind(KeyChord::new("delete"))
    .bind(KeyChord::new("d").ctrl())
}

pub fn clear_command(doc: DocumentHandle) -> CommandSpec<EditArgs> {
    CommandSpec::new(CLEAR, move |_| {
        let before = doc.blocks();
        Ok(replace_blocks(&doc, before, Vec::new()))
    })
}

/// Focused blocks take `max(unfocused z) + 1`. Without unfocused blocks
/// nothing changes.
pub fn place_top_command(doc: DocumentHandle) -> CommandSpec<EditArgs> {
    CommandSpec::new(PLACE_TOP, move |_| {
        let before = doc.blocks();
        let partition = FocusPartition::of(&before);
        let mut after = before.clone();

        let max = partition.unfocused.iter().map(|&i| before[i].z_index).max();
        if let Some(max) = max {
            for &i in &partition.focused {
                after[i].z_index = max.saturating_add(1);
            }
        }
        Ok(replace_blocks(&doc, before, after))
    })
    .bind(KeyChord::new("up").ctrl())
}

/// Focused blocks take `min(unfocused z) - 1`.
///
/// When that would be negative the unfocused blocks are shifted up by the
/// deficit and the focused blocks land on 0, so no z-index goes below zero.
pub fn place_bottom_command(doc: DocumentHandle) -> CommandSpec<EditArgs> {
    CommandSpec::new(PLACE_BOTTOM, move |_| {
        let before = doc.blocks();
        let partition = FocusPartition::of(&before);
        let mut after = before.clone();

        let min = partition.unfocused.iter().map(|&i| before[i].z_index).min();
        let target = match min {
            Some(min) if min < 1 => {
                let deficit = 1 - i64::from(min);
                for &i in &partition.unfocused {
                    after[i].z_index = shift_z_index(after[i].z_index, deficit);
                }
                0
            }
            Some(min) => min - 1,
            None => 0,
        };
        for &i in &partition.focused {
            after[i].z_index = target;
        }
        Ok(replace_blocks(&doc, before, after))
    })
    .bind(KeyChord::new("down").ctrl())
}

/// `z + by`, kept within `0..=i32::MAX`
fn shift_z_index(z: i32, by: i64) -> i32 {
    (i64::from(z) + by).clamp(0, i64::from(i32::MAX)) as i32
}

/// Replace the first block equal to `old_block`. A stale reference leaves
/// the document unchanged but still records an entry.
pub fn update_block_command(doc: DocumentHandle) -> CommandSpec<EditArgs> {
    CommandSpec::new(UPDATE_BLOCK, move |args| {
        let EditArgs::UpdateBlock {
            new_block,
            old_block,
        } = args
        else {
            return Err(CommandError::failed(UPDATE_BLOCK, "expected a block update"));
        };

        let before = doc.blocks();
        let mut after = before.clone();
        match before.iter().position(|block| *block == old_block) {
            Some(index) => after[index] = new_block,
            None => warn!(
                command = UPDATE_BLOCK,
                component = %old_block.component_key,
                "block not found, document unchanged"
            ),
        }
        Ok(replace_blocks(&doc, before, after))
    })
}

pub fn update_model_command(doc: DocumentHandle) -> CommandSpec<EditArgs> {
    CommandSpec::new(UPDATE_MODEL, move |args| {
        let EditArgs::UpdateModel(after) = args else {
            return Err(CommandError::failed(UPDATE_MODEL, "expected a model"));
        };

        let before = doc.snapshot();
        let (redo_doc, undo_doc) = (doc.clone(), doc.clone());
        Ok(CommandExecute::new(move || redo_doc.replace_model(after.clone()))
            .with_undo(move || undo_doc.replace_model(before.clone())))
    })
}

pub fn select_all_command(doc: DocumentHandle) -> CommandSpec<EditArgs> {
    CommandSpec::new(SELECT_ALL, move |_| {
        let doc = doc.clone();
        Ok(CommandExecute::new(move || {
            doc.update(|model| selection::select_all(&mut model.blocks))
        }))
    })
    .follow_queue(false)
    .bind(KeyChord::new("a").ctrl())
}

/// Two-phase drag commit.
///
/// On init the command listens to `signals`: `start` snapshots the blocks,
/// `end` defers an invocation of `drag` itself. The invocation pairs that
/// snapshot with the blocks as they are once the gesture finished.
pub fn drag_command(doc: DocumentHandle, signals: DragSignals) -> CommandSpec<EditArgs> {
    let before: Rc<RefCell<Option<Vec<Block>>>> = Rc::default();

    let (execute_doc, captured) = (doc.clone(), before.clone());
    CommandSpec::new(DRAG, move |_| {
        let before = captured
            .borrow_mut()
            .take()
            .ok_or_else(|| CommandError::failed(DRAG, "no drag in progress"))?;
        let after = execute_doc.blocks();
        Ok(replace_blocks(&execute_doc, before, after))
    })
    .on_init(move |dispatcher| {
        let (snapshot_doc, slot) = (doc.clone(), before.clone());
        let start = signals.start.subscribe(move || {
            // a repeated start keeps the snapshot of the first one
            slot.borrow_mut().get_or_insert_with(|| snapshot_doc.blocks());
        });

        let (dispatcher, pending) = (dispatcher.clone(), before.clone());
        let end = signals.end.subscribe(move || {
            if pending.borrow().is_some() && !dispatcher.is_queued(DRAG) {
                dispatcher.defer(DRAG);
            }
        });

        let (signals, stale) = (signals.clone(), before.clone());
        Some(Box::new(move || {
            signals.start.unsubscribe(start);
            signals.end.unsubscribe(end);
            stale.borrow_mut().take();
        }) as Teardown)
    })
}

/// Register every editing command on `registry`
pub fn register_editing_commands(
    registry: &mut CommandRegistry<EditArgs>,
    doc: &DocumentHandle,
    signals: &DragSignals,
) -> Result<(), CommandError> {
    registry.register(delete_command(doc.clone()))?;
    registry.register(clear_command(doc.clone()))?;
    registry.register(place_top_command(doc.clone()))?;
    registry.register(place_bottom_command(doc.clone()))?;
    registry.register(update_block_command(doc.clone()))?;
    registry.register(update_model_command(doc.clone()))?;
    registry.register(select_all_command(doc.clone()))?;
    registry.register(drag_command(doc.clone(), signals.clone()))?;
    Ok(())
}
