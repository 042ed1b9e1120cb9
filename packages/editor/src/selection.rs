//! # Selection & Focus
//!
//! Focus is a flag on each block. [`FocusPartition`] splits the block list
//! into focused and unfocused indices; it is recomputed from the blocks on
//! every read and never cached.
//!
//! ## Click policy
//!
//! - Plain click on an unfocused block: focus it, clear every other block
//! - Plain click on a focused block: unchanged (keeps a multi-selection for dragging)
//! - Shift-click with at most one block focused: force this block focused
//! - Shift-click otherwise: toggle this block only
//! - Click on empty canvas: clear all focus unless shift is held

use layoutpad_common::Block;

/// Indices of focused and unfocused blocks, in list order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusPartition {
    pub focused: Vec<usize>,
    pub unfocused: Vec<usize>,
}

impl FocusPartition {
    pub fn of(blocks: &[Block]) -> Self {
        let (focused, unfocused): (Vec<usize>, Vec<usize>) =
            (0..blocks.len()).partition(|&i| blocks[i].focus);
        Self { focused, unfocused }
    }

    pub fn has_focus(&self) -> bool {
        !self.focused.is_empty()
    }

    /// Copies of the focused blocks
    pub fn focused_blocks(&self, blocks: &[Block]) -> Vec<Block> {
        self.focused.iter().map(|&i| blocks[i].clone()).collect()
    }

    /// Copies of the unfocused blocks
    pub fn unfocused_blocks(&self, blocks: &[Block]) -> Vec<Block> {
        self.unfocused.iter().map(|&i| blocks[i].clone()).collect()
    }
}

/// Clear focus on every block except `keep`
pub fn clear_focus(blocks: &mut [Block], keep: Option<usize>) {
    for (i, block) in blocks.iter_mut().enumerate() {
        if Some(i) != keep {
            block.focus = false;
        }
    }
}

pub fn select_all(blocks: &mut [Block]) {
    for block in blocks.iter_mut() {
        block.focus = true;
    }
}

/// Apply a pointer-down on `blocks[index]`.
///
/// Returns whether the block is focused afterwards, or `None` when the index
/// is out of range.
pub fn click_block(blocks: &mut [Block], index: usize, shift: bool) -> Option<bool> {
    if index >= blocks.len() {
        return None;
    }

    if shift {
        let focused = blocks.iter().filter(|block| block.focus).count();
        let block = &mut blocks[index];
        block.focus = if focused <= 1 { true } else { !block.focus };
    } else if !blocks[index].focus {
        blocks[index].focus = true;
        clear_focus(blocks, Some(index));
    }

    Some(blocks[index].focus)
}

/// Apply a pointer-down on empty canvas
pub fn click_canvas(blocks: &mut [Block], shift: bool) {
    if !shift {
        clear_focus(blocks, None);
    }
}
