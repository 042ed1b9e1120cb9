//! # Document Handle
//!
//! Shared, observable access to the [`Model`] being edited.
//!
//! The host owns the document through a [`DocumentHandle`]; the editing
//! commands, the pointer engines and the renderer hold clones of the same
//! handle. Every write emits `changed` after the borrow is released, so a
//! renderer subscribes instead of polling.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use layoutpad_common::{Block, Model};

use crate::events::EventChannel;
use crate::selection::FocusPartition;

#[derive(Clone)]
pub struct DocumentHandle {
    model: Rc<RefCell<Model>>,
    changed: EventChannel,
}

impl DocumentHandle {
    pub fn new(model: Model) -> Self {
        Self {
            model: Rc::new(RefCell::new(model)),
            changed: EventChannel::new(),
        }
    }

    /// Emitted after every write
    pub fn changed(&self) -> &EventChannel {
        &self.changed
    }

    /// Read through a closure without cloning
    pub fn read<R>(&self, f: impl FnOnce(&Model) -> R) -> R {
        f(&self.model.borrow())
    }

    /// Mutate in place, then notify
    pub fn update<R>(&self, f: impl FnOnce(&mut Model) -> R) -> R {
        let result = f(&mut self.model.borrow_mut());
        self.changed.emit();
        result
    }

    /// Deep copy of the whole document
    pub fn snapshot(&self) -> Model {
        self.model.borrow().clone()
    }

    /// Deep copy of the block list
    pub fn blocks(&self) -> Vec<Block> {
        self.model.borrow().blocks.clone()
    }

    pub fn block_count(&self) -> usize {
        self.model.borrow().blocks.len()
    }

    /// Replace the block list wholesale
    pub fn update_blocks(&self, blocks: Vec<Block>) {
        self.update(|model| model.blocks = blocks);
    }

    /// Replace the whole document (container and blocks)
    pub fn replace_model(&self, model: Model) {
        self.update(|current| *current = model);
    }

    /// Focused/unfocused split of the current blocks
    pub fn partition(&self) -> FocusPartition {
        self.read(|model| FocusPartition::of(&model.blocks))
    }
}

impl fmt::Debug for DocumentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentHandle")
            .field("blocks", &self.block_count())
            .finish()
    }
}
