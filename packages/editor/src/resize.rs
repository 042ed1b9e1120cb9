//! # Resize Engine
//!
//! Pointer handling for the eight resize handles of a focused block. Shares
//! the drag gesture shape and signals, so a resize enters history through the
//! same `drag` command as a move.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::document::DocumentHandle;
use crate::drag::PointerInput;
use crate::events::DragSignals;

/// Handle position along one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HandleAxis {
    /// Left or top edge; moves the origin
    Start,
    /// Middle of the edge; this axis is frozen
    Center,
    /// Right or bottom edge
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeDirection {
    pub horizontal: HandleAxis,
    pub vertical: HandleAxis,
}

impl ResizeDirection {
    pub fn new(horizontal: HandleAxis, vertical: HandleAxis) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Bottom-right corner handle
    pub fn corner() -> Self {
        Self::new(HandleAxis::End, HandleAxis::End)
    }
}

/// New `(origin, size)` along one axis
fn resize_axis(axis: HandleAxis, origin: f64, size: f64, delta: f64) -> (f64, f64) {
    match axis {
        HandleAxis::Center => (origin, size),
        HandleAxis::End => (origin, (size + delta).max(0.0)),
        HandleAxis::Start => {
            let resized = (size - delta).max(0.0);
            // the opposite edge stays put
            (origin + size - resized, resized)
        }
    }
}

#[derive(Debug)]
struct ResizeSession {
    index: usize,
    direction: ResizeDirection,
    start_x: f64,
    start_y: f64,
    top: f64,
    left: f64,
    width: f64,
    height: f64,
    resizing: bool,
}

#[derive(Debug)]
pub struct ResizeEngine {
    signals: DragSignals,
    session: Option<ResizeSession>,
}

impl ResizeEngine {
    pub fn new(signals: DragSignals) -> Self {
        Self {
            signals,
            session: None,
        }
    }

    /// Pointer-down on a handle of `blocks[index]`; only focused blocks resize
    pub fn press(
        &mut self,
        doc: &DocumentHandle,
        index: usize,
        direction: ResizeDirection,
        pointer: PointerInput,
    ) -> bool {
        self.session = doc.read(|model| {
            let block = model.blocks.get(index).filter(|block| block.focus)?;
            Some(ResizeSession {
                index,
                direction,
                start_x: pointer.x,
                start_y: pointer.y,
                top: block.top,
                left: block.left,
                width: block.width,
                height: block.height,
                resizing: false,
            })
        });
        self.session.is_some()
    }

    pub fn on_move(&mut self, doc: &DocumentHandle, pointer: PointerInput) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if !session.resizing {
            session.resizing = true;
            debug!(index = session.index, direction = ?session.direction, "resize started");
            self.signals.start.emit();
        }

        let (left, width) = resize_axis(
            session.direction.horizontal,
            session.left,
            session.width,
            pointer.x - session.start_x,
        );
        let (top, height) = resize_axis(
            session.direction.vertical,
            session.top,
            session.height,
            pointer.y - session.start_y,
        );

        let index = session.index;
        doc.update(|model| {
            if let Some(block) = model.blocks.get_mut(index) {
                block.left = left;
                block.top = top;
                block.width = width;
                block.height = height;
                block.has_resize = true;
            }
        });
        true
    }

    /// Pointer-up. Emits the end signal only if the pointer moved.
    pub fn release(&mut self) -> bool {
        match self.session.take() {
            Some(session) if session.resizing => {
                debug!(index = session.index, "resize finished");
                self.signals.end.emit();
                true
            }
            _ => false,
        }
    }

    pub fn is_resizing(&self) -> bool {
        self.session.as_ref().is_some_and(|session| session.resizing)
    }
}
