//! # Layoutpad Editor
//!
//! Editing session core for the layoutpad canvas editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ common: Block / Container / Model + JSON    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: one EditSession per document        │
//! │  - CommandRegistry + linear History         │
//! │  - Editing commands (snapshot before/after) │
//! │  - Selection & focus resolution             │
//! │  - Drag / resize engines, snap lines        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ host: renders the document + active marks   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Document is the only shared state**: everything else derives from it
//! 2. **Whole-list snapshots**: undo restores an exact copy, never a diff
//! 3. **Linear history**: a new command after undo discards the undone branch
//! 4. **No reentrancy**: command bodies never hold the registry
//!
//! ## Usage
//!
//! ```rust,ignore
//! use layoutpad_common::{Container, Model};
//! use layoutpad_editor::{EditSession, PointerInput};
//!
//! let mut session = EditSession::with_model(Model::new(Container::default()))?;
//!
//! let index = session.drop_component("button", 50.0, 50.0)?;
//! session.pointer_down_block(index, PointerInput::new(50.0, 50.0))?;
//! session.pointer_move(PointerInput::new(120.0, 80.0));
//! session.pointer_up()?;
//!
//! session.undo()?;
//! ```

mod components;
mod config;
mod document;
mod drag;
mod editing;
mod errors;
mod events;
mod history;
mod keyboard;
mod registry;
mod resize;
mod selection;
mod session;

pub use components::{ComponentDef, ComponentRegistry};
pub use config::{DuplicatePolicy, EditorConfig, DEFAULT_SNAP_TOLERANCE};
pub use document::DocumentHandle;
pub use drag::{ActiveMarks, DragEngine, MarkLine, MarkLines, PointerInput};
pub use editing::{
    register_editing_commands, EditArgs, CLEAR, DELETE, DRAG, PLACE_BOTTOM, PLACE_TOP,
    SELECT_ALL, UPDATE_BLOCK, UPDATE_MODEL,
};
pub use errors::{CommandError, EditorError};
pub use events::{DragSignals, EventChannel, ListenerId};
pub use history::{Action, CommandExecute, History, HistoryEntry};
pub use keyboard::{KeyChord, KeyInput};
pub use registry::{CommandRegistry, CommandSpec, Dispatcher, Teardown, REDO, UNDO};
pub use resize::{HandleAxis, ResizeDirection, ResizeEngine};
pub use selection::{click_block, click_canvas, clear_focus, select_all, FocusPartition};
pub use session::EditSession;

// Re-export common types for convenience
pub use layoutpad_common::{Block, Container, Model, ModelError, Rect};
