//! # Edit Session
//!
//! One editing session over one document. The session owns the command
//! registry, the drag and resize engines and the component palette, and
//! wires them to a shared [`DocumentHandle`]. A host (the CLI replayer, a
//! renderer) feeds it pointer and keyboard input and reads the document
//! and the active guide lines back.
//!
//! Pointer-up and drag-end notifications flush deferred commands, so a
//! finished drag is in the history by the time those calls return.

use std::cell::Ref;

use layoutpad_common::{Block, Model};
use tracing::{debug, instrument};

use crate::components::ComponentRegistry;
use crate::document::DocumentHandle;
use crate::drag::{ActiveMarks, DragEngine, PointerInput};
use crate::editing::{self, EditArgs};
use crate::events::DragSignals;
use crate::history::History;
use crate::keyboard::KeyInput;
use crate::registry::CommandRegistry;
use crate::resize::{ResizeDirection, ResizeEngine};
use crate::selection;
use crate::{EditorConfig, EditorError};

pub struct EditSession {
    document: DocumentHandle,
    registry: CommandRegistry<EditArgs>,
    signals: DragSignals,
    drag: DragEngine,
    resize: ResizeEngine,
    components: ComponentRegistry,

    /// Last clicked block, for property editing
    selected: Option<usize>,
}

impl EditSession {
    /// Create a session and initialise its commands
    #[instrument(skip_all, fields(blocks = model.blocks.len()))]
    pub fn new(
        model: Model,
        components: ComponentRegistry,
        config: &EditorConfig,
    ) -> Result<Self, EditorError> {
        let document = DocumentHandle::new(model);
        let signals = DragSignals::new();

        let mut registry = CommandRegistry::with_settings(
            History::with_max_levels(config.max_history),
            config.duplicate_commands,
        );
        editing::register_editing_commands(&mut registry, &document, &signals)?;
        registry.init();

        Ok(Self {
            drag: DragEngine::with_tolerance(signals.clone(), config.snap_tolerance),
            resize: ResizeEngine::new(signals.clone()),
            document,
            registry,
            signals,
            components,
            selected: None,
        })
    }

    /// Session with the default palette and settings
    pub fn with_model(model: Model) -> Result<Self, EditorError> {
        Self::new(model, ComponentRegistry::with_defaults(), &EditorConfig::default())
    }

    pub fn document(&self) -> &DocumentHandle {
        &self.document
    }

    /// Deep copy of the current document
    pub fn model(&self) -> Model {
        self.document.snapshot()
    }

    pub fn history(&self) -> Ref<'_, History> {
        self.registry.history()
    }

    pub fn registry(&self) -> &CommandRegistry<EditArgs> {
        &self.registry
    }

    /// For hosts registering their own commands
    pub fn registry_mut(&mut self) -> &mut CommandRegistry<EditArgs> {
        &mut self.registry
    }

    pub fn signals(&self) -> &DragSignals {
        &self.signals
    }

    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    // Commands

    pub fn invoke(&mut self, name: &str, args: EditArgs) -> Result<(), EditorError> {
        let result = self.registry.invoke(name, args);
        self.sync_selection();
        Ok(result?)
    }

    pub fn run(&mut self, name: &str) -> Result<(), EditorError> {
        self.invoke(name, EditArgs::None)
    }

    pub fn undo(&mut self) -> Result<(), EditorError> {
        self.run(crate::registry::UNDO)
    }

    pub fn redo(&mut self) -> Result<(), EditorError> {
        self.run(crate::registry::REDO)
    }

    pub fn update_block(&mut self, new_block: Block, old_block: Block) -> Result<(), EditorError> {
        self.invoke(
            editing::UPDATE_BLOCK,
            EditArgs::UpdateBlock {
                new_block,
                old_block,
            },
        )
    }

    pub fn update_model(&mut self, model: Model) -> Result<(), EditorError> {
        self.invoke(editing::UPDATE_MODEL, EditArgs::UpdateModel(model))
    }

    /// Parse a document and load it as one undoable step
    pub fn import_json(&mut self, source: &str) -> Result<(), EditorError> {
        let model = Model::from_json(source)?;
        self.update_model(model)
    }

    pub fn export_json(&self) -> Result<String, EditorError> {
        Ok(self.document.read(Model::to_json)?)
    }

    /// Dispatch a key-down through the registered bindings
    pub fn handle_key(&mut self, input: &KeyInput) -> Result<bool, EditorError> {
        let result = self.registry.handle_key(input);
        self.sync_selection();
        Ok(result?)
    }

    // Pointer input

    /// Click on a block. Returns whether it is focused afterwards.
    pub fn click_block(&mut self, index: usize, shift: bool) -> Result<bool, EditorError> {
        let focused = self
            .document
            .update(|model| selection::click_block(&mut model.blocks, index, shift))
            .ok_or(EditorError::BlockIndexOutOfRange(index))?;
        self.selected = Some(index);
        Ok(focused)
    }

    /// Pointer-down on a block: apply the click, then arm a drag if the block
    /// ended up focused. Returns whether a drag is armed.
    pub fn pointer_down_block(
        &mut self,
        index: usize,
        pointer: PointerInput,
    ) -> Result<bool, EditorError> {
        self.finish_gesture()?;
        self.click_block(index, pointer.shift)?;
        Ok(self.drag.press(&self.document, index, pointer))
    }

    /// Pointer-down on a resize handle of a focused block. Takes over from
    /// a drag armed by the same pointer-down.
    pub fn pointer_down_resize(
        &mut self,
        index: usize,
        direction: ResizeDirection,
        pointer: PointerInput,
    ) -> Result<bool, EditorError> {
        if index >= self.document.block_count() {
            return Err(EditorError::BlockIndexOutOfRange(index));
        }
        self.finish_gesture()?;
        Ok(self.resize.press(&self.document, index, direction, pointer))
    }

    pub fn click_canvas(&mut self, shift: bool) {
        self.document
            .update(|model| selection::click_canvas(&mut model.blocks, shift));
        if !shift {
            self.selected = None;
        }
    }

    /// Returns whether any block moved
    pub fn pointer_move(&mut self, pointer: PointerInput) -> bool {
        let dragged = self.drag.on_move(&self.document, pointer);
        let resized = self.resize.on_move(&self.document, pointer);
        dragged || resized
    }

    /// Finish the current gesture. Returns whether it moved anything.
    pub fn pointer_up(&mut self) -> Result<bool, EditorError> {
        self.finish_gesture()
    }

    /// Drop a palette component at `(left, top)`.
    ///
    /// The insert is bracketed by the drag signals, so it is recorded as a
    /// `drag` entry. Returns the index of the new block.
    pub fn drop_component(&mut self, key: &str, left: f64, top: f64) -> Result<usize, EditorError> {
        let block = self.components.create_block(key, left, top)?;

        self.signals.start.emit();
        let index = self.document.update(|model| {
            model.blocks.push(block);
            model.blocks.len() - 1
        });
        self.signals.end.emit();
        self.registry.flush_deferred()?;

        debug!(component = key, index, left, top, "component dropped");
        Ok(index)
    }

    /// Record the rendered size of a block. Not an undoable step.
    pub fn settle_block(&mut self, index: usize, width: f64, height: f64) -> Result<(), EditorError> {
        self.document
            .update(|model| {
                model
                    .blocks
                    .get_mut(index)
                    .map(|block| block.settle(width, height))
            })
            .ok_or(EditorError::BlockIndexOutOfRange(index))
    }

    /// External drag start, for hosts that move blocks themselves
    pub fn notify_drag_start(&self) {
        self.signals.start.emit();
    }

    /// External drag end; commits the drag
    pub fn notify_drag_end(&mut self) -> Result<(), EditorError> {
        self.signals.end.emit();
        self.registry.flush_deferred()?;
        self.sync_selection();
        Ok(())
    }

    // Outbound state

    pub fn marks(&self) -> ActiveMarks {
        self.drag.marks()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging() || self.resize.is_resizing()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_block(&self) -> Option<Block> {
        let index = self.selected?;
        self.document.read(|model| model.blocks.get(index).cloned())
    }

    /// Stop listening for keys and drag signals
    pub fn dispose(&mut self) {
        self.registry.dispose();
    }

    /// At most one engine holds a gesture. Releasing both commits whichever
    /// one moved and drops a press that never did.
    fn finish_gesture(&mut self) -> Result<bool, EditorError> {
        let dragged = self.drag.release();
        let resized = self.resize.release();
        self.registry.flush_deferred()?;
        Ok(dragged || resized)
    }

    fn sync_selection(&mut self) {
        if let Some(index) = self.selected {
            if index >= self.document.block_count() {
                self.selected = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::DELETE;
    use crate::keyboard::KeyChord;
    use layoutpad_common::Container;

    fn session() -> EditSession {
        EditSession::with_model(Model::new(Container::default())).unwrap()
    }

    #[test]
    fn test_session_creation() {
        let session = session();
        assert!(session.registry().is_initialized());
        assert!(session.history().is_empty());
        assert_eq!(session.selected_index(), None);
    }

    #[test]
    fn test_drop_enters_history_as_drag() {
        let mut session = session();
        assert_eq!(session.drop_component("button", 50.0, 50.0).unwrap(), 0);
        assert_eq!(session.history().entries(), vec![editing::DRAG]);

        session.undo().unwrap();
        assert_eq!(session.document().block_count(), 0);
    }

    #[test]
    fn test_drop_unknown_component_records_nothing() {
        let mut session = session();
        assert!(matches!(
            session.drop_component("slider", 0.0, 0.0),
            Err(EditorError::UnknownComponent(_))
        ));
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_selection_cleared_when_block_removed() {
        let mut session = session();
        session.drop_component("text", 0.0, 0.0).unwrap();
        session.click_block(0, false).unwrap();
        assert_eq!(session.selected_index(), Some(0));

        session.run(DELETE).unwrap();
        assert_eq!(session.selected_index(), None);
        assert!(session.selected_block().is_none());
    }

    #[test]
    fn test_click_out_of_range() {
        let mut session = session();
        assert!(matches!(
            session.click_block(2, false),
            Err(EditorError::BlockIndexOutOfRange(2))
        ));
    }

    #[test]
    fn test_settle_after_drop() {
        let mut session = session();
        session.drop_component("button", 50.0, 50.0).unwrap();
        session.settle_block(0, 40.0, 20.0).unwrap();

        let block = &session.document().blocks()[0];
        assert_eq!((block.left, block.top), (30.0, 40.0));
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_keyboard_select_all_then_delete() {
        let mut session = session();
        session.drop_component("text", 0.0, 0.0).unwrap();
        session.drop_component("input", 10.0, 10.0).unwrap();

        assert!(session
            .handle_key(&KeyInput::new(KeyChord::new("a").ctrl()))
            .unwrap());
        assert!(session
            .handle_key(&KeyInput::from_keydown("Backspace", false, false, false, false))
            .unwrap());
        assert_eq!(session.document().block_count(), 0);
        assert_eq!(session.history().entries(), vec!["drag", "drag", "delete"]);
    }

    #[test]
    fn test_import_export() {
        let mut session = session();
        session
            .import_json(r#"{ "container": { "width": 300, "height": 200 }, "blocks": [] }"#)
            .unwrap();
        assert_eq!(session.model().container, Container::new(300.0, 200.0));
        assert!(session.export_json().unwrap().contains("\"width\": 300.0"));

        assert!(matches!(
            session.import_json("not json"),
            Err(EditorError::Model(_))
        ));
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_resize_press_takes_over_armed_drag() {
        let mut session = EditSession::with_model(Model::new(Container::default()).with_blocks(
            vec![Block::new("text", 100.0, 100.0).with_size(50.0, 40.0).focused()],
        ))
        .unwrap();

        assert!(session
            .pointer_down_block(0, PointerInput::new(100.0, 100.0))
            .unwrap());
        assert!(session
            .pointer_down_resize(0, ResizeDirection::corner(), PointerInput::new(150.0, 140.0))
            .unwrap());
        session.pointer_move(PointerInput::new(200.0, 200.0));
        assert!(session.pointer_up().unwrap());

        let block = session.document().blocks()[0].clone();
        assert_eq!((block.left, block.top), (100.0, 100.0));
        assert_eq!((block.width, block.height), (100.0, 100.0));
        assert_eq!(session.history().entries(), vec![editing::DRAG]);

        session.undo().unwrap();
        let block = &session.document().blocks()[0];
        assert_eq!((block.left, block.top), (100.0, 100.0));
        assert_eq!((block.width, block.height), (50.0, 40.0));
    }

    #[test]
    fn test_block_press_commits_unfinished_resize() {
        let mut session = EditSession::with_model(Model::new(Container::default()).with_blocks(
            vec![Block::new("text", 100.0, 100.0).with_size(50.0, 40.0).focused()],
        ))
        .unwrap();

        session
            .pointer_down_resize(0, ResizeDirection::corner(), PointerInput::new(150.0, 140.0))
            .unwrap();
        session.pointer_move(PointerInput::new(160.0, 150.0));
        session
            .pointer_down_block(0, PointerInput::new(110.0, 110.0))
            .unwrap();
        session.pointer_move(PointerInput::new(130.0, 110.0));
        session.pointer_up().unwrap();

        assert_eq!(session.history().entries(), vec![editing::DRAG, editing::DRAG]);
        let block = session.document().blocks()[0].clone();
        assert_eq!((block.left, block.width), (120.0, 60.0));

        session.undo().unwrap();
        assert_eq!(session.document().blocks()[0].left, 100.0);
        session.undo().unwrap();
        assert_eq!(session.document().blocks()[0].width, 50.0);
    }

    #[test]
    fn test_dispose_stops_drag_commits() {
        let mut session = session();
        session.dispose();
        session.notify_drag_start();
        session.notify_drag_end().unwrap();
        assert!(session.history().is_empty());
    }
}
