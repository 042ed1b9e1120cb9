//! Integration tests for editor crate

use layoutpad_editor::{
    Block, ComponentDef, ComponentRegistry, Container, EditSession, EditorConfig, KeyChord,
    KeyInput, Model, PointerInput, DELETE,
};

fn empty_session() -> EditSession {
    EditSession::with_model(Model::new(Container::default())).unwrap()
}

#[test]
fn test_drop_delete_undo_scenario() {
    let mut session = empty_session();

    let index = session.drop_component("button", 50.0, 50.0).unwrap();
    session.click_block(index, false).unwrap();
    session.run(DELETE).unwrap();
    assert!(session.document().blocks().is_empty());

    session.undo().unwrap();
    let blocks = session.document().blocks();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].component_key, "button");
    assert_eq!((blocks[0].left, blocks[0].top), (50.0, 50.0));
}

#[test]
fn test_drag_gesture_is_one_history_entry() -> anyhow::Result<()> {
    let mut session = empty_session();
    session.drop_component("text", 200.0, 200.0)?;
    session.settle_block(0, 40.0, 20.0)?;

    assert!(session.pointer_down_block(0, PointerInput::new(200.0, 200.0))?);
    for step in 1..=10 {
        let offset = step as f64 * 7.0;
        session.pointer_move(PointerInput::new(200.0 + offset, 200.0 + offset));
    }
    assert!(session.is_dragging());
    assert!(session.pointer_up()?);

    assert_eq!(session.history().entries(), vec!["drag", "drag"]);
    let moved = session.document().blocks()[0].clone();
    assert_eq!((moved.left, moved.top), (250.0, 260.0));

    session.undo()?;
    let restored = &session.document().blocks()[0];
    assert_eq!((restored.left, restored.top), (180.0, 190.0));

    session.redo()?;
    assert_eq!(session.document().blocks()[0], moved);
    Ok(())
}

#[test]
fn test_click_without_move_records_nothing() -> anyhow::Result<()> {
    let mut session = EditSession::with_model(
        Model::new(Container::default()).with_blocks(vec![Block::new("text", 10.0, 10.0)]),
    )?;

    assert!(session.pointer_down_block(0, PointerInput::new(12.0, 12.0))?);
    assert!(!session.pointer_up()?);
    assert!(session.history().is_empty());
    assert!(session.document().blocks()[0].focus);
    Ok(())
}

#[test]
fn test_pointer_down_with_shift_toggles_out_of_multi_selection() -> anyhow::Result<()> {
    let mut session = EditSession::with_model(Model::new(Container::default()).with_blocks(vec![
        Block::new("text", 0.0, 0.0).focused(),
        Block::new("text", 100.0, 0.0).focused(),
    ]))?;

    // the shift-click unfocuses the block, so no drag arms
    assert!(!session.pointer_down_block(1, PointerInput::new(100.0, 0.0).with_shift())?);
    assert!(!session.pointer_move(PointerInput::new(150.0, 50.0)));
    assert_eq!(session.document().partition().focused, vec![0]);
    Ok(())
}

#[test]
fn test_custom_palette_and_history_limit() -> anyhow::Result<()> {
    let palette = ComponentRegistry::from_defs(vec![ComponentDef::new("card", "Card")
        .with_prop("title", serde_json::json!("Untitled"))]);
    let config = EditorConfig {
        max_history: 2,
        ..EditorConfig::default()
    };
    let mut session = EditSession::new(Model::new(Container::default()), palette, &config)?;

    for i in 0..4 {
        session.drop_component("card", i as f64 * 10.0, 0.0)?;
    }
    assert_eq!(session.history().len(), 2);

    session.undo()?;
    session.undo()?;
    session.undo()?;
    assert_eq!(session.document().block_count(), 2);
    assert_eq!(
        session.document().blocks()[0].props["title"],
        serde_json::json!("Untitled")
    );
    Ok(())
}

#[test]
fn test_keyboard_bindings_respect_text_fields() -> anyhow::Result<()> {
    let mut session = empty_session();
    session.drop_component("input", 0.0, 0.0)?;
    session.click_block(0, false)?;

    let delete = KeyInput::new(KeyChord::new("delete"));
    assert!(!session.handle_key(&delete.clone().in_text_field())?);
    assert_eq!(session.document().block_count(), 1);

    assert!(session.handle_key(&delete)?);
    assert_eq!(session.document().block_count(), 0);

    assert!(session.handle_key(&KeyInput::from_keydown("z", false, false, false, true))?);
    assert_eq!(session.document().block_count(), 1);
    assert!(session.handle_key(&"ctrl+shift+z".parse::<KeyChord>().map(KeyInput::new)?)?);
    assert_eq!(session.document().block_count(), 0);
    Ok(())
}

#[test]
fn test_change_notifications_reach_renderer() -> anyhow::Result<()> {
    use std::cell::Cell;
    use std::rc::Rc;

    let mut session = empty_session();
    let renders = Rc::new(Cell::new(0));
    let counter = renders.clone();
    session
        .document()
        .changed()
        .subscribe(move || counter.set(counter.get() + 1));

    session.drop_component("text", 0.0, 0.0)?;
    let after_drop = renders.get();
    assert!(after_drop >= 1);

    session.undo()?;
    assert!(renders.get() > after_drop);
    Ok(())
}
