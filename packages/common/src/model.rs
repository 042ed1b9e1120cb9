//! # Block Model
//!
//! A [`Model`] is the container size plus an ordered list of [`Block`]s.
//!
//! Blocks have no stable id. Identity is positional (index in
//! `Model::blocks`) or by value, and only holds within the lifetime of one
//! command's before/after pair. Stacking is by `z_index`, ties broken by list
//! order.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ModelError, ModelResult};

/// Axis-aligned rectangle in container coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

/// One placed instance of a registered component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Key of the palette component this block renders
    pub component_key: String,

    pub top: f64,
    pub left: f64,

    #[serde(default)]
    pub width: f64,

    #[serde(default)]
    pub height: f64,

    #[serde(default)]
    pub z_index: i32,

    /// Selection flag
    #[serde(default)]
    pub focus: bool,

    /// Set once the block has been resized by hand
    #[serde(default)]
    pub has_resize: bool,

    /// Centre on the drop point once the rendered size is known
    #[serde(default)]
    pub adjust_position: bool,

    /// Component properties edited through the property panel
    #[serde(default)]
    pub props: BTreeMap<String, serde_json::Value>,

    /// Component field name -> bound data field name
    #[serde(default)]
    pub bound_fields: BTreeMap<String, String>,
}

impl Block {
    /// Create an unsized, unfocused block at a position
    pub fn new(component_key: impl Into<String>, left: f64, top: f64) -> Self {
        Self {
            component_key: component_key.into(),
            top,
            left,
            width: 0.0,
            height: 0.0,
            z_index: 0,
            focus: false,
            has_resize: false,
            adjust_position: false,
            props: BTreeMap::new(),
            bound_fields: BTreeMap::new(),
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    pub fn focused(mut self) -> Self {
        self.focus = true;
        self
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.top, self.left, self.width, self.height)
    }

    /// Record the rendered size of the block.
    ///
    /// A freshly dropped block carries `adjust_position`; the first settle
    /// centres it on its drop point and clears the flag. Blocks resized by
    /// hand keep their own size.
    pub fn settle(&mut self, width: f64, height: f64) {
        if self.adjust_position {
            self.left -= width / 2.0;
            self.top -= height / 2.0;
            self.adjust_position = false;
        }
        if !self.has_resize {
            self.width = width;
            self.height = height;
        }
    }
}

/// Canvas dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub width: f64,
    pub height: f64,
}

impl Container {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// The container treated as a zero-positioned block
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    fn validate(&self) -> ModelResult<()> {
        let valid = |v: f64| v.is_finite() && v >= 0.0;
        if valid(self.width) && valid(self.height) {
            Ok(())
        } else {
            Err(ModelError::InvalidContainer {
                width: self.width,
                height: self.height,
            })
        }
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new(800.0, 1000.0)
    }
}

/// The full editable document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Model {
    pub container: Container,

    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl Model {
    /// Create an empty document
    pub fn new(container: Container) -> Self {
        Self {
            container,
            blocks: Vec::new(),
        }
    }

    pub fn with_blocks(mut self, blocks: Vec<Block>) -> Self {
        self.blocks = blocks;
        self
    }

    /// Parse a document from JSON
    pub fn from_json(source: &str) -> ModelResult<Self> {
        let model: Model = serde_json::from_str(source)?;
        model.container.validate()?;
        Ok(model)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> ModelResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a document from disk
    pub fn load(path: &Path) -> ModelResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json(&source)
    }

    /// Save the document to disk, creating parent directories
    pub fn save(&self, path: &Path) -> ModelResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Block indices in paint order (lowest first)
    pub fn paint_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.blocks.len()).collect();
        // sort_by_key is stable, so equal z-indices keep list order
        order.sort_by_key(|&i| self.blocks[i].z_index);
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_document() {
        let json = r#"{
            "container": { "width": 500, "height": 400 },
            "blocks": [
                { "componentKey": "button", "top": 10, "left": 20 }
            ]
        }"#;

        let model = Model::from_json(json).unwrap();
        assert_eq!(model.container, Container::new(500.0, 400.0));
        assert_eq!(model.blocks.len(), 1);

        let block = &model.blocks[0];
        assert_eq!(block.component_key, "button");
        assert_eq!(block.z_index, 0);
        assert!(!block.focus);
        assert!(block.props.is_empty());
    }

    #[test]
    fn test_missing_blocks_defaults_to_empty() {
        let model = Model::from_json(r#"{ "container": { "width": 1, "height": 1 } }"#).unwrap();
        assert!(model.blocks.is_empty());
    }

    #[test]
    fn test_rejects_negative_container() {
        let result = Model::from_json(r#"{ "container": { "width": -1, "height": 10 } }"#);
        assert!(matches!(result, Err(ModelError::InvalidContainer { .. })));
    }

    #[test]
    fn test_json_roundtrip_preserves_props() {
        let mut block = Block::new("input", 5.0, 6.0).with_size(100.0, 30.0);
        block.props.insert("placeholder".to_string(), serde_json::json!("Name"));
        block.bound_fields.insert("default".to_string(), "username".to_string());
        let model = Model::new(Container::default()).with_blocks(vec![block]);

        let json = model.to_json().unwrap();
        assert!(json.contains("\"componentKey\""));
        assert!(json.contains("\"boundFields\""));
        assert_eq!(Model::from_json(&json).unwrap(), model);
    }

    #[test]
    fn test_paint_order_breaks_ties_by_list_order() {
        let model = Model::new(Container::default()).with_blocks(vec![
            Block::new("a", 0.0, 0.0).with_z_index(2),
            Block::new("b", 0.0, 0.0).with_z_index(0),
            Block::new("c", 0.0, 0.0).with_z_index(2),
            Block::new("d", 0.0, 0.0).with_z_index(0),
        ]);
        assert_eq!(model.paint_order(), vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_settle_centres_dropped_block_once() {
        let mut block = Block::new("button", 50.0, 50.0);
        block.adjust_position = true;

        block.settle(40.0, 20.0);
        assert_eq!((block.left, block.top), (30.0, 40.0));
        assert_eq!((block.width, block.height), (40.0, 20.0));
        assert!(!block.adjust_position);

        block.settle(60.0, 20.0);
        assert_eq!((block.left, block.top), (30.0, 40.0));
        assert_eq!(block.width, 60.0);
    }

    #[test]
    fn test_settle_keeps_manual_size() {
        let mut block = Block::new("text", 0.0, 0.0).with_size(200.0, 80.0);
        block.has_resize = true;
        block.settle(50.0, 10.0);
        assert_eq!((block.width, block.height), (200.0, 80.0));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("document.json");
        let model = Model::new(Container::new(320.0, 240.0))
            .with_blocks(vec![Block::new("text", 1.0, 2.0)]);

        model.save(&path).unwrap();
        assert_eq!(Model::load(&path).unwrap(), model);
    }
}
