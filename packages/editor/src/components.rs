//! Component palette and block factory.

use std::collections::BTreeMap;

use layoutpad_common::Block;
use serde::{Deserialize, Serialize};

use crate::EditorError;

/// A palette entry that can be dropped onto the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDef {
    pub key: String,
    pub label: String,

    /// Props copied onto every new block
    #[serde(default)]
    pub default_props: BTreeMap<String, serde_json::Value>,
}

impl ComponentDef {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            default_props: BTreeMap::new(),
        }
    }

    pub fn with_prop(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.default_props.insert(name.into(), value);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    components: Vec<ComponentDef>,
}

impl ComponentRegistry {
    /// Empty palette
    pub fn new() -> Self {
        Self::default()
    }

    /// Palette with `text`, `button` and `input`
    pub fn with_defaults() -> Self {
        Self::from_defs(vec![
            ComponentDef::new("text", "Text"),
            ComponentDef::new("button", "Button"),
            ComponentDef::new("input", "Input"),
        ])
    }

    pub fn from_defs(defs: Vec<ComponentDef>) -> Self {
        let mut registry = Self::new();
        for def in defs {
            registry.register(def);
        }
        registry
    }

    /// Add a component; a key that already exists is replaced in place
    pub fn register(&mut self, def: ComponentDef) {
        match self.components.iter_mut().find(|c| c.key == def.key) {
            Some(existing) => *existing = def,
            None => self.components.push(def),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ComponentDef> {
        self.components.iter().find(|c| c.key == key)
    }

    /// Palette entries in registration order
    pub fn defs(&self) -> &[ComponentDef] {
        &self.components
    }

    pub fn keys(&self) -> Vec<&str> {
        self.components.iter().map(|c| c.key.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Build a new block for `key` at the drop point.
    ///
    /// The block is unsized and flagged `adjust_position`, so the first
    /// [`Block::settle`] centres it on `(left, top)`.
    pub fn create_block(&self, key: &str, left: f64, top: f64) -> Result<Block, EditorError> {
        let def = self
            .get(key)
            .ok_or_else(|| EditorError::UnknownComponent(key.to_string()))?;

        let mut block = Block::new(def.key.clone(), left, top);
        block.adjust_position = true;
        block.props = def.default_props.clone();
        Ok(block)
    }
}
