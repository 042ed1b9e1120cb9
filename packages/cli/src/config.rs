use layoutpad_common::{Container, Model};
use layoutpad_editor::{ComponentDef, ComponentRegistry, EditSession, EditorConfig, EditorError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "layoutpad.config.json";
pub const DEFAULT_DOCUMENT_NAME: &str = "document.json";

/// Layoutpad project configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Canvas size for new documents
    #[serde(default)]
    pub container: Container,

    /// Editing session settings
    #[serde(default)]
    pub editor: EditorConfig,

    /// Component palette
    #[serde(default = "default_components")]
    pub components: Vec<ComponentDef>,
}

fn default_components() -> Vec<ComponentDef> {
    ComponentRegistry::with_defaults().defs().to_vec()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    pub fn palette(&self) -> ComponentRegistry {
        ComponentRegistry::from_defs(self.components.clone())
    }

    /// Start an editing session over `model` with these settings
    pub fn session(&self, model: Model) -> Result<EditSession, EditorError> {
        EditSession::new(model, self.palette(), &self.editor)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            container: Container::default(),
            editor: EditorConfig::default(),
            components: default_components(),
        }
    }
}
