use serde::{Deserialize, Serialize};

/// Default alignment snap distance, in container pixels
pub const DEFAULT_SNAP_TOLERANCE: f64 = 5.0;

/// What to do when a command name is registered twice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DuplicatePolicy {
    /// Fail fast with `CommandError::DuplicateCommand`
    #[default]
    Reject,

    /// Last registration wins (logged as a warning)
    Replace,
}

/// Editing session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Distance within which a dragged edge snaps to an alignment line
    #[serde(default = "default_snap_tolerance")]
    pub snap_tolerance: f64,

    /// History entries kept (0 = unlimited)
    #[serde(default)]
    pub max_history: usize,

    #[serde(default)]
    pub duplicate_commands: DuplicatePolicy,
}

fn default_snap_tolerance() -> f64 {
    DEFAULT_SNAP_TOLERANCE
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap_tolerance: DEFAULT_SNAP_TOLERANCE,
            max_history: 0,
            duplicate_commands: DuplicatePolicy::Reject,
        }
    }
}
