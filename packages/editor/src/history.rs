//! # Undo/Redo History
//!
//! Linear, branch-truncating history of applied commands.
//!
//! ## Design
//!
//! - Each entry holds the `redo`/`undo` closures produced when its command ran
//! - The cursor counts applied entries; entries past it are undone "future"
//! - Recording a new entry discards every entry past the cursor
//! - No redo tree: once a branch is truncated it is gone
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut history = History::new();
//! history.record(HistoryEntry::new("move", CommandExecute::new(redo).with_undo(undo)));
//!
//! if let Some(undo) = history.step_back().and_then(HistoryEntry::undo_action) {
//!     undo();
//! }
//! ```

use std::fmt;
use std::rc::Rc;

/// A side effect produced by a command
pub type Action = Rc<dyn Fn()>;

/// The `redo`/`undo` pair returned by a command's `execute`.
///
/// A command without `undo` is irreversible.
#[derive(Clone)]
pub struct CommandExecute {
    redo: Action,
    undo: Option<Action>,
}

impl CommandExecute {
    pub fn new(redo: impl Fn() + 'static) -> Self {
        Self {
            redo: Rc::new(redo),
            undo: None,
        }
    }

    pub fn with_undo(mut self, undo: impl Fn() + 'static) -> Self {
        self.undo = Some(Rc::new(undo));
        self
    }

    pub fn is_reversible(&self) -> bool {
        self.undo.is_some()
    }

    pub fn redo(&self) {
        (self.redo)();
    }

    /// Run the undo closure, if any
    pub fn undo(&self) {
        if let Some(undo) = &self.undo {
            undo();
        }
    }
}

impl fmt::Debug for CommandExecute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandExecute")
            .field("reversible", &self.is_reversible())
            .finish()
    }
}

/// One applied command in the history
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub name: String,
    pub execute: CommandExecute,
}

impl HistoryEntry {
    pub fn new(name: impl Into<String>, execute: CommandExecute) -> Self {
        Self {
            name: name.into(),
            execute,
        }
    }

    pub fn redo_action(&self) -> Action {
        self.execute.redo.clone()
    }

    pub fn undo_action(&self) -> Option<Action> {
        self.execute.undo.clone()
    }
}

/// Linear undo/redo history
#[derive(Debug)]
pub struct History {
    queue: Vec<HistoryEntry>,

    /// Number of applied entries; `queue[applied - 1]` is the current one
    applied: usize,

    /// Maximum number of entries kept (0 = unlimited)
    max_levels: usize,
}

impl History {
    /// Create an unlimited history
    pub fn new() -> Self {
        Self::with_max_levels(0)
    }

    /// Create a history that keeps at most `max_levels` entries
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            queue: Vec::new(),
            applied: 0,
            max_levels,
        }
    }

    /// Append an entry after the cursor, discarding any undone entries.
    ///
    /// Returns how many entries were discarded (truncated branch plus any
    /// entries dropped from the front to honour `max_levels`).
    pub fn record(&mut self, entry: HistoryEntry) -> usize {
        let mut discarded = self.queue.len() - self.applied;
        self.queue.truncate(self.applied);
        self.queue.push(entry);
        self.applied = self.queue.len();

        if self.max_levels > 0 && self.queue.len() > self.max_levels {
            let overflow = self.queue.len() - self.max_levels;
            self.queue.drain(..overflow);
            self.applied -= overflow;
            discarded += overflow;
        }

        discarded
    }

    /// Move the cursor back one entry and return the entry to revert
    pub fn step_back(&mut self) -> Option<&HistoryEntry> {
        if self.applied == 0 {
            return None;
        }
        self.applied -= 1;
        self.queue.get(self.applied)
    }

    /// Move the cursor forward one entry and return the entry to reapply
    pub fn step_forward(&mut self) -> Option<&HistoryEntry> {
        if self.applied >= self.queue.len() {
            return None;
        }
        self.applied += 1;
        self.queue.get(self.applied - 1)
    }

    /// Index of the last applied entry (`None` = at start)
    pub fn current(&self) -> Option<usize> {
        self.applied.checked_sub(1)
    }

    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    pub fn can_redo(&self) -> bool {
        self.applied < self.queue.len()
    }

    /// Total entries, applied and undone
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.applied
    }

    pub fn redo_levels(&self) -> usize {
        self.queue.len() - self.applied
    }

    /// Names of all entries in order
    pub fn entries(&self) -> Vec<&str> {
        self.queue.iter().map(|entry| entry.name.as_str()).collect()
    }

    /// Name of the entry the next undo would revert
    pub fn undo_description(&self) -> Option<&str> {
        self.current().map(|index| self.queue[index].name.as_str())
    }

    /// Name of the entry the next redo would reapply
    pub fn redo_description(&self) -> Option<&str> {
        self.queue.get(self.applied).map(|entry| entry.name.as_str())
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
