//! # Command Registry
//!
//! Generic named-command store with an undo/redo history. It knows nothing
//! about blocks or documents: a command is a name plus an `execute` function
//! producing a [`CommandExecute`] pair.
//!
//! ## Invocation
//!
//! 1. `execute(args)` builds the `redo`/`undo` pair (errors propagate, nothing
//!    is recorded)
//! 2. `redo` runs immediately
//! 3. Commands with `follow_queue = false` stop here
//! 4. Otherwise the entry is recorded, truncating any undone future
//!
//! `undo` and `redo` are themselves registered as `follow_queue = false`
//! commands, so they share the invocation path and key bindings.
//!
//! ## Lifecycle
//!
//! [`CommandRegistry::init`] runs every `on_init` hook and starts accepting
//! key input; [`CommandRegistry::dispose`] runs the collected teardowns.
//! Dropping the registry disposes it.
//!
//! Command bodies never hold the registry. A hook that needs to trigger a
//! command (the drag commit) defers it through the [`Dispatcher`]; the host
//! drains deferred work with [`CommandRegistry::flush_deferred`].

use std::cell::{Ref, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use tracing::{debug, warn};

use crate::history::{CommandExecute, History, HistoryEntry};
use crate::keyboard::{KeyChord, KeyInput};
use crate::{CommandError, DuplicatePolicy};

pub const UNDO: &str = "undo";
pub const REDO: &str = "redo";

pub type ExecuteFn<A> = Box<dyn FnMut(A) -> Result<CommandExecute, CommandError>>;
pub type Teardown = Box<dyn FnOnce()>;
pub type InitHook = Box<dyn FnMut(&Dispatcher) -> Option<Teardown>>;

/// Queue of command names to run once the current handler returns
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    pending: Rc<RefCell<VecDeque<String>>>,
}

impl Dispatcher {
    pub fn defer(&self, name: impl Into<String>) {
        self.pending.borrow_mut().push_back(name.into());
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_queued(&self, name: &str) -> bool {
        self.pending.borrow().iter().any(|queued| queued == name)
    }

    fn take_next(&self) -> Option<String> {
        self.pending.borrow_mut().pop_front()
    }

    fn clear(&self) {
        self.pending.borrow_mut().clear();
    }
}

/// Registration record for one command
pub struct CommandSpec<A> {
    name: String,
    execute: ExecuteFn<A>,
    follow_queue: bool,
    keyboard: Vec<KeyChord>,
    on_init: Option<InitHook>,
}

impl<A> CommandSpec<A> {
    pub fn new(
        name: impl Into<String>,
        execute: impl FnMut(A) -> Result<CommandExecute, CommandError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            execute: Box::new(execute),
            follow_queue: true,
            keyboard: Vec::new(),
            on_init: None,
        }
    }

    /// Whether invocations enter the history (default true)
    pub fn follow_queue(mut self, follow: bool) -> Self {
        self.follow_queue = follow;
        self
    }

    pub fn bind(mut self, chord: KeyChord) -> Self {
        self.keyboard.push(chord);
        self
    }

    /// Bind chords written as strings (`"ctrl+shift+z"`)
    pub fn keyboard(mut self, chords: &[&str]) -> Result<Self, CommandError> {
        for chord in chords {
            self.keyboard.push(chord.parse()?);
        }
        Ok(self)
    }

    pub fn on_init(
        mut self,
        hook: impl FnMut(&Dispatcher) -> Option<Teardown> + 'static,
    ) -> Self {
        self.on_init = Some(Box::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

pub struct CommandRegistry<A = ()> {
    commands: Vec<CommandSpec<A>>,
    index: HashMap<String, usize>,
    history: Rc<RefCell<History>>,
    policy: DuplicatePolicy,
    dispatcher: Dispatcher,
    teardowns: Vec<Teardown>,
    listening: bool,
}

impl<A> CommandRegistry<A> {
    /// Run all teardowns and stop accepting key input. Idempotent.
    pub fn dispose(&mut self) {
        if !self.listening {
            return;
        }
        self.listening = false;
        while let Some(teardown) = self.teardowns.pop() {
            teardown();
        }
        self.dispatcher.clear();
        debug!("command registry disposed");
    }

    pub fn is_initialized(&self) -> bool {
        self.listening
    }

    pub fn history(&self) -> Ref<'_, History> {
        self.history.borrow()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Registered command names in registration order
    pub fn command_names(&self) -> Vec<&str> {
        self.commands.iter().map(|command| command.name.as_str()).collect()
    }

    /// Every chord -> command binding, for hosts wiring their own listener
    pub fn bindings(&self) -> Vec<(KeyChord, String)> {
        self.commands
            .iter()
            .flat_map(|command| {
                command
                    .keyboard
                    .iter()
                    .map(move |chord| (chord.clone(), command.name.clone()))
            })
            .collect()
    }
}

impl<A: 'static> CommandRegistry<A> {
    /// Registry with unlimited history that rejects duplicate names
    pub fn new() -> Self {
        Self::with_settings(History::new(), DuplicatePolicy::Reject)
    }

    pub fn with_settings(history: History, policy: DuplicatePolicy) -> Self {
        let mut registry = Self {
            commands: Vec::new(),
            index: HashMap::new(),
            history: Rc::new(RefCell::new(history)),
            policy,
            dispatcher: Dispatcher::default(),
            teardowns: Vec::new(),
            listening: false,
        };
        registry.register_history_commands();
        registry
    }

    fn register_history_commands(&mut self) {
        let history = self.history.clone();
        let undo = CommandSpec::new(UNDO, move |_: A| {
            let history = history.clone();
            Ok(CommandExecute::new(move || {
                let undo = history
                    .borrow_mut()
                    .step_back()
                    .and_then(HistoryEntry::undo_action);
                if let Some(undo) = undo {
                    undo();
                }
            }))
        })
        .follow_queue(false)
        .bind(KeyChord::new("z").ctrl());

        let history = self.history.clone();
        let redo = CommandSpec::new(REDO, move |_: A| {
            let history = history.clone();
            Ok(CommandExecute::new(move || {
                let redo = history
                    .borrow_mut()
                    .step_forward()
                    .map(HistoryEntry::redo_action);
                if let Some(redo) = redo {
                    redo();
                }
            }))
        })
        .follow_queue(false)
        .bind(KeyChord::new("y").ctrl())
        .bind(KeyChord::new("z").ctrl().shift());

        for spec in [undo, redo] {
            self.insert(spec);
        }
    }

    fn insert(&mut self, mut spec: CommandSpec<A>) {
        if self.listening {
            self.run_init_hook(&mut spec);
        }
        match self.index.get(&spec.name) {
            Some(&slot) => self.commands[slot] = spec,
            None => {
                self.index.insert(spec.name.clone(), self.commands.len());
                self.commands.push(spec);
            }
        }
    }

    fn run_init_hook(&mut self, spec: &mut CommandSpec<A>) {
        if let Some(hook) = spec.on_init.as_mut() {
            if let Some(teardown) = hook(&self.dispatcher) {
                self.teardowns.push(teardown);
            }
        }
    }

    /// Register a command.
    ///
    /// A name that is already taken is rejected or replaced according to the
    /// registry's [`DuplicatePolicy`]. Registering after [`init`](Self::init)
    /// runs the command's `on_init` hook straight away.
    pub fn register(&mut self, spec: CommandSpec<A>) -> Result<(), CommandError> {
        if self.index.contains_key(&spec.name) {
            match self.policy {
                DuplicatePolicy::Reject => {
                    warn!(command = %spec.name, "refusing duplicate command registration");
                    return Err(CommandError::DuplicateCommand(spec.name));
                }
                DuplicatePolicy::Replace => {
                    warn!(command = %spec.name, "replacing previously registered command");
                }
            }
        }
        self.insert(spec);
        Ok(())
    }

    /// Invoke a command by name
    pub fn invoke(&mut self, name: &str, args: A) -> Result<(), CommandError> {
        let slot = *self
            .index
            .get(name)
            .ok_or_else(|| CommandError::UnknownCommand(name.to_string()))?;
        let command = &mut self.commands[slot];
        let follow_queue = command.follow_queue;
        debug!(command = name, follow_queue, "invoking command");

        let execute = (command.execute)(args)?;
        execute.redo();

        if !follow_queue {
            return Ok(());
        }
        if !execute.is_reversible() {
            warn!(command = name, "history-entering command has no undo");
        }

        let discarded = self
            .history
            .borrow_mut()
            .record(HistoryEntry::new(name, execute));
        if discarded > 0 {
            debug!(command = name, discarded, "discarded history entries");
        }
        Ok(())
    }

    /// Run every `on_init` hook and start accepting key input. Idempotent.
    pub fn init(&mut self) {
        if self.listening {
            return;
        }
        self.listening = true;
        for command in self.commands.iter_mut() {
            if let Some(hook) = command.on_init.as_mut() {
                if let Some(teardown) = hook(&self.dispatcher) {
                    self.teardowns.push(teardown);
                }
            }
        }
        debug!(
            commands = self.commands.len(),
            teardowns = self.teardowns.len(),
            "command registry initialised"
        );
    }
}

impl<A: Default + 'static> CommandRegistry<A> {
    /// Invoke a command with default arguments
    pub fn run(&mut self, name: &str) -> Result<(), CommandError> {
        self.invoke(name, A::default())
    }

    pub fn undo(&mut self) -> Result<(), CommandError> {
        self.run(UNDO)
    }

    pub fn redo(&mut self) -> Result<(), CommandError> {
        self.run(REDO)
    }

    /// Dispatch a key-down to the first command bound to its chord.
    ///
    /// Ignored before `init`, after `dispose`, and while typing in a text
    /// field. Returns whether a binding fired.
    pub fn handle_key(&mut self, input: &KeyInput) -> Result<bool, CommandError> {
        if !self.listening || input.in_text_field {
            return Ok(false);
        }
        let Some(name) = self
            .commands
            .iter()
            .find(|command| command.keyboard.contains(&input.chord))
            .map(|command| command.name.clone())
        else {
            return Ok(false);
        };

        debug!(chord = %input.chord, command = %name, "key binding matched");
        self.run(&name)?;
        self.flush_deferred()?;
        Ok(true)
    }

    /// Run commands deferred by hooks. Returns how many ran.
    ///
    /// The first failure stops the flush and drops the rest of the queue.
    pub fn flush_deferred(&mut self) -> Result<usize, CommandError> {
        let mut ran = 0;
        while let Some(name) = self.dispatcher.take_next() {
            if let Err(err) = self.run(&name) {
                let dropped = self.dispatcher.pending();
                self.dispatcher.clear();
                warn!(command = %name, dropped, "deferred command failed");
                return Err(err);
            }
            ran += 1;
        }
        Ok(ran)
    }
}

impl<A: 'static> Default for CommandRegistry<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Drop for CommandRegistry<A> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Command that appends `value` to a shared log, undo pops it
    fn push_command(name: &str, log: &Rc<RefCell<Vec<i32>>>, value: i32) -> CommandSpec<()> {
        let log = log.clone();
        CommandSpec::new(name, move |_| {
            let (redo_log, undo_log) = (log.clone(), log.clone());
            Ok(CommandExecute::new(move || redo_log.borrow_mut().push(value))
                .with_undo(move || {
                    undo_log.borrow_mut().pop();
                }))
        })
    }

    fn registry_with(log: &Rc<RefCell<Vec<i32>>>) -> CommandRegistry<()> {
        let mut registry = CommandRegistry::new();
        registry.register(push_command("a", log, 1)).unwrap();
        registry.register(push_command("b", log, 2)).unwrap();
        registry.register(push_command("c", log, 3)).unwrap();
        registry
    }

    #[test]
    fn test_builtin_commands_registered() {
        let registry: CommandRegistry = CommandRegistry::new();
        assert_eq!(registry.command_names(), vec![UNDO, REDO]);
        let bound: Vec<String> = registry
            .bindings()
            .into_iter()
            .map(|(chord, name)| format!("{chord}={name}"))
            .collect();
        assert_eq!(bound, vec!["ctrl+z=undo", "ctrl+y=redo", "ctrl+shift+z=redo"]);
    }

    #[test]
    fn test_branch_truncation() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = registry_with(&log);

        registry.run("a").unwrap();
        registry.run("b").unwrap();
        registry.undo().unwrap();
        registry.run("c").unwrap();

        assert_eq!(registry.history().entries(), vec!["a", "c"]);
        assert_eq!(*log.borrow(), vec![1, 3]);

        registry.redo().unwrap();
        assert_eq!(*log.borrow(), vec![1, 3]);
        assert_eq!(registry.history().current(), Some(1));
    }

    #[test]
    fn test_undo_redo_never_enter_history() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = registry_with(&log);
        registry.run("a").unwrap();

        for _ in 0..5 {
            registry.undo().unwrap();
        }
        for _ in 0..5 {
            registry.redo().unwrap();
        }

        assert_eq!(registry.history().len(), 1);
        assert_eq!(*log.borrow(), vec![1]);
    }

    #[test]
    fn test_follow_queue_false_runs_without_recording() {
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let mut registry = CommandRegistry::new();
        registry
            .register(
                CommandSpec::new("ping", move |_: ()| {
                    let counter = counter.clone();
                    Ok(CommandExecute::new(move || counter.set(counter.get() + 1)))
                })
                .follow_queue(false),
            )
            .unwrap();

        registry.run("ping").unwrap();
        registry.run("ping").unwrap();
        assert_eq!(hits.get(), 2);
        assert!(registry.history().is_empty());
    }

    #[test]
    fn test_unknown_command() {
        let mut registry: CommandRegistry = CommandRegistry::new();
        assert_eq!(
            registry.run("nope"),
            Err(CommandError::UnknownCommand("nope".to_string()))
        );
    }

    #[test]
    fn test_failed_execute_records_nothing() {
        let mut registry = CommandRegistry::new();
        registry
            .register(CommandSpec::new("broken", |_: ()| {
                Err(CommandError::failed("broken", "no target"))
            }))
            .unwrap();

        assert!(matches!(
            registry.run("broken"),
            Err(CommandError::ExecuteFailed { .. })
        ));
        assert!(registry.history().is_empty());
    }

    #[test]
    fn test_duplicate_rejected_by_default() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = registry_with(&log);
        let result = registry.register(push_command("a", &log, 10));
        assert_eq!(result, Err(CommandError::DuplicateCommand("a".to_string())));

        registry.run("a").unwrap();
        assert_eq!(*log.borrow(), vec![1]);
    }

    #[test]
    fn test_duplicate_replaced_when_configured() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = CommandRegistry::with_settings(History::new(), DuplicatePolicy::Replace);
        registry.register(push_command("a", &log, 1)).unwrap();
        registry.register(push_command("a", &log, 10)).unwrap();

        registry.run("a").unwrap();
        assert_eq!(*log.borrow(), vec![10]);
        assert_eq!(registry.command_names(), vec![UNDO, REDO, "a"]);
    }

    #[test]
    fn test_keys_only_dispatch_while_initialised() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = CommandRegistry::new();
        registry
            .register(push_command("a", &log, 1).keyboard(&["ctrl+d"]).unwrap())
            .unwrap();
        let key = KeyInput::new(KeyChord::new("d").ctrl());

        assert!(!registry.handle_key(&key).unwrap());
        registry.init();
        assert!(registry.handle_key(&key).unwrap());
        assert!(!registry.handle_key(&key.clone().in_text_field()).unwrap());
        assert!(registry
            .handle_key(&KeyInput::new(KeyChord::new("z").ctrl()))
            .unwrap());
        registry.dispose();
        assert!(!registry.handle_key(&key).unwrap());

        assert!(log.borrow().is_empty());
        assert_eq!(registry.history().redo_levels(), 1);
    }

    #[test]
    fn test_init_hooks_and_teardown() {
        let torn_down = Rc::new(Cell::new(0));
        let flag = torn_down.clone();
        let mut registry = CommandRegistry::new();
        registry
            .register(
                CommandSpec::new("hooked", |_: ()| Ok(CommandExecute::new(|| {})))
                    .on_init(move |_| {
                        let flag = flag.clone();
                        Some(Box::new(move || flag.set(flag.get() + 1)) as Teardown)
                    }),
            )
            .unwrap();

        registry.init();
        registry.init();
        registry.dispose();
        registry.dispose();
        assert_eq!(torn_down.get(), 1);
    }

    #[test]
    fn test_drop_disposes() {
        let torn_down = Rc::new(Cell::new(false));
        let flag = torn_down.clone();
        {
            let mut registry = CommandRegistry::new();
            registry
                .register(
                    CommandSpec::new("hooked", |_: ()| Ok(CommandExecute::new(|| {})))
                        .on_init(move |_| {
                            let flag = flag.clone();
                            Some(Box::new(move || flag.set(true)) as Teardown)
                        }),
                )
                .unwrap();
            registry.init();
        }
        assert!(torn_down.get());
    }

    #[test]
    fn test_deferred_commands_run_on_flush() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = registry_with(&log);
        registry.init();

        registry.dispatcher().defer("b");
        registry.dispatcher().defer("c");
        assert!(log.borrow().is_empty());

        assert_eq!(registry.flush_deferred().unwrap(), 2);
        assert_eq!(*log.borrow(), vec![2, 3]);
        assert_eq!(registry.history().entries(), vec!["b", "c"]);
    }

    #[test]
    fn test_failed_flush_drops_remaining_queue() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = registry_with(&log);
        registry
            .register(CommandSpec::new("broken", |_: ()| {
                Err(CommandError::failed("broken", "no target"))
            }))
            .unwrap();

        registry.dispatcher().defer("a");
        registry.dispatcher().defer("broken");
        registry.dispatcher().defer("c");
        assert!(registry.dispatcher().is_queued("c"));

        assert!(registry.flush_deferred().is_err());
        assert_eq!(registry.dispatcher().pending(), 0);
        assert_eq!(registry.flush_deferred().unwrap(), 0);
        assert_eq!(*log.borrow(), vec![1]);
        assert_eq!(registry.history().entries(), vec!["a"]);
    }

    #[test]
    fn test_register_after_init_runs_hook() {
        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();
        let mut registry = CommandRegistry::new();
        registry.init();
        registry
            .register(
                CommandSpec::new("late", |_: ()| Ok(CommandExecute::new(|| {}))).on_init(
                    move |_| {
                        flag.set(true);
                        None
                    },
                ),
            )
            .unwrap();
        assert!(ran.get());
    }
}
