//! Observer lists for editor notifications.
//!
//! An [`EventChannel`] is a cheap handle; clones share one listener list.
//! Everything runs on the UI thread, so listeners are plain `Rc<dyn Fn()>`.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Handle returned by [`EventChannel::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
struct ChannelInner {
    next_id: u64,
    listeners: Vec<(ListenerId, Rc<dyn Fn()>)>,
}

#[derive(Clone, Default)]
pub struct EventChannel {
    inner: Rc<RefCell<ChannelInner>>,
}

impl EventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl Fn() + 'static) -> ListenerId {
        let mut inner = self.inner.borrow_mut();
        let id = ListenerId(inner.next_id);
        inner.next_id += 1;
        inner.listeners.push((id, Rc::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not subscribed.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.listeners.len();
        inner.listeners.retain(|(listener_id, _)| *listener_id != id);
        inner.listeners.len() != before
    }

    /// Call every listener in subscription order.
    ///
    /// Listeners may subscribe or unsubscribe while the event is delivered;
    /// changes take effect from the next emit.
    pub fn emit(&self) {
        let listeners: Vec<Rc<dyn Fn()>> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener();
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}

impl fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Drag lifecycle signals shared by the pointer engines and the `drag` command
#[derive(Debug, Clone, Default)]
pub struct DragSignals {
    pub start: EventChannel,
    pub end: EventChannel,
}

impl DragSignals {
    pub fn new() -> Self {
        Self::default()
    }
}
