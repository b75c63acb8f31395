//! Observable state container.
//!
//! A [`Store`] owns one piece of UI state for the lifetime of a session.
//! Components receive a clone of the store (clones share the same state)
//! instead of reaching for globals. Transitions go through [`Store::update`],
//! which notifies every subscriber with the new state afterwards.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Handle returned by [`Store::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl From<u64> for SubscriptionId {
    fn from(raw: u64) -> Self {
        SubscriptionId(raw)
    }
}

impl From<SubscriptionId> for u64 {
    fn from(id: SubscriptionId) -> Self {
        id.0
    }
}

type Listener<S> = Rc<dyn Fn(&S)>;

struct Inner<S> {
    state: RefCell<S>,
    listeners: RefCell<Vec<(SubscriptionId, Listener<S>)>>,
    next_id: Cell<u64>,
}

pub struct Store<S> {
    inner: Rc<Inner<S>>,
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.inner.state.borrow())
            .field("listeners", &self.inner.listeners.borrow().len())
            .finish()
    }
}

impl<S: Default + Clone> Default for Store<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: Clone> Store<S> {
    pub fn new(initial: S) -> Self {
        Self {
            inner: Rc::new(Inner {
                state: RefCell::new(initial),
                listeners: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Snapshot of the current state.
    pub fn get_state(&self) -> S {
        self.inner.state.borrow().clone()
    }

    /// Read the current state without cloning it.
    pub fn with_state<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.inner.state.borrow())
    }

    /// Apply a transition, then notify subscribers.
    ///
    /// Subscribers run after the borrow is released, so they may read the
    /// store or start another update.
    pub fn update(&self, f: impl FnOnce(&mut S)) {
        {
            let mut state = self.inner.state.borrow_mut();
            f(&mut state);
        }
        self.notify();
    }

    /// Replace the state wholesale.
    pub fn set(&self, state: S) {
        self.update(|current| *current = state);
    }

    pub fn subscribe(&self, listener: impl Fn(&S) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));
        id
    }

    /// Returns `false` if the subscription was already removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.inner.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    fn notify(&self) {
        let listeners: Vec<Listener<S>> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        if listeners.is_empty() {
            return;
        }
        let snapshot = self.get_state();
        for listener in listeners {
            listener(&snapshot);
        }
    }
}
