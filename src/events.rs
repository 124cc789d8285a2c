//! Change notification for local storage writes.
//!
//! DESIGN
//! ======
//! Two events per write: `changing` before the host store is touched, and
//! `changed` after it succeeded. A `changing` subscriber answers with a
//! [`ChangeDecision`]; if any subscriber answers `Cancel`, the write and the
//! `changed` event are skipped. Every subscriber still sees the event.
//!
//! Handlers run synchronously on the caller's stack. Panics are not caught and
//! unwind into `set_item`. The subscriber list is copied before dispatch so a
//! handler may subscribe, unsubscribe, or call back into the storage.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

/// Raised before a write. `old_value` is the best-effort decode of the value
/// being replaced; `None` when the key was missing or blank.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangingEvent {
    pub key: String,
    pub old_value: Option<Value>,
    pub new_value: Value,
}

/// Raised after a successful write.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangedEvent {
    pub key: String,
    pub old_value: Option<Value>,
    pub new_value: Value,
}

impl From<ChangingEvent> for ChangedEvent {
    fn from(event: ChangingEvent) -> Self {
        Self {
            key: event.key,
            old_value: event.old_value,
            new_value: event.new_value,
        }
    }
}

/// Answer of a `changing` subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChangeDecision {
    #[default]
    Continue,
    Cancel,
}

/// Handle returned by a subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type ChangingHandler = Rc<dyn Fn(&ChangingEvent) -> ChangeDecision>;
type ChangedHandler = Rc<dyn Fn(&ChangedEvent)>;

/// Subscriber registry for both events.
#[derive(Default)]
pub struct ChangeNotifier {
    next_id: Cell<u64>,
    changing: RefCell<Vec<(SubscriptionId, ChangingHandler)>>,
    changed: RefCell<Vec<(SubscriptionId, ChangedHandler)>>,
}

impl ChangeNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_changing<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&ChangingEvent) -> ChangeDecision + 'static,
    {
        let id = self.allocate_id();
        self.changing.borrow_mut().push((id, Rc::new(handler)));
        id
    }

    pub fn on_changed<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&ChangedEvent) + 'static,
    {
        let id = self.allocate_id();
        self.changed.borrow_mut().push((id, Rc::new(handler)));
        id
    }

    /// Remove a subscription from either event. Returns `false` if it was
    /// already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut changing = self.changing.borrow_mut();
        let before = changing.len();
        changing.retain(|(sub, _)| *sub != id);
        if changing.len() != before {
            return true;
        }
        drop(changing);

        let mut changed = self.changed.borrow_mut();
        let before = changed.len();
        changed.retain(|(sub, _)| *sub != id);
        changed.len() != before
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.changing.borrow().len() + self.changed.borrow().len()
    }

    pub(crate) fn raise_changing(&self, event: &ChangingEvent) -> ChangeDecision {
        let handlers: Vec<ChangingHandler> = self
            .changing
            .borrow()
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();

        let mut decision = ChangeDecision::Continue;
        for handler in handlers {
            if handler(event) == ChangeDecision::Cancel {
                decision = ChangeDecision::Cancel;
            }
        }
        decision
    }

    pub(crate) fn raise_changed(&self, event: &ChangedEvent) {
        let handlers: Vec<ChangedHandler> = self
            .changed
            .borrow()
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();

        for handler in handlers {
            handler(event);
        }
    }

    fn allocate_id(&self) -> SubscriptionId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        SubscriptionId(id)
    }
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("changing", &self.changing.borrow().len())
            .field("changed", &self.changed.borrow().len())
            .finish()
    }
}

#[cfg(test)]
#[path = "events_test.rs"]
mod tests;
