//! Synchronous callback registry used for change notifications.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<E> = Rc<dyn Fn(&E)>;

/// Callbacks are invoked in subscription order on the emitting thread.
///
/// `emit` works on a copy of the callback list, so a callback may subscribe,
/// unsubscribe or trigger a nested `emit` without a `RefCell` conflict.
pub struct Observers<E> {
    next_id: Cell<u64>,
    callbacks: RefCell<Vec<(SubscriptionId, Callback<E>)>>,
}

impl<E> Observers<E> {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            callbacks: RefCell::new(Vec::new()),
        }
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&E) + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.callbacks.borrow_mut().push((id, Rc::new(callback)));
        id
    }

    /// Returns `false` if `id` was not (or no longer) subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut callbacks = self.callbacks.borrow_mut();
        let before = callbacks.len();
        callbacks.retain(|(sid, _)| *sid != id);
        callbacks.len() != before
    }

    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Callback<E>> = self
            .callbacks
            .borrow()
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();

        for cb in snapshot {
            cb(event);
        }
    }
}

impl<E> Default for Observers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Observers<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("subscribers", &self.callbacks.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivers_in_order_until_unsubscribed() {
        let observers = Observers::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let a = {
            let seen = seen.clone();
            observers.subscribe(move |v| seen.borrow_mut().push(("a", *v)))
        };
        {
            let seen = seen.clone();
            observers.subscribe(move |v| seen.borrow_mut().push(("b", *v)));
        }

        observers.emit(&1);
        assert!(observers.unsubscribe(a));
        assert!(!observers.unsubscribe(a));
        observers.emit(&2);

        assert_eq!(*seen.borrow(), vec![("a", 1), ("b", 1), ("b", 2)]);
    }

    #[test]
    fn callback_may_subscribe_during_emit() {
        let observers = Rc::new(Observers::<()>::new());
        let late_calls = Rc::new(Cell::new(0));
        {
            let inner = observers.clone();
            let late_calls = late_calls.clone();
            observers.subscribe(move |_| {
                let late_calls = late_calls.clone();
                inner.subscribe(move |_| late_calls.set(late_calls.get() + 1));
            });
        }

        // The late subscriber misses the emit that added it.
        observers.emit(&());
        assert_eq!(late_calls.get(), 0);

        observers.emit(&());
        assert_eq!(late_calls.get(), 1);
        assert_eq!(format!("{observers:?}"), "Observers { subscribers: 3 }");
    }
}
