//=========================================================================
// Signal
//=========================================================================
//
// Typed observer list for one notification kind.
//
// Architecture:
//   subscribe(FnMut(&T)) → Vec<(SubscriptionId, observer)>
//                                 ↓
//   emit(&T) ──snapshot──> call each observer in subscription order
//
// Emission iterates a snapshot, so observers may subscribe, unsubscribe,
// or emit on other signals of the same Context while being notified.
// An observer that is already running is skipped if re-entered.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

//=== SubscriptionId ======================================================

/// Identifies one observer registration on a [`Signal`].
///
/// Ids are unique across all signals, so a context can route an
/// unsubscribe to whichever signal owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

static NEXT_SUBSCRIPTION: AtomicU64 = AtomicU64::new(0);

//=== Signal ==============================================================

type Observer<T> = Rc<RefCell<dyn FnMut(&T)>>;

/// Observer list with typed payloads.
pub struct Signal<T> {
    observers: RefCell<Vec<(SubscriptionId, Observer<T>)>>,
}

impl<T> Signal<T> {
    /// Creates an empty signal.
    pub fn new() -> Self {
        Self {
            observers: RefCell::new(Vec::new()),
        }
    }

    /// Adds an observer; it is notified on every subsequent `emit`.
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: FnMut(&T) + 'static,
    {
        let id = SubscriptionId(NEXT_SUBSCRIPTION.fetch_add(1, Ordering::Relaxed));

        let observer: Observer<T> = Rc::new(RefCell::new(observer));
        self.observers.borrow_mut().push((id, observer));
        id
    }

    /// Removes an observer. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|(sid, _)| *sid != id);
        observers.len() != before
    }

    /// Notifies every observer in subscription order.
    pub fn emit(&self, payload: &T) {
        let snapshot: Vec<Observer<T>> = self
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| Rc::clone(observer))
            .collect();

        for observer in snapshot {
            if let Ok(mut observer) = observer.try_borrow_mut() {
                (&mut *observer)(payload);
            }
        }
    }

    /// Number of registered observers.
    pub fn len(&self) -> usize {
        self.observers.borrow().len()
    }

    /// Returns `true` if nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn emit_notifies_in_subscription_order() {
        let signal = Signal::<u32>::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l = Rc::clone(&log);
        signal.subscribe(move |v| l.borrow_mut().push(("a", *v)));
        let l = Rc::clone(&log);
        signal.subscribe(move |v| l.borrow_mut().push(("b", *v)));

        signal.emit(&7);

        assert_eq!(*log.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let signal = Signal::<()>::new();
        let count = Rc::new(Cell::new(0));

        let c = Rc::clone(&count);
        let id = signal.subscribe(move |_| c.set(c.get() + 1));

        signal.emit(&());
        assert!(signal.unsubscribe(id));
        signal.emit(&());

        assert_eq!(count.get(), 1);
        assert!(signal.is_empty());
    }

    #[test]
    fn unsubscribe_unknown_id_returns_false() {
        let signal = Signal::<()>::new();
        let id = signal.subscribe(|_| {});
        assert!(signal.unsubscribe(id));
        assert!(!signal.unsubscribe(id));
    }

    #[test]
    fn observer_may_subscribe_during_emit() {
        let signal = Rc::new(Signal::<()>::new());
        let inner = Rc::clone(&signal);

        signal.subscribe(move |_| {
            inner.subscribe(|_| {});
        });

        signal.emit(&());
        assert_eq!(signal.len(), 2);
    }

    #[test]
    fn reentrant_emit_skips_running_observer() {
        let signal = Rc::new(Signal::<()>::new());
        let count = Rc::new(Cell::new(0));

        let inner = Rc::clone(&signal);
        let c = Rc::clone(&count);
        signal.subscribe(move |_| {
            c.set(c.get() + 1);
            inner.emit(&());
        });

        signal.emit(&());
        assert_eq!(count.get(), 1);
    }
}
