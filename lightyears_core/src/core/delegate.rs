//! Observable events with weakly held listeners
//!
//! A [`Delegate`] keeps its bindings in a slotmap keyed by [`BindingId`].
//! Listener bindings hold only a `Weak` reference: once the listener is
//! dropped the binding reports itself expired and is pruned on the next
//! broadcast, so a destroyed subscriber is never dereferenced.

use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::trace;

new_key_type! {
    /// Stable handle for a delegate binding
    pub struct BindingId;
}

/// Returns `false` once the binding has expired
type Callback<A> = Box<dyn FnMut(&A) -> bool>;

pub struct Delegate<A> {
    bindings: SlotMap<BindingId, Callback<A>>,
}

impl<A: 'static> Delegate<A> {
    pub fn new() -> Self {
        Self {
            bindings: SlotMap::with_key(),
        }
    }

    /// Bind a method-like callback on a weakly held listener.
    pub fn bind<L: 'static>(
        &mut self,
        listener: &Rc<RefCell<L>>,
        mut callback: impl FnMut(&mut L, &A) + 'static,
    ) -> BindingId {
        let weak = Rc::downgrade(listener);
        self.bindings.insert(Box::new(move |args| match weak.upgrade() {
            Some(listener) => {
                match listener.try_borrow_mut() {
                    Ok(mut listener) => callback(&mut listener, args),
                    // Re-entrant broadcast into a listener that is already running
                    Err(_) => trace!("Skipping busy delegate listener"),
                }
                true
            }
            None => false,
        }))
    }

    /// Bind a free closure that lives as long as the binding.
    pub fn bind_fn(&mut self, mut callback: impl FnMut(&A) + 'static) -> BindingId {
        self.bindings.insert(Box::new(move |args| {
            callback(args);
            true
        }))
    }

    pub fn unbind(&mut self, id: BindingId) -> bool {
        self.bindings.remove(id).is_some()
    }

    /// Invoke every live binding, dropping the expired ones.
    pub fn broadcast(&mut self, args: &A) {
        let before = self.bindings.len();
        self.bindings.retain(|_, callback| callback(args));
        let expired = before - self.bindings.len();
        if expired > 0 {
            trace!("Pruned {} expired delegate binding(s)", expired);
        }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }
}

impl<A: 'static> Default for Delegate<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for Delegate<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delegate")
            .field("bindings", &self.bindings.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        total: i32,
    }

    #[test]
    fn test_broadcast_reaches_live_listener() {
        let mut delegate = Delegate::<i32>::new();
        let counter = Rc::new(RefCell::new(Counter::default()));

        delegate.bind(&counter, |counter, amount| counter.total += *amount);
        delegate.broadcast(&3);
        delegate.broadcast(&4);

        assert_eq!(counter.borrow().total, 7);
        assert_eq!(delegate.len(), 1);
    }

    #[test]
    fn test_dropped_listener_is_skipped_and_pruned() {
        let mut delegate = Delegate::<i32>::new();
        let counter = Rc::new(RefCell::new(Counter::default()));
        delegate.bind(&counter, |counter, amount| counter.total += *amount);

        drop(counter);
        delegate.broadcast(&1);

        assert!(delegate.is_empty());
    }

    #[test]
    fn test_unbind_and_free_closure() {
        let mut delegate = Delegate::<i32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let id = delegate.bind_fn(move |value| sink.borrow_mut().push(*value));

        delegate.broadcast(&1);
        assert!(delegate.unbind(id));
        assert!(!delegate.unbind(id));
        delegate.broadcast(&2);

        assert_eq!(*seen.borrow(), vec![1]);
    }

    #[test]
    fn test_busy_listener_is_skipped_not_dropped() {
        let mut delegate = Delegate::<i32>::new();
        let counter = Rc::new(RefCell::new(Counter::default()));
        delegate.bind(&counter, |counter, amount| counter.total += *amount);

        {
            let _held = counter.borrow_mut();
            delegate.broadcast(&5);
        }
        delegate.broadcast(&1);

        assert_eq!(counter.borrow().total, 1);
        assert_eq!(delegate.len(), 1);
    }
}
