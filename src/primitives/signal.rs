// ============================================================================
// reactive-core - Signal Primitive
// The writable reactive value that every derived/effect ultimately reads.
// ============================================================================

use std::rc::Rc;

use crate::core::types::{default_equals, Dep, EqualsFn, TrackOp, TriggerOp, ValueCell};
use crate::reactivity::tracking::{track, trigger_one};

struct SignalInner<T> {
    cell: ValueCell<T>,
    dep: Rc<Dep>,
}

/// A single reactive value. Pairs a [`ValueCell`] (the payload and its
/// equality function) with its own `Dep` directly — signals don't go
/// through a generic per-property [`crate::reactivity::target_map::TargetMap`]
/// the way object-shaped collections do, since a signal has exactly one slot.
///
/// # Examples
///
/// ```
/// use reactive_core::signal;
///
/// let count = signal(0);
/// assert_eq!(count.get(), 0);
/// count.set(5);
/// assert_eq!(count.get(), 5);
/// ```
pub struct Signal<T> {
    inner: Rc<SignalInner<T>>,
}

impl<T> Signal<T> {
    pub fn new(value: T) -> Self
    where
        T: PartialEq,
    {
        Self::new_with_equals(value, default_equals)
    }

    pub fn new_with_equals(value: T, equals: EqualsFn<T>) -> Self {
        Self {
            inner: Rc::new(SignalInner {
                cell: ValueCell::new_with_equals(value, equals),
                dep: Dep::new(),
            }),
        }
    }

    /// Read the value, subscribing the currently-running effect (if any).
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        track(&self.inner.dep, TrackOp::Get);
        self.inner.cell.get()
    }

    /// Read the value via a closure, avoiding a clone.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        track(&self.inner.dep, TrackOp::Get);
        self.inner.cell.with(f)
    }

    /// Read the value without subscribing anything — the untracked
    /// equivalent of `get()`.
    pub fn peek(&self) -> T
    where
        T: Clone,
    {
        self.inner.cell.get()
    }

    /// Replace the value. Fires every subscriber only if the new value
    /// differs from the old one under this signal's equality function.
    /// Returns whether it changed.
    pub fn set(&self, value: T) -> bool {
        let changed = self.inner.cell.set(value);
        if changed {
            trigger_one(&self.inner.dep, TriggerOp::Set);
        }
        changed
    }

    /// Mutate the value in place, then unconditionally notify subscribers
    /// (in-place mutation can't be compared against the prior value, so
    /// there's no equality check to skip on).
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.inner.cell.update(f);
        trigger_one(&self.inner.dep, TriggerOp::Set);
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug + Clone> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal").field("value", &self.get()).finish()
    }
}

/// Create a reactive signal using `PartialEq` to decide whether a write
/// changed anything.
///
/// # Examples
///
/// ```
/// use reactive_core::signal;
///
/// let name = signal(String::from("hello"));
/// assert_eq!(name.get(), "hello");
/// ```
pub fn signal<T: PartialEq>(value: T) -> Signal<T> {
    Signal::new(value)
}

/// Create a reactive signal with a custom equality function.
///
/// # Examples
///
/// ```
/// use reactive_core::primitives::signal::signal_with_equals;
///
/// let always_notify = signal_with_equals(0, |_: &i32, _: &i32| false);
/// assert!(always_notify.set(0));
/// ```
pub fn signal_with_equals<T>(value: T, equals: EqualsFn<T>) -> Signal<T> {
    Signal::new_with_equals(value, equals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactivity::effect::effect;
    use std::cell::RefCell;

    #[test]
    fn get_set_round_trip() {
        let s = signal(1);
        assert_eq!(s.get(), 1);
        assert!(s.set(2));
        assert_eq!(s.get(), 2);
    }

    #[test]
    fn set_same_value_reports_unchanged() {
        let s = signal(1);
        assert!(!s.set(1));
    }

    #[test]
    fn update_mutates_in_place() {
        let s = signal(vec![1, 2, 3]);
        s.update(|v| v.push(4));
        assert_eq!(s.get(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn effect_reruns_on_change_but_not_on_noop_set() {
        let s = signal(1);
        let runs = Rc::new(RefCell::new(0));
        let runs2 = Rc::clone(&runs);
        let s2 = s.clone();
        let _e = effect(move || {
            s2.get();
            *runs2.borrow_mut() += 1;
        });
        assert_eq!(*runs.borrow(), 1);

        s.set(1);
        assert_eq!(*runs.borrow(), 1, "unchanged write does not retrigger");

        s.set(2);
        assert_eq!(*runs.borrow(), 2);
    }

    #[test]
    fn peek_does_not_subscribe() {
        let s = signal(1);
        let runs = Rc::new(RefCell::new(0));
        let runs2 = Rc::clone(&runs);
        let s2 = s.clone();
        let _e = effect(move || {
            s2.peek();
            *runs2.borrow_mut() += 1;
        });
        assert_eq!(*runs.borrow(), 1);

        s.set(2);
        assert_eq!(*runs.borrow(), 1, "peek() must not create a dependency");
    }

    #[test]
    fn always_notify_equals_fires_on_same_value() {
        let s = signal_with_equals(0, |_: &i32, _: &i32| false);
        assert!(s.set(0));
        assert!(s.set(0));
    }
}
