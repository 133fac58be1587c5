// ============================================================================
// reactive-core - Type Definitions
// Dep, target-map keys, and the value cell shared by Signal/Computed.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::core::constants::MAX_MARKER_BITS;
use crate::reactivity::effect::ReactiveEffect;

// =============================================================================
// TRACK / TRIGGER OPERATION KINDS
// =============================================================================

/// The kind of read that produced a `track` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackOp {
    Get,
    Has,
    Iterate,
}

/// The kind of write that produced a `trigger` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOp {
    Set,
    Add,
    Delete,
    Clear,
}

/// A slot key within one target's dep table: either a user key or one of the
/// two process-wide sentinels used for enumeration-order dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key<K> {
    User(K),
    /// Dependency on the enumeration order of a collection's values.
    Iterate,
    /// Dependency on the enumeration order of a keyed collection's keys.
    MapKeyIterate,
    /// Dependency on a sequence target's length.
    Length,
}

// =============================================================================
// DEP (C1)
// =============================================================================

/// The set of effects that observed one (target, key) slot, plus the two
/// recursion-depth bitmasks used for incremental re-subscription.
///
/// Effects are held weakly: a Dep never keeps an effect alive by itself,
/// mirroring the recommended reference-counted-with-weak-back-edges layout.
pub struct Dep {
    effects: RefCell<Vec<Weak<ReactiveEffect>>>,
    w: Cell<u32>,
    n: Cell<u32>,
}

impl Dep {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            effects: RefCell::new(Vec::new()),
            w: Cell::new(0),
            n: Cell::new(0),
        })
    }

    /// Build a Dep seeded from an existing effect list, used by trigger's
    /// multi-dep merge. Duplicate effects (by pointer identity) are folded.
    pub fn from_effects(effects: impl IntoIterator<Item = Weak<ReactiveEffect>>) -> Rc<Self> {
        let dep = Self::new();
        {
            let mut list = dep.effects.borrow_mut();
            for weak in effects {
                let Some(rc) = weak.upgrade() else { continue };
                let already = list.iter().any(|w| {
                    w.upgrade()
                        .is_some_and(|existing| Rc::ptr_eq(&existing, &rc))
                });
                if !already {
                    list.push(Rc::downgrade(&rc));
                }
            }
        }
        dep
    }

    pub fn add(&self, effect: &Rc<ReactiveEffect>) {
        if self.has(effect) {
            return;
        }
        self.effects.borrow_mut().push(Rc::downgrade(effect));
    }

    pub fn delete(&self, effect: &Rc<ReactiveEffect>) {
        self.effects.borrow_mut().retain(|w| {
            w.upgrade()
                .is_none_or(|existing| !Rc::ptr_eq(&existing, effect))
        });
    }

    pub fn has(&self, effect: &Rc<ReactiveEffect>) -> bool {
        self.effects
            .borrow()
            .iter()
            .any(|w| w.upgrade().is_some_and(|existing| Rc::ptr_eq(&existing, effect)))
    }

    pub fn is_empty(&self) -> bool {
        self.effects.borrow().iter().all(|w| w.strong_count() == 0)
    }

    /// Snapshot the currently-live effects into a stable, owned sequence.
    /// Called before firing so that an effect removing itself mid-iteration
    /// cannot skip or double-fire a sibling.
    pub fn snapshot(&self) -> Vec<Rc<ReactiveEffect>> {
        self.effects
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .collect()
    }

    pub fn was_tracked(&self, bit: u32) -> bool {
        self.w.get() & bit != 0
    }

    pub fn new_tracked(&self, bit: u32) -> bool {
        self.n.get() & bit != 0
    }

    pub fn mark_was_tracked(&self, bit: u32) {
        self.w.set(self.w.get() | bit);
    }

    pub fn mark_new_tracked(&self, bit: u32) {
        self.n.set(self.n.get() | bit);
    }

    /// Clear the w/n bits for one depth once that depth's run has finished.
    pub fn clear_depth(&self, bit: u32) {
        self.w.set(self.w.get() & !bit);
        self.n.set(self.n.get() & !bit);
    }

    #[cfg(test)]
    pub(crate) fn w_bits(&self) -> u32 {
        self.w.get()
    }

    #[cfg(test)]
    pub(crate) fn n_bits(&self) -> u32 {
        self.n.get()
    }
}

/// `trackOpBit` for a given nesting depth, valid only while `depth <=
/// MAX_MARKER_BITS` — callers beyond that ceiling must use full-cleanup mode
/// instead of asking for a bit.
pub fn track_op_bit(depth: u32) -> u32 {
    debug_assert!(depth <= MAX_MARKER_BITS);
    1 << depth
}

// =============================================================================
// SOURCE CELL (the data behind Signal<T> and Computed<T>'s memoized value)
// =============================================================================

/// Equality function type for comparing values before deciding whether a
/// write actually changed anything.
pub type EqualsFn<T> = fn(&T, &T) -> bool;

/// Default equality using `PartialEq`.
pub fn default_equals<T: PartialEq>(a: &T, b: &T) -> bool {
    a == b
}

/// A single reactive value cell: the payload plus the equality function used
/// to decide whether a `set` actually changed anything. Holds no dependency
/// state of its own — the owning primitive pairs this with a `Rc<Dep>`.
pub struct ValueCell<T> {
    value: RefCell<T>,
    equals: EqualsFn<T>,
}

impl<T> ValueCell<T> {
    pub fn new(value: T) -> Self
    where
        T: PartialEq,
    {
        Self::new_with_equals(value, default_equals)
    }

    pub fn new_with_equals(value: T, equals: EqualsFn<T>) -> Self {
        Self {
            value: RefCell::new(value),
            equals,
        }
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.value.borrow().clone()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }

    /// Replace the value, returning true if it changed per the equality fn.
    pub fn set(&self, value: T) -> bool {
        let changed = !(self.equals)(&self.value.borrow(), &value);
        if changed {
            *self.value.borrow_mut() = value;
        }
        changed
    }

    /// Mutate in place; the caller decides whether to treat this as a change
    /// (in-place mutation can't be compared against the prior value cheaply).
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.value.borrow_mut());
    }
}
