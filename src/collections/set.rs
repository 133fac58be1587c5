// ============================================================================
// reactive-core - ReactiveSet
// A keyed-collection target (§3/§4.4, §13) with no separate value payload:
// membership doubles as both key and value.
// ============================================================================

use std::cell::RefCell;
use std::collections::HashSet;
use std::hash::Hash;
use std::rc::Rc;

use crate::core::types::{Dep, Key, TrackOp, TriggerOp};
use crate::reactivity::target_map::{TargetKind, TargetMap};
use crate::reactivity::tracking::{track, trigger, trigger_one};

struct Inner<T> {
    data: RefCell<HashSet<T>>,
    targets: RefCell<TargetMap<T>>,
    size_dep: Rc<Dep>,
}

/// A hash set whose membership checks, iteration, and size are each tracked
/// independently, mirroring [`crate::collections::ReactiveMap`].
pub struct ReactiveSet<T> {
    inner: Rc<Inner<T>>,
}

impl<T: Eq + Hash + Clone> ReactiveSet<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Inner {
                data: RefCell::new(HashSet::new()),
                targets: RefCell::new(TargetMap::new(TargetKind::KeyedCollection)),
                size_dep: Dep::new(),
            }),
        }
    }

    pub fn contains(&self, value: &T) -> bool {
        let present = self.inner.data.borrow().contains(value);
        let dep_key = if present { Key::User(value.clone()) } else { Key::Iterate };
        let dep = self.inner.targets.borrow_mut().get_or_create(dep_key);
        track(&dep, TrackOp::Has);
        present
    }

    pub fn len(&self) -> usize {
        track(&self.inner.size_dep, TrackOp::Get);
        self.inner.data.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_vec(&self) -> Vec<T> {
        let dep = self.inner.targets.borrow_mut().get_or_create(Key::Iterate);
        track(&dep, TrackOp::Iterate);
        self.inner.data.borrow().iter().cloned().collect()
    }

    /// Returns whether `value` was newly inserted. A newly-inserted member
    /// fires ADD (`Iterate` and `MapKeyIterate`) plus the size Dep; a
    /// re-insertion of an already-present value is a no-op (a set has no
    /// SET analogue — membership either exists or it doesn't).
    pub fn insert(&self, value: T) -> bool {
        let inserted = self.inner.data.borrow_mut().insert(value.clone());
        if inserted {
            let targets = self.inner.targets.borrow();
            let deps = targets.deps_for(&Key::User(value), TriggerOp::Add);
            drop(targets);
            trigger(&deps, TriggerOp::Add);
            trigger_one(&self.inner.size_dep, TriggerOp::Add);
        }
        inserted
    }

    pub fn remove(&self, value: &T) -> bool {
        let removed = self.inner.data.borrow_mut().remove(value);
        if removed {
            let targets = self.inner.targets.borrow();
            let deps = targets.deps_for(&Key::User(value.clone()), TriggerOp::Delete);
            drop(targets);
            trigger(&deps, TriggerOp::Delete);
            trigger_one(&self.inner.size_dep, TriggerOp::Delete);
        }
        removed
    }

    pub fn clear(&self) {
        self.inner.data.borrow_mut().clear();
        let targets = self.inner.targets.borrow();
        let deps = targets.deps_for(&Key::Iterate, TriggerOp::Clear);
        drop(targets);
        trigger(&deps, TriggerOp::Clear);
        trigger_one(&self.inner.size_dep, TriggerOp::Clear);
    }
}

impl<T: Eq + Hash + Clone> Default for ReactiveSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ReactiveSet<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}
