// ============================================================================
// reactive-core - ReactiveVec
// A sequence target (§3/§4.4): indexed reads track a per-index Dep, `len()`
// tracks the length Dep, iteration tracks the iterate Dep.
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::types::{Key, TrackOp, TriggerOp};
use crate::reactivity::target_map::{TargetKind, TargetMap};
use crate::reactivity::tracking::{track, trigger};

struct Inner<T> {
    data: RefCell<Vec<T>>,
    targets: RefCell<TargetMap<usize>>,
}

/// A growable sequence whose element reads, length reads, and iteration are
/// each tracked independently.
pub struct ReactiveVec<T> {
    inner: Rc<Inner<T>>,
}

impl<T: Clone> ReactiveVec<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Inner {
                data: RefCell::new(Vec::new()),
                targets: RefCell::new(TargetMap::new(TargetKind::Sequence)),
            }),
        }
    }

    pub fn from_vec(values: Vec<T>) -> Self {
        Self {
            inner: Rc::new(Inner {
                data: RefCell::new(values),
                targets: RefCell::new(TargetMap::new(TargetKind::Sequence)),
            }),
        }
    }

    /// Subscribes to this index; yields `None` if out of bounds (does not
    /// imply the index will never become valid — growth fires an ADD on it).
    pub fn get(&self, index: usize) -> Option<T> {
        let dep = self.inner.targets.borrow_mut().get_or_create(Key::User(index));
        track(&dep, TrackOp::Get);
        self.inner.data.borrow().get(index).cloned()
    }

    pub fn len(&self) -> usize {
        let dep = self.inner.targets.borrow_mut().get_or_create(Key::Length);
        track(&dep, TrackOp::Get);
        self.inner.data.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Subscribes to the enumeration order; returns an owned clone of every
    /// element.
    pub fn to_vec(&self) -> Vec<T> {
        let dep = self.inner.targets.borrow_mut().get_or_create(Key::Iterate);
        track(&dep, TrackOp::Iterate);
        self.inner.data.borrow().clone()
    }

    pub fn push(&self, value: T) {
        let new_index = {
            let mut data = self.inner.data.borrow_mut();
            data.push(value);
            data.len() - 1
        };
        let mut targets = self.inner.targets.borrow_mut();
        let mut deps = targets.deps_for(&Key::User(new_index), TriggerOp::Add);
        let len_dep = targets.get_or_create(Key::Length);
        if !deps.iter().any(|d| Rc::ptr_eq(d, &len_dep)) {
            deps.push(len_dep);
        }
        drop(targets);
        trigger(&deps, TriggerOp::Add);
    }

    pub fn pop(&self) -> Option<T> {
        let (popped, old_len, new_len) = {
            let mut data = self.inner.data.borrow_mut();
            let old_len = data.len();
            let popped = data.pop();
            (popped, old_len, data.len())
        };
        if popped.is_some() {
            let targets = self.inner.targets.borrow();
            let deps = targets.deps_for_length_change(old_len, new_len);
            drop(targets);
            trigger(&deps, TriggerOp::Delete);
        }
        popped
    }

    /// Overwrites the element at `index`, unconditionally firing that
    /// index's Dep (enumeration order is unchanged, so `Iterate` does not
    /// fire — matching the keyed-collection SET rule applied to sequences).
    pub fn set(&self, index: usize, value: T) {
        self.inner.data.borrow_mut()[index] = value;
        let dep = self.inner.targets.borrow_mut().get_or_create(Key::User(index));
        trigger(&[dep], TriggerOp::Set);
    }

    /// Inserts at `index`, shifting every later element one slot right.
    /// Every shifted index's Dep fires alongside `Iterate` and `Length`
    /// since their held values all changed identity.
    pub fn insert(&self, index: usize, value: T) {
        let old_len = {
            let mut data = self.inner.data.borrow_mut();
            let old_len = data.len();
            data.insert(index, value);
            old_len
        };
        let mut targets = self.inner.targets.borrow_mut();
        let mut deps = Vec::new();
        for i in index..=old_len {
            if let Some(dep) = targets.get(&Key::User(i)) {
                deps.push(dep);
            }
        }
        deps.push(targets.get_or_create(Key::Iterate));
        deps.push(targets.get_or_create(Key::Length));
        drop(targets);
        trigger(&deps, TriggerOp::Add);
    }

    /// Removes the element at `index`, shifting every later element one
    /// slot left.
    pub fn remove(&self, index: usize) -> T {
        let (removed, old_len) = {
            let mut data = self.inner.data.borrow_mut();
            let old_len = data.len();
            (data.remove(index), old_len)
        };
        let mut targets = self.inner.targets.borrow_mut();
        let mut deps = Vec::new();
        for i in index..old_len {
            if let Some(dep) = targets.get(&Key::User(i)) {
                deps.push(dep);
            }
        }
        if let Some(dep) = targets.get(&Key::Iterate) {
            deps.push(dep);
        }
        deps.push(targets.get_or_create(Key::Length));
        drop(targets);
        trigger(&deps, TriggerOp::Delete);
        removed
    }

    pub fn clear(&self) {
        self.inner.data.borrow_mut().clear();
        let targets = self.inner.targets.borrow();
        let deps = targets.deps_for(&Key::Iterate, TriggerOp::Clear);
        drop(targets);
        trigger(&deps, TriggerOp::Clear);
    }
}

impl<T: Clone> Default for ReactiveVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ReactiveVec<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug + Clone> std::fmt::Debug for ReactiveVec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactiveVec").field("data", &self.to_vec()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactivity::effect::effect;
    use std::cell::RefCell as StdRefCell;

    #[test]
    fn push_and_get() {
        let v: ReactiveVec<i32> = ReactiveVec::new();
        v.push(10);
        v.push(20);
        assert_eq!(v.get(0), Some(10));
        assert_eq!(v.get(1), Some(20));
        assert_eq!(v.len(), 2);
    }

    #[test]
    fn truncation_invalidates_tail_indices_and_length_only() {
        // S6: array [10,20,30,40] tracked by effects reading index 0, 2, length.
        let v: ReactiveVec<i32> = ReactiveVec::from_vec(vec![10, 20, 30, 40]);
        let idx0_runs = Rc::new(StdRefCell::new(0));
        let idx2_runs = Rc::new(StdRefCell::new(0));
        let len_runs = Rc::new(StdRefCell::new(0));

        let (v0, r0) = (v.clone(), Rc::clone(&idx0_runs));
        let _e0 = effect(move || {
            v0.get(0);
            *r0.borrow_mut() += 1;
        });
        let (v2, r2) = (v.clone(), Rc::clone(&idx2_runs));
        let _e2 = effect(move || {
            v2.get(2);
            *r2.borrow_mut() += 1;
        });
        let (vl, rl) = (v.clone(), Rc::clone(&len_runs));
        let _el = effect(move || {
            vl.len();
            *rl.borrow_mut() += 1;
        });

        assert_eq!(*idx0_runs.borrow(), 1);
        assert_eq!(*idx2_runs.borrow(), 1);
        assert_eq!(*len_runs.borrow(), 1);

        // Shrink to length 2: drops index 2 and 3.
        v.pop();
        v.pop();

        assert_eq!(*idx0_runs.borrow(), 1, "index 0 untouched by truncation");
        assert_eq!(*idx2_runs.borrow(), 2, "index 2 re-runs: it was truncated away");
        assert_eq!(*len_runs.borrow(), 3, "length re-runs once per pop, on top of the initial run");
    }

    #[test]
    fn set_does_not_fire_iterate() {
        let v: ReactiveVec<i32> = ReactiveVec::from_vec(vec![1, 2, 3]);
        let iter_runs = Rc::new(StdRefCell::new(0));
        let (vi, ri) = (v.clone(), Rc::clone(&iter_runs));
        let _e = effect(move || {
            vi.to_vec();
            *ri.borrow_mut() += 1;
        });
        assert_eq!(*iter_runs.borrow(), 1);

        v.set(1, 99);
        assert_eq!(*iter_runs.borrow(), 1, "overwriting a slot doesn't change enumeration order");
        assert_eq!(v.get(1), Some(99));
    }

    #[test]
    fn clear_fires_every_dep() {
        let v: ReactiveVec<i32> = ReactiveVec::from_vec(vec![1, 2, 3]);
        let runs = Rc::new(StdRefCell::new(0));
        let (v0, r0) = (v.clone(), Rc::clone(&runs));
        let _e0 = effect(move || {
            v0.get(0);
            *r0.borrow_mut() += 1;
        });
        v.clear();
        assert_eq!(*runs.borrow(), 2);
        assert_eq!(v.len(), 0);
    }
}
