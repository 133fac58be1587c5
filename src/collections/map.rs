// ============================================================================
// reactive-core - ReactiveMap
// A keyed-collection target (§3/§4.4, §13): per-key reads track that key's
// Dep, absent-key lookups track `Iterate` so a later insert wakes them,
// `len()` tracks a dedicated size Dep.
// ============================================================================

use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

use crate::core::types::{Dep, Key, TrackOp, TriggerOp};
use crate::reactivity::target_map::{TargetKind, TargetMap};
use crate::reactivity::tracking::{track, trigger, trigger_one};

struct Inner<K, V> {
    data: RefCell<HashMap<K, V>>,
    targets: RefCell<TargetMap<K>>,
    size_dep: Rc<Dep>,
}

/// A hash map whose per-key reads, key-existence checks, key/value
/// iteration, and size are each tracked independently.
pub struct ReactiveMap<K, V> {
    inner: Rc<Inner<K, V>>,
}

impl<K: Eq + Hash + Clone, V: Clone> ReactiveMap<K, V> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Inner {
                data: RefCell::new(HashMap::new()),
                targets: RefCell::new(TargetMap::new(TargetKind::KeyedCollection)),
                size_dep: Dep::new(),
            }),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let dep = self.inner.targets.borrow_mut().get_or_create(Key::User(key.clone()));
        track(&dep, TrackOp::Get);
        self.inner.data.borrow().get(key).cloned()
    }

    /// A present key tracks its own Dep; an absent key tracks `Iterate` so
    /// that a later `insert` of this exact key wakes up the reader — the
    /// only way a negative lookup can be observed reactively without a
    /// per-absent-key Dep.
    pub fn contains_key(&self, key: &K) -> bool {
        let present = self.inner.data.borrow().contains_key(key);
        let dep_key = if present { Key::User(key.clone()) } else { Key::Iterate };
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

    pub fn keys(&self) -> Vec<K> {
        let dep = self.inner.targets.borrow_mut().get_or_create(Key::MapKeyIterate);
        track(&dep, TrackOp::Iterate);
        self.inner.data.borrow().keys().cloned().collect()
    }

    pub fn values(&self) -> Vec<V> {
        let dep = self.inner.targets.borrow_mut().get_or_create(Key::Iterate);
        track(&dep, TrackOp::Iterate);
        self.inner.data.borrow().values().cloned().collect()
    }

    /// Inserts or overwrites `key`. A new key fires ADD (`Iterate` and
    /// `MapKeyIterate`) plus the size Dep; overwriting an existing key
    /// fires SET on that key's Dep plus `Iterate` (the value stream
    /// changed) but not `MapKeyIterate` or size.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        let previous = self.inner.data.borrow_mut().insert(key.clone(), value);
        let mut targets = self.inner.targets.borrow_mut();
        if previous.is_none() {
            let deps = targets.deps_for(&Key::User(key), TriggerOp::Add);
            drop(targets);
            trigger(&deps, TriggerOp::Add);
            trigger_one(&self.inner.size_dep, TriggerOp::Add);
        } else {
            let key_dep = targets.get_or_create(Key::User(key));
            let iter_dep = targets.get_or_create(Key::Iterate);
            drop(targets);
            trigger(&[key_dep, iter_dep], TriggerOp::Set);
        }
        previous
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        let removed = self.inner.data.borrow_mut().remove(key);
        if removed.is_some() {
            let targets = self.inner.targets.borrow();
            let deps = targets.deps_for(&Key::User(key.clone()), TriggerOp::Delete);
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

impl<K: Eq + Hash + Clone, V: Clone> Default for ReactiveMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Clone for ReactiveMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}
