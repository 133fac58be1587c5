// ============================================================================
// reactive-core - Target Map
// Per-target dep table (C2): one `Dep` per tracked key, plus the candidate
// assembly rules `trigger` uses to decide which deps a given write touches.
// ============================================================================

use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

use crate::core::types::{Dep, Key, TriggerOp};

/// How a target's keys participate in trigger dispatch. Plain objects only
/// ever touch the key written; sequences also propagate through a length
/// key; keyed collections additionally carry a key-iteration dependency
/// distinct from their value-iteration one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Plain,
    Sequence,
    KeyedCollection,
}

/// Owns the dep table for one reactive target. Never holds the target's
/// value itself — `Signal`/`ReactiveVec`/`ReactiveMap`/`ReactiveSet` pair
/// this with their own storage and call `track`/`trigger` (in
/// [`crate::reactivity::tracking`]) against the deps this hands back.
pub struct TargetMap<K> {
    kind: TargetKind,
    deps: HashMap<Key<K>, Rc<Dep>>,
}

impl<K: Eq + Hash + Clone> TargetMap<K> {
    pub fn new(kind: TargetKind) -> Self {
        Self {
            kind,
            deps: HashMap::new(),
        }
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    /// Fetch the dep for `key`, creating it on first access. This is the
    /// realization of `depsMap.get(key) ?? depsMap.set(key, new Dep())`.
    pub fn get_or_create(&mut self, key: Key<K>) -> Rc<Dep> {
        self.deps.entry(key).or_insert_with(Dep::new).clone()
    }

    pub fn get(&self, key: &Key<K>) -> Option<Rc<Dep>> {
        self.deps.get(key).cloned()
    }

    pub fn clear(&mut self) {
        self.deps.clear();
    }

    /// Assemble the candidate deps for one trigger, following §4.4's
    /// target-kind-sensitive dispatch:
    ///
    /// - `Clear`: every dep on the target fires.
    /// - `Add`/`Delete`: the key's own dep, plus the iteration dep(s) —
    ///   value iteration always, key iteration additionally for keyed
    ///   collections.
    /// - `Set`: only the key's own dep; iteration order didn't change.
    pub fn deps_for(&self, key: &Key<K>, op: TriggerOp) -> Vec<Rc<Dep>> {
        if op == TriggerOp::Clear {
            return self.deps.values().cloned().collect();
        }

        let mut candidates = Vec::new();
        if let Some(dep) = self.deps.get(key) {
            candidates.push(Rc::clone(dep));
        }

        if matches!(op, TriggerOp::Add | TriggerOp::Delete) {
            if let Some(dep) = self.deps.get(&Key::Iterate) {
                candidates.push(Rc::clone(dep));
            }
            if self.kind == TargetKind::KeyedCollection {
                if let Some(dep) = self.deps.get(&Key::MapKeyIterate) {
                    candidates.push(Rc::clone(dep));
                }
            }
        }

        candidates
    }
}

/// Sequences key their elements by numeric index, which lets a length
/// shrink retroactively invalidate every index at or beyond the new length —
/// a rule that doesn't type-check for an arbitrary `K`, hence the dedicated
/// `impl` block.
impl TargetMap<usize> {
    /// Candidate deps for a length change from `old_len` to `new_len`:
    /// the length dep itself, plus every indexed dep at or past whichever
    /// end shrank (truncation invalidates the dropped indices; growth only
    /// needs the length + iteration deps, handled by the caller via `Add`).
    pub fn deps_for_length_change(&self, old_len: usize, new_len: usize) -> Vec<Rc<Dep>> {
        let mut candidates = Vec::new();
        if let Some(dep) = self.deps.get(&Key::Length) {
            candidates.push(Rc::clone(dep));
        }
        if let Some(dep) = self.deps.get(&Key::Iterate) {
            candidates.push(Rc::clone(dep));
        }
        if new_len < old_len {
            for index in new_len..old_len {
                if let Some(dep) = self.deps.get(&Key::User(index)) {
                    candidates.push(Rc::clone(dep));
                }
            }
        }
        candidates
    }
}
