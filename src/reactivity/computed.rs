// ============================================================================
// reactive-core - Computed & DeferredComputed (C6)
// Derived values layered on top of a backing effect: `Computed` notifies
// eagerly on every upstream change, `DeferredComputed` coalesces a burst of
// upstream changes into zero notifications when the recomputed value is
// unchanged.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::core::types::{Dep, TrackOp, TriggerOp};
use crate::reactivity::effect::{ReactiveEffect, SchedulerFn};
use crate::reactivity::scheduling::next_tick;
use crate::reactivity::tracking::{track, trigger_one};

// =============================================================================
// COMPUTED (eager-notify)
// =============================================================================

struct ComputedInner<T> {
    getter: RefCell<Box<dyn FnMut() -> T>>,
    value: RefCell<Option<T>>,
    dirty: Cell<bool>,
    dep: Rc<Dep>,
    effect: RefCell<Option<Rc<ReactiveEffect>>>,
}

/// A memoized derived value. Reading `.value`/`.get()` re-subscribes the
/// currently-running effect to this computed's own Dep; the computed itself
/// only recomputes when it is read *and* dirty, never eagerly on write.
pub struct Computed<T> {
    inner: Rc<ComputedInner<T>>,
}

impl<T: Clone + 'static> Computed<T> {
    pub fn new(getter: impl FnMut() -> T + 'static) -> Self {
        let inner = Rc::new(ComputedInner {
            getter: RefCell::new(Box::new(getter)),
            value: RefCell::new(None),
            dirty: Cell::new(true),
            dep: Dep::new(),
            effect: RefCell::new(None),
        });

        let weak_for_func = Rc::downgrade(&inner);
        let func = move || {
            if let Some(inner) = weak_for_func.upgrade() {
                let value = (inner.getter.borrow_mut())();
                *inner.value.borrow_mut() = Some(value);
            }
        };

        let weak_for_scheduler = Rc::downgrade(&inner);
        let scheduler: SchedulerFn = Box::new(move || {
            if let Some(inner) = weak_for_scheduler.upgrade() {
                inner.dirty.set(true);
                trigger_one(&inner.dep, TriggerOp::Set);
            }
        });

        let effect = ReactiveEffect::new(func, Some(scheduler));
        effect.mark_computed();
        *inner.effect.borrow_mut() = Some(effect);

        Self { inner }
    }

    /// Read the current value, recomputing first if dirty.
    pub fn get(&self) -> T {
        track(&self.inner.dep, TrackOp::Get);
        if self.inner.dirty.get() {
            self.inner.dirty.set(false);
            self.recompute();
        }
        self.inner
            .value
            .borrow()
            .clone()
            .expect("computed value populated before first read returns")
    }

    fn recompute(&self) {
        let effect = self
            .inner
            .effect
            .borrow()
            .clone()
            .expect("effect set during construction");
        effect.run();
    }
}

impl<T> Clone for Computed<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

pub fn computed<T: Clone + 'static>(getter: impl FnMut() -> T + 'static) -> Computed<T> {
    Computed::new(getter)
}

// =============================================================================
// DEFERRED COMPUTED
// =============================================================================

struct DeferredComputedInner<T> {
    getter: RefCell<Box<dyn FnMut() -> T>>,
    value: RefCell<Option<T>>,
    compare_target: RefCell<Option<T>>,
    dirty: Cell<bool>,
    scheduled: Cell<bool>,
    dep: Rc<Dep>,
    effect: RefCell<Option<Rc<ReactiveEffect>>>,
}

impl<T: Clone + PartialEq + 'static> DeferredComputedInner<T> {
    /// One invocation of the backing effect's scheduler, whether it arrived
    /// via the ordinary trigger dispatch (`computed_trigger = false`) or
    /// directly from an upstream `DeferredComputed`'s own propagation step
    /// (`computed_trigger = true`).
    fn on_upstream_fire(self: &Rc<Self>, computed_trigger: bool) {
        if computed_trigger {
            let snapshot = self.value.borrow().clone();
            *self.compare_target.borrow_mut() = snapshot;
        } else if !self.scheduled.replace(true) {
            // Seed the comparator with the value as of just before this
            // burst, unless an upstream `DeferredComputed` already seeded it
            // via `computed_trigger` earlier in the same synchronous region.
            if self.compare_target.borrow().is_none() {
                let snapshot = self.value.borrow().clone();
                *self.compare_target.borrow_mut() = snapshot;
            }
            let weak = Rc::downgrade(self);
            next_tick(move || {
                let Some(inner) = weak.upgrade() else { return };
                inner.scheduled.set(false);
                let new_value = (inner.getter.borrow_mut())();
                let changed = match inner.compare_target.borrow_mut().take() {
                    Some(prev) => prev != new_value,
                    None => true,
                };
                *inner.value.borrow_mut() = Some(new_value);
                if changed {
                    trigger_one(&inner.dep, TriggerOp::Set);
                }
            });
        }

        for effect in self.dep.snapshot() {
            if effect.is_deferred_computed() {
                effect.notify_deferred(true);
            }
        }

        self.dirty.set(true);
    }
}

/// Like [`Computed`], but a burst of upstream changes that ultimately
/// recompute to the same value produces zero downstream notifications. The
/// cost is that the recomputation itself happens off of a microtask
/// ([`crate::reactivity::scheduling::tick`]) rather than synchronously.
pub struct DeferredComputed<T> {
    inner: Rc<DeferredComputedInner<T>>,
}

impl<T: Clone + PartialEq + 'static> DeferredComputed<T> {
    pub fn new(getter: impl FnMut() -> T + 'static) -> Self {
        let inner = Rc::new(DeferredComputedInner {
            getter: RefCell::new(Box::new(getter)),
            value: RefCell::new(None),
            compare_target: RefCell::new(None),
            dirty: Cell::new(true),
            scheduled: Cell::new(false),
            dep: Dep::new(),
            effect: RefCell::new(None),
        });

        let weak_for_func = Rc::downgrade(&inner);
        let func = move || {
            if let Some(inner) = weak_for_func.upgrade() {
                let value = (inner.getter.borrow_mut())();
                *inner.value.borrow_mut() = Some(value);
            }
        };

        let weak_for_scheduler: Weak<DeferredComputedInner<T>> = Rc::downgrade(&inner);
        let scheduler: SchedulerFn = Box::new(move || {
            if let Some(inner) = weak_for_scheduler.upgrade() {
                inner.on_upstream_fire(false);
            }
        });

        let effect = ReactiveEffect::new(func, Some(scheduler));
        effect.mark_computed();

        let weak_for_hook: Weak<DeferredComputedInner<T>> = Rc::downgrade(&inner);
        effect.set_deferred_hook(Box::new(move |computed_trigger| {
            if let Some(inner) = weak_for_hook.upgrade() {
                inner.on_upstream_fire(computed_trigger);
            }
        }));

        *inner.effect.borrow_mut() = Some(effect);

        Self { inner }
    }

    pub fn get(&self) -> T {
        track(&self.inner.dep, TrackOp::Get);
        if self.inner.dirty.get() {
            self.inner.dirty.set(false);
            let effect = self
                .inner
                .effect
                .borrow()
                .clone()
                .expect("effect set during construction");
            effect.run();
        }
        self.inner
            .value
            .borrow()
            .clone()
            .expect("computed value populated before first read returns")
    }
}

impl<T> Clone for DeferredComputed<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

pub fn deferred_computed<T: Clone + PartialEq + 'static>(
    getter: impl FnMut() -> T + 'static,
) -> DeferredComputed<T> {
    DeferredComputed::new(getter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactivity::effect::effect;
    use crate::reactivity::scheduling::tick;
    use std::cell::RefCell as StdRefCell;

    #[test]
    fn computed_recomputes_lazily_and_caches() {
        let calls = Rc::new(StdRefCell::new(0));
        let calls2 = Rc::clone(&calls);
        let c = computed(move || {
            *calls2.borrow_mut() += 1;
            42
        });
        assert_eq!(*calls.borrow(), 0, "no eager recompute before first read");
        assert_eq!(c.get(), 42);
        assert_eq!(*calls.borrow(), 1);
        assert_eq!(c.get(), 42);
        assert_eq!(*calls.borrow(), 1, "cached until marked dirty");
    }

    #[test]
    fn computed_notifies_downstream_effect_on_dependency_change() {
        use crate::core::types::ValueCell;

        let dep = Rc::new(Dep::new());
        let dep_for_getter = Rc::clone(&dep);
        let source = Rc::new(ValueCell::new(1));
        let source_for_getter = Rc::clone(&source);

        let c = computed(move || {
            track(&dep_for_getter, TrackOp::Get);
            source_for_getter.get() * 2
        });

        let seen = Rc::new(StdRefCell::new(0));
        let seen2 = Rc::clone(&seen);
        let c_for_effect = c.clone();
        let _e = effect(move || {
            seen2.replace(c_for_effect.get());
        });
        assert_eq!(*seen.borrow(), 2);

        source.set(5);
        trigger_one(&dep, TriggerOp::Set);
        assert_eq!(*seen.borrow(), 10);
    }

    #[test]
    fn deferred_computed_suppresses_unchanged_recompute() {
        use crate::core::types::ValueCell;

        let source = Rc::new(ValueCell::new(1));
        let dep = Rc::new(Dep::new());
        let dep_for_getter = Rc::clone(&dep);
        let source_for_getter = Rc::clone(&source);

        let dc = deferred_computed(move || {
            track(&dep_for_getter, TrackOp::Get);
            source_for_getter.get().abs()
        });

        let runs = Rc::new(StdRefCell::new(0));
        let runs2 = Rc::clone(&runs);
        let dc_for_effect = dc.clone();
        let _e = effect(move || {
            dc_for_effect.get();
            *runs2.borrow_mut() += 1;
        });
        assert_eq!(*runs.borrow(), 1);

        // abs(1) -> abs(-1): same recomputed value, no downstream notify.
        source.set(-1);
        trigger_one(&dep, TriggerOp::Set);
        tick();
        assert_eq!(*runs.borrow(), 1, "unchanged recompute suppressed");

        source.set(7);
        trigger_one(&dep, TriggerOp::Set);
        tick();
        assert_eq!(*runs.borrow(), 2, "changed recompute still notifies");
    }
}
