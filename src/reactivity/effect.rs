// ============================================================================
// reactive-core - Reactive Effect
// The reaction side of track/trigger: re-runs a closure when any Dep it read
// last time fires.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::core::context::{with_context, Job, Runtime};
use crate::core::types::Dep;

/// A scheduler callback takes no arguments; it decides *when* `run()` is
/// invoked again (queue a job, run inline, drop it). Without one, the effect
/// reruns synchronously the moment one of its deps fires.
pub type SchedulerFn = Box<dyn Fn()>;

/// Hook hung off of `on_track`/`on_trigger`', given the op that produced the
/// call. Debug-only wiring, never consulted by the algorithm itself.
pub type TrackHook = Box<dyn Fn(crate::core::types::TrackOp)>;
pub type TriggerHook = Box<dyn Fn(crate::core::types::TriggerOp)>;

/// The reaction half of the engine (C3). Holds the user closure, the set of
/// `Dep`s it is currently subscribed to, and the bookkeeping `run()` needs to
/// incrementally resubscribe on every re-run instead of unsubscribing and
/// resubscribing from scratch.
pub struct ReactiveEffect {
    id: u64,
    func: RefCell<Box<dyn FnMut()>>,
    scheduler: Option<SchedulerFn>,
    deps: RefCell<Vec<Rc<Dep>>>,
    active: Cell<bool>,
    /// Set once this effect is known to be re-entrant-safe (a computed's own
    /// backing effect, mostly); an ordinary effect that triggers itself
    /// during its own run is suppressed instead of looping.
    allow_recurse: Cell<bool>,
    /// True for the backing effect of a computed; used by the two-pass
    /// trigger dispatch that runs computed-backed effects before plain ones.
    is_computed: Cell<bool>,
    defer_stop: Cell<bool>,
    on_stop: RefCell<Option<Box<dyn FnOnce()>>>,
    on_track: Option<TrackHook>,
    on_trigger: Option<TriggerHook>,
    /// Set only on a `DeferredComputed`'s backing effect: lets an upstream
    /// `DeferredComputed` propagate `computedTrigger = true` directly,
    /// bypassing the ordinary scheduler dispatch in `trigger_effect`.
    deferred_hook: RefCell<Option<Box<dyn Fn(bool)>>>,
    /// The job standing in for this effect's `run()` while a `batch()` is
    /// open. Cleared as soon as the job actually runs, so a write to the
    /// same effect later in the same drain queues a fresh one rather than
    /// being silently dropped.
    batch_job: RefCell<Option<Rc<Job>>>,
}

impl ReactiveEffect {
    pub fn new(func: impl FnMut() + 'static, scheduler: Option<SchedulerFn>) -> Rc<Self> {
        Self::with_hooks(func, scheduler, None, None)
    }

    pub fn with_hooks(
        func: impl FnMut() + 'static,
        scheduler: Option<SchedulerFn>,
        on_track: Option<TrackHook>,
        on_trigger: Option<TriggerHook>,
    ) -> Rc<Self> {
        let id = with_context(Runtime::next_id);
        Rc::new(Self {
            id,
            func: RefCell::new(Box::new(func)),
            scheduler,
            deps: RefCell::new(Vec::new()),
            active: Cell::new(true),
            allow_recurse: Cell::new(false),
            is_computed: Cell::new(false),
            defer_stop: Cell::new(false),
            on_stop: RefCell::new(None),
            on_track,
            on_trigger,
            deferred_hook: RefCell::new(None),
            batch_job: RefCell::new(None),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub fn set_allow_recurse(&self, value: bool) {
        self.allow_recurse.set(value);
    }

    pub fn allow_recurse(&self) -> bool {
        self.allow_recurse.get()
    }

    pub fn mark_computed(&self) {
        self.is_computed.set(true);
    }

    pub fn is_computed(&self) -> bool {
        self.is_computed.get()
    }

    pub fn set_deferred_hook(&self, hook: Box<dyn Fn(bool)>) {
        *self.deferred_hook.borrow_mut() = Some(hook);
    }

    pub fn is_deferred_computed(&self) -> bool {
        self.deferred_hook.borrow().is_some()
    }

    /// Propagate `computedTrigger` to a `DeferredComputed`'s backing effect
    /// directly, without going through `trigger_effect`'s dispatch.
    pub fn notify_deferred(&self, computed_trigger: bool) {
        if let Some(hook) = self.deferred_hook.borrow().as_ref() {
            hook(computed_trigger);
        }
    }

    pub fn set_on_stop(&self, cb: Box<dyn FnOnce()>) {
        *self.on_stop.borrow_mut() = Some(cb);
    }

    pub fn notify_track(&self, op: crate::core::types::TrackOp) {
        if let Some(hook) = &self.on_track {
            hook(op);
        }
    }

    pub fn has_on_track_hook(&self) -> bool {
        self.on_track.is_some()
    }

    pub fn notify_trigger(&self, op: crate::core::types::TriggerOp) {
        if let Some(hook) = &self.on_trigger {
            hook(op);
        }
    }

    /// Does this effect have its own scheduler, or does it run inline on
    /// trigger? Consulted by `trigger_effect` in `reactivity::tracking`.
    pub fn has_scheduler(&self) -> bool {
        self.scheduler.is_some()
    }

    pub fn scheduler_run(&self) {
        if let Some(scheduler) = &self.scheduler {
            scheduler();
        }
    }

    /// Queue this (scheduler-less) effect's `run()` as a job, reusing the
    /// in-flight job if one is already queued so repeated writes inside one
    /// `batch()` coalesce into a single re-run.
    pub(crate) fn queue_as_batch_job(self: &Rc<Self>) {
        let job = {
            let mut slot = self.batch_job.borrow_mut();
            if let Some(job) = slot.as_ref() {
                Rc::clone(job)
            } else {
                let effect = Rc::clone(self);
                let job = Job::new(Some(self.id), false, self.allow_recurse.get(), None, move || {
                    effect.clear_batch_job();
                    effect.run();
                    Ok(())
                });
                *slot = Some(Rc::clone(&job));
                job
            }
        };
        crate::reactivity::scheduling::queue_job(job);
    }

    fn clear_batch_job(&self) {
        *self.batch_job.borrow_mut() = None;
    }

    /// `deps` read access for `track`'s incremental-resubscribe bookkeeping.
    pub(crate) fn deps(&self) -> &RefCell<Vec<Rc<Dep>>> {
        &self.deps
    }

    pub(crate) fn push_dep(&self, dep: Rc<Dep>) {
        self.deps.borrow_mut().push(dep);
    }

    /// Re-run the tracked closure, maintaining the dep set via the
    /// incremental bitmask sweep while nesting depth stays under the marker
    /// ceiling, falling back to a full cleanup-and-retrack pass beyond it.
    ///
    /// A stopped effect still runs its closure once (untracked) so that a
    /// one-shot disposal doesn't silently skip the final invocation; Vue's
    /// own `run()` has the same carve-out.
    pub fn run(self: &Rc<Self>) {
        if !self.active.get() {
            (self.func.borrow_mut())();
            return;
        }

        if with_context(|rt| rt.is_on_stack(self)) {
            return;
        }

        let _guard = EffectRunGuard::enter(self);
        (self.func.borrow_mut())();
        drop(_guard);

        if self.defer_stop.get() {
            self.defer_stop.set(false);
            self.stop();
        }
    }

    /// Unsubscribe from every remaining dep and run `on_stop`, unless this
    /// effect is the one currently running — in which case stop is deferred
    /// until `run()`'s guard unwinds.
    pub fn stop(self: &Rc<Self>) {
        let currently_running = with_context(|rt| {
            rt.active_effect()
                .is_some_and(|top| Rc::ptr_eq(&top, self))
        });
        if currently_running {
            self.defer_stop.set(true);
            return;
        }
        if !self.active.get() {
            return;
        }
        for dep in self.deps.borrow_mut().drain(..) {
            dep.delete(self);
        }
        self.active.set(false);
        if let Some(cb) = self.on_stop.borrow_mut().take() {
            cb();
        }
    }
}

/// RAII guard for one `run()` invocation: pushes this effect onto the active
/// stack, enters one more track depth, seeds the w-bits (or wipes the dep
/// set outright past the marker ceiling), and on drop — including during an
/// unwinding panic from the user closure — prunes deps that went untouched
/// this run and restores the previous `shouldTrack`/depth/stack state.
struct EffectRunGuard<'a> {
    effect: &'a Rc<ReactiveEffect>,
    prev_should_track: bool,
    bit: Option<u32>,
}

impl<'a> EffectRunGuard<'a> {
    fn enter(effect: &'a Rc<ReactiveEffect>) -> Self {
        let prev_should_track = with_context(|rt| {
            let prev = rt.should_track();
            rt.set_should_track(true);
            rt.push_active_effect(Rc::clone(effect));
            prev
        });

        let bit = with_context(|rt| rt.enter_track_depth().1);

        if let Some(bit) = bit {
            for dep in effect.deps.borrow().iter() {
                dep.mark_was_tracked(bit);
            }
        } else {
            // Past the marker-bit ceiling: cleanup is binary, not incremental.
            // Unsubscribe from everything up front; `track` will resubscribe
            // to whatever actually gets read during this run.
            for dep in effect.deps.borrow_mut().drain(..) {
                dep.delete(effect);
            }
        }

        Self {
            effect,
            prev_should_track,
            bit,
        }
    }
}

impl Drop for EffectRunGuard<'_> {
    fn drop(&mut self) {
        if let Some(bit) = self.bit {
            let mut deps = self.effect.deps.borrow_mut();
            let prior = std::mem::take(&mut *deps);
            for dep in prior {
                let was = dep.was_tracked(bit);
                let new = dep.new_tracked(bit);
                dep.clear_depth(bit);
                if was && !new {
                    dep.delete(self.effect);
                } else {
                    deps.push(dep);
                }
            }
        }

        with_context(|rt| {
            rt.exit_track_depth();
            rt.pop_active_effect();
            rt.set_should_track(self.prev_should_track);
        });
    }
}

// =============================================================================
// PUBLIC SURFACE: Effect handle + factory
// =============================================================================

/// Configuration accepted by [`effect_with`]. `Default::default()` matches
/// [`effect`]'s behavior: eager first run, no scheduler, no debug hooks.
#[derive(Default)]
pub struct EffectOptions {
    /// Skip the first, eager run; the effect only runs once something
    /// triggers it (or the caller calls [`Effect::run`] manually).
    pub lazy: bool,
    /// Permit this effect to retrigger itself while it is already running,
    /// instead of the default self-feedback suppression.
    pub allow_recurse: bool,
    /// Replace "run immediately on trigger" with a caller-supplied callback
    /// — typically one that queues a job rather than running inline.
    pub scheduler: Option<SchedulerFn>,
    /// Run once the effect stops, after its deps have been released.
    pub on_stop: Option<Box<dyn FnOnce()>>,
    /// Debug hook: called with the op whenever this effect's closure reads
    /// a tracked dep.
    pub on_track: Option<TrackHook>,
    /// Debug hook: called with the op whenever one of this effect's deps
    /// fires and the effect is about to re-run or be scheduled.
    pub on_trigger: Option<TriggerHook>,
}

/// An owning handle to a [`ReactiveEffect`]. Cloning shares the same
/// underlying effect; the effect stops automatically once the last handle
/// is dropped, mirroring the RAII-disposal idiom used throughout this crate.
pub struct Effect {
    inner: Rc<ReactiveEffect>,
}

impl Effect {
    /// Re-run the effect's closure right now, outside of the trigger path.
    pub fn run(&self) {
        self.inner.run();
    }

    /// Stop the effect early instead of waiting for the last handle to drop.
    pub fn stop(&self) {
        self.inner.stop();
    }

    pub fn is_active(&self) -> bool {
        self.inner.is_active()
    }

    pub fn id(&self) -> u64 {
        self.inner.id()
    }
}

impl Clone for Effect {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl Drop for Effect {
    fn drop(&mut self) {
        if Rc::strong_count(&self.inner) == 1 {
            self.inner.stop();
        }
    }
}

/// Create and (unless `lazy`) immediately run an effect with default options.
pub fn effect(f: impl FnMut() + 'static) -> Effect {
    effect_with(f, EffectOptions::default())
}

/// Create an effect with explicit [`EffectOptions`].
pub fn effect_with(f: impl FnMut() + 'static, options: EffectOptions) -> Effect {
    let inner = ReactiveEffect::with_hooks(f, options.scheduler, options.on_track, options.on_trigger);
    inner.set_allow_recurse(options.allow_recurse);
    if let Some(on_stop) = options.on_stop {
        inner.set_on_stop(on_stop);
    }
    if !options.lazy {
        inner.run();
    }
    Effect { inner }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell as StdRefCell;

    #[test]
    fn run_executes_closure() {
        let calls = Rc::new(StdRefCell::new(0));
        let calls2 = Rc::clone(&calls);
        let effect = ReactiveEffect::new(move || *calls2.borrow_mut() += 1, None);
        effect.run();
        effect.run();
        assert_eq!(*calls.borrow(), 2);
    }

    #[test]
    fn reentrant_run_is_suppressed() {
        let effect_cell: Rc<RefCell<Option<Rc<ReactiveEffect>>>> = Rc::new(RefCell::new(None));
        let calls = Rc::new(StdRefCell::new(0));
        let calls2 = Rc::clone(&calls);
        let effect_cell2 = Rc::clone(&effect_cell);
        let effect = ReactiveEffect::new(
            move || {
                *calls2.borrow_mut() += 1;
                if let Some(e) = effect_cell2.borrow().as_ref() {
                    e.run();
                }
            },
            None,
        );
        *effect_cell.borrow_mut() = Some(Rc::clone(&effect));
        effect.run();
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn stop_clears_deps_and_runs_on_stop() {
        let stopped = Rc::new(StdRefCell::new(false));
        let stopped2 = Rc::clone(&stopped);
        let effect = ReactiveEffect::new(|| {}, None);
        effect.set_on_stop(Box::new(move || *stopped2.borrow_mut() = true));
        let dep = Dep::new();
        dep.add(&effect);
        assert!(dep.has(&effect));
        effect.push_dep(Rc::clone(&dep));
        effect.stop();
        assert!(!dep.has(&effect));
        assert!(*stopped.borrow());
        assert!(!effect.is_active());
    }

    #[test]
    fn stop_during_run_is_deferred() {
        let effect_cell: Rc<RefCell<Option<Rc<ReactiveEffect>>>> = Rc::new(RefCell::new(None));
        let effect_cell2 = Rc::clone(&effect_cell);
        let effect = ReactiveEffect::new(
            move || {
                if let Some(e) = effect_cell2.borrow().as_ref() {
                    e.stop();
                    assert!(e.is_active(), "stop must defer while running");
                }
            },
            None,
        );
        *effect_cell.borrow_mut() = Some(Rc::clone(&effect));
        effect.run();
        assert!(!effect.is_active(), "deferred stop applies once run() exits");
    }
}
