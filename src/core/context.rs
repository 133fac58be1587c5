// ============================================================================
// reactive-core - Runtime
// Thread-local consolidation of the process-wide reactive globals.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::core::constants::MAX_MARKER_BITS;
use crate::core::types::track_op_bit;
use crate::error::{ErrorHookHolder, JobError, ReactiveError};
use crate::reactivity::effect::ReactiveEffect;

// =============================================================================
// SCHEDULER JOB (part of C5's "Scheduler state", §3)
// =============================================================================

/// One entry in the scheduler's `queue` or `pendingPostFlushCbs`.
///
/// `id` is the ordering key (`getId(job) = job.id ?? +inf`); `pre` is the
/// pre-before-non-pre tie-break; `active` lets `stop()` turn a still-queued
/// job into a no-op without splicing the queue.
pub struct Job {
    pub id: Option<u64>,
    pub pre: bool,
    pub allow_recurse: bool,
    pub owner_label: Option<String>,
    active: Cell<bool>,
    callback: RefCell<Box<dyn FnMut() -> Result<(), JobError>>>,
}

impl Job {
    pub fn new(
        id: Option<u64>,
        pre: bool,
        allow_recurse: bool,
        owner_label: Option<String>,
        callback: impl FnMut() -> Result<(), JobError> + 'static,
    ) -> Rc<Self> {
        Rc::new(Self {
            id,
            pre,
            allow_recurse,
            owner_label,
            active: Cell::new(true),
            callback: RefCell::new(Box::new(callback)),
        })
    }

    pub fn getid(&self) -> u64 {
        self.id.unwrap_or(u64::MAX)
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub fn deactivate(&self) {
        self.active.set(false);
    }

    pub fn invoke(&self) -> Result<(), JobError> {
        (self.callback.borrow_mut())()
    }
}

// =============================================================================
// RUNTIME
// =============================================================================

/// Thread-local runtime holding every piece of state the distilled spec calls
/// "process-wide": the active-effect stack, the tracking bits, and the
/// scheduler's two queues. Consolidated into one handle per §9's explicit
/// permission to do so rather than a scatter of separate thread-local cells.
pub struct Runtime {
    // ---- active-effect stack (C3) ----
    /// Explicit stack of currently-running effects; the last entry is
    /// `activeEffect`. Implemented as a stack rather than a parent pointer
    /// chain, per §9's guidance.
    active_stack: RefCell<Vec<Rc<ReactiveEffect>>>,

    /// `shouldTrack` plus its push/pop history for `pauseTracking` /
    /// `enableTracking` / `resetTracking`.
    should_track: Cell<bool>,
    track_stack: RefCell<Vec<bool>>,

    /// Current nesting depth; `trackOpBit = 1 << effect_track_depth` while
    /// `effect_track_depth <= MAX_MARKER_BITS`.
    effect_track_depth: Cell<u32>,

    /// Monotonic id source for effects and jobs, so that "created earlier"
    /// reliably means "smaller id" (the scheduler's ordering rationale).
    next_id: Cell<u64>,

    // ---- scheduler state (C5, §3) ----
    queue: RefCell<Vec<Rc<Job>>>,
    flush_index: Cell<usize>,
    pending_post_flush_cbs: RefCell<Vec<Rc<Job>>>,
    active_post_flush_cbs: RefCell<Option<Vec<Rc<Job>>>>,
    post_flush_index: Cell<usize>,
    is_flushing: Cell<bool>,
    is_flush_pending: Cell<bool>,
    /// Keyed by job identity (the job's `Rc` address), not `id`: two distinct
    /// id-less jobs (`getid() == u64::MAX`) must not share one counter.
    seen: RefCell<HashMap<usize, u32>>,

    /// Callbacks registered via `next_tick`, run once the in-flight (or next)
    /// drain completes. This crate's realization of `currentFlushPromise`
    /// composition without a real promise/executor underneath it.
    next_tick_waiters: RefCell<Vec<Box<dyn FnOnce()>>>,

    // ---- batching ----
    batch_depth: Cell<u32>,

    // ---- error reporting (§11) ----
    pub(crate) on_error: RefCell<ErrorHookHolder>,
}

impl Runtime {
    fn new() -> Self {
        Self {
            active_stack: RefCell::new(Vec::new()),
            should_track: Cell::new(true),
            track_stack: RefCell::new(Vec::new()),
            effect_track_depth: Cell::new(0),
            next_id: Cell::new(0),
            queue: RefCell::new(Vec::new()),
            flush_index: Cell::new(0),
            pending_post_flush_cbs: RefCell::new(Vec::new()),
            active_post_flush_cbs: RefCell::new(None),
            post_flush_index: Cell::new(0),
            is_flushing: Cell::new(false),
            is_flush_pending: Cell::new(false),
            seen: RefCell::new(HashMap::new()),
            next_tick_waiters: RefCell::new(Vec::new()),
            batch_depth: Cell::new(0),
            on_error: RefCell::new(ErrorHookHolder::default()),
        }
    }

    // =========================================================================
    // IDENTITY
    // =========================================================================

    /// Allocate the next id. Smaller ids were allocated earlier, which is
    /// the ordering the scheduler relies on ("parents are created first").
    pub fn next_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    // =========================================================================
    // ACTIVE EFFECT STACK (C3)
    // =========================================================================

    pub fn active_effect(&self) -> Option<Rc<ReactiveEffect>> {
        self.active_stack.borrow().last().cloned()
    }

    pub fn is_on_stack(&self, effect: &Rc<ReactiveEffect>) -> bool {
        self.active_stack
            .borrow()
            .iter()
            .any(|e| Rc::ptr_eq(e, effect))
    }

    pub fn push_active_effect(&self, effect: Rc<ReactiveEffect>) {
        self.active_stack.borrow_mut().push(effect);
    }

    pub fn pop_active_effect(&self) {
        self.active_stack.borrow_mut().pop();
    }

    // =========================================================================
    // TRACKING STATE
    // =========================================================================

    pub fn should_track(&self) -> bool {
        self.should_track.get()
    }

    pub fn set_should_track(&self, value: bool) -> bool {
        self.should_track.replace(value)
    }

    /// `pauseTracking()`: push current state, then disable tracking.
    pub fn pause_tracking(&self) {
        self.track_stack.borrow_mut().push(self.should_track.get());
        self.should_track.set(false);
    }

    /// `enableTracking()`: push current state, then enable tracking.
    pub fn enable_tracking(&self) {
        self.track_stack.borrow_mut().push(self.should_track.get());
        self.should_track.set(true);
    }

    /// `resetTracking()`: pop the last pushed state, restoring it.
    pub fn reset_tracking(&self) {
        let prev = self.track_stack.borrow_mut().pop().unwrap_or(true);
        self.should_track.set(prev);
    }

    pub fn effect_track_depth(&self) -> u32 {
        self.effect_track_depth.get()
    }

    /// Enter one more nesting level, returning the new depth and, if still
    /// within the marker-bit ceiling, the bit for that depth.
    pub fn enter_track_depth(&self) -> (u32, Option<u32>) {
        let depth = self.effect_track_depth.get() + 1;
        self.effect_track_depth.set(depth);
        let bit = (depth <= MAX_MARKER_BITS).then(|| track_op_bit(depth));
        (depth, bit)
    }

    pub fn exit_track_depth(&self) {
        self.effect_track_depth
            .set(self.effect_track_depth.get().saturating_sub(1));
    }

    // =========================================================================
    // BATCHING
    // =========================================================================

    pub fn enter_batch(&self) -> u32 {
        let depth = self.batch_depth.get() + 1;
        self.batch_depth.set(depth);
        depth
    }

    pub fn exit_batch(&self) -> u32 {
        let depth = self.batch_depth.get().saturating_sub(1);
        self.batch_depth.set(depth);
        depth
    }

    pub fn is_batching(&self) -> bool {
        self.batch_depth.get() > 0
    }

    // =========================================================================
    // SCHEDULER QUEUES (C5) — raw accessors; algorithms live in reactivity::scheduling
    // =========================================================================

    pub(crate) fn queue(&self) -> &RefCell<Vec<Rc<Job>>> {
        &self.queue
    }

    pub(crate) fn flush_index(&self) -> usize {
        self.flush_index.get()
    }

    pub(crate) fn set_flush_index(&self, index: usize) {
        self.flush_index.set(index);
    }

    pub(crate) fn pending_post_flush_cbs(&self) -> &RefCell<Vec<Rc<Job>>> {
        &self.pending_post_flush_cbs
    }

    pub(crate) fn active_post_flush_cbs(&self) -> &RefCell<Option<Vec<Rc<Job>>>> {
        &self.active_post_flush_cbs
    }

    pub(crate) fn post_flush_index(&self) -> usize {
        self.post_flush_index.get()
    }

    pub(crate) fn set_post_flush_index(&self, index: usize) {
        self.post_flush_index.set(index);
    }

    pub fn is_flushing(&self) -> bool {
        self.is_flushing.get()
    }

    pub(crate) fn set_is_flushing(&self, value: bool) {
        self.is_flushing.set(value);
    }

    pub fn is_flush_pending(&self) -> bool {
        self.is_flush_pending.get()
    }

    pub(crate) fn set_is_flush_pending(&self, value: bool) {
        self.is_flush_pending.set(value);
    }

    pub(crate) fn seen(&self) -> &RefCell<HashMap<usize, u32>> {
        &self.seen
    }

    pub(crate) fn next_tick_waiters(&self) -> &RefCell<Vec<Box<dyn FnOnce()>>> {
        &self.next_tick_waiters
    }

    pub fn report_error(&self, error: ReactiveError) {
        log::error!("{error}");
        if let Some(hook) = self.on_error.borrow().0.as_ref() {
            hook(&error);
        }
    }

    pub fn set_on_error(&self, hook: Option<crate::error::ErrorHook>) {
        self.on_error.borrow_mut().0 = hook;
    }
}

// =============================================================================
// THREAD-LOCAL ACCESS
// =============================================================================

thread_local! {
    static RUNTIME: Runtime = Runtime::new();
}

/// Access the thread-local runtime.
pub fn with_context<R>(f: impl FnOnce(&Runtime) -> R) -> R {
    RUNTIME.with(f)
}

// =============================================================================
// CONVENIENCE FUNCTIONS
// =============================================================================

/// Check if currently tracking dependencies (an effect is active and
/// tracking has not been paused).
pub fn is_tracking() -> bool {
    with_context(|rt| rt.active_effect().is_some() && rt.should_track())
}

pub fn is_untracking() -> bool {
    with_context(|rt| !rt.should_track())
}

pub fn is_batching() -> bool {
    with_context(|rt| rt.is_batching())
}

/// `pauseTracking()`.
pub fn pause_tracking() {
    with_context(Runtime::pause_tracking);
}

/// `enableTracking()`.
pub fn enable_tracking() {
    with_context(Runtime::enable_tracking);
}

/// `resetTracking()`.
pub fn reset_tracking() {
    with_context(Runtime::reset_tracking);
}
