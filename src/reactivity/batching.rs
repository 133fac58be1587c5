// ============================================================================
// reactive-core - Batching & Untracking
// `batch` coalesces every scheduler-less effect a block of writes would
// otherwise re-run immediately into a single re-run at the end of the
// block; `untrack` reads through a dependency without recording it.
// ============================================================================

use crate::core::context::with_context;

/// Run `f`, deferring every scheduler-less effect's re-run until the
/// outermost `batch` call returns. Effects with their own scheduler (a
/// computed's backing effect, for instance) are unaffected — they decide
/// their own timing independently of batching.
///
/// # Examples
///
/// ```
/// use reactive_core::{signal, effect, batch};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let a = signal(1);
/// let b = signal(2);
/// let runs = Rc::new(Cell::new(0));
///
/// let (a2, b2, runs2) = (a.clone(), b.clone(), runs.clone());
/// let _e = effect(move || {
///     let _ = a2.get() + b2.get();
///     runs2.set(runs2.get() + 1);
/// });
/// assert_eq!(runs.get(), 1);
///
/// batch(|| {
///     a.set(10);
///     b.set(20);
///     assert_eq!(runs.get(), 1); // deferred until batch exits
/// });
/// assert_eq!(runs.get(), 2);
/// ```
pub fn batch<T>(f: impl FnOnce() -> T) -> T {
    with_context(|rt| rt.enter_batch());

    struct BatchGuard;
    impl Drop for BatchGuard {
        fn drop(&mut self) {
            let depth = with_context(|rt| rt.exit_batch());
            if depth == 0 {
                crate::reactivity::scheduling::tick();
            }
        }
    }

    let _guard = BatchGuard;
    f()
}

/// Whether a `batch()` call is currently on the stack.
pub fn is_batching() -> bool {
    with_context(|rt| rt.is_batching())
}

/// Run `f` with tracking suspended: reads performed inside never subscribe
/// the currently-running effect, regardless of nesting.
///
/// # Examples
///
/// ```
/// use reactive_core::{signal, effect, untrack};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let a = signal(1);
/// let b = signal(2);
/// let runs = Rc::new(Cell::new(0));
///
/// let (a2, b2, runs2) = (a.clone(), b.clone(), runs.clone());
/// let _e = effect(move || {
///     let _ = a2.get();
///     let _ = untrack(|| b2.get());
///     runs2.set(runs2.get() + 1);
/// });
/// assert_eq!(runs.get(), 1);
///
/// b.set(20); // not tracked
/// assert_eq!(runs.get(), 1);
///
/// a.set(10); // tracked
/// assert_eq!(runs.get(), 2);
/// ```
pub fn untrack<T>(f: impl FnOnce() -> T) -> T {
    with_context(|rt| rt.pause_tracking());

    struct UntrackGuard;
    impl Drop for UntrackGuard {
        fn drop(&mut self) {
            with_context(|rt| rt.reset_tracking());
        }
    }

    let _guard = UntrackGuard;
    f()
}

/// Alias for [`untrack`] that reads more naturally at a call site that is
/// "peeking" at a value rather than suppressing tracking as a policy.
pub fn peek<T>(f: impl FnOnce() -> T) -> T {
    untrack(f)
}

/// Whether a read performed right now would be tracked: an effect is
/// running and tracking hasn't been paused.
pub fn is_untracking() -> bool {
    with_context(|rt| !rt.should_track())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::with_context;
    use crate::core::types::{Dep, TrackOp, TriggerOp};
    use crate::reactivity::effect::ReactiveEffect;
    use crate::reactivity::tracking::{track, trigger_one};
    use std::cell::RefCell as StdRefCell;
    use std::rc::Rc;

    fn run_tracked(effect: &Rc<ReactiveEffect>, body: impl FnOnce()) {
        with_context(|rt| {
            rt.push_active_effect(Rc::clone(effect));
            rt.enter_track_depth();
        });
        body();
        with_context(|rt| {
            rt.exit_track_depth();
            rt.pop_active_effect();
        });
    }

    #[test]
    fn batch_coalesces_multiple_triggers_into_one_run() {
        let dep = Dep::new();
        let runs = Rc::new(StdRefCell::new(0));
        let runs2 = Rc::clone(&runs);
        let effect = ReactiveEffect::new(move || *runs2.borrow_mut() += 1, None);
        run_tracked(&effect, || track(&dep, TrackOp::Get));

        batch(|| {
            trigger_one(&dep, TriggerOp::Set);
            trigger_one(&dep, TriggerOp::Set);
            assert_eq!(*runs.borrow(), 0, "deferred until batch exits");
        });

        assert_eq!(*runs.borrow(), 1);
    }

    #[test]
    fn nested_batches_flush_once_outermost_exits() {
        let dep = Dep::new();
        let runs = Rc::new(StdRefCell::new(0));
        let runs2 = Rc::clone(&runs);
        let effect = ReactiveEffect::new(move || *runs2.borrow_mut() += 1, None);
        run_tracked(&effect, || track(&dep, TrackOp::Get));

        batch(|| {
            batch(|| {
                trigger_one(&dep, TriggerOp::Set);
            });
            assert_eq!(*runs.borrow(), 0, "inner batch exit must not flush");
        });
        assert_eq!(*runs.borrow(), 1);
    }

    #[test]
    fn batch_panic_safety_restores_depth() {
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            batch(|| panic!("boom"));
        }));
        assert!(result.is_err());
        assert!(!is_batching());
    }

    #[test]
    fn untrack_suppresses_dependency_recording() {
        let dep = Dep::new();
        let effect = ReactiveEffect::new(|| {}, None);
        run_tracked(&effect, || {
            untrack(|| track(&dep, TrackOp::Get));
        });
        assert!(!dep.has(&effect));
    }

    #[test]
    fn nested_untrack_restores_outer_state() {
        assert!(!is_untracking());
        untrack(|| {
            assert!(is_untracking());
            untrack(|| {
                assert!(is_untracking());
            });
            assert!(is_untracking());
        });
        assert!(!is_untracking());
    }

    #[test]
    fn peek_is_alias_for_untrack() {
        let dep = Dep::new();
        let effect = ReactiveEffect::new(|| {}, None);
        run_tracked(&effect, || {
            peek(|| track(&dep, TrackOp::Get));
        });
        assert!(!dep.has(&effect));
    }
}
