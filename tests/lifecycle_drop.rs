//! Disposal semantics: stopping an effect (explicitly or via dropping its
//! last handle) must release its deps and run its `on_stop` hook exactly
//! once, and a stopped effect must never react to a later trigger.

use reactive_core::{effect, effect_with, signal, EffectOptions};
use std::cell::Cell;
use std::rc::Rc;

#[test]
fn dropping_the_last_handle_stops_the_effect() {
    let cleanup_called = Rc::new(Cell::new(false));
    let cleanup_clone = Rc::clone(&cleanup_called);

    {
        let _e = effect_with(
            || {},
            EffectOptions {
                on_stop: Some(Box::new(move || cleanup_clone.set(true))),
                ..Default::default()
            },
        );
        // `_e` drops here; its Rc<ReactiveEffect> strong count goes to zero.
    }

    assert!(cleanup_called.get(), "dropping the last handle should stop the effect");
}

#[test]
fn explicit_stop_prevents_further_reruns() {
    let run_count = Rc::new(Cell::new(0));
    let run_count_clone = Rc::clone(&run_count);

    let source = signal(0);
    let source_clone = source.clone();

    let handle = effect(move || {
        source_clone.get();
        run_count_clone.set(run_count_clone.get() + 1);
    });
    assert_eq!(run_count.get(), 1);

    source.set(1);
    assert_eq!(run_count.get(), 2);

    handle.stop();

    source.set(2);
    assert_eq!(run_count.get(), 2, "a stopped effect must not rerun");
    assert!(!handle.is_active());
}

#[test]
fn cloned_handles_share_one_effect_and_stop_together() {
    let run_count = Rc::new(Cell::new(0));
    let run_count_clone = Rc::clone(&run_count);
    let source = signal(0);
    let source_clone = source.clone();

    let handle1 = effect(move || {
        source_clone.get();
        run_count_clone.set(run_count_clone.get() + 1);
    });
    let handle2 = handle1.clone();

    source.set(1);
    assert_eq!(run_count.get(), 2);

    handle1.stop();

    source.set(2);
    assert_eq!(run_count.get(), 2, "stopping one handle stops the shared effect");
    assert!(!handle2.is_active());
}

#[test]
fn lazy_effect_does_not_run_until_first_trigger_or_manual_run() {
    let run_count = Rc::new(Cell::new(0));
    let run_count_clone = Rc::clone(&run_count);
    let source = signal(0);
    let source_clone = source.clone();

    let handle = effect_with(
        move || {
            source_clone.get();
            run_count_clone.set(run_count_clone.get() + 1);
        },
        EffectOptions {
            lazy: true,
            ..Default::default()
        },
    );
    assert_eq!(run_count.get(), 0, "lazy effect skips the eager first run");

    source.set(1);
    assert_eq!(run_count.get(), 1);

    handle.run();
    assert_eq!(run_count.get(), 2);
}

#[test]
fn stop_called_from_within_its_own_run_is_deferred_until_the_run_completes() {
    let run_count = Rc::new(Cell::new(0));
    let run_count_clone = Rc::clone(&run_count);
    let source = signal(0);
    let source_clone = source.clone();

    // Build the handle behind an Rc<RefCell<Option<_>>> so the closure can
    // reach back in and stop itself mid-run.
    let handle_slot: Rc<std::cell::RefCell<Option<reactive_core::Effect>>> =
        Rc::new(std::cell::RefCell::new(None));
    let handle_slot_clone = Rc::clone(&handle_slot);

    let handle = effect(move || {
        source_clone.get();
        run_count_clone.set(run_count_clone.get() + 1);
        if let Some(h) = handle_slot_clone.borrow().as_ref() {
            h.stop();
        }
    });
    *handle_slot.borrow_mut() = Some(handle.clone());

    assert_eq!(run_count.get(), 1);
    source.set(1);
    assert_eq!(run_count.get(), 2, "the in-flight run completes before the deferred stop lands");

    source.set(2);
    assert_eq!(run_count.get(), 2, "the deferred stop suppresses every later rerun");
}
