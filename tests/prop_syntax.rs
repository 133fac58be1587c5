//! `DeferredComputed` and `peek`: values derived without the eager-notify
//! behavior of `computed`, and reads that intentionally don't subscribe.

use reactive_core::{deferred_computed, effect, peek, signal, tick};
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn deferred_computed_value_is_correct_after_a_tick() {
    let first = signal("Sherlock".to_string());
    let last = signal("Holmes".to_string());

    let full_name = {
        let first = first.clone();
        let last = last.clone();
        deferred_computed(move || format!("{} {}", first.get(), last.get()))
    };

    assert_eq!(full_name.get(), "Sherlock Holmes");

    first.set("Mycroft".to_string());
    tick();
    assert_eq!(full_name.get(), "Mycroft Holmes");
}

#[test]
fn peek_reads_without_subscribing() {
    let tracked = signal(1);
    let peeked = signal(100);

    let runs = Rc::new(RefCell::new(0));
    let runs_clone = Rc::clone(&runs);
    let (tracked_clone, peeked_clone) = (tracked.clone(), peeked.clone());

    let _e = effect(move || {
        let _ = tracked_clone.get();
        let _ = peek(|| peeked_clone.get());
        *runs_clone.borrow_mut() += 1;
    });
    assert_eq!(*runs.borrow(), 1);

    peeked.set(200);
    assert_eq!(*runs.borrow(), 1, "a peeked read never subscribes the effect");

    tracked.set(2);
    assert_eq!(*runs.borrow(), 2, "the tracked read still reruns the effect");
}
