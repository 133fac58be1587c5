//! A tour of the public surface: signals, `cloned!`, computed chains, and
//! the reactive collections built on top of the core primitives.

use reactive_core::{cloned, computed, effect, signal, ReactiveMap, ReactiveVec};
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn showcase_basics() {
    let count = signal(1);
    let multiplier = signal(10);

    let result = computed(cloned!(count, multiplier => move || {
        count.get() * multiplier.get()
    }));

    assert_eq!(result.get(), 10);
}

#[test]
fn showcase_reactive_vec_drives_an_effect() {
    let items = ReactiveVec::from_vec(vec![1, 2, 3]);
    let seen_len = Rc::new(RefCell::new(0));
    let seen_len_clone = Rc::clone(&seen_len);

    let items_for_effect = items.clone();
    let _e = effect(move || {
        *seen_len_clone.borrow_mut() = items_for_effect.len();
    });
    assert_eq!(*seen_len.borrow(), 3);

    items.push(4);
    assert_eq!(*seen_len.borrow(), 4);
}

#[test]
fn showcase_reactive_map_with_computed_formatting() {
    let scores: ReactiveMap<&'static str, i32> = ReactiveMap::new();
    scores.insert("alice", 10);

    let scores_for_total = scores.clone();
    let total = computed(move || scores_for_total.values().into_iter().sum::<i32>());

    assert_eq!(total.get(), 10);

    scores.insert("bob", 5);
    assert_eq!(total.get(), 15);
}
