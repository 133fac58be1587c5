//! `cloned!` used to avoid the manual-clone dance before a `move` closure,
//! including nested use inside `untrack`.

use reactive_core::{cloned, computed, effect, signal, untrack};

#[test]
fn cloned_macro_vs_manual_clone() {
    let a = signal(10);
    let b = signal(20);

    // Manual clone-before-move, for comparison.
    let sum_manual = computed({
        let a = a.clone();
        let b = b.clone();
        move || a.get() + b.get()
    });

    // `cloned!` does the same thing with less boilerplate.
    let sum = computed(cloned!(a, b => move || a.get() + b.get()));

    assert_eq!(sum_manual.get(), 30);
    assert_eq!(sum.get(), 30);

    a.set(15);
    assert_eq!(sum_manual.get(), 35);
    assert_eq!(sum.get(), 35);
}

#[test]
fn cloned_macro_captures_multiple_signals_in_an_effect() {
    let a = signal(0);
    let b = signal(0);

    let _e = effect(cloned!(a, b => move || {
        let _ = a.get();
        let _ = b.get();
    }));

    a.set(1);
    // Passes as long as this compiles and doesn't panic.
}

#[test]
fn cloned_macro_nests_inside_untrack() {
    let a = signal(1);

    let d = computed(cloned!(a => move || {
        untrack(cloned!(a => move || a.get() * 2))
    }));

    assert_eq!(d.get(), 2);
}
