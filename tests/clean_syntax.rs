//! Ergonomic surface: `signal`/`effect`/`computed` composed directly, plus
//! `cloned!` for multi-signal closures, with no macro magic beyond that.

use reactive_core::{cloned, computed, effect, signal};

#[test]
fn computed_tracks_two_signals() {
    let a = signal(10);
    let b = signal(20);

    let sum = computed(cloned!(a, b => move || a.get() + b.get()));

    assert_eq!(sum.get(), 30);

    a.set(15);
    assert_eq!(sum.get(), 35);
}

#[test]
fn effect_tracks_two_signals_via_cloned() {
    let a = signal(0);
    let b = signal(0);

    let _e = effect(cloned!(a, b => move || {
        let _ = a.get();
        let _ = b.get();
    }));

    a.set(1);
    b.set(2);
}
