// ============================================================================
// reactive-core - Primitives Module
// The writable reactive value (Signal) built atop the reactivity engine.
// Computed/DeferredComputed live in `reactivity` alongside the effect they
// are backed by.
// ============================================================================

pub mod signal;

pub use signal::{signal, signal_with_equals, Signal};
