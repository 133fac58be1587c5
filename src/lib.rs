// ============================================================================
// reactive-core - A Fine-Grained Reactive Dependency-Tracking Engine
// ============================================================================
//
// Dependency tracking (`track`/`trigger`), an effect that re-runs when the
// values it read last time change, a deterministic two-phase job scheduler,
// and memoized derived values (`computed`/`deferred_computed`) built on top.
//
// ```
// use reactive_core::{signal, effect};
//
// let count = signal(0);
// let seen = std::cell::Cell::new(0);
// let count_for_effect = count.clone();
// let _e = effect(move || {
//     seen.set(count_for_effect.get());
// });
// count.set(5);
// ```
// ============================================================================

pub mod collections;
pub mod core;
pub mod error;
pub mod macros;
pub mod primitives;
pub mod reactivity;

pub use core::constants;
pub use core::context::{
    enable_tracking, is_batching, is_tracking, is_untracking, pause_tracking, reset_tracking,
    with_context, Job, Runtime,
};
pub use core::types::{default_equals, Dep, EqualsFn, Key, TrackOp, TriggerOp, ValueCell};
pub use error::{ErrorHook, JobError, ReactiveError};

pub use primitives::signal::{signal, signal_with_equals, Signal};

pub use reactivity::batching::{batch, peek, untrack};
pub use reactivity::computed::{computed, deferred_computed, Computed, DeferredComputed};
pub use reactivity::effect::{effect, effect_with, Effect, EffectOptions, ReactiveEffect};
pub use reactivity::scheduling::{invalidate_job, next_tick, queue_job, queue_post_flush_cb, tick};
pub use reactivity::target_map::{TargetKind, TargetMap};
pub use reactivity::tracking::{track, trigger, trigger_one};

pub use collections::{ReactiveMap, ReactiveSet, ReactiveVec};
