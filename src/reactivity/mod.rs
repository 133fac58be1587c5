// ============================================================================
// reactive-core - Reactivity Module
// Dependency tracking, effect scheduling, and the primitives built on them.
// ============================================================================

pub mod batching;
pub mod computed;
pub mod effect;
pub mod scheduling;
pub mod target_map;
pub mod tracking;

pub use batching::{batch, is_batching, is_untracking, peek, untrack};
pub use computed::{computed, deferred_computed, Computed, DeferredComputed};
pub use effect::{effect, effect_with, Effect, EffectOptions, ReactiveEffect, SchedulerFn};
pub use scheduling::{
    flush_pre_flush_cbs, invalidate_job, next_tick, queue_job, queue_post_flush_cb, tick,
};
pub use target_map::{TargetKind, TargetMap};
pub use tracking::{track, trigger, trigger_one};
