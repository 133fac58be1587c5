// ============================================================================
// reactive-core - Core Module
// Fundamental types and the thread-local runtime for the reactive system
// ============================================================================

pub mod constants;
pub mod context;
pub mod types;

pub use constants::*;
pub use context::{
    enable_tracking, is_batching, is_tracking, is_untracking, pause_tracking, reset_tracking,
    with_context, Job, Runtime,
};
pub use types::{default_equals, Dep, EqualsFn, Key, TrackOp, TriggerOp, ValueCell};
