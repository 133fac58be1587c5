// ============================================================================
// reactive-core - Constants
// ============================================================================

/// Ceiling on `effect_track_depth` before the marker-bit sweep in
/// [`crate::reactivity::effect::ReactiveEffect::run`] falls back to a full
/// cleanup-and-retrack pass. Beyond this depth a `u32` has no free bit left
/// to dedicate to the current nesting level.
pub const MAX_MARKER_BITS: u32 = 30;

/// Maximum number of times a single job may run within one scheduler drain
/// before it is treated as runaway and skipped with a warning.
pub const RECURSION_LIMIT: u32 = 100;
