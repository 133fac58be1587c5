// ============================================================================
// reactive-core - Track / Trigger (C4)
// The two operations every reactive primitive calls: `track` to record that
// the current effect read this dep, `trigger` to fire every effect that did.
// ============================================================================

use std::rc::Rc;

use crate::core::constants::MAX_MARKER_BITS;
use crate::core::context::with_context;
use crate::core::types::{track_op_bit, Dep, TrackOp, TriggerOp};
use crate::reactivity::effect::ReactiveEffect;

/// Record that the currently-running effect (if any) read `dep`.
///
/// A no-op outside of an effect's `run()`, or while tracking is paused —
/// both of which are the common case for a plain read performed outside any
/// reactive scope.
pub fn track(dep: &Rc<Dep>, op: TrackOp) {
    with_context(|rt| {
        if !rt.should_track() {
            return;
        }
        let Some(effect) = rt.active_effect() else {
            return;
        };
        effect.notify_track(op);

        let depth = rt.effect_track_depth();
        if depth == 0 {
            return;
        }

        match (depth <= MAX_MARKER_BITS).then(|| track_op_bit(depth)) {
            Some(bit) => {
                // Already recorded as newly-tracked this run: nothing to do.
                if !dep.new_tracked(bit) {
                    dep.mark_new_tracked(bit);
                    if !dep.has(&effect) {
                        dep.add(&effect);
                        effect.push_dep(Rc::clone(dep));
                        log_new_subscription(&effect, op);
                    }
                }
            }
            None => {
                // Past the marker ceiling: membership is the only signal we
                // have, since there's no free bit to dedicate to this depth.
                if !dep.has(&effect) {
                    dep.add(&effect);
                    effect.push_dep(Rc::clone(dep));
                    log_new_subscription(&effect, op);
                }
            }
        }
    });
}

/// Fire every effect subscribed to any of `deps`, deduplicated by identity,
/// with computed-backed effects run before plain ones so a plain effect
/// reading a computed sees its fresh value.
pub fn trigger(deps: &[Rc<Dep>], op: TriggerOp) {
    if deps.is_empty() {
        return;
    }

    let mut effects: Vec<Rc<ReactiveEffect>> = Vec::new();
    for dep in deps {
        for effect in dep.snapshot() {
            if !effects.iter().any(|existing| Rc::ptr_eq(existing, &effect)) {
                effects.push(effect);
            }
        }
    }

    let (computed_backed, plain): (Vec<_>, Vec<_>) =
        effects.into_iter().partition(ReactiveEffect::is_computed);

    for effect in computed_backed.iter().chain(plain.iter()) {
        trigger_effect(effect, op);
    }
}

/// Convenience for the overwhelmingly common single-dep case.
pub fn trigger_one(dep: &Rc<Dep>, op: TriggerOp) {
    trigger(std::slice::from_ref(dep), op);
}

/// Cheap breadcrumb for the common unobserved path: when an effect has no
/// `on_track` debug hook installed, a new subscription is logged instead so
/// the ordinary (non-debug) case still leaves a trace.
fn log_new_subscription(effect: &Rc<ReactiveEffect>, op: TrackOp) {
    if !effect.has_on_track_hook() {
        log::debug!("effect {} subscribed to a new dep via {:?}", effect.id(), op);
    }
}

fn trigger_effect(effect: &Rc<ReactiveEffect>, op: TriggerOp) {
    if !effect.is_active() {
        return;
    }

    let is_self_trigger =
        with_context(|rt| rt.active_effect().is_some_and(|top| Rc::ptr_eq(&top, effect)));
    if is_self_trigger && !effect.allow_recurse() {
        return;
    }

    effect.notify_trigger(op);

    if effect.has_scheduler() {
        effect.scheduler_run();
    } else if with_context(|rt| rt.is_batching()) {
        effect.queue_as_batch_job();
    } else {
        effect.run();
    }
}
