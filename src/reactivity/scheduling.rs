// ============================================================================
// reactive-core - Scheduler (C5)
// A deterministic job queue with pre/post phases and a recursion backstop,
// drained explicitly via `tick()` rather than a promise microtask.
// ============================================================================

use std::cmp::Reverse;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use crate::core::constants::RECURSION_LIMIT;
use crate::core::context::{with_context, Job};
use crate::error::ReactiveError;

/// Ascending `id` (id-less jobs sort last via `getid() == u64::MAX`), with
/// pre-jobs ordered before non-pre jobs at equal id. Spelled out explicitly
/// rather than leaning on sort stability for the pre-before-non-pre
/// tie-break, since enqueue order is not a contract this scheduler makes.
fn job_order(a: &Rc<Job>, b: &Rc<Job>) -> std::cmp::Ordering {
    a.getid()
        .cmp(&b.getid())
        .then_with(|| Reverse(a.pre).cmp(&Reverse(b.pre)))
}

/// Run one job's `invoke()` inside `catch_unwind`, converting a panic into
/// `ReactiveError::EffectPanic` rather than unwinding the whole drain loop.
/// This is the scheduler-boundary-only use of `catch_unwind` described in
/// the crate's error-handling notes: a `run()` called directly by host code
/// is never wrapped this way.
fn invoke_job(job: &Rc<Job>) -> Result<(), ReactiveError> {
    match catch_unwind(AssertUnwindSafe(|| job.invoke())) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(source)) => Err(ReactiveError::Job { id: job.id, source }),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "effect panicked with a non-string payload".to_string());
            Err(ReactiveError::EffectPanic(message))
        }
    }
}

/// Queue a job for the next drain. Idempotent: re-queuing a job already in
/// the queue (by identity) is a no-op, matching the "only run once per
/// flush, even if triggered many times" requirement.
pub fn queue_job(job: Rc<Job>) {
    with_context(|rt| {
        let mut queue = rt.queue().borrow_mut();
        if !queue.iter().any(|existing| Rc::ptr_eq(existing, &job)) {
            queue.push(job);
        }
        drop(queue);
        rt.set_is_flush_pending(true);
    });
}

/// Queue a callback to run once the current (or next) drain's jobs have all
/// settled — DOM-update-style "after paint" work, realized here as "after
/// every queued job ran".
pub fn queue_post_flush_cb(job: Rc<Job>) {
    with_context(|rt| {
        rt.pending_post_flush_cbs().borrow_mut().push(job);
        rt.set_is_flush_pending(true);
    });
}

/// Turn a still-queued job into a no-op without splicing the queue mid-drain.
pub fn invalidate_job(job: &Rc<Job>) {
    job.deactivate();
}

/// Drain every `pre`-marked job out of the main queue right now, ahead of
/// the ordinary drain — the operation a watch callback calls to force its
/// own pre-update-observing jobs to run before it reads state that a
/// still-queued non-pre job would otherwise have changed first.
///
/// Scans from `flush_index + 1` if a drain is currently in flight (the jobs
/// already invoked, at or before `flush_index`, are skipped), or from the
/// start of the queue otherwise. Each pre-job found is spliced out and
/// invoked immediately, then the scan resumes from the same index — so a
/// pre-job that itself enqueues another pre-job at or after that index is
/// picked up in the same call rather than left for the next one.
pub fn flush_pre_flush_cbs() {
    let start = with_context(|rt| {
        if rt.is_flushing() {
            rt.flush_index() + 1
        } else {
            0
        }
    });

    let mut index = start;
    loop {
        let job = with_context(|rt| {
            let queue = rt.queue().borrow();
            queue[index..].iter().position(|job| job.pre).map(|offset| {
                let job = Rc::clone(&queue[index + offset]);
                (index + offset, job)
            })
        });
        let Some((found_at, job)) = job else { break };
        with_context(|rt| {
            rt.queue().borrow_mut().remove(found_at);
        });
        index = found_at;

        if !job.is_active() {
            continue;
        }
        if check_recursive_updates(&job) {
            continue;
        }
        if let Err(err) = invoke_job(&job) {
            with_context(|rt| rt.report_error(err));
        }
    }
}

/// Drain the job queue, then the post-flush queue, then run anything waiting
/// on [`next_tick`]. This is the crate's explicit stand-in for a promise
/// microtask: nothing drains until a host calls this (directly, or via
/// [`tick`]).
pub fn flush_jobs() {
    let should_run = with_context(|rt| {
        if rt.is_flushing() {
            false
        } else {
            rt.set_is_flushing(true);
            rt.set_is_flush_pending(false);
            true
        }
    });
    if !should_run {
        return;
    }

    with_context(|rt| {
        let mut queue = rt.queue().borrow_mut();
        queue.sort_by(job_order);
        log::trace!("flush_jobs: draining {} job(s)", queue.len());
    });

    loop {
        let job = with_context(|rt| {
            let index = rt.flush_index();
            rt.queue().borrow().get(index).cloned()
        });
        let Some(job) = job else { break };
        with_context(|rt| rt.set_flush_index(rt.flush_index() + 1));

        if !job.is_active() {
            continue;
        }
        if check_recursive_updates(&job) {
            continue;
        }
        if let Err(err) = invoke_job(&job) {
            with_context(|rt| rt.report_error(err));
        }
    }

    with_context(|rt| {
        rt.set_flush_index(0);
        rt.queue().borrow_mut().clear();
        rt.seen().borrow_mut().clear();
        rt.set_is_flushing(false);
    });

    log::trace!("flush_jobs: job queue drained");

    flush_post_flush_cbs();

    let waiters = with_context(|rt| std::mem::take(&mut *rt.next_tick_waiters().borrow_mut()));
    for waiter in waiters {
        waiter();
    }

    // Jobs queued by post-flush callbacks or tick waiters need their own drain.
    let more_pending = with_context(|rt| !rt.queue().borrow().is_empty());
    if more_pending {
        flush_jobs();
    }
}

fn flush_post_flush_cbs() {
    with_context(|rt| {
        let pending = std::mem::take(&mut *rt.pending_post_flush_cbs().borrow_mut());
        if pending.is_empty() {
            return;
        }
        let mut dedup: Vec<Rc<Job>> = Vec::new();
        for job in pending {
            if !dedup.iter().any(|existing| Rc::ptr_eq(existing, &job)) {
                dedup.push(job);
            }
        }
        dedup.sort_by_key(Job::getid);
        log::trace!("flush_post_flush_cbs: draining {} callback(s)", dedup.len());
        *rt.active_post_flush_cbs().borrow_mut() = Some(dedup);
        rt.set_post_flush_index(0);
    });

    loop {
        let job = with_context(|rt| {
            let index = rt.post_flush_index();
            rt.active_post_flush_cbs()
                .borrow()
                .as_ref()
                .and_then(|jobs| jobs.get(index).cloned())
        });
        let Some(job) = job else { break };
        with_context(|rt| rt.set_post_flush_index(rt.post_flush_index() + 1));

        if !job.is_active() {
            continue;
        }
        if check_recursive_updates(&job) {
            continue;
        }
        if let Err(err) = invoke_job(&job) {
            with_context(|rt| rt.report_error(err));
        }
    }

    with_context(|rt| {
        *rt.active_post_flush_cbs().borrow_mut() = None;
        rt.set_post_flush_index(0);
    });
}

/// A job invoked more than `RECURSION_LIMIT` times within one drain is almost
/// certainly a job that re-queues itself on every run; skip it and report
/// rather than spinning the drain loop forever.
fn check_recursive_updates(job: &Rc<Job>) -> bool {
    with_context(|rt| {
        let mut seen = rt.seen().borrow_mut();
        let count = seen.entry(Rc::as_ptr(job) as usize).or_insert(0);
        *count += 1;
        if *count > RECURSION_LIMIT {
            drop(seen);
            log::warn!(
                "job {:?} exceeded recursion limit ({}){}",
                job.id,
                RECURSION_LIMIT,
                job.owner_label
                    .as_ref()
                    .map(|name| format!(" (owner: {name})"))
                    .unwrap_or_default()
            );
            rt.report_error(ReactiveError::RecursionLimit {
                id: job.id,
                limit: RECURSION_LIMIT,
                owner: job.owner_label.clone(),
            });
            true
        } else {
            false
        }
    })
}

/// Drain every pending job and post-flush callback synchronously. The host's
/// substitute for awaiting a microtask.
pub fn tick() {
    flush_jobs();
}

/// Run `cb` once the in-flight (or next) drain finishes, or immediately if
/// nothing is queued and no drain is in flight.
pub fn next_tick(cb: impl FnOnce() + 'static) {
    let run_immediately = with_context(|rt| {
        !rt.is_flushing() && !rt.is_flush_pending() && rt.queue().borrow().is_empty()
    });
    if run_immediately {
        cb();
    } else {
        with_context(|rt| rt.next_tick_waiters().borrow_mut().push(Box::new(cb)));
    }
}
