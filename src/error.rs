// ============================================================================
// reactive-core - Error Types
// The external error-handling collaborator, realized concretely.
// ============================================================================

use std::fmt;

/// Error surfaced by a fallible job closure during a scheduler drain.
///
/// Job closures return `Result<(), JobError>` instead of a bare `()` so that
/// a job's own failure can be routed through [`ReactiveError::Job`] without
/// resorting to panics for ordinary, expected failure modes.
pub type JobError = Box<dyn std::error::Error + 'static>;

/// Errors produced by the scheduler drain and the effect run boundary.
///
/// None of these are raised by `track`/`trigger` themselves, which are
/// infallible by construction. They all originate at the scheduler's job
/// dispatch boundary, matching the error taxonomy of job-internal failure,
/// recursion overflow, and effect panics.
#[derive(thiserror::Error, Debug)]
pub enum ReactiveError {
    /// A job closure returned `Err` while running inside a drain.
    #[error("job {id:?} failed during flush: {source}")]
    Job {
        id: Option<u64>,
        #[source]
        source: JobError,
    },

    /// A job was invoked more times than `RECURSION_LIMIT` within one drain.
    #[error("recursion limit ({limit}) exceeded for job {id:?}{}", owner_suffix(owner))]
    RecursionLimit {
        id: Option<u64>,
        limit: u32,
        owner: Option<String>,
    },

    /// An effect's user closure panicked while running inside the scheduler.
    #[error("effect panicked during run(): {0}")]
    EffectPanic(String),
}

fn owner_suffix(owner: &Option<String>) -> String {
    match owner {
        Some(name) => format!(" (owner: {name})"),
        None => String::new(),
    }
}

impl ReactiveError {
    pub fn job_id(&self) -> Option<u64> {
        match self {
            ReactiveError::Job { id, .. } => *id,
            ReactiveError::RecursionLimit { id, .. } => *id,
            ReactiveError::EffectPanic(_) => None,
        }
    }
}

/// Hook installed on a [`crate::core::context::Runtime`] to observe drain errors.
///
/// This is this crate's realization of the distilled spec's "external
/// error-handling collaborator": job failures never abort a drain or panic
/// the process; they are logged and, if a hook is installed, handed to it.
pub type ErrorHook = Box<dyn Fn(&ReactiveError)>;

impl fmt::Debug for ErrorHookHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorHookHolder")
            .field("installed", &self.0.is_some())
            .finish()
    }
}

/// Wrapper so `Runtime` (which derives little, since it is mostly Cells) can
/// hold an optional hook without fighting `Debug`/`Default` derives.
#[derive(Default)]
pub struct ErrorHookHolder(pub Option<ErrorHook>);
