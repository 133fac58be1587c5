// ============================================================================
// reactive-core - Ergonomic Macros
// ============================================================================

/// Helper macro to clone variables into a move closure.
///
/// This reduces the boilerplate of manually cloning `Rc` or `Signal` types
/// before moving them into a closure.
///
/// # Usage
///
/// ```rust
/// use reactive_core::{cloned, signal, computed};
///
/// let a = signal(1);
/// let b = signal(2);
///
/// // Instead of:
/// // let a_clone = a.clone();
/// // let b_clone = b.clone();
/// // computed(move || a_clone.get() + b_clone.get());
///
/// // Use:
/// let sum = computed(cloned!(a, b => move || a.get() + b.get()));
/// ```
#[macro_export]
macro_rules! cloned {
    ($($n:ident),+ => $e:expr) => {
        {
            $( let $n = $n.clone(); )+
            $e
        }
    };
}

// Note: we don't define computed!/effect! macros as they would likely
// conflict with the function names or require distinct naming. The
// cloned! macro provides most of the ergonomic benefit with none of the
// confusion.
