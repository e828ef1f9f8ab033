//! Stack headroom for reducing deep expression trees.
//!
//! `reduce` and `get_type` recurse once per nesting level, and a generated
//! predicate can nest far deeper than the main thread's stack allows. Each
//! level therefore checks its remaining stack and, when short, moves onto a
//! freshly allocated segment. `EvalOptions::max_depth`, when set, caps the
//! nesting outright.

/// Run one level of reduction with at least `HEADROOM` bytes of stack.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn with_stack_headroom<R>(level: impl FnOnce() -> R) -> R {
    const HEADROOM: usize = 128 * 1024;
    const SEGMENT: usize = 2 * 1024 * 1024;

    stacker::maybe_grow(HEADROOM, SEGMENT, level)
}

/// `stacker` cannot switch stacks on wasm; only `max_depth` applies there.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn with_stack_headroom<R>(level: impl FnOnce() -> R) -> R {
    level()
}
