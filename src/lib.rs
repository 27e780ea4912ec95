#![deny(missing_docs)]

//! This is snag, a small error handling toolkit that decorates error values with
//! stack traces and aggregates many independent errors into a single reportable one.
//!
//! The [`trace`] module wraps any error with a rendered snapshot of the call stack
//! taken where the error was created, filtered by symbol prefix and bounded in depth.
//! Capture is driven by an explicit [`Tracer`] service instead of process wide state,
//! so different parts of an application can use different configurations safely.
//!
//! The [`group`] module collects errors reported by parallel workers into one value
//! that satisfies the standard error contract and renders a combined report, keeping
//! an exact count of every error ever recorded even past its retention bound.
//!
//! The [`chain`] module inspects error cause chains, tunnelling transparently through
//! the decorations added by [`trace`].
//!
//! Lastly snag provides some testing utilities in the [`test`] module.
//!
//! [`trace`]: self::trace
//! [`group`]: self::group
//! [`chain`]: self::chain
//! [`test`]: self::test
//! [`Tracer`]: self::trace::Tracer

/// Error chain iteration and inspection
pub mod chain;

/// Thread safe aggregation of independent errors
pub mod group;

/// Stack capturing error decoration
pub mod trace;

#[cfg(any(test, feature = "test"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test")))]
/// Test utilities for crates using snag
pub mod test;

pub use chain::{chain, find_cause, is_cause, Chain};
pub use group::ErrorGroup;
pub use trace::{
    OptionExt, ResultExt, TraceConfig, TracedError, Tracer, DEFAULT_MAX_FRAMES,
};
