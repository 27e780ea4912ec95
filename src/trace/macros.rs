/// Create a new [`TracedError`] from a format string, capturing the call
/// stack at the call site
///
/// [`TracedError`]: crate::trace::TracedError
#[macro_export]
macro_rules! errorf {
    ($tracer:expr, $($arg:tt)*) => {
        $tracer.new_error(format!($($arg)*))
    };
}

/// Wrap the error of a `Result` with a formatted message and a call stack
/// snapshot. The message is only formatted on the error path.
#[macro_export]
macro_rules! wrapf {
    ($result:expr, $tracer:expr, $($arg:tt)*) => {
        $crate::trace::ResultExt::wrap_with($result, $tracer, || format!($($arg)*))
    };
}
