use std::error::Error;

use super::traced::TracedError;
use super::tracer::Tracer;

/// Decoration helpers for `Result`, leaving the success path untouched so
/// call sites can decorate unconditionally without checking for an error
/// first
pub trait ResultExt<T> {
    /// Decorate the error with a call stack snapshot
    fn capture(self, tracer: &Tracer) -> Result<T, TracedError>;

    /// Wrap the error with a contextual message and a call stack snapshot
    fn wrap<C: Into<String>>(self, tracer: &Tracer, context: C) -> Result<T, TracedError>;

    /// Same as [`wrap`] except the message is only built on the error path
    ///
    /// [`wrap`]: ResultExt::wrap
    fn wrap_with<F>(self, tracer: &Tracer, context: F) -> Result<T, TracedError>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<Box<dyn Error + Send + Sync>>,
{
    fn capture(self, tracer: &Tracer) -> Result<T, TracedError> {
        self.map_err(|error| tracer.capture(error))
    }

    fn wrap<C: Into<String>>(self, tracer: &Tracer, context: C) -> Result<T, TracedError> {
        self.map_err(|error| tracer.wrap(error, context))
    }

    fn wrap_with<F>(self, tracer: &Tracer, context: F) -> Result<T, TracedError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|error| tracer.wrap(error, context()))
    }
}

/// Decoration helper for `Option`, turning an absent value into a traced
/// error
pub trait OptionExt<T> {
    /// Turn `None` into a traced error with the given message
    fn or_error<M: Into<String>>(self, tracer: &Tracer, message: M) -> Result<T, TracedError>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_error<M: Into<String>>(self, tracer: &Tracer, message: M) -> Result<T, TracedError> {
        self.ok_or_else(|| tracer.new_error(message))
    }
}
