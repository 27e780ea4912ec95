use std::error::Error;
use std::fmt;

/// An error decorated with a snapshot of the call stack taken when it was
/// created.
///
/// The trace is rendered once at construction and never recomputed, so it
/// reflects the stack at wrap time rather than at display time. The decorated
/// error stays reachable through [`source`] as well as by value through
/// [`into_cause`], so chain inspection and sentinel checks tunnel through the
/// decoration transparently.
///
/// [`source`]: std::error::Error::source
/// [`into_cause`]: TracedError::into_cause
#[derive(Debug)]
pub struct TracedError {
    context: Option<String>,
    cause: Box<dyn Error + Send + Sync>,
    trace: String,
}

impl TracedError {
    pub(crate) fn new(
        context: Option<String>,
        cause: Box<dyn Error + Send + Sync>,
        trace: String,
    ) -> Self {
        Self {
            context,
            cause,
            trace,
        }
    }

    /// Contextual message attached when wrapping, if any
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// The decorated error
    pub fn cause(&self) -> &(dyn Error + 'static) {
        &*self.cause
    }

    /// Recover the decorated error by value, discarding the decoration
    pub fn into_cause(self) -> Box<dyn Error + Send + Sync> {
        self.cause
    }

    /// Rendered stack trace, one two-line block per frame. Empty when capture
    /// was disabled or no frame matched the configured filter.
    pub fn trace(&self) -> &str {
        &self.trace
    }

    /// The message without any trace block, as used when this error appears
    /// inside an aggregate rendering. Nested decorations contribute their
    /// bare messages as well.
    pub fn message(&self) -> String {
        let cause = match self.cause().downcast_ref::<TracedError>() {
            Some(traced) => traced.message(),
            None => self.cause.to_string(),
        };

        match &self.context {
            Some(context) => format!("{}: {}", context, cause),
            None => cause,
        }
    }
}

impl fmt::Display for TracedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(f, "{}: ", context)?;
        }

        write!(f, "{}", self.cause)?;

        if !self.trace.is_empty() {
            write!(f, "\n{}", self.trace)?;
        }

        Ok(())
    }
}

impl Error for TracedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.cause())
    }
}
