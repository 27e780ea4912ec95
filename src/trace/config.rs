/// Default maximum number of stack frames retained by a capture
pub const DEFAULT_MAX_FRAMES: usize = 32;

/// Configuration for stack capture, injected into a [`Tracer`] at creation.
///
/// [`Tracer`]: super::Tracer
#[derive(Clone, Debug)]
pub struct TraceConfig {
    filter: Option<String>,
    max_frames: usize,
}

impl TraceConfig {
    /// Retain only frames whose fully qualified function name starts with the
    /// given prefix. Frames that do not match are skipped without consuming
    /// any of the frame budget.
    pub fn with_filter<T: Into<String>>(mut self, prefix: T) -> Self {
        self.filter = Some(prefix.into());
        self
    }

    /// Cap the number of frames retained per capture. Setting this to 0
    /// disables capture entirely and the stack is not walked at all.
    pub fn with_max_frames(mut self, max_frames: usize) -> Self {
        self.max_frames = max_frames;
        self
    }

    /// Symbol prefix filter, if any
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Maximum number of frames retained per capture
    pub fn max_frames(&self) -> usize {
        self.max_frames
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            filter: None,
            max_frames: DEFAULT_MAX_FRAMES,
        }
    }
}
