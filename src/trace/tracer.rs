use std::error::Error;
use std::fmt::Write as _;

use tracing::trace;

use super::config::TraceConfig;
use super::traced::TracedError;

/// Symbol prefixes of frames that belong to the capture plumbing or the host
/// runtime rather than user code. This list is a compatibility shim tied to
/// the naming conventions of the current toolchain; adjustments for a new
/// target runtime belong here and nowhere else.
const INFRASTRUCTURE: &[&str] = &[
    "snag::trace",
    "backtrace::",
    "std::",
    "core::",
    "alloc::",
    "test::",
    "tokio::runtime",
    "__rust",
    "rust_begin_unwind",
    "_start",
    "__libc_start",
    "start_thread",
];

/// Stack capture service.
///
/// A `Tracer` is immutable after creation and requires no locking; captures
/// only read its configuration. Applications typically create one at startup
/// and share it, while tests can run isolated instances with different
/// configurations in parallel.
#[derive(Clone, Debug, Default)]
pub struct Tracer {
    config: TraceConfig,
}

impl Tracer {
    /// Create a `Tracer` using the given configuration
    pub fn new(config: TraceConfig) -> Self {
        Self { config }
    }

    /// Create a `Tracer` that never walks the stack, making every decoration
    /// a plain message wrapper
    pub fn disabled() -> Self {
        Self::new(TraceConfig::default().with_max_frames(0))
    }

    /// Configuration this `Tracer` was created with
    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Create a new error from a message, capturing the call stack at the
    /// call site
    pub fn new_error<T: Into<String>>(&self, text: T) -> TracedError {
        let cause: Box<dyn Error + Send + Sync> = text.into().into();

        TracedError::new(None, cause, self.render_stack())
    }

    /// Decorate an error with the call stack at the call site
    pub fn capture<E>(&self, error: E) -> TracedError
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        TracedError::new(None, error.into(), self.render_stack())
    }

    /// Wrap an error with a contextual message and the call stack at the call
    /// site. The resulting error renders as `context: cause` and the original
    /// error stays reachable through `source`.
    pub fn wrap<E, T>(&self, error: E, context: T) -> TracedError
    where
        E: Into<Box<dyn Error + Send + Sync>>,
        T: Into<String>,
    {
        TracedError::new(Some(context.into()), error.into(), self.render_stack())
    }

    /// Walk the stack and render every retained frame as a two-line block,
    /// function name first, file and line indented below. Only retained
    /// frames count toward the frame budget.
    fn render_stack(&self) -> String {
        let max_frames = self.config.max_frames();
        if max_frames == 0 {
            return String::new();
        }

        let filter = self.config.filter();
        let mut rendered = String::new();
        let mut retained = 0;

        backtrace::trace(|frame| {
            let mut walking = true;

            backtrace::resolve_frame(frame, |symbol| {
                if retained >= max_frames {
                    walking = false;
                    return;
                }

                let raw = match symbol.name() {
                    Some(name) => name.to_string(),
                    None => return,
                };

                let name = strip_disambiguators(&raw);
                let name = trim_hash(&name);
                let qualified = name.strip_prefix('<').unwrap_or(name);

                if is_infrastructure(qualified) {
                    return;
                }

                if let Some(prefix) = filter {
                    if !qualified.starts_with(prefix) {
                        return;
                    }
                }

                let file = symbol
                    .filename()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());
                let line = symbol.lineno().unwrap_or(0);

                let _ = writeln!(rendered, "\t{}()", name);
                let _ = writeln!(rendered, "\t\t{}:{}", file, line);

                retained += 1;
            });

            walking && retained < max_frames
        });

        if rendered.is_empty() {
            trace!("no stack frames retained");
        }

        rendered
    }
}

fn is_infrastructure(symbol: &str) -> bool {
    INFRASTRUCTURE.iter().any(|prefix| symbol.starts_with(prefix))
}

/// Strip the bracketed crate disambiguators some toolchains insert into
/// demangled names (`std[e28293b1aa0f68bd]::panicking::...`), so that prefix
/// matching and rendering see plain paths. Only hex-digit groups are removed,
/// leaving genuine bracketed types such as `<[u8] as ...>` intact.
fn strip_disambiguators(symbol: &str) -> String {
    let mut stripped = String::with_capacity(symbol.len());
    let mut rest = symbol;

    while let Some(start) = rest.find('[') {
        let (head, tail) = rest.split_at(start);
        stripped.push_str(head);

        match tail[1..].find(']') {
            Some(end)
                if end >= 8
                    && tail[1..1 + end].bytes().all(|byte| byte.is_ascii_hexdigit()) =>
            {
                rest = &tail[end + 2..];
            }
            _ => {
                stripped.push('[');
                rest = &tail[1..];
            }
        }
    }

    stripped.push_str(rest);
    stripped
}

/// Trim the legacy mangling hash (`::h` followed by 16 hex digits) from a
/// demangled symbol name
fn trim_hash(symbol: &str) -> &str {
    if let Some(position) = symbol.rfind("::h") {
        let hash = &symbol[position + 3..];

        if hash.len() == 16 && hash.bytes().all(|byte| byte.is_ascii_hexdigit()) {
            return &symbol[..position];
        }
    }

    symbol
}
