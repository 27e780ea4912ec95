mod config;
mod ext;
mod macros;
mod traced;
mod tracer;

pub use config::{TraceConfig, DEFAULT_MAX_FRAMES};
pub use ext::{OptionExt, ResultExt};
pub use traced::TracedError;
pub use tracer::Tracer;
