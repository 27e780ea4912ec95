
pub use self::log::*;

/// Run `f` at the bottom of a short chain of named functions, giving stack
/// capture a deterministic set of frames to walk
#[inline(never)]
pub fn three_calls_deep<T, F: FnOnce() -> T>(f: F) -> T {
    first(f)
}

#[inline(never)]
fn first<T, F: FnOnce() -> T>(f: F) -> T {
    second(f)
}

#[inline(never)]
fn second<T, F: FnOnce() -> T>(f: F) -> T {
    f()
}
