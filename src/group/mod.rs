use std::error::Error;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use tracing::trace;

use crate::chain::chain;
use crate::trace::TracedError;

/// A retained error together with the single line used for the aggregate
/// rendering, precomputed at append time so no user `Display` code ever runs
/// under the group lock
#[derive(Clone, Debug)]
struct Entry {
    error: Arc<dyn Error + Send + Sync>,
    line: String,
}

#[derive(Debug, Default)]
struct State {
    retained: Vec<Entry>,
    total: usize,
}

/// A bounded, thread safe multi-error accumulator.
///
/// An `ErrorGroup` collects the errors reported by parallel workers into one
/// value that satisfies the standard error contract. It retains at most
/// `max_size` errors but keeps counting past that bound, so the true total is
/// never lost even when content is dropped.
///
/// Cloning returns a handle to the same group, which is how a group is shared
/// across workers; the synchronization state itself is never copied.
#[derive(Clone, Debug, Default)]
pub struct ErrorGroup {
    max_size: usize,
    state: Arc<Mutex<State>>,
}

impl ErrorGroup {
    /// Create an empty group retaining at most `max_size` errors, with 0
    /// meaning unbounded retention
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            state: Default::default(),
        }
    }

    /// Record an error.
    ///
    /// Always returns `true`, signalling that there was an error to record,
    /// even when the content was dropped for exceeding `max_size` (the total
    /// count still advances).
    ///
    /// An error that is itself an `ErrorGroup`, or wraps one anywhere in its
    /// source chain, is flattened: the inner group's total is added to this
    /// group's total and its retained errors are appended individually up to
    /// the remaining capacity.
    pub fn append<E>(&self, error: E) -> bool
    where
        E: Error + Send + Sync + 'static,
    {
        if let Some(inner) = find_group(&error) {
            self.merge(&inner);
            return true;
        }

        let line = aggregate_line(&error);

        let over_capacity = {
            let mut state = self.state.lock();

            state.total += 1;

            if self.has_room(&state) {
                state.retained.push(Entry {
                    error: Arc::new(error),
                    line,
                });
                false
            } else {
                true
            }
        };

        if over_capacity {
            trace!("over capacity, error counted but not retained");
        }

        true
    }

    /// Record the error of an outcome such as `result.err()`, with `None`
    /// being a no-op returning `false`
    pub fn append_opt<E>(&self, error: Option<E>) -> bool
    where
        E: Error + Send + Sync + 'static,
    {
        match error {
            Some(error) => self.append(error),
            None => false,
        }
    }

    /// `Ok` if nothing was retained, otherwise the group itself viewed as an
    /// error, so `group.check()?` propagates naturally from any error
    /// returning function
    pub fn check(&self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.clone())
        }
    }

    /// Number of retained errors
    pub fn len(&self) -> usize {
        self.state.lock().retained.len()
    }

    /// `true` if no error was retained
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of errors ever appended, including the ones dropped once
    /// `max_size` was exceeded
    pub fn total(&self) -> usize {
        self.state.lock().total
    }

    /// Configured retention bound, 0 for unbounded
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Copy of the retained errors, safe to iterate without holding the group
    /// lock
    pub fn list(&self) -> Vec<Arc<dyn Error + Send + Sync>> {
        self.state
            .lock()
            .retained
            .iter()
            .map(|entry| entry.error.clone())
            .collect()
    }

    /// Flatten another group into this one. The inner state is snapshotted
    /// before this group's lock is taken, so merging a group into itself
    /// duplicates its entries instead of deadlocking.
    fn merge(&self, inner: &ErrorGroup) {
        let (entries, total) = {
            let state = inner.state.lock();
            (state.retained.clone(), state.total)
        };

        let mut dropped = 0;

        {
            let mut state = self.state.lock();

            state.total += total;

            for entry in entries {
                if self.has_room(&state) {
                    state.retained.push(entry);
                } else {
                    dropped += 1;
                }
            }
        }

        if dropped > 0 {
            trace!(dropped, "over capacity while flattening inner group");
        }
    }

    fn has_room(&self, state: &State) -> bool {
        self.max_size == 0 || state.retained.len() < self.max_size
    }
}

impl fmt::Display for ErrorGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (total, lines): (usize, Vec<String>) = {
            let state = self.state.lock();

            (
                state.total,
                state
                    .retained
                    .iter()
                    .map(|entry| entry.line.clone())
                    .collect(),
            )
        };

        if lines.is_empty() {
            return Ok(());
        }

        if total > lines.len() {
            writeln!(f, "{} errors (first {} shown):", total, lines.len())?;
        } else {
            writeln!(f, "{} errors:", lines.len())?;
        }

        for line in &lines {
            writeln!(f, "{}", line)?;
        }

        Ok(())
    }
}

impl Error for ErrorGroup {}

fn find_group(error: &(dyn Error + 'static)) -> Option<ErrorGroup> {
    chain(error)
        .find_map(|cause| cause.downcast_ref::<ErrorGroup>())
        .map(Clone::clone)
}

/// The line an error contributes to the aggregate rendering. A traced error
/// contributes its bare message, since a stack trace per entry would drown a
/// multi-error summary.
fn aggregate_line(error: &(dyn Error + 'static)) -> String {
    match error.downcast_ref::<TracedError>() {
        Some(traced) => traced.message(),
        None => error.to_string(),
    }
}

#[cfg(test)]
mod test {
    use std::io;
    use std::thread;

    use super::*;

    use crate::trace::Tracer;

    fn text_error(text: &str) -> io::Error {
        io::Error::new(io::ErrorKind::Other, text)
    }

    #[test]
    fn empty_group_renders_nothing() {
        let group = ErrorGroup::new(0);

        assert_eq!(group.to_string(), "");
        assert!(group.check().is_ok());
        assert!(group.is_empty());
    }

    #[test]
    fn single_error_keeps_the_count_header() {
        let group = ErrorGroup::new(0);

        assert!(group.append(text_error("X")));
        assert_eq!(group.to_string(), "1 errors:\nX\n");
    }

    #[test]
    fn unbounded_group_retains_everything_in_order() {
        let group = ErrorGroup::new(0);

        group.append(text_error("X"));
        group.append(text_error("Y"));

        assert_eq!(group.len(), 2);
        assert_eq!(group.total(), 2);
        assert_eq!(group.to_string(), "2 errors:\nX\nY\n");

        let messages = group
            .list()
            .iter()
            .map(|error| error.to_string())
            .collect::<Vec<_>>();
        assert_eq!(messages, vec!["X", "Y"]);
    }

    #[test]
    fn none_is_not_recorded() {
        let group = ErrorGroup::new(0);

        assert!(!group.append_opt(None::<io::Error>));
        assert_eq!(group.len(), 0);
        assert_eq!(group.total(), 0);

        assert!(group.append_opt(Some(text_error("X"))));
        assert_eq!(group.len(), 1);
        assert_eq!(group.total(), 1);
    }

    #[test]
    fn capacity_drops_content_but_not_count() {
        let group = ErrorGroup::new(3);

        for text in &["A", "B", "C", "D"] {
            assert!(group.append(text_error(text)));
        }

        assert_eq!(group.len(), 3);
        assert_eq!(group.total(), 4);
        assert_eq!(group.to_string(), "4 errors (first 3 shown):\nA\nB\nC\n");
    }

    #[test]
    fn traced_entries_render_without_their_trace() {
        let tracer = Tracer::default();
        let group = ErrorGroup::new(0);

        group.append(tracer.wrap(text_error("cause"), "context"));

        assert_eq!(group.to_string(), "1 errors:\ncontext: cause\n");
    }

    #[test]
    fn doubly_decorated_entry_stays_single_line() {
        let tracer = Tracer::default();
        let group = ErrorGroup::new(0);

        group.append(tracer.wrap(tracer.capture(text_error("boom")), "retrying"));

        assert_eq!(group.to_string(), "1 errors:\nretrying: boom\n");
    }

    #[test]
    fn nested_group_is_flattened() {
        let inner = ErrorGroup::new(2);
        for text in &["A", "B", "C"] {
            inner.append(text_error(text));
        }

        let outer = ErrorGroup::new(0);
        outer.append(text_error("X"));
        outer.append(inner);

        assert_eq!(outer.len(), 3);
        assert_eq!(outer.total(), 4);
        assert_eq!(outer.to_string(), "4 errors (first 3 shown):\nX\nA\nB\n");
    }

    #[test]
    fn wrapped_group_is_flattened() {
        let inner = ErrorGroup::new(0);
        inner.append(text_error("A"));

        let outer = ErrorGroup::new(0);
        outer.append(Tracer::disabled().capture(inner.clone()));

        assert_eq!(outer.len(), 1);
        assert_eq!(outer.total(), 1);
        assert_eq!(outer.to_string(), "1 errors:\nA\n");
    }

    #[test]
    fn flattening_respects_remaining_capacity() {
        let inner = ErrorGroup::new(0);
        for text in &["A", "B", "C"] {
            inner.append(text_error(text));
        }

        let outer = ErrorGroup::new(2);
        outer.append(text_error("X"));
        outer.append(inner);

        assert_eq!(outer.len(), 2);
        assert_eq!(outer.total(), 4);
        assert_eq!(outer.to_string(), "4 errors (first 2 shown):\nX\nA\n");
    }

    #[test]
    fn appending_a_group_to_itself_duplicates_entries() {
        let group = ErrorGroup::new(0);
        group.append(text_error("A"));

        group.append(group.clone());

        assert_eq!(group.len(), 2);
        assert_eq!(group.total(), 2);
    }

    #[test]
    fn check_propagates_a_handle_to_the_group() {
        let group = ErrorGroup::new(0);
        group.append(text_error("boom"));

        let error = group.check().unwrap_err();
        assert_eq!(error.to_string(), "1 errors:\nboom\n");

        // the propagated value shares state with the original
        group.append(text_error("again"));
        assert_eq!(error.len(), 2);
    }

    #[test]
    fn concurrent_appends_lose_no_counts() {
        const WRITERS: usize = 8;
        const ERRORS: usize = 100;
        const MAX_SIZE: usize = 50;

        let group = ErrorGroup::new(MAX_SIZE);

        let handles = (0..WRITERS)
            .map(|writer| {
                let group = group.clone();

                thread::spawn(move || {
                    for index in 0..ERRORS {
                        group.append(text_error(&format!("{}-{}", writer, index)));
                    }
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(group.total(), WRITERS * ERRORS);
        assert_eq!(group.len(), MAX_SIZE);
    }
}
