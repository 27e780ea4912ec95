use std::error::Error;

/// Iterator over an error and its transitive sources, outermost first
pub struct Chain<'a> {
    current: Option<&'a (dyn Error + 'static)>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a (dyn Error + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current = current.source();

        Some(current)
    }
}

/// Iterate over `error` followed by every transitive source in its chain
pub fn chain<'a>(error: &'a (dyn Error + 'static)) -> Chain<'a> {
    Chain {
        current: Some(error),
    }
}

/// First error in the chain that is a `T`, tunnelling through any decoration
/// that exposes its cause as a source
pub fn find_cause<'a, T: Error + 'static>(
    error: &'a (dyn Error + 'static),
) -> Option<&'a T> {
    chain(error).find_map(|cause| cause.downcast_ref::<T>())
}

/// Check whether the error, or any error in its chain, compares equal to the
/// given sentinel
pub fn is_cause<T>(error: &(dyn Error + 'static), sentinel: &T) -> bool
where
    T: Error + PartialEq + 'static,
{
    chain(error)
        .filter_map(|cause| cause.downcast_ref::<T>())
        .any(|cause| cause == sentinel)
}
