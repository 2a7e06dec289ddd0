/// The counterpart of [`Option::inspect`] for the `None` case, handy for logging
/// why a lookup came up empty without breaking a method chain.
pub trait InspectNone {
    /// Calls `f` if `self` is `None`, then returns `self` unchanged.
    fn inspect_none<F: FnOnce()>(self, f: F) -> Self;
}

impl<T> InspectNone for Option<T> {
    #[inline]
    fn inspect_none<F: FnOnce()>(self, f: F) -> Self {
        if self.is_none() {
            f();
        }
        self
    }
}


#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn only_none_runs_the_callback() {
        let calls = Cell::new(0);

        assert_eq!(Some(3).inspect_none(|| calls.set(calls.get() + 1)), Some(3));
        assert_eq!(calls.get(), 0);

        assert_eq!(None::<u8>.inspect_none(|| calls.set(calls.get() + 1)), None);
        assert_eq!(calls.get(), 1);
    }
}
