use std::{
    cmp::Ordering,
    fmt,
};

/// A total order over keys. The list is built around exactly one comparator,
/// fixed when the list is constructed.
pub trait Comparator<K: ?Sized> {
    fn compare(&self, left: &K, right: &K) -> Ordering;

    /// Whether `key` can take part in the ordering at all. Keys that fail this
    /// are refused by `insert` before the list is touched.
    fn admits(&self, key: &K) -> bool {
        let _ = key;
        true
    }
}

/// Orders keys by their [`Ord`] implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Natural;

impl<K: Ord + ?Sized> Comparator<K> for Natural {
    #[inline]
    fn compare(&self, left: &K, right: &K) -> Ordering {
        left.cmp(right)
    }
}

/// Orders keys with a caller supplied closure.
#[derive(Clone, Copy)]
pub struct FnComparator<F>(pub F);

impl<K, F> Comparator<K> for FnComparator<F>
where
    K: ?Sized,
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, left: &K, right: &K) -> Ordering {
        (self.0)(left, right)
    }
}

impl<F> fmt::Debug for FnComparator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnComparator")
    }
}

/// Orders `f64` keys and refuses NaN, which has no place in a total order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FloatOrder;

impl Comparator<f64> for FloatOrder {
    #[inline]
    fn compare(&self, left: &f64, right: &f64) -> Ordering {
        left.total_cmp(right)
    }

    fn admits(&self, key: &f64) -> bool {
        !key.is_nan()
    }
}
