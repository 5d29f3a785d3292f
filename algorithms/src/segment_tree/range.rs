use std::ops::RangeInclusive;

/// Helpers for the closed ranges covered by tree nodes.
/// A range with `start > end` is considered empty.
pub trait RangeExt {
    fn is_splittable(&self) -> bool;

    /// A range is considered normal if `range.start <= range.end` holds.
    fn is_normal(&self) -> bool;

    /// The number of points in this range, zero if it is empty.
    fn span(&self) -> u64;

    /// Splits at `mid = start + (end - start) / 2` into `[start, mid]` and `[mid + 1, end]`.
    fn split(&self) -> Option<(Self, Self)>
    where
        Self: Sized;

    fn intersects(&self, rhs: &Self) -> bool;

    fn is_superset(&self, other: &Self) -> bool;

    /// This restricts self, to not extend beyond other.
    fn clamp_by(&mut self, other: &Self);
}

impl RangeExt for RangeInclusive<i64> {
    fn is_splittable(&self) -> bool {
        self.start() < self.end()
    }

    fn is_normal(&self) -> bool {
        self.start() <= self.end()
    }

    fn span(&self) -> u64 {
        if self.is_normal() {
            (*self.end() as i128 - *self.start() as i128 + 1) as u64
        } else {
            0
        }
    }

    fn split(&self) -> Option<(Self, Self)>
    where
        Self: Sized,
    {
        if self.is_splittable() {
            let (start, end) = (*self.start(), *self.end());
            let mid = start + (end - start) / 2;
            Some((start..=mid, (mid + 1)..=end))
        } else {
            None
        }
    }

    fn intersects(&self, rhs: &Self) -> bool {
        if self.is_empty() || rhs.is_empty() {
            return false;
        }

        self.start().max(rhs.start()) <= self.end().min(rhs.end())
    }

    fn is_superset(&self, other: &Self) -> bool {
        other.is_empty() || (self.start() <= other.start() && other.end() <= self.end())
    }

    fn clamp_by(&mut self, other: &Self) {
        let start = *self.start().max(other.start());
        let end = *self.end().min(other.end());
        *self = start..=end;
    }
}
