#![cfg_attr(feature = "strict", deny(warnings))]
#![cfg_attr(feature = "strict", deny(clippy::all))]
#![cfg_attr(feature = "strict", deny(missing_docs))]
//! This crate contains stuff that's really helpful for tests.
use proptest::prelude::*;
use std::ops::RangeInclusive;

mod model;
pub use model::NaiveModel;

/// Upper bound for the absolute value of generated point values and deltas.
/// Small enough that no sum over the generated borders overflows an `i64`.
pub const VALUE_LIMIT: i64 = 1 << 20;

/// A single operation on a tree over some borders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Add `value` to every point in `[left, right]`.
    Add {
        /// The delta.
        value: i64,
        /// Left end (inclusive).
        left: i64,
        /// Right end (inclusive).
        right: i64,
    },
    /// Sum all points in `[left, right]`.
    GetSum {
        /// Left end (inclusive).
        left: i64,
        /// Right end (inclusive).
        right: i64,
    },
}

/// Gives a strategy generating point values and deltas.
pub fn value() -> impl Strategy<Value = i64> {
    -VALUE_LIMIT..VALUE_LIMIT
}

prop_compose! {
    /// Gives non-empty borders with up to `max_len` points, possibly with negative ends.
    pub fn borders(max_len: i64)(left in -1000i64..1000, len in 1..=max_len) -> RangeInclusive<i64> {
        left..=(left + len - 1)
    }
}

prop_compose! {
    /// Gives a non-empty sequence of up to `max_len` point values.
    pub fn values(max_len: usize)(values in prop::collection::vec(value(), 1..=max_len)) -> Vec<i64> {
        values
    }
}

prop_compose! {
    /// Gives a non-empty sub range `(left, right)` of `borders`.
    pub fn sub_range(borders: RangeInclusive<i64>)(
        a in borders.clone(),
        b in borders,
    ) -> (i64, i64) {
        (a.min(b), a.max(b))
    }
}

/// Gives a single valid [Operation] on a tree over `borders`.
pub fn operation(borders: RangeInclusive<i64>) -> impl Strategy<Value = Operation> {
    prop_oneof![
        (value(), sub_range(borders.clone()))
            .prop_map(|(value, (left, right))| Operation::Add { value, left, right }),
        sub_range(borders).prop_map(|(left, right)| Operation::GetSum { left, right }),
    ]
}

prop_compose! {
    /// Gives borders together with up to `max_ops` valid operations on them.
    pub fn script(max_len: i64, max_ops: usize)(bounds in borders(max_len))(
        ops in prop::collection::vec(operation(bounds.clone()), 0..=max_ops),
        bounds in Just(bounds),
    ) -> (RangeInclusive<i64>, Vec<Operation>) {
        (bounds, ops)
    }
}
