//! This module contains everything related to the Segment Tree datastructure.
//!
//! The tree is stored implicitly in arrays: node `i` covers some closed range `[l, r]`,
//! its children `2i` and `2i + 1` cover `[l, mid]` and `[mid + 1, r]` with `mid = l + (r - l) / 2`.
//! Range updates are propagated lazily, see [LazySegmentTree].

use std::fmt::Debug;

use num::{Num, NumCast};

/// Values which can be stored in a [LazySegmentTree].
/// Besides the arithmetic, a tree needs to multiply a value by the number of points
/// in a node, which is why the node sizes are converted via [NumCast].
pub trait Summand: Num + NumCast + Copy + Debug {}

impl<T: Num + NumCast + Copy + Debug> Summand for T {}

mod lazy;
pub use lazy::LazySegmentTree;

mod range;
use range::RangeExt;
