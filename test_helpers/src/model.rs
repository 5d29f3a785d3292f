use std::ops::RangeInclusive;

use super::Operation;

/// A reference implementation which stores every point explicitly.
/// Updates and queries take linear time, which makes it obviously correct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NaiveModel {
    left_bound: i64,
    points: Vec<i64>,
}

impl NaiveModel {
    /// All points in `borders` start at zero.
    pub fn new(borders: RangeInclusive<i64>) -> Self {
        let len = (borders.end() - borders.start() + 1) as usize;
        Self {
            left_bound: *borders.start(),
            points: vec![0; len],
        }
    }

    fn slice(&mut self, left: i64, right: i64) -> &mut [i64] {
        let start = (left - self.left_bound) as usize;
        let end = (right - self.left_bound) as usize;
        &mut self.points[start..=end]
    }

    /// Adds `value` to every point in `[left, right]`.
    pub fn add(&mut self, value: i64, left: i64, right: i64) {
        self.slice(left, right).iter_mut().for_each(|p| *p += value);
    }

    /// Sums every point in `[left, right]`.
    pub fn get_sum(&mut self, left: i64, right: i64) -> i64 {
        self.slice(left, right).iter().sum()
    }

    /// Applies `op`, returning the sum for [Operation::GetSum].
    pub fn apply(&mut self, op: Operation) -> Option<i64> {
        match op {
            Operation::Add { value, left, right } => {
                self.add(value, left, right);
                None
            }
            Operation::GetSum { left, right } => Some(self.get_sum(left, right)),
        }
    }

    /// All point values in order.
    pub fn points(&self) -> &[i64] {
        &self.points
    }
}
