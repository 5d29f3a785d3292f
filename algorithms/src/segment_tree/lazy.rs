use std::{convert::TryFrom, mem, ops::RangeInclusive};

use common::{SegError, SegResult};
use derive_more::*;
use typed_index_collections::TiVec;

use super::{RangeExt, Summand};

// An Index into a LazySegmentTree. The root is 1, the children of `i` are `2i` and `2i + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, From, Into)]
struct NodeIdx(usize);

impl NodeIdx {
    const ROOT: NodeIdx = NodeIdx(1);

    fn left_child(self) -> Self {
        NodeIdx(2 * self.0)
    }

    fn right_child(self) -> Self {
        NodeIdx(2 * self.0 + 1)
    }
}

/// A SegmentTree over the closed range `[left_bound, right_bound]` supporting
/// range additions and range sums in `O(log(right_bound - left_bound))`.
///
/// Additions covering a whole node are recorded as a lazy tag on that node and only pushed
/// to its children once a later call descends below it.
/// For this reason [get_sum](LazySegmentTree::get_sum) needs mutable access as well.
/// # Example
/// ```
/// # use algorithms::segment_tree::LazySegmentTree;
/// let mut tree = LazySegmentTree::<i64>::new(1, 50)?;
/// tree.add(5, 10, 23)?;
/// assert_eq!(tree.get_sum(2, 15)?, 30);
/// assert_eq!(tree.get_sum(10, 26)?, 70);
///
/// // out of range requests are rejected and leave the tree untouched
/// assert!(tree.add(1, 0, 3).is_err());
/// assert_eq!(tree.sum(), 70);
/// # Ok::<(), common::SegError>(())
/// ```
#[derive(Debug, Clone)]
pub struct LazySegmentTree<T> {
    borders: RangeInclusive<i64>,
    sums: TiVec<NodeIdx, T>,
    tags: TiVec<NodeIdx, T>,
}

impl<T: Summand> LazySegmentTree<T> {
    /// Creates a new LazySegmentTree over `[left_bound, right_bound]` where every point is zero.
    /// # Errors
    /// - [SegError::InvalidBorders] if `left_bound > right_bound`.
    /// - [SegError::RangeTooLarge] if the nodes cannot be allocated or a node size is not representable in `T`.
    pub fn new(left_bound: i64, right_bound: i64) -> SegResult<Self> {
        if left_bound > right_bound {
            return Err(SegError::InvalidBorders {
                left_bound,
                right_bound,
            });
        }
        let borders = left_bound..=right_bound;
        let slots = Self::space_needed(&borders)?;
        log::debug!(
            "creating lazy segment tree over [{}, {}] with {} slots",
            left_bound,
            right_bound,
            slots
        );

        let points = borders.span();
        Ok(Self {
            sums: Self::zeroed(slots, points)?,
            tags: Self::zeroed(slots, points)?,
            borders,
        })
    }

    /// Creates a new LazySegmentTree over `[0, values.len() - 1]`, where point `i` holds `values[i]`.
    /// # Errors
    /// - [SegError::EmptyInput] if `values` is empty.
    /// - [SegError::RangeTooLarge] as for [new](LazySegmentTree::new).
    /// # Example
    /// ```
    /// # use algorithms::segment_tree::LazySegmentTree;
    /// let mut tree = LazySegmentTree::from_values(&[3, 1, 4, 1, 5])?;
    /// assert_eq!(tree.borders(), 0..=4);
    /// assert_eq!(tree.get_sum(1, 3)?, 6);
    /// # Ok::<(), common::SegError>(())
    /// ```
    pub fn from_values(values: &[T]) -> SegResult<Self> {
        if values.is_empty() {
            return Err(SegError::EmptyInput);
        }
        let right_bound = i64::try_from(values.len() - 1).map_err(|_| SegError::RangeTooLarge {
            points: values.len() as u128,
        })?;

        let mut tree = Self::new(0, right_bound)?;
        let root_range = tree.borders.clone();
        tree.build(NodeIdx::ROOT, &root_range, values);
        Ok(tree)
    }

    // Four slots per point suffice for every split pattern.
    fn space_needed(borders: &RangeInclusive<i64>) -> SegResult<usize> {
        let points = *borders.end() as i128 - *borders.start() as i128 + 1;
        let too_large = || SegError::RangeTooLarge {
            points: points as u128,
        };

        // Every node size is at most `points`, so checking it once covers all nodes.
        num::cast::<i128, T>(points).ok_or_else(too_large)?;
        // A Vec may not hold more than isize::MAX bytes.
        usize::try_from(points)
            .ok()
            .and_then(|points| points.checked_mul(4))
            .filter(|slots| {
                slots
                    .checked_mul(mem::size_of::<T>())
                    .map_or(false, |bytes| bytes <= isize::MAX as usize)
            })
            .ok_or_else(too_large)
    }

    fn zeroed(slots: usize, points: u64) -> SegResult<TiVec<NodeIdx, T>> {
        let mut data = Vec::new();
        data.try_reserve_exact(slots)
            .map_err(|_| SegError::RangeTooLarge {
                points: points as u128,
            })?;
        data.resize(slots, T::zero());
        Ok(data.into())
    }

    fn build(&mut self, idx: NodeIdx, node_range: &RangeInclusive<i64>, values: &[T]) {
        match node_range.split() {
            // borders start at zero here, so positions are valid indices
            None => self.sums[idx] = values[*node_range.start() as usize],
            Some((left_range, right_range)) => {
                self.build(idx.left_child(), &left_range, values);
                self.build(idx.right_child(), &right_range, values);
                self.pull_up(idx);
            }
        }
    }

    /// Gives the range for which the tree holds values.
    pub fn borders(&self) -> RangeInclusive<i64> {
        self.borders.clone()
    }

    /// The sum over all points.
    /// # Runtime
    /// O(1)
    pub fn sum(&self) -> T {
        self.sums[NodeIdx::ROOT]
    }

    /// Adds `value` to every point in `[left, right]`.
    /// # Runtime
    /// O(log D) where D = right_bound - left_bound
    /// # Errors
    /// [SegError::InvalidRange] if `left > right` or `[left, right]` is not inside [borders](LazySegmentTree::borders).
    /// The tree is unchanged in that case.
    pub fn add(&mut self, value: T, left: i64, right: i64) -> SegResult<()> {
        let query_range = self.checked_range(left, right)?;
        let root_range = self.borders.clone();
        self.add_inner(value, &query_range, NodeIdx::ROOT, &root_range);
        Ok(())
    }

    /// Gets the sum of all points in `[left, right]`.
    /// # Runtime
    /// O(log D) where D = right_bound - left_bound
    /// # Errors
    /// [SegError::InvalidRange] under the same conditions as [add](LazySegmentTree::add).
    pub fn get_sum(&mut self, left: i64, right: i64) -> SegResult<T> {
        let query_range = self.checked_range(left, right)?;
        let root_range = self.borders.clone();
        Ok(self.get_sum_inner(&query_range, NodeIdx::ROOT, &root_range))
    }

    /// Gets the value of a single point.
    /// # Runtime
    /// O(log D) where D = right_bound - left_bound
    /// # Errors
    /// [SegError::InvalidRange] if `position` is not inside [borders](LazySegmentTree::borders).
    pub fn get(&mut self, position: i64) -> SegResult<T> {
        self.get_sum(position, position)
    }

    /// Behaves like [add](LazySegmentTree::add), but parts of `[left, right]` outside of the
    /// borders are ignored instead of rejected.
    /// # Errors
    /// [SegError::InvalidRange] if `left > right`.
    /// # Example
    /// ```
    /// # use algorithms::segment_tree::LazySegmentTree;
    /// let mut tree = LazySegmentTree::<i64>::new(0, 9)?;
    /// tree.add_clamped(2, -5, 4)?;
    /// assert_eq!(tree.sum(), 10);
    ///
    /// // does not touch the tree at all
    /// tree.add_clamped(2, 20, 30)?;
    /// assert_eq!(tree.sum(), 10);
    /// # Ok::<(), common::SegError>(())
    /// ```
    pub fn add_clamped(&mut self, value: T, left: i64, right: i64) -> SegResult<()> {
        match self.clamped_range(left, right)? {
            Some(range) => self.add(value, *range.start(), *range.end()),
            None => Ok(()),
        }
    }

    /// Behaves like [get_sum](LazySegmentTree::get_sum), but only sums the part of `[left, right]`
    /// inside the borders. This is zero if there is no such part.
    /// # Errors
    /// [SegError::InvalidRange] if `left > right`.
    pub fn get_sum_clamped(&mut self, left: i64, right: i64) -> SegResult<T> {
        match self.clamped_range(left, right)? {
            Some(range) => self.get_sum(*range.start(), *range.end()),
            None => Ok(T::zero()),
        }
    }

    /// Gives all point values in order.
    /// This pushes every pending update down to the leaves.
    /// # Runtime
    /// O(D) where D = right_bound - left_bound
    pub fn values(&mut self) -> Vec<T> {
        let mut values = Vec::with_capacity(self.borders.span() as usize);
        let root_range = self.borders.clone();
        self.collect_leaves(NodeIdx::ROOT, &root_range, &mut values);
        values
    }

    fn checked_range(&self, left: i64, right: i64) -> SegResult<RangeInclusive<i64>> {
        let range = left..=right;
        if range.is_normal() && self.borders.is_superset(&range) {
            Ok(range)
        } else {
            log::debug!(
                "rejecting range [{}, {}] for tree over {:?}",
                left,
                right,
                self.borders
            );
            Err(SegError::InvalidRange {
                left,
                right,
                borders: self.borders.clone(),
            })
        }
    }

    fn clamped_range(&self, left: i64, right: i64) -> SegResult<Option<RangeInclusive<i64>>> {
        let mut range = left..=right;
        if !range.is_normal() {
            return Err(SegError::InvalidRange {
                left,
                right,
                borders: self.borders.clone(),
            });
        }
        range.clamp_by(&self.borders);
        Ok(Some(range).filter(RangeExt::is_normal))
    }

    // Multiplies a per point value by the number of points in a node.
    fn scaled(value: T, node_range: &RangeInclusive<i64>) -> T {
        let span: T = num::cast(node_range.span())
            .expect("node sizes are checked to fit into T on construction");
        value * span
    }

    // Applies `value` to every point below `idx`. Leaves never keep a tag.
    fn apply(&mut self, idx: NodeIdx, value: T, node_range: &RangeInclusive<i64>) {
        self.sums[idx] = self.sums[idx] + Self::scaled(value, node_range);
        if node_range.is_splittable() {
            self.tags[idx] = self.tags[idx] + value;
        }
    }

    // Hands the pending tag of `idx` to its children. Must run before any child of `idx` is read or updated.
    fn push_down(
        &mut self,
        idx: NodeIdx,
        left_range: &RangeInclusive<i64>,
        right_range: &RangeInclusive<i64>,
    ) {
        let tag = self.tags[idx];
        if tag.is_zero() {
            return;
        }
        log::trace!("pushing tag {:?} down from node {:?}", tag, idx);
        self.apply(idx.left_child(), tag, left_range);
        self.apply(idx.right_child(), tag, right_range);
        self.tags[idx] = T::zero();
    }

    fn pull_up(&mut self, idx: NodeIdx) {
        self.sums[idx] = self.sums[idx.left_child()] + self.sums[idx.right_child()];
    }

    fn add_inner(
        &mut self,
        value: T,
        query_range: &RangeInclusive<i64>,
        idx: NodeIdx,
        node_range: &RangeInclusive<i64>,
    ) {
        if query_range.is_superset(node_range) {
            // Stop here, the children learn about this once someone descends below this node.
            self.apply(idx, value, node_range);
            return;
        }

        // relies on the invariant that query and node range overlap, so this is no leaf.
        if let Some((left_range, right_range)) = node_range.split() {
            self.push_down(idx, &left_range, &right_range);

            if left_range.intersects(query_range) {
                self.add_inner(value, query_range, idx.left_child(), &left_range);
            }
            if right_range.intersects(query_range) {
                self.add_inner(value, query_range, idx.right_child(), &right_range);
            }

            self.pull_up(idx);
        }
    }

    fn get_sum_inner(
        &mut self,
        query_range: &RangeInclusive<i64>,
        idx: NodeIdx,
        node_range: &RangeInclusive<i64>,
    ) -> T {
        if query_range.is_superset(node_range) {
            return self.sums[idx];
        }

        let mut sum = T::zero();
        if let Some((left_range, right_range)) = node_range.split() {
            self.push_down(idx, &left_range, &right_range);

            if left_range.intersects(query_range) {
                sum = sum + self.get_sum_inner(query_range, idx.left_child(), &left_range);
            }
            if right_range.intersects(query_range) {
                sum = sum + self.get_sum_inner(query_range, idx.right_child(), &right_range);
            }
        }
        sum
    }

    fn collect_leaves(&mut self, idx: NodeIdx, node_range: &RangeInclusive<i64>, out: &mut Vec<T>) {
        match node_range.split() {
            None => out.push(self.sums[idx]),
            Some((left_range, right_range)) => {
                self.push_down(idx, &left_range, &right_range);
                self.collect_leaves(idx.left_child(), &left_range, out);
                self.collect_leaves(idx.right_child(), &right_range, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Walks the whole tree and checks that every aggregate is the sum of its children plus the
    // pending tags of itself and its ancestors, and that leaves carry no tag.
    fn check_invariants(tree: &LazySegmentTree<i64>) {
        fn walk(
            tree: &LazySegmentTree<i64>,
            idx: NodeIdx,
            node_range: &RangeInclusive<i64>,
            pending: i64,
        ) -> i64 {
            let own = tree.sums[idx] + pending * node_range.span() as i64;
            match node_range.split() {
                None => {
                    assert_eq!(tree.tags[idx], 0, "leaf {:?} carries a tag", node_range);
                    own
                }
                Some((left_range, right_range)) => {
                    let pending = pending + tree.tags[idx];
                    let left = walk(tree, idx.left_child(), &left_range, pending);
                    let right = walk(tree, idx.right_child(), &right_range, pending);
                    assert_eq!(own, left + right, "stale aggregate at {:?}", node_range);
                    own
                }
            }
        }
        walk(tree, NodeIdx::ROOT, &tree.borders(), 0);
    }

    #[test]
    fn allocates_four_slots_per_point() {
        let tree = LazySegmentTree::<i64>::new(1, 50).unwrap();
        assert_eq!(tree.sums.len(), 200);
        assert_eq!(tree.tags.len(), 200);
    }

    #[test]
    fn scenario_over_one_to_fifty() {
        let mut tree = LazySegmentTree::<i64>::new(1, 50).unwrap();
        assert_eq!(tree.get_sum(2, 5).unwrap(), 0);

        tree.add(1, 1, 1).unwrap();
        assert_eq!(tree.get_sum(2, 5).unwrap(), 0);
        assert_eq!(tree.get_sum(1, 2).unwrap(), 1);

        tree.add(-1, 1, 1).unwrap();
        assert_eq!(tree.get_sum(2, 5).unwrap(), 0);
        assert_eq!(tree.get_sum(1, 2).unwrap(), 0);

        for i in 1..=50 {
            tree.add(i, i, i).unwrap();
        }
        assert_eq!(tree.get_sum(2, 5).unwrap(), 14);
        assert_eq!(tree.get_sum(1, 10).unwrap(), 55);

        for i in 1..=50 {
            tree.add(-i, i, i).unwrap();
        }
        assert_eq!(tree.get_sum(2, 5).unwrap(), 0);
        assert_eq!(tree.get_sum(1, 10).unwrap(), 0);

        tree.add(5, 10, 23).unwrap();
        assert_eq!(tree.get_sum(2, 15).unwrap(), 30);
        assert_eq!(tree.get_sum(10, 26).unwrap(), 70);
        check_invariants(&tree);
    }

    #[test]
    fn covering_update_is_deferred_to_a_tag() {
        let mut tree = LazySegmentTree::<i64>::new(0, 7).unwrap();
        tree.add(3, 0, 7).unwrap();
        assert_eq!(tree.sums[NodeIdx::ROOT], 24);
        assert_eq!(tree.tags[NodeIdx::ROOT], 3);
        assert_eq!(tree.sums[NodeIdx::ROOT.left_child()], 0);

        // descending below the root hands the tag to both children
        assert_eq!(tree.get_sum(0, 2).unwrap(), 9);
        assert_eq!(tree.tags[NodeIdx::ROOT], 0);
        assert_eq!(tree.sums[NodeIdx::ROOT.left_child()], 12);
        assert_eq!(tree.sums[NodeIdx::ROOT.right_child()], 12);
        check_invariants(&tree);
    }

    #[test]
    fn single_point_tree() {
        let mut tree = LazySegmentTree::<i64>::new(-4, -4).unwrap();
        tree.add(7, -4, -4).unwrap();
        tree.add(2, -4, -4).unwrap();
        assert_eq!(tree.get(-4).unwrap(), 9);
        assert_eq!(tree.sum(), 9);
        assert_eq!(tree.tags[NodeIdx::ROOT], 0);
    }

    #[test]
    fn negative_borders() {
        let mut tree = LazySegmentTree::<i64>::new(-10, 10).unwrap();
        tree.add(1, -10, 10).unwrap();
        tree.add(2, -3, 0).unwrap();
        assert_eq!(tree.get_sum(-10, -1).unwrap(), 10 + 6);
        assert_eq!(tree.get_sum(0, 10).unwrap(), 11 + 2);
        check_invariants(&tree);
    }

    #[test]
    fn build_sets_leaves_and_sums() {
        let mut tree = LazySegmentTree::from_values(&[3i64, -1, 4, 1, -5, 9, 2]).unwrap();
        assert_eq!(tree.borders(), 0..=6);
        assert_eq!(tree.sum(), 13);
        assert_eq!(tree.get_sum(2, 4).unwrap(), 0);
        assert_eq!(tree.values(), vec![3, -1, 4, 1, -5, 9, 2]);
        check_invariants(&tree);
    }

    #[test]
    fn values_materializes_pending_tags() {
        let mut tree = LazySegmentTree::<i64>::new(5, 9).unwrap();
        tree.add(2, 5, 9).unwrap();
        tree.add(-1, 7, 8).unwrap();
        assert_eq!(tree.values(), vec![2, 2, 1, 1, 2]);
        assert!(tree.tags.iter().all(|tag| *tag == 0));
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = LazySegmentTree::<i64>::from_values(&[]).unwrap_err();
        assert!(matches!(err, SegError::EmptyInput));
    }

    #[test]
    fn inverted_borders_are_rejected() {
        let err = LazySegmentTree::<i64>::new(10, 9).unwrap_err();
        assert!(matches!(
            err,
            SegError::InvalidBorders {
                left_bound: 10,
                right_bound: 9
            }
        ));
    }

    #[test]
    fn huge_borders_are_rejected() {
        let err = LazySegmentTree::<i64>::new(i64::MIN, i64::MAX).unwrap_err();
        assert!(matches!(err, SegError::RangeTooLarge { .. }));
    }

    #[test]
    fn unallocatable_borders_are_rejected() {
        // 4 * 2^58 slots of 8 bytes exceed isize::MAX bytes
        let err = LazySegmentTree::<i64>::new(0, 1 << 58).unwrap_err();
        assert!(matches!(err, SegError::RangeTooLarge { points } if points == (1 << 58) + 1));

        // the slot count itself fits in usize, its byte size does not
        let err = LazySegmentTree::<u64>::new(1, 1 << 60).unwrap_err();
        assert!(matches!(err, SegError::RangeTooLarge { .. }));
    }

    #[test]
    fn node_sizes_must_fit_the_value_type() {
        let err = LazySegmentTree::<i8>::new(0, 199).unwrap_err();
        assert!(matches!(err, SegError::RangeTooLarge { points: 200 }));
        assert!(LazySegmentTree::<i8>::new(0, 99).is_ok());
    }

    #[test]
    fn invalid_ranges_are_rejected_without_mutation() {
        let mut tree = LazySegmentTree::<i64>::new(10, 100).unwrap();
        tree.add(1, 10, 100).unwrap();

        for &(left, right) in &[(20, 15), (9, 15), (10, 101), (0, 5), (101, 200)] {
            let add = tree.add(5, left, right);
            assert!(
                matches!(add, Err(SegError::InvalidRange { left: l, right: r, .. }) if l == left && r == right)
            );
            assert!(tree.get_sum(left, right).is_err());
        }
        assert_eq!(tree.sum(), 91);
        assert_eq!(tree.tags[NodeIdx::ROOT], 1);
        check_invariants(&tree);
    }

    #[test]
    fn get_rejects_positions_outside_borders() {
        let mut tree = LazySegmentTree::<i64>::new(10, 100).unwrap();
        tree.add(3, 10, 100).unwrap();

        for &position in &[9, 101, i64::MIN, i64::MAX] {
            let err = tree.get(position).unwrap_err();
            assert!(
                matches!(err, SegError::InvalidRange { left, right, .. } if left == position && right == position)
            );
        }
        assert_eq!(tree.get(10).unwrap(), 3);
        assert_eq!(tree.get(100).unwrap(), 3);
    }

    #[test]
    fn clamped_operations() {
        let mut tree = LazySegmentTree::<i64>::new(0, 9).unwrap();
        tree.add_clamped(1, -100, 100).unwrap();
        assert_eq!(tree.sum(), 10);

        tree.add_clamped(1, 8, 12).unwrap();
        assert_eq!(tree.get_sum_clamped(5, 50).unwrap(), 5 + 2);
        assert_eq!(tree.get_sum_clamped(-7, -1).unwrap(), 0);
        assert!(tree.add_clamped(1, 3, 2).is_err());
        assert!(tree.get_sum_clamped(3, 2).is_err());
        check_invariants(&tree);
    }

    #[test]
    fn works_for_floats() {
        let mut tree = LazySegmentTree::<f64>::from_values(&[0.5, 1.5, 2.0]).unwrap();
        tree.add(0.25, 0, 1).unwrap();
        assert!((tree.get_sum(0, 2).unwrap() - 4.5).abs() < 1e-9);
    }
}
