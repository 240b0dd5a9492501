//! Domain traversal: offset computation and the co-iteration driver.

use crate::plan::CoIterPlan;

/// Linear storage offset of one operand at one domain coordinate.
///
/// `Σ_k coord[k] * strides[k]`, with a 0-based indexing origin. Pure,
/// branch-free and allocation-free; this is the only per-point work done per
/// operand during traversal.
#[inline]
pub fn linear_offset(coord: &[usize], strides: &[isize]) -> isize {
    debug_assert_eq!(coord.len(), strides.len());
    coord
        .iter()
        .zip(strides.iter())
        .map(|(&c, &s)| c as isize * s)
        .sum()
}

/// Advance a coordinate one step in column-major order (axis 0 fastest).
///
/// Returns false when the coordinate wraps past the last point.
#[inline]
fn advance(coord: &mut [usize], extents: &[usize]) -> bool {
    for (c, &extent) in coord.iter_mut().zip(extents.iter()) {
        *c += 1;
        if *c < extent {
            return true;
        }
        *c = 0;
    }
    false
}

impl CoIterPlan {
    /// Write every operand's offset at `coord` into `out`.
    ///
    /// A pure function of the coordinate alone, with no dependence on
    /// traversal history: offsets for any coordinate can be computed without
    /// having visited the preceding ones, which is what makes disjoint range
    /// partitioning safe.
    ///
    /// # Panics
    /// Panics if `coord` or `out` have the wrong length.
    #[inline]
    pub fn offsets_at(&self, coord: &[usize], out: &mut [isize]) {
        assert_eq!(coord.len(), self.space().ndim());
        assert_eq!(out.len(), self.num_operands());
        for (slot, strides) in out.iter_mut().zip(self.stride_vectors().iter()) {
            *slot = linear_offset(coord, strides);
        }
    }

    /// Decode a linear domain position into a coordinate, column-major.
    ///
    /// Position 0 is the origin; position `k+1` is one step past position
    /// `k` in traversal order.
    ///
    /// # Panics
    /// Panics if `linear >= num_points()` or `out` has the wrong length.
    #[inline]
    pub fn coord_at(&self, linear: usize, out: &mut [usize]) {
        assert!(linear < self.space().num_points());
        assert_eq!(out.len(), self.space().ndim());
        let mut rem = linear;
        for (c, &extent) in out.iter_mut().zip(self.space().extents().iter()) {
            *c = rem % extent;
            rem /= extent;
        }
    }

    /// Traverse the whole domain, invoking `f(coord, offsets)` once per
    /// coordinate.
    ///
    /// Visitation order is column-major (axis 0 varies fastest) and is part
    /// of the contract: callers accumulating floating-point values in a
    /// specific sequence may rely on it. Offsets arrive in operand
    /// declaration order. The callback's own semantics (read, write,
    /// accumulate) are entirely the caller's concern.
    pub fn for_each<F>(&self, f: F)
    where
        F: FnMut(&[usize], &[isize]),
    {
        self.for_each_range(0, self.space().num_points(), f);
    }

    /// Traverse the contiguous sub-range `[start, end)` of linear positions.
    ///
    /// Produces exactly the coordinates and offsets the full traversal would
    /// produce at those positions. `end` is clamped to the domain size.
    pub fn for_each_range<F>(&self, start: usize, end: usize, mut f: F)
    where
        F: FnMut(&[usize], &[isize]),
    {
        let end = end.min(self.space().num_points());
        if start >= end {
            return;
        }
        // Scratch lives outside the loop; the loop body allocates nothing.
        let mut coord = vec![0usize; self.space().ndim()];
        let mut offsets = vec![0isize; self.num_operands()];
        self.coord_at(start, &mut coord);
        for _ in start..end {
            for (slot, strides) in offsets.iter_mut().zip(self.stride_vectors().iter()) {
                *slot = linear_offset(&coord, strides);
            }
            f(&coord, &offsets);
            if !advance(&mut coord, self.space().extents()) {
                break;
            }
        }
    }

    /// Traverse the domain in parallel over disjoint linear ranges.
    ///
    /// Each worker seeds its own starting coordinate via [`Self::coord_at`];
    /// there is no shared cursor. Coordinates are still visited exactly once,
    /// but in no particular order across chunks, so `f` must not rely on the
    /// sequential accumulation order.
    #[cfg(feature = "parallel")]
    pub fn par_for_each<F>(&self, f: F)
    where
        F: Fn(&[usize], &[isize]) + Sync,
    {
        use rayon::prelude::*;

        let total = self.space().num_points();
        if total == 0 {
            return;
        }
        let chunks = (rayon::current_num_threads() * 4).clamp(1, total);
        let chunk_len = total.div_ceil(chunks);
        (0..total)
            .into_par_iter()
            .step_by(chunk_len)
            .for_each(|chunk_start| {
                self.for_each_range(chunk_start, chunk_start + chunk_len, &f);
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AxisSpace, DimMap, Operand};

    fn plan_2x2() -> CoIterPlan {
        CoIterPlan::new(
            AxisSpace::new(&[2, 2]),
            &[Operand::col_major(&[2, 2], DimMap::new(&[0, 1]))],
        )
        .unwrap()
    }

    #[test]
    fn test_column_major_visitation() {
        let mut coords = vec![];
        plan_2x2().for_each(|coord, _| coords.push(coord.to_vec()));
        assert_eq!(
            coords,
            vec![vec![0, 0], vec![1, 0], vec![0, 1], vec![1, 1]]
        );
    }

    #[test]
    fn test_offsets_follow_declaration_order() {
        let plan = CoIterPlan::new(
            AxisSpace::new(&[2, 2]),
            &[
                Operand::col_major(&[2, 2], DimMap::new(&[0, 1])),
                Operand::col_major(&[2], DimMap::new(&[1])),
            ],
        )
        .unwrap();
        let mut seen = vec![];
        plan.for_each(|_, offsets| seen.push(offsets.to_vec()));
        // Operand 0 walks the full matrix; operand 1 only moves with axis 1.
        assert_eq!(
            seen,
            vec![vec![0, 0], vec![1, 0], vec![2, 1], vec![3, 1]]
        );
    }

    #[test]
    fn test_coord_at_matches_traversal() {
        let plan = CoIterPlan::new(
            AxisSpace::new(&[3, 2, 2]),
            &[Operand::col_major(&[3, 2, 2], DimMap::new(&[0, 1, 2]))],
        )
        .unwrap();
        let mut coords = vec![];
        plan.for_each(|coord, _| coords.push(coord.to_vec()));
        let mut decoded = vec![0usize; 3];
        for (linear, coord) in coords.iter().enumerate() {
            plan.coord_at(linear, &mut decoded);
            assert_eq!(&decoded, coord);
        }
    }

    #[test]
    fn test_range_agrees_with_full_traversal() {
        let plan = CoIterPlan::new(
            AxisSpace::new(&[3, 4]),
            &[Operand::col_major(&[3, 4], DimMap::new(&[0, 1]))],
        )
        .unwrap();
        let mut full = vec![];
        plan.for_each(|coord, offsets| full.push((coord.to_vec(), offsets.to_vec())));
        for start in 0..12 {
            for end in start..=12 {
                let mut part = vec![];
                plan.for_each_range(start, end, |coord, offsets| {
                    part.push((coord.to_vec(), offsets.to_vec()));
                });
                assert_eq!(part, &full[start..end]);
            }
        }
    }

    #[test]
    fn test_scalar_domain_single_visit() {
        let plan = CoIterPlan::new(AxisSpace::new(&[]), &[]).unwrap();
        let mut visits = 0;
        plan.for_each(|coord, offsets| {
            assert!(coord.is_empty());
            assert!(offsets.is_empty());
            visits += 1;
        });
        assert_eq!(visits, 1);
    }

    #[test]
    fn test_empty_extent_no_visits() {
        let plan = CoIterPlan::new(
            AxisSpace::new(&[2, 0]),
            &[Operand::col_major(&[2, 0], DimMap::new(&[0, 1]))],
        )
        .unwrap();
        let mut visits = 0;
        plan.for_each(|_, _| visits += 1);
        assert_eq!(visits, 0);
    }

    #[test]
    fn test_end_clamped() {
        let mut visits = 0;
        plan_2x2().for_each_range(2, 100, |_, _| visits += 1);
        assert_eq!(visits, 2);
    }

    #[test]
    fn test_linear_offset_negative_stride() {
        assert_eq!(linear_offset(&[2, 1], &[-1, 3]), 1);
        assert_eq!(linear_offset(&[], &[]), 0);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_par_for_each_visits_everything_once() {
        use std::sync::Mutex;

        let plan = CoIterPlan::new(
            AxisSpace::new(&[7, 5]),
            &[Operand::col_major(&[7, 5], DimMap::new(&[0, 1]))],
        )
        .unwrap();
        let seen = Mutex::new(vec![]);
        plan.par_for_each(|_, offsets| {
            seen.lock().unwrap().push(offsets[0]);
        });
        let mut seen = seen.into_inner().unwrap();
        seen.sort_unstable();
        assert_eq!(seen, (0..35).collect::<Vec<isize>>());
    }
}
