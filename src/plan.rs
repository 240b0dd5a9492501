//! Plan construction: shape validation and stride folding.

use crate::axes::{col_major_strides, AxisSpace, DimMap};
use crate::{CoIterError, Result};

/// One participating array, described by its layout and its axis map.
///
/// The plan never touches array contents; an operand carries only the
/// extents, the native per-dimension strides (in elements, possibly
/// negative), and the [`DimMap`] tying each dimension to a domain axis.
#[derive(Debug, Clone)]
pub struct Operand {
    dims: Vec<usize>,
    strides: Vec<isize>,
    map: DimMap,
}

impl Operand {
    /// Describe an array with explicit native strides.
    pub fn new(dims: &[usize], strides: &[isize], map: DimMap) -> Self {
        Self {
            dims: dims.to_vec(),
            strides: strides.to_vec(),
            map,
        }
    }

    /// Describe a column-major array (first dimension unit stride, each
    /// subsequent stride the running product of the preceding extents).
    pub fn col_major(dims: &[usize], map: DimMap) -> Self {
        let strides = col_major_strides(dims);
        Self {
            dims: dims.to_vec(),
            strides,
            map,
        }
    }

    /// Extent of each array dimension.
    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Native stride of each array dimension.
    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// The axis map for this operand.
    #[inline]
    pub fn map(&self) -> &DimMap {
        &self.map
    }
}

/// Check one operand against the domain.
///
/// The expected extent of array dimension `i` is the extent of domain axis
/// `map[i]`; any disagreement fails construction. Runs before any stride
/// folding, since folding on inconsistent shapes is undefined.
fn validate_operand(space: &AxisSpace, index: usize, op: &Operand) -> Result<()> {
    let rank = op.dims.len();
    if op.map.rank() != rank {
        return Err(CoIterError::RankMismatch {
            operand: index,
            rank,
            map_len: op.map.rank(),
        });
    }
    if op.strides.len() != rank {
        return Err(CoIterError::StrideLengthMismatch {
            operand: index,
            rank,
            stride_len: op.strides.len(),
        });
    }
    for (dim, (&axis, &actual)) in op.map.axes().iter().zip(op.dims.iter()).enumerate() {
        if axis >= space.ndim() {
            return Err(CoIterError::AxisOutOfRange {
                operand: index,
                dim,
                axis,
                ndim: space.ndim(),
            });
        }
        let expected = space.extent(axis);
        if actual != expected {
            return Err(CoIterError::ShapeMismatch {
                operand: index,
                dim,
                axis,
                expected,
                actual,
            });
        }
    }
    Ok(())
}

/// Fold an operand's native strides into one stride per domain axis.
///
/// Entry `p` is the sum of the native strides of every array dimension
/// mapped to axis `p`, and 0 when none is. Repeated mappings (diagonal) and
/// unreferenced axes (broadcast) both fall out of this single summation.
/// Total for any operand that passed [`validate_operand`].
fn fold_strides(ndim: usize, op: &Operand) -> Vec<isize> {
    let mut folded = vec![0isize; ndim];
    for (&axis, &stride) in op.map.axes().iter().zip(op.strides.iter()) {
        folded[axis] += stride;
    }
    folded
}

/// A validated, ready-to-traverse iteration plan.
///
/// Holds the domain and one folded stride vector per operand, in declaration
/// order. Read-only after construction; traversal cannot fail.
#[derive(Debug, Clone)]
pub struct CoIterPlan {
    space: AxisSpace,
    stride_vecs: Vec<Vec<isize>>,
}

impl CoIterPlan {
    /// Validate every operand against `space` and fold its strides.
    ///
    /// All operands are checked before any stride vector is computed, so no
    /// mismatch can surface mid-traversal.
    ///
    /// # Errors
    /// Returns the first [`CoIterError`] naming the offending operand and
    /// dimension.
    pub fn new(space: AxisSpace, operands: &[Operand]) -> Result<Self> {
        for (index, op) in operands.iter().enumerate() {
            validate_operand(&space, index, op)?;
        }
        let stride_vecs = operands
            .iter()
            .map(|op| fold_strides(space.ndim(), op))
            .collect();
        Ok(Self { space, stride_vecs })
    }

    /// The shared iteration domain.
    #[inline]
    pub fn space(&self) -> &AxisSpace {
        &self.space
    }

    /// Number of participating operands.
    #[inline]
    pub fn num_operands(&self) -> usize {
        self.stride_vecs.len()
    }

    /// Folded per-axis stride vectors, one per operand in declaration order.
    #[inline]
    pub fn stride_vectors(&self) -> &[Vec<isize>] {
        &self.stride_vecs
    }

    /// Folded stride vector of operand `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    #[inline]
    pub fn stride_vector(&self, index: usize) -> &[isize] {
        &self.stride_vecs[index]
    }
}
