//! Shared iteration domain and per-operand axis assignments.

/// The shared N-dimensional iteration domain.
///
/// An ordered list of axis extents, immutable once constructed. The extent
/// order is also the traversal order: [`crate::CoIterPlan::for_each`] varies
/// axis 0 fastest (column-major).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisSpace {
    extents: Vec<usize>,
}

impl AxisSpace {
    /// Create a domain from its axis extents.
    pub fn new(extents: &[usize]) -> Self {
        Self {
            extents: extents.to_vec(),
        }
    }

    /// Number of domain axes.
    #[inline]
    pub fn ndim(&self) -> usize {
        self.extents.len()
    }

    /// Extents of all axes.
    #[inline]
    pub fn extents(&self) -> &[usize] {
        &self.extents
    }

    /// Extent of axis `axis`.
    ///
    /// # Panics
    /// Panics if `axis` is out of range.
    #[inline]
    pub fn extent(&self, axis: usize) -> usize {
        self.extents[axis]
    }

    /// Total number of coordinates in the domain.
    ///
    /// A zero-dimensional domain has exactly one coordinate (the empty
    /// tuple); a domain with any zero extent has none.
    #[inline]
    pub fn num_points(&self) -> usize {
        self.extents.iter().product()
    }
}

/// Per-operand assignment of each array dimension to a domain axis.
///
/// Entry `i` names the axis of the [`AxisSpace`] that array dimension `i`
/// walks along. Axes are 0-based. Entries may repeat (the array's mapped
/// dimensions then advance together: diagonal access) and domain axes may be
/// left unreferenced (the array's offset is invariant along them: broadcast
/// access).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimMap {
    axes: Vec<usize>,
}

impl DimMap {
    /// Create a map from per-dimension axis indices.
    pub fn new(axes: &[usize]) -> Self {
        Self {
            axes: axes.to_vec(),
        }
    }

    /// The axis assigned to each array dimension.
    #[inline]
    pub fn axes(&self) -> &[usize] {
        &self.axes
    }

    /// Rank of the array this map describes.
    #[inline]
    pub fn rank(&self) -> usize {
        self.axes.len()
    }
}

/// Compute column-major strides (first index varies fastest).
pub fn col_major_strides(dims: &[usize]) -> Vec<isize> {
    let rank = dims.len();
    if rank == 0 {
        return vec![];
    }
    let mut strides = vec![1isize; rank];
    for i in 1..rank {
        strides[i] = strides[i - 1] * dims[i - 1] as isize;
    }
    strides
}
