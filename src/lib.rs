//! Co-iteration over strided arrays with per-operand axis maps.
//!
//! Several arrays share one N-dimensional iteration domain ([`AxisSpace`]).
//! Each array declares, per array dimension, which domain axis that dimension
//! walks along ([`DimMap`]). Maps may repeat an axis (diagonal/trace access)
//! or leave an axis unreferenced (broadcast: the array is invariant along it).
//!
//! Plan construction ([`CoIterPlan::new`]) validates every operand's shape
//! against the domain and folds its native strides into one per-axis stride
//! vector. Traversal ([`CoIterPlan::for_each`]) then visits every domain
//! coordinate in column-major order (first axis fastest) and hands the caller
//! the coordinate plus each operand's linear storage offset. All failure
//! surfaces at construction; the hot loop is branch-free and allocation-free.
//!
//! # Example
//!
//! Matrix multiply as a co-iteration over the domain `(m, k, n)`:
//!
//! ```
//! use strided_coiter::{AxisSpace, CoIterPlan, DimMap, Operand};
//!
//! let (m, k, n) = (2, 2, 2);
//! let a = vec![1.0, 0.0, 0.0, 1.0]; // identity, column-major
//! let b = vec![1.0, 3.0, 2.0, 4.0]; // [[1, 2], [3, 4]], column-major
//! let mut c = vec![0.0f64; m * n];
//!
//! let plan = CoIterPlan::new(
//!     AxisSpace::new(&[m, k, n]),
//!     &[
//!         Operand::col_major(&[m, k], DimMap::new(&[0, 1])),
//!         Operand::col_major(&[k, n], DimMap::new(&[1, 2])),
//!         Operand::col_major(&[m, n], DimMap::new(&[0, 2])),
//!     ],
//! )
//! .unwrap();
//!
//! plan.for_each(|_coord, offsets| {
//!     c[offsets[2] as usize] += a[offsets[0] as usize] * b[offsets[1] as usize];
//! });
//!
//! assert_eq!(c, vec![1.0, 3.0, 2.0, 4.0]);
//! ```

mod axes;
mod iter;
mod plan;

pub use axes::{col_major_strides, AxisSpace, DimMap};
pub use iter::linear_offset;
pub use plan::{CoIterPlan, Operand};

/// Errors detected while constructing a [`CoIterPlan`].
///
/// Every fallible check runs at plan construction; traversal itself cannot
/// fail. All variants name the offending operand by its position in the
/// operand list handed to [`CoIterPlan::new`].
#[derive(Debug, thiserror::Error)]
pub enum CoIterError {
    /// An operand's extent disagrees with the domain axis its dimension maps to.
    #[error(
        "operand {operand}: dimension {dim} has extent {actual}, \
         but maps to axis {axis} of extent {expected}"
    )]
    ShapeMismatch {
        operand: usize,
        dim: usize,
        axis: usize,
        expected: usize,
        actual: usize,
    },

    /// An operand's dim map length disagrees with its rank.
    #[error("operand {operand}: rank {rank} does not match dim map length {map_len}")]
    RankMismatch {
        operand: usize,
        rank: usize,
        map_len: usize,
    },

    /// A dim map entry names a domain axis that does not exist.
    #[error(
        "operand {operand}: dimension {dim} maps to axis {axis}, but the domain has {ndim} axes"
    )]
    AxisOutOfRange {
        operand: usize,
        dim: usize,
        axis: usize,
        ndim: usize,
    },

    /// An operand's stride list length disagrees with its rank.
    #[error("operand {operand}: {rank} dimensions but {stride_len} strides")]
    StrideLengthMismatch {
        operand: usize,
        rank: usize,
        stride_len: usize,
    },
}

/// Result type for plan construction.
pub type Result<T> = std::result::Result<T, CoIterError>;
