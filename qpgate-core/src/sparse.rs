//! Sparse storage conversion between column-major and row-major layouts.
//!
//! The linear engine stores its constraint matrix column-major (CSC, the
//! standard input format for sparse direct solvers); the host retrieves it
//! row-major. This module owns that conversion plus the small helpers the
//! session layer needs.

use sprs::{CsMat, TriMat};

/// Sparse matrix in CSC format.
pub type SparseCsc = CsMat<f64>;

/// Row-major sparse matrix.
///
/// Entries are grouped implicitly by row: row r owns the
/// `count_per_row[r]` consecutive entries following those of rows 0..r,
/// ordered by ascending column index within the row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowMajor {
    /// Number of rows.
    pub rows: usize,

    /// Number of columns.
    pub cols: usize,

    /// Non-zero count of each row (length `rows`, sums to nnz).
    pub count_per_row: Vec<usize>,

    /// Column of each non-zero entry (length nnz, zero-based).
    pub column_position: Vec<usize>,

    /// Non-zero values (length nnz).
    pub values: Vec<f64>,
}

impl RowMajor {
    /// Total number of stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Column positions shifted to the host's one-based convention.
    ///
    /// Indices are zero-based everywhere inside the bridge; the shift is
    /// applied exactly once, at the external boundary.
    pub fn one_based_columns(&self) -> Vec<usize> {
        self.column_position.iter().map(|&c| c + 1).collect()
    }
}

/// Build a sparse CSC matrix from triplets (row, col, value).
pub fn from_triplets<I>(nrows: usize, ncols: usize, triplets: I) -> SparseCsc
where
    I: IntoIterator<Item = (usize, usize, f64)>,
{
    let mut tri = TriMat::new((nrows, ncols));
    for (i, j, v) in triplets {
        tri.add_triplet(i, j, v);
    }
    tri.to_csc()
}

/// Convert a column-major matrix to row-major storage.
///
/// Single counting-and-scatter pass, O(nnz + rows): count entries per row,
/// prefix-sum into scatter offsets, then walk the columns in ascending order
/// dropping each entry into its row's slot. Walking columns in order is what
/// keeps entries within a row sorted by column.
///
/// An empty matrix (nnz = 0) yields all-zero row counts and empty
/// value/column arrays.
pub fn csc_to_row_major(a: &SparseCsc) -> RowMajor {
    let rows = a.rows();
    let cols = a.cols();
    let nnz = a.nnz();

    let mut count_per_row = vec![0usize; rows];
    for (_, (row, _)) in a.iter() {
        count_per_row[row] += 1;
    }

    // offsets[r] = start of row r in the output arrays
    let mut offsets = vec![0usize; rows];
    let mut acc = 0;
    for r in 0..rows {
        offsets[r] = acc;
        acc += count_per_row[r];
    }

    let mut column_position = vec![0usize; nnz];
    let mut values = vec![0.0f64; nnz];
    for (col, col_view) in a.outer_iterator().enumerate() {
        for (row, &val) in col_view.iter() {
            let slot = offsets[row];
            column_position[slot] = col;
            values[slot] = val;
            offsets[row] += 1;
        }
    }

    RowMajor { rows, cols, count_per_row, column_position, values }
}

/// Convert row-major storage back to a column-major matrix.
pub fn row_major_to_csc(a: &RowMajor) -> SparseCsc {
    let mut tri = TriMat::new((a.rows, a.cols));
    let mut pos = 0;
    for (row, &count) in a.count_per_row.iter().enumerate() {
        for _ in 0..count {
            tri.add_triplet(row, a.column_position[pos], a.values[pos]);
            pos += 1;
        }
    }
    tri.to_csc()
}

/// Sparse matrix-vector product: y = A * x.
pub fn spmv(a: &SparseCsc, x: &[f64], y: &mut [f64]) {
    assert_eq!(a.cols(), x.len());
    assert_eq!(a.rows(), y.len());

    y.fill(0.0);
    for (val, (row, col)) in a.iter() {
        y[row] += *val * x[col];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triplet_set(a: &SparseCsc) -> Vec<(usize, usize, f64)> {
        let mut out: Vec<_> = a.iter().map(|(&v, (r, c))| (r, c, v)).collect();
        out.sort_by(|x, y| x.partial_cmp(y).unwrap());
        out
    }

    #[test]
    fn test_round_trip_small() {
        // [[1, 0, 2],
        //  [0, 3, 0]]
        let a = from_triplets(2, 3, vec![(0, 0, 1.0), (0, 2, 2.0), (1, 1, 3.0)]);
        let rm = csc_to_row_major(&a);

        assert_eq!(rm.count_per_row, vec![2, 1]);
        assert_eq!(rm.column_position, vec![0, 2, 1]);
        assert_eq!(rm.values, vec![1.0, 2.0, 3.0]);

        let back = row_major_to_csc(&rm);
        assert_eq!(triplet_set(&a), triplet_set(&back));
    }

    #[test]
    fn test_columns_ascending_within_row() {
        let a = from_triplets(
            2,
            4,
            vec![(0, 3, 4.0), (0, 0, 1.0), (1, 2, 3.0), (0, 1, 2.0), (1, 0, 5.0)],
        );
        let rm = csc_to_row_major(&a);

        let mut pos = 0;
        for &count in &rm.count_per_row {
            let row_cols = &rm.column_position[pos..pos + count];
            assert!(row_cols.windows(2).all(|w| w[0] < w[1]), "{:?}", row_cols);
            pos += count;
        }
        assert_eq!(rm.values[..3], [1.0, 2.0, 4.0]);
    }

    #[test]
    fn test_empty_matrix() {
        let a = from_triplets(3, 5, Vec::new());
        let rm = csc_to_row_major(&a);

        assert_eq!(rm.count_per_row, vec![0, 0, 0]);
        assert!(rm.column_position.is_empty());
        assert!(rm.values.is_empty());
        assert_eq!(rm.nnz(), 0);

        let back = row_major_to_csc(&rm);
        assert_eq!(back.rows(), 3);
        assert_eq!(back.cols(), 5);
        assert_eq!(back.nnz(), 0);
    }

    #[test]
    fn test_one_based_columns() {
        let a = from_triplets(1, 3, vec![(0, 0, 1.0), (0, 2, 2.0)]);
        let rm = csc_to_row_major(&a);
        assert_eq!(rm.one_based_columns(), vec![1, 3]);
        // Internal storage stays zero-based.
        assert_eq!(rm.column_position, vec![0, 2]);
    }

    #[test]
    fn test_spmv() {
        // [[1, 2], [3, 4]] * [1, 2] = [5, 11]
        let a = from_triplets(2, 2, vec![(0, 0, 1.0), (0, 1, 2.0), (1, 0, 3.0), (1, 1, 4.0)]);
        let mut y = vec![0.0; 2];
        spmv(&a, &[1.0, 2.0], &mut y);
        assert!((y[0] - 5.0).abs() < 1e-12);
        assert!((y[1] - 11.0).abs() < 1e-12);
    }
}
