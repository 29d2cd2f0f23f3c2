//! Minimal row-major sparse matrix used between TF-IDF and SVD.

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// One sparse row; `indices` are strictly increasing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseRow {
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
}

impl SparseRow {
    /// Build a row from `(column, value)` pairs, dropping zeros.
    pub fn from_pairs(mut pairs: Vec<(usize, f64)>) -> Self {
        pairs.sort_by_key(|(index, _)| *index);
        let (indices, values) = pairs.into_iter().filter(|(_, v)| *v != 0.0).unzip();
        SparseRow { indices, values }
    }

    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Dot product with a dense vector.
    pub fn dot(&self, dense: ArrayView1<'_, f64>) -> f64 {
        self.iter()
            .map(|(i, v)| dense.get(i).map_or(0.0, |d| v * d))
            .sum()
    }

    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }
}

/// Row-major sparse matrix.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SparseMatrix {
    rows: Vec<SparseRow>,
    n_cols: usize,
}

impl SparseMatrix {
    pub fn new(rows: Vec<SparseRow>, n_cols: usize) -> Self {
        SparseMatrix { rows, n_cols }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn rows(&self) -> &[SparseRow] {
        &self.rows
    }

    /// `A · X` where `X` is `n_cols × k`.
    pub fn mul_dense(&self, x: &Array2<f64>) -> Array2<f64> {
        let mut out = Array2::zeros((self.n_rows(), x.ncols()));
        for (row, mut target) in self.rows.iter().zip(out.rows_mut()) {
            for (j, v) in row.iter() {
                target.scaled_add(v, &x.row(j));
            }
        }
        out
    }

    /// `Aᵀ · Y` where `Y` is `n_rows × k`.
    pub fn transpose_mul_dense(&self, y: &Array2<f64>) -> Array2<f64> {
        let mut out = Array2::zeros((self.n_cols, y.ncols()));
        for (row, weights) in self.rows.iter().zip(y.rows()) {
            for (j, v) in row.iter() {
                out.row_mut(j).scaled_add(v, &weights);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_from_pairs_sorts_and_drops_zeros() {
        let row = SparseRow::from_pairs(vec![(3, 1.0), (0, 2.0), (1, 0.0)]);
        assert_eq!(row.indices, vec![0, 3]);
        assert_eq!(row.values, vec![2.0, 1.0]);
        assert_eq!(row.nnz(), 2);
    }

    #[test]
    fn test_products() {
        let matrix = SparseMatrix::new(
            vec![
                SparseRow::from_pairs(vec![(0, 1.0), (2, 2.0)]),
                SparseRow::from_pairs(vec![(1, 3.0)]),
            ],
            3,
        );
        assert_eq!(
            matrix.mul_dense(&array![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0]]),
            array![[3.0, 4.0], [3.0, 3.0]]
        );
        assert_eq!(
            matrix.transpose_mul_dense(&array![[1.0], [2.0]]),
            array![[1.0], [6.0], [2.0]]
        );
        assert_eq!(matrix.rows()[0].dot(array![1.0, 1.0, 1.0].view()), 3.0);
    }
}
