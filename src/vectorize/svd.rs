//! Randomized truncated SVD for sparse TF-IDF matrices.
//!
//! A seeded random range finder with power iterations reduces the problem to
//! a small dense matrix `B = Qᵀ A`, whose Gram matrix `B Bᵀ` is diagonalized
//! with cyclic Jacobi rotations. Right singular vectors become the
//! projection components.

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::sparse::{SparseMatrix, SparseRow};
use crate::error::{Result, TriageError};

const RANK_EPSILON: f64 = 1e-10;
const JACOBI_MAX_SWEEPS: usize = 100;
const JACOBI_TOLERANCE: f64 = 1e-14;

/// Truncated SVD settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TruncatedSvd {
    pub n_components: usize,
    pub oversampling: usize,
    pub n_iter: usize,
    pub seed: u64,
}

impl Default for TruncatedSvd {
    fn default() -> Self {
        TruncatedSvd {
            n_components: 20,
            oversampling: 10,
            n_iter: 5,
            seed: 42,
        }
    }
}

impl TruncatedSvd {
    pub fn new(n_components: usize) -> Self {
        TruncatedSvd {
            n_components,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fit the projection on a document-term matrix.
    ///
    /// Components beyond the numerical rank of the matrix are zero rows, so
    /// the projection always has `n_components` outputs.
    pub fn fit(&self, matrix: &SparseMatrix) -> Result<SvdProjection> {
        if self.n_components == 0 {
            return Err(TriageError::invalid_config("n_components must be positive"));
        }
        let n_features = matrix.n_cols();
        if matrix.n_rows() == 0 || n_features == 0 {
            return Err(TriageError::feature("cannot fit SVD on an empty matrix"));
        }

        let sketch = (self.n_components + self.oversampling)
            .min(matrix.n_rows())
            .min(n_features);
        let mut rng = StdRng::seed_from_u64(self.seed);

        // Range finder: Q spans the dominant column space of A.
        let omega = Array2::from_shape_fn((sketch, n_features), |_| rng.random_range(-1.0..1.0))
            .reversed_axes();
        let mut q = orthonormalize(&matrix.mul_dense(&omega));
        for _ in 0..self.n_iter {
            let z = orthonormalize(&matrix.transpose_mul_dense(&q));
            q = orthonormalize(&matrix.mul_dense(&z));
        }

        // B = Qᵀ A, one row per basis vector.
        let b = matrix.transpose_mul_dense(&q).reversed_axes();
        let (eigenvalues, eigenvectors) = jacobi_eigen(b.dot(&b.t()));

        let mut order: Vec<usize> = (0..eigenvalues.len()).collect();
        order.sort_by(|&x, &y| eigenvalues[y].total_cmp(&eigenvalues[x]));

        let mut components = Array2::zeros((self.n_components, n_features));
        let mut singular_values = vec![0.0; self.n_components];
        let mut rank = 0;
        for &k in order.iter().take(self.n_components) {
            let sigma = eigenvalues[k].max(0.0).sqrt();
            if sigma <= RANK_EPSILON {
                continue;
            }
            // v = Bᵀ w / σ
            let mut v = b.t().dot(&eigenvectors.column(k)) / sigma;
            flip_sign(&mut v);
            components.row_mut(rank).assign(&v);
            singular_values[rank] = sigma;
            rank += 1;
        }

        Ok(SvdProjection {
            components,
            singular_values,
        })
    }
}

/// Fitted projection from TF-IDF space to the dense embedding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SvdProjection {
    /// `n_components × n_features`.
    components: Array2<f64>,
    singular_values: Vec<f64>,
}

impl SvdProjection {
    pub fn transform(&self, row: &SparseRow) -> Array1<f64> {
        self.components.rows().into_iter().map(|c| row.dot(c)).collect()
    }

    pub fn components(&self) -> &Array2<f64> {
        &self.components
    }

    pub fn n_components(&self) -> usize {
        self.components.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.components.ncols()
    }

    pub fn singular_values(&self) -> &[f64] {
        &self.singular_values
    }

    /// Number of non-zero components.
    pub fn rank(&self) -> usize {
        self.singular_values.iter().filter(|s| **s > 0.0).count()
    }

    pub fn is_consistent(&self) -> bool {
        self.singular_values.len() == self.components.nrows()
    }
}

/// Modified Gram-Schmidt over the columns, with one re-orthogonalization
/// pass. Columns that collapse to zero are dropped.
fn orthonormalize(columns: &Array2<f64>) -> Array2<f64> {
    let mut basis: Vec<Array1<f64>> = Vec::with_capacity(columns.ncols());
    for column in columns.columns() {
        let mut col = column.to_owned();
        for _ in 0..2 {
            for q in &basis {
                let projection = col.dot(q);
                col.scaled_add(-projection, q);
            }
        }
        let norm = col.dot(&col).sqrt();
        if norm > RANK_EPSILON {
            basis.push(col / norm);
        }
    }

    let mut out = Array2::zeros((columns.nrows(), basis.len()));
    for (mut target, q) in out.axis_iter_mut(Axis(1)).zip(&basis) {
        target.assign(q);
    }
    out
}

/// Cyclic Jacobi eigendecomposition of a symmetric matrix.
///
/// Returns the eigenvalues and the eigenvector matrix whose column `k`
/// belongs to eigenvalue `k`.
fn jacobi_eigen(mut a: Array2<f64>) -> (Array1<f64>, Array2<f64>) {
    let n = a.nrows();
    let mut v = Array2::eye(n);

    for _ in 0..JACOBI_MAX_SWEEPS {
        let off: f64 = a
            .indexed_iter()
            .filter(|((i, j), _)| i != j)
            .map(|(_, x)| x * x)
            .sum();
        if off < JACOBI_TOLERANCE {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[[p, q]];
                if apq.abs() < f64::MIN_POSITIVE {
                    continue;
                }
                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let t = if theta == 0.0 {
                    1.0
                } else {
                    theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt())
                };
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                rotate(&mut a, Axis(1), p, q, c, s);
                rotate(&mut a, Axis(0), p, q, c, s);
                rotate(&mut v, Axis(1), p, q, c, s);
            }
        }
    }

    (a.diag().to_owned(), v)
}

/// Apply a Givens rotation to lanes `p` and `q` along `axis`.
fn rotate(m: &mut Array2<f64>, axis: Axis, p: usize, q: usize, c: f64, s: f64) {
    let lane_p = m.index_axis(axis, p).to_owned();
    let lane_q = m.index_axis(axis, q).to_owned();
    m.index_axis_mut(axis, p).assign(&(&lane_p * c - &lane_q * s));
    m.index_axis_mut(axis, q).assign(&(&lane_p * s + &lane_q * c));
}

/// Make the largest absolute loading positive.
fn flip_sign(component: &mut Array1<f64>) {
    let pivot = component
        .iter()
        .copied()
        .max_by(|a, b| a.abs().total_cmp(&b.abs()))
        .unwrap_or(0.0);
    if pivot < 0.0 {
        component.mapv_inplace(|x| -x);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn row(pairs: &[(usize, f64)]) -> SparseRow {
        SparseRow::from_pairs(pairs.to_vec())
    }

    fn corpus() -> SparseMatrix {
        SparseMatrix::new(
            vec![
                row(&[(0, 1.0), (1, 1.0)]),
                row(&[(0, 2.0), (1, 2.0)]),
                row(&[(2, 3.0)]),
                row(&[(2, 1.0), (3, 0.5)]),
            ],
            4,
        )
    }

    #[test]
    fn test_jacobi_on_diagonalizable_matrix() {
        let (values, vectors) = jacobi_eigen(array![[2.0, 1.0], [1.0, 2.0]]);
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        assert!((sorted[0] - 1.0).abs() < 1e-10);
        assert!((sorted[1] - 3.0).abs() < 1e-10);
        // Columns are unit length.
        let norm0 = vectors.column(0).dot(&vectors.column(0)).sqrt();
        assert!((norm0 - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_projection_pads_to_requested_dimensions() {
        let projection = TruncatedSvd::new(5).fit(&corpus()).unwrap();
        assert_eq!(projection.n_components(), 5);
        assert!(projection.rank() <= 4);
        assert!(projection.is_consistent());
        assert_eq!(projection.transform(&row(&[(1, 1.0)])).len(), 5);
    }

    #[test]
    fn test_leading_singular_value() {
        // Rank-2 block structure; the largest singular value is sqrt(10).
        let matrix = SparseMatrix::new(
            vec![row(&[(0, 1.0), (1, 1.0)]), row(&[(0, 2.0), (1, 2.0)]), row(&[(2, 1.0)])],
            3,
        );
        let projection = TruncatedSvd::new(2).fit(&matrix).unwrap();
        assert!((projection.singular_values()[0] - 10f64.sqrt()).abs() < 1e-8);
        assert!((projection.singular_values()[1] - 1.0).abs() < 1e-8);
    }

    #[test]
    fn test_sign_convention_and_determinism() {
        let a = TruncatedSvd::new(3).fit(&corpus()).unwrap();
        let b = TruncatedSvd::new(3).fit(&corpus()).unwrap();
        assert_eq!(a, b);
        for component in a.components().rows() {
            let pivot = component
                .iter()
                .copied()
                .max_by(|x, y| x.abs().total_cmp(&y.abs()))
                .unwrap();
            assert!(pivot >= 0.0);
        }
    }

    #[test]
    fn test_empty_matrix_is_an_error() {
        assert!(TruncatedSvd::default().fit(&SparseMatrix::new(vec![], 3)).is_err());
        assert!(TruncatedSvd::new(0).fit(&corpus()).is_err());
    }

    #[test]
    fn test_orthonormalize_drops_dependent_columns() {
        let basis = orthonormalize(&array![[1.0, 2.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0, 0.0]]);
        assert_eq!(basis.dim(), (3, 2));
        let gram = basis.t().dot(&basis);
        assert!((gram - Array2::<f64>::eye(2)).iter().all(|x| x.abs() < 1e-12));
    }
}
