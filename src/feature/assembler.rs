//! Concatenation of the text embedding and the scaled lexical columns.

use ndarray::{Array1, Array2, ArrayView1, Axis, concatenate, stack};

use crate::error::{Result, TriageError};

/// Classifier input: embedding dimensions first, then scaled signals.
pub type FeatureVector = Array1<f64>;

/// Joins embedding and scaled signals with a fixed layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeatureAssembler {
    embedding_dims: usize,
    signal_dims: usize,
}

impl FeatureAssembler {
    pub fn new(embedding_dims: usize, signal_dims: usize) -> Self {
        FeatureAssembler {
            embedding_dims,
            signal_dims,
        }
    }

    pub fn dimensions(&self) -> usize {
        self.embedding_dims + self.signal_dims
    }

    pub fn assemble(
        &self,
        embedding: ArrayView1<'_, f64>,
        scaled: ArrayView1<'_, f64>,
    ) -> Result<FeatureVector> {
        if embedding.len() != self.embedding_dims || scaled.len() != self.signal_dims {
            return Err(TriageError::feature(format!(
                "expected {} embedding and {} signal columns, got {} and {}",
                self.embedding_dims,
                self.signal_dims,
                embedding.len(),
                scaled.len()
            )));
        }
        concatenate(Axis(0), &[embedding.view(), scaled.view()]).map_err(|e| TriageError::feature(e.to_string()))
    }

    /// Stack assembled vectors into the `rows × dimensions` training matrix.
    pub fn stack(&self, rows: &[FeatureVector]) -> Result<Array2<f64>> {
        if rows.is_empty() {
            return Ok(Array2::zeros((0, self.dimensions())));
        }
        if let Some(row) = rows.iter().find(|r| r.len() != self.dimensions()) {
            return Err(TriageError::feature(format!(
                "expected {} features, got {}",
                self.dimensions(),
                row.len()
            )));
        }
        let views: Vec<ArrayView1<'_, f64>> = rows.iter().map(|r| r.view()).collect();
        stack(Axis(0), &views).map_err(|e| TriageError::feature(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_assemble_layout() {
        let assembler = FeatureAssembler::new(2, 3);
        let features = assembler
            .assemble(array![0.1, 0.2].view(), array![1.0, 2.0, 3.0].view())
            .unwrap();
        assert_eq!(features, array![0.1, 0.2, 1.0, 2.0, 3.0]);
        assert_eq!(assembler.dimensions(), 5);
    }

    #[test]
    fn test_dimension_mismatch() {
        let assembler = FeatureAssembler::new(2, 3);
        assert!(assembler.assemble(array![0.1].view(), array![1.0, 2.0, 3.0].view()).is_err());
        assert!(assembler.assemble(array![0.1, 0.2].view(), array![1.0].view()).is_err());
    }

    #[test]
    fn test_stack_rows() {
        let assembler = FeatureAssembler::new(1, 1);
        let matrix = assembler.stack(&[array![1.0, 2.0], array![3.0, 4.0]]).unwrap();
        assert_eq!(matrix, array![[1.0, 2.0], [3.0, 4.0]]);
        assert_eq!(assembler.stack(&[]).unwrap().dim(), (0, 2));
        assert!(assembler.stack(&[array![1.0]]).is_err());
    }
}
