//! Column standardization.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};

/// Fits per-column mean and population standard deviation.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardScaler;

impl StandardScaler {
    /// Learn mean and std of each column. A zero std is stored as 1 so the
    /// column is only centered.
    pub fn fit(rows: &Array2<f64>) -> Result<ScalerState> {
        let mean = rows
            .mean_axis(Axis(0))
            .ok_or_else(|| TriageError::feature("cannot fit scaler on zero rows"))?;
        let mut std = rows.std_axis(Axis(0), 0.0);
        std.mapv_inplace(|s| if s == 0.0 || !s.is_finite() { 1.0 } else { s });
        Ok(ScalerState { mean, std })
    }
}

/// Fitted scaling parameters. Applied as-is at inference, never refitted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScalerState {
    mean: Array1<f64>,
    std: Array1<f64>,
}

impl ScalerState {
    pub fn transform(&self, row: ArrayView1<'_, f64>) -> Result<Array1<f64>> {
        if row.len() != self.mean.len() {
            return Err(TriageError::feature(format!(
                "scaler expects {} columns, got {}",
                self.mean.len(),
                row.len()
            )));
        }
        Ok((&row - &self.mean) / &self.std)
    }

    pub fn width(&self) -> usize {
        self.mean.len()
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn std(&self) -> &Array1<f64> {
        &self.std
    }
}
