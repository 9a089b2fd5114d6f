//! Стандартизация признаков (z-score)

#![allow(non_snake_case)]

use ndarray::{Array1, Array2, Axis};

use crate::error::{PipelineError, Result};
use crate::schema::FeatureSet;

/// Приводит каждый столбец к нулевому среднему и единичной дисперсии.
/// Дисперсия генеральная (ddof = 0).
pub struct Standardizer {
    mean: Option<Array1<f64>>,
    std: Option<Array1<f64>>,
}

impl Standardizer {
    pub fn new() -> Self {
        Self {
            mean: None,
            std: None,
        }
    }

    /// Столбец с нулевой дисперсией - ошибка, а не молчаливые NaN.
    pub fn fit(&mut self, X: &Array2<f64>, features: &FeatureSet) -> Result<()> {
        if X.nrows() == 0 {
            return Err(PipelineError::EmptyDataset);
        }

        let mean = X.mean_axis(Axis(0)).ok_or(PipelineError::EmptyDataset)?;
        let std = X.std_axis(Axis(0), 0.0);

        for (i, (&s, &m)) in std.iter().zip(mean.iter()).enumerate() {
            if !(s > 1e-12 * m.abs().max(1.0)) {
                let column = features
                    .get(i)
                    .map(|f| f.name.clone())
                    .unwrap_or_else(|| format!("#{i}"));
                return Err(PipelineError::ZeroVariance { column });
            }
        }

        self.mean = Some(mean);
        self.std = Some(std);
        Ok(())
    }

    pub fn transform(&self, X: &Array2<f64>) -> Result<Array2<f64>> {
        let (Some(mean), Some(std)) = (self.mean.as_ref(), self.std.as_ref()) else {
            return Err(PipelineError::Decomposition(
                "standardizer is not fitted".to_string(),
            ));
        };
        Ok((X - mean) / std)
    }

    pub fn fit_transform(&mut self, X: &Array2<f64>, features: &FeatureSet) -> Result<Array2<f64>> {
        self.fit(X, features)?;
        self.transform(X)
    }
}

impl Default for Standardizer {
    fn default() -> Self {
        Self::new()
    }
}
