//! Масштабирование осей проекции к диапазону [-1, 1]

use ndarray::{Array1, Array2, Axis};

use crate::error::{PipelineError, Result};

/// Максимум |координаты| по каждой оси. Одним и тем же множителем делятся
/// координаты, нагрузки и синтетический вектор целевой оценки.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisScale {
    max_abs: Array1<f64>,
}

#[derive(Debug, Clone)]
pub struct NormalizedProjection {
    pub scores: Array2<f64>,
    pub loadings: Array2<f64>,
    pub scale: AxisScale,
}

impl AxisScale {
    pub fn fit(scores: &Array2<f64>) -> Result<Self> {
        if scores.nrows() == 0 {
            return Err(PipelineError::EmptyDataset);
        }
        let max_abs = scores.map_axis(Axis(0), |col| {
            col.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
        });
        if let Some(axis) = max_abs.iter().position(|m| !(*m > 0.0) || !m.is_finite()) {
            return Err(PipelineError::DegenerateAxis { axis });
        }
        Ok(Self { max_abs })
    }

    pub fn apply(&self, values: &Array2<f64>) -> Array2<f64> {
        values / &self.max_abs
    }

    pub fn apply_point(&self, point: &[f64]) -> Vec<f64> {
        point
            .iter()
            .zip(self.max_abs.iter())
            .map(|(v, m)| v / m)
            .collect()
    }
}

/// Делит координаты и нагрузки на per-axis максимум координат.
pub fn normalize_axes(scores: &Array2<f64>, loadings: &Array2<f64>) -> Result<NormalizedProjection> {
    let scale = AxisScale::fit(scores)?;
    Ok(NormalizedProjection {
        scores: scale.apply(scores),
        loadings: scale.apply(loadings),
        scale,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_scores_are_bounded_and_reach_one() {
        let scores = array![[2.0, -0.5], [-4.0, 0.25], [1.0, 0.1]];
        let loadings = array![[1.0, 1.0], [-2.0, 0.5]];
        let normalized = normalize_axes(&scores, &loadings).unwrap();

        for j in 0..2 {
            let col = normalized.scores.column(j);
            assert!(col.iter().all(|v| v.abs() <= 1.0));
            assert!(col.iter().any(|v| v.abs() == 1.0));
        }
        assert_eq!(normalized.scores[[1, 0]], -1.0);
        assert_eq!(normalized.scores[[0, 1]], -1.0);
    }

    #[test]
    fn test_loadings_use_same_factor() {
        let scores = array![[2.0, -0.5], [-4.0, 0.25]];
        let loadings = array![[1.0, 1.0], [-2.0, 0.5]];
        let normalized = normalize_axes(&scores, &loadings).unwrap();
        assert_eq!(normalized.loadings, array![[0.25, 2.0], [-0.5, 1.0]]);
        assert_eq!(normalized.scale.apply_point(&[4.0, 1.0]), vec![1.0, 2.0]);
    }

    #[test]
    fn test_degenerate_axis() {
        let scores = array![[1.0, 0.0], [-1.0, 0.0]];
        let err = AxisScale::fit(&scores).unwrap_err();
        assert!(matches!(err, PipelineError::DegenerateAxis { axis: 1 }));
    }
}
