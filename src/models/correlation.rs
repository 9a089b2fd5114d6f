//! Ранжирование признаков по корреляции с целевой оценкой

use ndarray::{Array1, Array2, ArrayView1};

use crate::error::{PipelineError, Result};
use crate::models::axis_scaling::AxisScale;
use crate::schema::FeatureSet;

/// Коэффициент Пирсона; `None`, если дисперсия одной из сторон нулевая.
pub fn pearson(x: ArrayView1<f64>, y: ArrayView1<f64>) -> Option<f64> {
    let n = x.len();
    if n < 2 || y.len() != n {
        return None;
    }

    let mean_x = x.mean()?;
    let mean_y = y.mean()?;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y.iter()) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x > 0.0 && var_y > 0.0 {
        Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationEntry {
    pub column: String,
    /// |r| с целевой оценкой.
    pub correlation: f64,
}

pub struct CorrelationRanker {
    excluded: Vec<String>,
    top_n: usize,
}

impl CorrelationRanker {
    pub fn new(excluded: impl IntoIterator<Item = impl Into<String>>, top_n: usize) -> Self {
        Self {
            excluded: excluded.into_iter().map(Into::into).collect(),
            top_n,
        }
    }

    /// Все признаки, кроме исключённых, по убыванию |r|; при равенстве
    /// сохраняется порядок колонок. Признаки с неопределённой корреляцией
    /// пропускаются.
    pub fn rank(
        &self,
        features: &FeatureSet,
        matrix: &Array2<f64>,
        target: &Array1<f64>,
    ) -> Vec<CorrelationEntry> {
        let mut entries: Vec<CorrelationEntry> = features
            .iter()
            .enumerate()
            .filter(|(_, f)| !self.excluded.iter().any(|e| *e == f.name))
            .filter_map(|(i, f)| match pearson(matrix.column(i), target.view()) {
                Some(r) => Some(CorrelationEntry {
                    column: f.name.clone(),
                    correlation: r.abs(),
                }),
                None => {
                    tracing::warn!("Correlation of {:?} with target is undefined, skipping", f.name);
                    None
                }
            })
            .collect();

        entries.sort_by(|a, b| b.correlation.total_cmp(&a.correlation));
        entries.truncate(self.top_n);
        entries
    }

    /// Как `rank`, но ровно `top_n` записей или ошибка.
    pub fn rank_exact(
        &self,
        features: &FeatureSet,
        matrix: &Array2<f64>,
        target: &Array1<f64>,
    ) -> Result<Vec<CorrelationEntry>> {
        let entries = self.rank(features, matrix, target);
        if entries.len() < self.top_n {
            return Err(PipelineError::InsufficientCandidates {
                required: self.top_n,
                actual: entries.len(),
            });
        }
        Ok(entries)
    }
}

/// Положение целевой оценки в нормализованной плоскости: корреляция с каждой
/// ненормализованной осью, делённая на тот же множитель, что и координаты.
pub fn target_loading(
    target: &Array1<f64>,
    scores: &Array2<f64>,
    scale: &AxisScale,
) -> Result<Vec<f64>> {
    let raw = scores
        .columns()
        .into_iter()
        .map(|axis| pearson(target.view(), axis).ok_or(PipelineError::ZeroVarianceTarget))
        .collect::<Result<Vec<f64>>>()?;
    Ok(scale.apply_point(&raw))
}
