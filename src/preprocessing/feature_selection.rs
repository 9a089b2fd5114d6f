//! Отбор признаков для анализа

use ndarray::{Array1, Array2};

use crate::dataset::RawTable;
use crate::error::{PipelineError, Result};
use crate::schema::{Feature, FeatureSet, EXCLUDED_COLUMNS, TARGET_COMPONENTS};

/// Результат отбора: упорядоченные признаки, матрица значений и индексы
/// строк исходной таблицы, попавших в матрицу.
#[derive(Debug, Clone)]
pub struct FeatureSelection {
    pub features: FeatureSet,
    pub matrix: Array2<f64>,
    pub retained_rows: Vec<usize>,
}

pub struct FeatureSelector {
    excluded: Vec<String>,
}

impl FeatureSelector {
    pub fn new(excluded: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            excluded: excluded.into_iter().map(Into::into).collect(),
        }
    }

    /// Числовые колонки таблицы в исходном порядке, кроме списка исключений.
    pub fn select_columns(&self, table: &RawTable) -> FeatureSet {
        let features = table
            .headers()
            .iter()
            .enumerate()
            .filter(|(_, name)| !self.excluded.iter().any(|e| e == *name))
            .filter(|(idx, _)| table.is_numeric_column(*idx))
            .map(|(idx, name)| Feature {
                name: name.clone(),
                source_index: idx,
            })
            .collect();
        FeatureSet::new(features)
    }

    /// Строит матрицу признаков; строки с пропуском в любом признаке отбрасываются.
    pub fn select(&self, table: &RawTable) -> Result<FeatureSelection> {
        let features = self.select_columns(table);
        if features.is_empty() {
            return Err(PipelineError::NoFeatures);
        }

        let mut rows: Vec<Vec<f64>> = Vec::with_capacity(table.n_rows());
        let mut retained_rows = Vec::new();

        for row in 0..table.n_rows() {
            let parsed: Option<Vec<f64>> = features
                .iter()
                .map(|f| table.numeric(row, f.source_index))
                .collect();
            if let Some(parsed) = parsed {
                rows.push(parsed);
                retained_rows.push(row);
            }
        }

        if retained_rows.is_empty() {
            return Err(PipelineError::EmptyDataset);
        }

        let dropped = table.n_rows() - retained_rows.len();
        tracing::info!(
            "Selected {} features, kept {} rows, dropped {} rows with missing values",
            features.len(),
            retained_rows.len(),
            dropped
        );

        let matrix = Array2::from_shape_fn((rows.len(), features.len()), |(i, j)| rows[i][j]);

        Ok(FeatureSelection {
            features,
            matrix,
            retained_rows,
        })
    }
}

impl Default for FeatureSelector {
    fn default() -> Self {
        Self::new(EXCLUDED_COLUMNS)
    }
}

impl FeatureSelection {
    /// Значения одного признака по имени.
    pub fn column(&self, name: &str) -> Result<Array1<f64>> {
        let idx = self
            .features
            .position(name)
            .ok_or_else(|| PipelineError::missing_column(name))?;
        Ok(self.matrix.column(idx).to_owned())
    }

    /// Целевая оценка для каждой оставшейся строки: среднее двух компонент.
    pub fn target_score(&self) -> Result<Array1<f64>> {
        let [first, second] = TARGET_COMPONENTS;
        let a = self.column(first)?;
        let b = self.column(second)?;
        Ok((a + b) / 2.0)
    }
}
