//! Ошибки конвейера анализа

use thiserror::Error;

/// Любая ошибка при построении результата. Все варианты фатальны для старта
/// процесса: частичный результат никогда не отдаётся.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Invalid identifier {value:?} in row {row}")]
    InvalidIdentifier { row: usize, value: String },

    /// После удаления строк с пропусками не осталось данных.
    #[error("Empty dataset: no rows without missing values")]
    EmptyDataset,

    #[error("No numeric feature columns selected")]
    NoFeatures,

    #[error("Feature {column:?} has zero variance")]
    ZeroVariance { column: String },

    #[error("Too few rows: required {required}, actual {actual}")]
    TooFewRows { required: usize, actual: usize },

    #[error("Too few features: required {required}, actual {actual}")]
    TooFewFeatures { required: usize, actual: usize },

    #[error("Eigendecomposition failed: {0}")]
    Decomposition(String),

    /// Все точки лежат в нуле по одной из осей проекции.
    #[error("Projection axis {axis} is degenerate (max |coordinate| is zero)")]
    DegenerateAxis { axis: usize },

    #[error("Target score has zero variance")]
    ZeroVarianceTarget,

    #[error("Not enough correlation candidates: required {required}, actual {actual}")]
    InsufficientCandidates { required: usize, actual: usize },

    #[error("Clustering failed: {0}")]
    Clustering(String),

    #[error("Invalid cluster count {k} for {rows} rows")]
    InvalidClusterCount { k: usize, rows: usize },
}

impl PipelineError {
    pub fn missing_column(name: impl Into<String>) -> Self {
        Self::MissingColumn(name.into())
    }

    pub fn too_few_rows(required: usize, actual: usize) -> Self {
        Self::TooFewRows { required, actual }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
