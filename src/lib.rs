//! Wellbeing PCA - анализ региональных показателей: PCA, k-means и
//! ранжирование признаков по корреляции с оценкой благополучия.

pub mod api;
pub mod config;
pub mod dataset;
pub mod error;
pub mod models;
pub mod payload;
pub mod pipeline;
pub mod preprocessing;
pub mod schema;
pub mod types;

pub use config::AppConfig;
pub use error::PipelineError;
pub use types::*;

// Re-export для удобства
pub use pipeline::{build_payload, run, AnalysisOutcome};
