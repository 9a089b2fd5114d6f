//! Конвейер анализа: отбор признаков -> стандартизация -> PCA ->
//! масштабирование осей -> {выбор k -> k-means, корреляции} -> результат.
//!
//! Выполняется один раз при старте процесса; результат неизменяем.

use crate::config::AnalysisConfig;
use crate::dataset::{RawTable, RegionIdentity};
use crate::error::Result;
use crate::models::axis_scaling::normalize_axes;
use crate::models::clustering::ElbowReport;
use crate::models::correlation::{target_loading, CorrelationRanker};
use crate::models::projection::{cumulative_ratio, Projector};
use crate::payload::{PayloadAssembler, PayloadInputs};
use crate::preprocessing::{FeatureSelector, Standardizer};
use crate::schema::{required_columns, TARGET_COMPONENTS};
use crate::types::PcaPayload;

/// Результат конвейера вместе с диагностикой, которая не попадает в ответ API.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub payload: PcaPayload,
    pub elbow: ElbowReport,
    pub explained_variance_ratio: [f64; 2],
    pub empty_clusters: Vec<usize>,
}

pub fn run(table: &RawTable, config: &AnalysisConfig) -> Result<AnalysisOutcome> {
    table.require_columns(&required_columns())?;

    let selection = FeatureSelector::default().select(table)?;
    let target = selection.target_score()?;

    let standardized =
        Standardizer::new().fit_transform(&selection.matrix, &selection.features)?;

    let projection = Projector::default().fit_transform(&standardized)?;
    tracing::info!(
        "PCA: 2 axes explain {:.1}% of variance",
        cumulative_ratio(&projection, 2) * 100.0
    );
    let normalized = normalize_axes(&projection.scores, &projection.loadings)?;

    let elbow = config.cluster_count_selector().select(&normalized.scores)?;
    let clusters = config.clusterer().fit(&normalized.scores, elbow.selected)?;
    let empty_clusters = clusters.empty_clusters();
    if !empty_clusters.is_empty() {
        tracing::warn!("Empty clusters after k-means: {:?}", empty_clusters);
    }

    let ranker = CorrelationRanker::new(TARGET_COMPONENTS, config.top_n);
    let top_vars = ranker.rank_exact(&selection.features, &selection.matrix, &target)?;
    for entry in &top_vars {
        tracing::info!("Top correlation: {} = {:.4}", entry.column, entry.correlation);
    }

    let avg = target_loading(&target, &projection.scores, &normalized.scale)?;
    let target_xy = [avg[0], avg[1]];

    let identities = selection
        .retained_rows
        .iter()
        .map(|&row| table.identity(row))
        .collect::<Result<Vec<RegionIdentity>>>()?;

    let payload = PayloadAssembler::assemble(PayloadInputs {
        k: elbow.selected,
        identities: &identities,
        scores: &normalized.scores,
        labels: &clusters.labels,
        features: &selection.features,
        loadings: &normalized.loadings,
        top_vars: &top_vars,
        target_loading: target_xy,
    });

    tracing::info!(
        "Payload ready: k = {}, {} points, {} loadings",
        payload.k,
        payload.points.len(),
        payload.loadings.len()
    );

    Ok(AnalysisOutcome {
        payload,
        elbow,
        explained_variance_ratio: [
            projection.explained_variance_ratio[0],
            projection.explained_variance_ratio[1],
        ],
        empty_clusters,
    })
}

/// Только результат для отдачи клиентам.
pub fn build_payload(table: &RawTable, config: &AnalysisConfig) -> Result<PcaPayload> {
    run(table, config).map(|outcome| outcome.payload)
}
