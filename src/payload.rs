//! Сборка итогового результата
//!
//! Округление выполняется только здесь, промежуточные вычисления идут в
//! полной точности.

use ndarray::{Array1, Array2};

use crate::dataset::RegionIdentity;
use crate::models::correlation::CorrelationEntry;
use crate::schema::{short_name, FeatureSet, HIST_COLUMNS, TARGET_NAME};
use crate::types::{HistVarRecord, LoadingRecord, PcaPayload, PointRecord, TopVarRecord};

pub const COORD_DIGITS: usize = 6;
pub const CORR_DIGITS: usize = 4;

/// Округление до `digits` знаков по точному десятичному значению `value`
/// (без промежуточного умножения на 10^digits); отрицательный ноль
/// заменяется нулём.
pub fn round_to(value: f64, digits: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let rounded = format!("{value:.digits$}").parse::<f64>().unwrap_or(value);
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

fn loading_record(name: &str, x: f64, y: f64) -> LoadingRecord {
    LoadingRecord {
        name: name.to_string(),
        x: round_to(x, COORD_DIGITS),
        y: round_to(y, COORD_DIGITS),
        magnitude: round_to(x.hypot(y), COORD_DIGITS),
    }
}

/// Всё, из чего собирается результат.
pub struct PayloadInputs<'a> {
    pub k: usize,
    pub identities: &'a [RegionIdentity],
    pub scores: &'a Array2<f64>,
    pub labels: &'a Array1<usize>,
    pub features: &'a FeatureSet,
    pub loadings: &'a Array2<f64>,
    pub top_vars: &'a [CorrelationEntry],
    pub target_loading: [f64; 2],
}

pub struct PayloadAssembler;

impl PayloadAssembler {
    pub fn assemble(inputs: PayloadInputs<'_>) -> PcaPayload {
        let points = inputs
            .identities
            .iter()
            .zip(inputs.scores.rows())
            .zip(inputs.labels.iter())
            .map(|((identity, coords), &cluster)| PointRecord {
                x: round_to(coords[0], COORD_DIGITS),
                y: round_to(coords[1], COORD_DIGITS),
                cluster,
                id: identity.id,
                region: identity.region.clone(),
                state: identity.state.clone(),
            })
            .collect();

        let loadings = inputs
            .features
            .iter()
            .zip(inputs.loadings.rows())
            .map(|(feature, row)| loading_record(feature.short_name(), row[0], row[1]))
            .collect();

        let top_vars = inputs
            .top_vars
            .iter()
            .map(|entry| TopVarRecord {
                full_name: entry.column.clone(),
                short_name: short_name(&entry.column).to_string(),
                correlation: round_to(entry.correlation, CORR_DIGITS),
            })
            .collect();

        let [tx, ty] = inputs.target_loading;

        PcaPayload {
            k: inputs.k,
            points,
            loadings,
            top_vars,
            avg_loading: loading_record(TARGET_NAME, tx, ty),
            hist_vars: hist_vars(),
        }
    }
}

pub fn hist_vars() -> Vec<HistVarRecord> {
    HIST_COLUMNS
        .iter()
        .map(|column| HistVarRecord {
            full_name: column.to_string(),
            short_name: short_name(column).to_string(),
        })
        .collect()
}
