/// Типы данных результата анализа

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub x: f64,
    pub y: f64,
    pub cluster: usize,
    pub id: i64,
    pub region: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadingRecord {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub magnitude: f64, // евклидова норма (x, y)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopVarRecord {
    pub full_name: String,
    pub short_name: String,
    pub correlation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistVarRecord {
    pub full_name: String,
    pub short_name: String,
}

/// Неизменяемый снимок результата; строится один раз при старте.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PcaPayload {
    pub k: usize,
    pub points: Vec<PointRecord>,
    pub loadings: Vec<LoadingRecord>,
    pub top_vars: Vec<TopVarRecord>,
    pub avg_loading: LoadingRecord,
    pub hist_vars: Vec<HistVarRecord>,
}
