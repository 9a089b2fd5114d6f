/// Модуль предобработки данных

pub mod feature_selection;
pub mod normalization;

pub use feature_selection::{FeatureSelection, FeatureSelector};
pub use normalization::Standardizer;
