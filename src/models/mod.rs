/// Модели анализа

pub mod axis_scaling;
pub mod clustering;
pub mod correlation;
pub mod projection;

pub use axis_scaling::{normalize_axes, AxisScale, NormalizedProjection};
pub use clustering::{ClusterCountSelector, ClusterFit, ElbowReport, KMeansClusterer};
pub use correlation::{CorrelationEntry, CorrelationRanker};
pub use projection::{Projection, Projector};
