//! Кластеризация k-means и выбор числа кластеров методом "локтя"

use linfa::traits::Fit;
use linfa::DatasetBase;
use linfa_clustering::KMeans;
use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::error::{PipelineError, Result};

/// Результат одной кластеризации.
#[derive(Debug, Clone)]
pub struct ClusterFit {
    pub k: usize,
    pub labels: Array1<usize>,
    pub centroids: Array2<f64>,
    /// Сумма квадратов расстояний до ближайшего центроида.
    pub inertia: f64,
}

impl ClusterFit {
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.k];
        for &label in self.labels.iter() {
            sizes[label] += 1;
        }
        sizes
    }

    /// Метки кластеров, которым не досталось ни одной точки.
    pub fn empty_clusters(&self) -> Vec<usize> {
        self.cluster_sizes()
            .iter()
            .enumerate()
            .filter(|(_, &size)| size == 0)
            .map(|(label, _)| label)
            .collect()
    }
}

/// k-means с фиксированным seed и несколькими перезапусками;
/// остаётся перезапуск с наименьшей инерцией.
#[derive(Debug, Clone)]
pub struct KMeansClusterer {
    pub seed: u64,
    pub n_runs: usize,
    pub max_iterations: u64,
    pub tolerance: f64,
}

impl KMeansClusterer {
    pub fn new(seed: u64, n_runs: usize) -> Self {
        Self {
            seed,
            n_runs,
            ..Self::default()
        }
    }

    pub fn fit(&self, points: &Array2<f64>, k: usize) -> Result<ClusterFit> {
        let rows = points.nrows();
        if k == 0 || k > rows {
            return Err(PipelineError::InvalidClusterCount { k, rows });
        }

        let dataset = DatasetBase::from(points.clone());
        let rng = StdRng::seed_from_u64(self.seed);
        let model = KMeans::params_with_rng(k, rng)
            .n_runs(self.n_runs)
            .max_n_iterations(self.max_iterations)
            .tolerance(self.tolerance)
            .fit(&dataset)
            .map_err(|e| PipelineError::Clustering(e.to_string()))?;

        let centroids = model.centroids().to_owned();
        let mut labels = Array1::zeros(rows);
        let mut inertia = 0.0;
        for (i, point) in points.rows().into_iter().enumerate() {
            let (label, distance) = nearest_centroid(point, &centroids);
            labels[i] = label;
            inertia += distance;
        }

        Ok(ClusterFit {
            k,
            labels,
            centroids,
            inertia,
        })
    }
}

impl Default for KMeansClusterer {
    fn default() -> Self {
        Self {
            seed: 0,
            n_runs: 10,
            max_iterations: 300,
            tolerance: 1e-4,
        }
    }
}

/// Индекс ближайшего центроида (меньший при равенстве) и квадрат расстояния.
fn nearest_centroid(point: ArrayView1<f64>, centroids: &Array2<f64>) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (label, centroid) in centroids.rows().into_iter().enumerate() {
        let distance: f64 = point
            .iter()
            .zip(centroid.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum();
        if distance < best.1 {
            best = (label, distance);
        }
    }
    best
}

/// Поиск "колена" (Kneedle) для выпуклой убывающей кривой.
/// Возвращает индекс точки или `None`, если колено не найдено.
pub fn find_elbow(x: &[f64], y: &[f64], sensitivity: f64) -> Option<usize> {
    let n = x.len();
    if n < 3 || y.len() != n {
        return None;
    }

    let x_norm = min_max(x)?;
    let y_norm = min_max(y)?;
    let y_max = y_norm.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    // выпуклая убывающая кривая переворачивается в вогнутую возрастающую
    let difference: Vec<f64> = y_norm
        .iter()
        .zip(x_norm.iter())
        .map(|(yn, xn)| (y_max - yn) - xn)
        .collect();

    let maxima = relative_extrema(&difference, |a, b| a >= b);
    let minima = relative_extrema(&difference, |a, b| a <= b);
    let first_max = *maxima.first()?;

    let mean_step = x_norm.windows(2).map(|w| w[1] - w[0]).sum::<f64>() / (n - 1) as f64;
    let offset = sensitivity * mean_step.abs();

    let mut threshold = 0.0;
    let mut threshold_index = first_max;
    for i in first_max..n - 1 {
        if maxima.contains(&i) {
            threshold = difference[i] - offset;
            threshold_index = i;
        }
        if minima.contains(&i) {
            threshold = 0.0;
        }
        if difference[i + 1] < threshold {
            return Some(threshold_index);
        }
    }
    None
}

fn min_max(values: &[f64]) -> Option<Vec<f64>> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if !(range > 0.0) || !range.is_finite() {
        return None;
    }
    Some(values.iter().map(|v| (v - min) / range).collect())
}

/// Локальные экстремумы с "прижатыми" краями: крайняя точка сравнивается
/// только со своим единственным соседом.
fn relative_extrema(values: &[f64], cmp: impl Fn(f64, f64) -> bool) -> Vec<usize> {
    let n = values.len();
    (0..n)
        .filter(|&i| {
            let prev = values[i.saturating_sub(1)];
            let next = values[(i + 1).min(n - 1)];
            cmp(values[i], prev) && cmp(values[i], next)
        })
        .collect()
}

/// Кривая инерции и выбор числа кластеров.
#[derive(Debug, Clone, Serialize)]
pub struct ElbowReport {
    pub candidates: Vec<usize>,
    pub inertias: Vec<f64>,
    /// Колено, найденное алгоритмом (если есть).
    pub detected: Option<usize>,
    /// Колено или значение по умолчанию, если колено не найдено.
    pub recommended: usize,
    /// Число кластеров, которое реально используется.
    pub selected: usize,
}

impl ElbowReport {
    /// Выбранное значение расходится с найденным коленом. Это допустимо:
    /// фиксированное число кластеров задаётся конфигурацией.
    pub fn is_overridden(&self) -> bool {
        self.detected != Some(self.selected)
    }
}

pub struct ClusterCountSelector {
    pub clusterer: KMeansClusterer,
    pub max_k: usize,
    pub sensitivity: f64,
    pub fallback_k: usize,
    pub fixed_k: Option<usize>,
}

impl ClusterCountSelector {
    pub fn inertia_curve(&self, points: &Array2<f64>) -> Result<(Vec<usize>, Vec<f64>)> {
        let upper = self.max_k.min(points.nrows());
        let candidates: Vec<usize> = (1..=upper).collect();
        let inertias = candidates
            .iter()
            .map(|&k| self.clusterer.fit(points, k).map(|fit| fit.inertia))
            .collect::<Result<Vec<_>>>()?;
        Ok((candidates, inertias))
    }

    pub fn select(&self, points: &Array2<f64>) -> Result<ElbowReport> {
        let (candidates, inertias) = self.inertia_curve(points)?;
        let xs: Vec<f64> = candidates.iter().map(|&k| k as f64).collect();
        let detected = find_elbow(&xs, &inertias, self.sensitivity).map(|i| candidates[i]);

        let recommended = match detected {
            Some(k) => k,
            None => {
                tracing::warn!(
                    "No elbow found in inertia curve, falling back to k = {}",
                    self.fallback_k
                );
                self.fallback_k
            }
        };
        let selected = self
            .fixed_k
            .unwrap_or(recommended)
            .clamp(1, points.nrows().max(1));

        tracing::info!(
            "Inertia curve {:?}; detected elbow {:?}, selected k = {}",
            inertias,
            detected,
            selected
        );

        Ok(ElbowReport {
            candidates,
            inertias,
            detected,
            recommended,
            selected,
        })
    }
}

impl Default for ClusterCountSelector {
    fn default() -> Self {
        Self {
            clusterer: KMeansClusterer::default(),
            max_k: 10,
            sensitivity: 1.0,
            fallback_k: 4,
            fixed_k: Some(3),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn blobs() -> Array2<f64> {
        array![
            [-0.9, -0.9],
            [-0.8, -1.0],
            [-1.0, -0.8],
            [-0.85, -0.95],
            [0.9, 0.9],
            [1.0, 0.8],
            [0.8, 1.0],
            [0.95, 0.85],
            [0.9, -0.9],
            [1.0, -0.8],
            [0.8, -1.0],
            [0.85, -0.95],
        ]
    }

    #[test]
    fn test_single_cluster_labels_everything_zero() {
        let fit = KMeansClusterer::default().fit(&blobs(), 1).unwrap();
        assert!(fit.labels.iter().all(|&l| l == 0));
        assert_eq!(fit.cluster_sizes(), vec![12]);
    }

    #[test]
    fn test_labels_in_range_and_groups_recovered() {
        let fit = KMeansClusterer::default().fit(&blobs(), 3).unwrap();
        assert!(fit.labels.iter().all(|&l| l < 3));
        assert!(fit.empty_clusters().is_empty());
        for group in 0..3 {
            let first = fit.labels[group * 4];
            for i in 0..4 {
                assert_eq!(fit.labels[group * 4 + i], first);
            }
        }
    }

    #[test]
    fn test_fit_is_deterministic() {
        let clusterer = KMeansClusterer::new(0, 10);
        let a = clusterer.fit(&blobs(), 3).unwrap();
        let b = clusterer.fit(&blobs(), 3).unwrap();
        assert_eq!(a.labels, b.labels);
        assert_eq!(a.inertia, b.inertia);
    }

    #[test]
    fn test_invalid_cluster_count() {
        let clusterer = KMeansClusterer::default();
        assert!(clusterer.fit(&blobs(), 0).is_err());
        assert!(clusterer.fit(&blobs(), 13).is_err());
    }

    #[test]
    fn test_empty_clusters_are_reported() {
        let fit = ClusterFit {
            k: 3,
            labels: array![0, 0, 2],
            centroids: Array2::zeros((3, 2)),
            inertia: 0.0,
        };
        assert_eq!(fit.cluster_sizes(), vec![2, 0, 1]);
        assert_eq!(fit.empty_clusters(), vec![1]);
    }

    #[test]
    fn test_find_elbow_on_convex_decreasing_curve() {
        let x: Vec<f64> = (1..=10).map(f64::from).collect();
        let y = [100.0, 40.0, 15.0, 12.0, 10.0, 9.0, 8.0, 7.5, 7.0, 6.8];
        assert_eq!(find_elbow(&x, &y, 1.0), Some(2));
    }

    #[test]
    fn test_find_elbow_flat_curve() {
        let x: Vec<f64> = (1..=5).map(f64::from).collect();
        let y = [3.0; 5];
        assert_eq!(find_elbow(&x, &y, 1.0), None);
    }

    #[test]
    fn test_find_elbow_straight_line() {
        let x: Vec<f64> = (1..=5).map(f64::from).collect();
        let y = [5.0, 4.0, 3.0, 2.0, 1.0];
        assert_eq!(find_elbow(&x, &y, 1.0), None);
    }

    #[test]
    fn test_selector_reports_detected_and_selected() {
        let selector = ClusterCountSelector::default();
        let report = selector.select(&blobs()).unwrap();
        assert_eq!(report.candidates, (1..=10).collect::<Vec<_>>());
        assert_eq!(report.inertias.len(), 10);
        assert_eq!(report.selected, 3);
        assert!(report.inertias[0] > report.inertias[2]);
    }

    #[test]
    fn test_selector_without_fixed_k_uses_elbow_or_fallback() {
        let selector = ClusterCountSelector {
            fixed_k: None,
            ..ClusterCountSelector::default()
        };
        let report = selector.select(&blobs()).unwrap();
        assert_eq!(report.selected, report.recommended);
        match report.detected {
            Some(k) => assert_eq!(report.selected, k),
            None => assert_eq!(report.selected, 4),
        }
    }

    #[test]
    fn test_candidate_range_is_clipped_to_rows() {
        let points = array![[0.0, 0.0], [1.0, 1.0], [-1.0, 0.5]];
        let (candidates, inertias) = ClusterCountSelector::default()
            .inertia_curve(&points)
            .unwrap();
        assert_eq!(candidates, vec![1, 2, 3]);
        assert!(inertias[2].abs() < 1e-12);
    }
}
