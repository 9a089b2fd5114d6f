//! Метод главных компонент (PCA)

#![allow(non_snake_case)]

use ndarray::{s, Array1, Array2, Axis};

use crate::error::{PipelineError, Result};

const MAX_SWEEPS: usize = 100;

/// Результат проекции на главные оси.
#[derive(Debug, Clone)]
pub struct Projection {
    /// Координаты строк, n x n_components.
    pub scores: Array2<f64>,
    /// Единичные собственные векторы, p x n_components.
    pub components: Array2<f64>,
    /// Нагрузки признаков: компонента * sqrt(дисперсия оси), p x n_components.
    pub loadings: Array2<f64>,
    pub explained_variance: Array1<f64>,
    pub explained_variance_ratio: Array1<f64>,
}

pub struct Projector {
    n_components: usize,
}

impl Projector {
    pub fn new(n_components: usize) -> Self {
        Self { n_components }
    }

    /// Проецирует стандартизованную матрицу на первые главные оси.
    ///
    /// Дисперсия осей считается по выборочной ковариации (n - 1). Знак каждой
    /// оси выбирается так, чтобы наибольшая по модулю компонента была
    /// положительной; координаты и нагрузки используют одну ориентацию.
    pub fn fit_transform(&self, X: &Array2<f64>) -> Result<Projection> {
        let (n_samples, n_features) = X.dim();
        if n_samples < 2 {
            return Err(PipelineError::too_few_rows(2, n_samples));
        }
        if n_features < self.n_components {
            return Err(PipelineError::TooFewFeatures {
                required: self.n_components,
                actual: n_features,
            });
        }
        if n_samples < self.n_components {
            return Err(PipelineError::too_few_rows(self.n_components, n_samples));
        }

        let mean = X.mean_axis(Axis(0)).ok_or(PipelineError::EmptyDataset)?;
        let centered = X - &mean;
        let covariance = centered.t().dot(&centered) / (n_samples as f64 - 1.0);

        let (eigenvalues, eigenvectors) = symmetric_eigen(&covariance)?;

        let mut order: Vec<usize> = (0..n_features).collect();
        order.sort_by(|&a, &b| eigenvalues[b].total_cmp(&eigenvalues[a]));

        let mut components = Array2::zeros((n_features, self.n_components));
        let mut explained_variance = Array1::zeros(self.n_components);
        for (j, &idx) in order.iter().take(self.n_components).enumerate() {
            let mut v = eigenvectors.column(idx).to_owned();
            orient(&mut v);
            components.column_mut(j).assign(&v);
            explained_variance[j] = eigenvalues[idx].max(0.0);
        }

        let total_variance: f64 = eigenvalues.iter().map(|v| v.max(0.0)).sum();
        let explained_variance_ratio = if total_variance > 0.0 {
            &explained_variance / total_variance
        } else {
            Array1::zeros(self.n_components)
        };

        let scores = centered.dot(&components);
        let loadings = &components * &explained_variance.mapv(f64::sqrt);

        tracing::info!(
            "PCA: explained variance ratio {:?}",
            explained_variance_ratio.to_vec()
        );

        Ok(Projection {
            scores,
            components,
            loadings,
            explained_variance,
            explained_variance_ratio,
        })
    }
}

impl Default for Projector {
    fn default() -> Self {
        Self::new(2)
    }
}

/// Знак оси: наибольшая по модулю компонента (первая при равенстве) положительна.
fn orient(v: &mut Array1<f64>) {
    let mut pivot = 0;
    for (i, x) in v.iter().enumerate() {
        if x.abs() > v[pivot].abs() {
            pivot = i;
        }
    }
    if v[pivot] < 0.0 {
        v.mapv_inplace(|x| -x);
    }
}

/// Собственные значения и векторы (по столбцам) симметричной матрицы,
/// циклический метод Якоби.
pub fn symmetric_eigen(A: &Array2<f64>) -> Result<(Array1<f64>, Array2<f64>)> {
    let n = A.nrows();
    if n != A.ncols() {
        return Err(PipelineError::Decomposition(format!(
            "matrix is not square: {:?}",
            A.dim()
        )));
    }

    let mut a = A.to_owned();
    let mut v = Array2::<f64>::eye(n);
    let scale = a.iter().map(|x| x * x).sum::<f64>().max(f64::MIN_POSITIVE);

    for _ in 0..MAX_SWEEPS {
        let off: f64 = (0..n)
            .flat_map(|i| (0..n).filter(move |&j| j != i).map(move |j| (i, j)))
            .map(|(i, j)| a[[i, j]] * a[[i, j]])
            .sum();
        if off <= 1e-24 * scale {
            return Ok((a.diag().to_owned(), v));
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[[p, q]];
                if apq == 0.0 {
                    continue;
                }
                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                rotate(&mut a.view_mut(), p, q, c, s, Axis(1));
                rotate(&mut a.view_mut(), p, q, c, s, Axis(0));
                rotate(&mut v.view_mut(), p, q, c, s, Axis(1));
            }
        }
    }

    Err(PipelineError::Decomposition(format!(
        "Jacobi iteration did not converge in {MAX_SWEEPS} sweeps"
    )))
}

/// Вращение пары столбцов (Axis(1)) или строк (Axis(0)) p и q.
fn rotate(m: &mut ndarray::ArrayViewMut2<f64>, p: usize, q: usize, c: f64, s: f64, axis: Axis) {
    let len = m.len_of(if axis == Axis(1) { Axis(0) } else { Axis(1) });
    for k in 0..len {
        let (ip, iq) = if axis == Axis(1) {
            ([k, p], [k, q])
        } else {
            ([p, k], [q, k])
        };
        let xp = m[ip];
        let xq = m[iq];
        m[ip] = c * xp - s * xq;
        m[iq] = s * xp + c * xq;
    }
}

/// Доля дисперсии, объяснённая первыми `n` осями.
pub fn cumulative_ratio(projection: &Projection, n: usize) -> f64 {
    let n = n.min(projection.explained_variance_ratio.len());
    projection.explained_variance_ratio.slice(s![..n]).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample() -> Array2<f64> {
        array![
            [2.5, 2.4, 0.5],
            [0.5, 0.7, 1.9],
            [2.2, 2.9, 0.8],
            [1.9, 2.2, 1.1],
            [3.1, 3.0, 0.2],
            [2.3, 2.7, 1.0],
            [2.0, 1.6, 1.4],
            [1.0, 1.1, 1.7],
            [1.5, 1.6, 1.2],
            [1.1, 0.9, 2.0],
        ]
    }

    #[test]
    fn test_symmetric_eigen_2x2() {
        let A = array![[4.0, 2.0], [2.0, 3.0]];
        let (values, vectors) = symmetric_eigen(&A).unwrap();

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| b.total_cmp(a));
        let expected_hi = (7.0 + 17f64.sqrt()) / 2.0;
        let expected_lo = (7.0 - 17f64.sqrt()) / 2.0;
        assert!((sorted[0] - expected_hi).abs() < 1e-10);
        assert!((sorted[1] - expected_lo).abs() < 1e-10);

        for j in 0..2 {
            let v = vectors.column(j);
            let av = A.dot(&v);
            for i in 0..2 {
                assert!((av[i] - values[j] * v[i]).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn test_eigenvectors_are_orthonormal() {
        let X = sample();
        let cov = X.t().dot(&X);
        let (_, vectors) = symmetric_eigen(&cov).unwrap();
        let gram = vectors.t().dot(&vectors);
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((gram[[i, j]] - expected).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn test_scores_variance_matches_explained_variance() {
        let projection = Projector::default().fit_transform(&sample()).unwrap();
        assert_eq!(projection.scores.dim(), (10, 2));
        assert_eq!(projection.loadings.dim(), (3, 2));

        for j in 0..2 {
            let col = projection.scores.column(j);
            let mean = col.mean().unwrap();
            let var = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / 9.0;
            assert!(mean.abs() < 1e-10);
            assert!((var - projection.explained_variance[j]).abs() < 1e-9);
        }
        assert!(projection.explained_variance[0] >= projection.explained_variance[1]);
        assert!(cumulative_ratio(&projection, 2) <= 1.0 + 1e-12);
    }

    #[test]
    fn test_axis_orientation() {
        let projection = Projector::default().fit_transform(&sample()).unwrap();
        for j in 0..2 {
            let col = projection.components.column(j);
            let pivot = col
                .iter()
                .copied()
                .fold(0.0_f64, |acc, x| if x.abs() > acc.abs() { x } else { acc });
            assert!(pivot > 0.0);
        }
    }

    #[test]
    fn test_loadings_share_orientation_with_scores() {
        // Знак нагрузки совпадает со знаком ковариации признака и оси.
        let X = sample();
        let projection = Projector::default().fit_transform(&X).unwrap();
        let centered = &X - &X.mean_axis(Axis(0)).unwrap();
        for i in 0..3 {
            for j in 0..2 {
                let cov = centered.column(i).dot(&projection.scores.column(j));
                let loading = projection.loadings[[i, j]];
                if loading.abs() > 1e-9 {
                    assert_eq!(cov.signum(), loading.signum());
                }
            }
        }
    }

    #[test]
    fn test_too_few_rows() {
        let X = array![[1.0, 2.0, 3.0]];
        let err = Projector::default().fit_transform(&X).unwrap_err();
        assert!(matches!(err, PipelineError::TooFewRows { .. }));
    }

    #[test]
    fn test_too_few_features() {
        let X = array![[1.0], [2.0], [3.0]];
        let err = Projector::default().fit_transform(&X).unwrap_err();
        assert!(matches!(err, PipelineError::TooFewFeatures { .. }));
    }
}
