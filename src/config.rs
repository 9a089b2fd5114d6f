//! Конфигурация сервиса и конвейера анализа

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::clustering::{ClusterCountSelector, KMeansClusterer};

const ENV_PREFIX: &str = "WELLBEING_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub data_path: PathBuf,
    /// Каталог со статикой (index.html, script.js); `None` - статика не отдаётся.
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            data_path: PathBuf::from("data.csv"),
            static_dir: Some(PathBuf::from(".")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub max_k: usize,
    pub seed: u64,
    pub n_runs: usize,
    pub max_iterations: u64,
    pub tolerance: f64,
    /// Фиксированное число кластеров; `None` - брать найденное колено.
    pub fixed_k: Option<usize>,
    pub fallback_k: usize,
    pub elbow_sensitivity: f64,
    pub top_n: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_k: 10,
            seed: 0,
            n_runs: 10,
            max_iterations: 300,
            tolerance: 1e-4,
            fixed_k: Some(3),
            fallback_k: 4,
            elbow_sensitivity: 1.0,
            top_n: 5,
        }
    }
}

impl AnalysisConfig {
    pub fn clusterer(&self) -> KMeansClusterer {
        KMeansClusterer {
            seed: self.seed,
            n_runs: self.n_runs,
            max_iterations: self.max_iterations,
            tolerance: self.tolerance,
        }
    }

    pub fn cluster_count_selector(&self) -> ClusterCountSelector {
        ClusterCountSelector {
            clusterer: self.clusterer(),
            max_k: self.max_k,
            sensitivity: self.elbow_sensitivity,
            fallback_k: self.fallback_k,
            fixed_k: self.fixed_k,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub analysis: AnalysisConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Значения берутся из `lookup` (ключи с префиксом `WELLBEING_`);
    /// нераспознанное значение логируется, остаётся значение по умолчанию.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        override_parsed(&mut config.server.bind_addr, "BIND_ADDR", get("BIND_ADDR"));
        if let Some(path) = get("DATA_PATH") {
            config.server.data_path = PathBuf::from(path);
        }
        if let Some(dir) = get("STATIC_DIR") {
            config.server.static_dir = if dir.is_empty() {
                None
            } else {
                Some(PathBuf::from(dir))
            };
        }

        let analysis = &mut config.analysis;
        override_parsed(&mut analysis.max_k, "MAX_K", get("MAX_K"));
        override_parsed(&mut analysis.seed, "SEED", get("SEED"));
        override_parsed(&mut analysis.n_runs, "N_RUNS", get("N_RUNS"));
        override_parsed(&mut analysis.fallback_k, "FALLBACK_K", get("FALLBACK_K"));
        override_parsed(&mut analysis.top_n, "TOP_N", get("TOP_N"));
        override_parsed(
            &mut analysis.elbow_sensitivity,
            "ELBOW_SENSITIVITY",
            get("ELBOW_SENSITIVITY"),
        );

        if let Some(raw) = get("CLUSTER_COUNT") {
            if raw.eq_ignore_ascii_case("auto") {
                analysis.fixed_k = None;
            } else {
                match raw.parse::<usize>() {
                    Ok(k) if k > 0 => analysis.fixed_k = Some(k),
                    _ => tracing::warn!(
                        "Ignoring invalid {ENV_PREFIX}CLUSTER_COUNT={raw:?}, keeping {:?}",
                        analysis.fixed_k
                    ),
                }
            }
        }

        config
    }
}

fn override_parsed<T>(target: &mut T, name: &str, raw: Option<String>)
where
    T: FromStr + std::fmt::Debug,
{
    let Some(raw) = raw else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => *target = value,
        Err(_) => tracing::warn!(
            "Ignoring invalid {ENV_PREFIX}{name}={raw:?}, keeping {target:?}"
        ),
    }
}
