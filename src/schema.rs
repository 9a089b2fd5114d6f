//! Каталог колонок исходной таблицы
//!
//! Все имена колонок задаются здесь явно: исключения, компоненты целевой
//! оценки, короткие подписи и список переменных для гистограмм.

use serde::Serialize;

pub const ID_COLUMN: &str = "FIPS_Code";
pub const REGION_COLUMN: &str = "Region";
pub const STATE_COLUMN: &str = "State_Name";

/// Колонки, которые никогда не попадают в матрицу признаков.
pub const EXCLUDED_COLUMNS: [&str; 4] = [
    "FIPS_Code",
    "avgScore",
    "Wellbeing_Score_Raw",
    "Wellbeing_Score",
];

/// Целевая оценка = среднее этих двух колонок.
pub const TARGET_COMPONENTS: [&str; 2] = ["Anxiety_Score_2020", "Depression_Score_2020"];
pub const TARGET_NAME: &str = "AvgScore";

const SHORT_NAMES: [(&str, &str); 16] = [
    ("Employed_2020", "Employed"),
    ("Median_Household_Income_2020", "Income"),
    ("Unemployment_rate_2020", "Unemp"),
    (
        "Percent of adults completing some college or associate degree, 2019-23",
        "SomeCollege",
    ),
    (
        "Percent of adults who are high school graduates (or equivalent), 2019-23",
        "HSGrad",
    ),
    (
        "Percent of adults who are not high school graduates, 2019-23",
        "NoHSGrad",
    ),
    (
        "Percent of adults with a bachelor's degree or higher, 2019-23",
        "Bachelors+",
    ),
    ("BIRTHS_2020", "Births"),
    ("DEATHS_2020", "Deaths"),
    ("DOMESTIC_MIG_2020", "DomMig"),
    ("GQ_ESTIMATES_BASE_2020", "GrpQtrs"),
    ("INTERNATIONAL_MIG_2020", "IntMig"),
    ("NATURAL_CHG_2020", "NatChg"),
    ("NET_MIG_2020", "NetMig"),
    ("Anxiety_Score_2020", "Anxiety"),
    ("Depression_Score_2020", "Depression"),
];

/// Переменные, доступные в выпадающем списке гистограммы (порядок важен).
pub const HIST_COLUMNS: [&str; 6] = [
    "Employed_2020",
    "Median_Household_Income_2020",
    "Unemployment_rate_2020",
    "NATURAL_CHG_2020",
    "NET_MIG_2020",
    "GQ_ESTIMATES_BASE_2020",
];

/// Короткая подпись колонки; для неизвестных колонок - само имя.
pub fn short_name(column: &str) -> &str {
    SHORT_NAMES
        .iter()
        .find(|(full, _)| *full == column)
        .map(|(_, short)| *short)
        .unwrap_or(column)
}

/// Колонки, без которых конвейер не стартует.
pub fn required_columns() -> Vec<&'static str> {
    let mut columns = vec![ID_COLUMN, REGION_COLUMN, STATE_COLUMN];
    columns.extend(TARGET_COMPONENTS);
    columns.extend(HIST_COLUMNS);
    columns
}

/// Один выбранный признак: полное имя колонки и её позиция в исходной таблице.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feature {
    pub name: String,
    pub source_index: usize,
}

impl Feature {
    pub fn short_name(&self) -> &str {
        short_name(&self.name)
    }
}

/// Упорядоченный список признаков. Индекс `i` в любой производной матрице
/// (исходной, стандартизованной, нагрузках) относится к `features[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FeatureSet {
    features: Vec<Feature>,
}

impl FeatureSet {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Feature> {
        self.features.get(index)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.features.iter().position(|f| f.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|f| f.name.as_str())
    }
}
