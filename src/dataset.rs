//! Загрузка исходной таблицы из CSV

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{PipelineError, Result};

/// Маркеры пропущенного значения (помимо пустой ячейки).
const MISSING_MARKERS: [&str; 9] = [
    "NA", "N/A", "NaN", "nan", "null", "NULL", "None", "#N/A", "-nan",
];

pub fn is_missing(cell: &str) -> bool {
    let cell = cell.trim();
    cell.is_empty() || MISSING_MARKERS.contains(&cell)
}

/// Числовое значение ячейки; `None` для пропуска, текста и бесконечностей.
pub fn parse_numeric(cell: &str) -> Option<f64> {
    if is_missing(cell) {
        return None;
    }
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Идентифицирующие поля одной строки.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionIdentity {
    pub id: i64,
    pub region: String,
    pub state: String,
}

/// Таблица в том виде, в котором она прочитана: заголовок и строки-ячейки.
#[derive(Debug, Clone)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<csv::StringRecord>,
}

impl RawTable {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!("Loading table from {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        let rows = reader
            .records()
            .collect::<std::result::Result<Vec<_>, _>>()?;

        tracing::debug!("Read {} rows x {} columns", rows.len(), headers.len());
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| PipelineError::missing_column(name))
    }

    pub fn require_columns(&self, names: &[&str]) -> Result<()> {
        for name in names {
            self.require_column(name)?;
        }
        Ok(())
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or("")
    }

    pub fn numeric(&self, row: usize, col: usize) -> Option<f64> {
        parse_numeric(self.cell(row, col))
    }

    /// Колонка числовая, если каждая непустая ячейка разбирается как число.
    /// Полностью пустая колонка тоже считается числовой. `inf` не делает
    /// колонку текстовой: такая ячейка - пропуск, строка отбрасывается позже.
    pub fn is_numeric_column(&self, col: usize) -> bool {
        (0..self.rows.len()).all(|row| {
            let cell = self.cell(row, col);
            is_missing(cell) || cell.trim().parse::<f64>().is_ok()
        })
    }

    pub fn identity(&self, row: usize) -> Result<RegionIdentity> {
        let id_col = self.require_column(crate::schema::ID_COLUMN)?;
        let region_col = self.require_column(crate::schema::REGION_COLUMN)?;
        let state_col = self.require_column(crate::schema::STATE_COLUMN)?;

        let raw_id = self.cell(row, id_col).trim();
        let id = parse_identifier(raw_id).ok_or_else(|| PipelineError::InvalidIdentifier {
            row,
            value: raw_id.to_string(),
        })?;

        Ok(RegionIdentity {
            id,
            region: self.cell(row, region_col).to_string(),
            state: self.cell(row, state_col).to_string(),
        })
    }
}

/// Идентификатор может прийти как "1001" или "1001.0".
fn parse_identifier(raw: &str) -> Option<i64> {
    if let Ok(id) = raw.parse::<i64>() {
        return Some(id);
    }
    let value = parse_numeric(raw)?;
    (value.fract() == 0.0 && value.abs() < i64::MAX as f64).then(|| value as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
FIPS_Code,Region,State_Name,A,B,Note
1001,South,Alabama,1.5,,x
1003.0,South,Alabama,2,NA,y
1005,South,Alabama,3,7,z
";

    #[test]
    fn test_missing_markers() {
        assert!(is_missing(""));
        assert!(is_missing("  "));
        assert!(is_missing("NA"));
        assert!(is_missing("NaN"));
        assert!(!is_missing("0"));
        assert_eq!(parse_numeric(" 2.5 "), Some(2.5));
        assert_eq!(parse_numeric("inf"), None);
        assert_eq!(parse_numeric("abc"), None);
    }

    #[test]
    fn test_reads_headers_and_rows() {
        let table = RawTable::from_reader(CSV.as_bytes()).unwrap();
        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.column_index("B"), Some(4));
        assert_eq!(table.numeric(0, 3), Some(1.5));
        assert_eq!(table.numeric(0, 4), None);
    }

    #[test]
    fn test_numeric_column_inference() {
        let table = RawTable::from_reader(CSV.as_bytes()).unwrap();
        assert!(table.is_numeric_column(0));
        assert!(table.is_numeric_column(3));
        assert!(table.is_numeric_column(4));
        assert!(!table.is_numeric_column(1));
        assert!(!table.is_numeric_column(5));
    }

    #[test]
    fn test_infinite_cells_keep_column_numeric() {
        let table = RawTable::from_reader("A,B\n1,x\n-inf,2\n".as_bytes()).unwrap();
        assert!(table.is_numeric_column(0));
        assert!(!table.is_numeric_column(1));
        assert_eq!(table.numeric(1, 0), None);
    }

    #[test]
    fn test_identity_accepts_float_formatted_ids() {
        let table = RawTable::from_reader(CSV.as_bytes()).unwrap();
        let identity = table.identity(1).unwrap();
        assert_eq!(identity.id, 1003);
        assert_eq!(identity.region, "South");
        assert_eq!(identity.state, "Alabama");
    }

    #[test]
    fn test_missing_required_column() {
        let table = RawTable::from_reader(CSV.as_bytes()).unwrap();
        let err = table.require_columns(&["A", "Wellbeing"]).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn(ref c) if c == "Wellbeing"));
    }
}
