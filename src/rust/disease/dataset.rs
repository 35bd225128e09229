use std::collections::HashMap;
use std::io;
use std::path::Path;

use csv::ReaderBuilder;
use log::{info, warn};
use ndarray::{Array2, ArrayView1};

use crate::error::DatasetError;

/// Column holding the disease label in the symptom dataset.
pub const LABEL_COLUMN: &str = "prognosis";

/// A symptom/disease table: one row per case, one binary column per symptom.
///
/// Column order is the order of the CSV header and is the feature ordering
/// every model trained from this table depends on.
#[derive(Debug, Clone)]
pub struct SymptomDataset {
    symptoms: Vec<String>,
    index: HashMap<String, usize>,
    labels: Vec<String>,
    features: Array2<u8>,
}

impl SymptomDataset {
    /// Reads a dataset from a CSV file with a header row and a `prognosis` column.
    ///
    /// # Errors
    /// - `DatasetError::NotFound` if the file does not exist
    /// - `DatasetError::MissingColumn` if there is no `prognosis` column
    /// - `DatasetError::Empty` if the file has no data rows
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DatasetError::NotFound(path.to_path_buf()));
        }
        info!("Loading symptom dataset from {:?}", path);
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Reads a dataset from any CSV source. See [`SymptomDataset::from_path`].
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, DatasetError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = dedup_headers(reader.headers()?.iter());
        let label_col = headers
            .iter()
            .position(|h| h == LABEL_COLUMN)
            .ok_or_else(|| DatasetError::MissingColumn(LABEL_COLUMN.to_string()))?;

        // (csv column, symptom name) for every feature column
        let feature_cols: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(i, h)| *i != label_col && !h.trim().is_empty())
            .map(|(i, h)| (i, h.clone()))
            .collect();

        let mut labels = Vec::new();
        let mut cells: Vec<u8> = Vec::new();
        for record in reader.records() {
            let record = record?;
            let label = record.get(label_col).unwrap_or_default().trim().to_string();
            labels.push(label);
            cells.extend(
                feature_cols
                    .iter()
                    .map(|(col, _)| coerce_indicator(record.get(*col).unwrap_or_default())),
            );
        }

        if labels.is_empty() {
            return Err(DatasetError::Empty("no data rows".to_string()));
        }

        let symptoms: Vec<String> = feature_cols.into_iter().map(|(_, name)| name).collect();
        let features = Array2::from_shape_vec((labels.len(), symptoms.len()), cells)
            .map_err(|e| DatasetError::Empty(format!("inconsistent row width: {}", e)))?;

        info!(
            "Loaded {} rows, {} symptom columns, {} distinct diseases",
            labels.len(),
            symptoms.len(),
            {
                let mut distinct: Vec<&String> = labels.iter().collect();
                distinct.sort();
                distinct.dedup();
                distinct.len()
            }
        );

        Ok(Self::from_parts(symptoms, labels, features))
    }

    /// Builds a dataset from already-binarized parts.
    ///
    /// # Panics
    /// Panics if `features` is not `labels.len()` rows by `symptoms.len()` columns.
    pub fn from_parts(symptoms: Vec<String>, labels: Vec<String>, features: Array2<u8>) -> Self {
        assert_eq!(features.dim(), (labels.len(), symptoms.len()), "feature matrix shape");
        let index = symptoms
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i))
            .collect();
        Self {
            symptoms,
            index,
            labels,
            features,
        }
    }

    /// Symptom names in column order.
    pub fn symptoms(&self) -> &[String] {
        &self.symptoms
    }

    /// Disease label of every row.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Row-major 0/1 indicator matrix.
    pub fn features(&self) -> &Array2<u8> {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Column index of a symptom, if the dataset has it.
    pub fn column(&self, symptom: &str) -> Option<usize> {
        self.index.get(symptom).copied()
    }

    pub(crate) fn row(&self, row: usize) -> ArrayView1<'_, u8> {
        self.features.row(row)
    }
}

/// Numeric coercion of one CSV cell: unparseable becomes 0, the value is
/// clamped to [0, 1] and truncated, so only values of at least 1 count as present.
fn coerce_indicator(cell: &str) -> u8 {
    match cell.trim().parse::<f64>() {
        Ok(v) if v >= 1.0 => 1,
        _ => 0,
    }
}

/// Repeated header names get a `.N` suffix so every column has a unique name.
fn dedup_headers<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    headers
        .map(|h| {
            let count = seen.entry(h.to_string()).or_insert(0);
            let name = if *count == 0 {
                h.to_string()
            } else {
                warn!("Duplicate column '{}' renamed to '{}.{}'", h, h, count);
                format!("{}.{}", h, count)
            };
            *count += 1;
            name
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
itching,skin_rash,fever,prognosis,
1,1,0,Fungal infection ,
0,0,1, Malaria,
1,x,2.5,Allergy,
";

    #[test]
    fn test_parse_and_coerce() {
        let ds = SymptomDataset::from_reader(CSV.as_bytes()).unwrap();
        assert_eq!(ds.symptoms(), &["itching", "skin_rash", "fever"]);
        assert_eq!(ds.labels(), &["Fungal infection", "Malaria", "Allergy"]);
        assert_eq!(ds.features().row(2).to_vec(), vec![1, 0, 1]);
        assert_eq!(ds.column("fever"), Some(2));
        assert_eq!(ds.column("cough"), None);
    }

    #[test]
    fn test_missing_label_column() {
        let err = SymptomDataset::from_reader("a,b\n1,0\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn(ref c) if c == "prognosis"));
    }

    #[test]
    fn test_missing_file() {
        let err = SymptomDataset::from_path("/nonexistent/dataset.csv").unwrap_err();
        assert!(matches!(err, DatasetError::NotFound(_)));
    }

    #[test]
    fn test_duplicate_headers() {
        let ds = SymptomDataset::from_reader("a,a,prognosis\n1,0,x\n".as_bytes()).unwrap();
        assert_eq!(ds.symptoms(), &["a", "a.1"]);
    }

    #[test]
    fn test_fractional_values_truncate() {
        assert_eq!(coerce_indicator("0.9"), 0);
        assert_eq!(coerce_indicator("1"), 1);
        assert_eq!(coerce_indicator(" 1.0 "), 1);
        assert_eq!(coerce_indicator("-3"), 0);
        assert_eq!(coerce_indicator(""), 0);
    }
}
