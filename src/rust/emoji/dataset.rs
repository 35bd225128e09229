use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use log::{info, warn};

use super::text::preprocess_text;
use crate::error::DatasetError;

pub const TEXT_COLUMN: &str = "TEXT";
pub const LABEL_COLUMN: &str = "Label";
pub const MAPPING_LABEL_COLUMN: &str = "number";
pub const MAPPING_EMOJI_COLUMN: &str = "emoticons";

/// Labelled training texts, already normalized.
#[derive(Debug, Clone, Default)]
pub struct EmojiCorpus {
    texts: Vec<String>,
    labels: Vec<u32>,
}

impl EmojiCorpus {
    /// Reads `Train.csv`: a `TEXT` and a `Label` column, any others ignored.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DatasetError::NotFound(path.to_path_buf()));
        }
        info!("Loading emoji training data from {:?}", path);
        Self::from_reader(std::fs::File::open(path)?)
    }

    /// Texts are normalized on load and rows that end up empty are dropped.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, DatasetError> {
        let mut reader = ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = reader.headers()?.clone();
        let text_col = column(&headers, TEXT_COLUMN)?;
        let label_col = column(&headers, LABEL_COLUMN)?;

        let mut corpus = Self::default();
        let mut dropped = 0;
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let raw_label = record.get(label_col).unwrap_or_default();
            let label = parse_label(raw_label).ok_or_else(|| DatasetError::InvalidLabel {
                row: row + 1,
                value: raw_label.to_string(),
            })?;
            let text = preprocess_text(record.get(text_col).unwrap_or_default());
            if text.is_empty() {
                dropped += 1;
                continue;
            }
            corpus.texts.push(text);
            corpus.labels.push(label);
        }

        if dropped > 0 {
            warn!("Dropped {} rows with no text after preprocessing", dropped);
        }
        if corpus.texts.is_empty() {
            return Err(DatasetError::Empty("no rows with text".to_string()));
        }
        info!("Loaded {} training texts", corpus.texts.len());
        Ok(corpus)
    }

    /// Builds a corpus from raw texts, normalizing them like [`EmojiCorpus::from_reader`].
    pub fn from_pairs<S: AsRef<str>>(pairs: &[(S, u32)]) -> Self {
        let mut corpus = Self::default();
        for (text, label) in pairs {
            let text = preprocess_text(text.as_ref());
            if !text.is_empty() {
                corpus.texts.push(text);
                corpus.labels.push(*label);
            }
        }
        corpus
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

/// Reads `Mapping.csv` into label → emoji.
pub fn load_emoji_mapping(path: impl AsRef<Path>) -> Result<BTreeMap<u32, String>, DatasetError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(DatasetError::NotFound(path.to_path_buf()));
    }
    info!("Loading emoji mapping from {:?}", path);
    read_emoji_mapping(std::fs::File::open(path)?)
}

pub fn read_emoji_mapping<R: io::Read>(reader: R) -> Result<BTreeMap<u32, String>, DatasetError> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader.headers()?.clone();
    let label_col = column(&headers, MAPPING_LABEL_COLUMN)?;
    let emoji_col = column(&headers, MAPPING_EMOJI_COLUMN)?;

    let mut mapping = BTreeMap::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let raw_label = record.get(label_col).unwrap_or_default();
        let label = parse_label(raw_label).ok_or_else(|| DatasetError::InvalidLabel {
            row: row + 1,
            value: raw_label.to_string(),
        })?;
        let emoji = record.get(emoji_col).unwrap_or_default().trim().to_string();
        mapping.insert(label, emoji);
    }
    if mapping.is_empty() {
        return Err(DatasetError::Empty("emoji mapping has no rows".to_string()));
    }
    Ok(mapping)
}

fn column(headers: &StringRecord, name: &str) -> Result<usize, DatasetError> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
}

/// Accepts `3` as well as `3.0`.
fn parse_label(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if let Ok(label) = raw.parse::<u32>() {
        return Some(label);
    }
    let value = raw.parse::<f64>().ok()?;
    (value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64).then_some(value as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corpus_from_reader() {
        let csv = "\
,TEXT,Label
0,I LOVE this #sunday,1
1,@user,3
2,so tired of waiting,2.0
";
        let corpus = EmojiCorpus::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(corpus.texts(), &["i love this sunday", "so tired of waiting"]);
        assert_eq!(corpus.labels(), &[1, 2]);
    }

    #[test]
    fn test_quoted_text_with_commas() {
        let csv = "TEXT,Label\n\"well, that was fun\",4\n";
        let corpus = EmojiCorpus::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(corpus.texts(), &["well, that was fun"]);
    }

    #[test]
    fn test_invalid_label() {
        let csv = "TEXT,Label\nhello,happy\n";
        let err = EmojiCorpus::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidLabel { row: 1, .. }));
    }

    #[test]
    fn test_missing_columns() {
        let err = EmojiCorpus::from_reader("text,label\nhi,1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn(ref c) if c == "TEXT"));
    }

    #[test]
    fn test_mapping() {
        let csv = ",emoticons,number,sentiment\n0,😜,0,\n1,📸,1,\n2,😍,2,love\n";
        let mapping = read_emoji_mapping(csv.as_bytes()).unwrap();
        assert_eq!(mapping.len(), 3);
        assert_eq!(mapping[&2], "😍");
    }

    #[test]
    fn test_parse_label() {
        assert_eq!(parse_label(" 7 "), Some(7));
        assert_eq!(parse_label("7.0"), Some(7));
        assert_eq!(parse_label("7.5"), None);
        assert_eq!(parse_label("-1"), None);
    }
}
