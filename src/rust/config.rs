use std::env;
use std::path::{Path, PathBuf};

use crate::model_manager::ModelManager;

pub const DATA_DIR_ENV: &str = "AMYGDALA_DATA";
pub const PORT_ENV: &str = "PORT";

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

pub const DISEASE_DATASET_FILE: &str = "disease-prediction-dataset.csv";
pub const EMOJI_TRAIN_FILE: &str = "emoji/Train.csv";
pub const EMOJI_MAPPING_FILE: &str = "emoji/Mapping.csv";

/// Where each training input lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSources {
    pub disease_dataset: PathBuf,
    pub emoji_train: PathBuf,
    pub emoji_mapping: PathBuf,
}

impl DataSources {
    /// Standard layout under one data directory.
    pub fn from_data_dir(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            disease_dataset: data_dir.join(DISEASE_DATASET_FILE),
            emoji_train: data_dir.join(EMOJI_TRAIN_FILE),
            emoji_mapping: data_dir.join(EMOJI_MAPPING_FILE),
        }
    }
}

/// Settings for the HTTP service and the training commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub data_dir: PathBuf,
    pub model_dir: PathBuf,
    pub host: String,
    pub port: u16,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            model_dir: ModelManager::default_artifact_dir(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServiceConfig {
    /// Defaults overridden by `AMYGDALA_DATA` and `PORT`. An unparsable port
    /// is logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(dir) = env::var(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(port) = env::var(PORT_ENV) {
            match port.parse() {
                Ok(port) => config.port = port,
                Err(_) => log::warn!("Ignoring invalid {}={:?}", PORT_ENV, port),
            }
        }
        config
    }

    pub fn data_sources(&self) -> DataSources {
        DataSources::from_data_dir(&self.data_dir)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_sources_layout() {
        let sources = DataSources::from_data_dir("/srv/data");
        assert_eq!(sources.disease_dataset, PathBuf::from("/srv/data/disease-prediction-dataset.csv"));
        assert_eq!(sources.emoji_train, PathBuf::from("/srv/data/emoji/Train.csv"));
        assert_eq!(sources.emoji_mapping, PathBuf::from("/srv/data/emoji/Mapping.csv"));
    }

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
        assert_eq!(config.data_dir, PathBuf::from("data"));
    }
}
