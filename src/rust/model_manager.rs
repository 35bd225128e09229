use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::config::DataSources;
use crate::disease::{DiseasePredictor, SymptomDataset};
use crate::emoji::{EmojiCorpus, EmojiSuggester};
use crate::error::DatasetError;

/// Version of the on-disk artifact layout. Bumped when a serialized type changes shape.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model not found at {path}. Please train the {kind} model first.")]
    NotTrained { kind: ModelKind, path: PathBuf },
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Encode(#[from] bincode::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Hash mismatch: expected {expected}, got {actual} for {file}")]
    HashMismatch {
        file: String,
        expected: String,
        actual: String,
    },
    #[error("Feature ordering does not match the trained model (expected fingerprint {expected}, got {actual})")]
    FingerprintMismatch { expected: String, actual: String },
    #[error("Unsupported artifact format version {0}")]
    UnsupportedVersion(u32),
    #[error("Training failed: {0}")]
    Training(String),
}

/// The two independently trained pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Disease,
    Emoji,
}

impl ModelKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Disease => "disease",
            Self::Emoji => "emoji",
        }
    }

    /// Files that make up a trained pipeline, manifest excluded.
    pub fn artifact_files(&self) -> &'static [&'static str] {
        match self {
            Self::Disease => &[
                crate::disease::MODEL_FILE,
                crate::disease::ENCODER_FILE,
                crate::disease::SYMPTOMS_FILE,
            ],
            Self::Emoji => &[
                crate::emoji::MODEL_FILE,
                crate::emoji::VECTORIZER_FILE,
                crate::emoji::LABEL_MAPPING_FILE,
            ],
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Written next to the artifacts of a pipeline after training.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub format_version: u32,
    pub kind: ModelKind,
    /// SHA-256 of the feature names in training order
    pub feature_fingerprint: String,
    pub num_features: usize,
    /// SHA-256 of every artifact file, keyed by file name
    pub files: BTreeMap<String, String>,
}

/// Outcome of a training run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    pub kind: ModelKind,
    /// Holdout accuracy on the stratified test split
    pub accuracy: f64,
    pub num_classes: usize,
    pub num_features: usize,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// SHA-256 over the feature names in order, one per line.
pub fn feature_fingerprint<S: AsRef<str>>(features: &[S]) -> String {
    let mut hasher = Sha256::new();
    for name in features {
        hasher.update(name.as_ref().as_bytes());
        hasher.update(b"\n");
    }
    format!("{:x}", hasher.finalize())
}

/// Owns the on-disk artifacts of both pipelines and trains them on demand.
#[derive(Clone, Debug)]
pub struct ModelManager {
    models_dir: PathBuf,
    train_lock: Arc<Mutex<()>>,
}

impl ModelManager {
    /// Creates a new ModelManager with the default models directory
    pub fn new_default() -> io::Result<Self> {
        Self::new(Self::default_artifact_dir())
    }

    /// Returns the default models directory path
    pub fn default_artifact_dir() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var("AMYGDALA_HOME") {
            return PathBuf::from(path).join("models");
        }

        // 2. Use platform-specific cache directory
        if let Some(cache_dir) = dirs::cache_dir() {
            return cache_dir.join("amygdala").join("models");
        }

        // 3. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".cache").join("amygdala").join("models");
        }

        // 4. If all else fails, use system temp directory (platform agnostic)
        env::temp_dir().join("amygdala").join("models")
    }

    pub fn new<P: AsRef<Path>>(models_dir: P) -> io::Result<Self> {
        let models_dir = models_dir.as_ref().to_path_buf();
        fs::create_dir_all(&models_dir)?;
        Ok(Self {
            models_dir,
            train_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    pub fn artifact_dir(&self, kind: ModelKind) -> PathBuf {
        self.models_dir.join(kind.name())
    }

    pub fn artifact_path(&self, kind: ModelKind, file: &str) -> PathBuf {
        self.artifact_dir(kind).join(file)
    }

    pub fn manifest_path(&self, kind: ModelKind) -> PathBuf {
        self.artifact_path(kind, MANIFEST_FILE)
    }

    /// True when every artifact file of the pipeline and its manifest exist.
    pub fn is_trained(&self, kind: ModelKind) -> bool {
        log::debug!("Checking if {} model is trained:", kind);
        kind.artifact_files()
            .iter()
            .map(|file| self.artifact_path(kind, file))
            .chain(std::iter::once(self.manifest_path(kind)))
            .all(|path| {
                let exists = path.exists();
                log::debug!("  {:?} (exists: {})", path, exists);
                exists
            })
    }

    pub fn write_artifact<T: Serialize>(&self, kind: ModelKind, file: &str, value: &T) -> Result<(), ModelError> {
        let path = self.artifact_path(kind, file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = bincode::serialize(value)?;
        log::info!("Writing {} bytes to {:?}", bytes.len(), path);
        fs::write(&path, bytes)?;
        Ok(())
    }

    pub fn read_artifact<T: DeserializeOwned>(&self, kind: ModelKind, file: &str) -> Result<T, ModelError> {
        let bytes = self.read_bytes(kind, file)?;
        Ok(bincode::deserialize(&bytes)?)
    }

    pub fn write_json<T: Serialize>(&self, kind: ModelKind, file: &str, value: &T) -> Result<(), ModelError> {
        let path = self.artifact_path(kind, file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        log::info!("Writing {:?}", path);
        fs::write(&path, serde_json::to_vec_pretty(value)?)?;
        Ok(())
    }

    pub fn read_json<T: DeserializeOwned>(&self, kind: ModelKind, file: &str) -> Result<T, ModelError> {
        let bytes = self.read_bytes(kind, file)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn read_bytes(&self, kind: ModelKind, file: &str) -> Result<Vec<u8>, ModelError> {
        let path = self.artifact_path(kind, file);
        if !path.exists() {
            return Err(ModelError::NotTrained { kind, path });
        }
        Ok(fs::read(&path)?)
    }

    fn hash_file(&self, path: &Path) -> Result<String, ModelError> {
        let bytes = fs::read(path)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Hashes the artifact files already written for `kind` and records them
    /// together with the feature fingerprint.
    pub fn write_manifest<S: AsRef<str>>(&self, kind: ModelKind, features: &[S]) -> Result<ArtifactManifest, ModelError> {
        let mut files = BTreeMap::new();
        for file in kind.artifact_files() {
            let hash = self.hash_file(&self.artifact_path(kind, file))?;
            files.insert(file.to_string(), hash);
        }
        let manifest = ArtifactManifest {
            format_version: ARTIFACT_FORMAT_VERSION,
            kind,
            feature_fingerprint: feature_fingerprint(features),
            num_features: features.len(),
            files,
        };
        self.write_json(kind, MANIFEST_FILE, &manifest)?;
        Ok(manifest)
    }

    pub fn read_manifest(&self, kind: ModelKind) -> Result<ArtifactManifest, ModelError> {
        let manifest: ArtifactManifest = self.read_json(kind, MANIFEST_FILE)?;
        if manifest.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ModelError::UnsupportedVersion(manifest.format_version));
        }
        Ok(manifest)
    }

    /// Fails unless `features` hash to the fingerprint recorded at training time.
    pub fn check_fingerprint<S: AsRef<str>>(&self, kind: ModelKind, features: &[S]) -> Result<(), ModelError> {
        let manifest = self.read_manifest(kind)?;
        let actual = feature_fingerprint(features);
        if actual != manifest.feature_fingerprint {
            return Err(ModelError::FingerprintMismatch {
                expected: manifest.feature_fingerprint,
                actual,
            });
        }
        Ok(())
    }

    /// Recomputes every artifact hash and compares it with the manifest.
    /// Missing files verify as `false`.
    pub fn verify(&self, kind: ModelKind) -> Result<bool, ModelError> {
        if !self.is_trained(kind) {
            log::info!("One or more {} artifacts do not exist", kind);
            return Ok(false);
        }
        let manifest = match self.read_manifest(kind) {
            Ok(m) => m,
            Err(ModelError::Json(e)) => {
                log::warn!("Unreadable {} manifest: {}", kind, e);
                return Ok(false);
            }
            Err(ModelError::UnsupportedVersion(v)) => {
                log::warn!("{} artifacts use format version {}", kind, v);
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        for file in kind.artifact_files() {
            let expected = match manifest.files.get(*file) {
                Some(h) => h,
                None => {
                    log::warn!("Manifest has no hash for {}", file);
                    return Ok(false);
                }
            };
            let actual = self.hash_file(&self.artifact_path(kind, file))?;
            if &actual != expected {
                log::warn!("{} hash mismatch: expected {}, got {}", file, expected, actual);
                return Ok(false);
            }
        }
        log::info!("{} artifacts verified", kind);
        Ok(true)
    }

    pub fn remove_artifacts(&self, kind: ModelKind) -> Result<(), ModelError> {
        for path in kind
            .artifact_files()
            .iter()
            .map(|file| self.artifact_path(kind, file))
            .chain(std::iter::once(self.manifest_path(kind)))
        {
            if path.exists() {
                log::info!("Removing {:?}", path);
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }

    /// Ensures that a pipeline is trained and its artifacts verify.
    /// If the artifacts don't exist, the pipeline is trained.
    /// If verification fails, it is retrained.
    ///
    /// Returns the training report when training ran. Concurrent callers are
    /// serialized, so a cold start trains once.
    pub async fn ensure(&self, kind: ModelKind, sources: &DataSources) -> Result<Option<TrainingReport>, ModelError> {
        let _lock = self.train_lock.lock().await;
        log::info!("Checking if {} model is trained...", kind);
        if self.is_trained(kind) {
            if self.verify(kind)? {
                log::info!("{} model verification successful", kind);
                return Ok(None);
            }
            log::info!("{} model verification failed, retraining...", kind);
            self.remove_artifacts(kind)?;
        } else {
            log::info!("{} model not found, training...", kind);
        }
        self.train_in_background(kind, sources).await.map(Some)
    }

    /// Trains a pipeline unconditionally, replacing any existing artifacts.
    pub async fn train(&self, kind: ModelKind, sources: &DataSources) -> Result<TrainingReport, ModelError> {
        let _lock = self.train_lock.lock().await;
        self.train_in_background(kind, sources).await
    }

    /// Trains a pipeline and runs `load` on the fresh artifacts before another
    /// training run can rewrite them.
    pub async fn train_and_load<T, F>(
        &self,
        kind: ModelKind,
        sources: &DataSources,
        load: F,
    ) -> Result<(TrainingReport, T), ModelError>
    where
        F: FnOnce(&ModelManager) -> Result<T, ModelError>,
    {
        let _lock = self.train_lock.lock().await;
        let report = self.train_in_background(kind, sources).await?;
        let loaded = load(self)?;
        Ok((report, loaded))
    }

    async fn train_in_background(&self, kind: ModelKind, sources: &DataSources) -> Result<TrainingReport, ModelError> {
        let manager = self.clone();
        let sources = sources.clone();
        tokio::task::spawn_blocking(move || manager.train_blocking(kind, &sources))
            .await
            .map_err(|e| ModelError::Training(format!("training task failed: {}", e)))?
    }

    /// Trains and persists a pipeline on the current thread.
    pub fn train_blocking(&self, kind: ModelKind, sources: &DataSources) -> Result<TrainingReport, ModelError> {
        log::info!("=== Training {} model ===", kind);
        let report = match kind {
            ModelKind::Disease => {
                let dataset = SymptomDataset::from_path(&sources.disease_dataset)?;
                let (predictor, report) = DiseasePredictor::builder()
                    .with_dataset(&dataset)
                    .build()?;
                predictor.save(self)?;
                report
            }
            ModelKind::Emoji => {
                let corpus = EmojiCorpus::from_path(&sources.emoji_train)?;
                let mapping = crate::emoji::load_emoji_mapping(&sources.emoji_mapping)?;
                let (suggester, report) = EmojiSuggester::builder()
                    .with_corpus(&corpus)
                    .with_emoji_map(mapping)
                    .build()?;
                suggester.save(self)?;
                report
            }
        };
        log::info!(
            "{} model trained: accuracy {:.4} ({} train rows, {} test rows, {} classes)",
            kind,
            report.accuracy,
            report.train_rows,
            report.test_rows,
            report.num_classes
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_models_dir() {
        // Test with environment variable
        env::set_var("AMYGDALA_HOME", "/tmp/test-amygdala");
        let path = ModelManager::default_artifact_dir();
        assert!(path.to_str().unwrap().contains("/tmp/test-amygdala/models"));
        env::remove_var("AMYGDALA_HOME");

        // Test without environment variable
        let path = ModelManager::default_artifact_dir();
        assert!(path.to_str().unwrap().contains("amygdala"));
    }

    #[test]
    fn test_artifact_paths() {
        let dir = TempDir::new().unwrap();
        let manager = ModelManager::new(dir.path()).unwrap();
        let path = manager.artifact_path(ModelKind::Disease, "symptoms.json");
        assert!(path.ends_with("disease/symptoms.json"));
        assert!(manager.manifest_path(ModelKind::Emoji).ends_with("emoji/manifest.json"));
        assert!(!manager.is_trained(ModelKind::Disease));
    }

    #[test]
    fn test_manifest_detects_tampering() -> Result<(), ModelError> {
        let dir = TempDir::new().unwrap();
        let manager = ModelManager::new(dir.path())?;
        let kind = ModelKind::Emoji;

        assert!(!manager.verify(kind)?);
        for file in kind.artifact_files() {
            manager.write_artifact(kind, file, &vec![1u32, 2, 3])?;
        }
        manager.write_manifest(kind, &["a", "b"])?;
        assert!(manager.is_trained(kind));
        assert!(manager.verify(kind)?);
        manager.check_fingerprint(kind, &["a", "b"])?;
        assert!(matches!(
            manager.check_fingerprint(kind, &["b", "a"]),
            Err(ModelError::FingerprintMismatch { .. })
        ));

        fs::write(manager.artifact_path(kind, kind.artifact_files()[0]), "corrupted data")?;
        assert!(!manager.verify(kind)?);

        manager.remove_artifacts(kind)?;
        assert!(!manager.is_trained(kind));
        Ok(())
    }

    #[test]
    fn test_missing_artifact_is_not_trained_error() {
        let dir = TempDir::new().unwrap();
        let manager = ModelManager::new(dir.path()).unwrap();
        let err = manager
            .read_artifact::<Vec<u32>>(ModelKind::Emoji, "model.bin")
            .unwrap_err();
        assert!(matches!(err, ModelError::NotTrained { kind: ModelKind::Emoji, .. }));
        assert!(err.to_string().contains("Please train the emoji model first"));
    }

    #[test]
    fn test_fingerprint_depends_on_order() {
        assert_ne!(feature_fingerprint(&["a", "b"]), feature_fingerprint(&["b", "a"]));
        assert_eq!(feature_fingerprint(&["a", "b"]), feature_fingerprint(&["a".to_string(), "b".to_string()]));
    }
}
