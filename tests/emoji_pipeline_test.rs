mod common;

use amygdala::emoji::{catalog, EmojiSuggester, UNKNOWN_EMOJI};
use amygdala::{ModelError, ModelKind, ModelManager};
use tempfile::TempDir;

#[tokio::test]
async fn test_train_and_suggest() -> Result<(), Box<dyn std::error::Error>> {
    common::init();
    let data = TempDir::new()?;
    let models = TempDir::new()?;
    let sources = common::write_fixtures(data.path());
    let manager = ModelManager::new(models.path())?;

    let report = manager.train(ModelKind::Emoji, &sources).await?;
    assert_eq!(report.kind, ModelKind::Emoji);
    assert_eq!(report.num_classes, 3);
    // the "@user #" row is dropped before splitting
    assert_eq!(report.train_rows + report.test_rows, 15);
    assert!(manager.verify(ModelKind::Emoji)?);

    let suggester = EmojiSuggester::load(&manager)?;
    assert_eq!(suggester.num_emojis(), 3);

    let suggestion = suggester.suggest("I am so sad and crying", 5).ok_or("no suggestion")?;
    assert_eq!(suggestion.raw_predictions[0].emoji, "😢");
    assert_eq!(suggestion.emotion, "sadness");
    assert!(suggestion.suggestions.len() <= catalog::MAX_SUGGESTIONS);
    assert!(suggestion.suggestions.iter().all(|s| s.emotion == "sadness"));

    let angry = suggester.predict("stuck in traffic, so angry", 3);
    assert_eq!(angry.len(), 3);
    assert_eq!(angry[0].emoji, "😡");
    assert!(angry.iter().all(|p| p.emoji != UNKNOWN_EMOJI));
    let total: f64 = angry.iter().map(|p| p.probability).sum();
    assert!((total - 1.0).abs() < 1e-9);
    Ok(())
}

#[tokio::test]
async fn test_empty_text_yields_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let data = TempDir::new()?;
    let models = TempDir::new()?;
    let sources = common::write_fixtures(data.path());
    let manager = ModelManager::new(models.path())?;
    manager.train(ModelKind::Emoji, &sources).await?;

    let suggester = EmojiSuggester::load(&manager)?;
    assert!(suggester.predict("@user #", 5).is_empty());
    assert!(suggester.suggest("   ", 5).is_none());
    Ok(())
}

#[test]
fn test_load_before_training() {
    let models = TempDir::new().unwrap();
    let manager = ModelManager::new(models.path()).unwrap();
    let err = EmojiSuggester::load(&manager).unwrap_err();
    assert!(matches!(err, ModelError::NotTrained { kind: ModelKind::Emoji, .. }));
}

#[tokio::test]
async fn test_missing_mapping_fails_training() -> Result<(), Box<dyn std::error::Error>> {
    let data = TempDir::new()?;
    let models = TempDir::new()?;
    let sources = common::write_fixtures(data.path());
    std::fs::remove_file(&sources.emoji_mapping)?;
    let manager = ModelManager::new(models.path())?;

    assert!(manager.train(ModelKind::Emoji, &sources).await.is_err());
    assert!(!manager.is_trained(ModelKind::Emoji));
    Ok(())
}

#[tokio::test]
async fn test_concurrent_train_and_load() -> Result<(), Box<dyn std::error::Error>> {
    let data = TempDir::new()?;
    let models = TempDir::new()?;
    let sources = common::write_fixtures(data.path());
    let manager = ModelManager::new(models.path())?;

    let (first, second) = tokio::join!(
        manager.train_and_load(ModelKind::Emoji, &sources, EmojiSuggester::load),
        manager.train_and_load(ModelKind::Emoji, &sources, EmojiSuggester::load)
    );
    let (first_report, first) = first?;
    let (second_report, second) = second?;
    assert_eq!(first_report, second_report);
    assert_eq!(first.predict("so sad", 3), second.predict("so sad", 3));
    assert!(manager.verify(ModelKind::Emoji)?);
    Ok(())
}
