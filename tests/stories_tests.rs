// Tests for the file-backed story store.

use anyhow::Result;
use serde_json::json;
use tempfile::TempDir;
use velmo_live::{FileStoryStore, LocalBlobStore, StoryStore};

fn write_story(dir: &std::path::Path, id: &str, title: &str, created_at: &str) {
    let doc = json!({
        "id": id,
        "title": title,
        "body": "Once upon a time.",
        "created_at": created_at,
    });
    std::fs::write(dir.join(format!("{}.json", id)), doc.to_string()).unwrap();
}

#[tokio::test]
async fn test_list_returns_newest_first() -> Result<()> {
    let dir = TempDir::new()?;
    write_story(dir.path(), "older", "The Quiet Pond", "2026-01-01T10:00:00Z");
    write_story(dir.path(), "newer", "The Brave Kite", "2026-03-01T10:00:00Z");

    let store = FileStoryStore::new(dir.path());
    let stories = store.list().await?;

    assert_eq!(stories.len(), 2);
    assert_eq!(stories[0].id, "newer");
    assert_eq!(stories[1].id, "older");

    Ok(())
}

#[tokio::test]
async fn test_list_skips_unreadable_documents() -> Result<()> {
    let dir = TempDir::new()?;
    write_story(dir.path(), "good", "The Good One", "2026-01-01T10:00:00Z");
    std::fs::write(dir.path().join("broken.json"), "{ not json")?;
    std::fs::write(dir.path().join("ignored.txt"), "not a story")?;

    let store = FileStoryStore::new(dir.path());
    let stories = store.list().await?;

    assert_eq!(stories.len(), 1);
    assert_eq!(stories[0].id, "good");

    Ok(())
}

#[tokio::test]
async fn test_missing_directory_lists_empty() -> Result<()> {
    let dir = TempDir::new()?;
    let store = FileStoryStore::new(dir.path().join("does-not-exist"));
    assert!(store.list().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_get_by_id() -> Result<()> {
    let dir = TempDir::new()?;
    write_story(dir.path(), "velmo-1", "The First Story", "2026-01-01T10:00:00Z");

    let store = FileStoryStore::new(dir.path());
    let story = store.get("velmo-1").await?.expect("Story exists");
    assert_eq!(story.title, "The First Story");
    assert!(story.audio_url.is_none());

    assert!(store.get("velmo-2").await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_local_blob_store_copies_into_archive() -> Result<()> {
    use velmo_live::BlobStore;

    let dir = TempDir::new()?;
    let source = dir.path().join("recording_1.wav");
    std::fs::write(&source, b"payload")?;

    let store = LocalBlobStore::new(dir.path().join("archive"));
    let url = store.upload(&source, "recording_1.wav").await?;

    let archived = dir.path().join("archive").join("recording_1.wav");
    assert_eq!(url, archived.to_string_lossy());
    assert_eq!(std::fs::read(&archived)?, b"payload");

    Ok(())
}
