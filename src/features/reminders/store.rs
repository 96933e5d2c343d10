//! Reminder persistence
//!
//! `ReminderStore` is the seam between the lifecycle engine and its backing
//! storage: the bot runs on a JSON file, tests run on an in-memory map.
//!
//! A missing file is first-run state and loads as an empty map. A file that
//! is present but unreadable is an error; callers decide whether to degrade
//! (see `ReminderService`). Saves are staged to a temp file and committed
//! with a single atomic rename so a crash never leaves a half-written file.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::model::Reminder;

/// Canonical persisted shape: user ID → record.
pub type ReminderMap = BTreeMap<String, Reminder>;

/// Storage seam for reminder records.
#[async_trait]
pub trait ReminderStore: Send + Sync {
    /// Load all records. A missing backing resource is not an error and
    /// yields an empty map; a corrupt one is an `Err`.
    async fn load(&self) -> Result<ReminderMap>;

    /// Replace all records. Must be atomic with respect to process crash.
    async fn save(&self, reminders: &ReminderMap) -> Result<()>;
}

/// JSON-file backed store, compatible with the reference `reminders.json`
/// layout.
pub struct JsonReminderStore {
    path: PathBuf,
}

impl JsonReminderStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        JsonReminderStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl ReminderStore for JsonReminderStore {
    async fn load(&self) -> Result<ReminderMap> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ReminderMap::new());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read {}", self.path.display()));
            }
        };

        serde_json::from_str(&raw)
            .with_context(|| format!("corrupt reminder data in {}", self.path.display()))
    }

    async fn save(&self, reminders: &ReminderMap) -> Result<()> {
        let json = serde_json::to_string(reminders).context("failed to serialize reminders")?;

        let staging = self.staging_path();
        tokio::fs::write(&staging, &json)
            .await
            .with_context(|| format!("failed to write {}", staging.display()))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .with_context(|| format!("failed to commit {}", self.path.display()))?;

        Ok(())
    }
}

/// In-memory store for tests and dry runs.
#[derive(Default)]
pub struct InMemoryReminderStore {
    records: std::sync::Mutex<ReminderMap>,
}

impl InMemoryReminderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReminderStore for InMemoryReminderStore {
    async fn load(&self) -> Result<ReminderMap> {
        Ok(self.records.lock().expect("store lock poisoned").clone())
    }

    async fn save(&self, reminders: &ReminderMap) -> Result<()> {
        *self.records.lock().expect("store lock poisoned") = reminders.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_map() -> ReminderMap {
        let mut map = ReminderMap::new();
        map.insert(
            "100".to_string(),
            Reminder::new(
                Some("200".to_string()),
                30,
                NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            ),
        );
        map
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonReminderStore::new(dir.path().join("reminders.json"));

        let map = store.load().await.unwrap();
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonReminderStore::new(dir.path().join("reminders.json"));

        let map = sample_map();
        store.save(&map).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, map);
    }

    #[tokio::test]
    async fn test_save_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reminders.json");
        let store = JsonReminderStore::new(&path);

        store.save(&sample_map()).await.unwrap();

        assert!(path.exists());
        assert!(!store.staging_path().exists());
    }

    #[tokio::test]
    async fn test_load_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reminders.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let store = JsonReminderStore::new(&path);
        let err = store.load().await.unwrap_err();
        assert!(err.to_string().contains("corrupt"));
    }

    #[tokio::test]
    async fn test_load_reference_file_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reminders.json");
        tokio::fs::write(
            &path,
            r#"{"100": {"channel_id": "200", "contract_days": 30,
                "deadline_date": "2024-01-31", "last_reminded": "1970-01-01",
                "reminder_message_id": null}}"#,
        )
        .await
        .unwrap();

        let map = JsonReminderStore::new(&path).load().await.unwrap();
        assert_eq!(map, sample_map());
    }

    #[tokio::test]
    async fn test_in_memory_store_round_trip() {
        let store = InMemoryReminderStore::new();
        assert!(store.load().await.unwrap().is_empty());

        let map = sample_map();
        store.save(&map).await.unwrap();
        assert_eq!(store.load().await.unwrap(), map);
    }
}
