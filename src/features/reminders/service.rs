//! Reminder lifecycle service
//!
//! Every state transition goes through here. A single async mutex is held
//! across each load-modify-save, so a sweep commit can never race a command
//! or an acknowledgment into a lost update on the same record; the sweep
//! and the reaction handler both rewrite the same file.

use anyhow::{bail, Result};
use chrono::NaiveDate;
use log::warn;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::model::Reminder;
use super::store::{ReminderMap, ReminderStore};

/// Result of a matched acknowledgment: where the notification lives and the
/// deadline it was extended to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledged {
    pub channel_id: Option<String>,
    pub new_deadline: NaiveDate,
}

/// Serialized read-modify-write façade over a [`ReminderStore`].
pub struct ReminderService {
    store: Arc<dyn ReminderStore>,
    lock: Mutex<()>,
}

impl ReminderService {
    pub fn new(store: Arc<dyn ReminderStore>) -> Self {
        ReminderService {
            store,
            lock: Mutex::new(()),
        }
    }

    /// Load the current records, degrading a corrupt backing file to an
    /// empty map. The degrade is loud: data loss is possible and the next
    /// save will overwrite whatever is on disk.
    async fn load_or_empty(&self) -> ReminderMap {
        match self.store.load().await {
            Ok(map) => map,
            Err(e) => {
                warn!("reminder data unreadable, continuing from empty state (possible data loss): {e:#}");
                ReminderMap::new()
            }
        }
    }

    /// Read-only snapshot of all records (used by the sweep).
    pub async fn snapshot(&self) -> ReminderMap {
        let _guard = self.lock.lock().await;
        self.load_or_empty().await
    }

    /// Create or fully overwrite the record for `user_id`. Any previous
    /// state for the user, including an outstanding notification, is
    /// discarded.
    pub async fn create(
        &self,
        user_id: &str,
        channel_id: Option<String>,
        contract_days: i64,
        deadline_date: NaiveDate,
    ) -> Result<Reminder> {
        let reminder = Reminder::new(channel_id, contract_days, deadline_date);

        let _guard = self.lock.lock().await;
        let mut map = self.load_or_empty().await;
        map.insert(user_id.to_string(), reminder.clone());
        self.store.save(&map).await?;

        Ok(reminder)
    }

    /// Look up a single record.
    pub async fn get(&self, user_id: &str) -> Option<Reminder> {
        let _guard = self.lock.lock().await;
        self.load_or_empty().await.get(user_id).cloned()
    }

    /// Delete the record for `user_id`. Returns false if none existed.
    pub async fn delete(&self, user_id: &str) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut map = self.load_or_empty().await;
        if map.remove(user_id).is_none() {
            return Ok(false);
        }
        self.store.save(&map).await?;
        Ok(true)
    }

    /// Manual renewal (`/vps update`): advance the deadline by one contract
    /// period and drop any outstanding notification. Returns the new
    /// deadline, or None if the user has no record.
    pub async fn advance(&self, user_id: &str) -> Result<Option<NaiveDate>> {
        let _guard = self.lock.lock().await;
        let mut map = self.load_or_empty().await;
        let Some(reminder) = map.get_mut(user_id) else {
            return Ok(None);
        };

        let Some(new_deadline) = reminder.advance_deadline() else {
            bail!("cannot advance deadline for user {user_id}: date out of range");
        };
        self.store.save(&map).await?;

        Ok(Some(new_deadline))
    }

    /// Handle an acknowledgment event. Matches only when `message_id` is
    /// the user's own outstanding notification; anything else is a no-op
    /// (unrelated reactions are expected, not errors). Idempotent under
    /// duplicate delivery: the first match clears the message ID, so a
    /// replay no longer matches.
    pub async fn acknowledge(&self, user_id: &str, message_id: &str) -> Result<Option<Acknowledged>> {
        let _guard = self.lock.lock().await;
        let mut map = self.load_or_empty().await;
        let Some(reminder) = map.get_mut(user_id) else {
            return Ok(None);
        };
        if reminder.reminder_message_id.as_deref() != Some(message_id) {
            return Ok(None);
        }

        let Some(new_deadline) = reminder.advance_deadline() else {
            bail!("cannot advance deadline for user {user_id}: date out of range");
        };
        let acknowledged = Acknowledged {
            channel_id: reminder.channel_id.clone(),
            new_deadline,
        };
        self.store.save(&map).await?;

        Ok(Some(acknowledged))
    }

    /// Commit a successful send: stamp `last_reminded` and remember the
    /// outstanding message. Called once per sent reminder, not batched,
    /// so a crash mid-sweep never loses already-sent state.
    pub async fn mark_reminded(
        &self,
        user_id: &str,
        today: NaiveDate,
        message_id: String,
    ) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut map = self.load_or_empty().await;
        let Some(reminder) = map.get_mut(user_id) else {
            // Deleted between snapshot and send; nothing to stamp.
            return Ok(());
        };

        reminder.mark_reminded(today, message_id);
        self.store.save(&map).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reminders::model::epoch_sentinel;
    use crate::features::reminders::store::InMemoryReminderStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn service() -> ReminderService {
        ReminderService::new(Arc::new(InMemoryReminderStore::new()))
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let service = service();
        // Scenario A: 30-day contract set on 2024-01-01
        let created = service
            .create("100", Some("200".to_string()), 30, date(2024, 1, 31))
            .await
            .unwrap();
        assert_eq!(created.last_reminded, epoch_sentinel());

        let fetched = service.get("100").await.unwrap();
        assert_eq!(fetched, created);
        assert!(service.get("999").await.is_none());
    }

    #[tokio::test]
    async fn test_create_overwrites_prior_state() {
        let service = service();
        service
            .create("100", Some("200".to_string()), 30, date(2024, 1, 31))
            .await
            .unwrap();
        service
            .mark_reminded("100", date(2024, 1, 30), "555".to_string())
            .await
            .unwrap();

        // Re-running set must reset the reminder bookkeeping entirely
        let recreated = service
            .create("100", Some("201".to_string()), 60, date(2024, 6, 1))
            .await
            .unwrap();
        assert_eq!(recreated.last_reminded, epoch_sentinel());
        assert_eq!(recreated.reminder_message_id, None);
        assert_eq!(service.get("100").await.unwrap().contract_days, 60);
    }

    #[tokio::test]
    async fn test_delete() {
        let service = service();
        service
            .create("100", None, 30, date(2024, 1, 31))
            .await
            .unwrap();

        assert!(service.delete("100").await.unwrap());
        assert!(!service.delete("100").await.unwrap());
        assert!(service.get("100").await.is_none());
    }

    #[tokio::test]
    async fn test_manual_advance() {
        let service = service();
        // Scenario E: weekly contract due 2024-03-01
        service
            .create("100", Some("200".to_string()), 7, date(2024, 3, 1))
            .await
            .unwrap();
        service
            .mark_reminded("100", date(2024, 2, 29), "555".to_string())
            .await
            .unwrap();

        let new_deadline = service.advance("100").await.unwrap();
        assert_eq!(new_deadline, Some(date(2024, 3, 8)));

        let reminder = service.get("100").await.unwrap();
        assert_eq!(reminder.reminder_message_id, None);

        assert_eq!(service.advance("999").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_acknowledge_matches_user_and_message() {
        let service = service();
        // Scenario D: outstanding reminder sent 2024-01-30 for deadline 2024-01-31
        service
            .create("100", Some("200".to_string()), 30, date(2024, 1, 31))
            .await
            .unwrap();
        service
            .mark_reminded("100", date(2024, 1, 30), "555".to_string())
            .await
            .unwrap();

        // Someone else reacting to the same message does nothing
        assert_eq!(service.acknowledge("999", "555").await.unwrap(), None);
        // The right user on an unrelated message does nothing
        assert_eq!(service.acknowledge("100", "556").await.unwrap(), None);

        let ack = service.acknowledge("100", "555").await.unwrap().unwrap();
        assert_eq!(ack.new_deadline, date(2024, 3, 1));
        assert_eq!(ack.channel_id, Some("200".to_string()));

        let reminder = service.get("100").await.unwrap();
        assert_eq!(reminder.reminder_message_id, None);
        assert_eq!(reminder.deadline_date, date(2024, 3, 1));
    }

    #[tokio::test]
    async fn test_acknowledge_is_idempotent() {
        let service = service();
        service
            .create("100", Some("200".to_string()), 30, date(2024, 1, 31))
            .await
            .unwrap();
        service
            .mark_reminded("100", date(2024, 1, 30), "555".to_string())
            .await
            .unwrap();

        assert!(service.acknowledge("100", "555").await.unwrap().is_some());
        // Duplicate delivery of the same event: no second extension
        assert!(service.acknowledge("100", "555").await.unwrap().is_none());
        assert_eq!(
            service.get("100").await.unwrap().deadline_date,
            date(2024, 3, 1)
        );
    }

    #[tokio::test]
    async fn test_advance_rejects_out_of_range_deadline() {
        let service = service();
        service
            .create("100", Some("200".to_string()), i64::MAX, date(2024, 1, 31))
            .await
            .unwrap();

        assert!(service.advance("100").await.is_err());
        // Nothing was committed
        assert_eq!(
            service.get("100").await.unwrap().deadline_date,
            date(2024, 1, 31)
        );
    }

    /// Store whose backing data is present but unreadable.
    struct UnreadableStore;

    #[async_trait::async_trait]
    impl ReminderStore for UnreadableStore {
        async fn load(&self) -> Result<ReminderMap> {
            bail!("stored reminder data is not valid JSON")
        }

        async fn save(&self, _reminders: &ReminderMap) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_unreadable_store_degrades_to_empty_state() {
        let service = ReminderService::new(Arc::new(UnreadableStore));

        assert!(service.snapshot().await.is_empty());
        assert!(service.get("100").await.is_none());
        assert!(!service.delete("100").await.unwrap());
        assert_eq!(service.advance("100").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_proceeds_when_store_is_unreadable() {
        let service = ReminderService::new(Arc::new(UnreadableStore));

        let created = service
            .create("100", Some("200".to_string()), 30, date(2024, 1, 31))
            .await
            .unwrap();
        assert_eq!(created.deadline_date, date(2024, 1, 31));
    }

    #[tokio::test]
    async fn test_mark_reminded_on_deleted_record_is_a_no_op() {
        let service = service();
        service
            .mark_reminded("100", date(2024, 1, 30), "555".to_string())
            .await
            .unwrap();
        assert!(service.get("100").await.is_none());
    }
}
