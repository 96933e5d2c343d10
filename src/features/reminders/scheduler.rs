//! Hourly reminder sweep
//!
//! One sweep snapshots the store, plans the eligible sends with a pure
//! function, then sends and commits record by record. Each successful send
//! is persisted immediately, so a crash mid-sweep loses at most the unsent
//! remainder. A failed send leaves the record untouched and gets retried
//! on the next tick.

use anyhow::{Context as _, Result};
use chrono::{NaiveDate, Utc};
use log::{error, info, warn};
use serenity::http::Http;
use serenity::model::id::ChannelId;
use std::sync::Arc;
use std::time::Duration;

use super::policy::should_send;
use super::service::ReminderService;
use super::store::ReminderMap;

/// Fixed sweep cadence.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Provider login page included in every reminder.
const LOGIN_URL: &str = "https://secure.xserver.ne.jp/xapanel/login/xvps/";

/// A send the sweep decided to attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedSend {
    pub user_id: String,
    pub channel_id: String,
    pub deadline_date: NaiveDate,
}

/// Pick the records that get a reminder today: a channel is configured and
/// the policy says go. Records without a channel are inert.
pub fn plan_sweep(records: &ReminderMap, today: NaiveDate, threshold_days: i64) -> Vec<PlannedSend> {
    records
        .iter()
        .filter_map(|(user_id, reminder)| {
            let channel_id = reminder.channel_id.as_ref()?;
            if !should_send(
                reminder.deadline_date,
                reminder.last_reminded,
                today,
                threshold_days,
            ) {
                return None;
            }
            Some(PlannedSend {
                user_id: user_id.clone(),
                channel_id: channel_id.clone(),
                deadline_date: reminder.deadline_date,
            })
        })
        .collect()
}

/// Reminder notification text: mention, deadline, login link, and the
/// react-to-extend instruction.
pub fn reminder_message(user_id: &str, deadline_date: NaiveDate) -> String {
    format!(
        "<@{user_id}> ⚠️ **Your free VPS contract is due for renewal!** ⚠️\n\
         **Next renewal date** {deadline_date}\n\
         Log in here: [login page]({LOGIN_URL})\n\
         React to this message once you have renewed to extend the reminder."
    )
}

/// Periodic sweep task. Started once from the binary and runs for the life
/// of the process.
pub struct ReminderScheduler {
    service: Arc<ReminderService>,
    threshold_days: i64,
}

impl ReminderScheduler {
    pub fn new(service: Arc<ReminderService>, threshold_days: i64) -> Self {
        ReminderScheduler {
            service,
            threshold_days,
        }
    }

    /// Run the sweep loop forever. Ticks are serialized: the next tick is
    /// not taken until the previous sweep has finished, so sweeps never
    /// overlap.
    pub async fn run(&self, http: Arc<Http>) {
        info!(
            "Reminder sweep loop started (every {}s, threshold {} day(s))",
            SWEEP_INTERVAL.as_secs(),
            self.threshold_days
        );

        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            self.sweep_once(&http).await;
        }
    }

    /// Evaluate every record once. Failures are isolated per record: one
    /// unreachable channel never aborts the rest of the sweep.
    pub async fn sweep_once(&self, http: &Http) {
        let today = Utc::now().date_naive();
        let records = self.service.snapshot().await;
        let planned = plan_sweep(&records, today, self.threshold_days);

        if planned.is_empty() {
            return;
        }
        info!("Sweep: {} reminder(s) due", planned.len());

        for send in planned {
            match send_reminder(http, &send).await {
                Ok(message_id) => {
                    info!(
                        "Sent renewal reminder to user {} in channel {} (message {})",
                        send.user_id, send.channel_id, message_id
                    );
                    if let Err(e) = self
                        .service
                        .mark_reminded(&send.user_id, today, message_id)
                        .await
                    {
                        // The message is out but the stamp did not commit;
                        // the next tick may send a duplicate.
                        error!(
                            "Failed to persist reminder state for user {}: {e:#}",
                            send.user_id
                        );
                    }
                }
                Err(e) => {
                    warn!(
                        "Failed to send reminder to user {} in channel {}: {e:#}",
                        send.user_id, send.channel_id
                    );
                }
            }
        }
    }
}

/// Send one reminder, returning the ID of the message that went out.
async fn send_reminder(http: &Http, send: &PlannedSend) -> Result<String> {
    let channel_id: u64 = send
        .channel_id
        .parse()
        .with_context(|| format!("invalid channel ID '{}'", send.channel_id))?;

    let message = ChannelId(channel_id)
        .send_message(http, |m| {
            m.content(reminder_message(&send.user_id, send.deadline_date))
        })
        .await
        .context("Discord send failed")?;

    Ok(message.id.to_string())
}
