//! The daily reminder.
//!
//! One repeating local notification at a fixed wall-clock time. Rescheduling
//! is cancel-then-schedule: if scheduling fails after the cancel, nothing is
//! scheduled, never two. Permission problems and scheduler failures are
//! reported as a skipped outcome rather than an error.

use std::sync::Arc;

use chrono::{Days, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::config::ReminderConfig;
use crate::error::ErrorCode;
use crate::quote::QuoteWithId;
use crate::store::{KeyValueStore, REMINDER_KEY, StorageError, load_record};

/// Config body value that means "use the day's quote".
pub const QUOTE_BODY: &str = "quote";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    Undetermined,
    Granted,
    Denied,
    Unsupported,
}

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("{}: notification permission denied", ErrorCode::PermissionDenied.code())]
    PermissionDenied,
    #[error("{}: invalid reminder time {hour:02}:{minute:02}", ErrorCode::ConfigParseError.code())]
    InvalidTime { hour: u8, minute: u8 },
    #[error("{}: scheduler failed: {}", ErrorCode::SchedulerFailed.code(), .0)]
    Scheduler(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ScheduleError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::PermissionDenied => ErrorCode::PermissionDenied,
            Self::InvalidTime { .. } => ErrorCode::ConfigParseError,
            Self::Scheduler(_) => ErrorCode::SchedulerFailed,
            Self::Storage(err) => err.code(),
        }
    }
}

/// Fires every day at `hour:minute` local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyTrigger {
    time: NaiveTime,
}

impl DailyTrigger {
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidTime`] unless `hour < 24` and
    /// `minute < 60`.
    pub fn new(hour: u8, minute: u8) -> Result<Self, ScheduleError> {
        NaiveTime::from_hms_opt(u32::from(hour), u32::from(minute), 0)
            .map(|time| Self { time })
            .ok_or(ScheduleError::InvalidTime { hour, minute })
    }

    #[must_use]
    pub fn hour(self) -> u8 {
        u8::try_from(chrono::Timelike::hour(&self.time)).unwrap_or_default()
    }

    #[must_use]
    pub fn minute(self) -> u8 {
        u8::try_from(chrono::Timelike::minute(&self.time)).unwrap_or_default()
    }

    /// Next delivery strictly after `now`.
    #[must_use]
    pub fn next_fire_after(self, now: NaiveDateTime) -> NaiveDateTime {
        let today = now.date().and_time(self.time);
        if today > now {
            return today;
        }
        now.date()
            .checked_add_days(Days::new(1))
            .map_or(today, |tomorrow| tomorrow.and_time(self.time))
    }
}

/// Today at `hour:minute` if that is later than `now`, else tomorrow.
/// `None` for an invalid time.
#[must_use]
pub fn next_fire_after(now: NaiveDateTime, hour: u8, minute: u8) -> Option<NaiveDateTime> {
    DailyTrigger::new(hour, minute)
        .ok()
        .map(|trigger| trigger.next_fire_after(now))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderContent {
    pub title: String,
    pub body: String,
}

/// Notification body for a quote: `“text” – author`.
#[must_use]
pub fn reminder_body(quote: &QuoteWithId) -> String {
    format!("\u{201c}{}\u{201d} \u{2013} {}", quote.text, quote.author)
}

/// Platform notification service.
pub trait NotificationScheduler {
    fn permission_status(&self) -> PermissionStatus;

    /// Prompt for permission and return the resulting status.
    fn request_permission(&mut self) -> PermissionStatus;

    /// # Errors
    ///
    /// Returns an error when pending notifications could not be cancelled.
    fn cancel_all(&mut self) -> Result<(), ScheduleError>;

    /// # Errors
    ///
    /// Returns an error when the notification could not be scheduled.
    fn schedule_daily(
        &mut self,
        trigger: DailyTrigger,
        content: &ReminderContent,
    ) -> Result<(), ScheduleError>;

    fn scheduled_count(&self) -> usize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    PermissionDenied,
    Unsupported,
    SchedulerFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum ReminderOutcome {
    Scheduled { next_fire: NaiveDateTime },
    Skipped { reason: SkipReason },
}

/// Reminder settings bound to a scheduler.
#[derive(Debug)]
pub struct Reminders<S> {
    scheduler: S,
    trigger: DailyTrigger,
    title: String,
    body: String,
}

impl<S: NotificationScheduler> Reminders<S> {
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidTime`] for an out-of-range time.
    pub fn from_config(config: &ReminderConfig, scheduler: S) -> Result<Self, ScheduleError> {
        Ok(Self {
            scheduler,
            trigger: DailyTrigger::new(config.hour, config.minute)?,
            title: config.title.clone(),
            body: config.body.clone(),
        })
    }

    #[must_use]
    pub const fn trigger(&self) -> DailyTrigger {
        self.trigger
    }

    #[must_use]
    pub const fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Content for `quote` under the configured title and body.
    #[must_use]
    pub fn content_for(&self, quote: &QuoteWithId) -> ReminderContent {
        let body = if self.body == QUOTE_BODY {
            reminder_body(quote)
        } else {
            self.body.clone()
        };
        ReminderContent {
            title: self.title.clone(),
            body,
        }
    }

    /// Replace any scheduled reminder with one carrying `quote`.
    pub fn reschedule(&mut self, now: NaiveDateTime, quote: &QuoteWithId) -> ReminderOutcome {
        let mut status = self.scheduler.permission_status();
        if status == PermissionStatus::Undetermined {
            status = self.scheduler.request_permission();
        }
        match status {
            PermissionStatus::Granted => {}
            PermissionStatus::Unsupported => {
                tracing::info!("notifications unsupported; reminder skipped");
                return ReminderOutcome::Skipped {
                    reason: SkipReason::Unsupported,
                };
            }
            PermissionStatus::Denied | PermissionStatus::Undetermined => {
                tracing::info!(code = %ErrorCode::PermissionDenied, "notification permission not granted; reminder skipped");
                return ReminderOutcome::Skipped {
                    reason: SkipReason::PermissionDenied,
                };
            }
        }

        let content = self.content_for(quote);
        let scheduled = self
            .scheduler
            .cancel_all()
            .and_then(|()| self.scheduler.schedule_daily(self.trigger, &content));
        match scheduled {
            Ok(()) => {
                let next_fire = self.trigger.next_fire_after(now);
                tracing::info!(%next_fire, quote = %quote.id, "daily reminder scheduled");
                ReminderOutcome::Scheduled { next_fire }
            }
            Err(err) => {
                tracing::warn!(code = %err.code(), error = %err, "reminder not scheduled");
                ReminderOutcome::Skipped {
                    reason: SkipReason::SchedulerFailed,
                }
            }
        }
    }

    /// Cancel the reminder.
    ///
    /// # Errors
    ///
    /// Returns the scheduler's error when cancellation fails.
    pub fn cancel(&mut self) -> Result<(), ScheduleError> {
        self.scheduler.cancel_all()?;
        tracing::info!("daily reminder cancelled");
        Ok(())
    }

    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.scheduler.scheduled_count() > 0
    }
}

/// Persisted form of the scheduled reminder (`reminder-store`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledReminder {
    pub hour: u8,
    pub minute: u8,
    pub title: String,
    pub body: String,
    pub repeats: Repeats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Repeats {
    Daily,
}

/// Scheduler that records the reminder in a [`KeyValueStore`].
///
/// Used where there is no OS notification service. Permission starts
/// undetermined and is granted on request unless configured otherwise.
pub struct StoredScheduler {
    store: Arc<dyn KeyValueStore>,
    permission: PermissionStatus,
    on_request: PermissionStatus,
}

impl StoredScheduler {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            permission: PermissionStatus::Undetermined,
            on_request: PermissionStatus::Granted,
        }
    }

    /// Fix the permission the user answers with when prompted.
    #[must_use]
    pub const fn answering(mut self, status: PermissionStatus) -> Self {
        self.on_request = status;
        self
    }

    /// The stored reminder, if any. Unreadable records count as none.
    #[must_use]
    pub fn scheduled(&self) -> Option<ScheduledReminder> {
        load_record(self.store.as_ref(), REMINDER_KEY).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "reminder record unreadable");
            None
        })
    }
}

impl NotificationScheduler for StoredScheduler {
    fn permission_status(&self) -> PermissionStatus {
        self.permission
    }

    fn request_permission(&mut self) -> PermissionStatus {
        self.permission = self.on_request;
        self.permission
    }

    fn cancel_all(&mut self) -> Result<(), ScheduleError> {
        Ok(self.store.remove(REMINDER_KEY)?)
    }

    fn schedule_daily(
        &mut self,
        trigger: DailyTrigger,
        content: &ReminderContent,
    ) -> Result<(), ScheduleError> {
        let record = ScheduledReminder {
            hour: trigger.hour(),
            minute: trigger.minute(),
            title: content.title.clone(),
            body: content.body.clone(),
            repeats: Repeats::Daily,
        };
        let raw = serde_json::to_string_pretty(&record).map_err(|source| StorageError::Encode {
            key: REMINDER_KEY.to_string(),
            source,
        })?;
        Ok(self.store.write(REMINDER_KEY, &raw)?)
    }

    fn scheduled_count(&self) -> usize {
        usize::from(self.scheduled().is_some())
    }
}

impl std::fmt::Debug for StoredScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredScheduler")
            .field("permission", &self.permission)
            .finish_non_exhaustive()
    }
}
