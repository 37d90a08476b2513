//! `zen reminder on|off|status`.

use anyhow::Result;
use chrono::NaiveDateTime;
use clap::{Args, Subcommand};
use dailyzen_core::error::ErrorCode;
use dailyzen_core::reminder::{ReminderOutcome, ScheduledReminder, SkipReason};
use serde::Serialize;

use super::{AppContext, fail, today_or_placeholder};
use crate::output::{CliError, pretty_kv, pretty_section, render, render_mode};

#[derive(Args, Debug)]
pub struct ReminderArgs {
    #[command(subcommand)]
    pub command: ReminderCommand,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderCommand {
    /// Schedule the daily reminder with today's quote.
    On,
    /// Cancel the daily reminder.
    Off,
    /// Show what is scheduled.
    Status,
}

#[derive(Debug, Serialize)]
struct StatusView {
    scheduled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reminder: Option<ScheduledReminder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_fire: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize)]
struct CancelledView {
    status: &'static str,
}

pub fn run_reminder(ctx: &AppContext, args: &ReminderArgs) -> Result<()> {
    let mut reminders = match ctx.reminders() {
        Ok(reminders) => reminders,
        Err(err) => {
            return fail(
                ctx.output,
                CliError::coded(format!("{err:#}"), ErrorCode::ConfigParseError),
            );
        }
    };

    match args.command {
        ReminderCommand::On => {
            let session = ctx.open_session()?;
            let Some(quote) = today_or_placeholder(ctx.output, &session)? else {
                return Ok(());
            };
            let outcome = reminders.reschedule(ctx.now, &quote);
            render(ctx.output, &outcome, |v, w| match v {
                ReminderOutcome::Scheduled { next_fire } => {
                    writeln!(w, "Daily reminder on; next at {}", next_fire.format("%Y-%m-%d %H:%M"))
                }
                ReminderOutcome::Skipped { reason } => {
                    writeln!(w, "Reminder not scheduled ({})", skip_label(*reason))
                }
            })
        }
        ReminderCommand::Off => {
            // A failed cancel is reported, never fatal.
            let status = match reminders.cancel() {
                Ok(()) => "cancelled",
                Err(err) => {
                    tracing::warn!(code = %err.code(), error = %err, "reminder cancel failed");
                    "cancel_failed"
                }
            };
            render(ctx.output, &CancelledView { status }, |v, w| {
                if v.status == "cancelled" {
                    writeln!(w, "Daily reminder off")
                } else {
                    writeln!(w, "Daily reminder could not be cancelled")
                }
            })
        }
        ReminderCommand::Status => {
            let reminder = reminders.scheduler().scheduled();
            let view = StatusView {
                scheduled: reminder.is_some(),
                next_fire: reminder
                    .as_ref()
                    .map(|_| reminders.trigger().next_fire_after(ctx.now)),
                reminder,
            };
            render_mode(
                ctx.output,
                &view,
                |v, w| match &v.reminder {
                    Some(r) => writeln!(w, "on\t{:02}:{:02}\t{}", r.hour, r.minute, r.body),
                    None => writeln!(w, "off"),
                },
                |v, w| {
                    pretty_section(w, "Daily reminder")?;
                    let Some(r) = &v.reminder else {
                        return pretty_kv(w, "Status", "off");
                    };
                    pretty_kv(w, "Status", "on")?;
                    pretty_kv(w, "Time", format!("{:02}:{:02} daily", r.hour, r.minute))?;
                    pretty_kv(w, "Title", &r.title)?;
                    pretty_kv(w, "Body", &r.body)?;
                    if let Some(next) = v.next_fire {
                        pretty_kv(w, "Next", next.format("%Y-%m-%d %H:%M").to_string())?;
                    }
                    Ok(())
                },
            )
        }
    }
}

const fn skip_label(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::PermissionDenied => "notification permission denied",
        SkipReason::Unsupported => "notifications unsupported here",
        SkipReason::SchedulerFailed => "scheduler failed; try again",
    }
}
