//! `zen today` — the quote of the day.

use anyhow::Result;
use chrono::NaiveDate;
use dailyzen_core::Session;
use serde::Serialize;

use super::{AppContext, QuoteView, today_or_placeholder};
use crate::output::{pretty_kv, pretty_rule, render_mode};

#[derive(Debug, Serialize)]
struct TodayView {
    date: NaiveDate,
    premium: bool,
    #[serde(flatten)]
    quote: QuoteView,
}

pub fn run_today(ctx: &AppContext) -> Result<()> {
    let session = ctx.open_session()?;
    show(ctx, &session)?;
    refresh_reminder(ctx, &session);
    Ok(())
}

/// Render the quote of the day.
pub fn show(ctx: &AppContext, session: &Session) -> Result<()> {
    let Some(quote) = today_or_placeholder(ctx.output, session)? else {
        return Ok(());
    };
    let view = TodayView {
        date: session.date(),
        premium: session.is_premium(),
        quote: QuoteView::new(&quote, session.is_favorite(&quote.id)),
    };
    render_mode(
        ctx.output,
        &view,
        |v, w| {
            writeln!(
                w,
                "{}\t{}\t{}\t{}",
                v.quote.id,
                v.quote.text,
                v.quote.author,
                if v.quote.favorite { "favorite" } else { "-" }
            )
        },
        |v, w| {
            writeln!(w, "Quote of the day ({})", v.date.format("%A %-d %B"))?;
            pretty_rule(w)?;
            writeln!(w, "\u{201c}{}\u{201d}", v.quote.text)?;
            writeln!(w, "    \u{2014} {}", v.quote.author)?;
            pretty_rule(w)?;
            pretty_kv(w, "ID", &v.quote.id)?;
            let heart = match (v.quote.favorite, v.premium) {
                (true, _) => "\u{2665} saved",
                (false, true) => "\u{2661} `zen fav` to save",
                (false, false) => "\u{2661} premium feature",
            };
            pretty_kv(w, "Favorite", heart)
        },
    )
}

/// Keep an already scheduled reminder pointing at today's quote.
fn refresh_reminder(ctx: &AppContext, session: &Session) {
    if !ctx.config.user.reminder.enabled {
        return;
    }
    let Ok(quote) = session.today() else {
        return;
    };
    match ctx.reminders() {
        Ok(mut reminders) if reminders.is_scheduled() => {
            let outcome = reminders.reschedule(ctx.now, quote);
            tracing::debug!(?outcome, "reminder refreshed");
        }
        Ok(_) => {}
        Err(err) => tracing::warn!(error = %err, "reminder not refreshed"),
    }
}
