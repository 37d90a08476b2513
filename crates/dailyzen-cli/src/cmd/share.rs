//! `zen share` — compose the share message for today's quote.

use anyhow::Result;
use dailyzen_core::Session;
use dailyzen_core::share::ShareOutcome;
use serde::Serialize;

use super::{AppContext, fail, today_or_placeholder};
use crate::output::{CliError, render};
use crate::platform::TerminalShareSheet;
use dailyzen_core::error::ErrorCode;

#[derive(Debug, Serialize)]
struct ShareView {
    id: String,
    outcome: ShareOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

pub fn run_share(ctx: &AppContext) -> Result<()> {
    let session = ctx.open_session()?;
    share(ctx, &session)
}

pub fn share(ctx: &AppContext, session: &Session) -> Result<()> {
    let Some(quote) = today_or_placeholder(ctx.output, session)? else {
        return Ok(());
    };
    let mut sheet = TerminalShareSheet::default();
    let Ok(outcome) = session.share_today(&mut sheet, &ctx.config.user.share.signature) else {
        return fail(
            ctx.output,
            CliError::coded("nothing to share", ErrorCode::EmptyQuoteList),
        );
    };
    let view = ShareView {
        id: quote.id,
        outcome,
        message: sheet.delivered().map(str::to_string),
    };
    render(ctx.output, &view, |v, w| match &v.message {
        Some(message) => writeln!(w, "{message}"),
        None if v.outcome == ShareOutcome::Dismissed => writeln!(w, "share dismissed"),
        None => writeln!(w, "share failed"),
    })
}
