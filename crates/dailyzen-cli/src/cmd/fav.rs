//! `zen fav` (heart tap) and `zen unfav` (swipe-to-delete).

use anyhow::Result;
use clap::Args;
use dailyzen_core::Session;
use dailyzen_core::session::ToggleOutcome;
use serde::Serialize;

use super::{AppContext, fail_lookup, plans, today_or_placeholder};
use crate::output::render;

#[derive(Args, Debug)]
pub struct FavArgs {
    /// Quote ID (default: today's quote).
    pub id: Option<String>,
}

#[derive(Args, Debug)]
pub struct UnfavArgs {
    /// Quote ID to remove from favorites.
    pub id: String,
}

#[derive(Debug, Serialize)]
struct ToggleView {
    id: String,
    outcome: ToggleOutcome,
}

#[derive(Debug, Serialize)]
struct RemoveView {
    id: String,
    removed: bool,
}

pub fn run_fav(ctx: &AppContext, args: &FavArgs) -> Result<()> {
    let mut session = ctx.open_session()?;
    toggle(ctx, &mut session, args.id.as_deref())
}

/// Heart tap; renders the paywall when the tap is gated.
pub fn toggle(ctx: &AppContext, session: &mut Session, id: Option<&str>) -> Result<()> {
    let id = match id {
        Some(id) => id.to_string(),
        None => match today_or_placeholder(ctx.output, session)? {
            Some(quote) => quote.id,
            None => return Ok(()),
        },
    };
    let outcome = match session.toggle_favorite(&id) {
        Ok(outcome) => outcome,
        Err(err) => return fail_lookup(ctx.output, &err),
    };
    if outcome == ToggleOutcome::Gated {
        let pending = session.gate().ui().pending_quote_id.clone();
        return plans::render_paywall(ctx.output, pending.as_deref());
    }
    render(ctx.output, &ToggleView { id, outcome }, |v, w| {
        let verb = if v.outcome == ToggleOutcome::Added {
            "added to"
        } else {
            "removed from"
        };
        writeln!(w, "Quote {} {verb} favorites", v.id)
    })
}

pub fn run_unfav(ctx: &AppContext, args: &UnfavArgs) -> Result<()> {
    let mut session = ctx.open_session()?;
    let removed = session.remove_favorite(&args.id);
    let view = RemoveView {
        id: args.id.clone(),
        removed,
    };
    render(ctx.output, &view, |v, w| {
        if v.removed {
            writeln!(w, "Quote {} removed from favorites", v.id)
        } else {
            writeln!(w, "Quote {} was not a favorite", v.id)
        }
    })
}
