//! `zen favorites` — the Favorites tab, behind the premium guard.

use anyhow::Result;
use clap::Args;
use dailyzen_core::Session;
use dailyzen_core::gate::GuardState;
use serde::Serialize;

use super::{AppContext, QuoteView, plans};
use crate::output::{pretty_section, render, render_mode};

#[derive(Args, Debug)]
pub struct FavoritesArgs {
    /// Case-insensitive filter on text or author.
    #[arg(long, short)]
    pub query: Option<String>,

    /// Remove every favorite.
    #[arg(long, conflicts_with = "query")]
    pub clear: bool,
}

#[derive(Debug, Serialize)]
struct FavoritesView {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<String>,
    count: usize,
    quotes: Vec<QuoteView>,
}

#[derive(Debug, Serialize)]
struct ClearedView {
    status: &'static str,
    removed: usize,
}

pub fn run_favorites(ctx: &AppContext, args: &FavoritesArgs) -> Result<()> {
    let mut session = ctx.open_session()?;
    if args.clear {
        return clear(ctx, &mut session);
    }
    show(ctx, &mut session, args.query.as_deref())
}

/// Focus the tab; the paywall renders instead while not premium.
pub fn show(ctx: &AppContext, session: &mut Session, query: Option<&str>) -> Result<()> {
    if session.focus_favorites() != GuardState::Unlocked {
        return plans::render_paywall(ctx.output, None);
    }

    let quotes: Vec<QuoteView> = session
        .favorites_view(query)
        .iter()
        .map(|q| QuoteView::new(q, true))
        .collect();
    let view = FavoritesView {
        status: "unlocked",
        query: query.map(str::to_string),
        count: quotes.len(),
        quotes,
    };
    render_mode(
        ctx.output,
        &view,
        |v, w| {
            for q in &v.quotes {
                writeln!(w, "{}\t{}\t{}", q.id, q.text, q.author)?;
            }
            Ok(())
        },
        |v, w| {
            pretty_section(w, &format!("Favorites ({})", v.count))?;
            if v.quotes.is_empty() {
                let hint = if v.query.is_some() {
                    "No favorites match."
                } else {
                    "No favorites yet. Tap the heart with `zen fav`."
                };
                return writeln!(w, "{hint}");
            }
            for q in &v.quotes {
                writeln!(w, "[{:>2}] \u{201c}{}\u{201d} \u{2014} {}", q.id, q.text, q.author)?;
            }
            Ok(())
        },
    )
}

fn clear(ctx: &AppContext, session: &mut Session) -> Result<()> {
    if session.focus_favorites() != GuardState::Unlocked {
        return plans::render_paywall(ctx.output, None);
    }
    let view = ClearedView {
        status: "cleared",
        removed: session.clear_favorites(),
    };
    render(ctx.output, &view, |v, w| {
        writeln!(w, "Removed {} favorite(s)", v.removed)
    })
}
