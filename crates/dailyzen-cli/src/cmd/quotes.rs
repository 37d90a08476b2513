use anyhow::Result;

use super::{AppContext, QuoteView};
use crate::output::{pretty_section, render_mode};

/// `zen quotes` — the whole catalog with IDs.
pub fn run_quotes(ctx: &AppContext) -> Result<()> {
    let session = ctx.open_session()?;
    let today = session.today().ok().map(|q| q.id.clone());
    let quotes: Vec<QuoteView> = session
        .catalog()
        .iter_with_ids()
        .map(|q| {
            let favorite = session.is_favorite(&q.id);
            QuoteView::new(&q, favorite)
        })
        .collect();

    render_mode(
        ctx.output,
        &quotes,
        |v, w| {
            for q in v {
                writeln!(w, "{}\t{}\t{}", q.id, q.text, q.author)?;
            }
            Ok(())
        },
        |v, w| {
            pretty_section(w, &format!("Quotes ({})", v.len()))?;
            for q in v {
                let mark = if today.as_deref() == Some(q.id.as_str()) {
                    '\u{2600}'
                } else if q.favorite {
                    '\u{2665}'
                } else {
                    ' '
                };
                writeln!(w, "{mark} [{:>2}] {} \u{2014} {}", q.id, q.text, q.author)?;
            }
            Ok(())
        },
    )
}
