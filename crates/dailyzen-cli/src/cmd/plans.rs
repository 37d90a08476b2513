//! `zen plans`, `zen tips` and the paywall screen other commands show.

use anyhow::Result;
use dailyzen_core::purchase::{
    PAYWALL_BADGES, PAYWALL_HEADLINE, PAYWALL_SUBTITLE, Plan, TIP_OPTIONS, TipOption,
};
use dailyzen_core::session::ToggleOutcome;
use serde::Serialize;
use std::io::{self, Write};

use super::AppContext;
use crate::output::{OutputMode, pretty_rule, pretty_section, render_mode};

#[derive(Debug, Serialize)]
struct PlanView {
    plan: Plan,
    title: &'static str,
    caption: &'static str,
    price: &'static str,
    default: bool,
}

fn plan_views() -> Vec<PlanView> {
    Plan::ALL
        .iter()
        .map(|&plan| PlanView {
            plan,
            title: plan.title(),
            caption: plan.caption(),
            price: plan.price_label(),
            default: plan == Plan::default(),
        })
        .collect()
}

#[derive(Debug, Serialize)]
struct PaywallView {
    status: &'static str,
    headline: &'static str,
    subtitle: &'static str,
    badges: [&'static str; 3],
    plans: Vec<PlanView>,
    /// Present when a heart tap opened the paywall.
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<ToggleOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pending_quote_id: Option<String>,
}

fn write_plans(w: &mut dyn Write, plans: &[PlanView]) -> io::Result<()> {
    for p in plans {
        let marker = if p.default { "\u{25cf}" } else { "\u{25cb}" };
        writeln!(w, "  {marker} {:<9} {:<12} {}", p.title, p.caption, p.price)?;
    }
    Ok(())
}

/// Render the paywall. `pending` is the quote that gets favorited on upgrade.
pub fn render_paywall(output: OutputMode, pending: Option<&str>) -> Result<()> {
    let view = PaywallView {
        status: "paywall",
        headline: PAYWALL_HEADLINE,
        subtitle: PAYWALL_SUBTITLE,
        badges: PAYWALL_BADGES,
        plans: plan_views(),
        outcome: pending.map(|_| ToggleOutcome::Gated),
        pending_quote_id: pending.map(str::to_string),
    };
    render_mode(
        output,
        &view,
        |v, w| {
            writeln!(w, "paywall\t{}", v.pending_quote_id.as_deref().unwrap_or("-"))
        },
        |v, w| {
            pretty_section(w, v.headline)?;
            writeln!(w, "{}", v.subtitle)?;
            writeln!(w)?;
            for badge in v.badges {
                writeln!(w, "  \u{2713} {badge}")?;
            }
            writeln!(w)?;
            write_plans(w, &v.plans)?;
            pretty_rule(w)?;
            match &v.pending_quote_id {
                Some(id) => writeln!(w, "Run `zen upgrade --pending {id}` to unlock and save quote {id}."),
                None => writeln!(w, "Run `zen upgrade` to unlock."),
            }
        },
    )
}

pub fn run_plans(ctx: &AppContext) -> Result<()> {
    let plans = plan_views();
    render_mode(
        ctx.output,
        &plans,
        |v, w| {
            for p in v {
                writeln!(w, "{}\t{}\t{}", p.plan, p.price, if p.default { "default" } else { "-" })?;
            }
            Ok(())
        },
        |v, w| {
            pretty_section(w, PAYWALL_HEADLINE)?;
            write_plans(w, v)
        },
    )
}

pub fn run_tips(ctx: &AppContext) -> Result<()> {
    render_mode(
        ctx.output,
        &TIP_OPTIONS,
        |v: &[TipOption; 3], w| {
            for tip in v {
                writeln!(w, "{}\t{}\t{}", tip.id, tip.label, tip.price)?;
            }
            Ok(())
        },
        |v, w| {
            pretty_section(w, "Tip jar")?;
            for tip in v {
                writeln!(w, "  {:<12} {:>7}  {}", tip.label, tip.price, tip.caption)?;
            }
            Ok(())
        },
    )
}
