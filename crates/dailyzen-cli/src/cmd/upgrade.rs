//! `zen upgrade` and `zen restore`.

use anyhow::Result;
use clap::Args;
use dailyzen_core::Session;
use dailyzen_core::purchase::{Plan, PurchaseError};
use dailyzen_core::session::{RestoreOutcome, UpgradeOutcome};

use super::{AppContext, fail, fail_lookup};
use crate::output::{CliError, render};

#[derive(Args, Debug)]
pub struct UpgradeArgs {
    /// Plan to buy.
    #[arg(long, default_value = "lifetime", value_parser = parse_plan)]
    pub plan: Plan,

    /// Quote to favorite once premium is unlocked.
    #[arg(long)]
    pub pending: Option<String>,
}

fn parse_plan(raw: &str) -> Result<Plan, String> {
    raw.parse()
}

pub fn run_upgrade(ctx: &AppContext, args: &UpgradeArgs) -> Result<()> {
    let mut session = ctx.open_session()?;
    if let Err(err) = session.open_paywall(args.pending.as_deref()) {
        return fail_lookup(ctx.output, &err);
    }
    upgrade(ctx, &mut session, args.plan)
}

/// Run the purchase from the currently shown paywall.
pub fn upgrade(ctx: &AppContext, session: &mut Session, plan: Plan) -> Result<()> {
    match session.upgrade(plan) {
        Ok(outcome) => render(ctx.output, &outcome, |v, w| match v {
            UpgradeOutcome::Unlocked { plan, favorited } => {
                writeln!(w, "Premium unlocked ({})", plan.price_label())?;
                if let Some(id) = favorited {
                    writeln!(w, "Quote {id} added to favorites")?;
                }
                Ok(())
            }
            UpgradeOutcome::AlreadyPremium => writeln!(w, "Already premium"),
            UpgradeOutcome::Cancelled => writeln!(w, "Purchase cancelled; nothing was charged"),
        }),
        Err(err) => fail_purchase(ctx, &err),
    }
}

pub fn run_restore(ctx: &AppContext) -> Result<()> {
    let mut session = ctx.open_session()?;
    match session.restore() {
        Ok(outcome) => render(ctx.output, &outcome, |v, w| match v {
            RestoreOutcome::Restored { plan } => writeln!(w, "Restored {plan} purchase; premium unlocked"),
            RestoreOutcome::NothingToRestore => writeln!(w, "No purchase to restore"),
        }),
        Err(err) => fail_purchase(ctx, &err),
    }
}

fn fail_purchase(ctx: &AppContext, err: &PurchaseError) -> Result<()> {
    fail(ctx.output, CliError::coded(err.to_string(), err.code()))
}
