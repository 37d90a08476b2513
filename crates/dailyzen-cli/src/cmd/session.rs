//! `zen session` — drive one session from stdin, one action per line.
//!
//! Unlike the one-shot commands, the paywall and pending favorite persist
//! between lines, so `fav 4` followed by `upgrade` saves quote 4.

use anyhow::Result;
use dailyzen_core::Session;
use dailyzen_core::gate::Route;
use dailyzen_core::purchase::Plan;
use serde::Serialize;
use std::io::{self, BufRead, Write};

use super::{AppContext, fav, favorites, share, today, upgrade};
use crate::output::{CliError, OutputMode, render, render_error};

const HELP: &str = "commands: today | fav [ID] | favorites [QUERY] | upgrade [monthly|lifetime] | close | share | home | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Today,
    Fav(Option<String>),
    Favorites(Option<String>),
    Upgrade(Plan),
    Close,
    Share,
    Home,
    Help,
    Quit,
}

fn parse_action(line: &str) -> Result<Option<Action>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let arg = (!rest.is_empty()).then(|| rest.to_string());
    let action = match word.to_ascii_lowercase().as_str() {
        "today" => Action::Today,
        "fav" | "heart" => Action::Fav(arg),
        "favorites" | "favs" => Action::Favorites(arg),
        "upgrade" => Action::Upgrade(arg.map_or(Ok(Plan::default()), |p| p.parse())?),
        "close" | "dismiss" => Action::Close,
        "share" => Action::Share,
        "home" => Action::Home,
        "help" | "?" => Action::Help,
        "quit" | "exit" | "q" => Action::Quit,
        other => return Err(format!("unknown command '{other}'")),
    };
    Ok(Some(action))
}

#[derive(Debug, Serialize)]
struct RouteView {
    route: Route,
}

pub fn run_session(ctx: &AppContext) -> Result<()> {
    let mut session = ctx.open_session()?;
    let stdin = io::stdin();
    let prompt = ctx.output == OutputMode::Pretty;

    today::show(ctx, &session)?;
    let mut input = stdin.lock();
    let mut line = String::new();
    loop {
        if prompt {
            print!("zen> ");
            io::stdout().flush()?;
        }
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let action = match parse_action(&line) {
            Ok(Some(action)) => action,
            Ok(None) => continue,
            Err(message) => {
                let error = CliError {
                    suggestion: Some(HELP.to_string()),
                    ..CliError::new(message)
                };
                render_error(ctx.output, &error)?;
                continue;
            }
        };
        if action == Action::Quit {
            break;
        }
        // Errors were already rendered; the loop keeps going.
        if let Err(err) = step(ctx, &mut session, action) {
            tracing::debug!(error = %err, "session step failed");
        }
    }
    Ok(())
}

fn step(ctx: &AppContext, session: &mut Session, action: Action) -> Result<()> {
    match action {
        Action::Today => today::show(ctx, session),
        Action::Fav(id) => fav::toggle(ctx, session, id.as_deref()),
        Action::Favorites(query) => favorites::show(ctx, session, query.as_deref()),
        Action::Upgrade(plan) => upgrade::upgrade(ctx, session, plan),
        Action::Close => {
            let route = session.dismiss_paywall();
            render(ctx.output, &RouteView { route }, |v, w| {
                writeln!(w, "paywall closed; showing {:?}", v.route)
            })
        }
        Action::Share => share::share(ctx, session),
        Action::Home => {
            session.go_home();
            render(ctx.output, &RouteView { route: Route::Home }, |_, w| {
                writeln!(w, "showing Home")
            })
        }
        Action::Help if ctx.output.is_json() => {
            render(ctx.output, &serde_json::json!({ "help": HELP }), |_, _| Ok(()))
        }
        Action::Help => {
            println!("{HELP}");
            Ok(())
        }
        Action::Quit => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_actions_with_arguments() {
        assert_eq!(parse_action("fav 4"), Ok(Some(Action::Fav(Some("4".into())))));
        assert_eq!(parse_action("fav"), Ok(Some(Action::Fav(None))));
        assert_eq!(
            parse_action("favorites  lao tzu "),
            Ok(Some(Action::Favorites(Some("lao tzu".into()))))
        );
        assert_eq!(parse_action("UPGRADE monthly"), Ok(Some(Action::Upgrade(Plan::Monthly))));
        assert_eq!(parse_action("upgrade"), Ok(Some(Action::Upgrade(Plan::Lifetime))));
    }

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        assert_eq!(parse_action("   "), Ok(None));
        assert_eq!(parse_action("# note"), Ok(None));
    }

    #[test]
    fn unknown_commands_and_plans_are_errors() {
        assert!(parse_action("dance").is_err());
        assert!(parse_action("upgrade weekly").is_err());
    }
}
