#![forbid(unsafe_code)]

mod cmd;
mod output;
mod platform;

use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use dailyzen_core::config::{load_user_config, resolve_with};
use dailyzen_core::error::ErrorCode;
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "zen",
    author,
    version,
    about = "zen: one calm quote a day",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output (same as `--format json`).
    #[arg(long, global = true)]
    json: bool,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Pretend today is this date (YYYY-MM-DD).
    #[arg(long, global = true)]
    date: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Daily",
        about = "Show the quote of the day",
        after_help = "EXAMPLES:\n    zen today\n\n    # Another day's quote\n    zen today --date 2024-12-25"
    )]
    Today,

    #[command(
        next_help_heading = "Daily",
        about = "Compose the share message for today's quote"
    )]
    Share,

    #[command(
        next_help_heading = "Favorites",
        about = "Tap the heart on a quote",
        long_about = "Toggle a quote's favorite status. Without premium the paywall is shown and the quote is remembered as pending.",
        after_help = "EXAMPLES:\n    # Today's quote\n    zen fav\n\n    # A quote by ID\n    zen fav 12"
    )]
    Fav(cmd::fav::FavArgs),

    #[command(next_help_heading = "Favorites", about = "Remove a favorite")]
    Unfav(cmd::fav::UnfavArgs),

    #[command(
        next_help_heading = "Favorites",
        about = "Open the Favorites tab",
        after_help = "EXAMPLES:\n    zen favorites\n\n    # Filter by text or author\n    zen favorites --query seneca\n\n    # Remove everything\n    zen favorites --clear"
    )]
    Favorites(cmd::favorites::FavoritesArgs),

    #[command(
        next_help_heading = "Premium",
        about = "Unlock premium",
        after_help = "EXAMPLES:\n    zen upgrade\n\n    # Monthly plan, then save quote 4\n    zen upgrade --plan monthly --pending 4"
    )]
    Upgrade(cmd::upgrade::UpgradeArgs),

    #[command(next_help_heading = "Premium", about = "Restore a previous purchase")]
    Restore,

    #[command(next_help_heading = "Premium", about = "List premium plans")]
    Plans,

    #[command(next_help_heading = "Premium", about = "List tip-jar options")]
    Tips,

    #[command(next_help_heading = "Daily", about = "List every quote with its ID")]
    Quotes,

    #[command(
        next_help_heading = "Daily",
        about = "Manage the daily reminder",
        after_help = "EXAMPLES:\n    zen reminder on\n    zen reminder status\n    zen reminder off"
    )]
    Reminder(cmd::reminder::ReminderArgs),

    #[command(
        next_help_heading = "Daily",
        about = "Run an interactive session from stdin",
        after_help = "EXAMPLES:\n    printf 'fav\\nupgrade\\nfavorites\\n' | zen session"
    )]
    Session,

    #[command(next_help_heading = "Maintenance", about = "Inspect configuration")]
    Config(cmd::config::ConfigArgs),

    #[command(
        next_help_heading = "Maintenance",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    zen completions bash\n    zen completions zsh --out _zen"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("DAILYZEN_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "dailyzen=debug,zen=debug,info"
        } else {
            "dailyzen=info,zen=info,warn"
        })
    });

    let format = env::var("DAILYZEN_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args, &mut command);
    }

    let user = match load_user_config() {
        Ok(user) => user,
        Err(err) => {
            let mode = resolve_output_mode(cli.format, cli.json, "text");
            render_error(mode, &CliError::coded(format!("{err:#}"), ErrorCode::ConfigParseError))?;
            return Err(err);
        }
    };
    let config = resolve_with(user, cli.json)?;
    let output = resolve_output_mode(cli.format, cli.json, &config.resolved_output);
    let ctx = cmd::AppContext::new(config, output, cli.date);

    let result = match &cli.command {
        Commands::Today => cmd::today::run_today(&ctx),
        Commands::Share => cmd::share::run_share(&ctx),
        Commands::Fav(args) => cmd::fav::run_fav(&ctx, args),
        Commands::Unfav(args) => cmd::fav::run_unfav(&ctx, args),
        Commands::Favorites(args) => cmd::favorites::run_favorites(&ctx, args),
        Commands::Upgrade(args) => cmd::upgrade::run_upgrade(&ctx, args),
        Commands::Restore => cmd::upgrade::run_restore(&ctx),
        Commands::Plans => cmd::plans::run_plans(&ctx),
        Commands::Tips => cmd::plans::run_tips(&ctx),
        Commands::Quotes => cmd::quotes::run_quotes(&ctx),
        Commands::Reminder(args) => cmd::reminder::run_reminder(&ctx, args),
        Commands::Session => cmd::session::run_session(&ctx),
        Commands::Config(args) => cmd::config::run_config(&ctx, args),
        Commands::Completions(_) => Ok(()),
    };

    ctx.finish();
    result
}
