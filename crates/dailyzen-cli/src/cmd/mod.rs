//! Command handlers and the per-invocation context they share.

pub mod completions;
pub mod config;
pub mod fav;
pub mod favorites;
pub mod plans;
pub mod quotes;
pub mod reminder;
pub mod session;
pub mod share;
pub mod today;
pub mod upgrade;

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};
use dailyzen_core::Session;
use dailyzen_core::config::EffectiveConfig;
use dailyzen_core::error::ErrorCode;
use dailyzen_core::quote::{Catalog, LookupError, QuoteWithId};
use dailyzen_core::reminder::{Reminders, StoredScheduler};
use dailyzen_core::store::{FileStore, WriteBehind};
use serde::Serialize;

use crate::output::{CliError, OutputMode, pretty_kv, render_error, render_mode};
use crate::platform::SandboxProvider;

/// Everything a command needs: resolved config, clock and storage.
pub struct AppContext {
    pub config: EffectiveConfig,
    pub output: OutputMode,
    pub date: NaiveDate,
    pub now: NaiveDateTime,
    store: Arc<FileStore>,
    writer: Arc<WriteBehind>,
}

impl AppContext {
    /// `date` overrides the local calendar date; the time of day stays local.
    pub fn new(config: EffectiveConfig, output: OutputMode, date: Option<NaiveDate>) -> Self {
        let local = Local::now().naive_local();
        let date = date.unwrap_or_else(|| local.date());
        let store = Arc::new(FileStore::new(&config.data_dir));
        let writer = Arc::new(WriteBehind::spawn(store.clone()));
        tracing::debug!(data_dir = %config.data_dir.display(), %date, "context ready");
        Self {
            config,
            output,
            date,
            now: date.and_time(local.time()),
            store,
            writer,
        }
    }

    /// # Errors
    ///
    /// Returns an error if a configured catalog file cannot be loaded.
    pub fn catalog(&self) -> Result<Catalog> {
        Catalog::resolve(self.config.user.quotes.path.as_deref())
            .context("Failed to load quote catalog")
    }

    /// # Errors
    ///
    /// Returns an error, already rendered, if the catalog cannot be loaded.
    pub fn open_session(&self) -> Result<Session> {
        let catalog = match self.catalog() {
            Ok(catalog) => catalog,
            Err(err) => {
                return fail(
                    self.output,
                    CliError::coded(format!("{err:#}"), ErrorCode::ConfigParseError),
                );
            }
        };
        let provider = SandboxProvider::new(self.config.user.purchases.sandbox, self.store.clone());
        Ok(Session::open(
            catalog,
            self.date,
            self.store.as_ref(),
            self.writer.clone(),
            Box::new(provider),
        ))
    }

    /// # Errors
    ///
    /// Returns an error if the configured reminder time is out of range.
    pub fn reminders(&self) -> Result<Reminders<StoredScheduler>> {
        Reminders::from_config(
            &self.config.user.reminder,
            StoredScheduler::new(self.store.clone()),
        )
        .context("Invalid [reminder] time")
    }

    /// Wait for queued writes to reach disk.
    pub fn finish(&self) {
        self.writer.shutdown();
        let stats = self.writer.stats();
        tracing::debug!(
            written = stats.written(),
            failed = stats.failed(),
            superseded = stats.superseded(),
            "writes settled"
        );
    }
}

/// Quote as shown by `today`, `quotes` and `favorites`.
#[derive(Debug, Serialize)]
pub struct QuoteView {
    pub id: String,
    pub text: String,
    pub author: String,
    pub favorite: bool,
}

impl QuoteView {
    pub fn new(quote: &QuoteWithId, favorite: bool) -> Self {
        Self {
            id: quote.id.clone(),
            text: quote.text.clone(),
            author: quote.author.clone(),
            favorite,
        }
    }
}

/// Render `error` and return it as the command's failure.
pub fn fail<T>(output: OutputMode, error: CliError) -> Result<T> {
    render_error(output, &error)?;
    anyhow::bail!("{}", error.message)
}

/// Render a lookup failure for a user-supplied quote ID.
pub fn fail_lookup<T>(output: OutputMode, err: &LookupError) -> Result<T> {
    fail(output, CliError::coded(err.to_string(), err.code()))
}

/// Shown in place of a quote when the catalog is empty.
#[derive(Debug, Serialize)]
struct NoQuoteView {
    status: &'static str,
    message: &'static str,
    error_code: &'static str,
    quote: Option<QuoteView>,
}

/// Quote of the day, or `None` after rendering the empty-catalog placeholder.
///
/// An empty catalog is not a command failure; callers return `Ok(())`.
pub fn today_or_placeholder(output: OutputMode, session: &Session) -> Result<Option<QuoteWithId>> {
    let err = match session.today() {
        Ok(quote) => return Ok(Some(quote.clone())),
        Err(err) => err,
    };
    let code = err.code();
    tracing::warn!(code = %code, error = %err, "no quote to show");
    let view = NoQuoteView {
        status: "empty",
        message: "no quote today",
        error_code: code.code(),
        quote: None,
    };
    render_mode(
        output,
        &view,
        |v, w| writeln!(w, "-\t{}", v.message),
        |v, w| {
            writeln!(w, "No quote today.")?;
            pretty_kv(w, "Reason", format!("{} ({})", code.message(), v.error_code))?;
            match code.hint() {
                Some(hint) => pretty_kv(w, "Hint", hint),
                None => Ok(()),
            }
        },
    )?;
    Ok(None)
}
