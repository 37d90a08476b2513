//! One app run: the quote of the day, the stores and the paywall gate.
//!
//! A [`Session`] is opened once per process against a hydrated pair of
//! stores. Every user action is a `&mut self` method, so there is exactly
//! one writer to the favorites set and the entitlement flag.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::entitlement::UserStore;
use crate::favorites::FavoritesStore;
use crate::gate::{GuardState, PaywallGate, Route};
use crate::purchase::{Entitlement, Plan, PurchaseError, PurchaseProvider};
use crate::quote::{Catalog, LookupError, QuoteWithId, SelectError};
use crate::share::{ShareOutcome, ShareSheet, share_quote};
use crate::store::{KeyValueStore, RecordWriter};

/// Result of a heart tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// Not premium: the paywall opened with the quote pending.
    Gated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum UpgradeOutcome {
    Unlocked {
        plan: Plan,
        /// Pending quote that was favorited as part of the upgrade.
        favorited: Option<String>,
    },
    AlreadyPremium,
    /// The user backed out; the paywall stays up.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum RestoreOutcome {
    Restored { plan: Plan },
    NothingToRestore,
}

pub struct Session {
    catalog: Catalog,
    date: NaiveDate,
    today: Result<QuoteWithId, SelectError>,
    favorites: FavoritesStore,
    user: UserStore,
    gate: PaywallGate,
    purchases: Box<dyn PurchaseProvider>,
}

impl Session {
    /// Hydrate both stores from `reader` and compute the quote of the day.
    pub fn open(
        catalog: Catalog,
        date: NaiveDate,
        reader: &dyn KeyValueStore,
        writer: Arc<dyn RecordWriter>,
        purchases: Box<dyn PurchaseProvider>,
    ) -> Self {
        let favorites = FavoritesStore::hydrate(reader, writer.clone(), Some(catalog.digest()));
        let user = UserStore::hydrate(reader, writer);
        let today = catalog.for_date(date);
        match &today {
            Ok(quote) => tracing::debug!(%date, id = %quote.id, "quote of the day"),
            Err(err) => tracing::warn!(%date, code = %err.code(), "no quote of the day"),
        }
        Self {
            catalog,
            date,
            today,
            favorites,
            user,
            gate: PaywallGate::new(),
            purchases,
        }
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Quote of the day, fixed for the life of the session.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::EmptyList`] when the catalog is empty.
    pub fn today(&self) -> Result<&QuoteWithId, SelectError> {
        self.today.as_ref().map_err(|err| *err)
    }

    #[must_use]
    pub const fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    #[must_use]
    pub const fn user(&self) -> &UserStore {
        &self.user
    }

    #[must_use]
    pub const fn gate(&self) -> &PaywallGate {
        &self.gate
    }

    #[must_use]
    pub const fn is_premium(&self) -> bool {
        self.user.is_premium()
    }

    #[must_use]
    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.has(id)
    }

    /// Heart tap on a quote.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when `id` does not name a catalog quote.
    pub fn toggle_favorite(&mut self, id: &str) -> Result<ToggleOutcome, LookupError> {
        let quote = self.catalog.lookup(id)?;
        if !self.user.is_premium() {
            self.gate.open_paywall(&self.user, Some(&quote.id));
            return Ok(ToggleOutcome::Gated);
        }
        Ok(if self.favorites.toggle(&quote.id) {
            ToggleOutcome::Added
        } else {
            ToggleOutcome::Removed
        })
    }

    /// Swipe-to-delete. Works for IDs the catalog no longer knows.
    pub fn remove_favorite(&mut self, id: &str) -> bool {
        let had = self.favorites.has(id);
        self.favorites.remove(id);
        had
    }

    pub fn clear_favorites(&mut self) -> usize {
        self.favorites.clear()
    }

    /// Favorites resolved through the catalog, ordered by numeric ID.
    ///
    /// IDs that no longer resolve are skipped but stay stored.
    #[must_use]
    pub fn favorites_view(&self, query: Option<&str>) -> Vec<QuoteWithId> {
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        let mut view: Vec<QuoteWithId> = self
            .favorites
            .ids()
            .filter_map(|id| self.catalog.get(id))
            .filter(|quote| query.is_none_or(|q| quote.matches(q)))
            .collect();
        view.sort_by_key(|quote| quote.id.parse::<usize>().unwrap_or(usize::MAX));
        view
    }

    /// Show the paywall directly, optionally with a pending favorite.
    ///
    /// Returns `Ok(false)` when the user is already premium.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when `pending` does not name a catalog quote.
    pub fn open_paywall(&mut self, pending: Option<&str>) -> Result<bool, LookupError> {
        let pending = pending.map(|id| self.catalog.lookup(id)).transpose()?;
        Ok(self
            .gate
            .open_paywall(&self.user, pending.as_ref().map(|q| q.id.as_str())))
    }

    pub fn focus_favorites(&mut self) -> GuardState {
        self.gate.focus_favorites(&self.user)
    }

    pub fn go_home(&mut self) {
        self.gate.go_home();
    }

    pub fn dismiss_paywall(&mut self) -> Route {
        self.gate.dismiss_paywall(&self.user)
    }

    /// The single entitlement mutation path for the session.
    pub fn set_premium(&mut self, value: bool) {
        self.user.set_premium(value);
        if value {
            self.gate.close_paywall();
        }
        self.gate.entitlement_changed(&self.user);
    }

    /// Buy `plan` through the provider.
    ///
    /// On success the pending quote, if any, is favorited and the paywall
    /// closes. Cancellation leaves everything as it was.
    ///
    /// # Errors
    ///
    /// Returns the provider's error for rejected or failed purchases; state
    /// is unchanged and the call can be retried.
    pub fn upgrade(&mut self, plan: Plan) -> Result<UpgradeOutcome, PurchaseError> {
        if self.user.is_premium() {
            self.gate.close_paywall();
            return Ok(UpgradeOutcome::AlreadyPremium);
        }

        let entitlement = match self.purchases.confirm_purchase(plan) {
            Ok(entitlement) => entitlement,
            Err(PurchaseError::Cancelled) => {
                tracing::info!(%plan, "purchase cancelled");
                return Ok(UpgradeOutcome::Cancelled);
            }
            Err(err) => {
                tracing::warn!(%plan, code = %err.code(), error = %err, "purchase failed");
                return Err(err);
            }
        };
        if !entitlement.premium {
            let err = PurchaseError::Rejected(format!("{plan} purchase did not grant premium"));
            tracing::warn!(%plan, error = %err, "purchase failed");
            return Err(err);
        }

        let pending = self.gate.take_pending();
        self.set_premium(true);
        let favorited = pending.filter(|id| self.catalog.get(id).is_some());
        if let Some(id) = &favorited {
            self.favorites.add(id);
        }
        tracing::info!(plan = %entitlement.plan, favorited = ?favorited, "premium unlocked");
        Ok(UpgradeOutcome::Unlocked {
            plan: entitlement.plan,
            favorited,
        })
    }

    /// Restore a previous purchase.
    ///
    /// # Errors
    ///
    /// Returns the provider's error; state is unchanged.
    pub fn restore(&mut self) -> Result<RestoreOutcome, PurchaseError> {
        match self.purchases.restore_purchases()? {
            Some(Entitlement {
                plan,
                premium: true,
            }) => {
                self.set_premium(true);
                tracing::info!(%plan, "purchase restored");
                Ok(RestoreOutcome::Restored { plan })
            }
            _ => Ok(RestoreOutcome::NothingToRestore),
        }
    }

    /// Share the quote of the day.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::EmptyList`] when there is nothing to share.
    pub fn share_today(
        &self,
        sheet: &mut dyn ShareSheet,
        signature: &str,
    ) -> Result<ShareOutcome, SelectError> {
        let quote = self.today()?;
        Ok(share_quote(sheet, quote, signature))
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("date", &self.date)
            .field("favorites", &self.favorites)
            .field("user", &self.user)
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}
