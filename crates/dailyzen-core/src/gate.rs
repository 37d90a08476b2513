//! Paywall visibility and the Favorites-tab guard.
//!
//! The guard has three states. Focusing the Favorites tab picks `Unlocked`
//! or `Paywall` from the entitlement; `Paywall` becomes `Unlocked` only
//! after the entitlement turns premium, and dismissing the paywall while
//! still not premium goes to `Locked` and routes back to Home.
//!
//! Every method that can show the paywall takes the [`UserStore`] rather
//! than a bool, so the paywall is never opened for a premium user.

use serde::Serialize;

use crate::entitlement::UserStore;

/// Favorites-tab guard state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardState {
    Locked,
    Paywall,
    Unlocked,
}

/// Navigation destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Home,
    Favorites,
}

/// Transient per-process UI flags. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UiGateState {
    pub show_paywall: bool,
    /// Quote the user tried to favorite when the paywall interrupted.
    pub pending_quote_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PaywallGate {
    ui: UiGateState,
    guard: GuardState,
    route: Route,
}

impl Default for PaywallGate {
    fn default() -> Self {
        Self::new()
    }
}

impl PaywallGate {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ui: UiGateState {
                show_paywall: false,
                pending_quote_id: None,
            },
            guard: GuardState::Locked,
            route: Route::Home,
        }
    }

    #[must_use]
    pub const fn ui(&self) -> &UiGateState {
        &self.ui
    }

    #[must_use]
    pub const fn guard(&self) -> GuardState {
        self.guard
    }

    #[must_use]
    pub const fn route(&self) -> Route {
        self.route
    }

    /// Show the paywall, remembering `quote_id` as the pending favorite.
    ///
    /// Returns `false` without showing anything when the user is premium.
    pub fn open_paywall(&mut self, user: &UserStore, quote_id: Option<&str>) -> bool {
        if user.is_premium() {
            tracing::debug!("paywall skipped: already premium");
            return false;
        }
        self.ui.show_paywall = true;
        self.ui.pending_quote_id = quote_id.map(str::to_string);
        tracing::debug!(pending = ?self.ui.pending_quote_id, "paywall opened");
        true
    }

    /// Hide the paywall and forget any pending favorite.
    pub fn close_paywall(&mut self) {
        self.ui.show_paywall = false;
        self.ui.pending_quote_id = None;
    }

    /// Navigate to the Favorites tab and evaluate the guard.
    ///
    /// A pending favorite from an earlier heart tap survives the guard's
    /// paywall, so an upgrade from here still saves it.
    pub fn focus_favorites(&mut self, user: &UserStore) -> GuardState {
        self.route = Route::Favorites;
        self.guard = if user.is_premium() {
            GuardState::Unlocked
        } else {
            self.ui.show_paywall = true;
            GuardState::Paywall
        };
        tracing::debug!(guard = ?self.guard, "favorites focused");
        self.guard
    }

    /// Navigate to Home. The guard is re-evaluated on the next focus.
    pub fn go_home(&mut self) {
        self.route = Route::Home;
    }

    /// The user closed the paywall. Returns the route to render next.
    pub fn dismiss_paywall(&mut self, user: &UserStore) -> Route {
        self.close_paywall();
        if self.route == Route::Favorites && self.guard == GuardState::Paywall {
            if user.is_premium() {
                self.guard = GuardState::Unlocked;
            } else {
                self.guard = GuardState::Locked;
                self.route = Route::Home;
            }
        }
        self.route
    }

    /// React to an entitlement change.
    pub fn entitlement_changed(&mut self, user: &UserStore) -> GuardState {
        if user.is_premium() {
            if self.guard == GuardState::Paywall {
                self.guard = GuardState::Unlocked;
            }
        } else if self.guard == GuardState::Unlocked {
            self.guard = GuardState::Locked;
        }
        self.guard
    }

    /// Take the pending favorite, if any, leaving none behind.
    pub fn take_pending(&mut self) -> Option<String> {
        self.ui.pending_quote_id.take()
    }
}
