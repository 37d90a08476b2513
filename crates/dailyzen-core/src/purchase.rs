//! Upgrade plans and the payment-provider seam.
//!
//! The library never grants premium by itself. A [`PurchaseProvider`]
//! confirms payment and the session applies the resulting [`Entitlement`]
//! through the single entitlement setter.

use serde::Serialize;

use crate::error::ErrorCode;

pub const PAYWALL_HEADLINE: &str = "Unlock Premium";
pub const PAYWALL_SUBTITLE: &str = "Save your favorite quotes. Enjoy peace without limits.";
pub const PAYWALL_BADGES: [&str; 3] = [
    "Unlimited favorites",
    "Share it to your crush",
    "Build your own wall of quotes",
];

/// Pricing tiers offered on the paywall.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    Monthly,
    #[default]
    Lifetime,
}

impl Plan {
    pub const ALL: [Self; 2] = [Self::Monthly, Self::Lifetime];

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Monthly => "Monthly",
            Self::Lifetime => "Lifetime",
        }
    }

    /// Short price caption shown on the plan switcher.
    #[must_use]
    pub const fn caption(self) -> &'static str {
        match self {
            Self::Monthly => "$0.99/month",
            Self::Lifetime => "$4.99",
        }
    }

    /// Price label used on the call-to-action button.
    #[must_use]
    pub const fn price_label(self) -> &'static str {
        match self {
            Self::Monthly => "$0.99 / month",
            Self::Lifetime => "$4.99 lifetime",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Lifetime => "lifetime",
        }
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Plan {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(Self::Monthly),
            "lifetime" => Ok(Self::Lifetime),
            other => Err(format!("unknown plan '{other}' (expected monthly or lifetime)")),
        }
    }
}

/// What a provider confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Entitlement {
    pub plan: Plan,
    pub premium: bool,
}

/// Provider failure. Everything but `Cancelled` is a retryable error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PurchaseError {
    #[error("{}: purchase cancelled", ErrorCode::PurchaseCancelled.code())]
    Cancelled,
    #[error("{}: purchase rejected: {}", ErrorCode::PurchaseRejected.code(), .0)]
    Rejected(String),
    #[error("{}: purchases unavailable: {}", ErrorCode::PurchaseUnavailable.code(), .0)]
    Unavailable(String),
    #[error("{}: purchase provider error: {}", ErrorCode::InternalUnexpected.code(), .0)]
    Provider(String),
}

impl PurchaseError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Cancelled => ErrorCode::PurchaseCancelled,
            Self::Rejected(_) => ErrorCode::PurchaseRejected,
            Self::Unavailable(_) => ErrorCode::PurchaseUnavailable,
            Self::Provider(_) => ErrorCode::InternalUnexpected,
        }
    }

    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

/// External payment integration.
pub trait PurchaseProvider {
    /// Run the purchase flow for `plan` and report the resulting entitlement.
    fn confirm_purchase(&mut self, plan: Plan) -> Result<Entitlement, PurchaseError>;

    /// Look up a previous purchase; `Ok(None)` when there is nothing to restore.
    fn restore_purchases(&mut self) -> Result<Option<Entitlement>, PurchaseError>;
}

/// A tip-jar entry. Display only; there is no purchase path for tips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TipOption {
    pub id: &'static str,
    pub label: &'static str,
    pub price: &'static str,
    pub caption: &'static str,
}

pub const TIP_OPTIONS: [TipOption; 3] = [
    TipOption {
        id: "tip.small",
        label: "Petit tip",
        price: "0,99 €",
        caption: "Un thé au monastère",
    },
    TipOption {
        id: "tip.medium",
        label: "Tip zen",
        price: "2,99 €",
        caption: "Un encens de gratitude",
    },
    TipOption {
        id: "tip.large",
        label: "Grand merci",
        price: "4,99 €",
        caption: "Une offrande lumineuse",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifetime_is_the_default_plan() {
        assert_eq!(Plan::default(), Plan::Lifetime);
        assert_eq!(Plan::Lifetime.price_label(), "$4.99 lifetime");
        assert_eq!(Plan::Monthly.price_label(), "$0.99 / month");
    }

    #[test]
    fn plan_parses_case_insensitively() {
        assert_eq!("Monthly".parse::<Plan>(), Ok(Plan::Monthly));
        assert_eq!(" lifetime ".parse::<Plan>(), Ok(Plan::Lifetime));
        assert!("weekly".parse::<Plan>().is_err());
    }

    #[test]
    fn only_cancellation_is_not_retryable() {
        assert!(!PurchaseError::Cancelled.is_retryable());
        assert!(PurchaseError::Rejected("card declined".into()).is_retryable());
        assert!(PurchaseError::Unavailable("offline".into()).is_retryable());
        assert_eq!(
            PurchaseError::Unavailable("offline".into()).code(),
            ErrorCode::PurchaseUnavailable
        );
    }

    #[test]
    fn tip_ids_are_unique() {
        let mut ids: Vec<&str> = TIP_OPTIONS.iter().map(|t| t.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), TIP_OPTIONS.len());
    }
}
