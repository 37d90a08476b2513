//! Terminal stand-ins for the platform services the core library expects.

use std::env;
use std::sync::Arc;

use dailyzen_core::purchase::{Entitlement, Plan, PurchaseError, PurchaseProvider};
use dailyzen_core::share::{ShareError, ShareSheet};
use dailyzen_core::store::{KeyValueStore, load_record};
use serde::{Deserialize, Serialize};

/// Forces the sandbox purchase result: `grant`, `cancel`, `reject` or
/// `unavailable`.
pub const SANDBOX_OUTCOME_ENV: &str = "DAILYZEN_SANDBOX_OUTCOME";

const RECEIPT_KEY: &str = "sandbox-receipt";

#[derive(Debug, Serialize, Deserialize)]
struct Receipt {
    plan: String,
}

/// Purchase provider that never charges anything.
///
/// With `[purchases] sandbox = false` there is no provider at all and every
/// purchase reports `Unavailable`. Granted purchases leave a receipt in the
/// data directory so `zen restore` can find them again.
pub struct SandboxProvider {
    enabled: bool,
    outcome: Option<String>,
    receipts: Arc<dyn KeyValueStore>,
}

impl SandboxProvider {
    pub fn new(enabled: bool, receipts: Arc<dyn KeyValueStore>) -> Self {
        Self {
            enabled,
            outcome: env::var(SANDBOX_OUTCOME_ENV).ok(),
            receipts,
        }
    }

    fn check_available(&self) -> Result<(), PurchaseError> {
        if self.enabled {
            Ok(())
        } else {
            Err(PurchaseError::Unavailable(
                "no payment provider configured (set [purchases] sandbox = true)".into(),
            ))
        }
    }
}

impl PurchaseProvider for SandboxProvider {
    fn confirm_purchase(&mut self, plan: Plan) -> Result<Entitlement, PurchaseError> {
        self.check_available()?;
        match self.outcome.as_deref().map(str::trim) {
            Some("cancel") => return Err(PurchaseError::Cancelled),
            Some("reject") => return Err(PurchaseError::Rejected("sandbox card declined".into())),
            Some("unavailable") => {
                return Err(PurchaseError::Unavailable("sandbox store offline".into()));
            }
            _ => {}
        }

        let receipt = Receipt {
            plan: plan.as_str().to_string(),
        };
        let raw = serde_json::to_string(&receipt).map_err(|e| PurchaseError::Provider(e.to_string()))?;
        if let Err(err) = self.receipts.write(RECEIPT_KEY, &raw) {
            tracing::warn!(error = %err, "sandbox receipt not saved; restore will not find it");
        }
        tracing::info!(%plan, "sandbox purchase confirmed");
        Ok(Entitlement {
            plan,
            premium: true,
        })
    }

    fn restore_purchases(&mut self) -> Result<Option<Entitlement>, PurchaseError> {
        self.check_available()?;
        let receipt: Option<Receipt> = load_record(self.receipts.as_ref(), RECEIPT_KEY)
            .map_err(|e| PurchaseError::Provider(e.to_string()))?;
        Ok(receipt.and_then(|r| r.plan.parse::<Plan>().ok()).map(|plan| Entitlement {
            plan,
            premium: true,
        }))
    }
}

/// Share sheet for a terminal: the message is captured and printed by the
/// command in the active output mode.
#[derive(Debug, Default)]
pub struct TerminalShareSheet {
    delivered: Option<String>,
}

impl TerminalShareSheet {
    pub fn delivered(&self) -> Option<&str> {
        self.delivered.as_deref()
    }
}

impl ShareSheet for TerminalShareSheet {
    fn share(&mut self, message: &str) -> Result<(), ShareError> {
        if message.is_empty() {
            return Err(ShareError::Cancelled);
        }
        self.delivered = Some(message.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dailyzen_core::store::MemoryStore;

    fn provider(enabled: bool, outcome: Option<&str>) -> (Arc<MemoryStore>, SandboxProvider) {
        let store = Arc::new(MemoryStore::new());
        let provider = SandboxProvider {
            enabled,
            outcome: outcome.map(str::to_string),
            receipts: store.clone(),
        };
        (store, provider)
    }

    #[test]
    fn grant_leaves_receipt_for_restore() {
        let (_, mut provider) = provider(true, None);
        assert_eq!(provider.restore_purchases().unwrap(), None);
        let ent = provider.confirm_purchase(Plan::Monthly).unwrap();
        assert!(ent.premium);
        assert_eq!(
            provider.restore_purchases().unwrap(),
            Some(Entitlement {
                plan: Plan::Monthly,
                premium: true
            })
        );
    }

    #[test]
    fn scripted_outcomes() {
        let (store, mut p) = provider(true, Some("cancel"));
        assert_eq!(p.confirm_purchase(Plan::Lifetime), Err(PurchaseError::Cancelled));
        assert!(store.raw(RECEIPT_KEY).is_none());

        let (_, mut p) = provider(true, Some("reject"));
        assert!(matches!(p.confirm_purchase(Plan::Lifetime), Err(PurchaseError::Rejected(_))));
    }

    #[test]
    fn disabled_sandbox_is_unavailable() {
        let (_, mut p) = provider(false, None);
        assert!(matches!(p.confirm_purchase(Plan::Lifetime), Err(PurchaseError::Unavailable(_))));
        assert!(matches!(p.restore_purchases(), Err(PurchaseError::Unavailable(_))));
    }

    #[test]
    fn share_sheet_captures_message() {
        let mut sheet = TerminalShareSheet::default();
        sheet.share("hello").unwrap();
        assert_eq!(sheet.delivered(), Some("hello"));
        assert_eq!(sheet.share(""), Err(ShareError::Cancelled));
    }
}
