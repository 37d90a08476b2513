//! Share-message composition and the share-sheet seam.

use serde::Serialize;

use crate::error::ErrorCode;
use crate::quote::QuoteWithId;

/// `“text” — author (signature)`.
#[must_use]
pub fn compose_share_message(quote: &QuoteWithId, signature: &str) -> String {
    format!(
        "\u{201c}{}\u{201d} \u{2014} {} ({})",
        quote.text, quote.author, signature
    )
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShareError {
    #[error("{}: share cancelled", ErrorCode::ShareCancelled.code())]
    Cancelled,
    #[error("{}: sharing unavailable: {}", ErrorCode::InternalUnexpected.code(), .0)]
    Unavailable(String),
}

impl ShareError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Cancelled => ErrorCode::ShareCancelled,
            Self::Unavailable(_) => ErrorCode::InternalUnexpected,
        }
    }
}

/// Platform share sheet. Takes one composed string, returns nothing.
pub trait ShareSheet {
    /// # Errors
    ///
    /// [`ShareError::Cancelled`] when the user backed out.
    fn share(&mut self, message: &str) -> Result<(), ShareError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareOutcome {
    Shared,
    Dismissed,
    Failed,
}

/// Compose and hand off. Never fails: cancellation is `Dismissed`, other
/// errors are logged and reported as `Failed`.
pub fn share_quote(sheet: &mut dyn ShareSheet, quote: &QuoteWithId, signature: &str) -> ShareOutcome {
    let message = compose_share_message(quote, signature);
    match sheet.share(&message) {
        Ok(()) => {
            tracing::debug!(quote = %quote.id, "quote shared");
            ShareOutcome::Shared
        }
        Err(ShareError::Cancelled) => ShareOutcome::Dismissed,
        Err(err) => {
            tracing::warn!(code = %err.code(), error = %err, "share failed");
            ShareOutcome::Failed
        }
    }
}
