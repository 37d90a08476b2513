use std::fmt;

/// Machine-readable error codes shared by the library and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    EmptyQuoteList,
    QuoteNotFound,
    InvalidQuoteId,
    PersistenceRead,
    PersistenceWrite,
    LockContention,
    PermissionDenied,
    SchedulerFailed,
    PurchaseCancelled,
    PurchaseRejected,
    PurchaseUnavailable,
    ShareCancelled,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::EmptyQuoteList => "E1002",
            Self::QuoteNotFound => "E2001",
            Self::InvalidQuoteId => "E2002",
            Self::PersistenceRead => "E3001",
            Self::PersistenceWrite => "E3002",
            Self::LockContention => "E3003",
            Self::PermissionDenied => "E4001",
            Self::SchedulerFailed => "E4002",
            Self::PurchaseCancelled => "E5001",
            Self::PurchaseRejected => "E5002",
            Self::PurchaseUnavailable => "E5003",
            Self::ShareCancelled => "E6001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::EmptyQuoteList => "Quote list is empty",
            Self::QuoteNotFound => "Quote not found",
            Self::InvalidQuoteId => "Invalid quote ID",
            Self::PersistenceRead => "Stored state could not be read",
            Self::PersistenceWrite => "Stored state could not be written",
            Self::LockContention => "Lock contention",
            Self::PermissionDenied => "Notification permission denied",
            Self::SchedulerFailed => "Reminder could not be scheduled",
            Self::PurchaseCancelled => "Purchase cancelled",
            Self::PurchaseRejected => "Purchase rejected",
            Self::PurchaseUnavailable => "Purchases unavailable",
            Self::ShareCancelled => "Share cancelled",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to the user.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in dailyzen/config.toml and retry."),
            Self::EmptyQuoteList => Some("Point [quotes] path at a file with at least one quote."),
            Self::QuoteNotFound => Some("Run `zen quotes` to list valid quote IDs."),
            Self::InvalidQuoteId => Some("Quote IDs are the numbers shown by `zen quotes`."),
            Self::PersistenceRead => Some("Defaults are in use; the next change rewrites the file."),
            Self::PersistenceWrite => Some("Check disk space and write permissions."),
            Self::LockContention => Some("Retry after the other `zen` process finishes."),
            Self::PermissionDenied => Some("Allow notifications to receive the daily reminder."),
            Self::SchedulerFailed => Some("Run `zen reminder on` to try again."),
            Self::PurchaseCancelled | Self::ShareCancelled => None,
            Self::PurchaseRejected => Some("No charge was made. Try again or pick another plan."),
            Self::PurchaseUnavailable => Some("Purchases are not available right now; try later."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }

    /// True for failures the user can simply retry.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::LockContention
                | Self::SchedulerFailed
                | Self::PurchaseRejected
                | Self::PurchaseUnavailable
                | Self::PersistenceWrite
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorCode;
    use std::collections::HashSet;

    const ALL: [ErrorCode; 14] = [
        ErrorCode::ConfigParseError,
        ErrorCode::EmptyQuoteList,
        ErrorCode::QuoteNotFound,
        ErrorCode::InvalidQuoteId,
        ErrorCode::PersistenceRead,
        ErrorCode::PersistenceWrite,
        ErrorCode::LockContention,
        ErrorCode::PermissionDenied,
        ErrorCode::SchedulerFailed,
        ErrorCode::PurchaseCancelled,
        ErrorCode::PurchaseRejected,
        ErrorCode::PurchaseUnavailable,
        ErrorCode::ShareCancelled,
        ErrorCode::InternalUnexpected,
    ];

    #[test]
    fn all_codes_are_unique() {
        let mut seen = HashSet::new();
        for code in ALL {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        for code in ALL {
            let raw = code.code();
            assert_eq!(raw.len(), 5);
            assert!(raw.starts_with('E'));
            assert!(raw.chars().skip(1).all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn cancellations_are_not_retryable_failures() {
        assert!(!ErrorCode::PurchaseCancelled.is_retryable());
        assert!(!ErrorCode::ShareCancelled.is_retryable());
        assert!(ErrorCode::PurchaseUnavailable.is_retryable());
    }
}
