//! dailyzen-core library.
//!
//! Picks one quote per calendar day from a fixed catalog, keeps a locally
//! persisted set of favorites behind a premium paywall, and schedules a
//! daily reminder. Platform services (payments, notifications, the share
//! sheet) are traits implemented by the embedding application.
//!
//! # Conventions
//!
//! - **Errors**: each module has its own `thiserror` enum with a `code()`
//!   mapping to a stable [`error::ErrorCode`]; `anyhow::Result` only for
//!   config and catalog loading.
//! - **Logging**: `tracing` macros. Storage and scheduling failures are
//!   logged and degrade to defaults rather than propagating.

pub mod config;
pub mod entitlement;
pub mod error;
pub mod favorites;
pub mod gate;
pub mod lock;
pub mod purchase;
pub mod quote;
pub mod reminder;
pub mod session;
pub mod share;
pub mod store;

pub use session::Session;
