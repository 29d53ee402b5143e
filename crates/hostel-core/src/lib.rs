//! # hostel-core: Pure Checkout Logic for Hostel Ledger
//!
//! This crate holds the shared-appliance ("iron") borrowing rules of the
//! hostel backend as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Hostel Ledger Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               HTTP layer (hostel backend, external)             │   │
//! │  │   GET /irons ──► POST /irons/borrow ──► POST /irons/return     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              hostel-db::CheckoutLedger (locks + store)          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ hostel-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  ledger   │  │ validation│  │   error   │  │   │
//! │  │   │ Unit/Hold │  │ check_out │  │  holder   │  │ LedgerErr │  │   │
//! │  │   │ UnitRecord│  │ release   │  │  duration │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CLOCK • NO DATABASE • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Unit, Hold, UnitRecord, LedgerSummary)
//! - [`ledger`] - Checkout/release transitions and pool reads
//! - [`validation`] - Request validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use hostel_core::ledger::{provision, summarize};
//!
//! let mut units = provision(3);
//! let now = Utc::now();
//!
//! units[1] = units[1].check_out("Alice", "Room 101", Duration::hours(2), now).unwrap();
//! assert!(units[1].check_out("Bob", "Room 102", Duration::hours(4), now).is_err());
//!
//! let summary = summarize(&units);
//! assert_eq!(summary.checked_out_count, 1);
//! assert_eq!(summary.available_count, 2);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{LedgerError, LedgerResult, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Hold length applied when the caller gives none (or a non-positive one).
pub const DEFAULT_HOLD_HOURS: i64 = 4;

/// Upper bound on the configured default hold (one week). Callers may still
/// request longer holds explicitly.
pub const MAX_DEFAULT_HOLD_HOURS: i64 = 168;

/// Number of units provisioned into an empty store.
pub const DEFAULT_UNIT_COUNT: u32 = 5;

/// Upper bound on the pool size accepted from configuration.
pub const MAX_UNIT_COUNT: u32 = 1000;

/// Maximum holder length in characters.
pub const MAX_HOLDER_LEN: usize = 100;

/// Maximum location length in characters.
pub const MAX_LOCATION_LEN: usize = 200;
