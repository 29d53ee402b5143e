//! # hostel-db: Persistence and the Checkout Ledger Service
//!
//! This crate owns everything with I/O: unit stores, configuration, and the
//! concurrent [`CheckoutLedger`] handle the HTTP layer calls into.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Hostel Ledger Data Flow                            │
//! │                                                                         │
//! │  HTTP route (POST /units/2/checkout)                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     hostel-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ CheckoutLedger│    │  UnitStore    │    │  Migrations  │  │   │
//! │  │   │ (ledger.rs)   │    │  (store/)     │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ per-unit locks│───►│ JsonFileStore │    │ 001_units.sql│  │   │
//! │  │   │ save-then-    │    │ SqliteStore   │    │              │  │   │
//! │  │   │ commit        │    │ MemoryStore   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │          │                                                      │   │
//! │  │          ▼                                                      │   │
//! │  │   hostel-core (pure transitions, validation, summaries)         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`ledger`] - The shared ledger handle
//! - [`store`] - `UnitStore` trait and its backends
//! - [`config`] - `ledger.toml` + `HOSTEL_*` environment overrides
//! - [`migrations`] - Embedded SQLite migrations
//! - [`clock`] - Time source (fixed in tests)
//! - [`error`] - Store, service and config errors
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hostel_db::{CheckoutLedger, LedgerConfig};
//!
//! let config = LedgerConfig::load(None)?;
//! let store = config.store.open().await?;
//! let ledger = CheckoutLedger::open(store, config.ledger_options()).await?;
//!
//! ledger.checkout(2, "Alice", "Room 101", Some(2.0)).await?;
//! let inventory = ledger.inventory(None).await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod clock;
pub mod config;
pub mod error;
pub mod ledger;
pub mod migrations;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{LedgerConfig, StoreBackend, StoreSettings};
pub use error::{ConfigError, ServiceError, ServiceResult, StoreError, StoreResult};
pub use ledger::{CheckoutLedger, LedgerOptions};
pub use store::{JsonFileStore, MemoryStore, SqliteStore, UnitStore};
