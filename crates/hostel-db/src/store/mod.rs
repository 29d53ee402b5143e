//! # Unit Stores
//!
//! The durable "load everything / save everything" capability the ledger
//! depends on, plus its backends.
//!
//! ## Store Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Ledger ↔ Store Contract                              │
//! │                                                                         │
//! │  CheckoutLedger                                                        │
//! │       │                                                                 │
//! │       │  open():      store.load()   → Option<Vec<UnitRecord>>         │
//! │       │  checkout():  store.save(&full_unit_set)                       │
//! │       │  release():   store.save(&full_unit_set)                       │
//! │       ▼                                                                 │
//! │  dyn UnitStore                                                         │
//! │  ├── JsonFileStore   one JSON array, temp file + rename                │
//! │  ├── SqliteStore     `units` table, one transaction per save           │
//! │  └── MemoryStore     in-process, for tests                             │
//! │                                                                         │
//! │  The ledger never knows which backend it is talking to.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Stores
//!
//! - [`JsonFileStore`] - Flat JSON snapshot file
//! - [`SqliteStore`] - SQLite database via sqlx
//! - [`MemoryStore`] - In-memory, with failure injection

pub mod json;
pub mod memory;
pub mod sqlite;

pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use sqlite::{SqliteConfig, SqliteStore};

use async_trait::async_trait;
use hostel_core::UnitRecord;

use crate::error::StoreResult;

/// Durable storage for the full unit set.
///
/// Implementations must make `save` all-or-nothing: after a crash the store
/// holds either the previous set or the new one.
#[async_trait]
pub trait UnitStore: Send + Sync + std::fmt::Debug {
    /// Loads every persisted unit.
    ///
    /// ## Returns
    /// * `Ok(None)` - Nothing was ever provisioned
    /// * `Ok(Some(records))` - The last saved set
    async fn load(&self) -> StoreResult<Option<Vec<UnitRecord>>>;

    /// Durably replaces the persisted set with `records`.
    async fn save(&self, records: &[UnitRecord]) -> StoreResult<()>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}
