//! # Checkout Ledger Service
//!
//! The owned, shareable handle that request handlers call into.
//!
//! ## Locking & Persistence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    checkout(unit 2, "Alice", ...)                       │
//! │                                                                         │
//! │  1. validate input                  (no locks, no state touched)       │
//! │  2. lock slot[2]                    ← per-unit Mutex                   │
//! │  3. unit.check_out(...) → next      (pure, hostel-core)                │
//! │  4. lock mirror                     ← always AFTER a slot lock         │
//! │     mirror[2] = next (staged)                                          │
//! │     store.save(mirror)                                                 │
//! │       ├── Ok  → keep mirror, slot[2] = next, return next               │
//! │       └── Err → mirror[2] = previous, return Store error               │
//! │  5. unlock mirror, unlock slot[2]                                      │
//! │                                                                         │
//! │  Same unit:       step 2 serializes callers → one winner               │
//! │  Different units: independent slot locks; only the save itself is      │
//! │                   serialized, since it writes the full unit set        │
//! │  Readers:         read the mirror, so they only see durable state      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Steps 2-5 run on a spawned task. Dropping the caller's future does not
//! cancel them, so a save that reaches the store is always committed to
//! memory too, and memory never falls behind the store.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use hostel_core::ledger::{list_overdue, list_units, provision, summarize, verify_pool};
use hostel_core::validation::{
    default_hold_duration, validate_checkout, validate_unit_id, CheckoutInput,
};
use hostel_core::{
    CheckoutRequest, Inventory, LedgerError, LedgerSummary, Unit, UnitRecord, UnitStatus,
    DEFAULT_UNIT_COUNT,
};
use tokio::sync::{Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::{ServiceResult, StoreError};
use crate::store::UnitStore;

// =============================================================================
// Options
// =============================================================================

/// How to open a ledger.
#[derive(Debug, Clone)]
pub struct LedgerOptions {
    /// Units to provision when the store is empty. Ignored otherwise.
    pub unit_count: u32,

    /// Hold length used when a caller gives none.
    pub default_hold: Duration,

    /// Time source.
    pub clock: Arc<dyn Clock>,
}

impl Default for LedgerOptions {
    fn default() -> Self {
        LedgerOptions {
            unit_count: DEFAULT_UNIT_COUNT,
            default_hold: default_hold_duration(),
            clock: Arc::new(SystemClock),
        }
    }
}

impl LedgerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unit_count(mut self, count: u32) -> Self {
        self.unit_count = count;
        self
    }

    pub fn default_hold(mut self, hold: Duration) -> Self {
        self.default_hold = hold;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

// =============================================================================
// Ledger
// =============================================================================

#[derive(Debug)]
struct Shared {
    store: Arc<dyn UnitStore>,
    clock: Arc<dyn Clock>,
    default_hold: Duration,
    /// Unit ids in ascending order; position = slot index.
    ids: Vec<u32>,
    /// Live state per unit, the basis for every transition decision.
    slots: Vec<Mutex<Unit>>,
    /// Durable view of the full set, saved on every change.
    mirror: Mutex<Vec<Unit>>,
}

/// The checkout ledger: a fixed pool of units with exclusive, time-boxed
/// holds.
///
/// Cheap to clone; clones share the same pool. Hand it to request handlers
/// as application state.
///
/// ## Usage
/// ```rust,ignore
/// let store = Arc::new(JsonFileStore::new("./data/units.json"));
/// let ledger = CheckoutLedger::open(store, LedgerOptions::new().unit_count(5)).await?;
///
/// let unit = ledger.checkout(2, "Alice", "Room 101", Some(2.0)).await?;
/// ledger.release(2).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CheckoutLedger {
    shared: Arc<Shared>,
}

impl CheckoutLedger {
    /// Loads the pool from `store`, provisioning it first if the store is
    /// empty.
    ///
    /// ## Errors
    /// - `Store` if loading or the initial save fails
    /// - `CorruptRecord` if a stored record is inconsistent or ids collide
    /// - `InvalidInput` if the store is empty and `unit_count` is 0
    pub async fn open(store: Arc<dyn UnitStore>, options: LedgerOptions) -> ServiceResult<Self> {
        let units = match store.load().await? {
            None => {
                let count = validate_unit_id(i64::from(options.unit_count))?;
                let units = provision(count);
                let records: Vec<UnitRecord> = units.iter().map(UnitRecord::from).collect();
                store.save(&records).await?;
                info!(
                    backend = store.backend(),
                    count = count,
                    "Provisioned new unit pool"
                );
                units
            }
            Some(records) => {
                let mut units = records
                    .into_iter()
                    .map(Unit::try_from)
                    .collect::<Result<Vec<Unit>, LedgerError>>()?;
                units.sort_by_key(Unit::id);
                verify_pool(&units)?;

                if units.len() != options.unit_count as usize {
                    warn!(
                        stored = units.len(),
                        configured = options.unit_count,
                        "Stored pool size differs from configuration; keeping stored pool"
                    );
                }
                info!(
                    backend = store.backend(),
                    count = units.len(),
                    checked_out = units.iter().filter(|u| !u.is_available()).count(),
                    "Loaded unit pool"
                );
                units
            }
        };

        let ids = units.iter().map(Unit::id).collect();
        let slots = units.iter().cloned().map(Mutex::new).collect();

        Ok(CheckoutLedger {
            shared: Arc::new(Shared {
                store,
                clock: options.clock,
                default_hold: options.default_hold,
                ids,
                slots,
                mirror: Mutex::new(units),
            }),
        })
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Checks out a unit to `holder` for `duration_hours` (default 4h when
    /// absent or non-positive).
    ///
    /// ## Errors
    /// - `InvalidInput` - bad id, empty holder, malformed duration
    /// - `NotFound` - no such unit
    /// - `AlreadyCheckedOut` - someone else holds it
    /// - `Store` - the change could not be persisted; nothing changed
    pub async fn checkout(
        &self,
        unit_id: i64,
        holder: &str,
        location: &str,
        duration_hours: Option<f64>,
    ) -> ServiceResult<Unit> {
        self.checkout_request(&CheckoutRequest {
            unit_id,
            holder: holder.to_string(),
            location: location.to_string(),
            duration_hours,
        })
        .await
    }

    /// Same as [`checkout`](Self::checkout), straight from a request body.
    pub async fn checkout_request(&self, request: &CheckoutRequest) -> ServiceResult<Unit> {
        let input = validate_checkout(request, self.shared.default_hold)?;
        let ledger = self.clone();
        join_write(tokio::spawn(async move { ledger.checkout_validated(input).await })).await
    }

    async fn checkout_validated(&self, input: CheckoutInput) -> ServiceResult<Unit> {
        let index = self.index_of(input.unit_id)?;
        let mut slot = self.shared.slots[index].lock().await;

        let now = self.shared.clock.now();
        let next = match slot.check_out(&input.holder, &input.location, input.hold_for, now) {
            Ok(next) => next,
            Err(err) => {
                debug!(unit_id = input.unit_id, holder = %input.holder, error = %err, "Checkout rejected");
                return Err(err.into());
            }
        };

        self.persist(index, &next).await?;
        *slot = next.clone();

        if let Some(hold) = next.hold() {
            info!(
                unit_id = next.id(),
                holder = %hold.holder(),
                location = %hold.location(),
                due_at = %hold.due_at(),
                "Unit checked out"
            );
        }
        Ok(next)
    }

    /// Returns a checked-out unit to the pool.
    ///
    /// ## Errors
    /// - `InvalidInput` - non-positive id
    /// - `NotFound` - no such unit
    /// - `NotCheckedOut` - the unit is already available
    /// - `Store` - the change could not be persisted; nothing changed
    pub async fn release(&self, unit_id: i64) -> ServiceResult<Unit> {
        let unit_id = validate_unit_id(unit_id)?;
        let ledger = self.clone();
        join_write(tokio::spawn(async move { ledger.release_validated(unit_id).await })).await
    }

    async fn release_validated(&self, unit_id: u32) -> ServiceResult<Unit> {
        let index = self.index_of(unit_id)?;
        let mut slot = self.shared.slots[index].lock().await;

        let previous_holder = slot.hold().map(|h| h.holder().to_string());
        let next = match slot.release() {
            Ok(next) => next,
            Err(err) => {
                debug!(unit_id = unit_id, error = %err, "Release rejected");
                return Err(err.into());
            }
        };

        self.persist(index, &next).await?;
        *slot = next.clone();

        info!(
            unit_id = unit_id,
            holder = previous_holder.as_deref().unwrap_or_default(),
            "Unit released"
        );
        Ok(next)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Units ordered by ascending id, optionally only those with `filter`
    /// status.
    pub async fn list_units(&self, filter: Option<UnitStatus>) -> Vec<Unit> {
        let mirror = self.shared.mirror.lock().await;
        list_units(&mirror, filter)
    }

    /// Fresh counts over the whole pool.
    pub async fn summarize(&self) -> LedgerSummary {
        let mirror = self.shared.mirror.lock().await;
        summarize(&mirror)
    }

    /// Summary plus unit list, as returned by the read endpoint.
    ///
    /// Both halves come from the same snapshot, so the counts always match
    /// the unfiltered list.
    pub async fn inventory(&self, filter: Option<UnitStatus>) -> Inventory {
        let mirror = self.shared.mirror.lock().await;
        Inventory {
            summary: summarize(&mirror),
            units: list_units(&mirror, filter)
                .iter()
                .map(UnitRecord::from)
                .collect(),
        }
    }

    /// A single unit.
    pub async fn get_unit(&self, unit_id: i64) -> ServiceResult<Unit> {
        let unit_id = validate_unit_id(unit_id)?;
        let index = self.index_of(unit_id)?;
        let mirror = self.shared.mirror.lock().await;
        Ok(mirror[index].clone())
    }

    /// Checked-out units past their due time. Advisory: nothing is released.
    pub async fn list_overdue(&self) -> Vec<Unit> {
        let now = self.shared.clock.now();
        let mirror = self.shared.mirror.lock().await;
        list_overdue(&mirror, now)
    }

    /// Whether `unit` is past its due time according to this ledger's clock.
    pub fn is_overdue(&self, unit: &Unit) -> bool {
        unit.is_overdue(self.shared.clock.now())
    }

    /// Current time according to this ledger's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.shared.clock.now()
    }

    /// Number of units in the pool. Fixed for the ledger's lifetime.
    pub fn unit_count(&self) -> usize {
        self.shared.ids.len()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn index_of(&self, unit_id: u32) -> Result<usize, LedgerError> {
        self.shared
            .ids
            .binary_search(&unit_id)
            .map_err(|_| LedgerError::NotFound { unit_id })
    }

    /// Stages `next` into the mirror and saves the full set.
    ///
    /// Must be called with the slot lock for `index` held.
    async fn persist(&self, index: usize, next: &Unit) -> ServiceResult<()> {
        let staged = Staged::new(self.shared.mirror.lock().await, index, next.clone());
        let records: Vec<UnitRecord> = staged.mirror.iter().map(UnitRecord::from).collect();

        if let Err(err) = self.shared.store.save(&records).await {
            warn!(
                backend = self.shared.store.backend(),
                unit_id = next.id(),
                error = %err,
                "Failed to persist unit change; rolled back"
            );
            return Err(err.into());
        }

        staged.commit();
        Ok(())
    }
}

/// Waits for a spawned write. The task only fails to finish if it panicked
/// or the runtime is shutting down.
async fn join_write(handle: JoinHandle<ServiceResult<Unit>>) -> ServiceResult<Unit> {
    match handle.await {
        Ok(result) => result,
        Err(err) => Err(StoreError::Internal(format!("ledger write task failed: {err}")).into()),
    }
}

/// A mirror entry replaced but not yet durable.
///
/// Dropping it without [`commit`](Staged::commit) puts the previous unit
/// back.
struct Staged<'a> {
    mirror: MutexGuard<'a, Vec<Unit>>,
    index: usize,
    previous: Option<Unit>,
}

impl<'a> Staged<'a> {
    fn new(mut mirror: MutexGuard<'a, Vec<Unit>>, index: usize, next: Unit) -> Self {
        let previous = std::mem::replace(&mut mirror[index], next);
        Staged {
            mirror,
            index,
            previous: Some(previous),
        }
    }

    fn commit(mut self) {
        self.previous = None;
    }
}

impl Drop for Staged<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.mirror[self.index] = previous;
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
