//! # Domain Types
//!
//! Core domain types used throughout Hostel Ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Unit       │   │    UnitState    │   │      Hold       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (u32)       │──►│  Available      │   │  holder         │       │
//! │  │  state          │   │  CheckedOut ────┼──►│  checked_out_at │       │
//! │  └─────────────────┘   └─────────────────┘   │  due_at         │       │
//! │                                              │  location       │       │
//! │                                              └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   UnitRecord    │   │  LedgerSummary  │   │ CheckoutRequest │       │
//! │  │  (flat, wire +  │   │  total          │   │  (request body) │       │
//! │  │   persisted)    │   │  available      │   │                 │       │
//! │  └─────────────────┘   │  checked_out    │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why a Sum Type?
//! A unit either has all four borrow fields (holder, checked-out time, due
//! time, location) or none of them. `UnitState::CheckedOut(Hold)` makes any
//! other combination unrepresentable. The flat `UnitRecord` exists only at the
//! boundary (JSON, SQLite, TypeScript) and is converted with `TryFrom`, which
//! rejects inconsistent rows.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{LedgerError, LedgerResult};

// =============================================================================
// Unit Status
// =============================================================================

/// Availability of a unit, as seen by callers and stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    /// Free to be checked out.
    Available,
    /// Held by someone until released.
    CheckedOut,
}

impl std::fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitStatus::Available => write!(f, "available"),
            UnitStatus::CheckedOut => write!(f, "checked_out"),
        }
    }
}

impl std::str::FromStr for UnitStatus {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "available" | "free" => Ok(UnitStatus::Available),
            "checked_out" | "checkedout" | "borrowed" => Ok(UnitStatus::CheckedOut),
            other => Err(crate::error::ValidationError::InvalidFormat {
                field: "status".to_string(),
                reason: format!("unknown status '{}'", other),
            }),
        }
    }
}

// =============================================================================
// Hold
// =============================================================================

/// The borrow data attached to a checked-out unit.
///
/// Fields are private so a `Hold` with `due_at <= checked_out_at` cannot be
/// built outside this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hold {
    holder: String,
    checked_out_at: DateTime<Utc>,
    due_at: DateTime<Utc>,
    location: String,
}

impl Hold {
    /// Builds a hold, rejecting a due time that is not after the checkout time.
    pub(crate) fn new(
        unit_id: u32,
        holder: String,
        location: String,
        checked_out_at: DateTime<Utc>,
        due_at: DateTime<Utc>,
    ) -> LedgerResult<Self> {
        if due_at <= checked_out_at {
            return Err(LedgerError::corrupt(
                unit_id,
                "dueAt must be after checkedOutAt",
            ));
        }
        Ok(Hold {
            holder,
            checked_out_at,
            due_at,
            location,
        })
    }

    /// Who currently holds the unit.
    pub fn holder(&self) -> &str {
        &self.holder
    }

    /// When the unit was checked out.
    pub fn checked_out_at(&self) -> DateTime<Utc> {
        self.checked_out_at
    }

    /// When the unit is expected back.
    pub fn due_at(&self) -> DateTime<Utc> {
        self.due_at
    }

    /// Where the unit currently is (free text, may be empty).
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Length of the hold (`due_at - checked_out_at`).
    pub fn duration(&self) -> Duration {
        self.due_at - self.checked_out_at
    }
}

// =============================================================================
// Unit
// =============================================================================

/// Per-unit state: free, or held under a [`Hold`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitState {
    Available,
    CheckedOut(Hold),
}

/// One resource instance of the shared pool.
///
/// Serialized through [`UnitRecord`], so JSON always has the flat layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "UnitRecord", try_from = "UnitRecord")]
pub struct Unit {
    id: u32,
    state: UnitState,
}

impl Unit {
    /// Creates an available unit with no hold.
    pub fn available(id: u32) -> Self {
        Unit {
            id,
            state: UnitState::Available,
        }
    }

    pub(crate) fn with_state(id: u32, state: UnitState) -> Self {
        Unit { id, state }
    }

    /// Stable unit id (1..N).
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub fn state(&self) -> &UnitState {
        &self.state
    }

    /// Status derived from the state.
    pub fn status(&self) -> UnitStatus {
        match self.state {
            UnitState::Available => UnitStatus::Available,
            UnitState::CheckedOut(_) => UnitStatus::CheckedOut,
        }
    }

    /// The current hold, if checked out.
    pub fn hold(&self) -> Option<&Hold> {
        match &self.state {
            UnitState::Available => None,
            UnitState::CheckedOut(hold) => Some(hold),
        }
    }

    #[inline]
    pub fn is_available(&self) -> bool {
        matches!(self.state, UnitState::Available)
    }
}

// =============================================================================
// Unit Record (wire + persisted layout)
// =============================================================================

/// Flat representation of a unit.
///
/// This is what the JSON snapshot, the SQLite `units` table and the frontend
/// see. Borrow fields are `null` when the unit is available.
///
/// ```json
/// {
///   "unitId": 2,
///   "status": "checked_out",
///   "holder": "Alice",
///   "checkedOutAt": "2026-10-16T09:00:00Z",
///   "dueAt": "2026-10-16T11:00:00Z",
///   "location": "Room 101"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UnitRecord {
    pub unit_id: u32,
    pub status: UnitStatus,
    pub holder: Option<String>,
    #[ts(as = "Option<String>")]
    pub checked_out_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub due_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
}

impl From<Unit> for UnitRecord {
    fn from(unit: Unit) -> Self {
        UnitRecord::from(&unit)
    }
}

impl From<&Unit> for UnitRecord {
    fn from(unit: &Unit) -> Self {
        match unit.hold() {
            None => UnitRecord {
                unit_id: unit.id,
                status: UnitStatus::Available,
                holder: None,
                checked_out_at: None,
                due_at: None,
                location: None,
            },
            Some(hold) => UnitRecord {
                unit_id: unit.id,
                status: UnitStatus::CheckedOut,
                holder: Some(hold.holder.clone()),
                checked_out_at: Some(hold.checked_out_at),
                due_at: Some(hold.due_at),
                location: Some(hold.location.clone()),
            },
        }
    }
}

impl TryFrom<UnitRecord> for Unit {
    type Error = LedgerError;

    /// Rebuilds a unit from its flat record.
    ///
    /// ## Rejected Records
    /// - `unitId` of 0
    /// - `available` with any borrow field set
    /// - `checked_out` with any borrow field missing or an empty holder
    /// - `dueAt` not after `checkedOutAt`
    ///
    /// A missing `location` on an available unit may also come through as an
    /// empty string from older snapshots; that is treated as absent.
    fn try_from(record: UnitRecord) -> Result<Self, Self::Error> {
        let id = record.unit_id;
        if id == 0 {
            return Err(LedgerError::corrupt(id, "unitId must be positive"));
        }

        match record.status {
            UnitStatus::Available => {
                let stale_location = record.location.as_deref().is_some_and(|l| !l.is_empty());
                if record.holder.is_some()
                    || record.checked_out_at.is_some()
                    || record.due_at.is_some()
                    || stale_location
                {
                    return Err(LedgerError::corrupt(
                        id,
                        "available unit carries borrow fields",
                    ));
                }
                Ok(Unit::available(id))
            }
            UnitStatus::CheckedOut => {
                let (Some(holder), Some(checked_out_at), Some(due_at), Some(location)) = (
                    record.holder,
                    record.checked_out_at,
                    record.due_at,
                    record.location,
                ) else {
                    return Err(LedgerError::corrupt(
                        id,
                        "checked-out unit is missing borrow fields",
                    ));
                };
                if holder.trim().is_empty() {
                    return Err(LedgerError::corrupt(id, "holder is empty"));
                }
                let hold = Hold::new(id, holder, location, checked_out_at, due_at)?;
                Ok(Unit::with_state(id, UnitState::CheckedOut(hold)))
            }
        }
    }
}

// =============================================================================
// Summary
// =============================================================================

/// Pool counts, always computed from the units themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    pub total: usize,
    pub available_count: usize,
    pub checked_out_count: usize,
}

/// What the read endpoint returns: summary plus the unit list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    pub summary: LedgerSummary,
    pub units: Vec<UnitRecord>,
}

// =============================================================================
// Checkout Request
// =============================================================================

/// A checkout request body as sent by the HTTP layer.
///
/// `unitId` is signed so that `0` or negative ids reach validation and come
/// back as `InvalidInput` instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub unit_id: i64,
    pub holder: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub duration_hours: Option<f64>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap()
    }

    fn checked_out_record() -> UnitRecord {
        UnitRecord {
            unit_id: 2,
            status: UnitStatus::CheckedOut,
            holder: Some("Alice".to_string()),
            checked_out_at: Some(t0()),
            due_at: Some(t0() + Duration::hours(2)),
            location: Some("Room 101".to_string()),
        }
    }

    #[test]
    fn test_available_unit_record_has_no_borrow_fields() {
        let record = UnitRecord::from(Unit::available(1));
        assert_eq!(record.status, UnitStatus::Available);
        assert!(record.holder.is_none());
        assert!(record.checked_out_at.is_none());
        assert!(record.due_at.is_none());
        assert!(record.location.is_none());
    }

    #[test]
    fn test_checked_out_record_converts() {
        let unit = Unit::try_from(checked_out_record()).unwrap();
        assert_eq!(unit.status(), UnitStatus::CheckedOut);
        let hold = unit.hold().unwrap();
        assert_eq!(hold.holder(), "Alice");
        assert_eq!(hold.location(), "Room 101");
        assert_eq!(hold.duration(), Duration::hours(2));
    }

    #[test]
    fn test_inconsistent_records_are_rejected() {
        // Marked unavailable with no borrower
        let mut record = checked_out_record();
        record.holder = None;
        assert!(matches!(
            Unit::try_from(record),
            Err(LedgerError::CorruptRecord { unit_id: 2, .. })
        ));

        // Available with stale borrow fields
        let mut record = checked_out_record();
        record.status = UnitStatus::Available;
        assert!(Unit::try_from(record).is_err());

        // Due before checkout
        let mut record = checked_out_record();
        record.due_at = Some(t0() - Duration::minutes(1));
        assert!(Unit::try_from(record).is_err());

        // Zero id
        let record = UnitRecord::from(Unit::available(1));
        let record = UnitRecord { unit_id: 0, ..record };
        assert!(Unit::try_from(record).is_err());
    }

    #[test]
    fn test_available_with_empty_location_is_accepted() {
        let record = UnitRecord {
            location: Some(String::new()),
            ..UnitRecord::from(Unit::available(4))
        };
        assert_eq!(Unit::try_from(record).unwrap(), Unit::available(4));
    }

    #[test]
    fn test_unit_json_layout() {
        let json = serde_json::to_value(Unit::available(3)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "unitId": 3,
                "status": "available",
                "holder": null,
                "checkedOutAt": null,
                "dueAt": null,
                "location": null
            })
        );

        let unit: Unit = serde_json::from_value(serde_json::to_value(checked_out_record()).unwrap())
            .unwrap();
        assert_eq!(unit.hold().unwrap().holder(), "Alice");
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("available".parse::<UnitStatus>().unwrap(), UnitStatus::Available);
        assert_eq!("borrowed".parse::<UnitStatus>().unwrap(), UnitStatus::CheckedOut);
        assert!("lost".parse::<UnitStatus>().is_err());
    }

    #[test]
    fn test_checkout_request_defaults() {
        let req: CheckoutRequest =
            serde_json::from_str(r#"{"unitId": 1, "holder": "Bob"}"#).unwrap();
        assert_eq!(req.location, "");
        assert_eq!(req.duration_hours, None);
    }
}
