//! # Ledger Rules
//!
//! The two-state checkout cycle and the pure reads over a unit pool.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Unit Lifecycle                                     │
//! │                                                                         │
//! │   provision(N)                                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌───────────┐   check_out(holder, location, hold_for, now)            │
//! │  │ Available │ ─────────────────────────────────────────┐              │
//! │  └───────────┘                                          ▼              │
//! │       ▲                                          ┌──────────────┐      │
//! │       │              release()                   │  CheckedOut  │      │
//! │       └───────────────────────────────────────── │  (Hold)      │      │
//! │                                                  └──────────────┘      │
//! │                                                                         │
//! │  check_out on CheckedOut  → AlreadyCheckedOut (first caller wins)      │
//! │  release on Available     → NotCheckedOut                              │
//! │  due_at passing           → nothing happens (is_overdue is advisory)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Transitions return a new [`Unit`] and never touch `self`, so a failed call
//! cannot leave a half-updated unit behind. Making the transition atomic with
//! respect to concurrent callers is the job of the owner of the units
//! (`hostel_db::CheckoutLedger`).

use chrono::{DateTime, Duration, Utc};

use crate::error::{LedgerError, LedgerResult, ValidationError};
use crate::types::{Hold, LedgerSummary, Unit, UnitState, UnitStatus};

// =============================================================================
// Transitions
// =============================================================================

impl Unit {
    /// Available → CheckedOut.
    ///
    /// ## Arguments
    /// * `holder` - Validated borrower identifier
    /// * `location` - Where the unit is going (may be empty)
    /// * `hold_for` - Hold length, must be positive
    /// * `now` - Checkout time; `due_at = now + hold_for`
    pub fn check_out(
        &self,
        holder: impl Into<String>,
        location: impl Into<String>,
        hold_for: Duration,
        now: DateTime<Utc>,
    ) -> LedgerResult<Unit> {
        if let Some(hold) = self.hold() {
            return Err(LedgerError::AlreadyCheckedOut {
                unit_id: self.id(),
                holder: hold.holder().to_string(),
            });
        }

        if hold_for <= Duration::zero() {
            return Err(ValidationError::MustBePositive {
                field: "durationHours".to_string(),
            }
            .into());
        }

        let due_at = now
            .checked_add_signed(hold_for)
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "durationHours".to_string(),
                reason: "due time is out of range".to_string(),
            })?;

        let hold = Hold::new(self.id(), holder.into(), location.into(), now, due_at)?;
        Ok(Unit::with_state(self.id(), UnitState::CheckedOut(hold)))
    }

    /// CheckedOut → Available.
    pub fn release(&self) -> LedgerResult<Unit> {
        match self.state() {
            UnitState::Available => Err(LedgerError::NotCheckedOut { unit_id: self.id() }),
            UnitState::CheckedOut(_) => Ok(Unit::available(self.id())),
        }
    }

    /// `now > due_at`. Always false for available units.
    ///
    /// Informational only: an overdue unit stays checked out until someone
    /// releases it.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.hold().is_some_and(|hold| now > hold.due_at())
    }
}

// =============================================================================
// Pool Operations
// =============================================================================

/// Creates a fresh pool of `count` available units with ids `1..=count`.
pub fn provision(count: u32) -> Vec<Unit> {
    (1..=count).map(Unit::available).collect()
}

/// Checks a loaded pool before it is put into service.
///
/// ## Rules
/// - At least one unit
/// - Ids strictly ascending, hence unique
///
/// Field consistency is already guaranteed by the [`Unit`] type.
pub fn verify_pool(units: &[Unit]) -> LedgerResult<()> {
    if units.is_empty() {
        return Err(LedgerError::corrupt(0, "pool has no units"));
    }

    for pair in units.windows(2) {
        if pair[1].id() <= pair[0].id() {
            return Err(LedgerError::corrupt(
                pair[1].id(),
                format!("unit ids out of order or duplicated after {}", pair[0].id()),
            ));
        }
    }

    Ok(())
}

/// Units ordered by ascending id, optionally filtered by status.
pub fn list_units(units: &[Unit], filter: Option<UnitStatus>) -> Vec<Unit> {
    let mut listed: Vec<Unit> = units
        .iter()
        .filter(|unit| filter.map_or(true, |status| unit.status() == status))
        .cloned()
        .collect();
    listed.sort_by_key(Unit::id);
    listed
}

/// Counts per status. Computed on every call, never cached.
pub fn summarize(units: &[Unit]) -> LedgerSummary {
    let checked_out_count = units.iter().filter(|unit| !unit.is_available()).count();
    LedgerSummary {
        total: units.len(),
        available_count: units.len() - checked_out_count,
        checked_out_count,
    }
}

/// Checked-out units whose due time has passed, ascending id.
pub fn list_overdue(units: &[Unit], now: DateTime<Utc>) -> Vec<Unit> {
    list_units(units, Some(UnitStatus::CheckedOut))
        .into_iter()
        .filter(|unit| unit.is_overdue(now))
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UnitRecord;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap()
    }

    /// Status matches the presence of all four borrow fields.
    fn assert_consistent(unit: &Unit) {
        let record = UnitRecord::from(unit);
        let present = [
            record.holder.is_some(),
            record.checked_out_at.is_some(),
            record.due_at.is_some(),
            record.location.is_some(),
        ];
        match record.status {
            UnitStatus::Available => assert!(present.iter().all(|p| !p)),
            UnitStatus::CheckedOut => {
                assert!(present.iter().all(|p| *p));
                assert!(record.due_at > record.checked_out_at);
            }
        }
    }

    #[test]
    fn test_provision() {
        let units = provision(3);
        assert_eq!(units.iter().map(Unit::id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(units.iter().all(Unit::is_available));
        units.iter().for_each(assert_consistent);
        assert!(verify_pool(&units).is_ok());
    }

    #[test]
    fn test_check_out_available_unit() {
        let unit = Unit::available(2);
        let held = unit
            .check_out("Alice", "Room 101", Duration::hours(2), t0())
            .unwrap();

        assert_eq!(held.status(), UnitStatus::CheckedOut);
        let hold = held.hold().unwrap();
        assert_eq!(hold.holder(), "Alice");
        assert_eq!(hold.location(), "Room 101");
        assert_eq!(hold.checked_out_at(), t0());
        assert_eq!(hold.due_at() - hold.checked_out_at(), Duration::hours(2));
        assert_consistent(&held);

        // Original is untouched
        assert!(unit.is_available());
    }

    #[test]
    fn test_check_out_held_unit_fails() {
        let held = Unit::available(2)
            .check_out("Alice", "Room 101", Duration::hours(2), t0())
            .unwrap();

        let err = held
            .check_out("Bob", "Room 102", Duration::hours(4), t0())
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::AlreadyCheckedOut {
                unit_id: 2,
                holder: "Alice".to_string()
            }
        );
        assert_eq!(held.hold().unwrap().holder(), "Alice");
    }

    #[test]
    fn test_check_out_rejects_non_positive_hold() {
        let err = Unit::available(1)
            .check_out("Alice", "", Duration::zero(), t0())
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidInput(_)));
    }

    #[test]
    fn test_release() {
        let held = Unit::available(2)
            .check_out("Alice", "Room 101", Duration::hours(2), t0())
            .unwrap();

        let released = held.release().unwrap();
        assert_eq!(released, Unit::available(2));
        assert_consistent(&released);

        assert_eq!(
            released.release().unwrap_err(),
            LedgerError::NotCheckedOut { unit_id: 2 }
        );
    }

    #[test]
    fn test_is_overdue() {
        let held = Unit::available(1)
            .check_out("Alice", "", Duration::hours(1), t0())
            .unwrap();

        assert!(!held.is_overdue(t0()));
        assert!(!held.is_overdue(t0() + Duration::hours(1)));
        assert!(held.is_overdue(t0() + Duration::hours(1) + Duration::seconds(1)));
        assert!(!Unit::available(1).is_overdue(t0() + Duration::days(30)));
    }

    #[test]
    fn test_list_and_summarize() {
        let mut units = provision(4);
        units[2] = units[2]
            .check_out("Alice", "Room 101", Duration::hours(1), t0())
            .unwrap();
        units[0] = units[0]
            .check_out("Bob", "Room 7", Duration::hours(8), t0())
            .unwrap();
        units.reverse();

        let all = list_units(&units, None);
        assert_eq!(all.iter().map(Unit::id).collect::<Vec<_>>(), vec![1, 2, 3, 4]);

        let out = list_units(&units, Some(UnitStatus::CheckedOut));
        assert_eq!(out.iter().map(Unit::id).collect::<Vec<_>>(), vec![1, 3]);

        let free = list_units(&units, Some(UnitStatus::Available));
        assert_eq!(free.iter().map(Unit::id).collect::<Vec<_>>(), vec![2, 4]);

        let summary = summarize(&units);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.checked_out_count, 2);
        assert_eq!(
            summary.available_count + summary.checked_out_count,
            summary.total
        );

        let overdue = list_overdue(&units, t0() + Duration::hours(2));
        assert_eq!(overdue.iter().map(Unit::id).collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn test_verify_pool_rejects_bad_ids() {
        assert!(verify_pool(&[]).is_err());
        assert!(verify_pool(&[Unit::available(1), Unit::available(1)]).is_err());
        assert!(verify_pool(&[Unit::available(2), Unit::available(1)]).is_err());
        assert!(verify_pool(&[Unit::available(1), Unit::available(5)]).is_ok());
    }

    #[test]
    fn test_total_is_stable_across_transitions() {
        let mut units = provision(3);
        let before = summarize(&units).total;

        units[1] = units[1]
            .check_out("Alice", "Room 101", Duration::hours(2), t0())
            .unwrap();
        assert_eq!(summarize(&units).total, before);

        units[1] = units[1].release().unwrap();
        assert_eq!(summarize(&units).total, before);
        assert_eq!(summarize(&units).available_count, 3);
    }
}
