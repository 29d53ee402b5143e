//! # Validation Module
//!
//! Input validation for checkout and release requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP layer (outside this workspace)                          │
//! │  └── Authenticated coordinator, body deserialization                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── unitId positive and in range                                      │
//! │  ├── holder present and bounded                                        │
//! │  └── durationHours resolved to a concrete hold length                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Ledger rules (ledger.rs)                                     │
//! │  └── NotFound / AlreadyCheckedOut / NotCheckedOut                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here touches ledger state, so a rejected request never mutates a
//! unit.

use chrono::Duration;

use crate::error::ValidationError;
use crate::types::CheckoutRequest;
use crate::{DEFAULT_HOLD_HOURS, MAX_HOLDER_LEN, MAX_LOCATION_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Identifiers
// =============================================================================

/// Validates a unit id as received from a caller.
///
/// ## Example
/// ```rust
/// use hostel_core::validation::validate_unit_id;
///
/// assert_eq!(validate_unit_id(2).unwrap(), 2);
/// assert!(validate_unit_id(0).is_err());
/// assert!(validate_unit_id(-1).is_err());
/// ```
pub fn validate_unit_id(unit_id: i64) -> ValidationResult<u32> {
    if unit_id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "unitId".to_string(),
        });
    }

    u32::try_from(unit_id).map_err(|_| ValidationError::OutOfRange {
        field: "unitId".to_string(),
        min: 1,
        max: u32::MAX as i64,
    })
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a holder name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 100 characters
///
/// ## Returns
/// The trimmed holder.
pub fn validate_holder(holder: &str) -> ValidationResult<String> {
    let holder = holder.trim();

    if holder.is_empty() {
        return Err(ValidationError::Required {
            field: "holder".to_string(),
        });
    }

    if holder.chars().count() > MAX_HOLDER_LEN {
        return Err(ValidationError::TooLong {
            field: "holder".to_string(),
            max: MAX_HOLDER_LEN,
        });
    }

    Ok(holder.to_string())
}

/// Validates a location. Empty is allowed.
pub fn validate_location(location: &str) -> ValidationResult<String> {
    let location = location.trim();

    if location.chars().count() > MAX_LOCATION_LEN {
        return Err(ValidationError::TooLong {
            field: "location".to_string(),
            max: MAX_LOCATION_LEN,
        });
    }

    Ok(location.to_string())
}

// =============================================================================
// Duration
// =============================================================================

/// Turns an optional `durationHours` into a concrete hold length.
///
/// ## Rules
/// ```text
/// None, 0, negative   → default (4h unless configured otherwise)
/// NaN, ±infinity      → InvalidFormat
/// too large for a Duration → OutOfRange
/// otherwise           → hours, rounded to whole milliseconds (at least 1ms)
/// ```
///
/// ## Example
/// ```rust
/// use chrono::Duration;
/// use hostel_core::validation::resolve_hold_duration;
///
/// let default = Duration::hours(4);
/// assert_eq!(resolve_hold_duration(None, default).unwrap(), Duration::hours(4));
/// assert_eq!(resolve_hold_duration(Some(-1.0), default).unwrap(), Duration::hours(4));
/// assert_eq!(resolve_hold_duration(Some(1.5), default).unwrap(), Duration::minutes(90));
/// assert_eq!(resolve_hold_duration(Some(200.0), default).unwrap(), Duration::hours(200));
/// ```
pub fn resolve_hold_duration(
    duration_hours: Option<f64>,
    default: Duration,
) -> ValidationResult<Duration> {
    let Some(hours) = duration_hours else {
        return Ok(default);
    };

    if !hours.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "durationHours".to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    if hours <= 0.0 {
        return Ok(default);
    }

    let millis = (hours * 3_600_000.0).round();
    if millis >= i64::MAX as f64 {
        return Err(ValidationError::OutOfRange {
            field: "durationHours".to_string(),
            min: 0,
            max: i64::MAX / 3_600_000,
        });
    }

    // Sub-millisecond requests still get a real hold
    let millis = (millis as i64).max(1);
    Duration::try_milliseconds(millis).ok_or_else(|| ValidationError::OutOfRange {
        field: "durationHours".to_string(),
        min: 0,
        max: i64::MAX / 3_600_000,
    })
}

/// The default hold length (4 hours).
pub fn default_hold_duration() -> Duration {
    Duration::hours(DEFAULT_HOLD_HOURS)
}

// =============================================================================
// Request Validation
// =============================================================================

/// A checkout request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutInput {
    pub unit_id: u32,
    pub holder: String,
    pub location: String,
    pub hold_for: Duration,
}

/// Validates every field of a checkout request.
///
/// The first failing field wins; fields are checked in body order.
pub fn validate_checkout(
    request: &CheckoutRequest,
    default_hold: Duration,
) -> ValidationResult<CheckoutInput> {
    Ok(CheckoutInput {
        unit_id: validate_unit_id(request.unit_id)?,
        holder: validate_holder(&request.holder)?,
        location: validate_location(&request.location)?,
        hold_for: resolve_hold_duration(request.duration_hours, default_hold)?,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_unit_id() {
        assert_eq!(validate_unit_id(1).unwrap(), 1);
        assert_eq!(validate_unit_id(99).unwrap(), 99);

        assert!(validate_unit_id(0).is_err());
        assert!(validate_unit_id(-5).is_err());
        assert!(matches!(
            validate_unit_id(i64::from(u32::MAX) + 1),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_holder() {
        assert_eq!(validate_holder("  Alice ").unwrap(), "Alice");

        assert!(validate_holder("").is_err());
        assert!(validate_holder("   ").is_err());
        assert!(validate_holder(&"A".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_location() {
        assert_eq!(validate_location("").unwrap(), "");
        assert_eq!(validate_location(" Room 101 ").unwrap(), "Room 101");
        assert!(validate_location(&"x".repeat(201)).is_err());
    }

    #[test]
    fn test_resolve_hold_duration() {
        let default = default_hold_duration();

        assert_eq!(resolve_hold_duration(None, default).unwrap(), Duration::hours(4));
        assert_eq!(resolve_hold_duration(Some(0.0), default).unwrap(), Duration::hours(4));
        assert_eq!(resolve_hold_duration(Some(-3.0), default).unwrap(), Duration::hours(4));
        assert_eq!(resolve_hold_duration(Some(2.0), default).unwrap(), Duration::hours(2));
        assert_eq!(resolve_hold_duration(Some(168.5), default).unwrap(), Duration::minutes(168 * 60 + 30));
        assert_eq!(resolve_hold_duration(Some(200.0), default).unwrap(), Duration::hours(200));
        assert_eq!(resolve_hold_duration(Some(0.0001), default).unwrap(), Duration::milliseconds(360));
        assert_eq!(resolve_hold_duration(Some(1e-9), default).unwrap(), Duration::milliseconds(1));

        assert!(resolve_hold_duration(Some(f64::NAN), default).is_err());
        assert!(resolve_hold_duration(Some(f64::INFINITY), default).is_err());
        assert!(matches!(
            resolve_hold_duration(Some(1e300), default),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_checkout() {
        let request = CheckoutRequest {
            unit_id: 2,
            holder: "Alice".to_string(),
            location: "Room 101".to_string(),
            duration_hours: Some(2.0),
        };
        let input = validate_checkout(&request, default_hold_duration()).unwrap();
        assert_eq!(input.unit_id, 2);
        assert_eq!(input.hold_for, Duration::hours(2));

        let bad = CheckoutRequest {
            holder: " ".to_string(),
            ..request
        };
        assert!(matches!(
            validate_checkout(&bad, default_hold_duration()),
            Err(ValidationError::Required { .. })
        ));
    }
}
