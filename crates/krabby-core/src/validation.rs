//! # Validation Module
//!
//! Draft validation for the reservation and waitlist forms.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form (presentation)                                          │
//! │  └── required / type="email" / min="1" hints                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Field-level errors (which input to highlight)                     │
//! │  └── Produces the request body sent to the API                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Restaurant backend                                           │
//! │  └── NOT NULL columns, table allocation                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A draft that fails here never reaches the network.
//!
//! ## Usage
//! ```rust
//! use krabby_core::validation::{is_valid_waitlist_draft, validate_waitlist_draft};
//! use krabby_core::WaitlistDraft;
//!
//! let draft = WaitlistDraft {
//!     customer_name: "Plankton".into(),
//!     phone_number: "555-1212".into(),
//!     ..Default::default()
//! };
//! assert!(is_valid_waitlist_draft(&draft));
//!
//! let body = validate_waitlist_draft(&draft).unwrap();
//! assert_eq!(body.party_size, 2);
//! ```

use chrono::{DateTime, NaiveDateTime};

use crate::error::ValidationError;
use crate::types::{NewReservation, NewWaitlistEntry, ReservationDraft, WaitlistDraft};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Column widths on the backend.
pub const MAX_NAME_LEN: usize = 100;
pub const MAX_PHONE_LEN: usize = 20;
pub const MAX_EMAIL_LEN: usize = 100;

/// Accepted naive layouts, most specific first.
const NAIVE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

// =============================================================================
// Field Validators
// =============================================================================

fn validate_required(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Validates a customer name. Returns the trimmed name.
pub fn validate_customer_name(name: &str) -> ValidationResult<String> {
    validate_required("customer_name", name, MAX_NAME_LEN)
}

/// Validates a phone number. Any non-empty text is accepted; format is up
/// to the host.
pub fn validate_phone_number(phone: &str) -> ValidationResult<String> {
    validate_required("phone_number", phone, MAX_PHONE_LEN)
}

/// Validates an optional email.
///
/// ## Rules
/// - Empty (after trim) means "no email" → `Ok(None)`
/// - Otherwise exactly one `@`, non-empty local part, and a domain with a
///   dot that neither starts nor ends the domain
///
/// ## Example
/// ```rust
/// use krabby_core::validation::validate_email;
///
/// assert_eq!(validate_email("").unwrap(), None);
/// assert!(validate_email("sandy@treedome.sea").is_ok());
/// assert!(validate_email("sandy@treedome").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<Option<String>> {
    let email = email.trim();
    if email.is_empty() {
        return Ok(None);
    }

    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_EMAIL_LEN,
        });
    }

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain spaces"));
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| invalid("missing @"))?;

    if local.is_empty() || domain.contains('@') {
        return Err(invalid("must look like name@example.com"));
    }

    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid("domain must contain a dot"));
    }

    Ok(Some(email.to_string()))
}

/// Validates a party size and narrows it to the wire type.
///
/// ## Rules
/// - Must be at least 1
pub fn validate_party_size(n: i64) -> ValidationResult<u32> {
    if n < 1 {
        return Err(ValidationError::MustBePositive {
            field: "party_size".to_string(),
        });
    }

    u32::try_from(n).map_err(|_| ValidationError::InvalidFormat {
        field: "party_size".to_string(),
        reason: "too large".to_string(),
    })
}

/// Parses a reservation time.
///
/// Accepts the naive layouts a `datetime-local` input produces
/// (`2024-06-01T18:30`, with or without seconds) and RFC 3339 with an
/// offset, which is converted to UTC wall time.
pub fn parse_reservation_time(raw: &str) -> ValidationResult<NaiveDateTime> {
    let raw = raw.trim();

    if raw.is_empty() {
        return Err(ValidationError::Required {
            field: "reservation_time".to_string(),
        });
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_utc());
    }

    NAIVE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| ValidationError::InvalidFormat {
            field: "reservation_time".to_string(),
            reason: "expected YYYY-MM-DDTHH:MM".to_string(),
        })
}

// =============================================================================
// Draft Validators
// =============================================================================

/// Validates a reservation draft and builds the request body.
///
/// Fields are checked in form order so the first error matches the first
/// input the user would look at.
pub fn validate_reservation_draft(draft: &ReservationDraft) -> ValidationResult<NewReservation> {
    let customer_name = validate_customer_name(&draft.customer_name)?;
    let phone_number = validate_phone_number(&draft.phone_number)?;
    let email = validate_email(&draft.email)?;
    let party_size = validate_party_size(draft.party_size)?;
    let reservation_time = parse_reservation_time(&draft.reservation_time)?;

    Ok(NewReservation {
        customer_name,
        phone_number,
        email,
        party_size,
        reservation_time,
    })
}

/// Validates a waitlist draft and builds the request body.
pub fn validate_waitlist_draft(draft: &WaitlistDraft) -> ValidationResult<NewWaitlistEntry> {
    let customer_name = validate_customer_name(&draft.customer_name)?;
    let phone_number = validate_phone_number(&draft.phone_number)?;
    let email = validate_email(&draft.email)?;
    let party_size = validate_party_size(draft.party_size)?;

    Ok(NewWaitlistEntry {
        customer_name,
        phone_number,
        email,
        party_size,
    })
}

// =============================================================================
// Predicates
// =============================================================================

pub fn is_valid_party_size(n: i64) -> bool {
    validate_party_size(n).is_ok()
}

pub fn is_valid_reservation_draft(draft: &ReservationDraft) -> bool {
    validate_reservation_draft(draft).is_ok()
}

pub fn is_valid_waitlist_draft(draft: &WaitlistDraft) -> bool {
    validate_waitlist_draft(draft).is_ok()
}

// =============================================================================
// Unit Tests
// =============================================================================
