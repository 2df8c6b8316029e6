//! # Domain Types
//!
//! Entities the console observes from the restaurant API.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Table       │   │   Reservation   │   │  WaitlistEntry  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (server)    │   │  id (server)    │   │  id (server)    │       │
//! │  │  table_number   │   │  customer_name  │   │  customer_name  │       │
//! │  │  capacity       │   │  party_size     │   │  party_size     │       │
//! │  │  is_occupied ◄──┼─┐ │  status         │   │  status         │       │
//! │  └─────────────────┘ │ │  table_id ──────┼─┐ │  est. wait      │       │
//! │                      │ └─────────────────┘ │ └─────────────────┘       │
//! │   only field this    └─────────────────────┘                           │
//! │   client mutates          optional reference                           │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────────┐                        │
//! │  │ DashboardStats  │   │  ReservationDraft    │   Drafts are owned by  │
//! │  │ backend-computed│   │  WaitlistDraft       │   forms, never by the  │
//! │  └─────────────────┘   └──────────────────────┘   snapshot             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity id is an integer assigned by the backend. The console never
//! invents ids and never creates or destroys tables.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Party size a freshly reset form starts with.
pub const DEFAULT_PARTY_SIZE: i64 = 2;

// =============================================================================
// Table
// =============================================================================

/// A physical table in the dining room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Table {
    /// Server-assigned identifier.
    pub id: i64,

    /// Number shown on the floor plan, unique within the restaurant.
    pub table_number: u32,

    /// Seat count.
    pub capacity: u32,

    /// Whether a party is currently seated here.
    pub is_occupied: bool,
}

impl Table {
    /// True when the table is free.
    #[inline]
    pub fn is_available(&self) -> bool {
        !self.is_occupied
    }

    /// True when a party of `party_size` fits at this table.
    pub fn fits(&self, party_size: u32) -> bool {
        party_size <= self.capacity
    }
}

// =============================================================================
// Reservation Status
// =============================================================================

/// Lifecycle of a reservation.
///
/// ## Transitions
/// ```text
///   Pending ──► Confirmed ──► Seated
///      │            │
///      └────────────┴──────► Cancelled
/// ```
/// Seated and Cancelled are terminal. Transitions are decided by the
/// backend; the console only checks what it observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Created, no table yet.
    #[default]
    Pending,
    /// Table allocated.
    Confirmed,
    /// Party is at the table.
    Seated,
    /// Reservation will not be honoured.
    Cancelled,
}

impl ReservationStatus {
    /// Returns true for statuses with no outgoing transition.
    pub const fn is_terminal(self) -> bool {
        matches!(self, ReservationStatus::Seated | ReservationStatus::Cancelled)
    }

    const fn rank(self) -> u8 {
        match self {
            ReservationStatus::Pending => 0,
            ReservationStatus::Confirmed => 1,
            ReservationStatus::Seated => 2,
            ReservationStatus::Cancelled => 3,
        }
    }

    /// Returns true if `next` is a legal successor of `self`.
    ///
    /// Staying in the same status is always legal.
    pub fn can_transition_to(self, next: ReservationStatus) -> bool {
        if self == next {
            return true;
        }
        if self.is_terminal() {
            return false;
        }
        match next {
            ReservationStatus::Cancelled => true,
            _ => next.rank() > self.rank(),
        }
    }

    /// Lowercase wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Seated => "seated",
            ReservationStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Reservation
// =============================================================================

/// A scheduled booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Reservation {
    pub id: i64,
    pub customer_name: String,
    pub phone_number: String,
    #[serde(default)]
    pub email: Option<String>,
    pub party_size: u32,
    /// Naive ISO-8601 as emitted by the backend.
    #[ts(as = "String")]
    pub reservation_time: NaiveDateTime,
    pub status: ReservationStatus,
    /// Assigned table, absent until the backend allocates one.
    #[serde(default)]
    pub table_id: Option<i64>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub created_at: Option<NaiveDateTime>,
}

// =============================================================================
// Waitlist Status
// =============================================================================

/// Lifecycle of a walk-in party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum WaitlistStatus {
    #[default]
    Waiting,
    /// Party was told their table is ready.
    Notified,
    Seated,
    /// Party gave up.
    Left,
}

impl WaitlistStatus {
    pub const fn is_terminal(self) -> bool {
        matches!(self, WaitlistStatus::Seated | WaitlistStatus::Left)
    }

    /// Still holds a place in the queue.
    pub const fn is_active(self) -> bool {
        !self.is_terminal()
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            WaitlistStatus::Waiting => "waiting",
            WaitlistStatus::Notified => "notified",
            WaitlistStatus::Seated => "seated",
            WaitlistStatus::Left => "left",
        }
    }
}

impl std::fmt::Display for WaitlistStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Waitlist Entry
// =============================================================================

/// A walk-in party waiting for a table.
///
/// Queue position is not stored; it is derived from the order entries
/// arrive in the snapshot (see [`crate::Snapshot::waitlist_queue`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WaitlistEntry {
    pub id: i64,
    pub customer_name: String,
    pub phone_number: String,
    #[serde(default)]
    pub email: Option<String>,
    pub party_size: u32,
    /// Minutes, computed by the backend. The column is nullable.
    #[serde(default)]
    pub estimated_wait_time: Option<u32>,
    pub status: WaitlistStatus,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub joined_at: Option<NaiveDateTime>,
}

// =============================================================================
// Dashboard Stats
// =============================================================================

/// Backend aggregate shown on the dashboard tab.
///
/// Never derived locally from the other collections; the backend's idea of
/// "today" and "available" wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardStats {
    pub total_tables: u32,
    pub available_tables: u32,
    pub today_reservations: u32,
    pub waitlist_count: u32,
    #[serde(default)]
    pub occupied_tables: u32,
}

// =============================================================================
// Drafts
// =============================================================================

/// Reservation form contents before submission.
///
/// Kept as raw form values so invalid input can be held (and shown) without
/// being lost; [`crate::validation::validate_reservation_draft`] turns it
/// into a [`NewReservation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReservationDraft {
    pub customer_name: String,
    pub phone_number: String,
    pub email: String,
    pub party_size: i64,
    /// `YYYY-MM-DDTHH:MM[:SS]` or RFC 3339.
    pub reservation_time: String,
}

impl Default for ReservationDraft {
    fn default() -> Self {
        ReservationDraft {
            customer_name: String::new(),
            phone_number: String::new(),
            email: String::new(),
            party_size: DEFAULT_PARTY_SIZE,
            reservation_time: String::new(),
        }
    }
}

/// Waitlist form contents before submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WaitlistDraft {
    pub customer_name: String,
    pub phone_number: String,
    pub email: String,
    pub party_size: i64,
}

impl Default for WaitlistDraft {
    fn default() -> Self {
        WaitlistDraft {
            customer_name: String::new(),
            phone_number: String::new(),
            email: String::new(),
            party_size: DEFAULT_PARTY_SIZE,
        }
    }
}

// =============================================================================
// Request Bodies
// =============================================================================

/// Body of `POST /reservations`. Only produced by validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewReservation {
    pub customer_name: String,
    pub phone_number: String,
    /// Left out of the body when the operator gave none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub party_size: u32,
    pub reservation_time: NaiveDateTime,
}

/// Body of `POST /waitlist`. Only produced by validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewWaitlistEntry {
    pub customer_name: String,
    pub phone_number: String,
    /// Left out of the body when the operator gave none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub party_size: u32,
}

/// Body of `PUT /tables/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOccupancyUpdate {
    pub is_occupied: bool,
}

// =============================================================================
// Unit Tests
// =============================================================================
