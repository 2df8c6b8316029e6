//! # Snapshot
//!
//! The full copy of all four collections the console holds at any moment.
//!
//! A snapshot is only ever replaced as a whole. Nothing in this crate
//! patches one in place; the sync engine swaps in a new value after every
//! successful refresh and readers keep whatever copy they were handed.
//!
//! ```text
//! ┌───────────────────────── Snapshot ─────────────────────────┐
//! │  tables        Vec<Table>          GET /tables             │
//! │  reservations  Vec<Reservation>    GET /reservations       │
//! │  waitlist      Vec<WaitlistEntry>  GET /waitlist           │
//! │  stats         DashboardStats      GET /dashboard          │
//! └────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::{DashboardStats, Reservation, Table, WaitlistEntry};

/// All four collections, as last fetched together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Snapshot {
    pub tables: Vec<Table>,
    pub reservations: Vec<Reservation>,
    pub waitlist: Vec<WaitlistEntry>,
    pub stats: DashboardStats,
}

/// A waitlist entry with its display rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuedParty<'a> {
    /// 1-based position among active entries.
    pub rank: usize,
    pub entry: &'a WaitlistEntry,
}

impl Snapshot {
    /// True before the first successful refresh.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
            && self.reservations.is_empty()
            && self.waitlist.is_empty()
            && self.stats == DashboardStats::default()
    }

    pub fn table(&self, id: i64) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == id)
    }

    /// Like [`Snapshot::table`] but as an error for callers that must fail
    /// on a reference that has gone stale.
    pub fn require_table(&self, id: i64) -> CoreResult<&Table> {
        self.table(id).ok_or(CoreError::UnknownTable(id))
    }

    pub fn reservation(&self, id: i64) -> Option<&Reservation> {
        self.reservations.iter().find(|r| r.id == id)
    }

    /// Active waitlist entries in arrival order, ranked from 1.
    ///
    /// Entries that reached a terminal status are skipped and do not
    /// consume a rank.
    pub fn waitlist_queue(&self) -> Vec<QueuedParty<'_>> {
        self.waitlist
            .iter()
            .filter(|e| e.status.is_active())
            .enumerate()
            .map(|(i, entry)| QueuedParty { rank: i + 1, entry })
            .collect()
    }

    /// Reports anomalies between `previous` and `self`.
    ///
    /// The backend owns every transition, so this never rejects a snapshot;
    /// callers log what it returns. Two things are checked:
    /// - a reservation present in both snapshots moved along an illegal edge
    /// - a reservation references a table that is not in `self`
    pub fn audit(&self, previous: &Snapshot) -> Vec<CoreError> {
        let mut findings = Vec::new();

        for current in &self.reservations {
            if let Some(before) = previous.reservation(current.id) {
                if !before.status.can_transition_to(current.status) {
                    findings.push(CoreError::IllegalReservationTransition {
                        id: current.id,
                        from: before.status.to_string(),
                        to: current.status.to_string(),
                    });
                }
            }

            if let Some(table_id) = current.table_id {
                if self.table(table_id).is_none() {
                    findings.push(CoreError::DanglingTableReference {
                        reservation_id: current.id,
                        table_id,
                    });
                }
            }
        }

        findings
    }
}
