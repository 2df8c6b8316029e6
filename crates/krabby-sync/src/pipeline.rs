//! # Mutation Pipeline
//!
//! Every operator action goes through the same four steps:
//!
//! ```text
//!   draft ──validate──▶ body ──gateway write──▶ created/updated entity
//!     │  ✗ ValidationError                        │
//!     │    (nothing sent, no notice)              ├─ ✓ reset draft, success notice,
//!     │                                           │    refresh the snapshot
//!     │                                           └─ ✗ keep draft, danger notice
//! ```
//!
//! The pipeline never patches the snapshot itself. After a successful write
//! it asks the sync engine for a fresh copy and lets the backend's answer
//! stand.

use krabby_core::validation::{validate_reservation_draft, validate_waitlist_draft};
use krabby_core::{Reservation, ReservationDraft, Table, WaitlistDraft, WaitlistEntry};
use tracing::{debug, info, warn};

use crate::engine::SyncHandle;
use crate::error::{GatewayError, MutationError, MutationResult};
use crate::gateway::SharedGateway;
use crate::notify::{NotificationCenter, Severity};

pub const RESERVATION_CREATED: &str = "Reservation created successfully!";
pub const RESERVATION_FAILED: &str = "Failed to create reservation";
pub const WAITLIST_ADDED: &str = "Added to waitlist successfully!";
pub const WAITLIST_FAILED: &str = "Failed to add to waitlist";
pub const TABLE_UPDATE_FAILED: &str = "Failed to update table status";

/// Submits drafts and table toggles, then refreshes.
#[derive(Clone)]
pub struct MutationPipeline {
    gateway: SharedGateway,
    sync: SyncHandle,
    notifier: NotificationCenter,
}

impl MutationPipeline {
    pub fn new(gateway: SharedGateway, sync: SyncHandle, notifier: NotificationCenter) -> Self {
        MutationPipeline {
            gateway,
            sync,
            notifier,
        }
    }

    /// Validates and creates a reservation.
    ///
    /// On success the draft is reset to its defaults. On any failure it is
    /// left exactly as the operator typed it.
    pub async fn submit_reservation(
        &self,
        draft: &mut ReservationDraft,
    ) -> MutationResult<Reservation> {
        let body = validate_reservation_draft(draft).map_err(|e| {
            debug!(field = e.field(), error = %e, "Reservation draft rejected");
            MutationError::Validation(e)
        })?;

        match self.gateway.create_reservation(&body).await {
            Ok(created) => {
                info!(reservation_id = created.id, party_size = created.party_size, "Reservation created");
                *draft = ReservationDraft::default();
                self.notifier.raise(RESERVATION_CREATED, Severity::Success);
                self.refresh_after_write().await;
                Ok(created)
            }
            Err(e) => Err(self.report(RESERVATION_FAILED, e)),
        }
    }

    /// Validates and adds a walk-in party to the waitlist.
    pub async fn submit_waitlist_entry(
        &self,
        draft: &mut WaitlistDraft,
    ) -> MutationResult<WaitlistEntry> {
        let body = validate_waitlist_draft(draft).map_err(|e| {
            debug!(field = e.field(), error = %e, "Waitlist draft rejected");
            MutationError::Validation(e)
        })?;

        match self.gateway.create_waitlist_entry(&body).await {
            Ok(created) => {
                info!(
                    entry_id = created.id,
                    estimated_wait = ?created.estimated_wait_time,
                    "Waitlist entry created"
                );
                *draft = WaitlistDraft::default();
                self.notifier.raise(WAITLIST_ADDED, Severity::Success);
                self.refresh_after_write().await;
                Ok(created)
            }
            Err(e) => Err(self.report(WAITLIST_FAILED, e)),
        }
    }

    /// Flips a table's occupancy as seen in the current snapshot.
    ///
    /// Fails with [`MutationError::StaleReference`], without a request, if
    /// the table is not in the snapshot.
    pub async fn toggle_table_occupancy(&self, table_id: i64) -> MutationResult<Table> {
        let snapshot = self.sync.snapshot();
        let (table_number, is_occupied) = match snapshot.require_table(table_id) {
            Ok(table) => (table.table_number, !table.is_occupied),
            Err(e) => {
                debug!(table_id, error = %e, "Toggle on unknown table");
                return Err(MutationError::StaleReference { table_id });
            }
        };

        match self.gateway.set_table_occupancy(table_id, is_occupied).await {
            Ok(updated) => {
                let verb = if is_occupied { "occupied" } else { "freed" };
                info!(table_id, table_number, is_occupied, "Table occupancy updated");
                self.notifier.raise(
                    format!("Table {} {} successfully!", table_number, verb),
                    Severity::Success,
                );
                self.refresh_after_write().await;
                Ok(updated)
            }
            Err(e) => Err(self.report(TABLE_UPDATE_FAILED, e)),
        }
    }

    fn report(&self, message: &str, error: GatewayError) -> MutationError {
        warn!(error = %error, kind = %error.kind(), "{}", message);
        self.notifier.raise_failure(message, error.kind());
        MutationError::Gateway(error)
    }

    /// A failed follow-up refresh has already been reported by the engine.
    async fn refresh_after_write(&self) {
        if let Err(e) = self.sync.refresh().await {
            debug!(error = %e, "Refresh after write did not apply");
        }
    }
}
