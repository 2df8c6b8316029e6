//! # Text Views
//!
//! Plain-text renderings of the snapshot and the notification slot, plus
//! the two watcher tasks that log them as they change.

use std::fmt::Write as _;
use std::sync::Arc;

use krabby_core::Snapshot;
use krabby_sync::{Notification, Severity, SyncStatus};
use tokio::sync::watch;
use tracing::{debug, info};

// =============================================================================
// Renderers
// =============================================================================

pub fn render_tables(snapshot: &Snapshot) -> String {
    if snapshot.tables.is_empty() {
        return "No tables loaded.".to_string();
    }

    let mut out = String::from("TABLE  SEATS  STATE\n");
    for table in &snapshot.tables {
        let state = if table.is_occupied {
            "occupied"
        } else {
            "available"
        };
        let _ = writeln!(
            out,
            "{:>5}  {:>5}  {}  (id {})",
            table.table_number, table.capacity, state, table.id
        );
    }
    out
}

pub fn render_reservations(snapshot: &Snapshot) -> String {
    if snapshot.reservations.is_empty() {
        return "No reservations.".to_string();
    }

    let mut out = String::new();
    for r in &snapshot.reservations {
        let table = r
            .table_id
            .and_then(|id| snapshot.table(id))
            .map(|t| format!("table {}", t.table_number))
            .unwrap_or_else(|| "unassigned".to_string());
        let _ = writeln!(
            out,
            "#{:<4} {}  {:<20} party of {:<2} [{}] {}",
            r.id,
            r.reservation_time.format("%Y-%m-%d %H:%M"),
            r.customer_name,
            r.party_size,
            r.status,
            table
        );
    }
    out
}

pub fn render_waitlist(snapshot: &Snapshot) -> String {
    let queue = snapshot.waitlist_queue();
    if queue.is_empty() {
        return "Waitlist is empty.".to_string();
    }

    let mut out = String::new();
    for party in queue {
        let wait = party
            .entry
            .estimated_wait_time
            .map(|m| format!("~{} min", m))
            .unwrap_or_else(|| "~? min".to_string());
        let _ = writeln!(
            out,
            "{:>2}. {:<20} party of {:<2} {} ({})",
            party.rank, party.entry.customer_name, party.entry.party_size, wait, party.entry.status
        );
    }
    out
}

pub fn render_stats(snapshot: &Snapshot) -> String {
    let s = &snapshot.stats;
    format!(
        "Tables {}/{} available ({} occupied) | {} reservations today | {} waiting",
        s.available_tables, s.total_tables, s.occupied_tables, s.today_reservations, s.waitlist_count
    )
}

pub fn render_notification(notification: &Notification) -> String {
    let tag = match notification.severity {
        Severity::Info => "INFO",
        Severity::Success => " OK ",
        Severity::Danger => "FAIL",
    };
    format!("[{}] {}", tag, notification.message)
}

pub fn render_status(status: &SyncStatus) -> String {
    let polling = match status.poll_interval {
        Some(every) if status.polling => format!("every {}s", every.as_secs()),
        _ => "off".to_string(),
    };
    let last = status
        .last_refresh_at
        .map(|t| t.format("%H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "never".to_string());

    let mut out = format!(
        "polling: {} | last refresh: {} (#{}) | in flight: {}",
        polling, last, status.last_applied_seq, status.refreshes_in_flight
    );
    if let Some(err) = &status.last_error {
        let _ = write!(out, " | last error: {}", err);
    }
    out
}

// =============================================================================
// Watchers
// =============================================================================

/// Logs a one-line summary whenever a new snapshot is published.
pub async fn watch_snapshots(mut snapshots: watch::Receiver<Arc<Snapshot>>) {
    while snapshots.changed().await.is_ok() {
        let snapshot = Arc::clone(&snapshots.borrow_and_update());
        info!(
            tables = snapshot.tables.len(),
            reservations = snapshot.reservations.len(),
            waitlist = snapshot.waitlist.len(),
            "{}",
            render_stats(&snapshot)
        );
    }
    debug!("Snapshot watcher stopped");
}

/// Prints each notice as it appears.
pub async fn watch_notifications(mut notices: watch::Receiver<Option<Notification>>) {
    while notices.changed().await.is_ok() {
        let current = notices.borrow_and_update().clone();
        match current {
            Some(notice) => println!("{}", render_notification(&notice)),
            None => debug!("Notification cleared"),
        }
    }
    debug!("Notification watcher stopped");
}
