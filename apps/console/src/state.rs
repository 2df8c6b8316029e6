//! # Console State
//!
//! Everything a command may touch, owned by the input loop.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         ConsoleState                                    │
//! │                                                                         │
//! │  sync      SyncHandle          snapshot reads, refresh, polling        │
//! │  pipeline  MutationPipeline    submits and toggles                     │
//! │  notices   NotificationCenter  dismiss                                 │
//! │  drafts    Reservation/Waitlist form contents, kept after a failure    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use krabby_core::{ReservationDraft, WaitlistDraft};
use krabby_sync::{MutationPipeline, NotificationCenter, SyncHandle};

pub struct ConsoleState {
    pub sync: SyncHandle,
    pub pipeline: MutationPipeline,
    pub notices: NotificationCenter,
    pub poll_interval: Duration,
    pub reservation_draft: ReservationDraft,
    pub waitlist_draft: WaitlistDraft,
}

impl ConsoleState {
    pub fn new(
        sync: SyncHandle,
        pipeline: MutationPipeline,
        notices: NotificationCenter,
        poll_interval: Duration,
    ) -> Self {
        ConsoleState {
            sync,
            pipeline,
            notices,
            poll_interval,
            reservation_draft: ReservationDraft::default(),
            waitlist_draft: WaitlistDraft::default(),
        }
    }
}
