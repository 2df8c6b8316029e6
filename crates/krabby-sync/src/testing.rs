//! In-memory gateway for engine and pipeline tests.
//!
//! Behaves like a tiny backend: writes change the data that later reads
//! return. Endpoints can be made to fail, and reads of `/tables` can be held
//! open until the test releases them.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use krabby_core::{
    DashboardStats, NewReservation, NewWaitlistEntry, Reservation, ReservationStatus, Table,
    WaitlistEntry, WaitlistStatus,
};
use tokio::sync::oneshot;

use crate::error::{GatewayError, GatewayResult};
use crate::gateway::ResourceGateway;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    ListTables,
    ListReservations,
    ListWaitlist,
    FetchDashboard,
    CreateReservation,
    CreateWaitlistEntry,
    SetTableOccupancy,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Read(Endpoint),
    CreateReservation(NewReservation),
    CreateWaitlistEntry(NewWaitlistEntry),
    SetTableOccupancy { table_id: i64, is_occupied: bool },
}

#[derive(Default)]
struct State {
    tables: Vec<Table>,
    reservations: Vec<Reservation>,
    waitlist: Vec<WaitlistEntry>,
    stats: DashboardStats,
    next_id: i64,
    failures: HashMap<Endpoint, GatewayError>,
    table_holds: VecDeque<oneshot::Receiver<Option<GatewayError>>>,
    calls: Vec<Call>,
}

#[derive(Default)]
pub struct FakeGateway {
    state: Mutex<State>,
}

pub fn table(id: i64, is_occupied: bool) -> Table {
    Table {
        id,
        table_number: id as u32,
        capacity: 4,
        is_occupied,
    }
}

pub fn waiting(id: i64, name: &str) -> WaitlistEntry {
    WaitlistEntry {
        id,
        customer_name: name.to_string(),
        phone_number: "555-0000".into(),
        email: None,
        party_size: 2,
        estimated_wait_time: Some(15),
        status: WaitlistStatus::Waiting,
        joined_at: None,
    }
}

impl FakeGateway {
    pub fn new() -> Self {
        let gateway = FakeGateway::default();
        gateway.state.lock().unwrap().next_id = 100;
        gateway
    }

    /// Replaces the table list and recomputes the table counters.
    pub fn set_tables(&self, tables: Vec<Table>) {
        let mut state = self.state.lock().unwrap();
        state.tables = tables;
        Self::recount(&mut state);
    }

    pub fn set_waitlist(&self, waitlist: Vec<WaitlistEntry>) {
        let mut state = self.state.lock().unwrap();
        state.waitlist = waitlist;
        Self::recount(&mut state);
    }

    pub fn fail(&self, endpoint: Endpoint, error: GatewayError) {
        self.state.lock().unwrap().failures.insert(endpoint, error);
    }

    pub fn heal(&self, endpoint: Endpoint) {
        self.state.lock().unwrap().failures.remove(&endpoint);
    }

    /// Holds the next `/tables` read until the returned sender fires. Sending
    /// `None` returns the tables as they were when the read started; sending
    /// an error fails the read with it.
    pub fn hold_next_tables(&self) -> oneshot::Sender<Option<GatewayError>> {
        let (tx, rx) = oneshot::channel();
        self.state.lock().unwrap().table_holds.push_back(rx);
        tx
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, endpoint: Endpoint) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| match c {
                Call::Read(e) => *e == endpoint,
                Call::CreateReservation(_) => endpoint == Endpoint::CreateReservation,
                Call::CreateWaitlistEntry(_) => endpoint == Endpoint::CreateWaitlistEntry,
                Call::SetTableOccupancy { .. } => endpoint == Endpoint::SetTableOccupancy,
            })
            .count()
    }

    /// Number of write requests that reached the gateway.
    pub fn write_count(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| !matches!(c, Call::Read(_)))
            .count()
    }

    fn recount(state: &mut State) {
        let occupied = state.tables.iter().filter(|t| t.is_occupied).count() as u32;
        state.stats.total_tables = state.tables.len() as u32;
        state.stats.occupied_tables = occupied;
        state.stats.available_tables = state.stats.total_tables - occupied;
        state.stats.waitlist_count = state
            .waitlist
            .iter()
            .filter(|e| e.status == WaitlistStatus::Waiting)
            .count() as u32;
    }

    fn record(&self, call: Call, endpoint: Endpoint) -> GatewayResult<std::sync::MutexGuard<'_, State>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if let Some(err) = state.failures.get(&endpoint).cloned() {
            return Err(err);
        }
        Ok(state)
    }
}

#[async_trait]
impl ResourceGateway for FakeGateway {
    async fn list_tables(&self) -> GatewayResult<Vec<Table>> {
        let (tables, hold) = {
            let mut state = self.record(Call::Read(Endpoint::ListTables), Endpoint::ListTables)?;
            let hold = state.table_holds.pop_front();
            (state.tables.clone(), hold)
        };
        if let Some(hold) = hold {
            if let Ok(Some(err)) = hold.await {
                return Err(err);
            }
        }
        Ok(tables)
    }

    async fn list_reservations(&self) -> GatewayResult<Vec<Reservation>> {
        let state = self.record(Call::Read(Endpoint::ListReservations), Endpoint::ListReservations)?;
        Ok(state.reservations.clone())
    }

    async fn list_waitlist(&self) -> GatewayResult<Vec<WaitlistEntry>> {
        let state = self.record(Call::Read(Endpoint::ListWaitlist), Endpoint::ListWaitlist)?;
        Ok(state
            .waitlist
            .iter()
            .filter(|e| e.status == WaitlistStatus::Waiting)
            .cloned()
            .collect())
    }

    async fn fetch_dashboard(&self) -> GatewayResult<DashboardStats> {
        let state = self.record(Call::Read(Endpoint::FetchDashboard), Endpoint::FetchDashboard)?;
        Ok(state.stats.clone())
    }

    async fn create_reservation(&self, body: &NewReservation) -> GatewayResult<Reservation> {
        let mut state = self.record(
            Call::CreateReservation(body.clone()),
            Endpoint::CreateReservation,
        )?;
        state.next_id += 1;
        let reservation = Reservation {
            id: state.next_id,
            customer_name: body.customer_name.clone(),
            phone_number: body.phone_number.clone(),
            email: body.email.clone(),
            party_size: body.party_size,
            reservation_time: body.reservation_time,
            status: ReservationStatus::Pending,
            table_id: None,
            created_at: NaiveDate::from_ymd_opt(2024, 6, 1).and_then(|d| d.and_hms_opt(12, 0, 0)),
        };
        state.reservations.push(reservation.clone());
        Ok(reservation)
    }

    async fn create_waitlist_entry(&self, body: &NewWaitlistEntry) -> GatewayResult<WaitlistEntry> {
        let mut state = self.record(
            Call::CreateWaitlistEntry(body.clone()),
            Endpoint::CreateWaitlistEntry,
        )?;
        state.next_id += 1;
        let entry = WaitlistEntry {
            id: state.next_id,
            customer_name: body.customer_name.clone(),
            phone_number: body.phone_number.clone(),
            email: body.email.clone(),
            party_size: body.party_size,
            estimated_wait_time: Some(15),
            status: WaitlistStatus::Waiting,
            joined_at: None,
        };
        state.waitlist.push(entry.clone());
        Self::recount(&mut state);
        Ok(entry)
    }

    async fn set_table_occupancy(&self, table_id: i64, is_occupied: bool) -> GatewayResult<Table> {
        let mut state = self.record(
            Call::SetTableOccupancy {
                table_id,
                is_occupied,
            },
            Endpoint::SetTableOccupancy,
        )?;
        let updated = match state.tables.iter_mut().find(|t| t.id == table_id) {
            Some(table) => {
                table.is_occupied = is_occupied;
                table.clone()
            }
            None => {
                return Err(GatewayError::ServerError {
                    status: 404,
                    body: "Not Found".into(),
                })
            }
        };
        Self::recount(&mut state);
        Ok(updated)
    }
}
