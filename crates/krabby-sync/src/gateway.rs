//! # Resource Gateway
//!
//! The console's only door to the restaurant API.
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Restaurant REST API                             │
//! │                                                                         │
//! │  READS                                  WRITES                          │
//! │  GET  /tables        → [Table]          POST /reservations → Reservation│
//! │  GET  /reservations  → [Reservation]    POST /waitlist     → Entry      │
//! │  GET  /waitlist      → [WaitlistEntry]  PUT  /tables/{id}  → Table      │
//! │  GET  /dashboard     → DashboardStats                                   │
//! │                                                                         │
//! │  Failure mapping:                                                       │
//! │  • connect / DNS / timeout / reset  → NetworkUnavailable               │
//! │  • non-2xx                          → ServerError { status, body }     │
//! │  • body not of the expected shape   → MalformedResponse                │
//! │                                                                         │
//! │  No retries here. Every call is one request.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The trait is the seam: the sync engine and the mutation pipeline only see
//! `dyn ResourceGateway`, so tests drive them with an in-memory fake.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use krabby_core::{
    DashboardStats, NewReservation, NewWaitlistEntry, Reservation, Table, TableOccupancyUpdate,
    WaitlistEntry,
};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::config::ConsoleConfig;
use crate::error::{GatewayError, GatewayResult, SyncError, SyncResult};

/// Shared, type-erased gateway.
pub type SharedGateway = Arc<dyn ResourceGateway>;

// =============================================================================
// Gateway Trait
// =============================================================================

/// Typed access to the seven API operations.
#[async_trait]
pub trait ResourceGateway: Send + Sync {
    async fn list_tables(&self) -> GatewayResult<Vec<Table>>;

    async fn list_reservations(&self) -> GatewayResult<Vec<Reservation>>;

    /// Waiting entries only, in arrival order.
    async fn list_waitlist(&self) -> GatewayResult<Vec<WaitlistEntry>>;

    async fn fetch_dashboard(&self) -> GatewayResult<DashboardStats>;

    async fn create_reservation(&self, body: &NewReservation) -> GatewayResult<Reservation>;

    async fn create_waitlist_entry(&self, body: &NewWaitlistEntry) -> GatewayResult<WaitlistEntry>;

    async fn set_table_occupancy(&self, table_id: i64, is_occupied: bool) -> GatewayResult<Table>;
}

// =============================================================================
// Response Shapes
// =============================================================================

/// `POST /waitlist` answers with the bare entry, or wraps it with a message
/// when the backend seated the party on the spot.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CreatedWaitlistEntry {
    Wrapped {
        message: String,
        waitlist: WaitlistEntry,
    },
    Bare(WaitlistEntry),
}

impl CreatedWaitlistEntry {
    fn into_entry(self) -> WaitlistEntry {
        match self {
            CreatedWaitlistEntry::Wrapped { message, waitlist } => {
                info!(entry_id = waitlist.id, %message, "Waitlist entry created with note");
                waitlist
            }
            CreatedWaitlistEntry::Bare(entry) => entry,
        }
    }
}

// =============================================================================
// HTTP Gateway
// =============================================================================

/// reqwest-backed gateway.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
}

impl HttpGateway {
    /// Creates a gateway rooted at `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> SyncResult<Self> {
        let mut base_url = Url::parse(base_url.trim_end_matches('/'))?;
        if base_url.cannot_be_a_base() {
            return Err(SyncError::InvalidUrl(base_url.to_string()));
        }
        // Url::join replaces the last segment unless the path ends in '/'.
        let path = format!("{}/", base_url.path().trim_end_matches('/'));
        base_url.set_path(&path);

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Client(e.to_string()))?;

        debug!(base_url = %base_url, ?timeout, "HTTP gateway ready");
        Ok(HttpGateway { client, base_url })
    }

    pub fn from_config(config: &ConsoleConfig) -> SyncResult<Self> {
        Self::new(config.base_url(), config.request_timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> GatewayResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| GatewayError::NetworkUnavailable(format!("bad endpoint {}: {}", path, e)))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<T> {
        let url = self.endpoint(path)?;
        debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        Self::decode(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> GatewayResult<T> {
        let url = self.endpoint(path)?;
        debug!(%url, "POST");
        let response = self.client.post(url).json(body).send().await?;
        Self::decode(response).await
    }

    async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> GatewayResult<T> {
        let url = self.endpoint(path)?;
        debug!(%url, "PUT");
        let response = self.client.put(url).json(body).send().await?;
        Self::decode(response).await
    }

    /// Maps status and body onto the gateway error taxonomy.
    async fn decode<T: DeserializeOwned>(response: Response) -> GatewayResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::ServerError {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl ResourceGateway for HttpGateway {
    async fn list_tables(&self) -> GatewayResult<Vec<Table>> {
        self.get("tables").await
    }

    async fn list_reservations(&self) -> GatewayResult<Vec<Reservation>> {
        self.get("reservations").await
    }

    async fn list_waitlist(&self) -> GatewayResult<Vec<WaitlistEntry>> {
        self.get("waitlist").await
    }

    async fn fetch_dashboard(&self) -> GatewayResult<DashboardStats> {
        self.get("dashboard").await
    }

    async fn create_reservation(&self, body: &NewReservation) -> GatewayResult<Reservation> {
        self.post("reservations", body).await
    }

    async fn create_waitlist_entry(&self, body: &NewWaitlistEntry) -> GatewayResult<WaitlistEntry> {
        let created: CreatedWaitlistEntry = self.post("waitlist", body).await?;
        Ok(created.into_entry())
    }

    async fn set_table_occupancy(&self, table_id: i64, is_occupied: bool) -> GatewayResult<Table> {
        self.put(
            &format!("tables/{}", table_id),
            &TableOccupancyUpdate { is_occupied },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use krabby_core::{ReservationStatus, WaitlistStatus};
    use serde_json::{json, Value};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serves exactly one canned HTTP response and hands back the raw request.
    async fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}/api", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );

        let task = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];

            // Headers, then as much body as content-length announces.
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(end) = text.find("\r\n\r\n") {
                    let expected = text[..end]
                        .lines()
                        .find_map(|l| {
                            let lower = l.to_ascii_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if request.len() >= end + 4 + expected {
                        break;
                    }
                }
            }

            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });

        (base, task)
    }

    fn gateway(base: &str) -> HttpGateway {
        HttpGateway::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_endpoint_joining_keeps_api_prefix() {
        for base in ["http://localhost:5000/api", "http://localhost:5000/api/"] {
            let gw = gateway(base);
            assert_eq!(
                gw.endpoint("tables/3").unwrap().as_str(),
                "http://localhost:5000/api/tables/3"
            );
        }
    }

    #[test]
    fn test_waitlist_response_shapes() {
        let bare: CreatedWaitlistEntry = serde_json::from_str(
            r#"{"id": 3, "customer_name": "Plankton", "phone_number": "555-1212",
                "email": null, "party_size": 2, "estimated_wait_time": 15,
                "status": "waiting", "joined_at": "2024-06-01T18:00:00"}"#,
        )
        .unwrap();
        assert_eq!(bare.into_entry().id, 3);

        let wrapped: CreatedWaitlistEntry = serde_json::from_str(
            r#"{"message": "Customer seated immediately at table 4",
                "waitlist": {"id": 9, "customer_name": "Squidward", "phone_number": "555-0001",
                "email": null, "party_size": 1, "estimated_wait_time": null,
                "status": "seated", "joined_at": "2024-06-01T18:00:00"}}"#,
        )
        .unwrap();
        let entry = wrapped.into_entry();
        assert_eq!(entry.id, 9);
        assert_eq!(entry.status, WaitlistStatus::Seated);
    }

    #[tokio::test]
    async fn test_list_tables_decodes_payload() {
        let (base, server) = serve_once(
            "200 OK",
            r#"[{"id": 1, "table_number": 1, "capacity": 4, "is_occupied": false}]"#,
        )
        .await;

        let tables = gateway(&base).list_tables().await.unwrap();
        assert_eq!(tables.len(), 1);
        assert!(tables[0].is_available());

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/tables HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_set_occupancy_sends_put_body() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"id": 7, "table_number": 7, "capacity": 2, "is_occupied": true}"#,
        )
        .await;

        let table = gateway(&base).set_table_occupancy(7, true).await.unwrap();
        assert!(table.is_occupied);

        let request = server.await.unwrap();
        assert!(request.starts_with("PUT /api/tables/7 HTTP/1.1"));
        assert!(request.ends_with(r#"{"is_occupied":true}"#));
    }

    /// Splits a raw request into its request line and decoded JSON body.
    fn request_parts(request: &str) -> (&str, Value) {
        let (head, body) = request.split_once("\r\n\r\n").unwrap();
        let line = head.lines().next().unwrap();
        (line, serde_json::from_str(body).unwrap())
    }

    #[tokio::test]
    async fn test_create_reservation_posts_body() {
        let (base, server) = serve_once(
            "201 CREATED",
            r#"{"id": 12, "customer_name": "Mr. Krabs", "phone_number": "555-0100",
                "email": "krabs@krustykrab.com", "party_size": 4,
                "reservation_time": "2024-06-01T19:30:00", "status": "pending",
                "table_id": null, "created_at": "2024-05-30T09:00:00"}"#,
        )
        .await;

        let body = NewReservation {
            customer_name: "Mr. Krabs".into(),
            phone_number: "555-0100".into(),
            email: Some("krabs@krustykrab.com".into()),
            party_size: 4,
            reservation_time: NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .and_hms_opt(19, 30, 0)
                .unwrap(),
        };
        let created = gateway(&base).create_reservation(&body).await.unwrap();
        assert_eq!(created.id, 12);
        assert_eq!(created.status, ReservationStatus::Pending);
        assert_eq!(created.table_id, None);

        let request = server.await.unwrap();
        let (line, sent) = request_parts(&request);
        assert_eq!(line, "POST /api/reservations HTTP/1.1");
        assert_eq!(
            sent,
            json!({
                "customer_name": "Mr. Krabs",
                "phone_number": "555-0100",
                "email": "krabs@krustykrab.com",
                "party_size": 4,
                "reservation_time": "2024-06-01T19:30:00"
            })
        );
    }

    #[tokio::test]
    async fn test_create_waitlist_entry_unwraps_seated_answer() {
        let (base, server) = serve_once(
            "201 CREATED",
            r#"{"message": "Customer seated immediately at table 4",
                "waitlist": {"id": 9, "customer_name": "Squidward", "phone_number": "555-0001",
                "email": null, "party_size": 1, "estimated_wait_time": null,
                "status": "seated", "joined_at": "2024-06-01T18:00:00"}}"#,
        )
        .await;

        let body = NewWaitlistEntry {
            customer_name: "Squidward".into(),
            phone_number: "555-0001".into(),
            email: None,
            party_size: 1,
        };
        let entry = gateway(&base).create_waitlist_entry(&body).await.unwrap();
        assert_eq!(entry.id, 9);
        assert_eq!(entry.status, WaitlistStatus::Seated);

        let request = server.await.unwrap();
        let (line, sent) = request_parts(&request);
        assert_eq!(line, "POST /api/waitlist HTTP/1.1");
        assert_eq!(
            sent,
            json!({"customer_name": "Squidward", "phone_number": "555-0001", "party_size": 1})
        );
    }

    #[tokio::test]
    async fn test_non_success_status_is_server_error() {
        let (base, server) = serve_once("500 Internal Server Error", r#"{"error": "boom"}"#).await;

        let err = gateway(&base).fetch_dashboard().await.unwrap_err();
        match err {
            GatewayError::ServerError { status, body } => {
                assert_eq!(status, 500);
                assert!(body.contains("boom"));
            }
            other => panic!("expected ServerError, got {:?}", other),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_wrong_shape_is_malformed() {
        let (base, server) = serve_once("200 OK", r#"{"tables": "nope"}"#).await;

        let err = gateway(&base).list_tables().await.unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse(_)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_refused_connection_is_network_unavailable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}/api", listener.local_addr().unwrap());
        drop(listener);

        let err = gateway(&base).list_waitlist().await.unwrap_err();
        assert!(matches!(err, GatewayError::NetworkUnavailable(_)));
    }
}
