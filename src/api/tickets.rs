//! Ticket verification endpoint.

use async_trait::async_trait;
use serde::Serialize;

use super::client::ApiClient;
use super::error::{ApiError, ErrorMessages};
use super::types::Envelope;
use crate::verification::{VerificationEndpoint, VerificationRecord};

const VERIFY_PATH: &str = "/users/verify-ticket";

#[derive(Serialize)]
struct VerifyTicketRequest<'a> {
    ticket_code: &'a str,
}

/// `POST /users/verify-ticket` with a staff bearer token.
#[derive(Clone)]
pub struct TicketEndpoint {
    client: ApiClient,
    token: String,
}

impl std::fmt::Debug for TicketEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketEndpoint")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl TicketEndpoint {
    pub(crate) fn new(client: ApiClient, token: String) -> Self {
        Self { client, token }
    }
}

#[async_trait]
impl VerificationEndpoint for TicketEndpoint {
    async fn verify_ticket(&self, ticket_code: &str) -> Result<VerificationRecord, ApiError> {
        let request = self
            .client
            .post(VERIFY_PATH)
            .bearer_auth(&self.token)
            .json(&VerifyTicketRequest { ticket_code });

        let envelope: Envelope<VerificationRecord> =
            self.client.send(request, &ErrorMessages::STAFF).await?;
        tracing::debug!(
            code = ticket_code,
            message = %envelope.message,
            status = ?envelope.result.status,
            "Ticket verified"
        );
        Ok(envelope.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{serve, stub_user};
    use crate::auth::AuthSession;
    use crate::scanner::ApiConfig;
    use crate::verification::{BookingStatus, PaymentStatus};
    use axum::{http::HeaderMap, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    async fn verify_handler(
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let auth = headers.get("authorization").and_then(|v| v.to_str().ok());
        if auth != Some("Bearer staff-token") {
            return (StatusCode::UNAUTHORIZED, Json(json!({"message": "jwt malformed"})));
        }
        match body["ticket_code"].as_str() {
            Some("T-001") => (
                StatusCode::OK,
                Json(json!({
                    "message": "Ticket verified",
                    "result": {
                        "booking_id": "b-1",
                        "ticket_code": "T-001",
                        "status": "confirmed",
                        "payment_status": "completed",
                        "booking_time": "2025-06-01T10:00:00Z",
                        "verified_at": "2025-06-01T18:45:00Z"
                    }
                })),
            ),
            Some("BOOM") => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"message": "db down"})),
            ),
            _ => (StatusCode::NOT_FOUND, Json(json!({"message": "Ticket not found"}))),
        }
    }

    async fn endpoint_for(base_url: String, token: &str) -> TicketEndpoint {
        let client = ApiClient::new(&ApiConfig::with_base_url(base_url)).unwrap();
        let mut session = AuthSession::new();
        session.login(stub_user(), token);
        client.ticket_endpoint(&session).unwrap()
    }

    #[tokio::test]
    async fn test_verify_success() {
        let base = serve(Router::new().route(VERIFY_PATH, post(verify_handler))).await;
        let endpoint = endpoint_for(base, "staff-token").await;

        let record = endpoint.verify_ticket("T-001").await.unwrap();
        assert_eq!(record.ticket_code, "T-001");
        assert_eq!(record.status, BookingStatus::Confirmed);
        assert_eq!(record.payment_status, PaymentStatus::Completed);
    }

    #[tokio::test]
    async fn test_verify_error_statuses() {
        let base = serve(Router::new().route(VERIFY_PATH, post(verify_handler))).await;

        let endpoint = endpoint_for(base.clone(), "staff-token").await;
        let err = endpoint.verify_ticket("T-404").await.unwrap_err();
        assert_eq!(err, ApiError::NotFound("Ticket not found".into()));

        let err = endpoint.verify_ticket("BOOM").await.unwrap_err();
        assert_eq!(err.to_string(), "Server error. Please try again later.");

        let stale = endpoint_for(base, "expired").await;
        let err = stale.verify_ticket("T-001").await.unwrap_err();
        assert_eq!(err.to_string(), "Unauthorized. Please login as admin.");
    }

    #[tokio::test]
    async fn test_verify_without_server_is_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let endpoint = endpoint_for(format!("http://{addr}"), "staff-token").await;
        let err = endpoint.verify_ticket("T-001").await.unwrap_err();
        assert_eq!(err.to_string(), "Network error. Please check your connection.");
    }
}
