//! In-process HTTP fixtures for API tests.

use axum::Router;
use serde_json::{json, Value};

use super::types::User;

/// Serves `router` on an ephemeral local port and returns its base URL.
pub(crate) async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

pub(crate) fn stub_user_json() -> Value {
    json!({
        "_id": "u-1",
        "name": "Mai",
        "email": "mai@example.com",
        "username": "mai",
        "role": "staff",
        "verify": 1,
        "avatar": ""
    })
}

pub(crate) fn stub_user() -> User {
    serde_json::from_value(stub_user_json()).unwrap()
}
