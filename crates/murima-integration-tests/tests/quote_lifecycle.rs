//! # Moving Quote Lifecycle Over HTTP
//!
//! The quote lifecycle is the one that carries a payload: moving to
//! `quoted` must stamp an amount atomically with the status change.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use murima_api::state::AppState;
use murima_core::Role;

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post(uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn put(uri: &str, token: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn register(app: &axum::Router, state: &AppState, email: &str, role: Role) -> String {
    let resp = app
        .clone()
        .oneshot(post(
            "/v1/auth/register",
            None,
            serde_json::json!({
                "email": email,
                "password": "correct-horse-battery",
                "full_name": "Test Account",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    if role != Role::User {
        let id = state
            .profiles
            .find(|p| p.email.as_str() == email)
            .unwrap()
            .id;
        let _ = state.profiles.try_update(&id, |p| -> Result<(), ()> {
            p.role = role;
            Ok(())
        });
    }
    body["token"].as_str().unwrap().to_string()
}

/// Create a mover and a pending quote against it; return the quote id.
async fn seed_quote(app: &axum::Router, owner: &str, client: &str) -> String {
    let resp = app
        .clone()
        .oneshot(post(
            "/v1/movers",
            Some(owner),
            serde_json::json!({
                "name": "Haraka Movers",
                "location": "Mombasa Road, Nairobi",
                "price_range": "KSh 15,000 - 40,000",
                "services": ["packing", "storage"],
                "images": [{"name": "truck.jpg", "data_hex": "ffd8ff"}],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let service_id = body_json(resp).await["id"].as_str().unwrap().to_string();

    let moving_date = chrono::Utc::now().date_naive() + chrono::Days::new(30);
    let resp = app
        .clone()
        .oneshot(post(
            "/v1/quotes",
            Some(client),
            serde_json::json!({
                "service_id": service_id,
                "client_name": "Wanjiru Kamau",
                "client_email": "wanjiru@example.com",
                "client_phone": "0722000111",
                "pickup_location": "Kilimani, Nairobi",
                "delivery_location": "Runda, Nairobi",
                "moving_date": moving_date,
                "inventory": "3-bedroom household, one piano",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn quote_is_priced_then_frozen() {
    let state = AppState::new();
    let app = murima_api::app(state.clone());
    let owner = register(&app, &state, "mover@example.com", Role::User).await;
    let client = register(&app, &state, "client@example.com", Role::User).await;
    let admin = register(&app, &state, "admin@example.com", Role::Admin).await;
    let quote_id = seed_quote(&app, &owner, &client).await;

    // Pricing requires confirmation first; quoted-from-pending is illegal.
    let resp = app
        .clone()
        .oneshot(put(
            &format!("/v1/quotes/{quote_id}/transition"),
            &admin,
            serde_json::json!({"target_status": "quoted", "quote_amount": 50000}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = app
        .clone()
        .oneshot(put(
            &format!("/v1/quotes/{quote_id}/transition"),
            &admin,
            serde_json::json!({"target_status": "confirmed"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Pricing without an amount fails and changes nothing.
    let resp = app
        .clone()
        .oneshot(put(
            &format!("/v1/quotes/{quote_id}/transition"),
            &admin,
            serde_json::json!({"target_status": "quoted"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let resp = app
        .clone()
        .oneshot(put(
            &format!("/v1/quotes/{quote_id}/transition"),
            &admin,
            serde_json::json!({"target_status": "quoted", "quote_amount": 50000}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let quoted = body_json(resp).await;
    assert_eq!(quoted["status"], "quoted");
    assert_eq!(quoted["quote_amount"], 50000);

    // Quoted is terminal.
    let resp = app
        .clone()
        .oneshot(put(
            &format!("/v1/quotes/{quote_id}/transition"),
            &admin,
            serde_json::json!({"target_status": "pending"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // The client sees the priced quote in their own listing.
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/v1/quotes/mine")
                .header("authorization", format!("Bearer {client}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let mine = body_json(resp).await;
    assert_eq!(mine[0]["quote_amount"], 50000);
}
