//! # Image Upload Failure Leaves No Trace
//!
//! Listing creation uploads the image batch before writing the record.
//! If any file in the batch fails, the whole submission fails, already
//! stored siblings are rolled back, and the error names the file.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use murima_api::state::AppState;
use murima_media::InMemoryMediaStore;

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

async fn register(app: &axum::Router, email: &str) -> String {
    let resp = app
        .clone()
        .oneshot(post(
            "/v1/auth/register",
            None,
            serde_json::json!({
                "email": email,
                "password": "correct-horse-battery",
                "full_name": "Njeri Kariuki",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn failed_batch_creates_no_listing_and_no_objects() {
    let media = InMemoryMediaStore::new();
    media.fail_keys_containing(".png");
    let mut state = AppState::with_media(Arc::new(media.clone()));
    state.config = Arc::new(murima_api::state::AppConfig::default());
    let app = murima_api::app(state.clone());

    let token = register(&app, "landlord@example.com").await;
    let resp = app
        .clone()
        .oneshot(post(
            "/v1/properties",
            Some(&token),
            serde_json::json!({
                "title": "Two-bedroom in Westlands",
                "property_type": "rental",
                "location": "Westlands, Nairobi",
                "price": 65000,
                "price_type": "per_month",
                "images": [
                    {"name": "living_room.jpg", "data_hex": "ffd8ffe0"},
                    {"name": "kitchen.png", "data_hex": "89504e47"},
                    {"name": "bedroom.jpg", "data_hex": "ffd8ffe2"},
                ],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // The error names the failing file.
    let body = body_json(resp).await;
    let message = body["error"]["message"].as_str().unwrap();
    assert!(
        message.contains("kitchen.png"),
        "error should name the failed file, got: {message}"
    );

    // No listing, and the sibling that uploaded first was rolled back.
    assert!(state.properties.is_empty());
    assert_eq!(media.object_count(), 0);
}

#[tokio::test]
async fn successful_batch_is_stored_in_submission_order() {
    let media = InMemoryMediaStore::new();
    let mut state = AppState::with_media(Arc::new(media.clone()));
    state.config = Arc::new(murima_api::state::AppConfig::default());
    let app = murima_api::app(state.clone());

    let token = register(&app, "landlord@example.com").await;
    let resp = app
        .clone()
        .oneshot(post(
            "/v1/properties",
            Some(&token),
            serde_json::json!({
                "title": "Office floor in Upper Hill",
                "property_type": "office",
                "location": "Upper Hill, Nairobi",
                "price": 180000,
                "price_type": "per_month",
                "area_sqm": 240,
                "images": [
                    {"name": "reception.jpg", "data_hex": "ffd8ffe0"},
                    {"name": "boardroom.jpg", "data_hex": "ffd8ffe1"},
                ],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let property = body_json(resp).await;
    let images = property["images"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(media.object_count(), 2);
    // Submission order survives into the stored record, and the primary
    // image is the first of the batch.
    assert!(images[0].as_str().unwrap().contains("/listings/"));
    assert_eq!(property["image"], *images.first().unwrap());
}
