mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::{json, Value};

async fn create_quote(router: &axum::Router, token: &str, client_id: &str, status: &str) -> Value {
    let (code, quote) = post(
        router,
        "/api/quotes",
        token,
        json!({
            "client_id": client_id,
            "name": "Shaker kitchen",
            "category": "Kitchen",
            "initial_amount": 12000.0,
            "final_amount": 10000.0,
            "status": status,
            "estimated_build_days": 12,
            "extras": [{ "description": "Pantry unit", "price": 450.0 }],
        }),
    )
    .await;
    assert_eq!(code, StatusCode::CREATED, "quote creation failed: {}", quote);
    quote
}

#[tokio::test]
async fn test_converting_a_sent_quote_is_refused() {
    let router = test_router().await;
    let token = admin_token(&router).await;
    let client_id = create_client(&router, &token, "Smith").await;
    let quote = create_quote(&router, &token, &client_id, "Sent").await;

    let (status, body) = post(
        &router,
        &format!("/api/quotes/{}/convert-to-job", quote["id"].as_str().unwrap()),
        &token,
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Conflict");
}

#[tokio::test]
async fn test_accepted_quote_converts_once() {
    let router = test_router().await;
    let token = admin_token(&router).await;
    let client_id = create_client(&router, &token, "Smith").await;
    let quote = create_quote(&router, &token, &client_id, "Accepted").await;
    let quote_id = quote["id"].as_str().unwrap();
    let uri = format!("/api/quotes/{}/convert-to-job", quote_id);

    let (status, job) = post(&router, &uri, &token, json!({})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(job["quote_id"], quote_id);
    assert_eq!(job["client_id"], client_id.as_str());
    assert_eq!(job["price"], 10000.0);
    assert_eq!(job["stage"], "NotStarted");
    assert_eq!(job["estimated_build_days"], 12);
    assert!(job["booking_date"].is_null());
    assert_eq!(job["payments"].as_array().unwrap().len(), 4);
    assert_eq!(payment(&job, "Deposit").unwrap()["amount"], 1000.0);

    let (status, _) = post(&router, &uri, &token, json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, quote) = get(&router, &format!("/api/quotes/{}", quote_id), &token).await;
    assert_eq!(quote["has_job"], true);

    let (status, _) = delete(&router, &format!("/api/quotes/{}", quote_id), &token).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_quote_extras_crud() {
    let router = test_router().await;
    let token = admin_token(&router).await;
    let client_id = create_client(&router, &token, "Smith").await;
    let quote = create_quote(&router, &token, &client_id, "NotSent").await;
    let quote_id = quote["id"].as_str().unwrap();
    assert_eq!(quote["extras"].as_array().unwrap().len(), 1);
    assert_eq!(quote["created_by"].as_str().unwrap().len(), 24);

    let extras_uri = format!("/api/quotes/{}/extras", quote_id);
    let (status, extra) = post(&router, &extras_uri, &token, json!({ "description": "Plinth lights", "price": 120.0 })).await;
    assert_eq!(status, StatusCode::CREATED);
    let extra_id = extra["id"].as_str().unwrap().to_string();

    let (status, updated) = put(&router, &format!("{}/{}", extras_uri, extra_id), &token, json!({ "price": 150.0 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"], 150.0);
    assert_eq!(updated["description"], "Plinth lights");

    let (_, extras) = get(&router, &extras_uri, &token).await;
    assert_eq!(extras.as_array().unwrap().len(), 2);

    let (status, _) = delete(&router, &format!("{}/{}", extras_uri, extra_id), &token).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = delete(&router, &format!("{}/{}", extras_uri, extra_id), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, extras) = get(&router, &extras_uri, &token).await;
    assert_eq!(extras.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_quote_update_and_filter() {
    let router = test_router().await;
    let token = admin_token(&router).await;
    let smith = create_client(&router, &token, "Smith").await;
    let jones = create_client(&router, &token, "Jones").await;
    let quote = create_quote(&router, &token, &smith, "Sent").await;
    create_quote(&router, &token, &jones, "Rejected").await;

    let (status, updated) = put(
        &router,
        &format!("/api/quotes/{}", quote["id"].as_str().unwrap()),
        &token,
        json!({ "status": "AcceptedNegotiated", "final_amount": null }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "AcceptedNegotiated");
    assert!(updated["final_amount"].is_null());
    assert_eq!(updated["extras"].as_array().unwrap().len(), 1);

    let (_, smiths) = get(&router, &format!("/api/quotes?client_id={}", smith), &token).await;
    assert_eq!(smiths.as_array().unwrap().len(), 1);
    assert_eq!(smiths[0]["client_name"], "Smith");
    let (_, all) = get(&router, "/api/quotes", &token).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (status, stats) = get(&router, "/api/quotes/stats", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_quotes"], 2);
    assert_eq!(stats["accepted_quotes"], 1);
    assert_eq!(stats["rejected_quotes"], 1);
    assert_eq!(stats["conversion_rate"], 50.0);
}

#[tokio::test]
async fn test_client_crud_and_dependents() {
    let router = test_router().await;
    let token = admin_token(&router).await;

    let (status, _) = post(&router, "/api/clients", &token, json!({ "name": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, client) = post(
        &router,
        "/api/clients",
        &token,
        json!({ "name": "Smith", "email": "smith@example.com", "phone": "0123" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = client["id"].as_str().unwrap().to_string();
    assert_eq!(client["lifetime_spend"], 0.0);
    assert_eq!(client["job_count"], 0);

    let (status, updated) = put(&router, &format!("/api/clients/{}", id), &token, json!({ "address": "1 Oak Lane" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["address"], "1 Oak Lane");
    assert_eq!(updated["email"], "smith@example.com");

    create_job(
        &router,
        &token,
        json!({ "client_id": id, "name": "Wardrobes", "category": "Wardrobe", "price": 2500.0 }),
    )
    .await;
    let (_, client) = get(&router, &format!("/api/clients/{}", id), &token).await;
    assert_eq!(client["lifetime_spend"], 2500.0);
    assert_eq!(client["job_count"], 1);

    let (_, jobs) = get(&router, &format!("/api/clients/{}/jobs", id), &token).await;
    assert_eq!(jobs.as_array().unwrap().len(), 1);
    let (_, quotes) = get(&router, &format!("/api/clients/{}/quotes", id), &token).await;
    assert!(quotes.as_array().unwrap().is_empty());

    let (status, _) = delete(&router, &format!("/api/clients/{}", id), &token).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let empty = create_client(&router, &token, "Nobody").await;
    let (status, _) = delete(&router, &format!("/api/clients/{}", empty), &token).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = get(&router, &format!("/api/clients/{}", empty), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_client_invoicing_reference() {
    let router = test_router().await;
    let token = admin_token(&router).await;
    let id = create_client(&router, &token, "Smith").await;

    let (status, body) = post(&router, &format!("/api/clients/{}/create-in-invoicing", id), &token, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let reference = body["invoicing_ref"].as_str().unwrap();
    assert!(reference.starts_with(&format!("INV-CL-{}-", id)));

    let (_, client) = get(&router, &format!("/api/clients/{}", id), &token).await;
    assert_eq!(client["invoicing_ref"], reference);
}

#[tokio::test]
async fn test_quote_day_estimates_are_capped_on_update() {
    let router = test_router().await;
    let token = admin_token(&router).await;
    let client_id = create_client(&router, &token, "Smith").await;
    let quote = create_quote(&router, &token, &client_id, "Accepted").await;
    let uri = format!("/api/quotes/{}", quote["id"].as_str().unwrap());

    let (status, _) = put(&router, &uri, &token, json!({ "estimated_build_days": 4_000_000_000u32 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = put(&router, &uri, &token, json!({ "estimated_fitting_days": 366 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, updated) = put(&router, &uri, &token, json!({ "estimated_build_days": 20 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["estimated_build_days"], 20);
}
