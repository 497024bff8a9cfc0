mod common;

use axum::http::StatusCode;
use chrono::{Datelike, Duration, Local};
use common::*;
use serde_json::{json, Value};

#[tokio::test]
async fn test_kitchen_job_payment_schedule() {
    let router = test_router().await;
    let token = admin_token(&router).await;
    let client_id = create_client(&router, &token, "Smith").await;

    let job = create_job(
        &router,
        &token,
        json!({
            "client_id": client_id,
            "name": "Smith kitchen",
            "category": "Kitchen",
            "booking_date": "2024-01-05",
            "build_start_date": "2024-02-01",
            "fitting_date": "2024-03-01",
            "price": 10000.0,
        }),
    )
    .await;

    assert_eq!(job["payments"].as_array().unwrap().len(), 4);
    let deposit = payment(&job, "Deposit").unwrap();
    assert_eq!(deposit["amount"], 1000.0);
    assert_eq!(deposit["due_date"], "2024-01-05");
    assert_eq!(deposit["status"], "Due");
    let build = payment(&job, "BuildInstallment").unwrap();
    assert_eq!(build["amount"], 4000.0);
    assert_eq!(build["due_date"], "2024-02-01");
    let fit = payment(&job, "FittingInstallment").unwrap();
    assert_eq!(fit["amount"], 4000.0);
    assert_eq!(fit["due_date"], "2024-03-01");
    let completion = payment(&job, "Completion").unwrap();
    assert_eq!(completion["amount"], 1000.0);
    assert_eq!(completion["due_date"], "2024-03-01");
    assert_eq!(job["client_name"], "Smith");
}

#[tokio::test]
async fn test_non_kitchen_job_has_no_build_installment() {
    let router = test_router().await;
    let token = admin_token(&router).await;
    let client_id = create_client(&router, &token, "Jones").await;

    let job = create_job(
        &router,
        &token,
        json!({
            "client_id": client_id,
            "name": "Jones wardrobe",
            "category": "Wardrobe",
            "price": 10000.0,
        }),
    )
    .await;

    assert_eq!(job["payments"].as_array().unwrap().len(), 3);
    assert!(payment(&job, "BuildInstallment").is_none());
    assert_eq!(payment(&job, "Deposit").unwrap()["amount"], 5000.0);
    assert_eq!(payment(&job, "FittingInstallment").unwrap()["amount"], 4000.0);
    assert_eq!(payment(&job, "Completion").unwrap()["amount"], 1000.0);
    assert_eq!(job["status"], "NotScheduled");
}

#[tokio::test]
async fn test_job_without_price_has_no_payments() {
    let router = test_router().await;
    let token = admin_token(&router).await;
    let client_id = create_client(&router, &token, "Nguyen").await;
    let job = create_job(
        &router,
        &token,
        json!({ "client_id": client_id, "name": "Shelves", "category": "Media Wall" }),
    )
    .await;
    assert!(job["payments"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_finishing_a_job_moves_completion_to_today() {
    let router = test_router().await;
    let token = admin_token(&router).await;
    let client_id = create_client(&router, &token, "Smith").await;
    let job = create_job(
        &router,
        &token,
        json!({
            "client_id": client_id,
            "name": "Smith kitchen",
            "category": "Kitchen",
            "build_start_date": "2024-02-01",
            "fitting_date": "2024-03-01",
            "price": 10000.0,
        }),
    )
    .await;
    let id = job["id"].as_str().unwrap();

    let (status, finished) = put(&router, &format!("/api/jobs/{}/status", id), &token, json!({ "stage": "Finished" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(finished["stage"], "Finished");
    assert_eq!(finished["status"], "Completed");

    let today = Local::now().date_naive().to_string();
    assert_eq!(payment(&finished, "Completion").unwrap()["due_date"], today.as_str());
    assert_eq!(payment(&finished, "FittingInstallment").unwrap()["due_date"], "2024-03-01");
}

#[tokio::test]
async fn test_entering_fit_records_actual_build_days() {
    let router = test_router().await;
    let token = admin_token(&router).await;
    let client_id = create_client(&router, &token, "Smith").await;
    let start = Local::now().date_naive() - Duration::days(12);
    let job = create_job(
        &router,
        &token,
        json!({
            "client_id": client_id,
            "name": "Utility room",
            "category": "Utility",
            "stage": "Build",
            "build_start_date": start.to_string(),
        }),
    )
    .await;
    let id = job["id"].as_str().unwrap();

    let (status, fit) = put(&router, &format!("/api/jobs/{}/status", id), &token, json!({ "stage": "Fit" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fit["actual_build_days"], 12);
}

#[tokio::test]
async fn test_fitting_date_change_flags_client_update() {
    let router = test_router().await;
    let token = admin_token(&router).await;
    let client_id = create_client(&router, &token, "Patel").await;
    let job = create_job(
        &router,
        &token,
        json!({
            "client_id": client_id,
            "name": "Patel kitchen",
            "category": "Kitchen",
            "build_start_date": "2024-02-01",
            "fitting_date": "2024-03-01",
            "price": 10000.0,
        }),
    )
    .await;
    let id = job["id"].as_str().unwrap();
    assert_eq!(job["client_needs_update"], false);

    let (status, moved) = put(
        &router,
        &format!("/api/jobs/{}/reschedule", id),
        &token,
        json!({ "build_start_date": "2024-02-05", "fitting_date": "2024-03-08" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["client_needs_update"], true);
    assert_eq!(payment(&moved, "BuildInstallment").unwrap()["due_date"], "2024-02-05");
    assert_eq!(payment(&moved, "FittingInstallment").unwrap()["due_date"], "2024-03-08");
    assert_eq!(payment(&moved, "Completion").unwrap()["due_date"], "2024-03-08");

    let (_, updates) = get(&router, "/api/jobs/clients-needing-updates", &token).await;
    assert_eq!(updates.as_array().unwrap().len(), 1);
    assert_eq!(updates[0]["client_name"], "Patel");

    let (status, contacted) = put(&router, &format!("/api/jobs/{}", id), &token, json!({ "client_contacted": true })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(contacted["client_needs_update"], false);
    let (_, updates) = get(&router, "/api/reports/clients-needing-updates", &token).await;
    assert!(updates.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_reschedule_needs_a_date() {
    let router = test_router().await;
    let token = admin_token(&router).await;
    let client_id = create_client(&router, &token, "Smith").await;
    let job = create_job(&router, &token, json!({ "client_id": client_id, "name": "Desk", "category": "Study" })).await;

    let (status, _) = put(&router, &format!("/api/jobs/{}/reschedule", job["id"].as_str().unwrap()), &token, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_price_update_regenerates_schedule() {
    let router = test_router().await;
    let token = admin_token(&router).await;
    let client_id = create_client(&router, &token, "Smith").await;
    let job = create_job(
        &router,
        &token,
        json!({ "client_id": client_id, "name": "Wardrobes", "category": "Wardrobe", "price": 1000.0 }),
    )
    .await;
    let id = job["id"].as_str().unwrap();

    let (status, repriced) = put(&router, &format!("/api/jobs/{}", id), &token, json!({ "price": 3000.0 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(repriced["payments"].as_array().unwrap().len(), 3);
    assert_eq!(payment(&repriced, "Deposit").unwrap()["amount"], 1500.0);

    let (status, _) = put(&router, &format!("/api/jobs/{}", id), &token, json!({ "price": -5.0 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_schedule_lists_stage_windows() {
    let router = test_router().await;
    let token = admin_token(&router).await;
    let client_id = create_client(&router, &token, "Smith").await;
    create_job(
        &router,
        &token,
        json!({
            "client_id": client_id,
            "name": "Smith kitchen",
            "category": "Kitchen",
            "build_start_date": "2024-02-01",
            "build_duration_days": 10,
        }),
    )
    .await;
    create_job(&router, &token, json!({ "client_id": client_id, "name": "Unplanned", "category": "Kitchen" })).await;

    let (status, schedule) = get(&router, "/api/jobs/schedule", &token).await;
    assert_eq!(status, StatusCode::OK);
    let rows = schedule.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["client"], "Smith");
    let stages = rows[0]["stages"].as_array().unwrap();
    assert_eq!(stages[0]["name"], "Build");
    assert_eq!(stages[0]["start"], "2024-02-01");
    assert_eq!(stages[0]["end"], "2024-02-11");
    assert_eq!(stages[1]["name"], "Spray");
    assert_eq!(stages[1]["start"], "2024-02-10");
    assert_eq!(stages[1]["end"], "2024-02-15");
    assert_eq!(stages[2]["name"], "Fit");
    assert_eq!(stages[2]["start"], "2024-02-16");
}

#[tokio::test]
async fn test_weekly_calendar_shows_this_weeks_build() {
    let router = test_router().await;
    let token = admin_token(&router).await;
    let client_id = create_client(&router, &token, "Smith").await;
    let today = Local::now().date_naive();
    let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);

    create_job(
        &router,
        &token,
        json!({
            "client_id": client_id,
            "name": "Smith kitchen",
            "category": "Kitchen",
            "build_start_date": monday.to_string(),
            "build_duration_days": 14,
        }),
    )
    .await;

    let (status, events) = get(&router, "/api/jobs/weekly-calendar", &token).await;
    assert_eq!(status, StatusCode::OK);
    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 7);
    assert!(events.iter().all(|e| e["stage"] == "Build"));
    assert_eq!(events[0]["date"], monday.to_string());
    assert_eq!(events[0]["client_name"], "Smith");
}

#[tokio::test]
async fn test_deleting_a_job_removes_its_payments() {
    let router = test_router().await;
    let token = admin_token(&router).await;
    let client_id = create_client(&router, &token, "Smith").await;
    let job = create_job(
        &router,
        &token,
        json!({ "client_id": client_id, "name": "Wardrobes", "category": "Wardrobe", "price": 900.0 }),
    )
    .await;
    let id = job["id"].as_str().unwrap();

    let (status, _) = delete(&router, &format!("/api/jobs/{}", id), &token).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, payments) = get(&router, &format!("/api/payments?job_id={}", id), &token).await;
    assert!(payments.as_array().unwrap().is_empty());
    let (status, _) = get(&router, &format!("/api/jobs/{}", id), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_ids_and_dates() {
    let router = test_router().await;
    let token = admin_token(&router).await;
    let (status, _) = get(&router, "/api/jobs/not-an-id", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let client_id = create_client(&router, &token, "Smith").await;
    let (status, _) = post(
        &router,
        "/api/jobs",
        &token,
        json!({ "client_id": client_id, "name": "X", "category": "Kitchen", "build_start_date": "01/02/2024" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        &router,
        "/api/jobs",
        &token,
        json!({ "client_id": "65f0c0ffee0000000000abcd", "name": "X", "category": "Kitchen" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_kitchen_split_needs_an_exact_category() {
    let router = test_router().await;
    let token = admin_token(&router).await;
    let client_id = create_client(&router, &token, "Brown").await;

    let job = create_job(
        &router,
        &token,
        json!({
            "client_id": client_id,
            "name": "Brown island",
            "category": "Kitchen Island",
            "price": 10000.0,
        }),
    )
    .await;

    assert_eq!(job["payments"].as_array().unwrap().len(), 3);
    assert!(payment(&job, "BuildInstallment").is_none());
    assert_eq!(payment(&job, "Deposit").unwrap()["amount"], 5000.0);

    let lowercase = create_job(
        &router,
        &token,
        json!({ "client_id": client_id, "name": "Brown kitchen", "category": "kitchen", "price": 10000.0 }),
    )
    .await;
    assert_eq!(payment(&lowercase, "Deposit").unwrap()["amount"], 1000.0);
}

#[tokio::test]
async fn test_day_counts_are_capped_on_update() {
    let router = test_router().await;
    let token = admin_token(&router).await;
    let client_id = create_client(&router, &token, "Smith").await;
    let job = create_job(
        &router,
        &token,
        json!({
            "client_id": client_id,
            "name": "Smith kitchen",
            "category": "Kitchen",
            "stage": "Build",
            "build_start_date": "2024-02-01",
        }),
    )
    .await;
    let uri = format!("/api/jobs/{}", job["id"].as_str().unwrap());

    for field in ["build_duration_days", "estimated_build_days", "estimated_fitting_days"] {
        for days in [4_000_000_000u32, 366] {
            let mut body = serde_json::Map::new();
            body.insert(field.to_string(), json!(days));
            let (status, _) = put(&router, &uri, &token, Value::Object(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{} accepted {}", field, days);
        }
    }

    let (status, updated) = put(&router, &uri, &token, json!({ "build_duration_days": 365 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["build_duration_days"], 365);

    let (status, schedule) = get(&router, "/api/jobs/schedule", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(schedule[0]["stages"][0]["end"], "2025-01-31");
    let (status, _) = get(&router, "/api/jobs/weekly-calendar", &token).await;
    assert_eq!(status, StatusCode::OK);
}
