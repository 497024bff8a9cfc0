mod common;

use axum::http::{Method, StatusCode};
use common::*;
use serde_json::json;

#[tokio::test]
async fn test_health_is_public() {
    let router = test_router().await;
    let (status, body) = send(&router, Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_protected_routes_need_a_token() {
    let router = test_router().await;
    let (status, _) = send(&router, Method::GET, "/api/clients", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&router, Method::GET, "/api/me", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_and_me() {
    let router = test_router().await;
    let (status, body) = send(
        &router,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 480 * 60);
    assert_eq!(body["user"]["role"], "Admin");
    assert!(body["user"].get("password_hash").is_none());

    let token = body["access_token"].as_str().unwrap();
    let (status, me) = get(&router, "/api/me", token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], ADMIN_USERNAME);
    assert_eq!(me["full_name"], "Ada Admin");
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let router = test_router().await;
    let (status, body) = send(
        &router,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "username": ADMIN_USERNAME, "password": "not-the-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let (status, _) = send(
        &router,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "username": "nobody", "password": "whatever1" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_revokes_the_session() {
    let router = test_router().await;
    let token = admin_token(&router).await;

    let (status, _) = send(&router, Method::POST, "/api/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = get(&router, "/api/me", &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_management_is_admin_only() {
    let router = test_router().await;
    let admin = admin_token(&router).await;
    let fitter_id = create_staff(&router, &admin, "frank", "Fitter").await;
    let maker_id = create_staff(&router, &admin, "carla", "CabinetMaker").await;
    let fitter = login(&router, "frank", "Sawdust123").await;

    let (status, _) = get(&router, "/api/users", &fitter).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = delete(&router, &format!("/api/users/{}", maker_id), &fitter).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Own profile is fine, somebody else's is not.
    let (status, me) = get(&router, &format!("/api/users/{}", fitter_id), &fitter).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["role"], "Fitter");
    let (status, _) = get(&router, &format!("/api/users/{}", maker_id), &fitter).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = put(&router, &format!("/api/users/{}", fitter_id), &fitter, json!({ "role": "Admin" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) =
        put(&router, &format!("/api/users/{}", fitter_id), &fitter, json!({ "first_name": "Francis" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["first_name"], "Francis");

    let (status, users) = get(&router, "/api/users", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_duplicate_and_invalid_users() {
    let router = test_router().await;
    let admin = admin_token(&router).await;
    create_staff(&router, &admin, "carla", "CabinetMaker").await;

    let (status, _) = post(
        &router,
        "/api/users",
        &admin,
        json!({
            "username": "carla",
            "email": "other@workshop.test",
            "password": "Sawdust123",
            "first_name": "Carla",
            "last_name": "Two",
            "role": "Fitter",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = post(
        &router,
        "/api/users",
        &admin,
        json!({
            "username": "weak",
            "email": "weak@workshop.test",
            "password": "password",
            "first_name": "Weak",
            "last_name": "Password",
            "role": "Fitter",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        &router,
        "/api/users",
        &admin,
        json!({
            "username": "bad",
            "email": "not-an-email",
            "password": "Sawdust123",
            "first_name": "Bad",
            "last_name": "Email",
            "role": "Fitter",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_last_admin_is_protected() {
    let router = test_router().await;
    let admin = admin_token(&router).await;
    let (_, me) = get(&router, "/api/me", &admin).await;
    let admin_id = me["id"].as_str().unwrap().to_string();

    let (status, _) = delete(&router, &format!("/api/users/{}", admin_id), &admin).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = put(&router, &format!("/api/users/{}", admin_id), &admin, json!({ "role": "Manager" })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // With a second admin the first may go.
    let second = create_staff(&router, &admin, "boss", "Admin").await;
    let (status, _) = delete(&router, &format!("/api/users/{}", second), &admin).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_deleting_a_user_removes_their_absences() {
    let router = test_router().await;
    let admin = admin_token(&router).await;
    let carla = create_staff(&router, &admin, "carla", "CabinetMaker").await;
    let (status, _) = post(
        &router,
        &format!("/api/staff/{}/absences", carla),
        &admin,
        json!({ "start_date": "2024-05-01", "end_date": "2024-05-03", "type": "Leave" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = delete(&router, &format!("/api/users/{}", carla), &admin).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = get(&router, &format!("/api/staff/{}", carla), &admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = get(&router, &format!("/api/users/{}", carla), &admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
