use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::{info, warn};
use validator::Validate;

use crate::dto::user_dto::{CreateUserRequest, LoginRequest, UpdateUserRequest};
use crate::service::user_service::{AuthUser, UserService, UserServiceImpl};
use crate::util::error::{parse_id, HandlerError};

pub async fn login_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    info!("[login_handler] Login attempt for {}", payload.username);
    payload.validate()?;
    let response = service.login(payload).await.inspect_err(|e| {
        warn!("[login_handler] Login failed: {}", e);
    })?;
    Ok(Json(response))
}

pub async fn logout_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Extension(caller): Extension<AuthUser>,
) -> Result<impl IntoResponse, HandlerError> {
    service.logout(&caller).await?;
    info!("[logout_handler] {} logged out", caller.username);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Extension(caller): Extension<AuthUser>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.me(&caller).await?))
}

pub async fn list_users_handler(State(service): State<Arc<UserServiceImpl>>) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.list_users().await?))
}

pub async fn get_user_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "user")?;
    Ok(Json(service.get_user(&caller, id).await?))
}

pub async fn create_user_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate()?;
    let user = service.create_user(payload).await?;
    info!("[create_user_handler] Created user {}", user.username);
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "user")?;
    payload.validate()?;
    Ok(Json(service.update_user(&caller, id, payload).await?))
}

pub async fn delete_user_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    if !caller.is_admin() {
        return Err(HandlerError::forbidden("Admin role required"));
    }
    let id = parse_id(&id, "user")?;
    service.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
