use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::service::user_service::{AuthUser, UserService, UserServiceImpl};
use crate::util::error::HandlerError;
use crate::util::jwt::JwtTokenUtils;

pub struct AuthState {
    pub user_service: Arc<UserServiceImpl>,
}

/// Resolves the bearer token to an open session and exposes the caller as an
/// `AuthUser` request extension.
pub async fn require_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| HandlerError::unauthorized("Missing authorization header"))?;

    let token = state.user_service.jwt_utils.extract_token_from_header(header).map_err(|e| {
        warn!("Rejected authorization header: {}", e);
        HandlerError::unauthorized("Invalid authorization header")
    })?;
    let caller = state.user_service.authenticate(&token).await?;
    debug!(user = %caller.username, role = caller.role.as_str(), "Authenticated request");

    req.extensions_mut().insert(caller);
    Ok(next.run(req).await)
}

/// Must sit inside `require_auth`.
pub async fn require_admin(req: Request<Body>, next: Next) -> Result<Response, HandlerError> {
    match req.extensions().get::<AuthUser>().map(AuthUser::is_admin) {
        Some(true) => Ok(next.run(req).await),
        Some(false) => Err(HandlerError::forbidden("Admin role required")),
        None => Err(HandlerError::unauthorized("Not authenticated")),
    }
}
