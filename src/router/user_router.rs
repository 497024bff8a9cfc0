use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::handler::user_handler::{
    create_user_handler, delete_user_handler, get_user_handler, list_users_handler, login_handler, logout_handler,
    me_handler, update_user_handler,
};
use crate::middlewares::auth_middleware::{require_admin, require_auth, AuthState};
use crate::service::user_service::UserServiceImpl;

pub fn user_router(service: Arc<UserServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    let public = Router::new()
        .route("/login", post(login_handler));

    let authenticated = Router::new()
        .route("/logout", post(logout_handler))
        .route("/me", get(me_handler))
        .route(
            "/users/{id}",
            get(get_user_handler).put(update_user_handler).delete(delete_user_handler),
        )
        .route_layer(middleware::from_fn_with_state(auth_state.clone(), require_auth));

    // Authentication runs before the role check.
    let admin = Router::new()
        .route("/users", get(list_users_handler).post(create_user_handler))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth));

    public
        .merge(authenticated)
        .merge(admin)
        .with_state(service)
}
