use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::handler::quote_handler::{
    add_extra_handler, convert_quote_handler, create_quote_handler, delete_extra_handler, delete_quote_handler,
    get_quote_handler, list_extras_handler, list_quotes_handler, quote_stats_handler, update_extra_handler,
    update_quote_handler,
};
use crate::middlewares::auth_middleware::{require_auth, AuthState};
use crate::service::quote_service::QuoteServiceImpl;

pub fn quote_router(service: Arc<QuoteServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/quotes", get(list_quotes_handler).post(create_quote_handler))
        .route("/quotes/stats", get(quote_stats_handler))
        .route(
            "/quotes/{id}",
            get(get_quote_handler).put(update_quote_handler).delete(delete_quote_handler),
        )
        .route("/quotes/{id}/convert-to-job", post(convert_quote_handler))
        .route("/quotes/{id}/extras", get(list_extras_handler).post(add_extra_handler))
        .route(
            "/quotes/{id}/extras/{extra_id}",
            put(update_extra_handler).delete(delete_extra_handler),
        )
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth))
        .with_state(service)
}
