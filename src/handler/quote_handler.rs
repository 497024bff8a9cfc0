use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::info;
use validator::Validate;

use crate::dto::parse_object_id;
use crate::dto::quote_dto::{CreateQuoteRequest, ExtraRequest, QuoteFilter, UpdateExtraRequest, UpdateQuoteRequest};
use crate::service::quote_service::{QuoteService, QuoteServiceImpl};
use crate::service::user_service::AuthUser;
use crate::util::error::{parse_id, HandlerError};

pub async fn list_quotes_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Query(filter): Query<QuoteFilter>,
) -> Result<impl IntoResponse, HandlerError> {
    let client_id = filter
        .client_id
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .map(|raw| parse_object_id("client_id", raw))
        .transpose()?;
    Ok(Json(service.list_quotes(client_id).await?))
}

pub async fn quote_stats_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.stats().await?))
}

pub async fn get_quote_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "quote")?;
    Ok(Json(service.get_quote(id).await?))
}

pub async fn create_quote_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Extension(caller): Extension<AuthUser>,
    Json(payload): Json<CreateQuoteRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate()?;
    let quote = service.create_quote(payload, Some(caller.id)).await?;
    info!("[create_quote_handler] {} created quote {}", caller.username, quote.id);
    Ok((StatusCode::CREATED, Json(quote)))
}

pub async fn update_quote_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateQuoteRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "quote")?;
    payload.validate()?;
    Ok(Json(service.update_quote(id, payload).await?))
}

pub async fn delete_quote_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "quote")?;
    service.delete_quote(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn convert_quote_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "quote")?;
    let job = service.convert_to_job(id).await?;
    info!("[convert_quote_handler] Quote {} converted to job {}", id, job.id);
    Ok((StatusCode::CREATED, Json(job)))
}

pub async fn list_extras_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "quote")?;
    Ok(Json(service.list_extras(id).await?))
}

pub async fn add_extra_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Path(id): Path<String>,
    Json(payload): Json<ExtraRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "quote")?;
    payload.validate()?;
    let extra = service.add_extra(id, payload).await?;
    Ok((StatusCode::CREATED, Json(extra)))
}

pub async fn update_extra_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Path((id, extra_id)): Path<(String, String)>,
    Json(payload): Json<UpdateExtraRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "quote")?;
    let extra_id = parse_id(&extra_id, "extra")?;
    payload.validate()?;
    Ok(Json(service.update_extra(id, extra_id, payload).await?))
}

pub async fn delete_extra_handler(
    State(service): State<Arc<QuoteServiceImpl>>,
    Path((id, extra_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "quote")?;
    let extra_id = parse_id(&extra_id, "extra")?;
    service.delete_extra(id, extra_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
