use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;
use validator::Validate;

use crate::dto::client_dto::{CreateClientRequest, UpdateClientRequest};
use crate::service::client_service::{ClientService, ClientServiceImpl};
use crate::util::error::{parse_id, HandlerError};

pub async fn list_clients_handler(
    State(service): State<Arc<ClientServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    let clients = service.list_clients().await?;
    Ok(Json(clients))
}

pub async fn get_client_handler(
    State(service): State<Arc<ClientServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "client")?;
    Ok(Json(service.get_client(id).await?))
}

pub async fn create_client_handler(
    State(service): State<Arc<ClientServiceImpl>>,
    Json(payload): Json<CreateClientRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate()?;
    let client = service.create_client(payload).await?;
    info!("[create_client_handler] Created client {}", client.id);
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn update_client_handler(
    State(service): State<Arc<ClientServiceImpl>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateClientRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "client")?;
    payload.validate()?;
    Ok(Json(service.update_client(id, payload).await?))
}

pub async fn delete_client_handler(
    State(service): State<Arc<ClientServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "client")?;
    service.delete_client(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn client_quotes_handler(
    State(service): State<Arc<ClientServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "client")?;
    Ok(Json(service.client_quotes(id).await?))
}

pub async fn client_jobs_handler(
    State(service): State<Arc<ClientServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "client")?;
    Ok(Json(service.client_jobs(id).await?))
}

pub async fn client_invoicing_handler(
    State(service): State<Arc<ClientServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "client")?;
    let response = service.create_in_invoicing(id).await?;
    info!("[client_invoicing_handler] Client {} registered as {}", id, response.invoicing_ref);
    Ok(Json(response))
}
