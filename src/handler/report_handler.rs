use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};

use crate::service::report_service::{ReportService, ReportServiceImpl};
use crate::util::dates::today;
use crate::util::error::HandlerError;

pub async fn dashboard_summary_handler(
    State(service): State<Arc<ReportServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.dashboard_summary(today()).await?))
}

pub async fn quote_conversion_handler(
    State(service): State<Arc<ReportServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.quote_conversion().await?))
}

pub async fn job_performance_handler(
    State(service): State<Arc<ReportServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.job_performance().await?))
}

pub async fn staff_workload_handler(
    State(service): State<Arc<ReportServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.staff_workload(today()).await?))
}

pub async fn financial_forecast_handler(
    State(service): State<Arc<ReportServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.financial_forecast(today()).await?))
}

pub async fn income_history_handler(
    State(service): State<Arc<ReportServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.income_history(today()).await?))
}
