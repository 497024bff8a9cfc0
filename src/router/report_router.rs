use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use crate::handler::job_handler::clients_needing_updates_handler;
use crate::handler::report_handler::{
    dashboard_summary_handler, financial_forecast_handler, income_history_handler, job_performance_handler,
    quote_conversion_handler, staff_workload_handler,
};
use crate::middlewares::auth_middleware::{require_auth, AuthState};
use crate::service::job_service::JobServiceImpl;
use crate::service::report_service::ReportServiceImpl;

pub fn report_router(
    service: Arc<ReportServiceImpl>,
    job_service: Arc<JobServiceImpl>,
    auth_state: Arc<AuthState>,
) -> Router {
    let reports = Router::new()
        .route("/reports/dashboard-summary", get(dashboard_summary_handler))
        .route("/reports/quote-conversion", get(quote_conversion_handler))
        .route("/reports/job-performance", get(job_performance_handler))
        .route("/reports/staff-workload", get(staff_workload_handler))
        .route("/reports/financial-forecast", get(financial_forecast_handler))
        .route("/reports/income-history", get(income_history_handler))
        .with_state(service);

    // Same list as the jobs endpoint.
    let updates = Router::new()
        .route("/reports/clients-needing-updates", get(clients_needing_updates_handler))
        .with_state(job_service);

    reports
        .merge(updates)
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth))
}
