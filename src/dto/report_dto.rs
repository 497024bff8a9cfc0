use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::user::UserRole;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub active_jobs: usize,
    pub pending_quotes: usize,
    pub upcoming_payment_total: f64,
    pub clients_needing_updates: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QuoteStats {
    pub total_quotes: usize,
    pub accepted_quotes: usize,
    pub rejected_quotes: usize,
    pub pending_quotes: usize,
    /// Percent of all quotes that were accepted.
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuoteConversionReport {
    #[serde(flatten)]
    pub stats: QuoteStats,
    pub avg_quote_value: f64,
    /// Mean percentage knocked off negotiated quotes.
    pub avg_discount: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobPerformanceReport {
    pub completed_jobs: usize,
    pub avg_build_variance: f64,
    pub avg_fitting_variance: f64,
    pub avg_prices_by_type: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StaffWorkload {
    pub user_id: String,
    pub name: String,
    pub role: UserRole,
    pub active_assignments: usize,
    pub upcoming_absences: usize,
}

/// Money per payment type within one calendar month.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthBucket {
    pub month: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total: f64,
    pub deposit: f64,
    pub build: f64,
    pub fit: f64,
    pub completion: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IncomeShares {
    pub deposit: f64,
    pub build: f64,
    pub fit: f64,
    pub completion: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct IncomeHistory {
    pub months: Vec<MonthBucket>,
    pub total_income: f64,
    pub percentages: IncomeShares,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoicingResponse {
    pub message: String,
    pub invoicing_ref: String,
}
