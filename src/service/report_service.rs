//! Read-only reports over the whole workshop.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::{Datelike, Duration, NaiveDate};
use tracing::{debug, instrument};

use crate::dto::hex;
use crate::dto::report_dto::{
    DashboardSummary, IncomeHistory, IncomeShares, JobPerformanceReport, MonthBucket, QuoteConversionReport,
    QuoteStats, StaffWorkload,
};
use crate::model::job::{Job, JobStage};
use crate::model::payment::{Payment, PaymentStatus, PaymentType};
use crate::model::quote::{Quote, QuoteStatus};
use crate::repository::Repositories;
use crate::scheduling::workload;
use crate::util::error::ServiceResult;

pub const UPCOMING_PAYMENT_DAYS: i64 = 30;
pub const FORECAST_MONTHS: usize = 7;
pub const INCOME_HISTORY_MONTHS: usize = 3;

#[async_trait]
pub trait ReportService: Send + Sync {
    async fn dashboard_summary(&self, today: NaiveDate) -> ServiceResult<DashboardSummary>;
    async fn quote_conversion(&self) -> ServiceResult<QuoteConversionReport>;
    async fn job_performance(&self) -> ServiceResult<JobPerformanceReport>;
    async fn staff_workload(&self, today: NaiveDate) -> ServiceResult<Vec<StaffWorkload>>;
    /// Due payments for the month of `today` and the six after it.
    async fn financial_forecast(&self, today: NaiveDate) -> ServiceResult<Vec<MonthBucket>>;
    /// Paid payments for the month of `today` and the two before it.
    async fn income_history(&self, today: NaiveDate) -> ServiceResult<IncomeHistory>;
}

pub struct ReportServiceImpl {
    pub repos: Repositories,
}

impl ReportServiceImpl {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

pub fn quote_stats(quotes: &[Quote]) -> QuoteStats {
    let total = quotes.len();
    let accepted = quotes.iter().filter(|q| q.status.is_accepted()).count();
    QuoteStats {
        total_quotes: total,
        accepted_quotes: accepted,
        rejected_quotes: quotes.iter().filter(|q| q.status == QuoteStatus::Rejected).count(),
        pending_quotes: quotes.iter().filter(|q| q.status.is_pending()).count(),
        conversion_rate: percent(accepted, total),
    }
}

pub fn quote_conversion(quotes: &[Quote]) -> QuoteConversionReport {
    let initial: Vec<f64> = quotes.iter().map(|q| q.initial_amount).collect();
    let discounts: Vec<f64> = quotes
        .iter()
        .filter(|q| q.status == QuoteStatus::AcceptedNegotiated && q.initial_amount > 0.0)
        .filter_map(|q| {
            let final_amount = q.final_amount.filter(|f| *f > 0.0)?;
            Some((q.initial_amount - final_amount) / q.initial_amount * 100.0)
        })
        .collect();
    QuoteConversionReport {
        stats: quote_stats(quotes),
        avg_quote_value: mean(&initial),
        avg_discount: mean(&discounts),
    }
}

/// Percent over (positive) or under the estimate, for jobs that have both numbers.
fn variance(estimate: Option<u32>, actual: Option<i64>) -> Option<f64> {
    let estimate = estimate.filter(|e| *e > 0)? as f64;
    let actual = actual.filter(|a| *a != 0)? as f64;
    Some((actual - estimate) / estimate * 100.0)
}

pub fn job_performance(jobs: &[Job]) -> JobPerformanceReport {
    let finished: Vec<&Job> = jobs.iter().filter(|j| j.stage == JobStage::Finished).collect();
    let build: Vec<f64> = finished
        .iter()
        .filter_map(|j| variance(j.estimated_build_days, j.actual_build_days))
        .collect();
    let fitting: Vec<f64> = finished
        .iter()
        .filter_map(|j| variance(j.estimated_fitting_days, j.actual_fitting_days))
        .collect();

    let mut prices: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for job in jobs {
        let entry = prices.entry(job.category.clone()).or_default();
        if let Some(price) = job.price.filter(|p| *p > 0.0) {
            entry.push(price);
        }
    }

    JobPerformanceReport {
        completed_jobs: finished.len(),
        avg_build_variance: mean(&build),
        avg_fitting_variance: mean(&fitting),
        avg_prices_by_type: prices.into_iter().map(|(k, v)| (k, mean(&v))).collect(),
    }
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}

fn next_month(start: NaiveDate) -> NaiveDate {
    month_start(start + Duration::days(32))
}

fn previous_month(start: NaiveDate) -> NaiveDate {
    month_start(start - Duration::days(1))
}

/// `count` empty calendar-month buckets beginning with the month of `first`.
pub fn month_buckets(first: NaiveDate, count: usize) -> Vec<MonthBucket> {
    let mut start = month_start(first);
    let mut months = Vec::with_capacity(count);
    for _ in 0..count {
        let next = next_month(start);
        months.push(MonthBucket {
            month: start.format("%B %Y").to_string(),
            start_date: start,
            end_date: next - Duration::days(1),
            total: 0.0,
            deposit: 0.0,
            build: 0.0,
            fit: 0.0,
            completion: 0.0,
        });
        start = next;
    }
    months
}

/// Adds each payment to the bucket containing its date, as picked by `date_of`.
fn fill_buckets<F>(months: &mut [MonthBucket], payments: &[Payment], date_of: F)
where
    F: Fn(&Payment) -> Option<NaiveDate>,
{
    for payment in payments {
        let Some(date) = date_of(payment) else { continue };
        let Some(month) = months.iter_mut().find(|m| m.start_date <= date && date <= m.end_date) else {
            continue;
        };
        month.total += payment.amount;
        match payment.payment_type {
            PaymentType::Deposit => month.deposit += payment.amount,
            PaymentType::BuildInstallment => month.build += payment.amount,
            PaymentType::FittingInstallment => month.fit += payment.amount,
            PaymentType::Completion => month.completion += payment.amount,
        }
    }
}

pub fn financial_forecast(payments: &[Payment], today: NaiveDate) -> Vec<MonthBucket> {
    let mut months = month_buckets(today, FORECAST_MONTHS);
    fill_buckets(&mut months, payments, |p| {
        if p.status == PaymentStatus::Due { p.due_date } else { None }
    });
    months
}

pub fn income_history(payments: &[Payment], today: NaiveDate) -> IncomeHistory {
    let mut first = month_start(today);
    for _ in 1..INCOME_HISTORY_MONTHS {
        first = previous_month(first);
    }
    let mut months = month_buckets(first, INCOME_HISTORY_MONTHS);
    fill_buckets(&mut months, payments, |p| {
        if p.status == PaymentStatus::Paid { p.paid_date } else { None }
    });

    let total_income: f64 = months.iter().map(|m| m.total).sum();
    let share = |pick: fn(&MonthBucket) -> f64| {
        if total_income > 0.0 {
            months.iter().map(pick).sum::<f64>() / total_income * 100.0
        } else {
            0.0
        }
    };
    let percentages = IncomeShares {
        deposit: share(|m| m.deposit),
        build: share(|m| m.build),
        fit: share(|m| m.fit),
        completion: share(|m| m.completion),
    };
    IncomeHistory { months, total_income, percentages }
}

#[async_trait]
impl ReportService for ReportServiceImpl {
    #[instrument(skip(self))]
    async fn dashboard_summary(&self, today: NaiveDate) -> ServiceResult<DashboardSummary> {
        let jobs = self.repos.jobs.list().await?;
        let quotes = self.repos.quotes.list(None).await?;
        let payments = self.repos.payments.list().await?;
        let horizon = today + Duration::days(UPCOMING_PAYMENT_DAYS);

        Ok(DashboardSummary {
            active_jobs: jobs.iter().filter(|j| j.stage != JobStage::Finished).count(),
            pending_quotes: quotes.iter().filter(|q| q.status.is_pending()).count(),
            upcoming_payment_total: payments
                .iter()
                .filter(|p| p.status == PaymentStatus::Due)
                .filter(|p| p.due_date.is_some_and(|d| d >= today && d <= horizon))
                .map(|p| p.amount)
                .sum(),
            clients_needing_updates: jobs.iter().filter(|j| j.client_needs_update).count(),
        })
    }

    #[instrument(skip(self))]
    async fn quote_conversion(&self) -> ServiceResult<QuoteConversionReport> {
        let quotes = self.repos.quotes.list(None).await?;
        Ok(quote_conversion(&quotes))
    }

    #[instrument(skip(self))]
    async fn job_performance(&self) -> ServiceResult<JobPerformanceReport> {
        let jobs = self.repos.jobs.list().await?;
        Ok(job_performance(&jobs))
    }

    #[instrument(skip(self))]
    async fn staff_workload(&self, today: NaiveDate) -> ServiceResult<Vec<StaffWorkload>> {
        let stages: HashMap<ObjectId, JobStage> =
            self.repos.jobs.list().await?.into_iter().map(|j| (j.id, j.stage)).collect();
        let assignments = self.repos.assignments.list().await?;
        let workloads = workload::workload_by_user(&assignments, &stages, None);

        let mut upcoming: HashMap<ObjectId, usize> = HashMap::new();
        for absence in self.repos.absences.list().await? {
            if absence.end_date >= today {
                *upcoming.entry(absence.user_id).or_default() += 1;
            }
        }

        let report: Vec<StaffWorkload> = self
            .repos
            .users
            .list()
            .await?
            .into_iter()
            .filter(|u| u.role.is_workshop_staff())
            .map(|u| StaffWorkload {
                user_id: hex(&u.id),
                name: u.full_name(),
                role: u.role,
                active_assignments: workloads.get(&u.id).copied().unwrap_or(0),
                upcoming_absences: upcoming.get(&u.id).copied().unwrap_or(0),
            })
            .collect();
        debug!("Workload report covers {} staff", report.len());
        Ok(report)
    }

    #[instrument(skip(self))]
    async fn financial_forecast(&self, today: NaiveDate) -> ServiceResult<Vec<MonthBucket>> {
        let payments = self.repos.payments.list().await?;
        Ok(financial_forecast(&payments, today))
    }

    #[instrument(skip(self))]
    async fn income_history(&self, today: NaiveDate) -> ServiceResult<IncomeHistory> {
        let payments = self.repos.payments.list().await?;
        Ok(income_history(&payments, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::fixtures::{date, job};

    fn quote(status: QuoteStatus, initial: f64, final_amount: Option<f64>) -> Quote {
        Quote {
            id: ObjectId::new(),
            client_id: ObjectId::new(),
            name: "Q".to_string(),
            category: "Kitchen".to_string(),
            initial_amount: initial,
            final_amount,
            material_cost: None,
            status,
            negotiation_details: None,
            deposit_paid_date: None,
            estimated_build_days: None,
            estimated_fitting_days: None,
            created_by: None,
            extras: vec![],
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn payment(kind: PaymentType, amount: f64, due: &str) -> Payment {
        Payment::new_due(ObjectId::new(), kind, amount, Some(date(due)))
    }

    #[test]
    fn test_quote_conversion_numbers() {
        let quotes = vec![
            quote(QuoteStatus::Accepted, 1000.0, None),
            quote(QuoteStatus::AcceptedNegotiated, 1000.0, Some(900.0)),
            quote(QuoteStatus::Rejected, 2000.0, None),
            quote(QuoteStatus::Sent, 4000.0, None),
        ];
        let report = quote_conversion(&quotes);
        assert_eq!(report.stats.total_quotes, 4);
        assert_eq!(report.stats.accepted_quotes, 2);
        assert_eq!(report.stats.rejected_quotes, 1);
        assert_eq!(report.stats.pending_quotes, 1);
        assert_eq!(report.stats.conversion_rate, 50.0);
        assert_eq!(report.avg_quote_value, 2000.0);
        assert!((report.avg_discount - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_stats_are_zero() {
        let stats = quote_stats(&[]);
        assert_eq!(stats.conversion_rate, 0.0);
        assert_eq!(stats.total_quotes, 0);
    }

    #[test]
    fn test_job_performance_variance() {
        let mut done = job();
        done.stage = JobStage::Finished;
        done.estimated_build_days = Some(10);
        done.actual_build_days = Some(12);
        done.price = Some(10000.0);

        let mut open = job();
        open.category = "Wardrobe".to_string();
        open.estimated_build_days = Some(10);
        open.actual_build_days = Some(30);

        let report = job_performance(&[done, open]);
        assert_eq!(report.completed_jobs, 1);
        assert!((report.avg_build_variance - 20.0).abs() < 1e-9);
        assert_eq!(report.avg_fitting_variance, 0.0);
        assert_eq!(report.avg_prices_by_type.get("Kitchen"), Some(&10000.0));
        assert_eq!(report.avg_prices_by_type.get("Wardrobe"), Some(&0.0));
    }

    #[test]
    fn test_month_buckets_cross_year() {
        let months = month_buckets(date("2024-11-15"), 3);
        assert_eq!(months[0].month, "November 2024");
        assert_eq!(months[0].end_date, date("2024-11-30"));
        assert_eq!(months[1].start_date, date("2024-12-01"));
        assert_eq!(months[2].month, "January 2025");
        assert_eq!(months[2].end_date, date("2025-01-31"));
    }

    #[test]
    fn test_forecast_buckets_due_payments_by_type() {
        let mut paid = payment(PaymentType::Deposit, 500.0, "2024-03-05");
        paid.status = PaymentStatus::Paid;
        let payments = vec![
            payment(PaymentType::Deposit, 1000.0, "2024-03-01"),
            payment(PaymentType::BuildInstallment, 4000.0, "2024-04-10"),
            payment(PaymentType::Completion, 1000.0, "2024-09-30"),
            payment(PaymentType::Completion, 1000.0, "2024-10-01"),
            paid,
        ];
        let months = financial_forecast(&payments, date("2024-03-20"));
        assert_eq!(months.len(), 7);
        assert_eq!(months[0].total, 1000.0);
        assert_eq!(months[0].deposit, 1000.0);
        assert_eq!(months[1].build, 4000.0);
        assert_eq!(months[6].month, "September 2024");
        assert_eq!(months[6].completion, 1000.0);
    }

    #[test]
    fn test_income_history_covers_three_months() {
        let mut deposit = payment(PaymentType::Deposit, 1000.0, "2024-01-01");
        deposit.status = PaymentStatus::Paid;
        deposit.paid_date = Some(date("2024-01-15"));
        let mut fit = payment(PaymentType::FittingInstallment, 3000.0, "2024-03-01");
        fit.status = PaymentStatus::Paid;
        fit.paid_date = Some(date("2024-03-02"));
        let mut old = payment(PaymentType::Deposit, 999.0, "2023-12-01");
        old.status = PaymentStatus::Paid;
        old.paid_date = Some(date("2023-12-31"));

        let history = income_history(&[deposit, fit, old], date("2024-03-10"));
        assert_eq!(history.months.len(), 3);
        assert_eq!(history.months[0].month, "January 2024");
        assert_eq!(history.total_income, 4000.0);
        assert_eq!(history.percentages.deposit, 25.0);
        assert_eq!(history.percentages.fit, 75.0);
        assert_eq!(history.percentages.build, 0.0);
    }
}
