//! Installment plans derived from a job's price, category and milestone dates.

use chrono::NaiveDate;

use crate::model::job::Job;
use crate::model::payment::{Payment, PaymentStatus, PaymentType};

const KITCHEN_SPLIT: &[(PaymentType, f64)] = &[
    (PaymentType::Deposit, 0.10),
    (PaymentType::BuildInstallment, 0.40),
    (PaymentType::FittingInstallment, 0.40),
    (PaymentType::Completion, 0.10),
];

const STANDARD_SPLIT: &[(PaymentType, f64)] = &[
    (PaymentType::Deposit, 0.50),
    (PaymentType::FittingInstallment, 0.40),
    (PaymentType::Completion, 0.10),
];

/// Exact match, ignoring case and surrounding whitespace.
pub fn is_kitchen(category: &str) -> bool {
    category.trim().eq_ignore_ascii_case("kitchen")
}

fn split_for(category: &str) -> &'static [(PaymentType, f64)] {
    if is_kitchen(category) {
        KITCHEN_SPLIT
    } else {
        STANDARD_SPLIT
    }
}

/// Milestone each installment type falls due on.
pub fn milestone_date(job: &Job, payment_type: PaymentType) -> Option<NaiveDate> {
    match payment_type {
        PaymentType::Deposit => job.booking_date,
        PaymentType::BuildInstallment => job.build_start_date,
        PaymentType::FittingInstallment | PaymentType::Completion => job.fitting_date,
    }
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Fresh Due installments for the job, or `None` when it has no usable price.
/// The last installment takes the remainder so the amounts sum to the price.
pub fn generate(job: &Job) -> Option<Vec<Payment>> {
    let price = job.price.filter(|p| *p > 0.0)?;
    let split = split_for(&job.category);

    let mut allocated = 0.0;
    let mut payments = Vec::with_capacity(split.len());
    for (index, (payment_type, share)) in split.iter().enumerate() {
        let amount = if index + 1 == split.len() {
            round_cents(price - allocated)
        } else {
            round_cents(price * share)
        };
        allocated += amount;
        payments.push(Payment::new_due(
            job.id,
            *payment_type,
            amount,
            milestone_date(job, *payment_type),
        ));
    }
    Some(payments)
}

/// Moves unpaid build, fitting and completion installments onto the job's
/// current dates. Returns how many payments changed.
pub fn sync_due_dates(job: &Job, payments: &mut [Payment]) -> usize {
    let mut changed = 0;
    for payment in payments.iter_mut() {
        if payment.status != PaymentStatus::Due || payment.payment_type == PaymentType::Deposit {
            continue;
        }
        let due = milestone_date(job, payment.payment_type);
        if due.is_some() && due != payment.due_date {
            payment.due_date = due;
            changed += 1;
        }
    }
    changed
}

/// Brings every completion payment forward to `today` once the job is finished.
pub fn settle_completion(payments: &mut [Payment], today: NaiveDate) -> usize {
    let mut count = 0;
    for payment in payments
        .iter_mut()
        .filter(|p| p.payment_type == PaymentType::Completion)
    {
        payment.due_date = Some(today);
        count += 1;
    }
    count
}
