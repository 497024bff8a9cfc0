use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::hex;
use crate::model::payment::{Payment, PaymentStatus, PaymentType};
use crate::util::dates::double_option;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePaymentRequest {
    #[validate(length(equal = 24))]
    pub job_id: String,
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    #[validate(range(min = 0.0))]
    pub amount: f64,
    pub due_date: Option<String>,
    pub paid_date: Option<String>,
    pub status: Option<PaymentStatus>,
}

/// `paid_date: null` clears the paid date; a date on a due payment marks it paid.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePaymentStatusRequest {
    pub status: Option<PaymentStatus>,
    #[serde(default, deserialize_with = "double_option")]
    pub paid_date: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentFilter {
    pub job_id: Option<String>,
    pub status: Option<PaymentStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentView {
    pub id: String,
    pub job_id: String,
    pub job_name: Option<String>,
    pub client_name: Option<String>,
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    pub amount: f64,
    pub due_date: Option<NaiveDate>,
    pub paid_date: Option<NaiveDate>,
    pub status: PaymentStatus,
    pub invoicing_ref: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl PaymentView {
    pub fn new(payment: Payment, job_name: Option<String>, client_name: Option<String>) -> Self {
        PaymentView {
            id: hex(&payment.id),
            job_id: hex(&payment.job_id),
            job_name,
            client_name,
            payment_type: payment.payment_type,
            amount: payment.amount,
            due_date: payment.due_date,
            paid_date: payment.paid_date,
            status: payment.status,
            invoicing_ref: payment.invoicing_ref,
            created_at: payment.created_at,
            updated_at: payment.updated_at,
        }
    }
}
