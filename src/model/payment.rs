use bson::oid::ObjectId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentType {
    Deposit,
    BuildInstallment,
    FittingInstallment,
    Completion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    #[default]
    Due,
    Paid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub job_id: ObjectId,
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

impl Payment {
    pub fn new_due(job_id: ObjectId, payment_type: PaymentType, amount: f64, due_date: Option<NaiveDate>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Payment {
            id: ObjectId::new(),
            job_id,
            payment_type,
            amount,
            due_date,
            paid_date: None,
            status: PaymentStatus::Due,
            invoicing_ref: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
