use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::hex;
use crate::model::quote::{Quote, QuoteExtra, QuoteStatus};
use crate::util::dates::double_option;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExtraRequest {
    #[validate(length(min = 1, max = 200))]
    pub description: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateExtraRequest {
    #[validate(length(min = 1, max = 200))]
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteFilter {
    pub client_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuoteRequest {
    #[validate(length(equal = 24))]
    pub client_id: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    #[validate(range(min = 0.0))]
    pub initial_amount: f64,
    #[validate(range(min = 0.0))]
    pub final_amount: Option<f64>,
    #[validate(range(min = 0.0))]
    pub material_cost: Option<f64>,
    pub status: Option<QuoteStatus>,
    pub negotiation_details: Option<String>,
    pub deposit_paid_date: Option<String>,
    #[validate(range(max = 365))]
    pub estimated_build_days: Option<u32>,
    #[validate(range(max = 365))]
    pub estimated_fitting_days: Option<u32>,
    #[serde(default)]
    #[validate(nested)]
    pub extras: Vec<ExtraRequest>,
}

/// Nullable fields use `Some(None)` for an explicit `null`. `extras`, when
/// present, replaces the whole list.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateQuoteRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub category: Option<String>,
    #[validate(range(min = 0.0))]
    pub initial_amount: Option<f64>,
    #[serde(default, deserialize_with = "double_option")]
    pub final_amount: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub material_cost: Option<Option<f64>>,
    pub status: Option<QuoteStatus>,
    pub negotiation_details: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub deposit_paid_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(range(max = 365))]
    pub estimated_build_days: Option<Option<u32>>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(range(max = 365))]
    pub estimated_fitting_days: Option<Option<u32>>,
    #[validate(nested)]
    pub extras: Option<Vec<ExtraRequest>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuoteExtraView {
    pub id: String,
    pub quote_id: String,
    pub description: String,
    pub price: f64,
}

impl QuoteExtraView {
    pub fn new(quote_id: &bson::oid::ObjectId, extra: &QuoteExtra) -> Self {
        QuoteExtraView {
            id: hex(&extra.id),
            quote_id: hex(quote_id),
            description: extra.description.clone(),
            price: extra.price,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuoteView {
    pub id: String,
    pub client_id: String,
    pub client_name: Option<String>,
    pub name: String,
    pub category: String,
    pub initial_amount: f64,
    pub final_amount: Option<f64>,
    pub material_cost: Option<f64>,
    pub status: QuoteStatus,
    pub negotiation_details: Option<String>,
    pub deposit_paid_date: Option<NaiveDate>,
    pub estimated_build_days: Option<u32>,
    pub estimated_fitting_days: Option<u32>,
    pub created_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub extras: Vec<QuoteExtraView>,
    pub has_job: bool,
}

impl QuoteView {
    pub fn new(quote: Quote, client_name: Option<String>, has_job: bool) -> Self {
        let extras = quote.extras.iter().map(|e| QuoteExtraView::new(&quote.id, e)).collect();
        QuoteView {
            id: hex(&quote.id),
            client_id: hex(&quote.client_id),
            client_name,
            name: quote.name,
            category: quote.category,
            initial_amount: quote.initial_amount,
            final_amount: quote.final_amount,
            material_cost: quote.material_cost,
            status: quote.status,
            negotiation_details: quote.negotiation_details,
            deposit_paid_date: quote.deposit_paid_date,
            estimated_build_days: quote.estimated_build_days,
            estimated_fitting_days: quote.estimated_fitting_days,
            created_by: quote.created_by.as_ref().map(hex),
            created_at: quote.created_at,
            updated_at: quote.updated_at,
            extras,
            has_job,
        }
    }
}
