use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QuoteStatus {
    #[default]
    NotSent,
    Sent,
    Negotiating,
    Accepted,
    AcceptedNegotiated,
    Rejected,
}

impl QuoteStatus {
    pub fn is_accepted(&self) -> bool {
        matches!(self, QuoteStatus::Accepted | QuoteStatus::AcceptedNegotiated)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, QuoteStatus::NotSent | QuoteStatus::Sent | QuoteStatus::Negotiating)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub client_id: ObjectId,
    pub name: String,
    /// Cabinetry type: Kitchen, Wardrobe, Media Wall, ...
    pub category: String,
    pub initial_amount: f64,
    pub final_amount: Option<f64>,
    pub material_cost: Option<f64>,
    pub status: QuoteStatus,
    pub negotiation_details: Option<String>,
    pub deposit_paid_date: Option<chrono::NaiveDate>,
    pub estimated_build_days: Option<u32>,
    pub estimated_fitting_days: Option<u32>,
    pub created_by: Option<ObjectId>,
    #[serde(default)]
    pub extras: Vec<QuoteExtra>,
    pub created_at: String,
    pub updated_at: String,
}

impl Quote {
    /// The negotiated amount wins over the initial one.
    pub fn agreed_amount(&self) -> f64 {
        self.final_amount.unwrap_or(self.initial_amount)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteExtra {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub description: String,
    pub price: f64,
}
