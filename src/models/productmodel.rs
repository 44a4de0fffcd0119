use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::usermodel::ApprovalStatus;

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Product {
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub name: String,
    pub description: String,
    pub category_name: String,
    pub unit_price: f64,
    pub unit: String,
    pub image_url: Option<String>,
    pub approval_status: ApprovalStatus,
    pub approval_date: Option<DateTime<Utc>>,
    // Set only by an admin rejection, cleared again on approval
    pub rejection_reason: Option<String>,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}
