use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::usermodel::ApprovalStatus;

/// Business profile attached 1:1 to a user with the farmer role.
/// Its approval status mirrors the owning user's after every decision.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct FarmerProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub farm_name: String,
    pub city: String,
    pub district: String,
    pub tax_number: String,
    pub about: Option<String>,
    pub approval_status: ApprovalStatus,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct CompanyProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_name: String,
    pub city: String,
    pub district: String,
    pub tax_number: String,
    pub tax_office: Option<String>,
    pub about: Option<String>,
    pub approval_status: ApprovalStatus,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}
