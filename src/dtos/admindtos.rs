use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::service::admin_decision::{Decision, DecisionOutcome};

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct DecideDto {
    pub outcome: DecisionOutcome,

    // Mandatory on rejection; enforced by the decision service
    #[validate(length(max = 500, message = "Reason must be less than 500 characters"))]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DecisionResponseDto {
    pub status: String,
    pub data: Decision,
}
