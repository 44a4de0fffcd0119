// service/admin_decision.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::{db::DBClient, productdb::ProductExt, profiledb::ProfileExt, userdb::UserExt},
    models::usermodel::ApprovalStatus,
    service::{
        error::ServiceError,
        notification::{NotificationDispatcher, NotificationJob, OutcomeTemplate},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionTarget {
    Farmer,
    Company,
    Product,
}

impl DecisionTarget {
    pub fn to_str(&self) -> &str {
        match self {
            DecisionTarget::Farmer => "farmer",
            DecisionTarget::Company => "company",
            DecisionTarget::Product => "product",
        }
    }
}

impl std::str::FromStr for DecisionTarget {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "farmer" | "farmers" => Ok(DecisionTarget::Farmer),
            "company" | "companies" => Ok(DecisionTarget::Company),
            "product" | "products" => Ok(DecisionTarget::Product),
            other => Err(ServiceError::Validation(format!(
                "unknown decision target '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionOutcome {
    Approved,
    Rejected,
}

impl DecisionOutcome {
    pub fn approval_status(&self) -> ApprovalStatus {
        match self {
            DecisionOutcome::Approved => ApprovalStatus::Approved,
            DecisionOutcome::Rejected => ApprovalStatus::Rejected,
        }
    }

    pub fn to_str(&self) -> &str {
        match self {
            DecisionOutcome::Approved => "approved",
            DecisionOutcome::Rejected => "rejected",
        }
    }
}

/// Record of one human decision, echoed back to the admin caller.
#[derive(Debug, Clone, Serialize)]
pub struct Decision {
    pub target_type: DecisionTarget,
    pub target_id: Uuid,
    pub outcome: DecisionOutcome,
    pub reason: Option<String>,
    pub actor: Uuid,
    pub decided_at: DateTime<Utc>,
}

/// A rejection must carry a non-empty reason; approvals may carry one but
/// it is not persisted on the target.
fn validate_reason(
    outcome: DecisionOutcome,
    reason: Option<String>,
) -> Result<Option<String>, ServiceError> {
    let reason = reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());

    if outcome == DecisionOutcome::Rejected && reason.is_none() {
        return Err(ServiceError::Validation(
            "A reason is required when rejecting".to_string(),
        ));
    }

    Ok(reason)
}

/// The human-in-the-loop side of the state machine. This is the only
/// path that mutates User/Profile approval status, and the only path of
/// any kind that can set `rejected` on a product.
#[derive(Debug, Clone)]
pub struct AdminDecisionService {
    db_client: Arc<DBClient>,
    dispatcher: NotificationDispatcher,
}

impl AdminDecisionService {
    pub fn new(db_client: Arc<DBClient>, dispatcher: NotificationDispatcher) -> Self {
        Self {
            db_client,
            dispatcher,
        }
    }

    /// Repeating an identical decision succeeds silently: the writes are
    /// idempotent and the state machine does not distinguish a re-apply.
    pub async fn decide(
        &self,
        actor: Uuid,
        target_type: DecisionTarget,
        target_id: Uuid,
        outcome: DecisionOutcome,
        reason: Option<String>,
    ) -> Result<Decision, ServiceError> {
        let reason = validate_reason(outcome, reason)?;

        match target_type {
            DecisionTarget::Farmer => {
                self.decide_farmer(target_id, outcome, reason.clone()).await?
            }
            DecisionTarget::Company => {
                self.decide_company(target_id, outcome, reason.clone()).await?
            }
            DecisionTarget::Product => {
                self.decide_product(target_id, outcome, reason.clone()).await?
            }
        }

        tracing::info!(
            "admin {} marked {} {} as {}",
            actor,
            target_type.to_str(),
            target_id,
            outcome.to_str()
        );

        Ok(Decision {
            target_type,
            target_id,
            outcome,
            reason,
            actor,
            decided_at: Utc::now(),
        })
    }

    async fn decide_farmer(
        &self,
        profile_id: Uuid,
        outcome: DecisionOutcome,
        reason: Option<String>,
    ) -> Result<(), ServiceError> {
        let profile = self
            .db_client
            .get_farmer_profile(profile_id)
            .await?
            .ok_or(ServiceError::FarmerProfileNotFound(profile_id))?;

        self.db_client
            .apply_farmer_decision(profile.id, profile.user_id, outcome.approval_status())
            .await
            .map_err(|e| {
                // Rolled back by the transaction; escalated for operations
                tracing::error!(
                    "decision write failed for farmer {} (user {}): {}",
                    profile.id,
                    profile.user_id,
                    e
                );
                ServiceError::Database(e)
            })?;

        if let Some(user) = self.db_client.get_user(Some(profile.user_id), None).await? {
            self.dispatcher.dispatch(NotificationJob {
                recipient: user.email,
                recipient_name: user.name,
                template: OutcomeTemplate::FarmerDecision { outcome, reason },
            });
        }

        Ok(())
    }

    async fn decide_company(
        &self,
        profile_id: Uuid,
        outcome: DecisionOutcome,
        reason: Option<String>,
    ) -> Result<(), ServiceError> {
        let profile = self
            .db_client
            .get_company_profile(profile_id)
            .await?
            .ok_or(ServiceError::CompanyProfileNotFound(profile_id))?;

        self.db_client
            .apply_company_decision(profile.id, profile.user_id, outcome.approval_status())
            .await
            .map_err(|e| {
                tracing::error!(
                    "decision write failed for company {} (user {}): {}",
                    profile.id,
                    profile.user_id,
                    e
                );
                ServiceError::Database(e)
            })?;

        if let Some(user) = self.db_client.get_user(Some(profile.user_id), None).await? {
            self.dispatcher.dispatch(NotificationJob {
                recipient: user.email,
                recipient_name: user.name,
                template: OutcomeTemplate::CompanyDecision { outcome, reason },
            });
        }

        Ok(())
    }

    async fn decide_product(
        &self,
        product_id: Uuid,
        outcome: DecisionOutcome,
        reason: Option<String>,
    ) -> Result<(), ServiceError> {
        let product = self
            .db_client
            .get_product(product_id)
            .await?
            .ok_or(ServiceError::ProductNotFound(product_id))?;

        // The reason column only ever holds a rejection reason; approving
        // clears whatever a previous rejection left behind.
        let rejection_reason = match outcome {
            DecisionOutcome::Rejected => reason.clone(),
            DecisionOutcome::Approved => None,
        };

        let updated = self
            .db_client
            .apply_product_decision(product.id, outcome.approval_status(), rejection_reason)
            .await?;

        let owner = match self
            .db_client
            .get_farmer_profile(product.farmer_id)
            .await?
        {
            Some(profile) => self.db_client.get_user(Some(profile.user_id), None).await?,
            None => None,
        };

        if let Some(user) = owner {
            self.dispatcher.dispatch(NotificationJob {
                recipient: user.email,
                recipient_name: user.name,
                template: OutcomeTemplate::ProductDecision {
                    product_name: updated.name,
                    outcome,
                    reason,
                },
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::db::DBClient;

    #[tokio::test]
    async fn rejecting_without_reason_never_touches_the_target() {
        // Lazy pool: no connection is made unless a query runs, so this
        // passes without a database precisely because validation fires first
        let pool = sqlx::PgPool::connect_lazy("postgres://localhost/agromarket").unwrap();
        let (dispatcher, _rx) = NotificationDispatcher::new();
        let service = AdminDecisionService::new(Arc::new(DBClient::new(pool)), dispatcher);

        let err = service
            .decide(
                Uuid::new_v4(),
                DecisionTarget::Product,
                Uuid::new_v4(),
                DecisionOutcome::Rejected,
                None,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn rejection_without_reason_is_a_validation_error() {
        let err = validate_reason(DecisionOutcome::Rejected, None).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn rejection_with_blank_reason_is_a_validation_error() {
        let err = validate_reason(DecisionOutcome::Rejected, Some("   ".to_string())).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn rejection_with_reason_passes() {
        let reason = validate_reason(
            DecisionOutcome::Rejected,
            Some("image does not match the product".to_string()),
        )
        .unwrap();
        assert_eq!(reason.as_deref(), Some("image does not match the product"));
    }

    #[test]
    fn approval_without_reason_passes() {
        assert_eq!(validate_reason(DecisionOutcome::Approved, None).unwrap(), None);
    }

    #[test]
    fn target_parses_from_path_segment() {
        use std::str::FromStr;

        assert_eq!(
            DecisionTarget::from_str("farmers").unwrap(),
            DecisionTarget::Farmer
        );
        assert_eq!(
            DecisionTarget::from_str("company").unwrap(),
            DecisionTarget::Company
        );
        assert_eq!(
            DecisionTarget::from_str("Products").unwrap(),
            DecisionTarget::Product
        );
        assert!(DecisionTarget::from_str("orders").is_err());
    }

    #[test]
    fn outcome_maps_to_approval_status() {
        assert_eq!(
            DecisionOutcome::Approved.approval_status(),
            ApprovalStatus::Approved
        );
        assert_eq!(
            DecisionOutcome::Rejected.approval_status(),
            ApprovalStatus::Rejected
        );
    }
}
