// service/approval_gate.rs
use std::fmt;

use crate::models::usermodel::{AccountStatus, ApprovalStatus, User, UserRole};

/// Actions a caller may need to be authorized for. Roles grant
/// capabilities through the closed table below instead of per-endpoint
/// role comparisons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Capability {
    /// Buy from approved listings
    PlaceOrders,
    /// Create and edit product listings
    ManageListings,
    /// Bulk purchasing as a registered company
    TradeWholesale,
    /// Approve or reject farmers, companies and products
    ReviewApplications,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GateDenial {
    AccountInactive,
    PendingReview,
    ApplicationRejected,
    MissingCapability,
}

impl fmt::Display for GateDenial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            GateDenial::AccountInactive => "Account is not active",
            GateDenial::PendingReview => "Your application is pending review",
            GateDenial::ApplicationRejected => "Your application has been rejected",
            GateDenial::MissingCapability => "You are not allowed to perform this action",
        };
        write!(f, "{}", message)
    }
}

fn role_grants(role: UserRole, capability: Capability) -> bool {
    matches!(
        (role, capability),
        (UserRole::Customer, Capability::PlaceOrders)
            | (UserRole::Farmer, Capability::PlaceOrders)
            | (UserRole::Farmer, Capability::ManageListings)
            | (UserRole::Company, Capability::PlaceOrders)
            | (UserRole::Company, Capability::TradeWholesale)
            | (UserRole::Admin, Capability::ReviewApplications)
    )
}

/// Role, approval status and account status must jointly permit the
/// action. Account liveness is checked first: a suspended account is
/// denied no matter how far its application got.
pub fn authorize(user: &User, capability: Capability) -> Result<(), GateDenial> {
    if user.account_status != AccountStatus::Active {
        return Err(GateDenial::AccountInactive);
    }

    if !role_grants(user.role, capability) {
        return Err(GateDenial::MissingCapability);
    }

    // Vetted roles additionally need an approved application; customers
    // are approved at registration and admins are vetted out of band.
    match user.role {
        UserRole::Farmer | UserRole::Company => match user.approval_status {
            ApprovalStatus::Pending => Err(GateDenial::PendingReview),
            ApprovalStatus::Rejected => Err(GateDenial::ApplicationRejected),
            ApprovalStatus::Approved => Ok(()),
        },
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn user(role: UserRole, approval: ApprovalStatus, account: AccountStatus) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            password: "hashed".to_string(),
            phone: None,
            role,
            approval_status: approval,
            account_status: account,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn active_customer_can_place_orders() {
        let u = user(
            UserRole::Customer,
            ApprovalStatus::Approved,
            AccountStatus::Active,
        );
        assert_eq!(authorize(&u, Capability::PlaceOrders), Ok(()));
    }

    #[test]
    fn pending_farmer_is_denied_with_pending_review() {
        let u = user(
            UserRole::Farmer,
            ApprovalStatus::Pending,
            AccountStatus::Active,
        );
        assert_eq!(
            authorize(&u, Capability::ManageListings),
            Err(GateDenial::PendingReview)
        );
    }

    #[test]
    fn rejected_company_is_denied_with_application_rejected() {
        let u = user(
            UserRole::Company,
            ApprovalStatus::Rejected,
            AccountStatus::Active,
        );
        assert_eq!(
            authorize(&u, Capability::TradeWholesale),
            Err(GateDenial::ApplicationRejected)
        );
    }

    #[test]
    fn approved_active_farmer_is_allowed() {
        let u = user(
            UserRole::Farmer,
            ApprovalStatus::Approved,
            AccountStatus::Active,
        );
        assert_eq!(authorize(&u, Capability::ManageListings), Ok(()));
    }

    #[test]
    fn suspension_overrides_approval() {
        let u = user(
            UserRole::Farmer,
            ApprovalStatus::Approved,
            AccountStatus::Suspended,
        );
        assert_eq!(
            authorize(&u, Capability::ManageListings),
            Err(GateDenial::AccountInactive)
        );
    }

    #[test]
    fn deactivated_customer_is_denied() {
        let u = user(
            UserRole::Customer,
            ApprovalStatus::Approved,
            AccountStatus::Deactivated,
        );
        assert_eq!(
            authorize(&u, Capability::PlaceOrders),
            Err(GateDenial::AccountInactive)
        );
    }

    #[test]
    fn customer_cannot_manage_listings() {
        let u = user(
            UserRole::Customer,
            ApprovalStatus::Approved,
            AccountStatus::Active,
        );
        assert_eq!(
            authorize(&u, Capability::ManageListings),
            Err(GateDenial::MissingCapability)
        );
    }

    #[test]
    fn approved_farmer_cannot_review_applications() {
        let u = user(
            UserRole::Farmer,
            ApprovalStatus::Approved,
            AccountStatus::Active,
        );
        assert_eq!(
            authorize(&u, Capability::ReviewApplications),
            Err(GateDenial::MissingCapability)
        );
    }

    #[test]
    fn admin_reviews_applications_regardless_of_own_approval_state() {
        // Admins are vetted out of band, the gate only checks liveness
        let u = user(
            UserRole::Admin,
            ApprovalStatus::Pending,
            AccountStatus::Active,
        );
        assert_eq!(authorize(&u, Capability::ReviewApplications), Ok(()));
    }
}
