use super::sendmail::send_email;
pub use super::sendmail::MailError;
use crate::{config::Config, service::admin_decision::DecisionOutcome};

pub type MailResult = Result<(), MailError>;

/// Outcome mail for a farmer or company application review.
pub async fn send_application_decision_email(
    config: &Config,
    to_email: &str,
    name: &str,
    kind_label: &str,
    outcome: DecisionOutcome,
    reason: Option<&str>,
) -> MailResult {
    let subject = match outcome {
        DecisionOutcome::Approved => "Your application has been approved",
        DecisionOutcome::Rejected => "Your application has been rejected",
    };

    let body = match outcome {
        DecisionOutcome::Approved => format!(
            "<p>Hello {name},</p>\
             <p>Your {kind_label} application has been approved. You can now \
             start selling on the marketplace.</p>\
             <p><a href=\"{}/dashboard\">Go to your dashboard</a></p>",
            config.app_url
        ),
        DecisionOutcome::Rejected => format!(
            "<p>Hello {name},</p>\
             <p>Unfortunately your {kind_label} application has been rejected.</p>\
             <p>Reason: {}</p>",
            reason.unwrap_or("not specified")
        ),
    };

    send_email(config, to_email, subject, &body).await
}

/// Outcome mail for a product listing review.
pub async fn send_product_decision_email(
    config: &Config,
    to_email: &str,
    name: &str,
    product_name: &str,
    outcome: DecisionOutcome,
    reason: Option<&str>,
) -> MailResult {
    let subject = match outcome {
        DecisionOutcome::Approved => "Your product listing is now live",
        DecisionOutcome::Rejected => "Your product listing was not approved",
    };

    let body = match outcome {
        DecisionOutcome::Approved => format!(
            "<p>Hello {name},</p>\
             <p>Your product <strong>{product_name}</strong> has been approved \
             and is now visible to customers.</p>"
        ),
        DecisionOutcome::Rejected => format!(
            "<p>Hello {name},</p>\
             <p>Your product <strong>{product_name}</strong> was not approved.</p>\
             <p>Reason: {}</p>",
            reason.unwrap_or("not specified")
        ),
    };

    send_email(config, to_email, subject, &body).await
}
