// service/notification.rs
use tokio::sync::mpsc;

use crate::{config::Config, mail::mails, service::admin_decision::DecisionOutcome};

/// One outcome message to one recipient.
#[derive(Debug, Clone)]
pub struct NotificationJob {
    pub recipient: String,
    pub recipient_name: String,
    pub template: OutcomeTemplate,
}

#[derive(Debug, Clone)]
pub enum OutcomeTemplate {
    FarmerDecision {
        outcome: DecisionOutcome,
        reason: Option<String>,
    },
    CompanyDecision {
        outcome: DecisionOutcome,
        reason: Option<String>,
    },
    ProductDecision {
        product_name: String,
        outcome: DecisionOutcome,
        reason: Option<String>,
    },
}

/// Fire-and-forget handle held by the services. Enqueueing never blocks
/// and never fails the caller; delivery problems stay on the worker side
/// of the channel.
#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
    tx: mpsc::UnboundedSender<NotificationJob>,
}

impl NotificationDispatcher {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<NotificationJob>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn dispatch(&self, job: NotificationJob) {
        if let Err(e) = self.tx.send(job) {
            tracing::warn!("notification queue is closed, dropping job: {}", e);
        }
    }
}

/// Background worker draining the queue. Runs for the lifetime of the
/// process; a failed delivery is logged and the loop moves on.
pub async fn run_dispatch_worker(mut rx: mpsc::UnboundedReceiver<NotificationJob>, config: Config) {
    tracing::info!("notification dispatch worker started");

    while let Some(job) = rx.recv().await {
        if let Err(e) = deliver(&config, &job).await {
            tracing::error!(
                "notification delivery failed for {}: {}",
                job.recipient,
                e
            );
        }
    }

    tracing::info!("notification dispatch worker stopped");
}

async fn deliver(config: &Config, job: &NotificationJob) -> mails::MailResult {
    match &job.template {
        OutcomeTemplate::FarmerDecision { outcome, reason } => {
            mails::send_application_decision_email(
                config,
                &job.recipient,
                &job.recipient_name,
                "farmer",
                *outcome,
                reason.as_deref(),
            )
            .await
        }
        OutcomeTemplate::CompanyDecision { outcome, reason } => {
            mails::send_application_decision_email(
                config,
                &job.recipient,
                &job.recipient_name,
                "company",
                *outcome,
                reason.as_deref(),
            )
            .await
        }
        OutcomeTemplate::ProductDecision {
            product_name,
            outcome,
            reason,
        } => {
            mails::send_product_decision_email(
                config,
                &job.recipient,
                &job.recipient_name,
                product_name,
                *outcome,
                reason.as_deref(),
            )
            .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dispatch_is_fire_and_forget() {
        let (dispatcher, mut rx) = NotificationDispatcher::new();

        dispatcher.dispatch(NotificationJob {
            recipient: "farmer@example.com".to_string(),
            recipient_name: "Ahmet".to_string(),
            template: OutcomeTemplate::FarmerDecision {
                outcome: DecisionOutcome::Approved,
                reason: None,
            },
        });

        let job = rx.recv().await.expect("job should be queued");
        assert_eq!(job.recipient, "farmer@example.com");
    }

    #[tokio::test]
    async fn dispatch_on_closed_queue_does_not_panic() {
        let (dispatcher, rx) = NotificationDispatcher::new();
        drop(rx);

        dispatcher.dispatch(NotificationJob {
            recipient: "farmer@example.com".to_string(),
            recipient_name: "Ahmet".to_string(),
            template: OutcomeTemplate::FarmerDecision {
                outcome: DecisionOutcome::Rejected,
                reason: Some("incomplete documents".to_string()),
            },
        });
    }
}
