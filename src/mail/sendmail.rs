use serde_json::json;
use tokio::time::{sleep, Duration};

use crate::config::Config;

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY_MS: u64 = 1000;

pub type MailError = Box<dyn std::error::Error + Send + Sync>;

pub async fn send_email(
    config: &Config,
    to_email: &str,
    subject: &str,
    html_body: &str,
) -> Result<(), MailError> {
    // Validate inputs
    if to_email.is_empty() {
        return Err("Email recipient cannot be empty".into());
    }
    if !to_email.contains('@') {
        return Err(format!("Invalid email address: {}", to_email).into());
    }
    if config.resend_api_key.is_empty() {
        return Err("RESEND_API_KEY is not configured".into());
    }

    send_with_retries(config, to_email, subject, html_body).await
}

async fn send_with_retries(
    config: &Config,
    to_email: &str,
    subject: &str,
    html_body: &str,
) -> Result<(), MailError> {
    let mut last_error = None;

    for attempt in 1..=MAX_RETRIES {
        match send_via_resend(config, to_email, subject, html_body).await {
            Ok(email_id) => {
                tracing::info!("email sent to {} (id: {})", to_email, email_id);
                return Ok(());
            }
            Err(e) => {
                last_error = Some(e);
                if attempt < MAX_RETRIES {
                    let delay = RETRY_DELAY_MS * (2_u64.pow(attempt - 1)); // Exponential backoff
                    tracing::warn!(
                        "email send attempt {} failed for {}. Retrying in {}ms...",
                        attempt,
                        to_email,
                        delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                }
            }
        }
    }

    let error_msg = last_error
        .map(|e| format!("Failed after {} retries: {}", MAX_RETRIES, e))
        .unwrap_or_else(|| "Unknown email sending error".to_string());

    tracing::error!("email failed for {}: {}", to_email, error_msg);
    Err(error_msg.into())
}

async fn send_via_resend(
    config: &Config,
    to_email: &str,
    subject: &str,
    html_body: &str,
) -> Result<String, MailError> {
    let client = reqwest::Client::new();

    let response = client
        .post("https://api.resend.com/emails")
        .bearer_auth(&config.resend_api_key)
        .json(&json!({
            "from": config.mail_from,
            "to": [to_email],
            "subject": subject,
            "html": html_body,
        }))
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(format!("Resend API error {}: {}", status, body).into());
    }

    let payload: serde_json::Value = response.json().await?;
    let email_id = payload["id"].as_str().unwrap_or("unknown").to_string();

    Ok(email_id)
}
