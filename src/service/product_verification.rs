// service/product_verification.rs
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    config::Config,
    models::{productmodel::Product, usermodel::ApprovalStatus},
    service::{
        error::ServiceError,
        image_resolver::{ImageResolver, ResolvedImage},
    },
};

/// Listings only skip the human queue when the model is both positive and
/// at least this confident.
pub const AUTO_APPROVE_THRESHOLD: f64 = 0.85;

/// Outcome of one verification call. Never persisted on its own; consumed
/// immediately to set the product's approval fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationVerdict {
    pub is_valid: bool,
    pub confidence: f64,
    pub reason: String,
    pub auto_approved: bool,
}

impl VerificationVerdict {
    pub fn fail_closed(reason: impl Into<String>) -> Self {
        VerificationVerdict {
            is_valid: false,
            confidence: 0.0,
            reason: reason.into(),
            auto_approved: false,
        }
    }

    /// Negative or low-confidence verdicts leave the product in the human
    /// review queue; automation never rejects.
    pub fn product_status(&self) -> ApprovalStatus {
        if self.auto_approved {
            ApprovalStatus::Approved
        } else {
            ApprovalStatus::Pending
        }
    }
}

/// The fields we accept from the model's JSON. `autoApproved` is
/// deliberately absent: the gate is recomputed locally so a manipulated
/// response cannot approve itself.
#[derive(Debug, Deserialize)]
struct ModelVerdict {
    #[serde(alias = "isValid")]
    is_valid: bool,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    reason: Option<String>,
}

fn derive_verdict(model: ModelVerdict) -> VerificationVerdict {
    let confidence = model.confidence.clamp(0.0, 1.0);
    VerificationVerdict {
        is_valid: model.is_valid,
        confidence,
        reason: model.reason.unwrap_or_default(),
        auto_approved: model.is_valid && confidence >= AUTO_APPROVE_THRESHOLD,
    }
}

#[derive(Debug, Clone)]
pub struct ProductVerificationEngine {
    client: Client,
    api_key: Option<String>,
    api_url: String,
    resolver: ImageResolver,
}

impl ProductVerificationEngine {
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.verify_timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key: config.verify_api_key.clone(),
            api_url: config.verify_api_url.clone(),
            resolver: ImageResolver::new(config),
        }
    }

    /// Judges a product listing against its image. Every failure path
    /// resolves to a negative verdict; this function has no error exit and
    /// the caller persists the product either way.
    pub async fn verify(
        &self,
        name: &str,
        description: &str,
        category_name: &str,
        image_ref: Option<&str>,
    ) -> VerificationVerdict {
        let Some(api_key) = self.api_key.as_deref() else {
            return VerificationVerdict::fail_closed("verification API key not configured");
        };

        let Some(raw_ref) = image_ref.filter(|r| !r.trim().is_empty()) else {
            return VerificationVerdict::fail_closed("product image is missing");
        };

        let image = match self.resolver.resolve(raw_ref).await {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!("image resolution failed for product '{}': {}", name, e);
                return VerificationVerdict::fail_closed(e.to_string());
            }
        };

        let prompt = build_prompt(name, description, category_name);

        let raw_response = match self.generate(api_key, &prompt, &image).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("verification call failed for product '{}': {}", name, e);
                return VerificationVerdict::fail_closed("verification service unavailable");
            }
        };

        let Some(json_str) = extract_json_object(&raw_response) else {
            return VerificationVerdict::fail_closed("result analysis failed");
        };

        match serde_json::from_str::<ModelVerdict>(json_str) {
            Ok(model) => {
                let verdict = derive_verdict(model);
                tracing::info!(
                    "verification verdict for '{}': valid={} confidence={:.2} auto_approved={}",
                    name,
                    verdict.is_valid,
                    verdict.confidence,
                    verdict.auto_approved
                );
                verdict
            }
            Err(_) => VerificationVerdict::fail_closed("result analysis failed"),
        }
    }

    /// One round trip to the multimodal API: a text part and an inline
    /// image part in, free-form text out.
    async fn generate(
        &self,
        api_key: &str,
        prompt: &str,
        image: &ResolvedImage,
    ) -> Result<String, ServiceError> {
        let body = json!({
            "contents": [{
                "parts": [
                    { "text": prompt },
                    {
                        "inline_data": {
                            "mime_type": image.mime_type,
                            "data": general_purpose::STANDARD.encode(&image.bytes)
                        }
                    }
                ]
            }],
            "generationConfig": { "temperature": 0.0 }
        });

        let response = self
            .client
            .post(&self.api_url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::ExternalService(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ServiceError::ExternalService(format!(
                "verification API returned status {}",
                response.status()
            )));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ServiceError::ExternalService(e.to_string()))?;

        let text = payload["candidates"][0]["content"]["parts"]
            .as_array()
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|part| part["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ServiceError::ExternalService(
                "verification API returned no text".to_string(),
            ));
        }

        Ok(text)
    }
}

/// An edit re-triggers verification only when it touches a field the image
/// is matched against (name, category, the image itself) and the product
/// currently holds an approval that would otherwise go stale.
pub fn edit_requires_reverification(
    product: &Product,
    new_name: &str,
    new_category_name: &str,
    new_image_url: Option<&str>,
) -> bool {
    if product.approval_status != ApprovalStatus::Approved {
        return false;
    }

    product.name != new_name
        || product.category_name != new_category_name
        || product.image_url.as_deref() != new_image_url
}

fn build_prompt(name: &str, description: &str, category_name: &str) -> String {
    format!(
        r#"You are reviewing a product listing for a farmers' market. Judge the attached image against the listing below.

Listing:
- Name: {name}
- Description: {description}
- Category: {category_name}

Evaluate all of the following:
1. The image shows agricultural or food content.
2. The image matches the declared product name.
3. The image is consistent with the description.
4. The product fits the declared category.
5. The image quality is adequate for a public listing.
6. The image contains no prohibited content.

Respond with strict JSON only, no prose and no code fences, exactly this shape:
{{"isValid": true or false, "confidence": number between 0 and 1, "reason": "short explanation"}}"#
    )
}

/// Returns the first balanced `{...}` object in the text, tolerating code
/// fences and chatter around it and braces inside JSON strings.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict_from(raw: &str) -> VerificationVerdict {
        let json_str = extract_json_object(raw).expect("no JSON object found");
        derive_verdict(serde_json::from_str(json_str).expect("parse failed"))
    }

    #[test]
    fn positive_high_confidence_auto_approves() {
        let verdict = verdict_from(r#"{"isValid": true, "confidence": 0.90, "reason": "ok"}"#);
        assert!(verdict.auto_approved);
        assert_eq!(verdict.product_status(), ApprovalStatus::Approved);
    }

    #[test]
    fn positive_low_confidence_stays_pending() {
        let verdict = verdict_from(r#"{"isValid": true, "confidence": 0.50, "reason": "unsure"}"#);
        assert!(!verdict.auto_approved);
        assert_eq!(verdict.product_status(), ApprovalStatus::Pending);
    }

    #[test]
    fn negative_verdict_never_approves_even_when_confident() {
        let verdict =
            verdict_from(r#"{"isValid": false, "confidence": 0.99, "reason": "mismatch"}"#);
        assert!(!verdict.auto_approved);
        // Automation leaves the product pending, it never rejects
        assert_eq!(verdict.product_status(), ApprovalStatus::Pending);
    }

    #[test]
    fn threshold_is_inclusive() {
        let verdict = verdict_from(r#"{"isValid": true, "confidence": 0.85}"#);
        assert!(verdict.auto_approved);
    }

    #[test]
    fn model_self_reported_approval_is_ignored() {
        let verdict = verdict_from(
            r#"{"isValid": true, "confidence": 0.10, "reason": "x", "autoApproved": true}"#,
        );
        assert!(!verdict.auto_approved);
    }

    #[test]
    fn out_of_range_confidence_is_clamped() {
        let verdict = verdict_from(r#"{"isValid": true, "confidence": 3.5}"#);
        assert_eq!(verdict.confidence, 1.0);
        assert!(verdict.auto_approved);
    }

    #[test]
    fn extracts_object_from_fenced_response() {
        let raw = "Sure! Here is my assessment:\n```json\n{\"isValid\": true, \"confidence\": 0.9, \"reason\": \"looks like {fresh} produce\"}\n```\nLet me know.";
        let extracted = extract_json_object(raw).unwrap();
        let verdict: ModelVerdict = serde_json::from_str(extracted).unwrap();
        assert!(verdict.is_valid);
    }

    #[test]
    fn extraction_handles_braces_inside_strings() {
        let raw = r#"{"isValid": false, "confidence": 0.2, "reason": "image shows a {box}, not produce"}"#;
        assert_eq!(extract_json_object(raw), Some(raw));
    }

    #[test]
    fn extraction_fails_on_garbage() {
        assert_eq!(extract_json_object("the model refused to answer"), None);
        assert_eq!(extract_json_object("{\"isValid\": true"), None);
    }

    #[test]
    fn fail_closed_verdict_is_negative() {
        let verdict = VerificationVerdict::fail_closed("result analysis failed");
        assert!(!verdict.is_valid);
        assert_eq!(verdict.confidence, 0.0);
        assert!(!verdict.auto_approved);
        assert_eq!(verdict.product_status(), ApprovalStatus::Pending);
    }

    fn test_config() -> Config {
        Config {
            database_url: "postgres://localhost/agromarket".to_string(),
            app_url: "http://localhost:8000".to_string(),
            jwt_secret: "secret".to_string(),
            jwt_maxage: 60,
            port: 8000,
            resend_api_key: "".to_string(),
            mail_from: "test@agromarket.app".to_string(),
            verify_api_key: None,
            verify_api_url: "http://localhost:1".to_string(),
            verify_timeout_secs: 1,
            upload_base_url: "http://localhost:8000/uploads".to_string(),
            product_images_path: "product-images".to_string(),
        }
    }

    #[tokio::test]
    async fn missing_api_key_fails_closed_without_network() {
        let engine = ProductVerificationEngine::new(&test_config());
        let verdict = engine
            .verify("Tomatoes", "Fresh tomatoes", "Vegetables", Some("tomato.jpg"))
            .await;
        assert!(!verdict.is_valid);
        assert!(!verdict.auto_approved);
        assert_eq!(verdict.product_status(), ApprovalStatus::Pending);
    }

    #[tokio::test]
    async fn missing_image_ref_fails_closed() {
        let mut config = test_config();
        config.verify_api_key = Some("test-key".to_string());
        let engine = ProductVerificationEngine::new(&config);

        for image_ref in [None, Some(""), Some("   ")] {
            let verdict = engine
                .verify("Tomatoes", "Fresh tomatoes", "Vegetables", image_ref)
                .await;
            assert!(!verdict.auto_approved);
            assert_eq!(verdict.product_status(), ApprovalStatus::Pending);
        }
    }

    mod reverification {
        use super::*;
        use chrono::Utc;
        use uuid::Uuid;

        fn approved_product() -> Product {
            Product {
                id: Uuid::new_v4(),
                farmer_id: Uuid::new_v4(),
                name: "Tomatoes".to_string(),
                description: "Fresh field tomatoes".to_string(),
                category_name: "Vegetables".to_string(),
                unit_price: 4.5,
                unit: "kg".to_string(),
                image_url: Some("tomato.jpg".to_string()),
                approval_status: ApprovalStatus::Approved,
                approval_date: Some(Utc::now()),
                rejection_reason: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }
        }

        #[test]
        fn description_only_edit_does_not_retrigger() {
            let product = approved_product();
            assert!(!edit_requires_reverification(
                &product,
                "Tomatoes",
                "Vegetables",
                Some("tomato.jpg"),
            ));
        }

        #[test]
        fn image_change_retriggers() {
            let product = approved_product();
            assert!(edit_requires_reverification(
                &product,
                "Tomatoes",
                "Vegetables",
                Some("tomato-v2.jpg"),
            ));
        }

        #[test]
        fn name_change_retriggers() {
            let product = approved_product();
            assert!(edit_requires_reverification(
                &product,
                "Cherry Tomatoes",
                "Vegetables",
                Some("tomato.jpg"),
            ));
        }

        #[test]
        fn category_change_retriggers() {
            let product = approved_product();
            assert!(edit_requires_reverification(
                &product,
                "Tomatoes",
                "Fruits",
                Some("tomato.jpg"),
            ));
        }

        #[test]
        fn pending_product_never_retriggers_via_edit_rule() {
            let mut product = approved_product();
            product.approval_status = ApprovalStatus::Pending;
            assert!(!edit_requires_reverification(
                &product,
                "Different",
                "Different",
                None,
            ));
        }
    }
}
