// service/image_resolver.rs
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use sha2::{Digest, Sha256};

use crate::{config::Config, service::error::ServiceError};

/// The three shapes a product image reference can take.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageRef {
    /// `data:image/...;base64,...` payload carried inline
    DataUri(String),
    /// Absolute http(s) URL
    RemoteUrl(String),
    /// Bare filename resolved against the configured upload base
    RelativeName(String),
}

impl ImageRef {
    pub fn classify(raw: &str) -> ImageRef {
        let trimmed = raw.trim();
        if trimmed.starts_with("data:image/") {
            ImageRef::DataUri(trimmed.to_string())
        } else if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            ImageRef::RemoteUrl(trimmed.to_string())
        } else {
            ImageRef::RelativeName(trimmed.to_string())
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

#[derive(Debug, Clone)]
pub struct ImageResolver {
    client: Client,
    upload_base_url: String,
    product_images_path: String,
}

impl ImageResolver {
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            client,
            upload_base_url: config.upload_base_url.trim_end_matches('/').to_string(),
            product_images_path: config
                .product_images_path
                .trim_matches('/')
                .to_string(),
        }
    }

    /// Resolves an image reference to its binary payload. First matching
    /// shape wins; any fetch failure or empty payload is `ImageUnresolved`.
    pub async fn resolve(&self, raw: &str) -> Result<ResolvedImage, ServiceError> {
        let resolved = match ImageRef::classify(raw) {
            ImageRef::DataUri(uri) => decode_data_uri(&uri)?,
            ImageRef::RemoteUrl(url) => self.fetch(&url).await?,
            ImageRef::RelativeName(name) => {
                let url = format!(
                    "{}/{}/{}",
                    self.upload_base_url, self.product_images_path, name
                );
                self.fetch(&url).await?
            }
        };

        if resolved.bytes.is_empty() {
            return Err(ServiceError::ImageUnresolved(
                "resolved image payload is empty".to_string(),
            ));
        }

        let mut hasher = Sha256::new();
        hasher.update(&resolved.bytes);
        tracing::debug!(
            "resolved image: {} bytes, {}, sha256 {:x}",
            resolved.bytes.len(),
            resolved.mime_type,
            hasher.finalize()
        );

        Ok(resolved)
    }

    async fn fetch(&self, url: &str) -> Result<ResolvedImage, ServiceError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ServiceError::ImageUnresolved(format!("fetch failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ServiceError::ImageUnresolved(format!(
                "fetch returned status {}",
                response.status()
            )));
        }

        let header_mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| v.starts_with("image/"))
            .map(|v| v.to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ServiceError::ImageUnresolved(format!("read failed: {}", e)))?
            .to_vec();

        let mime_type = header_mime
            .or_else(|| sniff_mime(&bytes).map(|m| m.to_string()))
            .unwrap_or_else(|| "image/jpeg".to_string());

        Ok(ResolvedImage { bytes, mime_type })
    }
}

fn decode_data_uri(uri: &str) -> Result<ResolvedImage, ServiceError> {
    let rest = &uri["data:".len()..];
    let (header, data) = rest
        .split_once(',')
        .ok_or_else(|| ServiceError::ImageUnresolved("malformed data URI".to_string()))?;

    if !header.ends_with(";base64") {
        return Err(ServiceError::ImageUnresolved(
            "data URI is not base64 encoded".to_string(),
        ));
    }

    let mime_type = header
        .trim_end_matches(";base64")
        .to_string();

    let bytes = general_purpose::STANDARD
        .decode(data.trim())
        .map_err(|e| ServiceError::ImageUnresolved(format!("base64 decode failed: {}", e)))?;

    Ok(ResolvedImage { bytes, mime_type })
}

/// Magic-number sniff of the payload, for fetches with a missing or
/// non-image content type.
fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    match image::guess_format(bytes).ok()? {
        image::ImageFormat::Jpeg => Some("image/jpeg"),
        image::ImageFormat::Png => Some("image/png"),
        image::ImageFormat::WebP => Some("image/webp"),
        image::ImageFormat::Gif => Some("image/gif"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_data_uri() {
        assert_eq!(
            ImageRef::classify("data:image/png;base64,iVBORw0KGgo="),
            ImageRef::DataUri("data:image/png;base64,iVBORw0KGgo=".to_string())
        );
    }

    #[test]
    fn classifies_absolute_urls() {
        assert_eq!(
            ImageRef::classify("https://cdn.example.com/tomato.jpg"),
            ImageRef::RemoteUrl("https://cdn.example.com/tomato.jpg".to_string())
        );
        assert_eq!(
            ImageRef::classify("http://cdn.example.com/tomato.jpg"),
            ImageRef::RemoteUrl("http://cdn.example.com/tomato.jpg".to_string())
        );
    }

    #[test]
    fn classifies_bare_filename() {
        assert_eq!(
            ImageRef::classify("tomato-42.jpg"),
            ImageRef::RelativeName("tomato-42.jpg".to_string())
        );
    }

    #[test]
    fn decodes_base64_data_uri() {
        // "hi" -> aGk=
        let resolved = decode_data_uri("data:image/png;base64,aGk=").unwrap();
        assert_eq!(resolved.bytes, b"hi");
        assert_eq!(resolved.mime_type, "image/png");
    }

    #[test]
    fn rejects_non_base64_data_uri() {
        let err = decode_data_uri("data:image/png;utf8,hello").unwrap_err();
        assert!(matches!(err, ServiceError::ImageUnresolved(_)));
    }

    #[test]
    fn rejects_data_uri_without_payload_separator() {
        let err = decode_data_uri("data:image/png;base64").unwrap_err();
        assert!(matches!(err, ServiceError::ImageUnresolved(_)));
    }

    #[test]
    fn sniffs_png_magic() {
        let png_header = [0x89u8, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(sniff_mime(&png_header), Some("image/png"));
    }
}
