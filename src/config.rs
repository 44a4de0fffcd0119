// config.rs
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub app_url: String,
    pub jwt_secret: String,
    pub jwt_maxage: i64,
    pub port: u16,
    // Email service configuration
    pub resend_api_key: String,
    pub mail_from: String,
    // Product verification engine configuration
    pub verify_api_key: Option<String>,
    pub verify_api_url: String,
    pub verify_timeout_secs: u64,
    // Image store configuration
    pub upload_base_url: String,
    pub product_images_path: String,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = std::env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set");
        let jwt_maxage = std::env::var("JWT_MAXAGE").expect("JWT_MAXAGE must be set");
        let app_url = std::env::var("APP_URL").expect("APP_URL must be set");
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8000);

        // Email service configuration (with defaults)
        let resend_api_key = std::env::var("RESEND_API_KEY")
            .unwrap_or_else(|_| "".to_string());
        let mail_from = std::env::var("MAIL_FROM")
            .unwrap_or_else(|_| "Agromarket <noreply@agromarket.app>".to_string());

        // Verification engine: a missing key is legal, the engine fails closed
        let verify_api_key = std::env::var("VERIFY_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        let verify_api_url = std::env::var("VERIFY_API_URL").unwrap_or_else(|_| {
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
                .to_string()
        });
        let verify_timeout_secs = std::env::var("VERIFY_TIMEOUT_SECS")
            .ok()
            .and_then(|t| t.parse::<u64>().ok())
            .unwrap_or(25);

        // Image store configuration (with defaults)
        let upload_base_url = std::env::var("UPLOAD_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8000/uploads".to_string());
        let product_images_path = std::env::var("PRODUCT_IMAGES_PATH")
            .unwrap_or_else(|_| "product-images".to_string());

        Config {
            database_url,
            app_url,
            jwt_secret,
            jwt_maxage: jwt_maxage.parse::<i64>().unwrap(),
            port,
            resend_api_key,
            mail_from,
            verify_api_key,
            verify_api_url,
            verify_timeout_secs,
            upload_base_url,
            product_images_path,
        }
    }
}
