mod config;
mod db;
mod dtos;
mod error;
mod handler;
mod mail;
mod middleware;
mod models;
mod routes;
mod service;
mod utils;

use std::sync::Arc;

use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use config::Config;
use crate::db::db::DBClient;
use dotenv::dotenv;
use routes::create_router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::filter::LevelFilter;

use service::{
    admin_decision::AdminDecisionService,
    notification::{run_dispatch_worker, NotificationDispatcher},
    product_verification::ProductVerificationEngine,
};

#[derive(Debug, Clone)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<DBClient>,
    // Services
    pub verification_engine: Arc<ProductVerificationEngine>,
    pub admin_decision_service: Arc<AdminDecisionService>,
    pub notification_dispatcher: NotificationDispatcher,
}

impl AppState {
    pub fn new(
        db_client: DBClient,
        config: Config,
        notification_dispatcher: NotificationDispatcher,
    ) -> Self {
        let db_client_arc = Arc::new(db_client);

        let verification_engine = Arc::new(ProductVerificationEngine::new(&config));
        let admin_decision_service = Arc::new(AdminDecisionService::new(
            db_client_arc.clone(),
            notification_dispatcher.clone(),
        ));

        Self {
            env: config,
            db_client: db_client_arc,
            verification_engine,
            admin_decision_service,
            notification_dispatcher,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .init();

    dotenv().ok();

    let config = Config::init();

    // Connect to PostgreSQL
    let pool = match PgPoolOptions::new()
        .max_connections(20)
        .min_connections(5)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            println!("✅ Connection to the database is successful!");
            pool
        }
        Err(err) => {
            println!("🔥 Failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    let db_client = DBClient::new(pool);

    let allowed_origins = vec![
        config.app_url.parse::<HeaderValue>().unwrap(),
        "http://localhost:5173".parse::<HeaderValue>().unwrap(),
        "http://localhost:8000".parse::<HeaderValue>().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::PATCH]);

    if config.verify_api_key.is_none() {
        println!("⚠️  VERIFY_API_KEY not set - product verification will fail closed, all listings go to manual review");
    }

    let (notification_dispatcher, notification_rx) = NotificationDispatcher::new();

    // Outcome emails are delivered off the request path
    tokio::spawn(run_dispatch_worker(notification_rx, config.clone()));

    let app_state = Arc::new(AppState::new(db_client, config.clone(), notification_dispatcher));

    let app = create_router(app_state.clone()).layer(cors);

    println!("🚀 Server is running on http://localhost:{}", config.port);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", &config.port))
        .await
        .unwrap();

    axum::serve(listener, app).await.unwrap();
}
