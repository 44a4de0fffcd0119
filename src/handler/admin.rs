use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{productdb::ProductExt, profiledb::ProfileExt},
    dtos::{admindtos::*, userdtos::RequestQueryDto},
    error::HttpError,
    middleware::JWTAuthMiddleware,
    service::admin_decision::DecisionTarget,
    AppState,
};

pub fn admin_handler() -> Router {
    Router::new()
        .route("/pending/:kind", get(list_pending))
        .route("/decide/:kind/:target_id", put(decide))
}

/// Review queue for one entity kind: everything still waiting on a human.
pub async fn list_pending(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(kind): Path<String>,
    Query(query_params): Query<RequestQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query_params
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let target = DecisionTarget::from_str(&kind).map_err(HttpError::from)?;

    let page = query_params.page.unwrap_or(1) as u32;
    let limit = query_params.limit.unwrap_or(20);

    let data = match target {
        DecisionTarget::Farmer => {
            let farmers = app_state
                .db_client
                .list_pending_farmers(page, limit)
                .await
                .map_err(|e| HttpError::server_error(e.to_string()))?;
            serde_json::json!({ "results": farmers.len(), "farmers": farmers })
        }
        DecisionTarget::Company => {
            let companies = app_state
                .db_client
                .list_pending_companies(page, limit)
                .await
                .map_err(|e| HttpError::server_error(e.to_string()))?;
            serde_json::json!({ "results": companies.len(), "companies": companies })
        }
        DecisionTarget::Product => {
            let products = app_state
                .db_client
                .list_pending_products(page, limit)
                .await
                .map_err(|e| HttpError::server_error(e.to_string()))?;
            serde_json::json!({ "results": products.len(), "products": products })
        }
    };

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": data
    })))
}

pub async fn decide(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path((kind, target_id)): Path<(String, Uuid)>,
    Json(body): Json<DecideDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let target = DecisionTarget::from_str(&kind).map_err(HttpError::from)?;

    let decision = app_state
        .admin_decision_service
        .decide(auth.user.id, target, target_id, body.outcome, body.reason)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(DecisionResponseDto {
        status: "success".to_string(),
        data: decision,
    }))
}
