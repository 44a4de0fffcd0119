use std::sync::Arc;

use axum::{
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    db::profiledb::ProfileExt,
    dtos::profiledtos::{CompanyProfileDto, FarmerProfileDto},
    error::{ErrorMessage, HttpError},
    middleware::JWTAuthMiddleware,
    models::usermodel::UserRole,
    AppState,
};

pub fn profile_handler() -> Router {
    Router::new()
        .route("/farmer", post(submit_farmer_profile))
        .route("/company", post(submit_company_profile))
        .route("/me", get(get_my_profile))
}

/// One onboarding per user: a farmer attaches exactly one profile, which
/// starts pending regardless of anything else.
pub async fn submit_farmer_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Json(body): Json<FarmerProfileDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    if auth.user.role != UserRole::Farmer {
        return Err(HttpError::forbidden(
            ErrorMessage::PermissionDenied.to_string(),
        ));
    }

    let existing = app_state
        .db_client
        .get_farmer_profile_by_user(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if existing.is_some() {
        return Err(HttpError::unique_constraint_violation(
            "A farmer profile already exists for this account".to_string(),
        ));
    }

    let tax_taken = app_state
        .db_client
        .tax_number_exists(&body.tax_number)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if tax_taken {
        return Err(HttpError::unique_constraint_violation(
            ErrorMessage::TaxNumberExist.to_string(),
        ));
    }

    let profile = app_state
        .db_client
        .save_farmer_profile(
            auth.user.id,
            body.farm_name,
            body.city,
            body.district,
            body.tax_number,
            body.about,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": { "profile": profile }
    })))
}

pub async fn submit_company_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Json(body): Json<CompanyProfileDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    if auth.user.role != UserRole::Company {
        return Err(HttpError::forbidden(
            ErrorMessage::PermissionDenied.to_string(),
        ));
    }

    let existing = app_state
        .db_client
        .get_company_profile_by_user(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if existing.is_some() {
        return Err(HttpError::unique_constraint_violation(
            "A company profile already exists for this account".to_string(),
        ));
    }

    let tax_taken = app_state
        .db_client
        .tax_number_exists(&body.tax_number)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if tax_taken {
        return Err(HttpError::unique_constraint_violation(
            ErrorMessage::TaxNumberExist.to_string(),
        ));
    }

    let profile = app_state
        .db_client
        .save_company_profile(
            auth.user.id,
            body.company_name,
            body.city,
            body.district,
            body.tax_number,
            body.tax_office,
            body.about,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": { "profile": profile }
    })))
}

pub async fn get_my_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    let profile = match auth.user.role {
        UserRole::Farmer => {
            let profile = app_state
                .db_client
                .get_farmer_profile_by_user(auth.user.id)
                .await
                .map_err(|e| HttpError::server_error(e.to_string()))?;
            serde_json::to_value(profile).unwrap_or(serde_json::Value::Null)
        }
        UserRole::Company => {
            let profile = app_state
                .db_client
                .get_company_profile_by_user(auth.user.id)
                .await
                .map_err(|e| HttpError::server_error(e.to_string()))?;
            serde_json::to_value(profile).unwrap_or(serde_json::Value::Null)
        }
        _ => {
            return Err(HttpError::not_found(
                "No business profile exists for this role".to_string(),
            ));
        }
    };

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": { "profile": profile }
    })))
}
