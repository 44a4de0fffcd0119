use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{productdb::ProductExt, profiledb::ProfileExt},
    dtos::{productdtos::*, userdtos::RequestQueryDto},
    error::{ErrorMessage, HttpError},
    middleware::JWTAuthMiddleware,
    service::product_verification::edit_requires_reverification,
    AppState,
};

pub fn product_handler() -> Router {
    Router::new()
        .route("/create", post(create_product))
        .route("/mine", get(get_my_products))
        .route("/:product_id", put(update_product))
}

/// Public marketplace listing: approved products only.
pub async fn list_products(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query_params): Query<RequestQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query_params
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = query_params.page.unwrap_or(1);
    let limit = query_params.limit.unwrap_or(20);

    let products = app_state
        .db_client
        .list_approved_products(page as u32, limit)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ProductListResponseDto {
        status: "success".to_string(),
        results: products.len(),
        products,
    }))
}

/// Creating a listing runs it through verification. The engine never
/// blocks persistence: a negative or failed verdict just leaves the
/// product pending for human review.
pub async fn create_product(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Json(body): Json<CreateProductDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let profile = app_state
        .db_client
        .get_farmer_profile_by_user(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| {
            HttpError::bad_request("Submit your farmer profile before listing products".to_string())
        })?;

    let verdict = app_state
        .verification_engine
        .verify(
            &body.name,
            &body.description,
            &body.category_name,
            body.image_url.as_deref(),
        )
        .await;

    let status = verdict.product_status();
    let approval_date = verdict.auto_approved.then(Utc::now);

    let product = app_state
        .db_client
        .save_product(
            profile.id,
            body.name,
            body.description,
            body.category_name,
            body.unit_price,
            body.unit,
            body.image_url,
            status,
            approval_date,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ProductResponseDto {
        status: "success".to_string(),
        data: ProductData { product },
    }))
}

pub async fn get_my_products(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    let profile = app_state
        .db_client
        .get_farmer_profile_by_user(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| {
            HttpError::bad_request("Submit your farmer profile before listing products".to_string())
        })?;

    let products = app_state
        .db_client
        .list_products_by_farmer(profile.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ProductListResponseDto {
        status: "success".to_string(),
        results: products.len(),
        products,
    }))
}

/// Edits that change what the image is matched against (name, category or
/// the image itself) demote an approved product back to pending unless the
/// engine can re-approve it on the spot; a stale approval never survives
/// silently. Other edits keep the current status.
pub async fn update_product(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(product_id): Path<Uuid>,
    Json(body): Json<UpdateProductDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let profile = app_state
        .db_client
        .get_farmer_profile_by_user(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| {
            HttpError::bad_request("Submit your farmer profile before listing products".to_string())
        })?;

    let product = app_state
        .db_client
        .get_product(product_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Product not found".to_string()))?;

    if product.farmer_id != profile.id {
        return Err(HttpError::forbidden(
            ErrorMessage::PermissionDenied.to_string(),
        ));
    }

    let name = body.name.unwrap_or_else(|| product.name.clone());
    let description = body
        .description
        .unwrap_or_else(|| product.description.clone());
    let category_name = body
        .category_name
        .unwrap_or_else(|| product.category_name.clone());
    let unit_price = body.unit_price.unwrap_or(product.unit_price);
    let unit = body.unit.unwrap_or_else(|| product.unit.clone());
    let image_url = body.image_url.or_else(|| product.image_url.clone());

    let (status, approval_date) =
        if edit_requires_reverification(&product, &name, &category_name, image_url.as_deref()) {
            let verdict = app_state
                .verification_engine
                .verify(&name, &description, &category_name, image_url.as_deref())
                .await;

            (verdict.product_status(), verdict.auto_approved.then(Utc::now))
        } else {
            (product.approval_status, product.approval_date)
        };

    let updated = app_state
        .db_client
        .update_product(
            product.id,
            name,
            description,
            category_name,
            unit_price,
            unit,
            image_url,
            status,
            approval_date,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ProductResponseDto {
        status: "success".to_string(),
        data: ProductData { product: updated },
    }))
}
