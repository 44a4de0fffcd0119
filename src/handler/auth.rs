use std::sync::Arc;

use axum::{
    http::{header, HeaderMap},
    response::IntoResponse,
    routing::post,
    Extension, Json, Router,
};
use axum_extra::extract::cookie::Cookie;
use validator::Validate;

use crate::{
    db::{profiledb::ProfileExt, userdb::UserExt},
    dtos::userdtos::*,
    error::{ErrorMessage, HttpError},
    models::usermodel::{AccountStatus, UserRole},
    utils::{password, token},
    AppState,
};

pub fn auth_handler() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Registration creates the user with its role-dependent initial approval
/// status; farmers and companies may attach their business profile in the
/// same request, which is created alongside in the pending state.
pub async fn register(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<RegisterUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let profile_draft = match body.role {
        UserRole::Farmer => {
            if let Some(draft) = &body.farmer_profile {
                draft
                    .validate()
                    .map_err(|e| HttpError::bad_request(e.to_string()))?;
                Some(ProfileDraft::Farmer(draft.clone()))
            } else {
                None
            }
        }
        UserRole::Company => {
            if let Some(draft) = &body.company_profile {
                draft
                    .validate()
                    .map_err(|e| HttpError::bad_request(e.to_string()))?;
                Some(ProfileDraft::Company(draft.clone()))
            } else {
                None
            }
        }
        _ => None,
    };

    let existing_user = app_state
        .db_client
        .get_user(None, Some(&body.email))
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if existing_user.is_some() {
        return Err(HttpError::unique_constraint_violation(
            ErrorMessage::EmailExist.to_string(),
        ));
    }

    if let Some(draft) = &profile_draft {
        let tax_number = match draft {
            ProfileDraft::Farmer(d) => &d.tax_number,
            ProfileDraft::Company(d) => &d.tax_number,
        };
        let tax_taken = app_state
            .db_client
            .tax_number_exists(tax_number)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?;
        if tax_taken {
            return Err(HttpError::unique_constraint_violation(
                ErrorMessage::TaxNumberExist.to_string(),
            ));
        }
    }

    let hashed_password = password::hash(&body.password)
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let user = app_state
        .db_client
        .save_user(
            body.name,
            body.email,
            hashed_password,
            body.phone,
            body.role,
        )
        .await
        .map_err(|e| {
            if crate::db::userdb::is_unique_violation(&e, "email") {
                HttpError::unique_constraint_violation(ErrorMessage::EmailExist.to_string())
            } else {
                HttpError::server_error(e.to_string())
            }
        })?;

    match profile_draft {
        Some(ProfileDraft::Farmer(draft)) => {
            app_state
                .db_client
                .save_farmer_profile(
                    user.id,
                    draft.farm_name,
                    draft.city,
                    draft.district,
                    draft.tax_number,
                    draft.about,
                )
                .await
                .map_err(|e| HttpError::server_error(e.to_string()))?;
        }
        Some(ProfileDraft::Company(draft)) => {
            app_state
                .db_client
                .save_company_profile(
                    user.id,
                    draft.company_name,
                    draft.city,
                    draft.district,
                    draft.tax_number,
                    draft.tax_office,
                    draft.about,
                )
                .await
                .map_err(|e| HttpError::server_error(e.to_string()))?;
        }
        None => {}
    }

    let filtered_user = FilterUserDto::filter_user(&user);

    Ok(Json(UserResponseDto {
        status: "success".to_string(),
        data: UserData {
            user: filtered_user,
        },
    }))
}

enum ProfileDraft {
    Farmer(crate::dtos::profiledtos::FarmerProfileDto),
    Company(crate::dtos::profiledtos::CompanyProfileDto),
}

pub async fn login(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<LoginUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let result = app_state
        .db_client
        .get_user(None, Some(&body.email))
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let user = result.ok_or(HttpError::bad_request(
        ErrorMessage::WrongCredentials.to_string(),
    ))?;

    let password_matched = password::compare(&body.password, &user.password)
        .map_err(|_| HttpError::bad_request(ErrorMessage::WrongCredentials.to_string()))?;

    if !password_matched {
        return Err(HttpError::bad_request(
            ErrorMessage::WrongCredentials.to_string(),
        ));
    }

    // Suspended and deactivated accounts cannot log in at all; pending and
    // rejected applications still can, they just hit the approval gate.
    if matches!(
        user.account_status,
        AccountStatus::Suspended | AccountStatus::Deactivated
    ) {
        return Err(HttpError::forbidden(
            ErrorMessage::AccountNotActive.to_string(),
        ));
    }

    let token = token::create_token(
        &user.id.to_string(),
        user.role,
        app_state.env.jwt_secret.as_bytes(),
        app_state.env.jwt_maxage,
    )
    .map_err(|e| HttpError::server_error(e.to_string()))?;

    let cookie_duration = time::Duration::minutes(app_state.env.jwt_maxage);
    let cookie = Cookie::build(("token", token.clone()))
        .path("/")
        .max_age(cookie_duration)
        .http_only(true)
        .build();

    let mut headers = HeaderMap::new();
    headers.append(
        header::SET_COOKIE,
        cookie
            .to_string()
            .parse()
            .map_err(|_| HttpError::server_error("Failed to build session cookie".to_string()))?,
    );

    let response = Json(UserLoginResponseDto {
        status: "success".to_string(),
        token,
    });

    Ok((headers, response))
}
