use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    dtos::profiledtos::{CompanyProfileDto, FarmerProfileDto},
    models::usermodel::{User, UserRole},
};

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserDto {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    #[validate(
        length(min = 1, message = "Password is required"),
        length(min = 6, message = "Password must be at least 6 characters")
    )]
    pub password: String,

    #[validate(
        length(min = 1, message = "Confirm Password is required"),
        must_match(other = "password", message = "passwords do not match")
    )]
    #[serde(rename = "passwordConfirm")]
    pub password_confirm: String,

    pub phone: Option<String>,

    pub role: UserRole,

    // Farmers and companies may attach their business profile directly at
    // registration; it is created alongside the user, both pending.
    pub farmer_profile: Option<FarmerProfileDto>,
    pub company_profile: Option<CompanyProfileDto>,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct LoginUserDto {
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    #[validate(
        length(min = 1, message = "Password is required"),
        length(min = 6, message = "Password must be at least 6 characters")
    )]
    pub password: String,
}

#[derive(Serialize, Deserialize, Validate)]
pub struct RequestQueryDto {
    #[validate(range(min = 1))]
    pub page: Option<usize>,
    #[validate(range(min = 1, max = 50))]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FilterUserDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub approval_status: String,
    pub account_status: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl FilterUserDto {
    pub fn filter_user(user: &User) -> Self {
        FilterUserDto {
            id: user.id.to_string(),
            name: user.name.to_owned(),
            email: user.email.to_owned(),
            phone: user.phone.clone(),
            role: user.role.to_str().to_string(),
            approval_status: user.approval_status.to_str().to_string(),
            account_status: user.account_status.to_str().to_string(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserData {
    pub user: FilterUserDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponseDto {
    pub status: String,
    pub data: UserData,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserLoginResponseDto {
    pub status: String,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_dto_requires_matching_passwords() {
        let dto = RegisterUserDto {
            name: "Ahmet".to_string(),
            email: "ahmet@example.com".to_string(),
            password: "secret123".to_string(),
            password_confirm: "different".to_string(),
            phone: None,
            role: UserRole::Farmer,
            farmer_profile: None,
            company_profile: None,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn register_dto_accepts_valid_input() {
        let dto = RegisterUserDto {
            name: "Ahmet".to_string(),
            email: "ahmet@example.com".to_string(),
            password: "secret123".to_string(),
            password_confirm: "secret123".to_string(),
            phone: Some("+905551112233".to_string()),
            role: UserRole::Farmer,
            farmer_profile: None,
            company_profile: None,
        };
        assert!(dto.validate().is_ok());
    }
}
