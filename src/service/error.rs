use thiserror::Error;
use uuid::Uuid;

use crate::error::HttpError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("User {0} not found")]
    UserNotFound(Uuid),

    #[error("Farmer profile {0} not found")]
    FarmerProfileNotFound(Uuid),

    #[error("Company profile {0} not found")]
    CompanyProfileNotFound(Uuid),

    #[error("Product {0} not found")]
    ProductNotFound(Uuid),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("A record with this {0} already exists")]
    DuplicateConstraint(&'static str),

    #[error("Image could not be resolved: {0}")]
    ImageUnresolved(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Notification error: {0}")]
    Notification(String),
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::UserNotFound(_)
            | ServiceError::FarmerProfileNotFound(_)
            | ServiceError::CompanyProfileNotFound(_)
            | ServiceError::ProductNotFound(_) => HttpError::not_found(error.to_string()),

            ServiceError::Validation(_) => HttpError::bad_request(error.to_string()),

            ServiceError::DuplicateConstraint(_) => {
                HttpError::unique_constraint_violation(error.to_string())
            }

            _ => HttpError::server_error(error.to_string()),
        }
    }
}
