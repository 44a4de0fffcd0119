use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

/// Tax numbers are 10 digits for companies, 11 for sole proprietors
/// registering with their citizen number.
fn validate_tax_number(tax_number: &str) -> Result<(), ValidationError> {
    let tax_regex = regex::Regex::new(r"^[0-9]{10,11}$")
        .map_err(|_| ValidationError::new("invalid_tax_regex"))?;

    if !tax_regex.is_match(tax_number) {
        let mut error = ValidationError::new("invalid_tax_number");
        error.message = Some(Cow::from("Tax number must be 10 or 11 digits"));
        return Err(error);
    }
    Ok(())
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct FarmerProfileDto {
    #[validate(length(min = 2, max = 100, message = "Farm name must be between 2-100 characters"))]
    pub farm_name: String,

    #[validate(length(min = 2, max = 100, message = "City is required"))]
    pub city: String,

    #[validate(length(min = 2, max = 100, message = "District is required"))]
    pub district: String,

    #[validate(custom = "validate_tax_number")]
    pub tax_number: String,

    #[validate(length(max = 1000, message = "About must be less than 1000 characters"))]
    pub about: Option<String>,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct CompanyProfileDto {
    #[validate(length(min = 2, max = 100, message = "Company name must be between 2-100 characters"))]
    pub company_name: String,

    #[validate(length(min = 2, max = 100, message = "City is required"))]
    pub city: String,

    #[validate(length(min = 2, max = 100, message = "District is required"))]
    pub district: String,

    #[validate(custom = "validate_tax_number")]
    pub tax_number: String,

    #[validate(length(max = 100, message = "Tax office must be less than 100 characters"))]
    pub tax_office: Option<String>,

    #[validate(length(max = 1000, message = "About must be less than 1000 characters"))]
    pub about: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_tax_numbers_pass() {
        assert!(validate_tax_number("1234567890").is_ok());
        assert!(validate_tax_number("12345678901").is_ok());
    }

    #[test]
    fn malformed_tax_numbers_fail() {
        assert!(validate_tax_number("12345").is_err());
        assert!(validate_tax_number("123456789012").is_err());
        assert!(validate_tax_number("12345abc90").is_err());
    }

    #[test]
    fn farmer_profile_dto_requires_fields() {
        let dto = FarmerProfileDto {
            farm_name: "A".to_string(),
            city: "".to_string(),
            district: "".to_string(),
            tax_number: "abc".to_string(),
            about: None,
        };
        assert!(dto.validate().is_err());

        let dto = FarmerProfileDto {
            farm_name: "Green Valley Farm".to_string(),
            city: "Izmir".to_string(),
            district: "Urla".to_string(),
            tax_number: "1234567890".to_string(),
            about: Some("Family farm since 1982".to_string()),
        };
        assert!(dto.validate().is_ok());
    }
}
