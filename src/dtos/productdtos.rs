use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::productmodel::Product;

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct CreateProductDto {
    #[validate(length(min = 2, max = 150, message = "Product name must be between 2-150 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 2000, message = "Description is required"))]
    pub description: String,

    #[validate(length(min = 1, max = 100, message = "Category is required"))]
    pub category_name: String,

    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub unit_price: f64,

    #[validate(length(min = 1, max = 20, message = "Unit is required"))]
    pub unit: String,

    /// Data URI, absolute URL or bare filename in the upload store
    pub image_url: Option<String>,
}

/// Partial update; omitted fields keep their current value.
#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateProductDto {
    #[validate(length(min = 2, max = 150, message = "Product name must be between 2-150 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 2000, message = "Description cannot be empty"))]
    pub description: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Category cannot be empty"))]
    pub category_name: Option<String>,

    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub unit_price: Option<f64>,

    #[validate(length(min = 1, max = 20, message = "Unit cannot be empty"))]
    pub unit: Option<String>,

    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductData {
    pub product: Product,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductResponseDto {
    pub status: String,
    pub data: ProductData,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductListResponseDto {
    pub status: String,
    pub products: Vec<Product>,
    pub results: usize,
}
