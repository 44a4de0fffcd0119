// db/productdb.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::db::DBClient;

use crate::models::{productmodel::Product, usermodel::ApprovalStatus};

const PRODUCT_COLUMNS: &str = r#"id, farmer_id, name, description, category_name, unit_price, unit,
    image_url, approval_status, approval_date, rejection_reason, created_at, updated_at"#;

#[async_trait]
pub trait ProductExt {
    async fn get_product(&self, product_id: Uuid) -> Result<Option<Product>, sqlx::Error>;

    #[allow(clippy::too_many_arguments)]
    async fn save_product<T: Into<String> + Send>(
        &self,
        farmer_id: Uuid,
        name: T,
        description: T,
        category_name: T,
        unit_price: f64,
        unit: T,
        image_url: Option<String>,
        status: ApprovalStatus,
        approval_date: Option<DateTime<Utc>>,
    ) -> Result<Product, sqlx::Error>;

    #[allow(clippy::too_many_arguments)]
    async fn update_product<T: Into<String> + Send>(
        &self,
        product_id: Uuid,
        name: T,
        description: T,
        category_name: T,
        unit_price: f64,
        unit: T,
        image_url: Option<String>,
        status: ApprovalStatus,
        approval_date: Option<DateTime<Utc>>,
    ) -> Result<Product, sqlx::Error>;

    /// Admin decision on a product: moves the status, stamps the decision
    /// time, records the reason on rejection and clears it on approval.
    async fn apply_product_decision(
        &self,
        product_id: Uuid,
        status: ApprovalStatus,
        rejection_reason: Option<String>,
    ) -> Result<Product, sqlx::Error>;

    async fn list_pending_products(
        &self,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Product>, sqlx::Error>;

    async fn list_approved_products(
        &self,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Product>, sqlx::Error>;

    async fn list_products_by_farmer(
        &self,
        farmer_id: Uuid,
    ) -> Result<Vec<Product>, sqlx::Error>;
}

#[async_trait]
impl ProductExt for DBClient {
    async fn get_product(&self, product_id: Uuid) -> Result<Option<Product>, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn save_product<T: Into<String> + Send>(
        &self,
        farmer_id: Uuid,
        name: T,
        description: T,
        category_name: T,
        unit_price: f64,
        unit: T,
        image_url: Option<String>,
        status: ApprovalStatus,
        approval_date: Option<DateTime<Utc>>,
    ) -> Result<Product, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products (farmer_id, name, description, category_name, unit_price, unit,
                                  image_url, approval_status, approval_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(farmer_id)
        .bind(name.into())
        .bind(description.into())
        .bind(category_name.into())
        .bind(unit_price)
        .bind(unit.into())
        .bind(image_url)
        .bind(status)
        .bind(approval_date)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_product<T: Into<String> + Send>(
        &self,
        product_id: Uuid,
        name: T,
        description: T,
        category_name: T,
        unit_price: f64,
        unit: T,
        image_url: Option<String>,
        status: ApprovalStatus,
        approval_date: Option<DateTime<Utc>>,
    ) -> Result<Product, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products
            SET name = $2, description = $3, category_name = $4, unit_price = $5, unit = $6,
                image_url = $7, approval_status = $8, approval_date = $9, updated_at = NOW()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(product_id)
        .bind(name.into())
        .bind(description.into())
        .bind(category_name.into())
        .bind(unit_price)
        .bind(unit.into())
        .bind(image_url)
        .bind(status)
        .bind(approval_date)
        .fetch_one(&self.pool)
        .await
    }

    async fn apply_product_decision(
        &self,
        product_id: Uuid,
        status: ApprovalStatus,
        rejection_reason: Option<String>,
    ) -> Result<Product, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products
            SET approval_status = $2,
                approval_date = NOW(),
                rejection_reason = $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(product_id)
        .bind(status)
        .bind(rejection_reason)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_pending_products(
        &self,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Product>, sqlx::Error> {
        let offset = (page - 1) * limit as u32;

        sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE approval_status = 'pending'
            ORDER BY created_at ASC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_approved_products(
        &self,
        page: u32,
        limit: usize,
    ) -> Result<Vec<Product>, sqlx::Error> {
        let offset = (page - 1) * limit as u32;

        sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE approval_status = 'approved'
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_products_by_farmer(
        &self,
        farmer_id: Uuid,
    ) -> Result<Vec<Product>, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE farmer_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(farmer_id)
        .fetch_all(&self.pool)
        .await
    }
}
