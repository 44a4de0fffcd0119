// db/profiledb.rs
use async_trait::async_trait;
use uuid::Uuid;

use super::db::DBClient;

use crate::models::{
    profilemodel::{CompanyProfile, FarmerProfile},
    usermodel::ApprovalStatus,
};

#[async_trait]
pub trait ProfileExt {
    async fn get_farmer_profile(
        &self,
        profile_id: Uuid,
    ) -> Result<Option<FarmerProfile>, sqlx::Error>;

    async fn get_farmer_profile_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<FarmerProfile>, sqlx::Error>;

    async fn get_company_profile(
        &self,
        profile_id: Uuid,
    ) -> Result<Option<CompanyProfile>, sqlx::Error>;

    async fn get_company_profile_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<CompanyProfile>, sqlx::Error>;

    /// Tax numbers are unique across farmer and company profiles together.
    async fn tax_number_exists(&self, tax_number: &str) -> Result<bool, sqlx::Error>;

    async fn save_farmer_profile<T: Into<String> + Send>(
        &self,
        user_id: Uuid,
        farm_name: T,
        city: T,
        district: T,
        tax_number: T,
        about: Option<String>,
    ) -> Result<FarmerProfile, sqlx::Error>;

    async fn save_company_profile<T: Into<String> + Send>(
        &self,
        user_id: Uuid,
        company_name: T,
        city: T,
        district: T,
        tax_number: T,
        tax_office: Option<String>,
        about: Option<String>,
    ) -> Result<CompanyProfile, sqlx::Error>;

    async fn list_pending_farmers(
        &self,
        page: u32,
        limit: usize,
    ) -> Result<Vec<FarmerProfile>, sqlx::Error>;

    async fn list_pending_companies(
        &self,
        page: u32,
        limit: usize,
    ) -> Result<Vec<CompanyProfile>, sqlx::Error>;

    /// Applies an admin decision to a farmer: the owning user's status and
    /// the profile's status move together inside one transaction, so either
    /// both records land on the outcome or neither does.
    async fn apply_farmer_decision(
        &self,
        profile_id: Uuid,
        user_id: Uuid,
        status: ApprovalStatus,
    ) -> Result<(), sqlx::Error>;

    async fn apply_company_decision(
        &self,
        profile_id: Uuid,
        user_id: Uuid,
        status: ApprovalStatus,
    ) -> Result<(), sqlx::Error>;
}

#[async_trait]
impl ProfileExt for DBClient {
    async fn get_farmer_profile(
        &self,
        profile_id: Uuid,
    ) -> Result<Option<FarmerProfile>, sqlx::Error> {
        sqlx::query_as::<_, FarmerProfile>(
            r#"
            SELECT id, user_id, farm_name, city, district, tax_number, about,
                   approval_status, created_at, updated_at
            FROM farmer_profiles
            WHERE id = $1
            "#,
        )
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_farmer_profile_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<FarmerProfile>, sqlx::Error> {
        sqlx::query_as::<_, FarmerProfile>(
            r#"
            SELECT id, user_id, farm_name, city, district, tax_number, about,
                   approval_status, created_at, updated_at
            FROM farmer_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_company_profile(
        &self,
        profile_id: Uuid,
    ) -> Result<Option<CompanyProfile>, sqlx::Error> {
        sqlx::query_as::<_, CompanyProfile>(
            r#"
            SELECT id, user_id, company_name, city, district, tax_number, tax_office, about,
                   approval_status, created_at, updated_at
            FROM company_profiles
            WHERE id = $1
            "#,
        )
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_company_profile_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<CompanyProfile>, sqlx::Error> {
        sqlx::query_as::<_, CompanyProfile>(
            r#"
            SELECT id, user_id, company_name, city, district, tax_number, tax_office, about,
                   approval_status, created_at, updated_at
            FROM company_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn tax_number_exists(&self, tax_number: &str) -> Result<bool, sqlx::Error> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT (SELECT COUNT(*) FROM farmer_profiles WHERE tax_number = $1)
                 + (SELECT COUNT(*) FROM company_profiles WHERE tax_number = $1)
            "#,
        )
        .bind(tax_number)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    async fn save_farmer_profile<T: Into<String> + Send>(
        &self,
        user_id: Uuid,
        farm_name: T,
        city: T,
        district: T,
        tax_number: T,
        about: Option<String>,
    ) -> Result<FarmerProfile, sqlx::Error> {
        sqlx::query_as::<_, FarmerProfile>(
            r#"
            INSERT INTO farmer_profiles (user_id, farm_name, city, district, tax_number, about, approval_status)
            VALUES ($1, $2, $3, $4, $5, $6, 'pending')
            RETURNING id, user_id, farm_name, city, district, tax_number, about,
                      approval_status, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(farm_name.into())
        .bind(city.into())
        .bind(district.into())
        .bind(tax_number.into())
        .bind(about)
        .fetch_one(&self.pool)
        .await
    }

    async fn save_company_profile<T: Into<String> + Send>(
        &self,
        user_id: Uuid,
        company_name: T,
        city: T,
        district: T,
        tax_number: T,
        tax_office: Option<String>,
        about: Option<String>,
    ) -> Result<CompanyProfile, sqlx::Error> {
        sqlx::query_as::<_, CompanyProfile>(
            r#"
            INSERT INTO company_profiles (user_id, company_name, city, district, tax_number, tax_office, about, approval_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending')
            RETURNING id, user_id, company_name, city, district, tax_number, tax_office, about,
                      approval_status, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(company_name.into())
        .bind(city.into())
        .bind(district.into())
        .bind(tax_number.into())
        .bind(tax_office)
        .bind(about)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_pending_farmers(
        &self,
        page: u32,
        limit: usize,
    ) -> Result<Vec<FarmerProfile>, sqlx::Error> {
        let offset = (page - 1) * limit as u32;

        sqlx::query_as::<_, FarmerProfile>(
            r#"
            SELECT id, user_id, farm_name, city, district, tax_number, about,
                   approval_status, created_at, updated_at
            FROM farmer_profiles
            WHERE approval_status = 'pending'
            ORDER BY created_at ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_pending_companies(
        &self,
        page: u32,
        limit: usize,
    ) -> Result<Vec<CompanyProfile>, sqlx::Error> {
        let offset = (page - 1) * limit as u32;

        sqlx::query_as::<_, CompanyProfile>(
            r#"
            SELECT id, user_id, company_name, city, district, tax_number, tax_office, about,
                   approval_status, created_at, updated_at
            FROM company_profiles
            WHERE approval_status = 'pending'
            ORDER BY created_at ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await
    }

    async fn apply_farmer_decision(
        &self,
        profile_id: Uuid,
        user_id: Uuid,
        status: ApprovalStatus,
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE users
            SET approval_status = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(status)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE farmer_profiles
            SET approval_status = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(profile_id)
        .bind(status)
        .execute(&mut *tx)
        .await?;

        tx.commit().await
    }

    async fn apply_company_decision(
        &self,
        profile_id: Uuid,
        user_id: Uuid,
        status: ApprovalStatus,
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE users
            SET approval_status = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(status)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE company_profiles
            SET approval_status = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(profile_id)
        .bind(status)
        .execute(&mut *tx)
        .await?;

        tx.commit().await
    }
}
