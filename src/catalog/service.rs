use std::collections::HashMap;

use sqlx::PgPool;
use url::Url;
use uuid::Uuid;

use crate::gateway::models::{NewProduct, Product};
use crate::gateway::GatewayError;

const PRODUCTS: &str = "products";

/// Field-level validation of a product write payload. Returns a map of
/// field name to human-readable problem; empty result means the payload
/// is acceptable.
pub fn validate(input: &NewProduct) -> Result<(), HashMap<String, String>> {
    let mut errors = HashMap::new();

    if input.name.trim().is_empty() {
        errors.insert("name".to_string(), "Name is required".to_string());
    }

    if Url::parse(&input.external_link).is_err() {
        errors.insert(
            "external_link".to_string(),
            "Must be a valid URL".to_string(),
        );
    }

    if let Some(image_url) = &input.image_url {
        if !image_url.is_empty() && Url::parse(image_url).is_err() {
            errors.insert("image_url".to_string(), "Must be a valid URL".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Catalog writes, reachable only through the admin routes.
#[derive(Clone)]
pub struct ProductAdmin {
    pool: PgPool,
}

impl ProductAdmin {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Full listing for the management view, newest first.
    pub async fn list(&self) -> Result<Vec<Product>, GatewayError> {
        sqlx::query_as::<_, Product>(
            "SELECT * FROM \"products\" ORDER BY \"created_at\" DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GatewayError::from_sqlx(PRODUCTS, e))
    }

    pub async fn get(&self, id: Uuid) -> Result<Product, GatewayError> {
        sqlx::query_as::<_, Product>("SELECT * FROM \"products\" WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| GatewayError::from_sqlx(PRODUCTS, e))?
            .ok_or_else(|| GatewayError::NotFound(format!("Product not found: {}", id)))
    }

    pub async fn create(&self, input: NewProduct) -> Result<Product, GatewayError> {
        sqlx::query_as::<_, Product>(
            "INSERT INTO \"products\" (name, description, image_url, external_link) \
             VALUES ($1, $2, $3, $4) \
             RETURNING *",
        )
        .bind(input.name)
        .bind(input.description)
        .bind(input.image_url)
        .bind(input.external_link)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| GatewayError::from_sqlx(PRODUCTS, e))
    }

    /// Full-record update. Absent optional fields clear the stored value.
    pub async fn update(&self, id: Uuid, input: NewProduct) -> Result<Product, GatewayError> {
        sqlx::query_as::<_, Product>(
            "UPDATE \"products\" \
             SET name = $2, description = $3, image_url = $4, external_link = $5 \
             WHERE id = $1 \
             RETURNING *",
        )
        .bind(id)
        .bind(input.name)
        .bind(input.description)
        .bind(input.image_url)
        .bind(input.external_link)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| GatewayError::from_sqlx(PRODUCTS, e))?
        .ok_or_else(|| GatewayError::NotFound(format!("Product not found: {}", id)))
    }

    /// Hard delete. Click history rows for the product are removed by the
    /// foreign key cascade.
    pub async fn remove(&self, id: Uuid) -> Result<(), GatewayError> {
        let result = sqlx::query("DELETE FROM \"products\" WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| GatewayError::from_sqlx(PRODUCTS, e))?;

        if result.rows_affected() == 0 {
            return Err(GatewayError::NotFound(format!("Product not found: {}", id)));
        }
        Ok(())
    }
}
