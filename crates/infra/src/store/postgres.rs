//! Postgres-backed identity and product stores.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `UniqueViolation` |
//! | Database (other) | any other | `Backend` |
//! | PoolClosed / RowNotFound / other | N/A | `Backend` |
//!
//! ## Atomicity
//!
//! Handle uniqueness is enforced by the `UNIQUE` constraint on
//! `users.username`. Quantity updates and deletes are single statements, so
//! concurrent writers to the same product are serialized by Postgres.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use stockroom_auth::{Identity, IdentityStore};
use stockroom_core::{ProductId, StoreError, UserId};
use stockroom_products::{NewProduct, Product, ProductStore};

const PRODUCT_COLUMNS: &str =
    "id, name, type, sku, image_url, description, quantity, price, created_by";

/// Postgres-backed identity store (`users` table).
#[derive(Debug, Clone)]
pub struct PostgresIdentityStore {
    pool: Arc<PgPool>,
}

impl PostgresIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }
}

#[async_trait]
impl IdentityStore for PostgresIdentityStore {
    #[instrument(skip(self), err)]
    async fn find_by_handle(&self, handle: &str) -> Result<Option<Identity>, StoreError> {
        let row = sqlx::query("SELECT id, username, hashed_password FROM users WHERE username = $1")
            .bind(handle)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_identity_by_handle", e))?;

        row.map(|r| identity_from_row(&r)).transpose()
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn find_by_id(&self, id: UserId) -> Result<Option<Identity>, StoreError> {
        let row = sqlx::query("SELECT id, username, hashed_password FROM users WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_identity_by_id", e))?;

        row.map(|r| identity_from_row(&r)).transpose()
    }

    #[instrument(skip(self, digest), err)]
    async fn insert(&self, handle: &str, digest: &str) -> Result<Identity, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (username, hashed_password)
            VALUES ($1, $2)
            RETURNING id, username, hashed_password
            "#,
        )
        .bind(handle)
        .bind(digest)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_identity", e))?;

        identity_from_row(&row)
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> Result<Vec<Identity>, StoreError> {
        let rows = sqlx::query("SELECT id, username, hashed_password FROM users ORDER BY id")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_identities", e))?;

        rows.iter().map(identity_from_row).collect()
    }
}

/// Postgres-backed product store (`products` table).
#[derive(Debug, Clone)]
pub struct PostgresProductStore {
    pool: Arc<PgPool>,
}

impl PostgresProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    #[instrument(skip(self, draft), err)]
    async fn insert(&self, owner: UserId, draft: NewProduct) -> Result<Product, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO products (name, type, sku, image_url, description, quantity, price, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(&draft.name)
            .bind(&draft.kind)
            .bind(&draft.sku)
            .bind(&draft.image_url)
            .bind(&draft.description)
            .bind(draft.quantity)
            .bind(draft.price)
            .bind(owner.get())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_product", e))?;

        product_from_row(&row)
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_product_by_id", e))?;

        row.map(|r| product_from_row(&r)).transpose()
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn update_quantity(&self, id: ProductId, quantity: i64) -> Result<Option<Product>, StoreError> {
        let sql = format!("UPDATE products SET quantity = $2 WHERE id = $1 RETURNING {PRODUCT_COLUMNS}");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .bind(quantity)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_product_quantity", e))?;

        row.map(|r| product_from_row(&r)).transpose()
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn delete(&self, id: ProductId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn count(&self) -> Result<u64, StoreError> {
        let total: i64 = sqlx::query("SELECT COUNT(*) AS total FROM products")
            .fetch_one(&*self.pool)
            .await
            .and_then(|row| row.try_get("total"))
            .map_err(|e| map_sqlx_error("count_products", e))?;

        Ok(u64::try_from(total).unwrap_or(0))
    }

    #[instrument(skip(self), err)]
    async fn list(&self, offset: u64, limit: u64) -> Result<Vec<Product>, StoreError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id OFFSET $1 LIMIT $2");
        let rows = sqlx::query(&sql)
            .bind(i64::try_from(offset).unwrap_or(i64::MAX))
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_products", e))?;

        rows.iter().map(product_from_row).collect()
    }
}

fn identity_from_row(row: &PgRow) -> Result<Identity, StoreError> {
    let decode = |e: sqlx::Error| StoreError::backend(format!("failed to decode users row: {e}"));
    Ok(Identity {
        id: UserId::new(row.try_get("id").map_err(decode)?),
        handle: row.try_get("username").map_err(decode)?,
        digest: row.try_get("hashed_password").map_err(decode)?,
    })
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    let decode = |e: sqlx::Error| StoreError::backend(format!("failed to decode products row: {e}"));
    Ok(Product {
        id: ProductId::new(row.try_get("id").map_err(decode)?),
        name: row.try_get("name").map_err(decode)?,
        kind: row.try_get("type").map_err(decode)?,
        sku: row.try_get("sku").map_err(decode)?,
        image_url: row.try_get("image_url").map_err(decode)?,
        description: row.try_get("description").map_err(decode)?,
        quantity: row.try_get("quantity").map_err(decode)?,
        price: row.try_get("price").map_err(decode)?,
        created_by: UserId::new(row.try_get("created_by").map_err(decode)?),
    })
}

/// Map SQLx errors to the storage taxonomy.
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code() {
                Some(code) if code.as_ref() == "23505" => StoreError::UniqueViolation(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::RowNotFound => {
            StoreError::Backend(format!("unexpected row not found in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}
