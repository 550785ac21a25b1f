use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::{NewProductFields, ProductForm};
use super::files::ImageMeta;

/// Inventory item. Image metadata columns are populated together when an
/// image is attached and stay untouched otherwise.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub category: String,
    pub model: String,
    pub inventory_number: String,
    pub serial_number: Option<String>,
    pub guarantee: Option<String>,
    pub price: String,
    pub status: String,
    pub belong_to: Option<String>,
    pub description: Option<String>,
    pub comment: Option<String>,
    pub file_name: Option<String>,
    pub file_path: Option<String>,
    pub file_type: Option<String>,
    pub file_size: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const PRODUCT_COLUMNS: &str = r#"
    id, user_id, name, category, model, inventory_number, serial_number,
    guarantee, price, status, belong_to, description, comment,
    file_name, file_path, file_type, file_size, created_at, updated_at
"#;

impl Product {
    /// Insert with a caller-supplied id so the image object key can embed
    /// the product id before the row exists.
    pub async fn create(
        db: &PgPool,
        id: Uuid,
        user_id: Uuid,
        fields: NewProductFields,
        image: Option<ImageMeta>,
    ) -> anyhow::Result<Product> {
        let (file_name, file_path, file_type, file_size) = match image {
            Some(meta) => (
                Some(meta.file_name),
                Some(meta.file_path),
                Some(meta.file_type),
                Some(meta.file_size),
            ),
            None => (None, None, None, None),
        };

        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products (
                id, user_id, name, category, model, inventory_number, serial_number,
                guarantee, price, status, belong_to, description, comment,
                file_name, file_path, file_type, file_size
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(fields.name)
        .bind(fields.category)
        .bind(fields.model)
        .bind(fields.inventory_number)
        .bind(fields.serial_number)
        .bind(fields.guarantee)
        .bind(fields.price)
        .bind(fields.status)
        .bind(fields.belong_to)
        .bind(fields.description)
        .bind(fields.comment)
        .bind(file_name)
        .bind(file_path)
        .bind(file_type)
        .bind(file_size)
        .fetch_one(db)
        .await?;
        Ok(product)
    }

    /// All products, newest first.
    pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<Product>> {
        let rows = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC"
        ))
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(product)
    }

    /// Patch semantics: omitted fields keep their current value; a fresh
    /// image replaces all four metadata columns together. A single UPDATE,
    /// so concurrent writers race last-write-wins without partial merges.
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        patch: &ProductForm,
        image: Option<ImageMeta>,
    ) -> anyhow::Result<Option<Product>> {
        let (file_name, file_path, file_type, file_size) = match image {
            Some(meta) => (
                Some(meta.file_name),
                Some(meta.file_path),
                Some(meta.file_type),
                Some(meta.file_size),
            ),
            None => (None, None, None, None),
        };

        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products SET
                name = COALESCE($2, name),
                category = COALESCE($3, category),
                model = COALESCE($4, model),
                inventory_number = COALESCE($5, inventory_number),
                serial_number = COALESCE($6, serial_number),
                guarantee = COALESCE($7, guarantee),
                price = COALESCE($8, price),
                status = COALESCE($9, status),
                belong_to = COALESCE($10, belong_to),
                description = COALESCE($11, description),
                comment = COALESCE($12, comment),
                file_name = COALESCE($13, file_name),
                file_path = COALESCE($14, file_path),
                file_type = COALESCE($15, file_type),
                file_size = COALESCE($16, file_size),
                updated_at = now()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.category)
        .bind(&patch.model)
        .bind(&patch.inventory_number)
        .bind(&patch.serial_number)
        .bind(&patch.guarantee)
        .bind(&patch.price)
        .bind(&patch.status)
        .bind(&patch.belong_to)
        .bind(&patch.description)
        .bind(&patch.comment)
        .bind(file_name)
        .bind(file_path)
        .bind(file_type)
        .bind(file_size)
        .fetch_optional(db)
        .await?;
        Ok(product)
    }

    /// Delete and return the row, `None` if it was already gone.
    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "DELETE FROM products WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(product)
    }
}
