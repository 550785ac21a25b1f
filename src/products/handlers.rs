use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::Redirect,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{auth::extractors::CurrentUser, error::ApiError, state::AppState};

use super::dto::{ImageUpload, ProductForm};
use super::files::{delete_image, presign_image, store_image};
use super::repo::Product;

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/:id",
            get(get_product)
                .patch(update_product)
                .delete(delete_product),
        )
        .route("/products/:id/image", get(get_product_image))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB, images included
}

/// Collect a product form from a multipart body: text fields under their
/// wire names plus at most one `image` file part.
async fn read_form(mut mp: Multipart) -> Result<ProductForm, ApiError> {
    let mut form = ProductForm::default();

    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        let Some(name) = field.name().map(|s| s.to_string()) else {
            continue;
        };

        if name == "image" {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let body = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(format!("Invalid image upload: {}", e)))?;
            form.image = Some(ImageUpload {
                file_name,
                content_type,
                body,
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::Validation(format!("Invalid field {}: {}", name, e)))?;

        match name.as_str() {
            "name" => form.name = Some(value),
            "category" => form.category = Some(value),
            "model" => form.model = Some(value),
            "inventorynumber" => form.inventory_number = Some(value),
            "serialnumber" => form.serial_number = Some(value),
            "guarantee" => form.guarantee = Some(value),
            "price" => form.price = Some(value),
            "statusDevice" => form.status = Some(value),
            "belongTo" => form.belong_to = Some(value),
            "description" => form.description = Some(value),
            "comment" => form.comment = Some(value),
            _ => {} // unknown fields are ignored
        }
    }

    Ok(form)
}

#[instrument(skip(state, user, mp))]
pub async fn create_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mp: Multipart,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let form = read_form(mp).await?;
    let (fields, upload) = form.into_validated().map_err(|missing| {
        ApiError::Validation(format!(
            "All required fields have to be filled: {}",
            missing.join(", ")
        ))
    })?;

    let product_id = Uuid::new_v4();
    let image = match upload {
        Some(upload) => Some(store_image(&state, user.id, product_id, upload).await?),
        None => None,
    };

    let product = Product::create(&state.db, product_id, user.id, fields, image).await?;
    info!(product_id = %product.id, user_id = %user.id, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

#[instrument(skip(state, _user))]
pub async fn list_products(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = Product::list_all(&state.db).await?;
    Ok(Json(products))
}

#[instrument(skip(state, _user))]
pub async fn get_product(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, ApiError> {
    let product = Product::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Product"))?;
    Ok(Json(product))
}

#[instrument(skip(state, user, mp))]
pub async fn update_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    mp: Multipart,
) -> Result<Json<Product>, ApiError> {
    // 404 before touching the object store
    let previous = Product::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Product"))?;

    let form = read_form(mp).await?;
    let image = match form.image.clone() {
        Some(upload) => Some(store_image(&state, user.id, id, upload).await?),
        None => None,
    };
    let replaced = image.is_some();

    let product = Product::update(&state.db, id, &form, image)
        .await?
        .ok_or(ApiError::NotFound("Product"))?;

    // The replaced object is removed only after the row points at the new
    // one; a failed cleanup leaves an orphan, not a dangling reference.
    if replaced {
        if let Some(old_key) = previous.file_path.as_deref() {
            if product.file_path.as_deref() != Some(old_key) {
                if let Err(e) = delete_image(&state, old_key).await {
                    warn!(error = %e, product_id = %id, "replaced image cleanup failed");
                }
            }
        }
    }

    info!(product_id = %id, user_id = %user.id, "product updated");
    Ok(Json(product))
}

/// 302 to a short-lived presigned URL for the product's image.
#[instrument(skip(state, _user))]
pub async fn get_product_image(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Redirect, ApiError> {
    let product = Product::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Product"))?;
    let key = product.file_path.as_deref().ok_or(ApiError::NotFound("Image"))?;
    let url = presign_image(&state, key).await?;
    Ok(Redirect::temporary(&url))
}

#[instrument(skip(state, user))]
pub async fn delete_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, ApiError> {
    let product = Product::delete(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Product"))?;
    info!(product_id = %id, user_id = %user.id, "product deleted");
    Ok(Json(product))
}
