use anyhow::Context;
use uuid::Uuid;

use super::dto::ImageUpload;
use crate::state::AppState;

/// Metadata persisted on the product row; the bytes live in the object
/// store under `file_path`.
#[derive(Debug, Clone)]
pub struct ImageMeta {
    pub file_name: String,
    pub file_path: String,
    pub file_type: String,
    pub file_size: String,
}

/// Upload the image bytes and return the metadata to persist.
pub async fn store_image(
    state: &AppState,
    user_id: Uuid,
    product_id: Uuid,
    upload: ImageUpload,
) -> anyhow::Result<ImageMeta> {
    let size = upload.body.len() as u64;
    let key = object_key(user_id, product_id, &upload.content_type);
    state
        .storage
        .put_object(&key, upload.body, &upload.content_type)
        .await
        .with_context(|| format!("put_object {}", key))?;

    Ok(ImageMeta {
        file_name: upload.file_name,
        file_path: key,
        file_type: upload.content_type,
        file_size: format_file_size(size, 2),
    })
}

const IMAGE_URL_TTL_SECS: u64 = 600;

/// Short-lived presigned URL for a stored product image.
pub async fn presign_image(state: &AppState, key: &str) -> anyhow::Result<String> {
    state
        .storage
        .presign_get(key, IMAGE_URL_TTL_SECS)
        .await
        .with_context(|| format!("presign url for {}", key))
}

/// Remove a replaced image object from the store.
pub async fn delete_image(state: &AppState, key: &str) -> anyhow::Result<()> {
    state
        .storage
        .delete_object(key)
        .await
        .with_context(|| format!("delete_object {}", key))
}

fn object_key(user_id: Uuid, product_id: Uuid, content_type: &str) -> String {
    let ext = ext_from_mime(content_type).unwrap_or("bin");
    format!("products/{}/{}-{}.{}", user_id, product_id, Uuid::new_v4(), ext)
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Human-readable size with the given number of decimal places, e.g.
/// `1.54 KB`. Decimal units, matching what inventory frontends display.
pub fn format_file_size(bytes: u64, decimals: usize) -> String {
    if bytes == 0 {
        return "0 Bytes".into();
    }
    let k = 1000_f64;
    let exponent = ((bytes as f64).ln() / k.ln()).floor() as usize;
    let exponent = exponent.min(SIZE_UNITS.len() - 1);
    let value = bytes as f64 / k.powi(exponent as i32);
    format!("{:.*} {}", decimals, value, SIZE_UNITS[exponent])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use crate::storage::StorageClient;
    use axum::async_trait;
    use bytes::Bytes;
    use std::sync::{Arc, Mutex};

    /// Records every store call so tests can assert what was touched.
    #[derive(Default)]
    struct RecordingStorage {
        puts: Mutex<Vec<String>>,
        deletes: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl StorageClient for RecordingStorage {
        async fn put_object(&self, key: &str, _b: Bytes, _ct: &str) -> anyhow::Result<()> {
            self.puts.lock().unwrap().push(key.to_string());
            Ok(())
        }
        async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
            self.deletes.lock().unwrap().push(key.to_string());
            Ok(())
        }
        async fn presign_get(&self, key: &str, _s: u64) -> anyhow::Result<String> {
            Ok(format!("https://fake.local/{}", key))
        }
    }

    fn recording_state() -> (AppState, Arc<RecordingStorage>) {
        let mut state = AppState::fake();
        let recorder = Arc::new(RecordingStorage::default());
        state.storage = recorder.clone();
        (state, recorder)
    }

    #[test]
    fn format_file_size_covers_units() {
        assert_eq!(format_file_size(0, 2), "0 Bytes");
        assert_eq!(format_file_size(500, 2), "500.00 Bytes");
        assert_eq!(format_file_size(1000, 2), "1.00 KB");
        assert_eq!(format_file_size(1536, 2), "1.54 KB");
        assert_eq!(format_file_size(2_500_000, 2), "2.50 MB");
        assert_eq!(format_file_size(3_000_000_000, 2), "3.00 GB");
    }

    #[test]
    fn format_file_size_respects_decimals() {
        assert_eq!(format_file_size(1536, 0), "2 KB");
        assert_eq!(format_file_size(1536, 3), "1.536 KB");
    }

    #[test]
    fn ext_from_mime_known_and_unknown() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("application/pdf"), None);
    }

    #[test]
    fn object_key_is_scoped_to_user_and_product() {
        let user = Uuid::new_v4();
        let product = Uuid::new_v4();
        let key = object_key(user, product, "image/png");
        assert!(key.starts_with(&format!("products/{}/{}-", user, product)));
        assert!(key.ends_with(".png"));
    }

    #[tokio::test]
    async fn store_image_returns_metadata() {
        let state = AppState::fake();
        let upload = ImageUpload {
            file_name: "label.png".into(),
            content_type: "image/png".into(),
            body: Bytes::from_static(&[0u8; 1500]),
        };
        let meta = store_image(&state, Uuid::new_v4(), Uuid::new_v4(), upload)
            .await
            .expect("fake store never fails");
        assert_eq!(meta.file_name, "label.png");
        assert_eq!(meta.file_type, "image/png");
        assert_eq!(meta.file_size, "1.50 KB");
        assert!(meta.file_path.ends_with(".png"));
    }

    #[tokio::test]
    async fn store_image_writes_under_the_returned_key() {
        let (state, recorder) = recording_state();
        let upload = ImageUpload {
            file_name: "label.jpg".into(),
            content_type: "image/jpeg".into(),
            body: Bytes::from_static(b"bytes"),
        };
        let meta = store_image(&state, Uuid::new_v4(), Uuid::new_v4(), upload)
            .await
            .expect("store");
        assert_eq!(*recorder.puts.lock().unwrap(), vec![meta.file_path.clone()]);
    }

    #[tokio::test]
    async fn delete_image_removes_the_given_object() {
        let (state, recorder) = recording_state();
        delete_image(&state, "products/u/p-old.jpg")
            .await
            .expect("delete");
        assert_eq!(
            *recorder.deletes.lock().unwrap(),
            vec!["products/u/p-old.jpg".to_string()]
        );
    }

    #[tokio::test]
    async fn presign_image_points_at_the_stored_key() {
        let state = AppState::fake();
        let url = presign_image(&state, "products/u/p-1.png")
            .await
            .expect("presign");
        assert!(url.contains("products/u/p-1.png"));
    }
}
