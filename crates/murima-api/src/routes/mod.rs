//! Route modules, one per API surface.

pub mod auth;
pub mod bookings;
pub mod dashboard;
pub mod marketplace;
pub mod movers;
pub mod profiles;
pub mod properties;
pub mod purchases;
pub mod quotes;

use murima_core::UserId;
use murima_media::{upload_all, UploadFile};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::state::AppState;

/// Pagination parameters for list endpoints.
#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct PaginationParams {
    /// Maximum number of items to return (default: 100, max: 1000).
    pub limit: Option<usize>,
    /// Number of items to skip (default: 0).
    pub offset: Option<usize>,
}

impl PaginationParams {
    const DEFAULT_LIMIT: usize = 100;
    const MAX_LIMIT: usize = 1000;

    pub(crate) fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .min(Self::MAX_LIMIT)
    }

    pub(crate) fn effective_offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }
}

/// One image in a listing submission: the client-side file name plus the
/// file bytes, hex-encoded.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ImageFile {
    pub name: String,
    pub data_hex: String,
}

/// Shared validation for image batches, called from each listing create
/// request's `Validate` impl.
pub(crate) fn validate_image_batch(images: &[ImageFile]) -> Result<(), String> {
    if images.is_empty() {
        return Err("at least one image is required".to_string());
    }
    for image in images {
        if image.name.trim().is_empty() {
            return Err("image file names must be non-empty".to_string());
        }
        if image.data_hex.is_empty() {
            return Err(format!("image {} has no content", image.name));
        }
    }
    Ok(())
}

/// Decode and store a listing's image batch, all-or-nothing. Returns the
/// public URLs in submission order.
pub(crate) async fn store_images(
    state: &AppState,
    owner: UserId,
    folder: &str,
    images: &[ImageFile],
) -> Result<Vec<String>, AppError> {
    let mut files = Vec::with_capacity(images.len());
    for image in images {
        let bytes = hex::decode(&image.data_hex).map_err(|_| {
            AppError::Validation(format!("image {} is not valid hex", image.name))
        })?;
        files.push(UploadFile {
            name: image.name.clone(),
            bytes,
        });
    }
    let urls = upload_all(
        state.media.as_ref(),
        &state.config.media_bucket,
        folder,
        owner,
        &files,
    )
    .await?;
    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_caps() {
        let p = PaginationParams::default();
        assert_eq!(p.effective_limit(), 100);
        assert_eq!(p.effective_offset(), 0);

        let p = PaginationParams {
            limit: Some(9999),
            offset: Some(5),
        };
        assert_eq!(p.effective_limit(), 1000);
        assert_eq!(p.effective_offset(), 5);
    }

    #[test]
    fn image_batch_rejects_empty_and_nameless() {
        assert!(validate_image_batch(&[]).is_err());
        assert!(validate_image_batch(&[ImageFile {
            name: "  ".to_string(),
            data_hex: "ff".to_string()
        }])
        .is_err());
        assert!(validate_image_batch(&[ImageFile {
            name: "a.jpg".to_string(),
            data_hex: "ffd8".to_string()
        }])
        .is_ok());
    }
}
