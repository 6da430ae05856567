//! Image route handlers.
//!
//! Proxies the catalog service's base64 image lookup through a bounded
//! in-memory cache so pages can embed assets without hammering the
//! service. Clients show a placeholder while the fetch is pending.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Image lookup response: a base64 data URL.
#[derive(Debug, Serialize)]
pub struct ImageView {
    pub image: String,
}

/// Look up an image by filename.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<ImageView>> {
    // Filenames are plain asset names, never paths
    if filename.is_empty()
        || !filename
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
    {
        return Err(AppError::BadRequest("Invalid image filename".into()));
    }

    let image = state.catalog().get_image_base64(&filename).await?;
    Ok(Json(ImageView { image }))
}
