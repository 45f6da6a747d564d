use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::errors::AppError;
use crate::services::media;
use crate::state::AppState;

// GET /media/:file
pub async fn serve_media(
    State(state): State<Arc<AppState>>,
    Path(file): Path<String>,
) -> Result<Response, AppError> {
    let bytes = media::read_stored(&state.config.media_dir, &file)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("media {file}")))?;

    let content_type = media::content_type_for(&file);
    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}
