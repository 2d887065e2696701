use actix_web::{web, HttpResponse};
use interchange::photo::mime_for_url;
use shared_types::ErrorResponse;
use std::sync::Arc;

use crate::error::ApiError;
use crate::storage::LocalBlobStore;

/// Serves a stored photo by its blob key
pub async fn get_photo(
    store: web::Data<Arc<LocalBlobStore>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let key = path.into_inner();

    let bytes = store
        .read(&key)
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    match bytes {
        Some(bytes) => Ok(HttpResponse::Ok()
            .content_type(mime_for_url(&key))
            .insert_header(("Cache-Control", "public, max-age=3600"))
            .body(bytes)),
        None => Ok(HttpResponse::NotFound().json(ErrorResponse::new("Photo not found"))),
    }
}
