use axum::{
    extract::{Extension, Path, Query},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::guard::AuthUser;
use crate::error::ApiError;
use crate::extract::FormBody;
use crate::services::{has_allowed_extension, ALLOWED_IMAGE_EXTENSIONS};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub folder: Option<String>,
}

/// Generic image upload, usable for movie posters, rooms, or anything
/// else; the target folder comes from the query string.
pub async fn upload_image(
    _user: AuthUser,
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<UploadParams>,
    FormBody(mut multipart): FormBody,
) -> Result<Json<Value>, ApiError> {
    let mut image: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::validation(err.to_string()))?
    {
        if field.name() == Some("image") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|err| ApiError::validation(err.to_string()))?;
            image = Some((filename, data.to_vec()));
            break;
        }
    }

    let (filename, data) =
        image.ok_or_else(|| ApiError::validation("No se proporcionó ninguna imagen"))?;
    if filename.is_empty() {
        return Err(ApiError::validation("No se seleccionó ningún archivo"));
    }
    if !has_allowed_extension(&filename) {
        return Err(ApiError::validation(format!(
            "Tipo de archivo no permitido. Use: {}",
            ALLOWED_IMAGE_EXTENSIONS.join(", ")
        )));
    }

    let folder = params.folder.unwrap_or_else(|| "cineweb".to_string());
    let imagen = state
        .cloudinary
        .upload(data, &filename, &folder)
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "cloudinary upload failed");
            ApiError::Internal("Error al subir la imagen a Cloudinary".into())
        })?;

    Ok(Json(json!({
        "message": "Imagen subida exitosamente",
        "url": imagen.url,
        "public_id": imagen.public_id,
    })))
}

/// Deletes an image by Cloudinary public id. The path segment is a
/// wildcard because public ids contain slashes.
pub async fn delete_image(
    _user: AuthUser,
    Path(public_id): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    state.cloudinary.destroy(&public_id).await.map_err(|err| {
        tracing::error!(error = %err, public_id, "cloudinary destroy failed");
        ApiError::Internal("Error al eliminar la imagen".into())
    })?;

    Ok(Json(json!({ "message": "Imagen eliminada exitosamente" })))
}
