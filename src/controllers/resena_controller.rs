use axum::{
    extract::{Extension, Multipart, Path},
    http::StatusCode,
    response::Json,
};
use futures::TryStreamExt;
use mongodb::bson::{doc, DateTime};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::guard::AuthUser;
use crate::error::ApiError;
use crate::extract::{FormBody, JsonBody};
use crate::models::resena::{Resena, ResenaResponse};
use crate::models::sala::Coordenadas;
use crate::services::has_allowed_extension;
use crate::state::AppState;
use crate::utils::parse_object_id;

pub async fn get_resenas(
    _user: AuthUser,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<ResenaResponse>>, ApiError> {
    let collection = state.db.collection::<Resena>("resenas");

    let mut cursor = collection.find(doc! {}, None).await?;
    let mut result = Vec::new();
    while let Some(resena) = cursor.try_next().await? {
        result.push(resena.into());
    }

    Ok(Json(result))
}

pub async fn get_resena(
    _user: AuthUser,
    Path(id): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<ResenaResponse>, ApiError> {
    let collection = state.db.collection::<Resena>("resenas");
    let resena_id = parse_object_id(&id)?;

    let resena = collection
        .find_one(doc! {"_id": resena_id}, None)
        .await?
        .ok_or_else(|| ApiError::not_found("Reseña no encontrada"))?;

    Ok(Json(resena.into()))
}

/// Fields decoded out of the multipart creation form before validation.
#[derive(Default)]
struct ResenaForm {
    nombre_establecimiento: Option<String>,
    direccion: Option<String>,
    valoracion: Option<String>,
    imagenes_urls: Vec<String>,
    archivos: Vec<(String, Vec<u8>)>,
}

async fn read_form(multipart: &mut Multipart) -> Result<ResenaForm, ApiError> {
    let mut form = ResenaForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::validation(err.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "nombre_establecimiento" => {
                form.nombre_establecimiento = Some(
                    field
                        .text()
                        .await
                        .map_err(|err| ApiError::validation(err.to_string()))?,
                );
            }
            "direccion" => {
                form.direccion = Some(
                    field
                        .text()
                        .await
                        .map_err(|err| ApiError::validation(err.to_string()))?,
                );
            }
            "valoracion" => {
                form.valoracion = Some(
                    field
                        .text()
                        .await
                        .map_err(|err| ApiError::validation(err.to_string()))?,
                );
            }
            "imagenes_urls[]" => {
                form.imagenes_urls.push(
                    field
                        .text()
                        .await
                        .map_err(|err| ApiError::validation(err.to_string()))?,
                );
            }
            "imagenes" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                if !filename.is_empty() {
                    let data = field
                        .bytes()
                        .await
                        .map_err(|err| ApiError::validation(err.to_string()))?;
                    form.archivos.push((filename, data.to_vec()));
                }
            }
            _ => {}
        }
    }
    Ok(form)
}

fn parse_valoracion(raw: &str) -> Result<i32, ApiError> {
    let valoracion: i32 = raw
        .trim()
        .parse()
        .map_err(|_| ApiError::validation("Valoración debe ser un número entero"))?;
    if !(1..=5).contains(&valoracion) {
        return Err(ApiError::validation(
            "Valoración debe estar entre 1 y 5 estrellas",
        ));
    }
    Ok(valoracion)
}

/// Creates a review from a multipart form. Order matters: the document
/// is only written after validation, geocoding, and image handling have
/// all succeeded — a failed geocode never leaves a partial review.
pub async fn create_resena(
    user: AuthUser,
    Extension(state): Extension<Arc<AppState>>,
    FormBody(mut multipart): FormBody,
) -> Result<(StatusCode, Json<ResenaResponse>), ApiError> {
    let form = read_form(&mut multipart).await?;

    let (nombre_establecimiento, direccion, valoracion_raw) = match (
        form.nombre_establecimiento.filter(|v| !v.is_empty()),
        form.direccion.filter(|v| !v.is_empty()),
        form.valoracion.filter(|v| !v.is_empty()),
    ) {
        (Some(n), Some(d), Some(v)) => (n, d, v),
        _ => {
            return Err(ApiError::validation(
                "Nombre, dirección y valoración son requeridos",
            ))
        }
    };
    let valoracion = parse_valoracion(&valoracion_raw)?;

    let coords = state.geocoder.geocode(&direccion).await.map_err(|err| {
        tracing::warn!(error = %err, "geocoding failed");
        ApiError::validation("No se pudo geocodificar la dirección proporcionada")
    })?;

    // Pre-uploaded URLs first, then any raw files that pass the
    // extension allow-list; disallowed or failed files are skipped.
    let mut imagenes_uri = form.imagenes_urls;
    for (filename, data) in form.archivos {
        if !has_allowed_extension(&filename) {
            continue;
        }
        match state.cloudinary.upload(data, &filename, "reviews").await {
            Ok(imagen) => imagenes_uri.push(imagen.url),
            Err(err) => tracing::warn!(error = %err, filename, "image upload failed"),
        }
    }

    let mut resena = Resena {
        id: None,
        nombre_establecimiento,
        direccion,
        latitud: coords.latitud,
        longitud: coords.longitud,
        valoracion,
        imagenes_uri,
        autor_email: user.claims.email,
        autor_nombre: user.claims.name,
        token: user.token,
        token_emision: DateTime::from_millis(user.claims.iat * 1000),
        token_caducidad: DateTime::from_millis(user.claims.exp * 1000),
        created_at: DateTime::now(),
    };

    let collection = state.db.collection::<Resena>("resenas");
    let insert_result = collection.insert_one(&resena, None).await?;
    resena.id = insert_result.inserted_id.as_object_id();

    Ok((StatusCode::CREATED, Json(resena.into())))
}

/// Deletes a review. Any authenticated user may delete any review.
pub async fn delete_resena(
    _user: AuthUser,
    Path(id): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let collection = state.db.collection::<Resena>("resenas");
    let resena_id = parse_object_id(&id)?;

    collection
        .find_one(doc! {"_id": resena_id}, None)
        .await?
        .ok_or_else(|| ApiError::not_found("Reseña no encontrada"))?;

    let delete_result = collection.delete_one(doc! {"_id": resena_id}, None).await?;
    if delete_result.deleted_count == 0 {
        return Err(ApiError::Internal("No se pudo eliminar la reseña".into()));
    }

    Ok(Json(json!({ "message": "Reseña eliminada exitosamente" })))
}

#[derive(Debug, Deserialize)]
pub struct GeocodeRequest {
    pub direccion: Option<String>,
}

/// Standalone geocoding passthrough for the frontend's address picker.
pub async fn geocode(
    _user: AuthUser,
    Extension(state): Extension<Arc<AppState>>,
    JsonBody(body): JsonBody<GeocodeRequest>,
) -> Result<Json<Coordenadas>, ApiError> {
    let direccion = body
        .direccion
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ApiError::validation("Dirección es requerida"))?;

    let coords = state
        .geocoder
        .geocode(&direccion)
        .await
        .map_err(|_| ApiError::not_found("No se pudo geocodificar la dirección"))?;

    Ok(Json(coords))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_boundaries_are_inclusive() {
        assert_eq!(parse_valoracion("1").unwrap(), 1);
        assert_eq!(parse_valoracion("5").unwrap(), 5);
    }

    #[test]
    fn out_of_range_rating_is_rejected() {
        for raw in ["0", "6", "7", "-1"] {
            let err = parse_valoracion(raw).unwrap_err();
            assert_eq!(
                err.to_string(),
                "Valoración debe estar entre 1 y 5 estrellas"
            );
        }
    }

    #[test]
    fn non_integer_rating_is_rejected() {
        for raw in ["cinco", "4.5", ""] {
            let err = parse_valoracion(raw).unwrap_err();
            assert_eq!(err.to_string(), "Valoración debe ser un número entero");
        }
    }
}
