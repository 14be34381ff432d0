use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Json,
};
use futures::TryStreamExt;
use mongodb::bson::{doc, DateTime};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::guard::AuthUser;
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::models::sala::{Coordenadas, Sala, SalaCreate, SalaResponse, SalaUpdate};
use crate::state::AppState;
use crate::utils::{parse_object_id, update_document};

pub async fn get_salas(
    _user: AuthUser,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<SalaResponse>>, ApiError> {
    let collection = state.db.collection::<Sala>("salas");

    let mut cursor = collection.find(doc! {}, None).await?;
    let mut result = Vec::new();
    while let Some(sala) = cursor.try_next().await? {
        result.push(sala.into());
    }

    Ok(Json(result))
}

pub async fn get_sala(
    _user: AuthUser,
    Path(id): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<SalaResponse>, ApiError> {
    let collection = state.db.collection::<Sala>("salas");
    let sala_id = parse_object_id(&id)?;

    let sala = collection
        .find_one(doc! {"_id": sala_id}, None)
        .await?
        .ok_or_else(|| ApiError::not_found("Sala no encontrada"))?;

    Ok(Json(sala.into()))
}

/// Creates a room. Coordinates are supplied by the caller (picked on a
/// map client-side), never geocoded here; the owner is always the
/// authenticated caller.
pub async fn create_sala(
    user: AuthUser,
    Extension(state): Extension<Arc<AppState>>,
    JsonBody(body): JsonBody<SalaCreate>,
) -> Result<(StatusCode, Json<SalaResponse>), ApiError> {
    let nombre = body
        .nombre
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::validation("El nombre es requerido"))?;
    let direccion = body
        .direccion
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ApiError::validation("La dirección es requerida"))?;
    let coordenadas = body
        .coordenadas
        .ok_or_else(|| ApiError::validation("Las coordenadas son requeridas"))?;
    let coordenadas = match (coordenadas.latitud, coordenadas.longitud) {
        (Some(latitud), Some(longitud)) => Coordenadas { latitud, longitud },
        _ => return Err(ApiError::validation("Coordenadas incompletas")),
    };

    let mut sala = Sala {
        id: None,
        nombre,
        email_propietario: user.claims.email,
        direccion,
        coordenadas,
        created_at: DateTime::now(),
    };

    let collection = state.db.collection::<Sala>("salas");
    let insert_result = collection.insert_one(&sala, None).await?;
    sala.id = insert_result.inserted_id.as_object_id();

    Ok((StatusCode::CREATED, Json(sala.into())))
}

pub async fn update_sala(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<SalaUpdate>,
) -> Result<Json<SalaResponse>, ApiError> {
    let collection = state.db.collection::<Sala>("salas");
    let sala_id = parse_object_id(&id)?;

    let update_doc = update_document(&update);
    if update_doc.is_empty() {
        return Err(ApiError::validation("No hay datos para actualizar"));
    }

    let update_result = collection
        .update_one(doc! {"_id": sala_id}, doc! {"$set": update_doc}, None)
        .await?;
    if update_result.matched_count == 0 {
        return Err(ApiError::not_found("Sala no encontrada"));
    }

    let sala = collection
        .find_one(doc! {"_id": sala_id}, None)
        .await?
        .ok_or_else(|| ApiError::not_found("Sala no encontrada"))?;

    Ok(Json(sala.into()))
}

/// Deletes a room. Showtimes referencing its name are left untouched;
/// the lookup degrades them to placeholder views.
pub async fn delete_sala(
    Path(id): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let collection = state.db.collection::<Sala>("salas");
    let sala_id = parse_object_id(&id)?;

    let delete_result = collection.delete_one(doc! {"_id": sala_id}, None).await?;
    if delete_result.deleted_count == 0 {
        return Err(ApiError::not_found("Sala no encontrada"));
    }

    Ok(Json(json!({ "message": "Sala eliminada correctamente" })))
}
