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
use crate::models::proyeccion::{
    Proyeccion, ProyeccionCreate, ProyeccionResponse, ProyeccionUpdate,
};
use crate::state::AppState;
use crate::utils::{parse_iso_datetime, parse_object_id, update_document};

pub async fn get_proyecciones(
    _user: AuthUser,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<ProyeccionResponse>>, ApiError> {
    let collection = state.db.collection::<Proyeccion>("proyecciones");

    let mut cursor = collection.find(doc! {}, None).await?;
    let mut result = Vec::new();
    while let Some(proyeccion) = cursor.try_next().await? {
        result.push(proyeccion.into());
    }

    Ok(Json(result))
}

pub async fn get_proyeccion(
    _user: AuthUser,
    Path(id): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<ProyeccionResponse>, ApiError> {
    let collection = state.db.collection::<Proyeccion>("proyecciones");
    let proyeccion_id = parse_object_id(&id)?;

    let proyeccion = collection
        .find_one(doc! {"_id": proyeccion_id}, None)
        .await?
        .ok_or_else(|| ApiError::not_found("Proyección no encontrada"))?;

    Ok(Json(proyeccion.into()))
}

pub async fn create_proyeccion(
    _user: AuthUser,
    Extension(state): Extension<Arc<AppState>>,
    JsonBody(body): JsonBody<ProyeccionCreate>,
) -> Result<(StatusCode, Json<ProyeccionResponse>), ApiError> {
    let nombre_sala = body
        .nombre_sala
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::validation("El nombre de la sala es requerido"))?;
    let titulo_pelicula = body
        .titulo_pelicula
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::validation("El título de la película es requerido"))?;
    let fecha_raw = body
        .fecha_proyeccion
        .filter(|f| !f.is_empty())
        .ok_or_else(|| ApiError::validation("La fecha de proyección es requerida"))?;

    let fecha_proyeccion = parse_iso_datetime(&fecha_raw).ok_or_else(|| {
        ApiError::validation("Formato de fecha inválido. Use ISO 8601 (ej: 2025-12-09T19:00:00)")
    })?;

    let mut proyeccion = Proyeccion {
        id: None,
        nombre_sala,
        titulo_pelicula,
        fecha_proyeccion: DateTime::from_millis(fecha_proyeccion.timestamp_millis()),
        created_at: DateTime::now(),
    };

    let collection = state.db.collection::<Proyeccion>("proyecciones");
    let insert_result = collection.insert_one(&proyeccion, None).await?;
    proyeccion.id = insert_result.inserted_id.as_object_id();

    Ok((StatusCode::CREATED, Json(proyeccion.into())))
}

pub async fn update_proyeccion(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<ProyeccionUpdate>,
) -> Result<Json<ProyeccionResponse>, ApiError> {
    let collection = state.db.collection::<Proyeccion>("proyecciones");
    let proyeccion_id = parse_object_id(&id)?;

    let mut update_doc = update_document(&update);
    if let Some(fecha_raw) = &update.fecha_proyeccion {
        let fecha = parse_iso_datetime(fecha_raw)
            .ok_or_else(|| ApiError::validation("Formato de fecha inválido"))?;
        update_doc.insert(
            "fecha_proyeccion",
            DateTime::from_millis(fecha.timestamp_millis()),
        );
    }
    if update_doc.is_empty() {
        return Err(ApiError::validation("No hay datos para actualizar"));
    }

    let update_result = collection
        .update_one(doc! {"_id": proyeccion_id}, doc! {"$set": update_doc}, None)
        .await?;
    if update_result.matched_count == 0 {
        return Err(ApiError::not_found("Proyección no encontrada"));
    }

    let proyeccion = collection
        .find_one(doc! {"_id": proyeccion_id}, None)
        .await?
        .ok_or_else(|| ApiError::not_found("Proyección no encontrada"))?;

    Ok(Json(proyeccion.into()))
}

pub async fn delete_proyeccion(
    Path(id): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let collection = state.db.collection::<Proyeccion>("proyecciones");
    let proyeccion_id = parse_object_id(&id)?;

    let delete_result = collection
        .delete_one(doc! {"_id": proyeccion_id}, None)
        .await?;
    if delete_result.deleted_count == 0 {
        return Err(ApiError::not_found("Proyección no encontrada"));
    }

    Ok(Json(json!({ "message": "Proyección eliminada correctamente" })))
}

/// Filtered list by room name; equality here is exact, unlike the
/// lookup join.
pub async fn get_proyecciones_por_sala(
    Path(nombre_sala): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<ProyeccionResponse>>, ApiError> {
    let collection = state.db.collection::<Proyeccion>("proyecciones");

    let mut cursor = collection
        .find(doc! {"nombre_sala": &nombre_sala}, None)
        .await?;
    let mut result = Vec::new();
    while let Some(proyeccion) = cursor.try_next().await? {
        result.push(proyeccion.into());
    }

    Ok(Json(result))
}

pub async fn get_proyecciones_por_pelicula(
    Path(titulo_pelicula): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<ProyeccionResponse>>, ApiError> {
    let collection = state.db.collection::<Proyeccion>("proyecciones");

    let mut cursor = collection
        .find(doc! {"titulo_pelicula": &titulo_pelicula}, None)
        .await?;
    let mut result = Vec::new();
    while let Some(proyeccion) = cursor.try_next().await? {
        result.push(proyeccion.into());
    }

    Ok(Json(result))
}
