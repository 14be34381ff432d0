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
use crate::models::pelicula::{
    Pelicula, PeliculaConProyecciones, PeliculaCreate, PeliculaResponse, PeliculaUpdate,
};
use crate::models::proyeccion::{Proyeccion, ProyeccionConSala};
use crate::models::sala::{Sala, SalaView};
use crate::state::AppState;
use crate::utils::{ci_exact, parse_object_id, update_document};

pub async fn get_peliculas(
    _user: AuthUser,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<PeliculaResponse>>, ApiError> {
    let collection = state.db.collection::<Pelicula>("peliculas");

    let mut cursor = collection.find(doc! {}, None).await?;
    let mut result = Vec::new();
    while let Some(pelicula) = cursor.try_next().await? {
        result.push(pelicula.into());
    }

    Ok(Json(result))
}

pub async fn get_pelicula(
    _user: AuthUser,
    Path(id): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<PeliculaResponse>, ApiError> {
    let collection = state.db.collection::<Pelicula>("peliculas");
    let pelicula_id = parse_object_id(&id)?;

    let pelicula = collection
        .find_one(doc! {"_id": pelicula_id}, None)
        .await?
        .ok_or_else(|| ApiError::not_found("Película no encontrada"))?;

    Ok(Json(pelicula.into()))
}

pub async fn create_pelicula(
    _user: AuthUser,
    Extension(state): Extension<Arc<AppState>>,
    JsonBody(body): JsonBody<PeliculaCreate>,
) -> Result<(StatusCode, Json<PeliculaResponse>), ApiError> {
    let titulo = body
        .titulo
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::validation("Título es requerido"))?;

    let mut pelicula = Pelicula {
        id: None,
        titulo,
        imagen_uri: body.imagen_uri.unwrap_or_default(),
        created_at: DateTime::now(),
    };

    let collection = state.db.collection::<Pelicula>("peliculas");
    let insert_result = collection.insert_one(&pelicula, None).await?;
    pelicula.id = insert_result.inserted_id.as_object_id();

    Ok((StatusCode::CREATED, Json(pelicula.into())))
}

pub async fn update_pelicula(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<PeliculaUpdate>,
) -> Result<Json<PeliculaResponse>, ApiError> {
    let collection = state.db.collection::<Pelicula>("peliculas");
    let pelicula_id = parse_object_id(&id)?;

    let update_doc = update_document(&update);
    if update_doc.is_empty() {
        return Err(ApiError::validation("No hay datos para actualizar"));
    }

    let update_result = collection
        .update_one(doc! {"_id": pelicula_id}, doc! {"$set": update_doc}, None)
        .await?;
    if update_result.matched_count == 0 {
        return Err(ApiError::not_found("Película no encontrada"));
    }

    let pelicula = collection
        .find_one(doc! {"_id": pelicula_id}, None)
        .await?
        .ok_or_else(|| ApiError::not_found("Película no encontrada"))?;

    Ok(Json(pelicula.into()))
}

pub async fn delete_pelicula(
    Path(id): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let collection = state.db.collection::<Pelicula>("peliculas");
    let pelicula_id = parse_object_id(&id)?;

    let delete_result = collection.delete_one(doc! {"_id": pelicula_id}, None).await?;
    if delete_result.deleted_count == 0 {
        return Err(ApiError::not_found("Película no encontrada"));
    }

    Ok(Json(json!({ "message": "Película eliminada exitosamente" })))
}

/// Cross-entity lookup: resolves a movie by anchored case-insensitive
/// title match, then joins its showtimes to their rooms by name. A
/// showtime whose room no longer exists gets a placeholder view instead
/// of failing the whole read.
pub async fn buscar_pelicula(
    _user: AuthUser,
    Path(titulo): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<PeliculaConProyecciones>, ApiError> {
    let peliculas = state.db.collection::<Pelicula>("peliculas");
    let pelicula = peliculas
        .find_one(doc! {"titulo": ci_exact(&titulo)}, None)
        .await?
        .ok_or_else(|| ApiError::not_found("Película no encontrada"))?;

    let proyecciones_collection = state.db.collection::<Proyeccion>("proyecciones");
    let mut cursor = proyecciones_collection
        .find(doc! {"titulo_pelicula": ci_exact(&titulo)}, None)
        .await?;

    let salas = state.db.collection::<Sala>("salas");
    let mut proyecciones = Vec::new();
    while let Some(proyeccion) = cursor.try_next().await? {
        let sala = salas
            .find_one(doc! {"nombre": ci_exact(&proyeccion.nombre_sala)}, None)
            .await?
            .map(SalaView::from)
            .unwrap_or_else(|| SalaView::placeholder(&proyeccion.nombre_sala));

        proyecciones.push(ProyeccionConSala {
            fecha_proyeccion: proyeccion.fecha_proyeccion,
            sala,
        });
    }

    Ok(Json(PeliculaConProyecciones {
        pelicula: pelicula.into(),
        proyecciones,
    }))
}
