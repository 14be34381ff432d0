use mongodb::bson::serde_helpers::serialize_bson_datetime_as_rfc3339_string;
use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::utils::serialize_object_id;

/// Stored shape of a venue review in the `resenas` collection.
/// Coordinates come from geocoding the submitted address; the bearer
/// credential and its issue/expiry instants are captured for audit.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Resena {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub nombre_establecimiento: String,
    pub direccion: String,
    pub latitud: f64,
    pub longitud: f64,
    pub valoracion: i32,
    #[serde(default)]
    pub imagenes_uri: Vec<String>,
    pub autor_email: String,
    pub autor_nombre: String,
    pub token: String,
    pub token_emision: DateTime,
    pub token_caducidad: DateTime,
    pub created_at: DateTime,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResenaResponse {
    #[serde(
        rename = "_id",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_object_id"
    )]
    pub id: Option<ObjectId>,
    pub nombre_establecimiento: String,
    pub direccion: String,
    pub latitud: f64,
    pub longitud: f64,
    pub valoracion: i32,
    pub imagenes_uri: Vec<String>,
    pub autor_email: String,
    pub autor_nombre: String,
    pub token: String,
    #[serde(serialize_with = "serialize_bson_datetime_as_rfc3339_string")]
    pub token_emision: DateTime,
    #[serde(serialize_with = "serialize_bson_datetime_as_rfc3339_string")]
    pub token_caducidad: DateTime,
    #[serde(serialize_with = "serialize_bson_datetime_as_rfc3339_string")]
    pub created_at: DateTime,
}

impl From<Resena> for ResenaResponse {
    fn from(r: Resena) -> Self {
        ResenaResponse {
            id: r.id,
            nombre_establecimiento: r.nombre_establecimiento,
            direccion: r.direccion,
            latitud: r.latitud,
            longitud: r.longitud,
            valoracion: r.valoracion,
            imagenes_uri: r.imagenes_uri,
            autor_email: r.autor_email,
            autor_nombre: r.autor_nombre,
            token: r.token,
            token_emision: r.token_emision,
            token_caducidad: r.token_caducidad,
            created_at: r.created_at,
        }
    }
}
