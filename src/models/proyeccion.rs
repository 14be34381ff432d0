use mongodb::bson::serde_helpers::serialize_bson_datetime_as_rfc3339_string;
use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::models::sala::SalaView;
use crate::utils::serialize_object_id;

/// Stored shape of a showtime in the `proyecciones` collection.
/// `nombre_sala` and `titulo_pelicula` reference Sala/Pelicula by value;
/// the joins happen at query time.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Proyeccion {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub nombre_sala: String,
    pub titulo_pelicula: String,
    pub fecha_proyeccion: DateTime,
    pub created_at: DateTime,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProyeccionResponse {
    #[serde(
        rename = "_id",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_object_id"
    )]
    pub id: Option<ObjectId>,
    pub nombre_sala: String,
    pub titulo_pelicula: String,
    #[serde(serialize_with = "serialize_bson_datetime_as_rfc3339_string")]
    pub fecha_proyeccion: DateTime,
    #[serde(serialize_with = "serialize_bson_datetime_as_rfc3339_string")]
    pub created_at: DateTime,
}

impl From<Proyeccion> for ProyeccionResponse {
    fn from(p: Proyeccion) -> Self {
        ProyeccionResponse {
            id: p.id,
            nombre_sala: p.nombre_sala,
            titulo_pelicula: p.titulo_pelicula,
            fecha_proyeccion: p.fecha_proyeccion,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProyeccionCreate {
    pub nombre_sala: Option<String>,
    pub titulo_pelicula: Option<String>,
    pub fecha_proyeccion: Option<String>,
}

/// Partial update; the date arrives as a string and is parsed and
/// re-serialized by the handler, so it is not part of the `$set`
/// document built from this struct.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProyeccionUpdate {
    pub nombre_sala: Option<String>,
    pub titulo_pelicula: Option<String>,
    #[serde(skip_serializing)]
    pub fecha_proyeccion: Option<String>,
}

/// One showtime entry in the cross-entity lookup result.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProyeccionConSala {
    #[serde(serialize_with = "serialize_bson_datetime_as_rfc3339_string")]
    pub fecha_proyeccion: DateTime,
    pub sala: SalaView,
}
