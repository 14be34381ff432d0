use mongodb::bson::serde_helpers::serialize_bson_datetime_as_rfc3339_string;
use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::models::proyeccion::ProyeccionConSala;
use crate::utils::serialize_object_id;

/// Stored shape of a movie in the `peliculas` collection.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Pelicula {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub titulo: String,
    #[serde(default)]
    pub imagen_uri: String,
    pub created_at: DateTime,
}

/// Wire shape: id as hex string, timestamp as RFC 3339.
#[derive(Debug, Serialize, Deserialize)]
pub struct PeliculaResponse {
    #[serde(
        rename = "_id",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_object_id"
    )]
    pub id: Option<ObjectId>,
    pub titulo: String,
    pub imagen_uri: String,
    #[serde(serialize_with = "serialize_bson_datetime_as_rfc3339_string")]
    pub created_at: DateTime,
}

impl From<Pelicula> for PeliculaResponse {
    fn from(p: Pelicula) -> Self {
        PeliculaResponse {
            id: p.id,
            titulo: p.titulo,
            imagen_uri: p.imagen_uri,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PeliculaCreate {
    pub titulo: Option<String>,
    pub imagen_uri: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PeliculaUpdate {
    pub titulo: Option<String>,
    pub imagen_uri: Option<String>,
}

/// Result of the title lookup: the movie plus its showtimes, each with
/// the hosting room resolved (or degraded to a placeholder).
#[derive(Debug, Serialize, Deserialize)]
pub struct PeliculaConProyecciones {
    pub pelicula: PeliculaResponse,
    pub proyecciones: Vec<ProyeccionConSala>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_serializes_id_and_timestamp_as_strings() {
        let response = PeliculaResponse {
            id: Some(ObjectId::parse_str("65f0123456789abcdef01234").unwrap()),
            titulo: "Dune".into(),
            imagen_uri: String::new(),
            created_at: DateTime::from_millis(1_700_000_000_000),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["_id"], "65f0123456789abcdef01234");
        assert_eq!(json["titulo"], "Dune");
        assert_eq!(json["imagen_uri"], "");
        assert!(json["created_at"].as_str().unwrap().starts_with("2023-11-14T"));
    }
}
