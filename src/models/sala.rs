use mongodb::bson::serde_helpers::serialize_bson_datetime_as_rfc3339_string;
use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::utils::serialize_object_id;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Coordenadas {
    pub latitud: f64,
    pub longitud: f64,
}

/// Stored shape of a screening room in the `salas` collection. `nombre`
/// is the join key Proyeccion references by value; uniqueness is by
/// convention, not enforced by the store.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Sala {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub nombre: String,
    pub email_propietario: String,
    pub direccion: String,
    pub coordenadas: Coordenadas,
    pub created_at: DateTime,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SalaResponse {
    #[serde(
        rename = "_id",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_object_id"
    )]
    pub id: Option<ObjectId>,
    pub nombre: String,
    pub email_propietario: String,
    pub direccion: String,
    pub coordenadas: Coordenadas,
    #[serde(serialize_with = "serialize_bson_datetime_as_rfc3339_string")]
    pub created_at: DateTime,
}

impl From<Sala> for SalaResponse {
    fn from(s: Sala) -> Self {
        SalaResponse {
            id: s.id,
            nombre: s.nombre,
            email_propietario: s.email_propietario,
            direccion: s.direccion,
            coordenadas: s.coordenadas,
            created_at: s.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SalaCreate {
    pub nombre: Option<String>,
    pub direccion: Option<String>,
    pub coordenadas: Option<CoordenadasInput>,
}

/// Coordinates as the client submits them; both components must be
/// present and non-zero checks are left to the caller-side map picker.
#[derive(Debug, Deserialize)]
pub struct CoordenadasInput {
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SalaUpdate {
    pub nombre: Option<String>,
    pub email_propietario: Option<String>,
    pub direccion: Option<String>,
}

/// View of a room embedded in the movie lookup. When the referenced
/// room no longer exists this degrades to a placeholder carrying only
/// the name stored on the showtime.
#[derive(Debug, Serialize, Deserialize)]
pub struct SalaView {
    pub nombre: String,
    pub direccion: String,
    pub email_propietario: String,
    pub coordenadas: Option<Coordenadas>,
}

impl SalaView {
    pub fn placeholder(nombre: &str) -> Self {
        SalaView {
            nombre: nombre.to_string(),
            direccion: String::new(),
            email_propietario: String::new(),
            coordenadas: None,
        }
    }
}

impl From<Sala> for SalaView {
    fn from(s: Sala) -> Self {
        SalaView {
            nombre: s.nombre,
            direccion: s.direccion,
            email_propietario: s.email_propietario,
            coordenadas: Some(s.coordenadas),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_keeps_name_and_empties_the_rest() {
        let view = SalaView::placeholder("Sala 1");
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["nombre"], "Sala 1");
        assert_eq!(json["direccion"], "");
        assert_eq!(json["email_propietario"], "");
        assert!(json["coordenadas"].is_null());
    }

    #[test]
    fn view_from_sala_carries_coordinates() {
        let sala = Sala {
            id: Some(ObjectId::new()),
            nombre: "Sala 1".into(),
            email_propietario: "dueño@cine.es".into(),
            direccion: "Gran Vía 1, Madrid".into(),
            coordenadas: Coordenadas {
                latitud: 40.42,
                longitud: -3.70,
            },
            created_at: DateTime::now(),
        };
        let view = SalaView::from(sala);
        assert_eq!(view.coordenadas.unwrap().latitud, 40.42);
    }
}
