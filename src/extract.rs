use axum::extract::{FromRequest, Multipart, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// JSON body extractor that keeps the API's error contract: a malformed
/// or mistyped body answers 400 with `{"error": ...}` instead of axum's
/// plain-text default rejection.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(ApiError::validation(rejection.body_text())),
        }
    }
}

/// Multipart extractor with the same rejection mapping as [`JsonBody`].
pub struct FormBody(pub Multipart);

impl<S> FromRequest<S> for FormBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Multipart::from_request(req, state).await {
            Ok(multipart) => Ok(FormBody(multipart)),
            Err(rejection) => Err(ApiError::validation(rejection.body_text())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::routing::{post, put};
    use axum::Router;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct Payload {
        titulo: Option<String>,
    }

    async fn json_handler(JsonBody(payload): JsonBody<Payload>) -> String {
        payload.titulo.unwrap_or_default()
    }

    async fn form_handler(FormBody(_multipart): FormBody) -> &'static str {
        "ok"
    }

    async fn error_body(response: axum::response::Response) -> serde_json::Value {
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("application/json"), "{content_type}");
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn malformed_json_body_answers_json_error() {
        let app = Router::new().route("/peliculas", put(json_handler));
        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/peliculas")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = error_body(response).await;
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn mistyped_json_field_answers_400_not_422() {
        let app = Router::new().route("/peliculas", put(json_handler));
        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/peliculas")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"titulo": 5}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = error_body(response).await;
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn missing_json_content_type_answers_json_error() {
        let app = Router::new().route("/peliculas", put(json_handler));
        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/peliculas")
                    .body(Body::from(r#"{"titulo":"Dune"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = error_body(response).await;
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn malformed_multipart_body_answers_json_error() {
        let app = Router::new().route("/resenas", post(form_handler));
        // multipart content type without a boundary is unreadable
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/resenas")
                    .header(header::CONTENT_TYPE, "multipart/form-data")
                    .body(Body::from("valoracion=3"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = error_body(response).await;
        assert!(body["error"].is_string());
    }
}
