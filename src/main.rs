use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post, put},
    Extension, Router,
};
use mongodb::{bson::doc, options::ClientOptions, Client};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

mod auth;
mod config;
mod controllers;
mod error;
mod extract;
pub mod models;
mod services;
mod state;
mod utils;

use config::Config;
use controllers::{
    auth_controller, pelicula_controller::*, proyeccion_controller::*, resena_controller,
    sala_controller::*, upload_controller,
};
use services::{cloudinary::Cloudinary, geocoding::Geocoder};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cineweb_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let client_options = ClientOptions::parse(&config.mongodb_uri)
        .await
        .context("failed to parse MONGODB_URI")?;
    let client =
        Client::with_options(client_options).context("failed to initialize MongoDB client")?;

    // Ping the server to see if you can connect to the cluster
    client
        .database("cineweb")
        .run_command(doc! {"ping": 1}, None)
        .await
        .context("MongoDB ping failed")?;
    tracing::info!("connected to MongoDB");

    let http = reqwest::Client::new();
    let state = Arc::new(AppState {
        db: client.database("cineweb"),
        geocoder: Geocoder::new(http.clone()),
        cloudinary: Cloudinary::new(http.clone(), config.cloudinary.clone()),
        http,
        config,
    });

    let cors = match &state.config.app_url {
        Some(url) => CorsLayer::new().allow_origin(
            url.parse::<HeaderValue>()
                .context("APP_URL is not a valid origin")?,
        ),
        None => CorsLayer::new().allow_origin(Any),
    }
    .allow_methods([
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ])
    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let app = Router::new()
        .route("/api/auth/google", post(auth_controller::google_login))
        .route("/api/auth/verify", get(auth_controller::verify))
        .route("/api/peliculas", get(get_peliculas))
        .route("/api/peliculas", post(create_pelicula))
        .route("/api/peliculas/{id}", get(get_pelicula))
        .route("/api/peliculas/{id}", put(update_pelicula))
        .route("/api/peliculas/{id}", delete(delete_pelicula))
        .route("/api/peliculas/buscar/{titulo}", get(buscar_pelicula))
        .route("/api/salas", get(get_salas))
        .route("/api/salas", post(create_sala))
        .route("/api/salas/{id}", get(get_sala))
        .route("/api/salas/{id}", put(update_sala))
        .route("/api/salas/{id}", delete(delete_sala))
        .route("/api/proyecciones", get(get_proyecciones))
        .route("/api/proyecciones", post(create_proyeccion))
        .route("/api/proyecciones/{id}", get(get_proyeccion))
        .route("/api/proyecciones/{id}", put(update_proyeccion))
        .route("/api/proyecciones/{id}", delete(delete_proyeccion))
        .route(
            "/api/proyecciones/sala/{nombre_sala}",
            get(get_proyecciones_por_sala),
        )
        .route(
            "/api/proyecciones/pelicula/{titulo_pelicula}",
            get(get_proyecciones_por_pelicula),
        )
        .route("/api/resenas", get(resena_controller::get_resenas))
        .route("/api/resenas", post(resena_controller::create_resena))
        .route("/api/resenas/{id}", get(resena_controller::get_resena))
        .route("/api/resenas/{id}", delete(resena_controller::delete_resena))
        .route("/api/resenas/geocode", post(resena_controller::geocode))
        .route("/api/upload/image", post(upload_controller::upload_image))
        .route(
            "/api/upload/image/{*public_id}",
            delete(upload_controller::delete_image),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(Extension(state.clone()));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", state.config.port))
        .await
        .context("failed to bind listener")?;
    tracing::info!(port = state.config.port, "listening");
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
