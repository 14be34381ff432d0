use mongodb::Database;

use crate::config::Config;
use crate::services::{cloudinary::Cloudinary, geocoding::Geocoder};

/// Process-wide shared state, built once in `main` and handed to every
/// handler through `Extension(Arc<AppState>)`. The Mongo handle is the
/// driver's pooled client; the adapters share one HTTP client.
pub struct AppState {
    pub db: Database,
    pub config: Config,
    pub http: reqwest::Client,
    pub geocoder: Geocoder,
    pub cloudinary: Cloudinary,
}
