use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::CloudinaryConfig;

#[derive(Debug, Error)]
pub enum CloudinaryError {
    #[error("cloudinary request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("cloudinary rejected the operation")]
    Rejected,
}

/// A stored image: the serving URL plus the id needed to delete it later.
#[derive(Debug, Deserialize)]
pub struct UploadedImage {
    #[serde(rename = "secure_url")]
    pub url: String,
    pub public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

/// Media adapter over Cloudinary's upload API. Requests are signed with
/// the account secret (SHA-256 over the sorted parameter string).
#[derive(Clone)]
pub struct Cloudinary {
    http: reqwest::Client,
    config: CloudinaryConfig,
}

impl Cloudinary {
    pub fn new(http: reqwest::Client, config: CloudinaryConfig) -> Self {
        Cloudinary { http, config }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/{}",
            self.config.cloud_name, action
        )
    }

    pub async fn upload(
        &self,
        data: Vec<u8>,
        filename: &str,
        folder: &str,
    ) -> Result<UploadedImage, CloudinaryError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(
            &[("folder", folder), ("timestamp", &timestamp)],
            &self.config.api_secret,
        );

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(data).file_name(filename.to_string()),
            )
            .text("folder", folder.to_string())
            .text("timestamp", timestamp)
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature);

        let response = self
            .http
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CloudinaryError::Rejected);
        }
        Ok(response.json().await?)
    }

    pub async fn destroy(&self, public_id: &str) -> Result<(), CloudinaryError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(
            &[("public_id", public_id), ("timestamp", &timestamp)],
            &self.config.api_secret,
        );

        let response = self
            .http
            .post(self.endpoint("destroy"))
            .form(&[
                ("public_id", public_id),
                ("timestamp", &timestamp),
                ("api_key", &self.config.api_key),
                ("signature", &signature),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CloudinaryError::Rejected);
        }
        let destroyed: DestroyResponse = response.json().await?;
        if destroyed.result == "ok" {
            Ok(())
        } else {
            Err(CloudinaryError::Rejected)
        }
    }
}

/// Cloudinary request signature: the parameters, sorted by name and
/// joined `k=v&...`, concatenated with the secret and hashed.
fn sign(params: &[(&str, &str)], secret: &str) -> String {
    let mut sorted: Vec<_> = params.to_vec();
    sorted.sort_by_key(|(k, _)| *k);
    let payload = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hasher.update(secret.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
