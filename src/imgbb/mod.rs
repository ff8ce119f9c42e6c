//! imgbb image hosting
//!
//! Uploads local preview images so Discord can display them as embed
//! thumbnails. Images expire after `expiration_secs`.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{error, info};

use crate::traits::ImageUploader;

pub const UPLOAD_URL: &str = "https://api.imgbb.com/1/upload";

/// 48 hours
pub const DEFAULT_EXPIRATION_SECS: u64 = 172_800;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    data: Option<UploadData>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    url: Option<String>,
}

pub struct ImgbbUploader {
    client: Client,
    api_key: String,
    upload_url: String,
    expiration_secs: u64,
}

impl ImgbbUploader {
    pub fn new(client: Client, api_key: impl Into<String>, expiration_secs: u64) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            upload_url: UPLOAD_URL.to_string(),
            expiration_secs,
        }
    }

    /// Point the uploader at a local server
    #[cfg(test)]
    pub fn with_upload_url(mut self, upload_url: impl Into<String>) -> Self {
        self.upload_url = upload_url.into();
        self
    }

    async fn try_upload(&self, path: &Path, name: &str) -> Result<String> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read image {}", path.display()))?;

        let file_name = path
            .file_name()
            .map_or_else(|| name.to_string(), |f| f.to_string_lossy().into_owned());

        let form = Form::new()
            .text("expiration", self.expiration_secs.to_string())
            .text("key", self.api_key.clone())
            .text("name", name.to_string())
            .part("image", Part::bytes(bytes).file_name(file_name));

        info!("Sending POST request to {}", self.upload_url);
        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await?;
        info!("API response: {}", response.status());

        if !response.status().is_success() {
            return Err(anyhow!("Image upload rejected: {}", response.status()));
        }

        let body: UploadResponse = response.json().await?;
        body.data
            .and_then(|data| data.url)
            .ok_or_else(|| anyhow!("Upload response did not contain an image URL"))
    }
}

#[async_trait]
impl ImageUploader for ImgbbUploader {
    async fn upload(&self, path: &Path, name: &str) -> Option<String> {
        match self.try_upload(path, name).await {
            Ok(url) => Some(url),
            Err(e) => {
                error!("Failed to upload {} to imgbb: {:#}", path.display(), e);
                None
            }
        }
    }
}
