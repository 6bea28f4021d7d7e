use std::path::PathBuf;

use chrono::Utc;
use serde_json::json;
use tracing::info;

use super::http::{ensure_success, join_endpoint, request_error};
use super::{ImageGenerator, ServiceError, ServiceFuture};

const SERVICE: &str = "image_generation";

/// Posts the prompt to `<endpoint>/generate` and stores the returned image
/// bytes under the output directory.
#[derive(Clone)]
pub struct RemoteImageGenerator {
    client: reqwest::Client,
    endpoint: Option<String>,
    output_dir: PathBuf,
}

impl RemoteImageGenerator {
    pub fn new(client: reqwest::Client, endpoint: Option<String>, output_dir: PathBuf) -> Self {
        Self {
            client,
            endpoint,
            output_dir,
        }
    }

    async fn generate_once(&self, prompt: &str) -> Result<Vec<PathBuf>, ServiceError> {
        let base = self
            .endpoint
            .as_deref()
            .ok_or(ServiceError::NotConfigured("image generation endpoint"))?;
        let url = join_endpoint(base, "generate");

        info!(service = SERVICE, prompt_chars = prompt.chars().count(), "requesting image");
        let response = self
            .client
            .post(&url)
            .json(&json!({ "prompt": prompt }))
            .send()
            .await
            .map_err(|err| request_error(SERVICE, err))?;
        let response = ensure_success(SERVICE, response).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|_| ServiceError::InvalidPayload("response_body_read_failed".to_string()))?;
        if bytes.is_empty() {
            return Err(ServiceError::InvalidPayload("empty_image".to_string()));
        }

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self
            .output_dir
            .join(format!("img_{}.png", Utc::now().timestamp()));
        tokio::fs::write(&path, &bytes).await?;
        info!(service = SERVICE, path = %path.display(), "saved generated image");

        Ok(vec![path])
    }
}

impl ImageGenerator for RemoteImageGenerator {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
    ) -> ServiceFuture<'a, Result<Vec<PathBuf>, ServiceError>> {
        Box::pin(self.generate_once(prompt))
    }
}
