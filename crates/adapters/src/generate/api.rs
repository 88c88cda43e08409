// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Generator backed by the Messages HTTP API, with screenshots sent inline.

use super::prompts::{self, IMAGE_SYSTEM_PROMPT, PAGE_SYSTEM_PROMPT};
use super::{GenerateError, GeneratorAdapter, GeneratorSettings};
use crate::browser::Viewport;
use crate::capture::ScrapedPage;
use crate::design::{self, DesignHints};
use crate::image_prep::{self, EncodedImage};
use crate::response;
use async_trait::async_trait;
use reqwest::Client;
use rp_core::ArtifactTriple;
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;

const LABEL: &str = "Messages API";
const API_VERSION: &str = "2023-06-01";

#[derive(Clone)]
pub struct ApiGenerator {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    timeout: Duration,
    image_budget: usize,
    viewport: Viewport,
}

impl std::fmt::Debug for ApiGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiGenerator")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Text of the first content block of a Messages API response.
pub(crate) fn response_text(body: &Value) -> Result<String, GenerateError> {
    let text = body
        .get("content")
        .and_then(|c| c.get(0))
        .and_then(|block| block.get("text"))
        .and_then(Value::as_str)
        .ok_or(GenerateError::Empty)?;
    if text.is_empty() {
        return Err(GenerateError::Empty);
    }
    Ok(text.to_string())
}

impl ApiGenerator {
    pub fn new(settings: &GeneratorSettings) -> Result<Self, GenerateError> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| GenerateError::NotConfigured("API key is not set".to_string()))?;
        let client = Client::builder()
            .timeout(settings.api_timeout())
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| GenerateError::Http(e.to_string()))?;
        Ok(Self {
            client,
            api_key,
            model: settings.api_model.clone(),
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            max_tokens: settings.max_tokens,
            timeout: settings.api_timeout(),
            image_budget: settings.image_budget,
            viewport: settings.viewport,
        })
    }

    pub(crate) fn request_body(&self, system: &str, prompt: &str, image: Option<&EncodedImage>) -> Value {
        let mut content = Vec::new();
        if let Some(image) = image {
            content.push(json!({
                "type": "image",
                "source": {
                    "type": "base64",
                    "media_type": image.media_type.as_str(),
                    "data": image.data,
                },
            }));
        }
        content.push(json!({ "type": "text", "text": prompt }));
        json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": system,
            "messages": [{ "role": "user", "content": content }],
        })
    }

    async fn encode(&self, png_or_path: ImageSource<'_>) -> Result<EncodedImage, GenerateError> {
        let budget = self.image_budget;
        let encoded = match png_or_path {
            ImageSource::Path(path) => {
                let path = path.to_path_buf();
                tokio::task::spawn_blocking(move || image_prep::load_for_upload(&path, budget))
                    .await
                    .map_err(|e| GenerateError::Task(e.to_string()))??
            }
            ImageSource::Bytes(bytes) => {
                let bytes = bytes.to_vec();
                tokio::task::spawn_blocking(move || {
                    let decoded = image::load_from_memory(&bytes)
                        .map_err(image_prep::ImagePrepError::DecodeBytes)?;
                    image_prep::encode_within(&image_prep::prepare(decoded), budget)
                })
                .await
                .map_err(|e| GenerateError::Task(e.to_string()))??
            }
        };
        Ok(encoded)
    }

    async fn call(
        &self,
        system: &str,
        prompt: &str,
        image: Option<&EncodedImage>,
    ) -> Result<ArtifactTriple, GenerateError> {
        let url = format!("{}/v1/messages", self.base_url);
        tracing::info!(model = %self.model, with_image = image.is_some(), "calling Messages API");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&self.request_body(system, prompt, image))
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, "Messages API error");
            return Err(GenerateError::Api { status: status.as_u16(), body });
        }
        let body: Value = response.json().await.map_err(|e| self.map_transport(e))?;
        response::parse_triple(&response_text(&body)?)
    }

    fn map_transport(&self, e: reqwest::Error) -> GenerateError {
        if e.is_timeout() {
            GenerateError::Timeout { label: LABEL.to_string(), secs: self.timeout.as_secs() }
        } else {
            GenerateError::Http(e.to_string())
        }
    }
}

enum ImageSource<'a> {
    Path(&'a Path),
    Bytes(&'a [u8]),
}

#[async_trait]
impl GeneratorAdapter for ApiGenerator {
    async fn generate(&self, page: &ScrapedPage) -> Result<ArtifactTriple, GenerateError> {
        let hints = design::hints_from_html(&page.html);
        let prompt = prompts::page_prompt(page, Some(&hints));
        let image = if page.screenshot.is_empty() {
            None
        } else {
            Some(self.encode(ImageSource::Bytes(&page.screenshot)).await?)
        };
        self.call(PAGE_SYSTEM_PROMPT, &prompt, image.as_ref()).await
    }

    async fn generate_from_image(
        &self,
        image: &Path,
        hints: Option<&DesignHints>,
    ) -> Result<ArtifactTriple, GenerateError> {
        let encoded = self.encode(ImageSource::Path(image)).await?;
        let prompt = prompts::image_prompt(self.viewport, hints, None);
        self.call(IMAGE_SYSTEM_PROMPT, &prompt, Some(&encoded)).await
    }

    async fn refine(
        &self,
        current: &ArtifactTriple,
        similarity: f64,
        report: &str,
    ) -> Result<ArtifactTriple, GenerateError> {
        let prompt = prompts::refine_prompt(current, similarity, report);
        self.call(IMAGE_SYSTEM_PROMPT, &prompt, None).await
    }
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
