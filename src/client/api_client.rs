/**
 * Study Set HTTP Client
 *
 * Talks to the REST backend for the offline engine: set and question
 * retrieval, batch attempt ingestion and the per-set offline flag.
 */

use crate::client::remote::{AttemptSink, StudySetSource};
use crate::shared::attempt::AttemptBatch;
use crate::shared::config::AppConfig;
use crate::shared::error::TransportError;
use crate::shared::study_set::{QuestionSnapshot, SetId, StudySetMeta};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

/// reqwest-backed implementation of both backend contracts
#[derive(Debug, Clone)]
pub struct HttpBackend {
    config: AppConfig,
    client: Client,
}

impl HttpBackend {
    pub fn new(config: AppConfig) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { config, client })
    }

    /// Build full URL from a backend path
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.config.server_url.trim_end_matches('/'), path)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, TransportError> {
        let url = self.api_url(path);
        tracing::debug!(%url, "GET");
        let response = self.authorize(self.client.get(&url)).send().await?;
        let response = check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| TransportError::decode(format!("{}: {}", path, e)))
    }
}

/// Turn a non-2xx response into `TransportError::Status`
///
/// The backend reports failures as `{"detail": ...}`; the detail is kept
/// when present, otherwise the raw body or the status reason.
async fn check_status(response: Response) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(serde_json::Value::Object(mut fields)) => match fields.remove("detail") {
            Some(serde_json::Value::String(detail)) => detail,
            Some(other) => other.to_string(),
            None => body,
        },
        _ if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
        _ => body,
    };
    Err(TransportError::status(status.as_u16(), detail))
}

#[async_trait]
impl StudySetSource for HttpBackend {
    async fn fetch_study_set(&self, set_id: SetId) -> Result<StudySetMeta, TransportError> {
        self.get_json(&format!("/study-sets/{}", set_id)).await
    }

    async fn fetch_questions(&self, set_id: SetId) -> Result<Vec<QuestionSnapshot>, TransportError> {
        self.get_json(&format!("/study-sets/{}/questions", set_id)).await
    }

    async fn set_offline_flag(&self, set_id: SetId, offline: bool) -> Result<(), TransportError> {
        let url = self.api_url(&format!("/study-sets/{}/offline", set_id));
        let request = if offline {
            self.client.post(&url)
        } else {
            self.client.delete(&url)
        };
        let response = self.authorize(request).send().await?;
        check_status(response).await?;
        Ok(())
    }
}

#[async_trait]
impl AttemptSink for HttpBackend {
    async fn submit_attempts(&self, batch: &AttemptBatch) -> Result<(), TransportError> {
        let url = self.api_url("/study-sets/attempts/batch");
        tracing::debug!(%url, count = batch.attempts.len(), "POST attempt batch");
        let response = self
            .authorize(self.client.post(&url))
            .json(batch)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}
