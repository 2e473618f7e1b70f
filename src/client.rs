use crate::api::ErrorBody;
use crate::models::{Component, HealthResponse, NewComponent};
use crate::validation::FieldError;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("validation failed: {}", describe(.0))]
    Validation(Vec<FieldError>),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },
    #[error("failed to reach the catalog service: {0}")]
    Transport(#[from] reqwest::Error),
}

fn describe(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Typed access to the catalog REST surface.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `category` of `None` or `"All"` lists everything.
    pub async fn list_components(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<Component>, ClientError> {
        let mut request = self.http.get(format!("{}/api/components", self.base_url));
        if let Some(category) = category {
            request = request.query(&[("category", category)]);
        }

        decode(request.send().await?).await
    }

    pub async fn search_components(&self, query: &str) -> Result<Vec<Component>, ClientError> {
        let response = self
            .http
            .get(format!("{}/api/components/search", self.base_url))
            .query(&[("q", query)])
            .send()
            .await?;

        decode(response).await
    }

    /// Unknown ids come back as `Ok(None)`.
    pub async fn get_component(&self, id: &str) -> Result<Option<Component>, ClientError> {
        let response = self
            .http
            .get(format!("{}/api/components/{}", self.base_url, id))
            .send()
            .await?;

        match decode(response).await {
            Ok(component) => Ok(Some(component)),
            Err(ClientError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn create_component(&self, data: &NewComponent) -> Result<Component, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/components", self.base_url))
            .json(data)
            .send()
            .await?;

        decode(response).await
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self
            .http
            .get(format!("{}/api/health", self.base_url))
            .send()
            .await?;

        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let text = response.text().await.unwrap_or_default();
    let body: Option<ErrorBody> = serde_json::from_str(&text).ok();

    match (status, body) {
        (StatusCode::BAD_REQUEST, Some(body)) if !body.errors.is_empty() => {
            Err(ClientError::Validation(body.errors))
        }
        (StatusCode::NOT_FOUND, body) => Err(ClientError::NotFound(
            body.map(|b| b.message).unwrap_or(text),
        )),
        (status, body) => Err(ClientError::Server {
            status: status.as_u16(),
            message: body.map(|b| b.message).unwrap_or(text),
        }),
    }
}
