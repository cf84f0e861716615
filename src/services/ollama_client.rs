use std::sync::RwLock;
use async_trait::async_trait;
use log::{debug, info};
use reqwest::{Client, Method};
use serde::Serialize;
use url::Url;
use crate::models::ollama::{GenerateRequest, InstalledModel, TagsResponse};

#[derive(Debug, thiserror::Error)]
pub enum OllamaError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Ollama answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid Ollama URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Unexpected payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// The calls the page makes against a local Ollama server.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OllamaApi: Send + Sync {
    /// Points every later call at a new base URL.
    fn set_base_url(&self, base: &str) -> Result<(), OllamaError>;

    /// `GET {base}/`, succeeding when the server is reachable.
    async fn ping(&self) -> Result<(), OllamaError>;

    /// `GET {base}/api/tags`.
    async fn list_models(&self) -> Result<Vec<InstalledModel>, OllamaError>;

    /// `POST {base}/api/generate`, returning the raw NDJSON body.
    async fn generate(&self, prompt: &str, model: &str, context: &[i64]) -> Result<String, OllamaError>;
}

/// Thin reqwest wrapper returning raw response bodies.
pub struct OllamaClient {
    http: Client,
    base: RwLock<Url>,
}

impl OllamaClient {
    pub fn new(base: &str) -> Result<Self, OllamaError> {
        Ok(OllamaClient {
            http: Client::new(),
            base: RwLock::new(parse_base(base)?),
        })
    }

    pub fn base_url(&self) -> String {
        self.base.read().unwrap().to_string()
    }

    fn endpoint(&self, path: &str) -> Result<Url, OllamaError> {
        let base = self.base.read().unwrap();
        Ok(base.join(path)?)
    }

    /// Issues one call and hands back the body untouched.
    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<String, OllamaError> {
        let url = self.endpoint(path)?;
        debug!("{} {}", method, url);

        let mut req = self.http.request(method, url);
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(OllamaError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }
}

#[async_trait]
impl OllamaApi for OllamaClient {
    fn set_base_url(&self, base: &str) -> Result<(), OllamaError> {
        let url = parse_base(base)?;
        info!("Ollama base URL set to {}", url);
        *self.base.write().unwrap() = url;
        Ok(())
    }

    async fn ping(&self) -> Result<(), OllamaError> {
        self.request::<()>(Method::GET, "", None).await.map(|_| ())
    }

    async fn list_models(&self) -> Result<Vec<InstalledModel>, OllamaError> {
        let body = self.request::<()>(Method::GET, "api/tags", None).await?;
        let tags: TagsResponse = serde_json::from_str(&body)?;
        Ok(tags.models)
    }

    async fn generate(&self, prompt: &str, model: &str, context: &[i64]) -> Result<String, OllamaError> {
        let body = GenerateRequest { model, prompt, context };
        self.request(Method::POST, "api/generate", Some(&body)).await
    }
}

/// Base URLs are treated as directories so `join` appends instead of replacing.
fn parse_base(base: &str) -> Result<Url, OllamaError> {
    let mut url = Url::parse(base.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
