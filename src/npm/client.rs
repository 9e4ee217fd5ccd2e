// npm HTTP client.
// Three public upstream hosts: the registry for metadata and search, the
// downloads API for stats, and npms.io for quality scores. None require
// authentication.

use reqwest::{
    Client, Response, StatusCode,
    header::{HeaderMap, HeaderValue, USER_AGENT},
};

use crate::error::{DashError, Result};

const NPM_REGISTRY_BASE: &str = "https://registry.npmjs.org";
const NPM_DOWNLOADS_BASE: &str = "https://api.npmjs.org";
const NPMS_BASE: &str = "https://api.npms.io";

pub struct NpmClient {
    client: Client,
    registry_url: String,
    downloads_url: String,
    npms_url: String,
}

impl NpmClient {
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("devdash"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(DashError::Api)?;

        Ok(Self {
            client,
            registry_url: NPM_REGISTRY_BASE.to_string(),
            downloads_url: NPM_DOWNLOADS_BASE.to_string(),
            npms_url: NPMS_BASE.to_string(),
        })
    }

    /// Point every upstream at one host (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base = base_url.into();
        self.registry_url = base.clone();
        self.downloads_url = base.clone();
        self.npms_url = base;
        self
    }

    /// GET from the registry (package documents, search).
    pub async fn get_registry(&self, endpoint: &str) -> Result<Response> {
        self.get(&format!("{}{}", self.registry_url, endpoint)).await
    }

    /// GET from the downloads API.
    pub async fn get_downloads(&self, endpoint: &str) -> Result<Response> {
        self.get(&format!("{}{}", self.downloads_url, endpoint)).await
    }

    /// GET from npms.io.
    pub async fn get_npms(&self, endpoint: &str) -> Result<Response> {
        self.get(&format!("{}{}", self.npms_url, endpoint)).await
    }

    async fn get(&self, url: &str) -> Result<Response> {
        let response = self.client.get(url).send().await.map_err(DashError::Api)?;
        self.check_response(response).await
    }

    /// Check response status and convert errors.
    async fn check_response(&self, response: Response) -> Result<Response> {
        match response.status() {
            StatusCode::OK => Ok(response),
            StatusCode::NOT_FOUND => {
                let url = response.url().to_string();
                Err(DashError::NotFound(url))
            }
            status => Err(DashError::Other(format!(
                "HTTP {}: {}",
                status,
                response.text().await.unwrap_or_default()
            ))),
        }
    }
}
