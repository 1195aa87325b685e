//! HTTP client implementation

use std::time::Duration;

use openapi_client::models::ErrorResponse;
use reqwest::{header, Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};

use crate::errors::ConsoleError;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for backend communication
pub struct HttpClient {
    client: Client,
    base_url: String,
    api_token: Option<SecretString>,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(base_url: &str) -> Result<Self, ConsoleError> {
        Self::build(base_url, None, DEFAULT_TIMEOUT)
    }

    /// Create a new HTTP client authenticating with an API token
    pub fn with_api_token(base_url: &str, api_token: SecretString) -> Result<Self, ConsoleError> {
        Self::build(base_url, Some(api_token), DEFAULT_TIMEOUT)
    }

    /// Create a new HTTP client with an explicit request timeout
    pub fn build(
        base_url: &str,
        api_token: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self, ConsoleError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.header(
                header::AUTHORIZATION,
                format!("Token {}", token.expose_secret()),
            ),
            None => request,
        }
    }

    /// Turn a non-success status into `ApiError`
    async fn check(method: &str, response: Response) -> Result<Response, ConsoleError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(err) => error!("HTTP {} failed: {} - {}: {}", method, status, err.error, err.message),
            Err(_) => error!("HTTP {} failed: {} - {}", method, status, body),
        }
        Err(ConsoleError::ApiError {
            status: status.as_u16(),
            body,
        })
    }

    async fn decode<T: DeserializeOwned>(
        method: &str,
        response: Response,
    ) -> Result<T, ConsoleError> {
        let body = Self::check(method, response).await?.json().await?;
        Ok(body)
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ConsoleError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let request = self.authorize(self.client.get(&url).query(query));
        let response = request.send().await?;
        Self::decode("GET", response).await
    }

    /// Make a PUT request
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ConsoleError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("PUT {}", url);

        let mut request = self.authorize(self.client.put(&url));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        Self::decode("PUT", response).await
    }

    /// Make a POST request
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ConsoleError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let request = self.authorize(self.client.post(&url).json(body));
        let response = request.send().await?;
        Self::decode("POST", response).await
    }

    /// Make a DELETE request, ignoring any response body
    pub async fn delete(&self, path: &str) -> Result<(), ConsoleError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("DELETE {}", url);

        let request = self.authorize(self.client.delete(&url));
        let response = request.send().await?;
        Self::check("DELETE", response).await?;
        Ok(())
    }
}
