//! HTTP backend for the Load Optimizer API

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::store::{DocumentStore, OptimizeRequest, PaymentProvider, Solver};
use async_trait::async_trait;
use loadopt_model::{Document, LoadPlan};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

const DATA_PATH: &str = "/api/data";
const OPTIMIZE_PATH: &str = "/api/optimize";
const PAYMENT_CONFIG_PATH: &str = "/api/payment/config";
const CREATE_ORDER_PATH: &str = "/api/payment/create-order";
const CAPTURE_ORDER_PATH: &str = "/api/payment/capture-order";

/// reqwest-backed implementation of every backend seam
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Creates a backend from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Network`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ClientError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Backend origin without trailing slash
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        tracing::debug!(method = "GET", path, "backend request");
        let response = self.request(Method::GET, path).send().await;
        Self::decode(path, response).await
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        tracing::debug!(method = %method, path, "backend request");
        let response = self.request(method, path).json(body).send().await;
        Self::decode(path, response).await
    }

    async fn decode<T: DeserializeOwned>(
        path: &str,
        response: Result<Response, reqwest::Error>,
    ) -> Result<T, ClientError> {
        let response = response.map_err(|e| {
            tracing::warn!(path, error = %e, "backend unreachable");
            ClientError::Network(e.to_string())
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            tracing::warn!(path, error = %e, "failed reading response body");
            ClientError::Network(e.to_string())
        })?;

        if status.is_success() {
            serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))
        } else {
            let err = ClientError::from_response(status, &body);
            tracing::warn!(path, status = status.as_u16(), error = %err, "backend rejected request");
            Err(err)
        }
    }
}

#[async_trait]
impl DocumentStore for HttpBackend {
    async fn read(&self) -> Result<Document, ClientError> {
        self.get(DATA_PATH).await
    }

    async fn write(&self, document: &Document) -> Result<Document, ClientError> {
        self.send(Method::PUT, DATA_PATH, document).await
    }
}

#[async_trait]
impl Solver for HttpBackend {
    async fn optimize(&self, request: &OptimizeRequest) -> Result<LoadPlan, ClientError> {
        self.send(Method::POST, OPTIMIZE_PATH, request).await
    }
}

#[async_trait]
impl PaymentProvider for HttpBackend {
    async fn payment_config(&self) -> Result<Value, ClientError> {
        self.get(PAYMENT_CONFIG_PATH).await
    }

    async fn create_order(&self, body: &Value) -> Result<Value, ClientError> {
        self.send(Method::POST, CREATE_ORDER_PATH, body).await
    }

    async fn capture_order(&self, body: &Value) -> Result<Value, ClientError> {
        self.send(Method::POST, CAPTURE_ORDER_PATH, body).await
    }
}
