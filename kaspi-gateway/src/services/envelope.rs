//! Client for the provider's response envelope.
//!
//! Every provider endpoint answers with
//!
//! ```json
//! {"StatusCode": 0, "Message": "...", "Data": { ... }}
//! ```
//!
//! `StatusCode == 0` means success and `Data` holds the payload. Any other
//! code is a business error, whatever the HTTP status says.

use std::sync::Arc;
use std::time::Instant;

use kaspi_core::observability::inject_trace_context;
use kaspi_core::{GatewayError, TransportError, UpstreamError};
use metrics::{counter, histogram};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Url};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Semaphore;

use crate::config::KaspiConfig;

pub const API_KEY_HEADER: &str = "api-key";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Envelope {
    status_code: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Clone)]
pub struct EnvelopeClient {
    http: reqwest::Client,
    base_url: Url,
    limiter: Arc<Semaphore>,
}

impl EnvelopeClient {
    pub fn new(config: &KaspiConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut api_key = HeaderValue::from_str(config.api_key.expose_secret())?;
        api_key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, api_key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            limiter: Arc::new(Semaphore::new(config.max_concurrent_requests)),
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        self.call(Method::GET, path, None::<&()>, None::<&()>).await
    }

    pub async fn get_with_query<Q, T>(&self, path: &str, query: &Q) -> Result<T, GatewayError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.call(Method::GET, path, Some(query), None::<&()>).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.call(Method::POST, path, None::<&()>, Some(body)).await
    }

    /// One provider round trip. Never retried.
    #[tracing::instrument(
        name = "kaspi_call",
        skip_all,
        fields(method = %method, path = %path, request_id = tracing::field::Empty)
    )]
    async fn call<Q, B, T>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> Result<T, GatewayError>
    where
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.base_url.join(path).map_err(|e| {
            GatewayError::Internal(anyhow::anyhow!("invalid provider path '{}': {}", path, e))
        })?;

        let request_id = correlation_id();
        tracing::Span::current().record("request_id", request_id.as_str());

        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|_| GatewayError::Internal(anyhow::anyhow!("provider limiter closed")))?;

        let mut headers = HeaderMap::new();
        inject_trace_context(&mut headers);
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            headers.insert(REQUEST_ID_HEADER, value);
        }

        let mut request = self.http.request(method, url).headers(headers);
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let start = Instant::now();
        let result = self
            .exchange(request, path)
            .await
            .and_then(|(status, data)| decode_data(path, status, data));

        let outcome = match &result {
            Ok(_) => "success",
            Err(GatewayError::Upstream(_)) => "upstream_error",
            Err(_) => "transport_error",
        };
        let endpoint = metric_path(path);
        counter!(
            "kaspi_upstream_requests_total",
            "path" => endpoint.clone(),
            "outcome" => outcome
        )
        .increment(1);
        histogram!("kaspi_upstream_request_duration_seconds", "path" => endpoint)
            .record(start.elapsed().as_secs_f64());

        result
    }

    /// Send the request and unwrap the envelope into its `Data` value.
    async fn exchange(
        &self,
        request: reqwest::RequestBuilder,
        path: &str,
    ) -> Result<(u16, Value), GatewayError> {
        let response = request.send().await.map_err(|e| transport_error(path, e))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| transport_error(path, e))?;

        let envelope: Envelope = serde_json::from_str(&text).map_err(|source| {
            tracing::error!(
                http_status = status,
                body_len = text.len(),
                error = %source,
                "Kaspi Pay response is not an envelope"
            );
            TransportError::Decode {
                path: path.to_string(),
                status,
                source,
            }
        })?;

        if envelope.status_code != 0 {
            let err = UpstreamError::new(envelope.status_code, envelope.message.unwrap_or_default());
            tracing::warn!(
                code = err.code,
                message = %err.message,
                http_status = status,
                "Kaspi Pay returned an error"
            );
            return Err(err.into());
        }

        Ok((status, envelope.data.unwrap_or(Value::Null)))
    }
}

fn decode_data<T: DeserializeOwned>(path: &str, status: u16, data: Value) -> Result<T, GatewayError> {
    serde_json::from_value(data).map_err(|source| {
        tracing::error!(error = %source, "Kaspi Pay payload does not match the expected shape");
        TransportError::Decode {
            path: path.to_string(),
            status,
            source,
        }
        .into()
    })
}

fn transport_error(path: &str, source: reqwest::Error) -> GatewayError {
    let err = if source.is_timeout() {
        TransportError::Timeout {
            path: path.to_string(),
            source,
        }
    } else {
        TransportError::Network {
            path: path.to_string(),
            source,
        }
    };
    tracing::error!(error = ?err, "Kaspi Pay request failed");
    err.into()
}

/// Diagnostic correlation id: the current time in nanoseconds.
fn correlation_id() -> String {
    chrono::Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_default()
        .to_string()
}

/// Metric label for a provider path with numeric segments collapsed.
fn metric_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
                ":id"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
