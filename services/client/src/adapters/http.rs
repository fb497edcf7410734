//! services/client/src/adapters/http.rs
//!
//! This module contains the HTTP adapter, the concrete implementation of the
//! `Transport` port from the `core` crate. It handles every call to the REST
//! API using `reqwest`.

use async_trait::async_trait;
use podscript_core::ports::{
    ApiRequest, ApiResponse, Envelope, Method, RequestBody, RequestClass, Transport,
    TransportError,
};
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tracing::debug;

use crate::config::Config;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `Transport` port over a shared `reqwest::Client`.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
    upload_timeout: Duration,
}

impl HttpTransport {
    /// Creates a new `HttpTransport` for the configured base address and budgets.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url: config.api_url.clone(),
            request_timeout: config.request_timeout,
            upload_timeout: config.upload_timeout,
        })
    }

    /// Joins a request path onto the base address.
    ///
    /// A leading `/` on the path is dropped so it cannot produce a `//` segment.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    fn timeout(&self, class: RequestClass) -> Duration {
        match class {
            RequestClass::Standard => self.request_timeout,
            RequestClass::Upload => self.upload_timeout,
        }
    }

    fn multipart(file_name: String, mime: &str, data: bytes::Bytes) -> Form {
        let part = Part::bytes(data.to_vec()).file_name(file_name.clone());
        let part = match part.mime_str(mime) {
            Ok(part) => part,
            // An unparseable MIME type still uploads, just without a content type.
            Err(_) => Part::bytes(data.to_vec()).file_name(file_name),
        };
        Form::new().part("file", part)
    }
}

/// Maps a `reqwest` failure onto the transport-level error kinds.
fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_decode() {
        TransportError::Decode(err.to_string())
    } else {
        TransportError::Unreachable(err.to_string())
    }
}

//=========================================================================================
// `Transport` Trait Implementation
//=========================================================================================

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };
        let url = self.url(&request.path);
        debug!("{} {}", method, url);

        let mut builder = self
            .client
            .request(method, &url)
            .timeout(self.timeout(request.class));

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(credential) = &request.bearer {
            builder = builder.bearer_auth(credential.token());
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart {
                file_name,
                mime,
                data,
            } => builder.multipart(Self::multipart(file_name, &mime, data)),
        };

        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        // The timeout covers the body as well, so reading it can still time out.
        let body = response.bytes().await.map_err(classify)?;
        debug!("{} answered {} ({} bytes)", url, status, body.len());

        let envelope = if (200..300).contains(&status) {
            let envelope = serde_json::from_slice::<Envelope>(&body)
                .map_err(|e| TransportError::Decode(e.to_string()))?;
            Some(envelope)
        } else {
            serde_json::from_slice::<Envelope>(&body).ok()
        };

        Ok(ApiResponse { status, envelope })
    }
}
