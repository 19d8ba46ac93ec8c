// HTTP seam
//
// The controllers only see `Transport`. Production uses ReqwestTransport; the smoke runner
// and the tests use ScriptedTransport so every remote path is deterministic.

use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use super::csrf::{CsrfToken, CSRF_HEADER};
use crate::error::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Form(Vec<(String, String)>),
    Json(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn get(path: &str) -> Self {
        Self {
            method: Method::Get,
            path: path.to_string(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn post_form(path: &str, fields: Vec<(String, String)>) -> Self {
        Self {
            method: Method::Post,
            path: path.to_string(),
            query: Vec::new(),
            body: RequestBody::Form(fields),
        }
    }

    pub fn post_json(path: &str, body: serde_json::Value) -> Self {
        Self {
            method: Method::Post,
            path: path.to_string(),
            query: Vec::new(),
            body: RequestBody::Json(body),
        }
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 400 and 422 both mean the server rejected one or more fields.
    pub fn is_validation_failure(&self) -> bool {
        self.status == 400 || self.status == 422
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Same-origin HTTP client: keeps the session cookie and sends the anti-forgery header
/// with every request.
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: Url,
    csrf: CsrfToken,
}

impl ReqwestTransport {
    pub fn new(
        base_url: &str,
        csrf: CsrfToken,
        timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let base_url = Url::parse(base_url).map_err(|_| TransportError::InvalidUrl {
            url: base_url.to_string(),
        })?;
        let mut builder = reqwest::Client::builder().cookie_store(true);
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::network(e.to_string()))?;
        Ok(Self {
            client,
            base_url,
            csrf,
        })
    }

    pub fn set_csrf(&mut self, csrf: CsrfToken) {
        self.csrf = csrf;
    }

    fn resolve(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path)
            .map_err(|_| TransportError::InvalidUrl {
                url: format!("{}{}", self.base_url, path),
            })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = self.resolve(&request.path)?;
        debug!(
            "[PHASE: transport] [STEP: send] {} {}",
            request.method.as_str(),
            url.path()
        );

        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if !self.csrf.is_empty() {
            builder = builder.header(CSRF_HEADER, self.csrf.as_str());
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Form(fields) => builder.form(&fields),
            RequestBody::Json(value) => builder.json(&value),
        };

        let resp = builder.send().await.map_err(map_reqwest_error)?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(map_reqwest_error)?;
        Ok(HttpResponse { status, body })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::network(e.to_string())
    }
}
