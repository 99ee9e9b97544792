//! Request executor for the Harvest v2 API.
//!
//! # Design
//! Each verb is split into three steps: `build_request` produces an
//! `HttpRequest`, the configured `HttpExecutor` performs the round-trip, and
//! `check_status` / `check_success` / `decode_body` interpret the
//! `HttpResponse`. The build and interpret steps are public so a caller can
//! run the I/O itself. The client holds no mutable state between calls.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::args::Arguments;
use crate::config::{Config, USER_AGENT};
use crate::error::ApiError;
use crate::http::{HttpExecutor, HttpMethod, HttpRequest, HttpResponse, UreqExecutor};

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Synchronous client bound to one Harvest account.
#[derive(Debug, Clone)]
pub struct HarvestClient<E = UreqExecutor> {
    config: Config,
    executor: E,
}

impl HarvestClient<UreqExecutor> {
    /// Client for `https://api.harvestapp.com/v2` using a fresh `ureq` agent.
    pub fn new(account_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self::with_config(Config::new(account_id, access_token))
    }

    pub fn with_config(config: Config) -> Self {
        Self::with_executor(config, UreqExecutor::new())
    }
}

impl<E: HttpExecutor> HarvestClient<E> {
    pub fn with_executor(config: Config, executor: E) -> Self {
        Self { config, executor }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Headers attached to every request, in a fixed order.
    pub fn default_headers(&self) -> Vec<(String, String)> {
        vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("User-Agent".to_string(), USER_AGENT.to_string()),
            ("Harvest-Account-Id".to_string(), self.config.account_id.clone()),
            ("Authorization".to_string(), format!("Bearer {}", self.config.access_token)),
        ]
    }

    /// Assemble a request for `path` (relative to the base URL) with `args`
    /// appended as the query string. A `Some` body is sent as JSON.
    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        args: &Arguments,
        body: Option<String>,
    ) -> Result<HttpRequest, ApiError> {
        let raw = format!("{}{}", self.config.base_url, path);
        let mut url = Url::parse(&raw).map_err(|e| ApiError::RequestBuild {
            method,
            url: raw.clone(),
            message: e.to_string(),
        })?;
        if !args.is_empty() {
            let query = match url.query() {
                Some(existing) if !existing.is_empty() => format!("{existing}&{}", args.to_query_string()),
                _ => args.to_query_string(),
            };
            url.set_query(Some(&query));
        }

        let mut headers = self.default_headers();
        if matches!(method, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch) {
            headers.push(("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()));
        }
        if let Some((name, _)) = headers.iter().find(|(_, v)| v.chars().any(char::is_control)) {
            return Err(ApiError::RequestBuild {
                method,
                url: url.into(),
                message: format!("header {name} contains a control character"),
            });
        }

        Ok(HttpRequest {
            method,
            url: url.into(),
            headers,
            body,
        })
    }

    /// GET `path` and decode a 200 response into `T`.
    pub fn get<T: DeserializeOwned>(&self, path: &str, args: &Arguments) -> Result<T, ApiError> {
        let request = self.build_request(HttpMethod::Get, path, args, None)?;
        let response = self.send(&request)?;
        check_status(&request, &response, 200)?;
        decode_body(&request, &response)
    }

    pub fn post<P, T>(&self, path: &str, args: &Arguments, payload: Option<&P>) -> Result<T, ApiError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(HttpMethod::Post, path, args, payload)
    }

    pub fn put<P, T>(&self, path: &str, args: &Arguments, payload: Option<&P>) -> Result<T, ApiError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(HttpMethod::Put, path, args, payload)
    }

    pub fn patch<P, T>(&self, path: &str, args: &Arguments, payload: Option<&P>) -> Result<T, ApiError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(HttpMethod::Patch, path, args, payload)
    }

    /// Shared body of `post`, `put` and `patch`. A `None` payload sends an
    /// empty body; any 2xx status is accepted.
    pub fn send_json<P, T>(
        &self,
        method: HttpMethod,
        path: &str,
        args: &Arguments,
        payload: Option<&P>,
    ) -> Result<T, ApiError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = match payload {
            Some(payload) => Some(serde_json::to_string(payload).map_err(|e| ApiError::RequestBuild {
                method,
                url: format!("{}{}", self.config.base_url, path),
                message: format!("payload serialization failed: {e}"),
            })?),
            None => None,
        };
        let request = self.build_request(method, path, args, body)?;
        let response = self.send(&request)?;
        check_success(&request, &response)?;
        decode_body(&request, &response)
    }

    /// DELETE `path`; only a 200 counts as success and the body is ignored.
    pub fn delete(&self, path: &str, args: &Arguments) -> Result<(), ApiError> {
        let request = self.build_request(HttpMethod::Delete, path, args, None)?;
        let response = self.send(&request)?;
        check_status(&request, &response, 200)
    }

    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = %request.method, url = %request.url, "sending request");
        self.executor.execute(request).map_err(|source| ApiError::Transport {
            method: request.method,
            url: request.url.clone(),
            source,
        })
    }
}

/// Fail unless the response status is exactly `expected`.
pub fn check_status(request: &HttpRequest, response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    Err(status_error(request, response))
}

/// Fail unless the response status is in `200..=299`.
pub fn check_success(request: &HttpRequest, response: &HttpResponse) -> Result<(), ApiError> {
    if (200..=299).contains(&response.status) {
        return Ok(());
    }
    Err(status_error(request, response))
}

/// Decode the body into `T`. An empty body is read as `null`, which
/// `()` and `Option<_>` accept.
pub fn decode_body<T: DeserializeOwned>(request: &HttpRequest, response: &HttpResponse) -> Result<T, ApiError> {
    let text = if response.body.trim().is_empty() { "null" } else { response.body.as_str() };
    serde_json::from_str(text).map_err(|source| ApiError::Decode {
        method: request.method,
        url: request.url.clone(),
        body: response.body.clone(),
        source,
    })
}

fn status_error(request: &HttpRequest, response: &HttpResponse) -> ApiError {
    ApiError::HttpStatus {
        method: request.method,
        url: request.url.clone(),
        status: response.status,
        body: response.body.clone(),
    }
}
