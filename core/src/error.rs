//! Error types for the Harvest client.
//!
//! # Design
//! Every failure of a single round-trip lands in one of four variants, each
//! carrying the method and URL of the request. Variants that saw a response
//! keep the raw body so a failure can be diagnosed without replaying it.

use thiserror::Error;

use crate::http::{HttpMethod, TransportError};

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be assembled: bad URL, unencodable payload,
    /// or an illegal header value.
    #[error("invalid {method} request {url}: {message}")]
    RequestBuild {
        method: HttpMethod,
        url: String,
        message: String,
    },

    /// The executor failed before a response was received.
    #[error("HTTP request failure on {method} {url}")]
    Transport {
        method: HttpMethod,
        url: String,
        source: TransportError,
    },

    /// A response arrived with a status outside the accepted range.
    #[error("HTTP request failure on {method} {url}: {status} {body}")]
    HttpStatus {
        method: HttpMethod,
        url: String,
        status: u16,
        body: String,
    },

    /// The body was not valid JSON for the expected destination type.
    #[error("JSON decode failed on {method} {url}: {body}")]
    Decode {
        method: HttpMethod,
        url: String,
        body: String,
        source: serde_json::Error,
    },
}

impl ApiError {
    /// Status code, when a response was received with an unexpected status.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body, when one was read.
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::HttpStatus { body, .. } | ApiError::Decode { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn url(&self) -> &str {
        match self {
            ApiError::RequestBuild { url, .. }
            | ApiError::Transport { url, .. }
            | ApiError::HttpStatus { url, .. }
            | ApiError::Decode { url, .. } => url,
        }
    }
}
