//! Blocking client for the Harvest v2 time-tracking API.
//!
//! # Overview
//! `HarvestClient` exposes generic verbs (`get`, `post`, `put`, `patch`,
//! `delete`) that attach account and bearer-token headers, send JSON, and
//! decode JSON replies into any `DeserializeOwned` type. `get_paginated`
//! walks a collection page by page.
//!
//! # Design
//! - The client is schema-agnostic: resource types belong to the caller.
//! - Network I/O sits behind the `HttpExecutor` trait. `UreqExecutor` is the
//!   default; tests plug in scripted executors.
//! - No retries, caching or rate limiting. Every failure is returned to the
//!   caller as an `ApiError` the moment it happens.
//!
//! ```no_run
//! use harvest_core::{Arguments, HarvestClient};
//!
//! let client = HarvestClient::new("123456", "access-token");
//! let me: serde_json::Value = client.get("/users/me", &Arguments::new())?;
//! # Ok::<(), harvest_core::ApiError>(())
//! ```

pub mod args;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod pagination;

pub use args::Arguments;
pub use client::{check_status, check_success, decode_body, HarvestClient};
pub use config::{Config, HARVEST_API_VERSION, HARVEST_DOMAIN, USER_AGENT};
pub use error::ApiError;
pub use http::{HttpExecutor, HttpMethod, HttpRequest, HttpResponse, TransportError, UreqExecutor};
pub use pagination::{PageLinks, PageMeta, Pageable, PAGE_PARAM};
