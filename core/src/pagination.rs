//! Page-by-page traversal of collection endpoints.
//!
//! # Design
//! The paginator never looks inside a page. It decodes each page into the
//! caller's destination, hands it to a callback, and asks the destination
//! whether another page follows. Accumulating results is the callback's job,
//! since the next page overwrites the destination.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::args::Arguments;
use crate::client::HarvestClient;
use crate::error::ApiError;
use crate::http::HttpExecutor;

/// Query parameter carrying the page cursor.
pub const PAGE_PARAM: &str = "page";

/// A decoded page that knows whether more pages exist.
pub trait Pageable {
    fn has_next_page(&self) -> bool;
}

/// Pagination fields of a Harvest collection envelope. Flatten it into a
/// page type to get `Pageable` for free:
///
/// ```
/// use harvest_core::{PageMeta, Pageable};
/// use serde::Deserialize;
///
/// #[derive(Default, Deserialize)]
/// struct Projects {
///     projects: Vec<serde_json::Value>,
///     #[serde(flatten)]
///     meta: PageMeta,
/// }
///
/// impl Pageable for Projects {
///     fn has_next_page(&self) -> bool {
///         self.meta.has_next_page()
///     }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PageMeta {
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
    pub total_entries: u32,
    pub next_page: Option<u32>,
    pub previous_page: Option<u32>,
    pub links: PageLinks,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PageLinks {
    pub first: Option<String>,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub last: Option<String>,
}

impl Pageable for PageMeta {
    fn has_next_page(&self) -> bool {
        self.next_page.is_some()
    }
}

impl<E: HttpExecutor> HarvestClient<E> {
    /// Fetch every page of `path`, starting at page 1.
    ///
    /// `args[PAGE_PARAM]` is overwritten before each request and is left at
    /// the last page fetched. `after_fetch` runs once per successfully decoded
    /// page. The first failing page aborts the traversal with that page's
    /// error; pages already handed to `after_fetch` stay delivered.
    pub fn get_paginated<T, F>(
        &self,
        path: &str,
        args: &mut Arguments,
        target: &mut T,
        mut after_fetch: F,
    ) -> Result<(), ApiError>
    where
        T: Pageable + DeserializeOwned,
        F: FnMut(&T),
    {
        let mut page: u32 = 1;
        loop {
            args.insert(PAGE_PARAM, page.to_string());
            *target = self.get(path, args)?;
            debug!(path, page, "page fetched");
            after_fetch(target);

            if !target.has_next_page() {
                return Ok(());
            }
            page += 1;
        }
    }
}
