//! In-memory stand-in for the Harvest v2 API.
//!
//! Serves a single `time_entries` collection under `/v2` with Harvest-style
//! pagination envelopes. Every request must carry a bearer token and an
//! account id header, mirroring what the real service enforces.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

pub const DEFAULT_PER_PAGE: u32 = 100;
pub const MAX_PER_PAGE: u32 = 2000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: u64,
    pub spent_date: String,
    pub hours: f64,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateTimeEntry {
    pub spent_date: String,
    #[serde(default)]
    pub hours: f64,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateTimeEntry {
    pub spent_date: Option<String>,
    pub hours: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Links {
    pub first: String,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub last: String,
}

/// One page of the `time_entries` collection.
#[derive(Debug, Serialize, Deserialize)]
pub struct TimeEntriesPage {
    pub time_entries: Vec<TimeEntry>,
    pub per_page: u32,
    pub total_pages: u32,
    pub total_entries: u32,
    pub next_page: Option<u32>,
    pub previous_page: Option<u32>,
    pub page: u32,
    pub links: Links,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Default)]
pub struct Store {
    next_id: u64,
    entries: BTreeMap<u64, TimeEntry>,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    let api = Router::new()
        .route("/time_entries", get(list_time_entries).post(create_time_entry))
        .route(
            "/time_entries/{id}",
            get(get_time_entry).patch(update_time_entry).delete(delete_time_entry),
        )
        .with_state(db)
        .layer(middleware::from_fn(require_credentials));
    Router::new().nest("/v2", api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_credentials(request: Request, next: Next) -> Result<Response, StatusCode> {
    let headers = request.headers();
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer ") && v.len() > "Bearer ".len());
    let account = headers
        .get("Harvest-Account-Id")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| !v.is_empty());
    if !(bearer && account) {
        tracing::debug!(bearer, account, "rejecting unauthenticated request");
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(request).await)
}

async fn list_time_entries(
    State(db): State<Db>,
    Query(params): Query<ListParams>,
) -> Result<Json<TimeEntriesPage>, StatusCode> {
    let per_page = params.per_page.unwrap_or(DEFAULT_PER_PAGE);
    if per_page == 0 || per_page > MAX_PER_PAGE {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    let page = params.page.unwrap_or(1).max(1);

    let store = db.read().await;
    let total_entries = store.entries.len() as u32;
    let total_pages = total_entries.div_ceil(per_page).max(1);
    let time_entries = store
        .entries
        .values()
        .skip((page as usize - 1) * per_page as usize)
        .take(per_page as usize)
        .cloned()
        .collect();

    let link = |n: u32| format!("/v2/time_entries?page={n}&per_page={per_page}");
    let next_page = (page < total_pages).then_some(page + 1);
    let previous_page = (page > 1).then_some(page - 1);

    Ok(Json(TimeEntriesPage {
        time_entries,
        per_page,
        total_pages,
        total_entries,
        next_page,
        previous_page,
        page,
        links: Links {
            first: link(1),
            next: next_page.map(link),
            previous: previous_page.map(link),
            last: link(total_pages),
        },
    }))
}

async fn create_time_entry(
    State(db): State<Db>,
    Json(input): Json<CreateTimeEntry>,
) -> (StatusCode, Json<TimeEntry>) {
    let mut store = db.write().await;
    store.next_id += 1;
    let entry = TimeEntry {
        id: store.next_id,
        spent_date: input.spent_date,
        hours: input.hours,
        notes: input.notes,
    };
    store.entries.insert(entry.id, entry.clone());
    (StatusCode::CREATED, Json(entry))
}

async fn get_time_entry(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<TimeEntry>, StatusCode> {
    let store = db.read().await;
    store.entries.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_time_entry(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<UpdateTimeEntry>,
) -> Result<Json<TimeEntry>, StatusCode> {
    let mut store = db.write().await;
    let entry = store.entries.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(spent_date) = input.spent_date {
        entry.spent_date = spent_date;
    }
    if let Some(hours) = input.hours {
        entry.hours = hours;
    }
    if let Some(notes) = input.notes {
        entry.notes = Some(notes);
    }
    Ok(Json(entry.clone()))
}

// Harvest answers a delete with 200 and an empty body.
async fn delete_time_entry(State(db): State<Db>, Path(id): Path<u64>) -> StatusCode {
    let mut store = db.write().await;
    match store.entries.remove(&id) {
        Some(_) => StatusCode::OK,
        None => StatusCode::NOT_FOUND,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_serializes_harvest_fields() {
        let page = TimeEntriesPage {
            time_entries: Vec::new(),
            per_page: 2,
            total_pages: 1,
            total_entries: 0,
            next_page: None,
            previous_page: None,
            page: 1,
            links: Links {
                first: "/v2/time_entries?page=1&per_page=2".to_string(),
                next: None,
                previous: None,
                last: "/v2/time_entries?page=1&per_page=2".to_string(),
            },
        };
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["next_page"], serde_json::Value::Null);
        assert_eq!(json["total_pages"], 1);
        assert_eq!(json["links"]["next"], serde_json::Value::Null);
    }

    #[test]
    fn create_time_entry_defaults_hours_to_zero() {
        let input: CreateTimeEntry = serde_json::from_str(r#"{"spent_date":"2024-03-01"}"#).unwrap();
        assert_eq!(input.hours, 0.0);
        assert!(input.notes.is_none());
    }

    #[test]
    fn create_time_entry_rejects_missing_date() {
        let result: Result<CreateTimeEntry, _> = serde_json::from_str(r#"{"hours":1.5}"#);
        assert!(result.is_err());
    }

    #[test]
    fn update_time_entry_all_fields_optional() {
        let input: UpdateTimeEntry = serde_json::from_str("{}").unwrap();
        assert!(input.spent_date.is_none());
        assert!(input.hours.is_none());
        assert!(input.notes.is_none());
    }
}
