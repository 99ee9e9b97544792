//! End-to-end run against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every client verb
//! and the paginator over real HTTP through `UreqExecutor`.

use std::io::{Read, Write};

use harvest_core::{ApiError, Arguments, Config, HarvestClient, PageMeta, Pageable};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct TimeEntry {
    id: u64,
    spent_date: String,
    hours: f64,
    notes: Option<String>,
}

#[derive(Serialize)]
struct NewTimeEntry<'a> {
    spent_date: &'a str,
    hours: f64,
    notes: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct TimeEntries {
    time_entries: Vec<TimeEntry>,
    #[serde(flatten)]
    meta: PageMeta,
}

impl Pageable for TimeEntries {
    fn has_next_page(&self) -> bool {
        self.meta.has_next_page()
    }
}

fn start_mock_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}/v2")
}

#[test]
fn crud_and_pagination_lifecycle() {
    let base_url = start_mock_server();
    let client = HarvestClient::with_config(Config::new("123", "tok").with_base_url(&base_url));
    let none = Arguments::new();

    // Empty collection is one page with nothing in it.
    let page: TimeEntries = client.get("/time_entries", &none).unwrap();
    assert!(page.time_entries.is_empty());
    assert!(!page.has_next_page());

    // Create five entries.
    let mut created = Vec::new();
    for n in 0..5 {
        let input = NewTimeEntry {
            spent_date: "2024-03-01",
            hours: 1.0,
            notes: &format!("entry {n}"),
        };
        let entry: TimeEntry = client.post("/time_entries", &none, Some(&input)).unwrap();
        created.push(entry);
    }
    assert_eq!(created[0].id, 1);
    assert_eq!(created[4].id, 5);

    // Walk them two per page.
    let mut args = Arguments::new().with("per_page", "2");
    let mut target = TimeEntries::default();
    let mut collected = Vec::new();
    let mut pages_seen = Vec::new();
    client
        .get_paginated("/time_entries", &mut args, &mut target, |p| {
            pages_seen.push(p.meta.page);
            collected.extend(p.time_entries.iter().cloned());
        })
        .unwrap();
    assert_eq!(pages_seen, vec![1, 2, 3]);
    assert_eq!(collected, created);
    assert_eq!(args.get("page"), Some("3"));

    // Patch one field.
    let id = created[2].id;
    let patch = serde_json::json!({ "hours": 2.5 });
    let updated: TimeEntry = client
        .patch(&format!("/time_entries/{id}"), &none, Some(&patch))
        .unwrap();
    assert_eq!(updated.hours, 2.5);
    assert_eq!(updated.notes.as_deref(), Some("entry 2"));

    let fetched: TimeEntry = client.get(&format!("/time_entries/{id}"), &none).unwrap();
    assert_eq!(fetched, updated);

    // Delete, then the entry is gone.
    client.delete(&format!("/time_entries/{id}"), &none).unwrap();
    let err = client.get::<TimeEntry>(&format!("/time_entries/{id}"), &none).unwrap_err();
    assert!(err.is_not_found(), "{err}");
    let err = client.delete(&format!("/time_entries/{id}"), &none).unwrap_err();
    assert!(matches!(err, ApiError::HttpStatus { status: 404, .. }));
}

#[test]
fn missing_credentials_are_rejected_by_the_server() {
    let base_url = start_mock_server();
    let client = HarvestClient::with_config(Config::new("", "tok").with_base_url(&base_url));
    let err = client
        .get::<TimeEntries>("/time_entries", &Arguments::new())
        .unwrap_err();
    assert_eq!(err.status(), Some(401));
}

#[test]
fn unreachable_host_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = Config::new("123", "tok").with_base_url(&format!("http://{addr}/v2"));
    let client = HarvestClient::with_config(config);
    let err = client.delete("/time_entries/1", &Arguments::new()).unwrap_err();
    assert!(matches!(err, ApiError::Transport { .. }), "{err}");
}

/// Accept one connection, drain the request head and answer with `status`
/// and the raw `body` bytes.
fn serve_once(status: &str, body: Vec<u8>) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let status = status.to_string();

    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            head.extend_from_slice(&buf[..n]);
        }
        let header = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        stream.write_all(header.as_bytes()).unwrap();
        stream.write_all(&body).unwrap();
        stream.flush().unwrap();
    });

    format!("http://{addr}/v2")
}

#[test]
fn non_utf8_error_page_is_a_status_error() {
    let base_url = serve_once("502 Bad Gateway", b"\xff\xfe bad gateway".to_vec());
    let client = HarvestClient::with_config(Config::new("123", "tok").with_base_url(&base_url));

    let err = client
        .get::<serde_json::Value>("/time_entries", &Arguments::new())
        .unwrap_err();
    match err {
        ApiError::HttpStatus { status, body, .. } => {
            assert_eq!(status, 502);
            assert!(body.ends_with(" bad gateway"), "{body}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn non_utf8_success_body_is_a_decode_error() {
    let base_url = serve_once("200 OK", b"{\"id\":\xff}".to_vec());
    let client = HarvestClient::with_config(Config::new("123", "tok").with_base_url(&base_url));

    let err = client
        .get::<serde_json::Value>("/time_entries/1", &Arguments::new())
        .unwrap_err();
    assert!(matches!(err, ApiError::Decode { .. }), "{err}");
}

#[test]
fn body_larger_than_ten_mebibytes_is_read_whole() {
    let count = 6 * 1024 * 1024;
    let mut body = Vec::with_capacity(count * 2 + 2);
    body.push(b'[');
    for i in 0..count {
        if i > 0 {
            body.push(b',');
        }
        body.push(b'1');
    }
    body.push(b']');
    assert!(body.len() > 10 * 1024 * 1024);

    let base_url = serve_once("200 OK", body);
    let client = HarvestClient::with_config(Config::new("123", "tok").with_base_url(&base_url));

    let ones: Vec<u8> = client.get("/time_entries", &Arguments::new()).unwrap();
    assert_eq!(ones.len(), count);
    assert!(ones.iter().all(|&n| n == 1));
}
