//! serve: request handlers of `pixelvault_server`, independent of the HTTP library.
//!
//! Routes:
//! - GET  /pixel?x=&y= -> 200 {"available":true} | {"available":false,"tweetData":{..}}
//! - POST /pixel {x,y,username,tweetContent,tweetId} -> 200 {}
//!   409 coordinate already claimed, 400 bad body or validation failure, 500 I/O
//! - GET  /metrics     -> Prometheus text
//!
//! Errors are always `{"error": msg}`.

use log::info;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::StoreError;
use crate::metrics;
use crate::store::ClaimStore;

/// POST /pixel body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    pub x: i64,
    pub y: i64,
    pub username: String,
    pub tweet_content: String,
    pub tweet_id: f64,
}

/// Status + JSON body of one handled request.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
    /// A claim was stored (the reveal image is stale).
    pub saved: bool,
}

impl Reply {
    fn ok(body: Value) -> Self {
        Self {
            status: 200,
            body,
            saved: false,
        }
    }

    pub fn error(status: u16, msg: &str) -> Self {
        Self {
            status,
            body: json!({ "error": msg }),
            saved: false,
        }
    }
}

/// Value of `key` in a raw query string (no percent-decoding).
pub fn query_param<'a>(query: &'a str, key: &str) -> Option<&'a str> {
    query
        .split('&')
        .filter_map(|kv| kv.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

pub fn get_pixel(store: &ClaimStore, query: &str) -> Reply {
    let x = query_param(query, "x").and_then(|v| v.trim().parse::<i64>().ok());
    let y = query_param(query, "y").and_then(|v| v.trim().parse::<i64>().ok());
    let (x, y) = match (x, y) {
        (Some(x), Some(y)) => (x, y),
        _ => return Reply::error(400, "x and y must be integers"),
    };
    match store.get_claim(x, y) {
        Some(c) => Reply::ok(json!({ "available": false, "tweetData": c })),
        None => Reply::ok(json!({ "available": true })),
    }
}

pub fn post_pixel(store: &mut ClaimStore, raw: &str) -> Reply {
    let rq: ClaimRequest = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => return Reply::error(400, &format!("bad request body: {}", e)),
    };
    // the store allows overwrites; the public endpoint does not
    if store.get_claim(rq.x, rq.y).is_some() {
        return Reply::error(409, "tweet already saved for given coordinates");
    }
    match store.save_claim(rq.x, rq.y, &rq.username, &rq.tweet_content, rq.tweet_id) {
        Ok(()) => {
            info!("revealed ({}, {}) for '{}'", rq.x, rq.y, rq.username);
            Reply {
                saved: true,
                ..Reply::ok(json!({}))
            }
        }
        Err(e @ StoreError::Io(_)) => Reply::error(500, &e.to_string()),
        Err(e) => Reply::error(400, &e.to_string()),
    }
}

fn push_metric(out: &mut String, name: &str, kind: &str, help: &str, value: u64) {
    out.push_str(&format!("# HELP {} {}\n", name, help));
    out.push_str(&format!("# TYPE {} {}\n", name, kind));
    out.push_str(&format!("{} {}\n", name, value));
}

/// Prometheus text exposition of the process metrics and store state.
pub fn build_metrics(store: &ClaimStore) -> String {
    let m = metrics::snapshot();
    let mut out = String::new();

    out.push_str("# HELP pixelvault_build_info Build info.\n");
    out.push_str("# TYPE pixelvault_build_info gauge\n");
    out.push_str(&format!(
        "pixelvault_build_info{{version=\"{}\"}} 1\n",
        env!("CARGO_PKG_VERSION")
    ));

    push_metric(&mut out, "pixelvault_claims", "gauge",
        "Usernames currently holding a claim.", store.claim_count() as u64);
    push_metric(&mut out, "pixelvault_claims_saved_total", "counter",
        "Successful saves.", m.claims_saved);
    push_metric(&mut out, "pixelvault_claims_saved_memory_only_total", "counter",
        "Successful saves that scheduled no flush.", m.claims_saved_memory_only);
    push_metric(&mut out, "pixelvault_claims_rejected_total", "counter",
        "Saves rejected by validation.", m.claims_rejected);
    push_metric(&mut out, "pixelvault_flushes_total", "counter",
        "Background flushes completed.", m.flushes_completed);
    push_metric(&mut out, "pixelvault_flush_slots_total", "counter",
        "Slots written by slot-mode flushes.", m.flush_slots_written);
    push_metric(&mut out, "pixelvault_flush_bytes_total", "counter",
        "Bytes written by background flushes.", m.flush_bytes_written);
    push_metric(&mut out, "pixelvault_flush_errors_total", "counter",
        "Failed background flushes.", m.flush_errors);
    push_metric(&mut out, "pixelvault_close_full_writes_total", "counter",
        "Full-buffer writes performed by close.", m.close_full_writes);
    push_metric(&mut out, "pixelvault_flush_pending", "gauge",
        "Whether a flush is queued or running.", store.flush_pending() as u64);

    out
}
