//! Soroban RPC client: polls `getEvents` and decodes PostInvest events.
//!
//! ## Resilience
//!
//! * Exponential back-off is applied when the RPC returns an error or rate-limit
//!   response, up to [`MAX_BACKOFF_SECS`] seconds.
//! * Transient network errors (connection reset, timeout) are retried silently.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{EventKind, PostInvestEvent, TopicSubject};

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<EventsResult>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct EventsResult {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: Option<u64>,
}

/// One event as returned by `getEvents` with `xdrFormat: "json"`.
///
/// Topics and value arrive as the JSON rendering of `ScVal`, e.g.
/// `{"symbol":"funded"}` or `{"map":[{"key":…,"val":…}]}`.
#[derive(Debug, Deserialize, Clone)]
pub struct RawEvent {
    #[serde(rename = "topicJson", default)]
    pub topic_json: Vec<Value>,
    #[serde(rename = "valueJson", default)]
    pub value_json: Value,
    #[serde(rename = "contractId")]
    pub contract_id: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_hash: Option<String>,
    pub id: Option<String>,
    pub ledger: Option<u64>,
    #[serde(rename = "ledgerClosedAt")]
    pub ledger_closed_at: Option<String>,
    #[serde(rename = "inSuccessfulContractCall")]
    pub in_successful_contract_call: Option<bool>,
    #[serde(rename = "pagingToken")]
    pub paging_token: Option<String>,
}

// ─────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────

/// Fetch a page of events from the RPC.
///
/// * `start_ledger` — the ledger sequence to scan from (inclusive).
/// * `cursor`       — optional opaque pagination cursor from a previous response.
/// * `limit`        — maximum number of events to return.
///
/// Returns `(events, next_cursor, latest_ledger)`.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_id: &str,
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<(Vec<RawEvent>, Option<String>, Option<u64>)> {
    let mut backoff = INITIAL_BACKOFF_SECS;

    loop {
        let params = build_params(contract_id, start_ledger, cursor, limit);

        let response = client
            .post(rpc_url)
            .json(&json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "getEvents",
                "params": params,
            }))
            .send()
            .await;

        match response {
            Err(e) => {
                warn!("RPC request failed (will retry in {backoff}s): {e}");
                tokio::time::sleep(Duration::from_secs(backoff)).await;
                backoff = (backoff * 2).min(MAX_BACKOFF_SECS);
                continue;
            }
            Ok(resp) => {
                let status = resp.status();
                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    warn!("Rate-limited by RPC (will retry in {backoff}s)");
                    tokio::time::sleep(Duration::from_secs(backoff)).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF_SECS);
                    continue;
                }

                let text = resp.text().await?;
                let body: RpcResponse = serde_json::from_str(&text)?;

                if let Some(err) = body.error {
                    if is_hard_error(err.code) {
                        return Err(IndexerError::Rpc {
                            code: err.code,
                            message: err.message,
                        });
                    }
                    warn!(
                        "RPC soft error (will retry in {backoff}s): {} {}",
                        err.code, err.message
                    );
                    tokio::time::sleep(Duration::from_secs(backoff)).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF_SECS);
                    continue;
                }

                let result = body.result.ok_or_else(|| {
                    IndexerError::EventParse("Empty result from getEvents".to_string())
                })?;

                debug!(
                    "Fetched {} events (latest_ledger={:?})",
                    result.events.len(),
                    result.latest_ledger
                );

                return Ok((result.events, result.cursor, result.latest_ledger));
            }
        }
    }
}

/// Malformed requests and unknown methods will never succeed on retry.
fn is_hard_error(code: i64) -> bool {
    matches!(code, -32600 | -32601 | -32602)
}

fn build_params(contract_id: &str, start_ledger: u32, cursor: Option<&str>, limit: u32) -> Value {
    let mut params = json!({
        "filters": [
            {
                "type": "contract",
                "contractIds": [contract_id]
            }
        ],
        "pagination": {
            "limit": limit
        },
        "xdrFormat": "json"
    });

    if let Some(cur) = cursor {
        params["pagination"]["cursor"] = json!(cur);
    } else {
        params["startLedger"] = json!(start_ledger);
    }

    params
}

// ─────────────────────────────────────────────────────────
// Event decoding
// ─────────────────────────────────────────────────────────

/// Decode a list of raw RPC events into [`PostInvestEvent`] structs.
///
/// Events from failed contract calls, and events without a JSON topic list,
/// are dropped.
pub fn decode_events(raw: &[RawEvent], contract_id: &str) -> Vec<PostInvestEvent> {
    raw.iter()
        .filter(|e| e.in_successful_contract_call.unwrap_or(true))
        .filter_map(|e| decode_single(e, contract_id))
        .collect()
}

fn decode_single(raw: &RawEvent, contract_id: &str) -> Option<PostInvestEvent> {
    let topics: Vec<Value> = raw.topic_json.iter().map(scval_to_plain).collect();
    let Some(symbol) = topics.first().and_then(Value::as_str) else {
        warn!("Skipping event {:?}: no symbol topic", raw.id);
        return None;
    };
    let kind = EventKind::from_topic(symbol);

    let ledger = raw.ledger.unwrap_or(0) as i64;
    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);

    let subject_id = topics.get(1).and_then(plain_to_string);
    let (mut project_id, story_id) = match kind.subject() {
        TopicSubject::Project => (subject_id, None),
        TopicSubject::Story => (None, subject_id),
        TopicSubject::Pool => (None, None),
    };

    let decoded = decode_data(&scval_to_plain(&raw.value_json), kind);
    if project_id.is_none() {
        project_id = decoded.project_id;
    }

    Some(PostInvestEvent {
        event_key: event_key(raw, kind, ledger, &topics),
        event_type: kind.as_str().to_string(),
        project_id,
        story_id,
        actor: decoded.actor,
        amount: decoded.amount,
        ledger,
        timestamp,
        contract_id: raw
            .contract_id
            .clone()
            .unwrap_or_else(|| contract_id.to_string()),
        tx_hash: raw.tx_hash.clone(),
    })
}

/// The RPC event id is unique per event; older nodes only send a paging token.
fn event_key(raw: &RawEvent, kind: EventKind, ledger: i64, topics: &[Value]) -> String {
    raw.id
        .clone()
        .or_else(|| raw.paging_token.clone())
        .unwrap_or_else(|| {
            let topics: Vec<String> = topics.iter().map(Value::to_string).collect();
            format!(
                "{ledger}-{}-{}-{}",
                raw.tx_hash.as_deref().unwrap_or("-"),
                kind.as_str(),
                topics.join("|")
            )
        })
}

/// Flatten the JSON form of an `ScVal` into plain JSON.
///
/// Scalars keep their inner value, `map` becomes an object keyed by the
/// flattened key, `vec` becomes an array. Anything unrecognised is kept as is.
fn scval_to_plain(value: &Value) -> Value {
    let Value::Object(map) = value else {
        return value.clone();
    };
    let mut entries = map.iter();
    let (Some((tag, inner)), None) = (entries.next(), entries.next()) else {
        return value.clone();
    };

    match tag.as_str() {
        "map" => {
            let mut out = serde_json::Map::new();
            for entry in inner.as_array().into_iter().flatten() {
                let (Some(k), Some(v)) = (entry.get("key"), entry.get("val")) else {
                    continue;
                };
                if let Some(key) = plain_to_string(&scval_to_plain(k)) {
                    out.insert(key, scval_to_plain(v));
                }
            }
            Value::Object(out)
        }
        "vec" => match inner {
            Value::Array(items) => Value::Array(items.iter().map(scval_to_plain).collect()),
            _ => Value::Null,
        },
        "i128" | "u128" => match parts_to_decimal(inner, tag == "i128") {
            Some(n) => Value::String(n),
            None => inner.clone(),
        },
        "bool" | "symbol" | "string" | "address" | "bytes" | "u32" | "i32" | "u64" | "i64"
        | "u256" | "i256" | "timepoint" | "duration" => inner.clone(),
        _ => value.clone(),
    }
}

/// 128-bit integers may be rendered as `{"hi":…,"lo":…}` instead of a decimal string.
fn parts_to_decimal(inner: &Value, signed: bool) -> Option<String> {
    let part = |key: &str| -> Option<u64> {
        let v = inner.get(key)?;
        v.as_u64()
            .or_else(|| v.as_i64().map(|n| n as u64))
            .or_else(|| v.as_str()?.parse::<u64>().ok())
            .or_else(|| v.as_str()?.parse::<i64>().ok().map(|n| n as u64))
    };
    let (hi, lo) = (part("hi")?, part("lo")?);
    let bits = (u128::from(hi) << 64) | u128::from(lo);
    Some(if signed {
        (bits as i128).to_string()
    } else {
        bits.to_string()
    })
}

fn plain_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[derive(Debug, Default)]
struct DecodedData {
    actor: Option<String>,
    amount: Option<String>,
    project_id: Option<String>,
}

/// Pick actor, amount and project id out of a flattened `#[contracttype]` payload.
fn decode_data(value: &Value, kind: EventKind) -> DecodedData {
    let field = |key: &str| value.get(key).and_then(plain_to_string);

    match kind {
        EventKind::FundsReceived => DecodedData {
            actor: field("funder"),
            amount: field("amount"),
            ..Default::default()
        },
        EventKind::DarfRedeemed => DecodedData {
            actor: field("holder"),
            amount: field("payout"),
            ..Default::default()
        },
        EventKind::ConditionsChanged => DecodedData {
            amount: field("exchange_rate"),
            ..Default::default()
        },
        EventKind::ProjectOwnerSet => DecodedData {
            actor: field("user"),
            ..Default::default()
        },
        EventKind::ProjectCreated => DecodedData {
            actor: field("owner"),
            ..Default::default()
        },
        EventKind::RightsUpdated => DecodedData {
            amount: field("tiers"),
            ..Default::default()
        },
        EventKind::StoryCreated => DecodedData {
            actor: field("author"),
            amount: field("amount"),
            project_id: field("project_id"),
        },
        EventKind::StoryAccepted | EventKind::StoryEndConfirmed => DecodedData {
            actor: field("owner"),
            ..Default::default()
        },
        EventKind::StorySigned => DecodedData {
            actor: field("signer"),
            ..Default::default()
        },
        EventKind::StoryPaidOut => DecodedData {
            actor: field("recipient"),
            amount: field("amount"),
            ..Default::default()
        },
        EventKind::RefundRequested => DecodedData {
            actor: field("author"),
            amount: field("amount"),
            ..Default::default()
        },
        EventKind::ProjectUpdated | EventKind::StoryStarted | EventKind::Unknown => {
            DecodedData::default()
        }
    }
}

/// Parse an ISO-8601 timestamp string into a Unix epoch (seconds).
fn parse_iso_to_unix(s: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
