// Ticketmaster Discovery adapter
// GET {base}/discovery/v2/events.json?apikey=...&keyword={artist}&size=200
//
// Payload:
// { "_embedded": { "events": [
//     { "name": "...", "url": "https://www.ticketmaster.co.uk/...",
//       "dates": { "start": { "localDate": "2024-07-01", "localTime": "19:00:00" },
//                  "status": { "code": "onsale" } },
//       "_embedded": { "venues": [{ "name": "The Garage", "city": { "name": "London" } }],
//                      "attractions": [{ "name": "Example Band" }, { "name": "Support Act" }] } }
// ] }, "page": { ... } }
//
// No matches → no `_embedded` key at all.

use super::http::FetchClient;
use super::{clock_time, is_headliner, split_timestamp, EventSource, SourceKind};
use crate::record::{Record, Status};
use anyhow::{anyhow, Result};
use serde_json::Value;
use tracing::warn;

pub const DEFAULT_BASE_URL: &str = "https://app.ticketmaster.com";
const PAGE_SIZE: &str = "200";

pub struct TicketmasterSource {
    artist: String,
    api_key: Option<String>,
    base_url: String,
    client: FetchClient,
}

impl TicketmasterSource {
    pub fn new(artist: &str, api_key: Option<String>, timeout_secs: u64) -> Result<Self> {
        Ok(TicketmasterSource {
            artist: artist.to_string(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: FetchClient::new(SourceKind::Ticketmaster.name(), timeout_secs)?,
        })
    }

    /// Builder pattern: point at a different host (tests, proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl EventSource for TicketmasterSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Ticketmaster
    }

    fn fetch(&self) -> Result<Vec<Record>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("TICKETMASTER_API_KEY is not set"))?;

        let url = format!("{}/discovery/v2/events.json", self.base_url.trim_end_matches('/'));
        let body = self.client.get_json(
            &url,
            &[
                ("apikey", api_key),
                ("keyword", self.artist.as_str()),
                ("size", PAGE_SIZE),
            ],
        )?;

        parse_events(&body, &self.artist)
    }
}

/// Map a Discovery API events payload into records.
///
/// Keyword search also returns events where the artist is not billed at all
/// (tribute acts, festivals named after songs), so events whose attractions
/// do not include the artist are dropped. Events with no attractions listed
/// are kept.
pub fn parse_events(body: &Value, artist: &str) -> Result<Vec<Record>> {
    if !body.is_object() {
        return Err(anyhow!("Ticketmaster payload is not an object"));
    }

    let events = match body.pointer("/_embedded/events") {
        None => return Ok(Vec::new()),
        Some(events) => events
            .as_array()
            .ok_or_else(|| anyhow!("Ticketmaster '_embedded.events' is not an array"))?,
    };

    let mut records = Vec::with_capacity(events.len());

    for (idx, event) in events.iter().enumerate() {
        let raw_date = str_at(event, "/dates/start/localDate");
        let Some((date, _)) = split_timestamp(raw_date) else {
            warn!(source = "ticketmaster", index = idx, date = raw_date, "skipping event with unparseable date");
            continue;
        };

        let attractions: Vec<&str> = event
            .pointer("/_embedded/attractions")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|a| a.get("name").and_then(Value::as_str))
            .collect();

        if !attractions.is_empty() && !attractions.iter().any(|name| is_headliner(name, artist)) {
            continue;
        }

        let mut record = Record::new(
            SourceKind::Ticketmaster.code(),
            date,
            str_at(event, "/_embedded/venues/0/city/name"),
            str_at(event, "/_embedded/venues/0/name"),
        )
        .with_title(str_at(event, "/name"))
        .with_status(event_status(str_at(event, "/dates/status/code")))
        .with_ticket(SourceKind::Ticketmaster.name(), str_at(event, "/url"));

        if let Some(time) = clock_time(str_at(event, "/dates/start/localTime")) {
            record = record.with_time(time);
        }

        for name in attractions {
            if !is_headliner(name, artist) {
                record = record.with_support(name);
            }
        }

        records.push(record);
    }

    Ok(records)
}

fn event_status(code: &str) -> Status {
    match code {
        "onsale" => Status::OnSale,
        "offsale" => Status::SoldOut,
        "cancelled" | "canceled" => Status::Cancelled,
        _ => Status::Tba,
    }
}

fn str_at<'a>(value: &'a Value, pointer: &str) -> &'a str {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or("")
}

// ============================================================================
// TESTS
// ============================================================================
