// Songkick adapter
// GET {base}/api/3.0/artists/{artist_id}/calendar.json?apikey=...
//
// Payload:
// { "resultsPage": { "status": "ok", "results": { "event": [
//     { "displayName": "...", "status": "ok", "uri": "https://www.songkick.com/concerts/...",
//       "start": { "date": "2024-07-01", "time": "19:30:00", "datetime": "2024-07-01T19:30:00+0100" },
//       "venue": { "displayName": "The Garage", "metroArea": { "displayName": "London" } },
//       "location": { "city": "London, UK" },
//       "performance": [{ "displayName": "Support Act", "billing": "support" }] }
// ] } } }
//
// An artist with no dates comes back with `"results": {}`.

use super::http::FetchClient;
use super::{clock_time, is_headliner, split_timestamp, EventSource, SourceKind};
use crate::record::{Record, Status};
use anyhow::{anyhow, Result};
use serde_json::Value;
use tracing::warn;

pub const DEFAULT_BASE_URL: &str = "https://api.songkick.com";

pub struct SongkickSource {
    artist: String,
    api_key: Option<String>,
    artist_id: Option<String>,
    base_url: String,
    client: FetchClient,
}

impl SongkickSource {
    pub fn new(
        artist: &str,
        api_key: Option<String>,
        artist_id: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        Ok(SongkickSource {
            artist: artist.to_string(),
            api_key,
            artist_id,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: FetchClient::new(SourceKind::Songkick.name(), timeout_secs)?,
        })
    }

    /// Builder pattern: point at a different host (tests, proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl EventSource for SongkickSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Songkick
    }

    fn fetch(&self) -> Result<Vec<Record>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("SONGKICK_API_KEY is not set"))?;
        let artist_id = self
            .artist_id
            .as_deref()
            .ok_or_else(|| anyhow!("SONGKICK_ARTIST_ID is not set"))?;

        let url = format!(
            "{}/api/3.0/artists/{}/calendar.json",
            self.base_url.trim_end_matches('/'),
            artist_id
        );
        let body = self.client.get_json(&url, &[("apikey", api_key)])?;

        parse_calendar(&body, &self.artist)
    }
}

/// Map a Songkick calendar payload into records.
pub fn parse_calendar(body: &Value, artist: &str) -> Result<Vec<Record>> {
    let page = body
        .get("resultsPage")
        .ok_or_else(|| anyhow!("Songkick payload missing 'resultsPage'"))?;

    if let Some(status) = page.get("status").and_then(Value::as_str) {
        if status != "ok" {
            return Err(anyhow!("Songkick returned status '{}'", status));
        }
    }

    let events = match page.pointer("/results/event") {
        None => return Ok(Vec::new()),
        Some(events) => events
            .as_array()
            .ok_or_else(|| anyhow!("Songkick 'results.event' is not an array"))?,
    };

    let mut records = Vec::with_capacity(events.len());

    for (idx, event) in events.iter().enumerate() {
        let start = event.get("start");
        let raw_date = str_at(start, "/date");
        let Some((date, _)) = split_timestamp(raw_date) else {
            warn!(source = "songkick", index = idx, date = raw_date, "skipping event with unparseable date");
            continue;
        };

        let venue = str_at(Some(event), "/venue/displayName");
        let city = match str_at(Some(event), "/venue/metroArea/displayName") {
            "" => str_at(Some(event), "/location/city")
                .split(',')
                .next()
                .unwrap_or("")
                .trim(),
            metro => metro,
        };

        let mut record = Record::new(SourceKind::Songkick.code(), date, city, venue)
            .with_title(str_at(Some(event), "/displayName"))
            .with_status(event_status(str_at(Some(event), "/status")))
            .with_ticket(SourceKind::Songkick.name(), str_at(Some(event), "/uri"));

        if let Some(time) = clock_time(str_at(start, "/time")) {
            record = record.with_time(time);
        }

        for performance in event
            .get("performance")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
        {
            let name = performance
                .get("displayName")
                .and_then(Value::as_str)
                .unwrap_or("");
            let billing = performance.get("billing").and_then(Value::as_str).unwrap_or("");
            if billing == "support" && !is_headliner(name, artist) {
                record = record.with_support(name);
            }
        }

        records.push(record);
    }

    Ok(records)
}

/// cancelled → cancelled; postponed → tba; anything else (normally "ok") → on_sale
fn event_status(status: &str) -> Status {
    match status {
        "cancelled" => Status::Cancelled,
        "postponed" => Status::Tba,
        _ => Status::OnSale,
    }
}

fn str_at<'a>(value: Option<&'a Value>, pointer: &str) -> &'a str {
    value
        .and_then(|v| v.pointer(pointer))
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or("")
}

// ============================================================================
// TESTS
// ============================================================================
