// Bandsintown adapter
// GET {base}/artists/{artist}/events?app_id=...&date=all
//
// Payload: JSON array of events
// {
//   "datetime": "2024-07-01T19:00:00",
//   "title": "",
//   "url": "https://www.bandsintown.com/e/...",
//   "venue": { "name": "The Garage", "city": "London", "country": "United Kingdom" },
//   "lineup": ["Example Band", "Support Act"],
//   "offers": [{ "type": "Tickets", "url": "https://...", "status": "available" }]
// }

use super::http::FetchClient;
use super::{is_headliner, split_timestamp, EventSource, SourceKind};
use crate::record::{Record, Status};
use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use tracing::warn;

pub const DEFAULT_BASE_URL: &str = "https://rest.bandsintown.com";

pub struct BandsintownSource {
    artist: String,
    app_id: Option<String>,
    base_url: String,
    client: FetchClient,
}

impl BandsintownSource {
    pub fn new(artist: &str, app_id: Option<String>, timeout_secs: u64) -> Result<Self> {
        Ok(BandsintownSource {
            artist: artist.to_string(),
            app_id,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: FetchClient::new(SourceKind::Bandsintown.name(), timeout_secs)?,
        })
    }

    /// Builder pattern: point at a different host (tests, proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Builder pattern: replace the HTTP client (retry policy)
    pub fn with_client(mut self, client: FetchClient) -> Self {
        self.client = client;
        self
    }

    fn events_url(&self) -> Result<String> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .with_context(|| format!("Invalid Bandsintown base url: {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Bandsintown base url cannot take a path: {}", self.base_url))?
            .pop_if_empty()
            .extend(["artists", self.artist.as_str(), "events"]);
        Ok(url.to_string())
    }
}

impl EventSource for BandsintownSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Bandsintown
    }

    fn fetch(&self) -> Result<Vec<Record>> {
        let app_id = self
            .app_id
            .as_deref()
            .ok_or_else(|| anyhow!("BANDSINTOWN_APP_ID is not set"))?;

        let body = self
            .client
            .get_json(&self.events_url()?, &[("app_id", app_id), ("date", "all")])?;

        parse_events(&body, &self.artist)
    }
}

/// Map a Bandsintown events payload into records.
pub fn parse_events(body: &Value, artist: &str) -> Result<Vec<Record>> {
    let events = body
        .as_array()
        .ok_or_else(|| anyhow!("Bandsintown payload is not an array"))?;

    let mut records = Vec::with_capacity(events.len());

    for (idx, event) in events.iter().enumerate() {
        let raw_datetime = event.get("datetime").and_then(Value::as_str).unwrap_or("");
        let Some((date, time)) = split_timestamp(raw_datetime) else {
            warn!(source = "bandsintown", index = idx, datetime = raw_datetime, "skipping event with unparseable date");
            continue;
        };

        let venue = event.get("venue");
        let venue_name = text(venue, "name");
        let city = text(venue, "city");

        let mut record = Record::new(SourceKind::Bandsintown.code(), date, city, venue_name)
            .with_title(text(Some(event), "title"))
            .with_status(offer_status(event));

        if let Some(time) = time {
            record = record.with_time(time);
        }

        for name in event
            .get("lineup")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
        {
            if !is_headliner(name, artist) {
                record = record.with_support(name);
            }
        }

        let offer_urls: Vec<&str> = event
            .get("offers")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|offer| offer.get("url").and_then(Value::as_str))
            .filter(|url| !url.is_empty())
            .collect();

        if offer_urls.is_empty() {
            record = record.with_ticket(SourceKind::Bandsintown.name(), text(Some(event), "url"));
        } else {
            for url in offer_urls {
                record = record.with_ticket(SourceKind::Bandsintown.name(), url);
            }
        }

        records.push(record);
    }

    Ok(records)
}

/// any offer available → on_sale; offers all sold out → sold_out; else tba
fn offer_status(event: &Value) -> Status {
    let statuses: Vec<String> = event
        .get("offers")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|offer| offer.get("status").and_then(Value::as_str))
        .map(|s| s.trim().to_lowercase())
        .collect();

    if statuses.iter().any(|s| s == "available") {
        Status::OnSale
    } else if !statuses.is_empty() && statuses.iter().all(|s| s == "sold out" || s == "sold_out") {
        Status::SoldOut
    } else {
        Status::Tba
    }
}

fn text(value: Option<&Value>, key: &str) -> String {
    value
        .and_then(|v| v.get(key))
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim()
        .to_string()
}

// ============================================================================
// TESTS
// ============================================================================
