// 🎫 Event Record - the common shape every source produces
// Canonical events are the same shape after merging.
//
// Field order here IS the output field order. Optional fields serialize as
// null (never omitted) so consumers can parse every object the same way.

use serde::{Deserialize, Serialize};

// ============================================================================
// STATUS
// ============================================================================

/// Ticket availability, ordered by severity (`Cancelled` highest).
///
/// The derived `Ord` follows declaration order, which is the severity scale
/// used when merging: tba(0) < on_sale(1) < sold_out(2) < cancelled(3).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Tba,
    OnSale,
    SoldOut,
    Cancelled,
}

impl Status {
    /// Parse the wire code; unknown or blank values fall back to `Tba`.
    pub fn from_code(code: &str) -> Status {
        match code.trim().to_lowercase().as_str() {
            "on_sale" | "onsale" => Status::OnSale,
            "sold_out" | "soldout" => Status::SoldOut,
            "cancelled" | "canceled" => Status::Cancelled,
            _ => Status::Tba,
        }
    }
}

// ============================================================================
// TICKET
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticket {
    pub label: String,
    pub url: String,
}

impl Ticket {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Ticket {
            label: label.into(),
            url: url.into(),
        }
    }
}

// ============================================================================
// RECORD
// ============================================================================

/// One source's listing of one event occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Empty at source output; assigned by the catalog builder
    pub id: String,

    /// ISO `YYYY-MM-DD`, taken from the source timestamp as written
    pub date: String,

    /// Local clock time `HH:MM`
    pub time: Option<String>,

    pub city: String,
    pub venue: String,
    pub title: Option<String>,

    /// Opening acts (set semantics, first-seen order)
    pub supports: Vec<String>,

    pub status: Status,

    /// Source codes that reported this event (set semantics, first-seen order)
    pub sources: Vec<String>,

    pub tickets: Vec<Ticket>,
}

/// A record after clustering and merging.
pub type CanonicalEvent = Record;

impl Record {
    /// Create a record with the required fields; everything else starts empty.
    pub fn new(
        source: impl Into<String>,
        date: impl Into<String>,
        city: impl Into<String>,
        venue: impl Into<String>,
    ) -> Self {
        Record {
            id: String::new(),
            date: date.into(),
            time: None,
            city: city.into(),
            venue: venue.into(),
            title: None,
            supports: Vec::new(),
            status: Status::Tba,
            sources: vec![source.into()],
            tickets: Vec::new(),
        }
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    /// Blank titles are treated as absent.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        self.title = if title.trim().is_empty() { None } else { Some(title) };
        self
    }

    /// Adds an opening act unless it is blank or already listed.
    pub fn with_support(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.trim().is_empty() && !self.supports.contains(&name) {
            self.supports.push(name);
        }
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Adds a purchase link unless the url is blank or the pair is already listed.
    pub fn with_ticket(mut self, label: impl Into<String>, url: impl Into<String>) -> Self {
        let ticket = Ticket::new(label, url);
        if !ticket.url.trim().is_empty() && !self.tickets.contains(&ticket) {
            self.tickets.push(ticket);
        }
        self
    }

    pub fn is_upcoming(&self, today: &str) -> bool {
        self.date.as_str() >= today
    }
}

// ============================================================================
// TESTS
// ============================================================================
