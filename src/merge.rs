// 🔀 Merger - fold a matched listing into its cluster head
//
// Precedence:
//   date / city / venue  → primary (cluster head) wins, always
//   title / time         → primary if present, else secondary
//   status               → highest severity
//   tickets              → union by (label, url), primary first, first-seen order
//   sources / supports   → set union, first-seen order
//
// Not a commutative operation: the primary is always the accumulated cluster.

use crate::record::{Record, Status, Ticket};

/// Combine the accumulated cluster head with a newly matched record.
pub fn merge(primary: &Record, secondary: &Record) -> Record {
    Record {
        id: first_non_empty(&primary.id, &secondary.id),
        date: primary.date.clone(),
        time: first_present(&primary.time, &secondary.time),
        city: primary.city.clone(),
        venue: primary.venue.clone(),
        title: first_present(&primary.title, &secondary.title),
        supports: union(&primary.supports, &secondary.supports),
        status: merge_status(primary.status, secondary.status),
        sources: union(&primary.sources, &secondary.sources),
        tickets: union_tickets(&primary.tickets, &secondary.tickets),
    }
}

/// Highest severity wins: tba < on_sale < sold_out < cancelled.
pub fn merge_status(a: Status, b: Status) -> Status {
    a.max(b)
}

fn first_present(primary: &Option<String>, secondary: &Option<String>) -> Option<String> {
    primary
        .as_ref()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| secondary.as_ref().filter(|v| !v.trim().is_empty()))
        .cloned()
}

fn first_non_empty(primary: &str, secondary: &str) -> String {
    if primary.is_empty() {
        secondary.to_string()
    } else {
        primary.to_string()
    }
}

fn union(primary: &[String], secondary: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(primary.len() + secondary.len());
    for value in primary.iter().chain(secondary) {
        if !merged.contains(value) {
            merged.push(value.clone());
        }
    }
    merged
}

fn union_tickets(primary: &[Ticket], secondary: &[Ticket]) -> Vec<Ticket> {
    let mut merged: Vec<Ticket> = Vec::with_capacity(primary.len() + secondary.len());
    for ticket in primary.iter().chain(secondary) {
        if !merged.contains(ticket) {
            merged.push(ticket.clone());
        }
    }
    merged
}

// ============================================================================
// TESTS
// ============================================================================
