// End-to-end refresh tests: real adapters against mock upstreams, plus
// in-memory sources for the reconciliation scenarios.

use anyhow::Result;
use gig_catalog::output::{read_events, EVENTS_FILE, MANIFEST_FILE, PAST_FILE, UPCOMING_FILE};
use gig_catalog::{
    BandsintownSource, EventSource, ManualSource, OutputManifest, Pipeline, Record, SongkickSource,
    SourceKind, Status, TicketmasterSource,
};
use httpmock::prelude::*;
use serde_json::json;
use std::fs;
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

struct StaticSource {
    kind: SourceKind,
    records: Vec<Record>,
}

impl EventSource for StaticSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn fetch(&self) -> Result<Vec<Record>> {
        Ok(self.records.clone())
    }
}

struct BrokenSource;

impl EventSource for BrokenSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Songkick
    }

    fn fetch(&self) -> Result<Vec<Record>> {
        anyhow::bail!("connection refused")
    }
}

fn static_source(kind: SourceKind, records: Vec<Record>) -> Box<dyn EventSource> {
    Box::new(StaticSource { kind, records })
}

#[test]
fn test_two_sources_reconcile_into_one_event() {
    let dir = tempdir().unwrap();
    let sources = vec![
        static_source(
            SourceKind::Bandsintown,
            vec![Record::new("A", "2024-07-01", "London", "The Garage").with_ticket("A", "u1")],
        ),
        static_source(
            SourceKind::Songkick,
            vec![Record::new("B", "2024-07-01", "london", "The Garage ").with_ticket("B", "u2")],
        ),
    ];

    let summary = Pipeline::new(sources, dir.path())
        .with_today("2024-06-15")
        .run()
        .unwrap();

    assert_eq!(summary.total(), 1);
    let event = &summary.catalog.all[0];
    assert_eq!(event.id, "2024-07-01-london-the-garage");
    assert_eq!(event.sources, vec!["A".to_string(), "B".to_string()]);
    let urls: Vec<&str> = event.tickets.iter().map(|t| t.url.as_str()).collect();
    assert_eq!(urls, vec!["u1", "u2"]);

    let written = read_events(&dir.path().join(UPCOMING_FILE)).unwrap();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].id, "2024-07-01-london-the-garage");
}

#[test]
fn test_typo_in_venue_still_reconciles() {
    let dir = tempdir().unwrap();
    let sources = vec![
        static_source(
            SourceKind::Bandsintown,
            vec![Record::new("bandsintown", "2024-07-01", "London", "Electric Ballroom")],
        ),
        static_source(
            SourceKind::Ticketmaster,
            vec![Record::new("ticketmaster", "2024-07-01", "London", "Electic Ballrom")],
        ),
    ];

    let summary = Pipeline::new(sources, dir.path())
        .with_today("2024-06-15")
        .run()
        .unwrap();

    assert_eq!(summary.total(), 1);
    assert_eq!(summary.catalog.all[0].venue, "Electric Ballroom");
}

#[test]
fn test_failing_source_contributes_nothing() {
    let dir = tempdir().unwrap();
    let sources: Vec<Box<dyn EventSource>> = vec![
        static_source(
            SourceKind::Bandsintown,
            vec![Record::new("bandsintown", "2024-07-01", "London", "The Garage")],
        ),
        Box::new(BrokenSource),
    ];

    let summary = Pipeline::new(sources, dir.path())
        .with_today("2024-06-15")
        .run()
        .unwrap();

    assert_eq!(summary.total(), 1);
    assert_eq!(
        summary.per_source,
        vec![("bandsintown".to_string(), 1), ("songkick".to_string(), 0)]
    );
}

#[test]
fn test_all_sources_empty_still_writes_empty_artifacts() {
    let dir = tempdir().unwrap();
    let sources: Vec<Box<dyn EventSource>> = vec![Box::new(BrokenSource)];

    let summary = Pipeline::new(sources, dir.path())
        .with_today("2024-06-15")
        .run()
        .unwrap();

    assert_eq!(summary.total(), 0);
    for name in [EVENTS_FILE, UPCOMING_FILE, PAST_FILE] {
        let text = fs::read_to_string(dir.path().join(name)).unwrap();
        assert_eq!(text.trim(), "[]");
    }
}

#[test]
fn test_partition_boundary_is_inclusive() {
    let dir = tempdir().unwrap();
    let sources = vec![static_source(
        SourceKind::Manual,
        vec![
            Record::new("manual", "2024-06-14", "Leeds", "Brudenell"),
            Record::new("manual", "2024-06-15", "London", "The Garage"),
            Record::new("manual", "2024-06-01", "Bristol", "Thekla"),
        ],
    )];

    let summary = Pipeline::new(sources, dir.path())
        .with_today("2024-06-15")
        .run()
        .unwrap();

    let upcoming = read_events(&dir.path().join(UPCOMING_FILE)).unwrap();
    let past = read_events(&dir.path().join(PAST_FILE)).unwrap();

    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].date, "2024-06-15");
    let past_dates: Vec<&str> = past.iter().map(|e| e.date.as_str()).collect();
    assert_eq!(past_dates, vec!["2024-06-14", "2024-06-01"]);

    let manifest: OutputManifest =
        serde_json::from_str(&fs::read_to_string(dir.path().join(MANIFEST_FILE)).unwrap()).unwrap();
    assert_eq!(manifest.run_id, summary.run_id);
    assert_eq!(manifest.files.len(), 3);
}

#[test]
fn test_refresh_against_mock_upstreams() {
    let server = MockServer::start();

    let bandsintown = server.mock(|when, then| {
        when.method(GET)
            .path("/artists/ExampleBand/events")
            .query_param("app_id", "bit-app");
        then.status(200).json_body(json!([
            {
                "datetime": "2024-07-01T19:30:00",
                "url": "https://www.bandsintown.com/e/1",
                "venue": { "name": "The Garage", "city": "London" },
                "lineup": ["ExampleBand", "Support Act"],
                "offers": [{ "type": "Tickets", "url": "https://tickets.example/1", "status": "available" }]
            }
        ]));
    });

    let songkick = server.mock(|when, then| {
        when.method(GET).path("/api/3.0/artists/42/calendar.json");
        then.status(401).body("invalid api key");
    });

    let ticketmaster = server.mock(|when, then| {
        when.method(GET).path("/discovery/v2/events.json");
        then.status(200).json_body(json!({
            "_embedded": { "events": [
                {
                    "name": "ExampleBand",
                    "url": "https://tm.example/1",
                    "dates": {
                        "start": { "localDate": "2024-07-01", "localTime": "19:00:00" },
                        "status": { "code": "offsale" }
                    },
                    "_embedded": {
                        "venues": [{ "name": "The Garage", "city": { "name": "London" } }],
                        "attractions": [{ "name": "ExampleBand" }]
                    }
                }
            ] }
        }));
    });

    let mut csv = NamedTempFile::new().unwrap();
    csv.write_all(
        b"date,time,city,venue,title,supports,status,ticket_label,ticket_url\n\
          2024-05-20,20:00,Bristol,Thekla,,,on_sale,,https://thekla.example/1\n",
    )
    .unwrap();
    csv.flush().unwrap();

    let sources: Vec<Box<dyn EventSource>> = vec![
        Box::new(
            BandsintownSource::new("ExampleBand", Some("bit-app".into()), 5)
                .unwrap()
                .with_base_url(server.base_url()),
        ),
        Box::new(
            SongkickSource::new("ExampleBand", Some("bad-key".into()), Some("42".into()), 5)
                .unwrap()
                .with_base_url(server.base_url()),
        ),
        Box::new(
            TicketmasterSource::new("ExampleBand", Some("tm-key".into()), 5)
                .unwrap()
                .with_base_url(server.base_url()),
        ),
        Box::new(ManualSource::new("ExampleBand", Some(csv.path().to_path_buf()))),
    ];

    let out = tempdir().unwrap();
    let summary = Pipeline::new(sources, out.path())
        .with_today("2024-06-15")
        .run()
        .unwrap();

    bandsintown.assert();
    songkick.assert();
    ticketmaster.assert();

    assert_eq!(
        summary.per_source,
        vec![
            ("bandsintown".to_string(), 1),
            ("songkick".to_string(), 0),
            ("ticketmaster".to_string(), 1),
            ("manual".to_string(), 1),
        ]
    );
    assert_eq!(summary.total(), 2);

    let garage = &summary.catalog.upcoming[0];
    assert_eq!(garage.id, "2024-07-01-london-the-garage");
    assert_eq!(garage.time.as_deref(), Some("19:30"));
    assert_eq!(garage.status, Status::SoldOut);
    assert_eq!(garage.supports, vec!["Support Act".to_string()]);
    assert_eq!(
        garage.sources,
        vec!["bandsintown".to_string(), "ticketmaster".to_string()]
    );
    assert_eq!(garage.tickets.len(), 2);

    let thekla = &summary.catalog.past[0];
    assert_eq!(thekla.id, "2024-05-20-bristol-thekla");
    assert_eq!(thekla.tickets[0].label, "Box Office");
}
