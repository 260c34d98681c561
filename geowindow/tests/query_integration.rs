//! Integration tests for query sessions over the lookup and orbital sources.
//!
//! Run with: `cargo test --test query_integration`

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use tempfile::NamedTempFile;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use geowindow::clock::TokioClock;
use geowindow::lookup::{RasterLookup, SetDiffQueryable};
use geowindow::orbital::{parse_catalog, satellite_objects, CalcDb};
use geowindow::spatiotemporal::{field_names, fields, FieldValue, ResultHandle, Vector3d};
use geowindow::store::StorePool;
use geowindow::view::{QueryService, QueryServiceConfig, QuerySession, SessionUpdate, WindowUpdate};

// ============================================================================
// Fixtures
// ============================================================================

const RASTER_CATALOG: &str = r#"{
  "layers": {
    "raster": [
      { "name": "dc_sw", "geometry": { "bounds": { "south": 37.99, "west": -77.01, "north": 38.0, "east": -77.0 } } },
      { "name": "dc_ne", "geometry": { "bounds": { "south": 38.0, "west": -77.0, "north": 38.01, "east": -76.99 } } },
      { "name": "richmond", "geometry": { "bounds": { "south": 37.5, "west": -77.5, "north": 37.6, "east": -77.4 } } }
    ]
  }
}"#;

const SATELLITE_CATALOG: &str = r#"{
  "satellites": [
    {
      "catalog_number": "25544",
      "name": "ISS",
      "owner": "ISS",
      "mission": "crewed station",
      "elements": {
        "epoch": "2024-01-01T00:00:00Z",
        "inclination_deg": 51.64,
        "raan_deg": 200.0,
        "eccentricity": 0.0005,
        "arg_perigee_deg": 90.0,
        "mean_anomaly_deg": 0.0,
        "mean_motion": 15.5
      }
    },
    {
      "catalog_number": "41866",
      "name": "GOES-16",
      "owner": "NOAA",
      "mission": "weather",
      "elements": {
        "epoch": "2024-01-01T00:00:00Z",
        "inclination_deg": 0.05,
        "raan_deg": 90.0,
        "eccentricity": 0.0001,
        "arg_perigee_deg": 0.0,
        "mean_anomaly_deg": 10.0,
        "mean_motion": 1.0027
      }
    }
  ]
}"#;

fn write_catalog(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

fn drain(updates: &mut broadcast::Receiver<SessionUpdate>) -> Vec<SessionUpdate> {
    let mut out = Vec::new();
    while let Ok(update) = updates.try_recv() {
        out.push(update);
    }
    out
}

// ============================================================================
// Lookup sources
// ============================================================================

/// A window centered on (38, -77) with width 0.01 finds the two raster tiles
/// touching that corner, with only the requested fields.
#[test]
fn test_raster_first_query_reports_everything_added() {
    let catalog = write_catalog(RASTER_CATALOG);
    let pool = StorePool::new();
    let store = pool.open(&catalog.path().to_string_lossy()).unwrap();
    let raster = SetDiffQueryable::new("raster", store, RasterLookup::new());

    let mut session = QuerySession::new();
    session.set_position(Vector3d::new(38.0, -77.0, 0.0)).unwrap();
    session.set_width(Vector3d::new(0.01, 0.01, 0.0)).unwrap();
    session.set_fields(field_names([fields::MAPNAME, fields::NORTH, fields::EAST]));

    let diff = session.refresh(&raster, Utc::now()).unwrap();
    assert_eq!(&diff.added, session.results());
    assert!(diff.removed.is_empty());
    assert!(diff.changed.is_empty());

    assert!(diff.added.contains(&ResultHandle::keyed("dc_sw")));
    assert!(diff.added.contains(&ResultHandle::keyed("dc_ne")));
    assert!(!diff.added.contains(&ResultHandle::keyed("richmond")));

    for handle in &diff.added {
        assert_eq!(handle.fields().len(), 3);
        assert!(handle.field(fields::SOUTH).is_none());
    }

    // Same window again: nothing to publish.
    assert!(session.refresh(&raster, Utc::now()).is_none());
}

/// Moving the window reports the tiles that left and arrived.
#[test]
fn test_raster_move_reports_removed() {
    let catalog = write_catalog(RASTER_CATALOG);
    let pool = StorePool::new();
    let store = pool.open(&catalog.path().to_string_lossy()).unwrap();
    let raster = SetDiffQueryable::new("raster", store, RasterLookup::new());

    let mut session = QuerySession::new();
    session.set_position(Vector3d::new(38.0, -77.0, 0.0)).unwrap();
    session.set_width(Vector3d::new(0.01, 0.01, 0.0)).unwrap();
    session.set_fields(field_names([fields::MAPNAME]));
    session.refresh(&raster, Utc::now());

    session.set_position(Vector3d::new(37.55, -77.45, 0.0)).unwrap();
    let diff = session.refresh(&raster, Utc::now()).unwrap();
    assert_eq!(diff.added.len(), 1);
    assert!(diff.added.contains(&ResultHandle::keyed("richmond")));
    assert_eq!(diff.removed.len(), 2);
}

// ============================================================================
// Orbital source
// ============================================================================

/// A satellite client gets everything added first, periodic changes as the
/// objects fall due, and removals after the catalog shrinks.
#[tokio::test(start_paused = true)]
async fn test_orbital_service_lifecycle() {
    let origin = std::path::Path::new("inline");
    let satellites = parse_catalog(SATELLITE_CATALOG, origin).unwrap();
    let db = Arc::new(CalcDb::new("satellite", satellite_objects(satellites)));

    let epoch = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap();
    let config = QueryServiceConfig::default().with_poll_interval(Duration::from_secs(1));
    let (service, handle) =
        QueryService::new(Arc::clone(&db), config, TokioClock::starting_at(epoch));
    let shutdown = CancellationToken::new();
    let task = tokio::spawn(service.run(shutdown.clone()));
    let mut updates = handle.subscribe();

    handle.connect(1).await.unwrap();
    handle
        .update(
            1,
            WindowUpdate::default()
                .position(Vector3d::new(0.0, -75.0, 0.0))
                .width(Vector3d::new(10.0, 10.0, 0.0))
                .fields(field_names([fields::POSITION, fields::MAPNAME])),
        )
        .await
        .unwrap();

    let first = updates.recv().await.unwrap();
    assert_eq!(first.diff.added.len(), 2);
    assert!(first.diff.removed.is_empty());
    let names: Vec<_> = first
        .diff
        .added
        .iter()
        .filter_map(|h| match h.field(fields::MAPNAME) {
            Some(FieldValue::Text(name)) => Some(name.clone()),
            _ => None,
        })
        .collect();
    assert!(names.contains(&"ISS:ISS".to_string()));
    assert!(names.contains(&"NOAA:GOES-16".to_string()));

    // Every object is recomputed at least once a minute.
    tokio::time::sleep(Duration::from_secs(61)).await;
    let later = drain(&mut updates);
    assert!(later.iter().any(|u| !u.diff.changed.is_empty()));
    assert!(later.iter().all(|u| u.diff.removed.is_empty()));

    // Drop GOES-16 from the catalog.
    let remaining = parse_catalog(SATELLITE_CATALOG, origin)
        .unwrap()
        .into_iter()
        .filter(|s| s.name() == "ISS")
        .collect();
    db.reload(satellite_objects(remaining));

    tokio::time::sleep(Duration::from_millis(1500)).await;
    let after_reload = drain(&mut updates);
    let removed: usize = after_reload.iter().map(|u| u.diff.removed.len()).sum();
    assert_eq!(removed, 1);

    let snapshot = handle.snapshot(1).await.unwrap().unwrap();
    assert_eq!(snapshot.added.len(), 1);

    shutdown.cancel();
    task.await.unwrap();
}
