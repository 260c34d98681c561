//! Integration tests for the advertisement directory.
//!
//! These run the directory service on paused tokio time so that TTL expiry
//! and the apply timer can be observed at exact offsets.
//!
//! Run with: `cargo test --test directory_integration`

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use geowindow::clock::TokioClock;
use geowindow::directory::{
    AdvertiserHandle, Contact, ConsumerView, DirectoryService, DirectoryServiceConfig,
    DirectorySnapshot,
};
use geowindow::pubsub::StateField;

// ============================================================================
// Helper Functions
// ============================================================================

struct Running {
    advertiser: AdvertiserHandle,
    directory: StateField<DirectorySnapshot>,
    shutdown: CancellationToken,
    task: tokio::task::JoinHandle<geowindow::directory::DirectoryResult<()>>,
}

fn start_directory(apply_ms: u64) -> Running {
    let config = DirectoryServiceConfig::new(Duration::from_millis(apply_ms));
    let (service, advertiser) = DirectoryService::new(config, TokioClock::new());
    let directory = service.directory_field();
    let shutdown = CancellationToken::new();
    let task = tokio::spawn(service.run(shutdown.clone()));
    Running {
        advertiser,
        directory,
        shutdown,
        task,
    }
}

async fn sleep_until_ms(start: tokio::time::Instant, ms: u64) {
    tokio::time::sleep_until(start + Duration::from_millis(ms)).await;
}

fn city() -> Contact {
    Contact::new("10.1.1.1:4100", "city")
}

// ============================================================================
// Integration Tests
// ============================================================================

/// An advertisement with a 1000 ms TTL on a 100 ms apply timer is visible
/// after the first apply and gone within one period after it expires.
#[tokio::test(start_paused = true)]
async fn test_ttl_expiry_within_one_apply_period() {
    let start = tokio::time::Instant::now();
    let running = start_directory(100);

    running
        .advertiser
        .advertise(city(), "City names", Some(1000))
        .await
        .unwrap();

    sleep_until_ms(start, 50).await;
    assert!(running.directory.get().is_empty(), "not applied yet");

    sleep_until_ms(start, 150).await;
    assert!(running.directory.get().contains_key(&city()));

    sleep_until_ms(start, 950).await;
    assert!(running.directory.get().contains_key(&city()));

    sleep_until_ms(start, 1150).await;
    assert!(
        !running.directory.get().contains_key(&city()),
        "expired entry must be gone one apply period after its TTL"
    );

    running.shutdown.cancel();
    running.task.await.unwrap().unwrap();
}

/// Re-advertising before expiry extends the entry.
#[tokio::test(start_paused = true)]
async fn test_renewal_extends_ttl() {
    let start = tokio::time::Instant::now();
    let running = start_directory(100);

    running
        .advertiser
        .advertise(city(), "v1", Some(500))
        .await
        .unwrap();

    sleep_until_ms(start, 350).await;
    running
        .advertiser
        .advertise(city(), "v2", Some(500))
        .await
        .unwrap();

    sleep_until_ms(start, 750).await;
    let snapshot = running.directory.get();
    assert_eq!(snapshot.get(&city()).map(String::as_str), Some("v2"));

    sleep_until_ms(start, 1000).await;
    assert!(running.directory.get().is_empty());

    running.shutdown.cancel();
    running.task.await.unwrap().unwrap();
}

/// Several advertisements within one period are published together.
#[tokio::test(start_paused = true)]
async fn test_batched_publication() {
    let start = tokio::time::Instant::now();
    let running = start_directory(200);
    let mut subscriber = running.directory.subscribe();

    let raster = Contact::new("10.1.1.2:4100", "raster");
    running.advertiser.advertise(city(), "a", Some(10_000)).await.unwrap();
    running.advertiser.advertise(raster.clone(), "b", Some(10_000)).await.unwrap();

    let published = subscriber.changed().await.unwrap();
    assert_eq!(published.len(), 2);
    assert!(tokio::time::Instant::now() - start >= Duration::from_millis(200));

    running.shutdown.cancel();
    running.task.await.unwrap().unwrap();
}

/// A consumer sees additions and removals as maps.
#[tokio::test(start_paused = true)]
async fn test_consumer_view_tracks_directory() {
    let start = tokio::time::Instant::now();
    let running = start_directory(100);

    let (mut view, initial) = ConsumerView::initial(&running.directory.get());
    assert!(initial.is_empty());

    running.advertiser.advertise(city(), "City names", Some(300)).await.unwrap();

    sleep_until_ms(start, 150).await;
    let change = view.update(&running.directory.get());
    assert_eq!(change.added.get(&city()).map(String::as_str), Some("City names"));
    assert!(change.removed.is_empty());

    sleep_until_ms(start, 450).await;
    let change = view.update(&running.directory.get());
    assert!(change.added.is_empty());
    assert!(change.removed.contains_key(&city()));
    assert!(view.known().is_empty());

    running.shutdown.cancel();
    running.task.await.unwrap().unwrap();
}
