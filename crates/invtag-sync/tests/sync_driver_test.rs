//! Sync driver behaviour against the in-memory store and a wiremock server.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use invtag_client::mock::MockRecordStore;
use invtag_client::{ClientConfig, HttpRecordStore};
use invtag_core::{Record, RecordStore, StoreError, TagInferencer};
use invtag_sync::{SyncDecision, SyncDriver, SyncError, SyncOptions};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn driver(store: &MockRecordStore) -> SyncDriver<MockRecordStore> {
    SyncDriver::new(Arc::new(store.clone()), Arc::new(TagInferencer::default()))
}

fn catalog() -> Vec<Record> {
    vec![
        Record::new("a")
            .with_category("Jewelry")
            .with_brand("Rolex")
            .with_description("14k gold ring"),
        Record::new("b")
            .with_category("Tools")
            .with_brand("Unknown")
            .with_condition("Good")
            .with_description("cordless drill"),
        Record::new("c").with_category("Jewellery").with_tags(["Rings"]),
    ]
}

#[tokio::test]
async fn test_second_run_writes_nothing() {
    let store = MockRecordStore::new(catalog());
    let driver = driver(&store);

    let first = driver.run(&SyncOptions::default()).await.unwrap();
    assert_eq!(first.loaded, 3);
    assert_eq!(first.updated, 3);
    assert_eq!(first.skipped, 0);
    assert_eq!(store.patch_call_count(), 3);
    assert_eq!(
        store.tags_of("a").unwrap(),
        vec!["jewelry", "rolex", "gold", "ring"]
    );
    assert_eq!(store.tags_of("c").unwrap(), vec!["jewelry", "ring"]);

    let second = driver.run(&SyncOptions::default()).await.unwrap();
    assert_eq!(second.updated, 0);
    assert_eq!(second.skipped, 3);
    assert_eq!(second.count(SyncDecision::SkipUnchanged), 3);
    assert!(second.changes.is_empty());
    assert_eq!(store.patch_call_count(), 3);
    assert_eq!(second.summary_line(), "[APPLY] Updated: 0 | Skipped: 3");
}

#[tokio::test]
async fn test_dry_run_never_patches() {
    let store = MockRecordStore::new(catalog());
    let options = SyncOptions::default().with_dry_run(true);

    let report = driver(&store).run(&options).await.unwrap();

    assert_eq!(store.patch_call_count(), 0);
    assert_eq!(report.updated, 3);
    assert_eq!(report.summary_line(), "[DRY RUN] Updated: 3 | Skipped: 0");
    assert!(report.changes.iter().all(|c| !c.applied));
    assert_eq!(store.tags_of("c").unwrap(), vec!["Rings"]);

    let change = &report.changes[2];
    assert_eq!(change.item_id, "c");
    assert_eq!(change.old, vec!["Rings"]);
    assert_eq!(change.new, vec!["jewelry", "ring"]);
}

#[tokio::test]
async fn test_only_missing_filters_tagged_records() {
    let store = MockRecordStore::new(catalog());
    let options = SyncOptions::default().with_only_missing(true);

    let report = driver(&store).run(&options).await.unwrap();

    assert_eq!(report.count(SyncDecision::SkipFiltered), 1);
    assert_eq!(report.updated, 2);
    assert_eq!(store.patched_ids(), vec!["a", "b"]);
    assert_eq!(store.tags_of("c").unwrap(), vec!["Rings"]);
}

#[tokio::test]
async fn test_patch_failure_does_not_abort_batch() {
    let store = MockRecordStore::new(catalog()).with_patch_failure(
        "b",
        StoreError::Status {
            status: 500,
            body: "write failed".to_string(),
        },
    );

    let report = driver(&store).run(&SyncOptions::default()).await.unwrap();

    assert_eq!(store.patched_ids(), vec!["a", "b", "c"]);
    assert_eq!(report.updated, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.count(SyncDecision::UpdateFailed), 1);

    let failure = report.failure_for("b").unwrap();
    assert_eq!(failure.error.status(), Some(500));

    let failed_change = report.changes.iter().find(|c| c.item_id == "b").unwrap();
    assert!(!failed_change.applied);
    assert_eq!(store.tags_of("b").unwrap(), Vec::<String>::new());
}

#[tokio::test]
async fn test_unprocessable_records_are_skipped() {
    let store = MockRecordStore::new(vec![
        Record::default().with_category("Jewelry"),
        Record::new("junk").with_tags(["the", "a"]),
        Record::new("bare"),
    ]);

    let report = driver(&store).run(&SyncOptions::default()).await.unwrap();

    assert_eq!(report.updated, 0);
    assert_eq!(report.skipped, 3);
    assert_eq!(report.count(SyncDecision::SkipNoId), 1);
    assert_eq!(report.count(SyncDecision::SkipEmpty), 1);
    assert_eq!(report.count(SyncDecision::SkipUnchanged), 1);
    assert_eq!(store.patch_call_count(), 0);
}

#[tokio::test]
async fn test_written_tags_are_capped() {
    let store = MockRecordStore::new(vec![Record::new("big")
        .with_category("Estate")
        .with_brand("Acme")
        .with_condition("good")
        .with_description(
            "vintage gold silver platinum necklace ring bracelet watch \
             wireless acoustic electric guitar phone drill rifle",
        )
        .with_tags(["heirloom", "boxed"])]);

    driver(&store).run(&SyncOptions::default()).await.unwrap();

    let tags = store.tags_of("big").unwrap();
    assert_eq!(tags.len(), 12);
    assert_eq!(&tags[..3], &["estate", "acme", "good-condition"]);
    assert!(!tags.contains(&"heirloom".to_string()));
}

#[tokio::test]
async fn test_limit_is_passed_to_listing() {
    let store = MockRecordStore::new(catalog());
    let report = driver(&store)
        .run(&SyncOptions::default().with_limit(2))
        .await
        .unwrap();

    assert_eq!(report.loaded, 2);
    assert_eq!(store.list_call_count(), 1);
}

#[tokio::test]
async fn test_concurrent_run_matches_sequential() {
    let records: Vec<Record> = (0..20)
        .map(|i| {
            Record::new(format!("item-{:02}", i))
                .with_category("Electronics")
                .with_description("wireless phone")
        })
        .collect();
    let store = MockRecordStore::new(records).with_latency_ms(10);
    let options = SyncOptions::default().with_concurrency(4);

    let report = driver(&store).run(&options).await.unwrap();

    assert_eq!(report.updated, 20);
    assert_eq!(store.patch_call_count(), 20);
    let ids: Vec<&str> = report.changes.iter().map(|c| c.item_id.as_str()).collect();
    let expected: Vec<String> = (0..20).map(|i| format!("item-{:02}", i)).collect();
    assert_eq!(ids, expected);

    let second = driver(&store).run(&options).await.unwrap();
    assert_eq!(second.count(SyncDecision::SkipUnchanged), 20);
}

#[tokio::test]
async fn test_concurrent_patch_failure_is_isolated() {
    let records: Vec<Record> = (0..8)
        .map(|i| Record::new(format!("r{}", i)).with_category("Tools"))
        .collect();
    let store = MockRecordStore::new(records)
        .with_latency_ms(5)
        .with_patch_failure("r3", StoreError::Transport("timed out".to_string()));
    let options = SyncOptions::default().with_concurrency(4);

    let report = driver(&store).run(&options).await.unwrap();

    assert_eq!(store.patch_call_count(), 8);
    assert_eq!(report.updated, 7);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.count(SyncDecision::UpdateFailed), 1);
    assert!(report.failure_for("r3").is_some());
    assert_eq!(store.tags_of("r3").unwrap(), Vec::<String>::new());
    assert_eq!(store.tags_of("r7").unwrap(), vec!["tools"]);
}

#[tokio::test]
async fn test_concurrent_dry_run_never_patches() {
    let records: Vec<Record> = (0..8)
        .map(|i| Record::new(format!("r{}", i)).with_category("Tools"))
        .collect();
    let store = MockRecordStore::new(records).with_latency_ms(5);
    let options = SyncOptions::default()
        .with_concurrency(4)
        .with_dry_run(true);

    let report = driver(&store).run(&options).await.unwrap();

    assert_eq!(store.patch_call_count(), 0);
    assert_eq!(report.updated, 8);
    assert!(report.changes.iter().all(|c| !c.applied));
    assert_eq!(report.summary_line(), "[DRY RUN] Updated: 8 | Skipped: 0");
}

/// Lists fixed records and panics when asked to patch one of them.
struct PanickingStore {
    records: Vec<Record>,
    panic_on: &'static str,
}

#[async_trait]
impl RecordStore for PanickingStore {
    async fn list_records(&self, _limit: usize) -> Result<Vec<Record>, StoreError> {
        Ok(self.records.clone())
    }

    async fn patch_tags(&self, item_id: &str, _tags: &[String]) -> Result<(), StoreError> {
        if item_id == self.panic_on {
            panic!("store exploded on {}", item_id);
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_panicking_task_is_counted_as_failure() {
    let store = PanickingStore {
        records: (0..4)
            .map(|i| Record::new(format!("r{}", i)).with_category("Tools"))
            .collect(),
        panic_on: "r1",
    };
    let driver = SyncDriver::new(Arc::new(store), Arc::new(TagInferencer::default()));
    let options = SyncOptions::default().with_concurrency(2);

    let report = driver.run(&options).await.unwrap();

    assert_eq!(report.loaded, 4);
    assert_eq!(report.updated, 3);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.updated + report.skipped + report.not_started, report.loaded);
    assert_eq!(report.count(SyncDecision::UpdateFailed), 1);

    let failure = report.failure_for("r1").unwrap();
    assert!(matches!(failure.error, StoreError::Internal(_)));
    assert!(!failure.error.is_retryable());
}

#[tokio::test]
async fn test_fetch_failure_is_fatal() {
    let store = MockRecordStore::new(catalog())
        .with_list_failure(StoreError::InvalidResponse("no items".to_string()));

    let err = driver(&store).run(&SyncOptions::default()).await.unwrap_err();

    assert!(matches!(err, SyncError::Fetch(StoreError::InvalidResponse(_))));
    assert_eq!(store.patch_call_count(), 0);
}

#[tokio::test]
async fn test_cancelled_before_listing() {
    let store = MockRecordStore::new(catalog());
    let token = CancellationToken::new();
    token.cancel();

    let err = driver(&store)
        .run_with_cancel(&SyncOptions::default(), token)
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Cancelled));
    assert_eq!(store.patch_call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_during_listing_is_cancelled() {
    let store = MockRecordStore::new(catalog()).with_latency_ms(50);
    let options = SyncOptions::default().with_deadline(Duration::from_millis(10));

    let err = driver(&store).run(&options).await.unwrap_err();
    assert!(matches!(err, SyncError::Cancelled));
}

#[tokio::test(start_paused = true)]
async fn test_deadline_stops_new_records() {
    let records: Vec<Record> = (0..5)
        .map(|i| Record::new(format!("r{}", i)).with_category("Tools"))
        .collect();
    let store = MockRecordStore::new(records).with_latency_ms(50);
    // listing ends at 50ms, first patch at 100ms, second starts before 120ms
    let options = SyncOptions::default().with_deadline(Duration::from_millis(120));

    let report = driver(&store).run(&options).await.unwrap();

    assert!(report.cancelled);
    assert_eq!(report.updated, 2);
    assert_eq!(report.not_started, 3);
    assert_eq!(report.skipped, 0);
    assert_eq!(store.patched_ids(), vec!["r0", "r1"]);
    assert_eq!(store.tags_of("r1").unwrap(), vec!["tools"]);
}

#[tokio::test(start_paused = true)]
async fn test_external_cancel_with_concurrency() {
    let records: Vec<Record> = (0..10)
        .map(|i| Record::new(format!("r{}", i)).with_category("Tools"))
        .collect();
    let store = MockRecordStore::new(records).with_latency_ms(50);
    let options = SyncOptions::default().with_concurrency(2);
    let token = CancellationToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(75)).await;
        canceller.cancel();
    });

    let report = driver(&store).run_with_cancel(&options, token).await.unwrap();

    assert!(report.cancelled);
    assert_eq!(report.updated, 2);
    assert_eq!(report.not_started, 8);
    assert_eq!(report.updated + report.skipped + report.not_started, report.loaded);
}

#[tokio::test]
async fn test_end_to_end_against_http_store() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/inventory"))
        .and(query_param("limit", "200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"item_id": "inv-1", "category": "Jewelry", "brand": "Rolex",
                 "description": "14k gold ring", "tags": []},
                {"item_id": 42, "category": "Tools", "tags": ["tools"]},
                {"category": "Jewelry"},
                "not-an-object"
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/api/inventory"))
        .and(body_json(json!({
            "item_id": "inv-1",
            "tags": ["jewelry", "rolex", "gold", "ring"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"item_id": "inv-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::default().with_base_url(server.uri());
    let store = Arc::new(HttpRecordStore::new(config).unwrap());
    let driver = SyncDriver::new(store, Arc::new(TagInferencer::default()));

    let report = driver.run(&SyncOptions::default()).await.unwrap();

    assert_eq!(report.loaded, 4);
    assert_eq!(report.updated, 1);
    assert_eq!(report.skipped, 3);
    assert_eq!(report.count(SyncDecision::SkipUnchanged), 1);
    assert_eq!(report.count(SyncDecision::SkipNoId), 2);
    assert!(report.changes[0].applied);
}

#[tokio::test]
async fn test_end_to_end_listing_error_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/inventory"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let config = ClientConfig::default().with_base_url(server.uri());
    let store = Arc::new(HttpRecordStore::new(config).unwrap());
    let driver = SyncDriver::new(store, Arc::new(TagInferencer::default()));

    let err = driver.run(&SyncOptions::default()).await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to load inventory: Store returned 500: boom");
}
