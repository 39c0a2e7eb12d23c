#![allow(clippy::unwrap_used)]
// Integration tests for `Monitor` and `HistoryCache` using wiremock.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sitewatch_core::{
    ApiClient, CheckOutcome, ExpansionState, HistoryCache, Monitor, SiteKey,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = ApiClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

async fn mount_roster(server: &MockServer, sites: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/site-availability/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sites": sites })))
        .mount(server)
        .await;
}

// ── Roster loading ──────────────────────────────────────────────────

#[tokio::test]
async fn load_roster_replaces_the_roster_wholesale() {
    let (server, client) = setup().await;
    mount_roster(
        &server,
        json!([
            { "service": "claude", "name": "A", "base_url": "https://a.example" },
            { "service": "codex", "name": "B", "base_url": "https://b.example" },
        ]),
    )
    .await;

    let monitor = Monitor::new(client);
    let sites = monitor.load_roster().await.unwrap();

    assert_eq!(sites.len(), 2);
    assert_eq!(monitor.roster().len(), 2);
    assert!(monitor.last_check().is_none());
}

#[tokio::test]
async fn load_roster_failure_clears_the_roster() {
    let (server, client) = setup().await;

    // Seed the roster with a successful load first.
    mount_roster(
        &server,
        json!([{ "service": "claude", "name": "A", "base_url": "https://a.example" }]),
    )
    .await;
    let monitor = Monitor::new(client);
    monitor.load_roster().await.unwrap();
    assert_eq!(monitor.roster().len(), 1);

    // Then fail the reload: the roster must reset to empty.
    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/api/site-availability/sites"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let result = monitor.load_roster().await;
    assert!(result.is_err());
    assert!(monitor.roster().is_empty());
}

// ── Single-flight batch check ───────────────────────────────────────

#[tokio::test]
async fn check_all_is_single_flight() {
    let (server, client) = setup().await;
    mount_roster(
        &server,
        json!([{ "service": "claude", "name": "A", "base_url": "https://a.example" }]),
    )
    .await;

    // Exactly one check request may reach the backend. The delay keeps
    // the first call in flight while the duplicate arrives.
    Mock::given(method("POST"))
        .and(path("/api/site-availability/check"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({
                    "results": [{ "service": "claude", "name": "A",
                                  "available": true, "response_time_ms": 50.0 }]
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let monitor = Monitor::new(client);
    monitor.load_roster().await.unwrap();

    let first = {
        let monitor = monitor.clone();
        tokio::spawn(async move { monitor.check_all().await })
    };

    // Wait until the first call has set the flag.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(monitor.is_checking());

    let roster_before = monitor.roster();
    let duplicate = monitor.check_all().await.unwrap();
    assert_eq!(duplicate, CheckOutcome::AlreadyChecking);
    // The no-op left state unchanged.
    assert_eq!(monitor.roster(), roster_before);

    let first = first.await.unwrap().unwrap();
    assert_eq!(first, CheckOutcome::Completed { merged: 1 });
    assert!(!monitor.is_checking());
    assert!(monitor.last_check().is_some());
}

#[tokio::test]
async fn check_all_sends_only_enabled_sites_with_policy_constants() {
    let (server, client) = setup().await;
    mount_roster(
        &server,
        json!([
            { "service": "claude", "name": "A", "base_url": "https://a.example" },
            { "service": "codex", "name": "X", "base_url": "https://x.example",
              "enable_check": false },
        ]),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/api/site-availability/check"))
        .and(body_partial_json(json!({
            "sites": [{ "service": "claude", "name": "A" }],
            "timeout": 10,
            "max_concurrent": 5,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "service": "claude", "name": "A", "available": true }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let monitor = Monitor::new(client);
    monitor.load_roster().await.unwrap();

    let outcome = monitor.check_all().await.unwrap();
    assert_eq!(outcome, CheckOutcome::Completed { merged: 1 });

    // Disabled site kept its untouched (never-checked) state.
    let roster = monitor.roster();
    assert_eq!(roster[0].available, Some(true));
    assert_eq!(roster[1].available, None);
}

#[tokio::test]
async fn check_all_with_only_disabled_sites_never_sets_checking() {
    let (server, client) = setup().await;
    mount_roster(
        &server,
        json!([{ "service": "codex", "name": "X", "base_url": "https://x.example",
                 "enable_check": false }]),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/api/site-availability/check"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let monitor = Monitor::new(client);
    monitor.load_roster().await.unwrap();

    let outcome = monitor.check_all().await.unwrap();
    assert_eq!(outcome, CheckOutcome::NoEnabledSites);
    assert!(!monitor.is_checking());
    assert!(monitor.last_check().is_none());
}

#[tokio::test]
async fn check_failure_releases_the_flag_and_keeps_the_roster() {
    let (server, client) = setup().await;
    mount_roster(
        &server,
        json!([{ "service": "claude", "name": "A", "base_url": "https://a.example" }]),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/api/site-availability/check"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let monitor = Monitor::new(client);
    monitor.load_roster().await.unwrap();
    let roster_before = monitor.roster();

    let err = monitor.check_all().await.unwrap_err();
    // A 5xx is transient: the notice layer softens it to a warning.
    assert!(err.is_transient());

    // Guaranteed release plus no partial merge.
    assert!(!monitor.is_checking());
    assert_eq!(monitor.roster(), roster_before);
    assert!(monitor.last_check().is_none());
}

#[tokio::test]
async fn malformed_check_response_is_not_transient() {
    let (server, client) = setup().await;
    mount_roster(
        &server,
        json!([{ "service": "claude", "name": "A", "base_url": "https://a.example" }]),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/api/site-availability/check"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"results\": 1}"))
        .mount(&server)
        .await;

    let monitor = Monitor::new(client);
    monitor.load_roster().await.unwrap();

    let err = monitor.check_all().await.unwrap_err();
    assert!(!err.is_transient());
    assert!(!monitor.is_checking());
}

#[tokio::test]
async fn state_changes_are_published_to_subscribers() {
    let (server, client) = setup().await;
    mount_roster(
        &server,
        json!([{ "service": "claude", "name": "A", "base_url": "https://a.example" }]),
    )
    .await;

    let monitor = Monitor::new(client);
    let mut rx = monitor.subscribe();
    let start = *rx.borrow_and_update();

    monitor.load_roster().await.unwrap();

    assert!(rx.has_changed().unwrap());
    assert!(*rx.borrow_and_update() > start);
}

// ── History cache ───────────────────────────────────────────────────

#[tokio::test]
async fn history_is_fetched_exactly_once_per_identity() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/site-availability/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [
                { "available": true, "response_time_ms": 90.0,
                  "checked_at": "2025-06-01T09:00:00Z" },
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cache = HistoryCache::new(client);
    let key = SiteKey::new("claude", "A");

    let first = cache.get(&key).await;
    let second = cache.get(&key).await;

    assert_eq!(first.len(), 1);
    // Same stored sequence, no second fetch.
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn history_failure_substitutes_empty_and_allows_retry() {
    let (server, client) = setup().await;

    // First fetch fails; a retry is allowed because the failure did not
    // populate the cache.
    let failure_guard = Mock::given(method("GET"))
        .and(path("/api/site-availability/history"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount_as_scoped(&server)
        .await;

    let cache = HistoryCache::new(client);
    let key = SiteKey::new("claude", "A");

    let records = cache.get(&key).await;
    assert!(records.is_empty());
    assert!(cache.peek(&key).is_none());

    drop(failure_guard);

    // Backend recovers; the retry populates the cache.
    Mock::given(method("GET"))
        .and(path("/api/site-availability/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [{ "available": false, "error": "timeout",
                          "checked_at": "2025-06-01T08:00:00Z" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let records = cache.get(&key).await;
    assert_eq!(records.len(), 1);
    assert!(cache.peek(&key).is_some());
}

// ── Expansion + history interplay ───────────────────────────────────

#[tokio::test]
async fn expanding_an_uncached_identity_fetches_history_once() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/site-availability/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [
                { "available": true, "checked_at": "2025-06-01T09:00:00Z" },
                { "available": true, "checked_at": "2025-06-01T08:00:00Z" },
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cache = HistoryCache::new(client);
    let mut expansion = ExpansionState::new();
    let key = SiteKey::new("claude", "A");

    // Expand: the history is not yet cached, so the renderer would show
    // the loading presentation until the fetch lands.
    assert!(expansion.toggle(&key));
    assert!(cache.peek(&key).is_none());

    let records = cache.get(&key).await;
    assert_eq!(records.len(), 2);
    assert!(cache.peek(&key).is_some());

    // Collapse and re-expand: the cache entry survives, no refetch.
    assert!(!expansion.toggle(&key));
    assert!(expansion.toggle(&key));
    let again = cache.get(&key).await;
    assert!(Arc::ptr_eq(&records, &again));
}
