use chrono::{Duration, Utc};
use serde_json::json;
use std::collections::HashSet;
use thinknum_client::auth::Credential;
use thinknum_client::config::{RetrySettings, Settings};
use thinknum_client::network::HttpClient;
use thinknum_client::query::{Filter, Request};
use thinknum_client::{Client, Error, RunOutcome, SearchDefinition};
use wiremock::matchers::{body_string_contains, header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn page(count: u64, total: u64, first_row: u64) -> serde_json::Value {
    json!({
        "count": count,
        "total": total,
        "status": 200,
        "items": {
            "fields": [{"id": "n", "display_name": "N", "type": "number"}],
            "rows": (first_row..first_row + count).map(|i| json!([i])).collect::<Vec<_>>(),
        }
    })
}

fn client(server: &MockServer, searches: Vec<SearchDefinition>) -> Client {
    let mut settings = Settings::default();
    settings.auth.hostname = server.uri();
    settings.page_size = 10;
    settings.retry = RetrySettings::immediate(Some(3), 0);
    settings.searches = searches;

    let credential = Credential::new("secret", Utc::now() + Duration::hours(1));
    Client::new(settings, HttpClient::new().unwrap(), credential)
}

async fn run_all(client: &Client, workers: usize) -> Vec<RunOutcome> {
    let mut rx = client.run_all(workers).unwrap();
    let mut outcomes = Vec::new();
    while let Some(outcome) = rx.recv().await {
        outcomes.push(outcome);
    }
    outcomes
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap().len()
}

#[tokio::test]
async fn test_one_outcome_per_enabled_search() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/connections/dataset/[^/]+/query/new$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(1, 1, 0)))
        .mount(&server)
        .await;

    let searches: Vec<SearchDefinition> = (0..5)
        .map(|i| {
            let search = SearchDefinition::new(format!("s{}", i), format!("ds{}", i));
            if i % 2 == 0 {
                search.disabled()
            } else {
                search
            }
        })
        .collect();

    for workers in 1..=5 {
        let client = client(&server, searches.clone());
        let outcomes = run_all(&client, workers).await;

        assert_eq!(outcomes.len(), 2, "workers={}", workers);
        let names = outcomes
            .iter()
            .map(|o| o.name().to_string())
            .collect::<HashSet<String>>();
        assert_eq!(names, HashSet::from(["s1".to_string(), "s3".to_string()]));
        assert!(outcomes.iter().all(|o| o.is_success()));
    }
}

#[tokio::test]
async fn test_pages_until_total() {
    let server = MockServer::start().await;
    for (start, count) in [(0u64, 10u64), (10, 10), (20, 5)] {
        Mock::given(method("POST"))
            .and(path("/connections/dataset/store/query/new"))
            .and(header("Authorization", "token secret"))
            .and(body_string_contains(format!("start={}", start)))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(count, 25, start)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = client(&server, vec![]);
    let outcome = client
        .run_search(SearchDefinition::new("stores", "store"))
        .await;

    assert!(outcome.is_success());
    assert_eq!(outcome.data.rows.len(), 25);
    assert_eq!(outcome.data.total, 25);
    assert_eq!(outcome.data.pages, 3);
    assert_eq!(outcome.data.rows[24], vec![json!(24)]);
    assert_eq!(request_count(&server).await, 3);
}

#[tokio::test]
async fn test_gateway_timeouts_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/connections/dataset/store/query/new"))
        .respond_with(ResponseTemplate::new(504))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/connections/dataset/store/query/new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(2, 2, 7)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, vec![]);
    let outcome = client
        .run_search(SearchDefinition::new("stores", "store"))
        .await;

    assert!(outcome.is_success());
    assert_eq!(outcome.data.rows, vec![vec![json!(7)], vec![json!(8)]]);
    assert_eq!(outcome.data.pages, 1);
    assert_eq!(request_count(&server).await, 3);
}

#[tokio::test]
async fn test_other_statuses_fail_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/connections/dataset/store/query/new"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, vec![]);
    let outcome = client
        .run_search(SearchDefinition::new("stores", "store"))
        .await;

    match outcome.error {
        Some(Error::Protocol { status, ref body }) => {
            assert_eq!(status, 403);
            assert_eq!(body, "forbidden");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_failing_search_does_not_affect_others() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/connections/dataset/broken/query/new"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/connections/dataset/ok\d/query/new$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(3, 3, 0)))
        .mount(&server)
        .await;

    let searches = vec![
        SearchDefinition::new("a", "ok1"),
        SearchDefinition::new("b", "broken"),
        SearchDefinition::new("c", "ok2"),
        SearchDefinition::new("d", "ok3"),
    ];
    let client = client(&server, searches);
    let outcomes = run_all(&client, 4).await;

    assert_eq!(outcomes.len(), 4);
    for outcome in &outcomes {
        if outcome.name() == "b" {
            assert_eq!(outcome.error.as_ref().and_then(|e| e.status()), Some(500));
        } else {
            assert!(outcome.is_success(), "{} failed", outcome.name());
            assert_eq!(outcome.data.rows.len(), 3);
        }
    }
}

#[test]
fn test_cloned_definition_is_independent() {
    let original = SearchDefinition::new("stores", "store").with_request(
        Request::for_tickers(["nasdaq:aapl"]).with_filter(Filter::new("state", "=", "NY")),
    );

    let mut copy = original.clone();
    copy.request.tickers.push("nyse:ibm".to_string());
    copy.request.filters[0].value.push("CA".to_string());

    assert_eq!(original.request.tickers, vec!["nasdaq:aapl"]);
    assert_eq!(original.request.filters[0].value, vec!["NY"]);
}

#[tokio::test]
async fn test_results_saved_as_requested() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(2, 2, 0)))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("stores").to_string_lossy().into_owned();
    let search = SearchDefinition::new("stores", "store").with_output(output.clone(), &["json", "csv"]);

    let client = client(&server, vec![]);
    let outcome = client.run_search(search).await;
    let saved = client.save(&outcome);

    assert!(saved.iter().all(|s| s.is_success()));
    let csv = std::fs::read_to_string(format!("{}.csv", output)).unwrap();
    assert_eq!(csv, "N\n0\n1\n");
}
