//! HTTP-level tests for the EIA client against a local mock server.

use mockito::{Matcher, Server};

use marketbot_eia::{EiaClient, EiaError, Frequency, QuerySpec, SortSpec};

const WTI_WEEKLY: &str = r#"{
    "response": {
        "total": 3,
        "frequency": "weekly",
        "data": [
            {"period": "2025-10-24", "series": "RWTC", "value": 61.5, "units": "$/BBL"},
            {"period": "2025-10-17", "series": "RWTC", "value": 57.9, "units": "$/BBL"},
            {"period": "2025-10-10", "series": "RWTC", "value": 60.1, "units": "$/BBL"}
        ]
    }
}"#;

#[tokio::test]
async fn test_query_sends_encoded_parameters() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/petroleum/pri/spt/data/")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("api_key".into(), "test-key".into()),
            Matcher::UrlEncoded("frequency".into(), "weekly".into()),
            Matcher::UrlEncoded("data[0]".into(), "value".into()),
            Matcher::UrlEncoded("limit".into(), "5000".into()),
            Matcher::UrlEncoded("start".into(), "2025-01-01".into()),
            Matcher::UrlEncoded("facets[series][]".into(), "RWTC".into()),
            Matcher::UrlEncoded(
                "sort".into(),
                r#"[{"column":"period","direction":"desc"}]"#.into(),
            ),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(WTI_WEEKLY)
        .create_async()
        .await;

    let client = EiaClient::new("test-key").unwrap().with_base_url(server.url());
    let spec = QuerySpec::new("petroleum/pri/spt")
        .with_facet("series", ["RWTC"])
        .with_frequency(Frequency::Weekly)
        .with_start("2025-01-01")
        .with_sort(SortSpec::desc("period"))
        .with_limit(6000);

    let result = client.query(&spec).await.unwrap();

    mock.assert_async().await;
    assert_eq!(result.records().len(), 3);
    assert_eq!(result.total(), Some(3));
    assert_eq!(client.request_count(), 1);
}

#[tokio::test]
async fn test_query_404_reports_path() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/invalid/path/data/")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(r#"{"error": "not found"}"#)
        .create_async()
        .await;

    let client = EiaClient::new("test-key").unwrap().with_base_url(server.url());
    let err = client
        .query(&QuerySpec::new("invalid/path").with_limit(100))
        .await
        .unwrap_err();

    assert!(matches!(err, EiaError::NotFound { ref path } if path == "invalid/path"));
    assert!(err.to_string().contains("invalid/path"));
    assert_eq!(client.request_count(), 1);
}

#[tokio::test]
async fn test_query_429_is_rate_limit() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/petroleum/pri/spt/data/")
        .match_query(Matcher::Any)
        .with_status(429)
        .create_async()
        .await;

    let client = EiaClient::new("test-key").unwrap().with_base_url(server.url());
    let err = client
        .query(&QuerySpec::new("petroleum/pri/spt"))
        .await
        .unwrap_err();

    assert!(matches!(err, EiaError::RateLimit));
}

#[tokio::test]
async fn test_query_401_is_auth() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/steo/data/")
        .match_query(Matcher::Any)
        .with_status(401)
        .create_async()
        .await;

    let client = EiaClient::new("bad-key").unwrap().with_base_url(server.url());
    let err = client.query(&QuerySpec::new("steo")).await.unwrap_err();

    assert!(matches!(err, EiaError::Auth));
    assert!(err.to_string().contains("signups.eia.gov"));
}

#[tokio::test]
async fn test_query_server_error_keeps_status_and_body() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/steo/data/")
        .match_query(Matcher::Any)
        .with_status(502)
        .with_body("bad gateway")
        .create_async()
        .await;

    let client = EiaClient::new("test-key").unwrap().with_base_url(server.url());
    let err = client.query(&QuerySpec::new("steo")).await.unwrap_err();

    match err {
        EiaError::Transport { status, body } => {
            assert_eq!(status, Some(502));
            assert_eq!(body, "bad gateway");
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_query_malformed_body() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/steo/data/")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let client = EiaClient::new("test-key").unwrap().with_base_url(server.url());
    let err = client.query(&QuerySpec::new("steo")).await.unwrap_err();

    assert!(matches!(err, EiaError::Response(_)));
}

#[tokio::test]
async fn test_invalid_frequency_never_reaches_server() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = EiaClient::new("test-key").unwrap().with_base_url(server.url());
    let err = client
        .query(&QuerySpec::new("").with_frequency(Frequency::Daily))
        .await
        .unwrap_err();

    assert!(err.is_validation());
    mock.assert_async().await;
    assert_eq!(client.request_count(), 0);
}
