//! Tool behavior tests.
//!
//! EIA calls run against a local mockito server through the real `reqwest`
//! transport.

use std::sync::Arc;

use mockito::{Matcher, Server};
use serde_json::json;

use marketbot_eia::{EiaClient, HttpTransport, ReqwestTransport};
use marketbot_mcp::auth::AuthenticatedUser;
use marketbot_mcp::server::{
    EiaDataParams, MarketAnalysisServer, MonteCarloParams, StatisticsParams, ToolContext,
};

fn server_with_eia(base_url: &str) -> MarketAnalysisServer {
    let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new());
    let client = EiaClient::with_transport("test-key", transport)
        .unwrap()
        .with_base_url(base_url);
    MarketAnalysisServer::new(Some(client), 42)
}

fn offline_server() -> MarketAnalysisServer {
    MarketAnalysisServer::new(None, 42)
}

#[test]
fn test_hello_world_anonymous_and_authenticated() {
    let server = offline_server();

    let text = server.greet(&ToolContext::anonymous(), "World").unwrap();
    assert!(text.contains("Hello, World!"));
    assert!(text.contains("(No authentication detected)"));

    let ctx = ToolContext::for_user(AuthenticatedUser::new("trader@company.com"));
    let text = server.greet(&ctx, "Trader").unwrap();
    assert!(text.contains("Authenticated as: trader@company.com"));
    assert!(!text.contains("Available connectors"));
}

#[tokio::test]
async fn test_eia_without_key() {
    let err = offline_server()
        .extract_eia_data(&ToolContext::anonymous(), &EiaDataParams::new("steo"))
        .await
        .unwrap_err();
    assert!(err.contains("EIA API Key Not Configured"));
    assert!(err.contains("https://signups.eia.gov/api/signup/"));
}

#[tokio::test]
async fn test_eia_wti_weekly() {
    let mut upstream = Server::new_async().await;
    let mock = upstream
        .mock("GET", "/petroleum/pri/spt/data/")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("frequency".into(), "weekly".into()),
            Matcher::UrlEncoded("facets[series][]".into(), "RWTC".into()),
            Matcher::UrlEncoded("start".into(), "2025-01-01".into()),
            Matcher::UrlEncoded("limit".into(), "10".into()),
        ]))
        .with_status(200)
        .with_body(
            json!({
                "response": {
                    "total": 3,
                    "data": [
                        {"period": "2025-10-24", "series": "RWTC", "value": 61.5},
                        {"period": "2025-10-17", "series": "RWTC", "value": 58.25},
                        {"period": "2025-10-10", "series": "RWTC", "value": 60.0}
                    ]
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let server = server_with_eia(&upstream.url());
    let params = EiaDataParams {
        facets: r#"{"series": ["RWTC"]}"#.to_string(),
        start: "2025-01-01".to_string(),
        frequency: "weekly".to_string(),
        limit: 10,
        ..EiaDataParams::new("petroleum/pri/spt")
    };

    let text = server
        .extract_eia_data(&ToolContext::anonymous(), &params)
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(text.starts_with("## Petroleum Prices"));
    assert!(text.contains("| 2025-10-24 | $61.50 |"));
    assert!(text.contains("- **Series**: RWTC"));
    assert!(text.contains("- **Records**: 3"));
}

#[tokio::test]
async fn test_eia_empty_result() {
    let mut upstream = Server::new_async().await;
    let _mock = upstream
        .mock("GET", "/steo/data/")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"response": {"data": []}}"#)
        .create_async()
        .await;

    let server = server_with_eia(&upstream.url());
    let text = server
        .extract_eia_data(&ToolContext::anonymous(), &EiaDataParams::new("steo"))
        .await
        .unwrap();

    assert!(text.contains("No Data Found"));
    assert!(text.contains("- Path: `steo`"));
}

#[tokio::test]
async fn test_eia_invalid_facets_makes_no_request() {
    let mut upstream = Server::new_async().await;
    let mock = upstream
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let server = server_with_eia(&upstream.url());
    let params = EiaDataParams {
        facets: "{series: RWTC".to_string(),
        ..EiaDataParams::new("petroleum/pri/spt")
    };
    let err = server
        .extract_eia_data(&ToolContext::anonymous(), &params)
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert!(err.contains("Invalid Facets JSON"));
    assert!(err.contains("Your input: `{series: RWTC`"));
}

#[tokio::test]
async fn test_eia_invalid_frequency() {
    let upstream = Server::new_async().await;
    let server = server_with_eia(&upstream.url());
    let params = EiaDataParams {
        frequency: "hourly".to_string(),
        ..EiaDataParams::new("petroleum/pri/spt")
    };

    let err = server
        .extract_eia_data(&ToolContext::anonymous(), &params)
        .await
        .unwrap_err();
    assert!(err.starts_with("❌ **Invalid Parameters**"));
    assert!(err.contains("hourly"));
}

#[tokio::test]
async fn test_eia_not_found() {
    let mut upstream = Server::new_async().await;
    let _mock = upstream
        .mock("GET", "/invalid/path/data/")
        .match_query(Matcher::Any)
        .with_status(404)
        .create_async()
        .await;

    let server = server_with_eia(&upstream.url());
    let err = server
        .extract_eia_data(&ToolContext::anonymous(), &EiaDataParams::new("invalid/path"))
        .await
        .unwrap_err();

    assert!(err.starts_with("❌ **Error Querying EIA API**"));
    assert!(err.contains("invalid/path"));
}

#[test]
fn test_monte_carlo_report() {
    let server = offline_server();
    let text = server
        .run_simulation(&ToolContext::anonymous(), &MonteCarloParams::new(71.5, 0.25))
        .unwrap();

    assert!(text.starts_with("## Monte Carlo Price Simulation"));
    assert!(text.contains("**Starting Price**: $71.50"));
    assert!(text.contains("**Volatility**: 25.0% annual"));
    assert!(text.contains("**Time Horizon**: 30 days"));
    assert!(text.contains("**Simulations**: 1,000"));
    assert!(text.contains("| 95% | $"));
    assert!(text.contains("| 68% | $"));
    assert!(text.contains("- **Expected Change**: "));
}

#[test]
fn test_monte_carlo_is_reproducible() {
    let server = offline_server();
    let params = MonteCarloParams::new(70.0, 0.25);
    let a = server.run_simulation(&ToolContext::anonymous(), &params);
    let b = server.run_simulation(&ToolContext::anonymous(), &params);
    assert_eq!(a, b);
}

#[test]
fn test_monte_carlo_flat_without_volatility() {
    let text = offline_server()
        .run_simulation(&ToolContext::anonymous(), &MonteCarloParams::new(80.0, 0.0))
        .unwrap();
    assert!(text.contains("| Mean | $80.00 |"));
    assert!(text.contains("| 95% | $80.00 | $80.00 | $0.00 |"));
    assert!(text.contains("- **Expected Change**: +0.0%"));
}

#[test]
fn test_monte_carlo_rejects_bad_input() {
    let server = offline_server();
    let mut params = MonteCarloParams::new(70.0, 0.25);
    params.simulations = 0;
    let err = server
        .run_simulation(&ToolContext::anonymous(), &params)
        .unwrap_err();
    assert!(err.starts_with("❌ **Simulation Error**"));

    let err = server
        .run_simulation(&ToolContext::anonymous(), &MonteCarloParams::new(-1.0, 0.25))
        .unwrap_err();
    assert!(err.contains("current price"));
}

#[test]
fn test_monte_carlo_rejects_oversized_run() {
    let mut params = MonteCarloParams::new(70.0, 0.25);
    params.simulations = 4_294_967_295;
    params.days = 4_294_967_295;

    let err = offline_server()
        .run_simulation(&ToolContext::anonymous(), &params)
        .unwrap_err();
    assert!(err.starts_with("❌ **Simulation Error**"));
    assert!(err.contains("at most"));
}

#[test]
fn test_statistics_report() {
    let params = StatisticsParams {
        values: "10,20,30,40,50".to_string(),
        label: "Test Data".to_string(),
    };
    let text = offline_server().summarize_values(&params).unwrap();

    assert!(text.starts_with("## Statistical Analysis: Test Data"));
    assert!(text.contains("**Sample Size**: 5 values"));
    assert!(text.contains("| Mean | 30.00 |"));
    assert!(text.contains("| Median | 30.00 |"));
    assert!(text.contains("| Std Deviation | 14.14 |"));
    assert!(text.contains("| Range | 40.00 |"));
    assert!(text.contains("- **Coefficient of Variation**: 47.1%"));
    assert!(text.contains("- **Volatility**: High"));
}

#[test]
fn test_statistics_invalid_input() {
    let params = StatisticsParams {
        values: "abc,def".to_string(),
        label: "Data".to_string(),
    };
    let err = offline_server().summarize_values(&params).unwrap_err();
    assert!(err.contains("Invalid number format"));
}

#[test]
fn test_statistics_overflow_is_a_calculation_error() {
    let params = StatisticsParams {
        values: "1e308,1e308".to_string(),
        label: "Data".to_string(),
    };
    let err = offline_server().summarize_values(&params).unwrap_err();
    assert!(err.starts_with("❌ **Calculation Error**"));
    assert!(!err.contains("inf"));
    assert!(!err.contains("mean is zero"));
}

#[test]
fn test_explain_term() {
    let server = offline_server();

    let text = server.explain_term("WTI").unwrap();
    assert!(text.starts_with("## West Texas Intermediate"));
    assert!(text.contains("**Term**: `WTI`"));
    assert!(text.contains("### Trading Context"));

    let text = server.explain_term("unknown_term_xyz").unwrap();
    assert!(text.contains("Term not found"));
    assert!(text.contains("*Total terms in glossary: 18*"));
}

#[test]
fn test_list_terms() {
    let server = offline_server();

    let all = server.list_terms("all").unwrap();
    assert!(all.contains("### 🏢 Organizations"));
    assert!(all.contains("- **opec**: Organization of Petroleum Exporting Countries"));
    assert!(all.ends_with("*Use `explain_trading_term` to get detailed explanations.*"));

    let benchmarks = server.list_terms("benchmarks").unwrap();
    assert!(benchmarks.contains("- **henry hub**: Henry Hub"));
    assert!(!benchmarks.contains("Organizations"));
}
