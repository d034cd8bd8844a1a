//! End-to-end route behaviour against in-memory clients.

#![allow(clippy::panic)]

mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use axum::http::StatusCode;

use cloud_fanout_gateway::api;
use cloud_fanout_gateway::clients::{Page, Transport};
use cloud_fanout_gateway::error::GatewayError;
use cloud_fanout_gateway::service::inputs::SENTENCES;
use cloud_fanout_gateway::service::passthrough::{LISTING_SUCCESS, QueryStage};

use common::{
    FakeAdmin, FakeAnalytics, FakeTranslator, Harness, INSTANCE, TRANSLATE_PARENT, databases,
};

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

#[tokio::test]
async fn index_greets() {
    let harness = Harness::with_defaults();
    let (status, body) = harness.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Hello and Welcome!");
}

#[tokio::test]
async fn routes_accept_any_method() {
    let harness = Harness::with_defaults();
    let (status, body) = harness.call("POST", "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Hello and Welcome!");
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let harness = Harness::with_defaults();
    let (status, _) = harness.get("/translate").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn serve_releases_clients_after_shutdown() {
    let Harness {
        admin,
        analytics,
        grpc,
        rest,
        state,
        app,
    } = Harness::with_defaults();
    drop(app);
    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind test listener");
    };

    let Ok(()) = api::serve(listener, state, async {}).await else {
        panic!("server must stop cleanly");
    };

    assert_eq!(Arc::strong_count(&admin), 1);
    assert_eq!(Arc::strong_count(&analytics), 1);
    assert_eq!(Arc::strong_count(&grpc), 1);
    assert_eq!(Arc::strong_count(&rest), 1);
}

// ---------------------------------------------------------------------------
// Translation fan-out
// ---------------------------------------------------------------------------

fn translated_lines(body: &str) -> Vec<&str> {
    body.lines()
        .filter(|l| l.starts_with("Translated text: "))
        .collect()
}

#[tokio::test]
async fn grpc_route_translates_every_sentence_to_chinese() {
    let harness = Harness::with_defaults();
    let (status, body) = harness.get("/translategrpc").await;

    assert_eq!(status, StatusCode::OK);
    let lines = translated_lines(&body);
    assert_eq!(lines.len(), SENTENCES.len());
    assert_eq!(body.lines().count(), SENTENCES.len());

    let produced: HashSet<&str> = lines.iter().copied().collect();
    for sentence in SENTENCES {
        assert!(
            produced.contains(format!("Translated text: zh({sentence})").as_str()),
            "missing translation of {sentence}"
        );
    }

    let requests = harness.grpc.recorded();
    assert_eq!(requests.len(), SENTENCES.len());
    assert!(requests.iter().all(|r| r.parent == TRANSLATE_PARENT
        && r.target_language_code == "zh"
        && r.contents.len() == 1));
    assert!(harness.rest.recorded().is_empty());
}

#[tokio::test]
async fn rest_route_translates_every_sentence_to_arabic() {
    let harness = Harness::with_defaults();
    let (status, body) = harness.get("/translatehttp").await;

    assert_eq!(status, StatusCode::OK);
    let lines = translated_lines(&body);
    assert_eq!(lines.len(), SENTENCES.len());
    assert!(lines.iter().all(|l| l.starts_with("Translated text: ar(")));
    assert_eq!(harness.rest.recorded().len(), SENTENCES.len());
    assert!(harness.grpc.recorded().is_empty());
}

#[tokio::test]
async fn failed_sentences_report_errors_without_translations() {
    let failing = ["mtls is a must", "good morning"];
    let harness = Harness::new(
        FakeAdmin::default(),
        FakeAnalytics::default(),
        FakeTranslator::failing(Transport::Grpc, &failing),
        FakeTranslator::new(Transport::Rest),
    );
    let (status, body) = harness.get("/translategrpc").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let errors: Vec<&str> = body
        .lines()
        .filter(|l| l.starts_with("Translate: "))
        .collect();
    assert_eq!(errors.len(), failing.len());
    for sentence in failing {
        let expected = format!("Translate: googleapi: Error 400: cannot translate {sentence}");
        assert!(errors.contains(&expected.as_str()));
        assert!(!body.contains(&format!("zh({sentence})")));
    }
    assert_eq!(
        translated_lines(&body).len(),
        SENTENCES.len() - failing.len()
    );
    // Every unit ran even though some failed.
    assert_eq!(harness.grpc.recorded().len(), SENTENCES.len());
}

// ---------------------------------------------------------------------------
// Spanner listing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_instance_lists_header_and_trailer_only() {
    let harness = Harness::new(
        FakeAdmin::with_pages(vec![Ok(Page::last(Vec::new()))]),
        FakeAnalytics::default(),
        FakeTranslator::new(Transport::Grpc),
        FakeTranslator::new(Transport::Rest),
    );
    let (status, body) = harness.get("/spannergrpc").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        format!("Databases for instance/[{INSTANCE}]\n{LISTING_SUCCESS}")
    );
}

#[tokio::test]
async fn listing_follows_page_tokens() {
    let harness = Harness::new(
        FakeAdmin::with_pages(vec![
            Ok(databases(&["orders", "users"], Some("t1"))),
            Ok(databases(&["audit"], None)),
        ]),
        FakeAnalytics::default(),
        FakeTranslator::new(Transport::Grpc),
        FakeTranslator::new(Transport::Rest),
    );
    let (status, body) = harness.get("/spannergrpc").await;

    assert_eq!(status, StatusCode::OK);
    let lines: Vec<String> = body.lines().map(str::to_string).collect();
    let expected = vec![
        format!("Databases for instance/[{INSTANCE}]"),
        format!("{INSTANCE}/databases/orders"),
        format!("{INSTANCE}/databases/users"),
        format!("{INSTANCE}/databases/audit"),
        LISTING_SUCCESS.to_string(),
    ];
    assert_eq!(lines, expected);
    assert_eq!(harness.admin.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn listing_error_stops_with_500() {
    let harness = Harness::new(
        FakeAdmin::with_pages(vec![
            Ok(databases(&["orders"], Some("t1"))),
            Err(GatewayError::from(tonic::Status::permission_denied(
                "caller lacks spanner.databases.list",
            ))),
            Ok(databases(&["never"], None)),
        ]),
        FakeAnalytics::default(),
        FakeTranslator::new(Transport::Grpc),
        FakeTranslator::new(Transport::Rest),
    );
    let (status, body) = harness.get("/spannergrpc").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains(&format!("{INSTANCE}/databases/orders\n")));
    assert!(body.ends_with(
        "error iterating through response: rpc error: code = PermissionDenied \
         desc = caller lacks spanner.databases.list"
    ));
    assert!(!body.contains(LISTING_SUCCESS));
    assert!(!body.contains("never"));
    assert_eq!(harness.admin.calls.load(Ordering::SeqCst), 2);
}

// ---------------------------------------------------------------------------
// BigQuery
// ---------------------------------------------------------------------------

fn analytics_harness(analytics: FakeAnalytics) -> Harness {
    Harness::new(
        FakeAdmin::default(),
        analytics,
        FakeTranslator::new(Transport::Grpc),
        FakeTranslator::new(Transport::Rest),
    )
}

#[tokio::test]
async fn query_rows_are_written_one_per_line() {
    let harness = analytics_harness(FakeAnalytics {
        pages: vec![
            vec![vec![
                serde_json::json!("2024-05-03"),
                serde_json::json!("weather"),
                serde_json::json!("1"),
            ]],
            vec![vec![
                serde_json::json!("2024-05-02"),
                serde_json::json!("eclipse"),
                serde_json::json!("1"),
            ]],
        ],
        ..FakeAnalytics::default()
    });
    let (status, body) = harness.get("/bigqueryhttp").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[2024-05-03 weather 1]\n[2024-05-02 eclipse 1]\n");
    assert_eq!(harness.analytics.read_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn run_failure_skips_remaining_stages() {
    let harness = analytics_harness(FakeAnalytics::failing_at(QueryStage::Run));
    let (status, body) = harness.get("/bigqueryhttp").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "can not run query: googleapi: Error 403: Access Denied");
    assert_eq!(harness.analytics.wait_calls.load(Ordering::SeqCst), 0);
    assert_eq!(harness.analytics.read_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn wait_failure_skips_row_reads() {
    let harness = analytics_harness(FakeAnalytics::failing_at(QueryStage::Wait));
    let (status, body) = harness.get("/bigqueryhttp").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        "error waiting on job to finish: googleapi: Error 503: backend unavailable"
    );
    assert_eq!(harness.analytics.read_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_job_status_skips_row_reads() {
    let harness = analytics_harness(FakeAnalytics::failing_at(QueryStage::Status));
    let (status, body) = harness.get("/bigqueryhttp").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        "error in job status: invalidQuery: Unrecognized name: rank"
    );
    assert_eq!(harness.analytics.read_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn read_failure_stops_after_failing_page() {
    let mut analytics = FakeAnalytics::failing_at(QueryStage::Read);
    analytics.pages = vec![
        vec![vec![serde_json::json!("first")]],
        vec![vec![serde_json::json!("second")]],
        vec![vec![serde_json::json!("third")]],
    ];
    let harness = analytics_harness(analytics);
    let (status, body) = harness.get("/bigqueryhttp").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        "[first]\nerror iterating results: invalid response: page expired"
    );
    assert_eq!(harness.analytics.read_calls.load(Ordering::SeqCst), 2);
}
