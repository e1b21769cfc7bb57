use std::time::Duration;

use rankapi_rs::{RankClient, RankError};

use super::gateway::{self, Script};
use crate::common;

fn client(port: u16) -> RankClient {
    RankClient::builder()
        .host("127.0.0.1")
        .port(port)
        .timeout(Duration::from_secs(5))
        .connect_timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

#[tokio::test]
async fn fetch_collects_partial_and_final_records() {
    let (port, gw) = gateway::spawn(Script::Report).await;

    let report = client(port).fetch(common::sample_query()).await.unwrap();
    let brokers: Vec<_> = report.iter().map(|r| r.broker.acronym.as_str()).collect();
    assert_eq!(brokers, ["BCAP", "GSCO"]);

    let frames = gw.await.unwrap();
    let ops: Vec<_> = frames.iter().map(|f| f["op"].as_str().unwrap()).collect();
    assert_eq!(ops, ["start", "openService", "sendRequest", "stop"]);

    assert_eq!(frames[0]["serverPort"], port);
    assert_eq!(frames[1]["service"], common::SERVICE);
    let send = &frames[2];
    assert_eq!(send["operation"], "Query");
    assert_eq!(send["correlationId"], report.correlation_id.value());
    assert_eq!(send["request"]["start"], "2020-01-01");
    assert_eq!(
        send["request"]["securityCriteria"]["securities"][0]["ticker"],
        "AAPL US Equity"
    );
}

#[tokio::test]
async fn error_payload_surfaces_as_api_error() {
    let (port, _gw) = gateway::spawn(Script::ErrorInfo).await;

    let err = client(port).fetch(common::sample_query()).await.unwrap_err();
    match err {
        RankError::Api { code, message } => {
            assert_eq!(code, 418);
            assert_eq!(message, "rate limited");
        }
        other => panic!("expected service error, got {other:?}"),
    }
}

#[tokio::test]
async fn service_open_failure_is_reported() {
    let (port, _gw) = gateway::spawn(Script::ServiceFails).await;

    let err = client(port).fetch(common::sample_query()).await.unwrap_err();
    match err {
        RankError::ServiceOpen { service, reason } => {
            assert_eq!(service, common::SERVICE);
            assert_eq!(reason, "Service not found");
        }
        other => panic!("expected service open failure, got {other:?}"),
    }
}

#[tokio::test]
async fn dropped_connection_terminates_the_wait() {
    let (port, _gw) = gateway::spawn(Script::DropAfterRequest).await;

    let err = client(port).fetch(common::sample_query()).await.unwrap_err();
    assert!(matches!(err, RankError::SessionTerminated), "got {err:?}");
}

#[tokio::test]
async fn refused_connection_is_a_websocket_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let err = client(port).fetch(common::sample_query()).await.unwrap_err();
    assert!(matches!(err, RankError::Websocket(_)), "got {err:?}");
}

#[tokio::test]
async fn gateway_hanging_up_before_start_ends_fetch() {
    let (port, gw) = gateway::spawn(Script::HangUp).await;

    let client = client(port);
    let fetch = client.fetch(common::sample_query());
    let err = tokio::time::timeout(Duration::from_secs(10), fetch)
        .await
        .expect("fetch should not hang")
        .unwrap_err();
    assert!(
        matches!(
            err,
            RankError::SessionTerminated | RankError::SessionStartup(_)
        ),
        "got {err:?}"
    );
    assert!(gw.await.unwrap().is_empty());
}
