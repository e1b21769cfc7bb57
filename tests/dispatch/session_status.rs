use rankapi_rs::{
    EventHandler, EventKind, Message, MessageType, RankError, RankEventHandler, SessionState,
};
use serde_json::json;

use crate::common::{self, RecordingSession, SERVICE};

#[test]
fn session_started_opens_the_service_exactly_once() {
    let session = RecordingSession::new();
    let handler = RankEventHandler::new(SERVICE);

    handler.process_event(&common::session_started(), &session);
    assert_eq!(session.opened(), vec![SERVICE.to_string()]);
    assert_eq!(handler.state(), SessionState::ServiceOpening);

    // a repeated SessionStarted must not open the service again
    handler.process_event(&common::session_started(), &session);
    assert_eq!(session.opened().len(), 1);
}

#[test]
fn startup_failure_fails_queued_queries() {
    let session = RecordingSession::new();
    let handler = RankEventHandler::new(SERVICE);
    let mut done = handler.submit(common::sample_query());

    let failure = rankapi_rs::Event::new(
        EventKind::SessionStatus,
        vec![
            Message::new(MessageType::SessionStartupFailure)
                .with_elements(json!({"reason": {"description": "no route to host"}})),
        ],
    );
    handler.process_event(&failure, &session);

    assert_eq!(handler.state(), SessionState::Failed);
    assert!(session.opened().is_empty());
    match done.try_outcome() {
        Some(Err(RankError::SessionStartup(reason))) => assert_eq!(reason, "no route to host"),
        other => panic!("expected startup failure, got {other:?}"),
    }

    // later submissions fail fast
    let mut late = handler.submit(common::sample_query());
    match late.try_outcome() {
        Some(Err(RankError::SessionStartup(reason))) => assert_eq!(reason, "no route to host"),
        other => panic!("expected startup failure, got {other:?}"),
    }
}

#[test]
fn late_queries_get_the_service_open_failure() {
    let session = RecordingSession::new();
    let handler = RankEventHandler::new(SERVICE);
    handler.process_event(&common::session_started(), &session);

    let failure = rankapi_rs::Event::new(
        EventKind::ServiceStatus,
        vec![
            Message::new(MessageType::ServiceOpenFailure)
                .with_elements(json!({"reason": {"description": "Service not found"}})),
        ],
    );
    handler.process_event(&failure, &session);
    assert_eq!(handler.state(), SessionState::Failed);

    let mut late = handler.submit(common::sample_query());
    match late.try_outcome() {
        Some(Err(RankError::ServiceOpen { service, reason })) => {
            assert_eq!(service, SERVICE);
            assert_eq!(reason, "Service not found");
        }
        other => panic!("expected service open failure, got {other:?}"),
    }
    assert!(session.sent().is_empty());
}

#[test]
fn open_service_refusal_fails_queued_queries() {
    let session = RecordingSession::failing_open();
    let handler = RankEventHandler::new(SERVICE);
    let mut done = handler.submit(common::sample_query());

    handler.process_event(&common::session_started(), &session);

    assert_eq!(handler.state(), SessionState::Failed);
    assert!(matches!(
        done.try_outcome(),
        Some(Err(RankError::ServiceOpen { .. }))
    ));
}

#[test]
fn termination_fails_outstanding_requests() {
    let session = RecordingSession::new();
    let (handler, mut done, _cid) = common::sent_query(&session);

    handler.process_event(&rankapi_rs::Event::session_terminated(), &session);

    assert_eq!(handler.state(), SessionState::Disconnected);
    assert_eq!(handler.pending_count(), 0);
    assert!(matches!(
        done.try_outcome(),
        Some(Err(RankError::SessionTerminated))
    ));
}

#[test]
fn connection_notices_do_not_change_state() {
    let session = RecordingSession::new();
    let handler = RankEventHandler::new(SERVICE);
    let mut done = handler.submit(common::sample_query());

    handler.process_event(
        &common::status(EventKind::SessionStatus, MessageType::SessionConnectionUp),
        &session,
    );
    handler.process_event(
        &common::status(EventKind::SessionStatus, MessageType::SessionConnectionDown),
        &session,
    );

    assert_eq!(handler.state(), SessionState::Disconnected);
    assert_eq!(handler.queued_count(), 1);
    assert!(done.try_outcome().is_none());
}
