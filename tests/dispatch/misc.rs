use rankapi_rs::{Event, EventHandler, EventKind, Message, MessageType, SessionState};

use crate::common::{self, RecordingSession};

#[test]
fn other_events_leave_state_untouched() {
    let session = RecordingSession::new();
    let (handler, mut done, _cid) = common::sent_query(&session);

    let admin = Event::new(
        EventKind::Other("ADMIN".into()),
        vec![
            Message::new(MessageType::SlowConsumerWarning),
            Message::new(MessageType::SlowConsumerWarningCleared),
        ],
    );
    handler.process_event(&admin, &session);

    let timeout = Event::new(
        EventKind::Other("TIMEOUT".into()),
        vec![Message::new(MessageType::Other("RequestTimeout".into()))],
    );
    handler.process_event(&timeout, &session);
    handler.process_event(&Event::new(EventKind::Other("EMPTY".into()), vec![]), &session);

    assert_eq!(handler.state(), SessionState::ServiceOpen);
    assert_eq!(handler.pending_count(), 1);
    assert_eq!(session.sent().len(), 1);
    assert_eq!(session.stop_count(), 0);
    assert!(done.try_outcome().is_none());
}
