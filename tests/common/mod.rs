#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::NaiveDate;
use rankapi_rs::{
    Completion, CorrelationId, Event, EventHandler, EventKind, Message, MessageType,
    QueryRequest, RankError, RankEventHandler, SecurityCriteria, SecurityId, Session,
};
use serde_json::{Value, json};

pub const SERVICE: &str = "//blp/rankapi-beta";

/// A session that records every call and never produces events on its own.
#[derive(Default)]
pub struct RecordingSession {
    starts: AtomicUsize,
    opened: Mutex<Vec<String>>,
    sent: Mutex<Vec<(String, QueryRequest, CorrelationId)>>,
    stops: AtomicUsize,
    fail_sends: AtomicBool,
    fail_open: AtomicBool,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_sends() -> Self {
        let s = Self::default();
        s.fail_sends.store(true, Ordering::SeqCst);
        s
    }

    pub fn failing_open() -> Self {
        let s = Self::default();
        s.fail_open.store(true, Ordering::SeqCst);
        s
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<(String, QueryRequest, CorrelationId)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_ids(&self) -> Vec<CorrelationId> {
        self.sent().into_iter().map(|(_, _, cid)| cid).collect()
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl Session for RecordingSession {
    fn start_async(&self) -> Result<(), RankError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn open_service_async(&self, service: &str) -> Result<(), RankError> {
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(RankError::ServiceOpen {
                service: service.to_string(),
                reason: "refused".into(),
            });
        }
        self.opened.lock().unwrap().push(service.to_string());
        Ok(())
    }

    fn send_request(
        &self,
        service: &str,
        request: &QueryRequest,
        cid: CorrelationId,
    ) -> Result<(), RankError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(RankError::RequestSubmit("queue full".into()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((service.to_string(), request.clone(), cid));
        Ok(())
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn sample_query() -> QueryRequest {
    QueryRequest::new(
        date(2020, 1, 1),
        date(2020, 4, 1),
        SecurityCriteria::Securities(vec![SecurityId::Ticker("AAPL US Equity".into())]),
    )
    .unwrap()
}

pub fn status(kind: EventKind, message_type: MessageType) -> Event {
    Event::new(kind, vec![Message::new(message_type)])
}

pub fn session_started() -> Event {
    status(EventKind::SessionStatus, MessageType::SessionStarted)
}

pub fn service_opened() -> Event {
    status(EventKind::ServiceStatus, MessageType::ServiceOpened)
}

pub fn record_json(acronym: &str, bought: f64, sold: f64, total: f64) -> Value {
    json!({
        "broker": {"acronym": acronym},
        "bought": bought,
        "crossed": 0.0,
        "highTouch": bought / 2.0,
        "lowTouch": bought / 2.0,
        "numReports": 3,
        "sold": sold,
        "total": total,
        "traded": total
    })
}

pub fn report_event(kind: EventKind, cid: CorrelationId, records: Vec<Value>) -> Event {
    Event::new(
        kind,
        vec![
            Message::new(MessageType::Report)
                .with_correlation_id(cid)
                .with_elements(json!({ "records": records })),
        ],
    )
}

pub fn error_event(cid: CorrelationId, code: i32, message: &str) -> Event {
    Event::new(
        EventKind::Response,
        vec![
            Message::new(MessageType::ErrorInfo)
                .with_correlation_id(cid)
                .with_elements(json!({"errorCode": code, "errorMessage": message})),
        ],
    )
}

/// A handler with one query submitted and sent; returns the id it was sent with.
pub fn sent_query(session: &RecordingSession) -> (RankEventHandler, Completion, CorrelationId) {
    let handler = RankEventHandler::new(SERVICE);
    let completion = handler.submit(sample_query());
    handler.process_event(&session_started(), session);
    handler.process_event(&service_opened(), session);
    let cid = *session
        .sent_ids()
        .last()
        .expect("query should have been sent");
    (handler, completion, cid)
}
