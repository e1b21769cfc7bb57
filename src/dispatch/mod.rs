//! Event dispatch for rank queries.
//!
//! [`RankEventHandler`] is the [`EventHandler`] every session delivers to. It
//! routes each event by kind to one of four handlers (session status, service
//! status, responses, everything else), keeps the queue of queries waiting for
//! the service, and matches responses to pending queries by correlation id.

mod pending;

pub use pending::Completion;

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info, warn};

use crate::core::{
    CorrelationId, Event, EventHandler, EventKind, MessageType, RankError, Session, SessionState,
    wire::status_reason,
};
use crate::rank::{Payload, QueryRequest, decode_message};
use pending::{PendingRequests, Queued};

/// Why the handler no longer accepts queries.
#[derive(Debug, Clone)]
enum Closed {
    Startup(String),
    ServiceOpen { service: String, reason: String },
    /// The handler stopped the session itself after its last response.
    Stopped,
}

impl Closed {
    fn error(&self) -> RankError {
        match self {
            Closed::Startup(reason) => RankError::SessionStartup(reason.clone()),
            Closed::ServiceOpen { service, reason } => RankError::ServiceOpen {
                service: service.clone(),
                reason: reason.clone(),
            },
            Closed::Stopped => RankError::SessionTerminated,
        }
    }
}

#[derive(Default)]
struct Inner {
    state: SessionState,
    service_requested: bool,
    closed: Option<Closed>,
    queue: VecDeque<Queued>,
    pending: PendingRequests,
}

impl Inner {
    fn fail_everything(&mut self, make_err: impl Fn() -> RankError) {
        for q in self.queue.drain(..) {
            let _ = q.reply.send(Err(make_err()));
        }
        self.pending.fail_all(make_err);
    }

    /// Marks the handler as done for good and fails everything outstanding
    /// with the matching error. Later submissions get the same error.
    fn close(&mut self, state: SessionState, closed: Closed) {
        self.state = state;
        self.fail_everything(|| closed.error());
        self.closed = Some(closed);
    }

    fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.pending.is_empty()
    }
}

/// Dispatches session events and correlates responses with submitted queries.
///
/// Queries are submitted with [`submit`](Self::submit) before (or after) the
/// session starts. The handler opens the configured service once the session
/// is up, sends queued queries as soon as the service is open, and stops the
/// session when a response leaves nothing outstanding. A stopped or failed
/// handler refuses further queries.
///
/// At most `max_pending` queries are in flight at once; the rest wait in
/// submission order. Only a full `RESPONSE` completes a query. A
/// `PARTIAL_RESPONSE` contributes its records and is never terminal.
pub struct RankEventHandler {
    service: String,
    max_pending: usize,
    inner: Mutex<Inner>,
}

impl RankEventHandler {
    /// A handler for `service` allowing one outstanding query.
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            max_pending: 1,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Allow up to `n` queries in flight (at least one).
    pub fn with_max_pending(mut self, n: usize) -> Self {
        self.max_pending = n.max(1);
        self
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    /// Number of sent queries still waiting for their terminal response.
    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    /// Number of queries not sent yet.
    pub fn queued_count(&self) -> usize {
        self.lock().queue.len()
    }

    /// Queues a query. It is sent once the service is open.
    ///
    /// Once the session has failed, or the handler has stopped it, the
    /// returned completion is already resolved with that error.
    pub fn submit(&self, request: QueryRequest) -> Completion {
        let (reply, completion) = Completion::channel();
        let mut inner = self.lock();
        if let Some(closed) = &inner.closed {
            debug!(?closed, "query refused");
            let _ = reply.send(Err(closed.error()));
            return completion;
        }
        inner.queue.push_back(Queued { request, reply });
        completion
    }

    /// Sends queued queries right away if the service is already open.
    pub fn flush(&self, session: &dyn Session) {
        let mut inner = self.lock();
        if inner.state == SessionState::ServiceOpen {
            self.send_queued(&mut inner, session);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn on_session_status(&self, event: &Event, session: &dyn Session) -> Result<(), RankError> {
        info!("processing {} event", event.kind());
        let mut inner = self.lock();

        for msg in event {
            match msg.message_type() {
                MessageType::SessionStarted => {
                    if inner.service_requested || inner.closed.is_some() {
                        debug!("SessionStarted ignored");
                        continue;
                    }
                    info!(service = %self.service, "session started; opening service");
                    inner.state = SessionState::Started;
                    inner.service_requested = true;
                    if let Err(e) = session.open_service_async(&self.service) {
                        let closed = Closed::ServiceOpen {
                            service: self.service.clone(),
                            reason: e.to_string(),
                        };
                        inner.close(SessionState::Failed, closed);
                        return Err(e);
                    }
                    inner.state = SessionState::ServiceOpening;
                }
                MessageType::SessionStartupFailure => {
                    let reason = status_reason(msg);
                    error!(%reason, "session startup failed");
                    inner.close(SessionState::Failed, Closed::Startup(reason));
                }
                MessageType::SessionTerminated => {
                    if inner.is_idle() {
                        info!("session terminated");
                    } else {
                        warn!(
                            pending = inner.pending.len(),
                            queued = inner.queue.len(),
                            "session terminated with requests outstanding"
                        );
                    }
                    inner.state = SessionState::Disconnected;
                    inner.service_requested = false;
                    inner.fail_everything(|| RankError::SessionTerminated);
                }
                MessageType::SessionConnectionUp => info!("session connection is up"),
                MessageType::SessionConnectionDown => warn!("session connection is down"),
                _ => debug!(payload = %msg, "session status"),
            }
        }
        Ok(())
    }

    fn on_service_status(&self, event: &Event, session: &dyn Session) -> Result<(), RankError> {
        info!("processing {} event", event.kind());
        let mut inner = self.lock();

        for msg in event {
            match msg.message_type() {
                MessageType::ServiceOpened => {
                    if inner.state == SessionState::ServiceOpen {
                        debug!("duplicate ServiceOpened");
                    } else {
                        info!(service = %self.service, "service opened");
                    }
                    inner.state = SessionState::ServiceOpen;
                    self.send_queued(&mut inner, session);
                }
                MessageType::ServiceOpenFailure => {
                    let reason = status_reason(msg);
                    error!(service = %self.service, %reason, "service failed to open");
                    let closed = Closed::ServiceOpen {
                        service: self.service.clone(),
                        reason,
                    };
                    inner.close(SessionState::Failed, closed);
                }
                _ => debug!(payload = %msg, "service status"),
            }
        }
        Ok(())
    }

    fn on_response(&self, event: &Event, session: &dyn Session) -> Result<(), RankError> {
        let terminal = matches!(event.kind(), EventKind::Response);
        debug!(messages = event.messages().len(), "processing {} event", event.kind());
        let mut inner = self.lock();
        let mut finished: Vec<CorrelationId> = Vec::new();
        let mut failed = 0usize;

        for msg in event {
            debug!(payload = %msg, "response message");
            let Some(cid) = msg.correlation_id().filter(|c| inner.pending.contains(c)) else {
                debug!(cid = ?msg.correlation_id(), "no pending request for message");
                continue;
            };

            match decode_message(msg) {
                Ok(Payload::Report(records)) => {
                    for record in &records {
                        info!(%cid, "{record}");
                    }
                    inner.pending.append(cid, records);
                }
                Ok(Payload::Error(info)) => {
                    warn!(%cid, code = info.code, text = %info.message, "service returned an error");
                    inner.pending.set_error(cid, info);
                }
                Ok(Payload::Unknown(name)) => {
                    if terminal {
                        inner.pending.fail(
                            cid,
                            RankError::Data(format!("unexpected response message {name}")),
                        );
                        failed += 1;
                    } else {
                        debug!(%cid, message_type = %name, "skipping partial message");
                    }
                    continue;
                }
                Err(e) => {
                    error!(%cid, error = %e, "could not decode response");
                    inner.pending.fail(cid, e);
                    failed += 1;
                    continue;
                }
            }

            if terminal && !finished.contains(&cid) {
                finished.push(cid);
            }
        }

        // unmatched or non-terminal traffic must not end the session
        let resolved = failed + finished.len();
        if resolved == 0 {
            return Ok(());
        }
        for cid in finished {
            inner.pending.complete(cid);
        }

        self.send_queued(&mut inner, session);
        if inner.is_idle() && inner.state == SessionState::ServiceOpen {
            info!(resolved, "all requests complete; stopping session");
            inner.close(SessionState::Disconnected, Closed::Stopped);
            session.stop();
        }
        Ok(())
    }

    fn on_misc(&self, event: &Event) -> Result<(), RankError> {
        info!("processing {} event", event.kind());
        let mut unclassified = 0usize;
        for msg in event {
            match msg.message_type() {
                MessageType::SlowConsumerWarning => warn!("entered slow consumer status"),
                MessageType::SlowConsumerWarningCleared => info!("slow consumer status cleared"),
                _ => {
                    info!(payload = %msg, "message");
                    unclassified += 1;
                }
            }
        }
        if unclassified > 0 || event.messages().is_empty() {
            return Err(RankError::Unclassified(format!(
                "{} with {} message(s)",
                event.kind(),
                event.messages().len()
            )));
        }
        Ok(())
    }

    fn send_queued(&self, inner: &mut Inner, session: &dyn Session) {
        if inner.state != SessionState::ServiceOpen {
            return;
        }
        while inner.pending.len() < self.max_pending {
            let Some(q) = inner.queue.pop_front() else {
                break;
            };
            let cid = CorrelationId::next();
            debug!(%cid, request = ?q.request, "sending request");
            match session.send_request(&self.service, &q.request, cid) {
                Ok(()) => {
                    info!(%cid, service = %self.service, "rank query sent");
                    inner.pending.insert(cid, q.reply);
                }
                Err(e) => {
                    error!(%cid, error = %e, "failed to send the request");
                    let err = match e {
                        RankError::RequestSubmit(_) => e,
                        other => RankError::RequestSubmit(other.to_string()),
                    };
                    let _ = q.reply.send(Err(err));
                }
            }
        }
    }
}

impl EventHandler for RankEventHandler {
    fn process_event(&self, event: &Event, session: &dyn Session) {
        let result = match event.kind() {
            EventKind::SessionStatus => self.on_session_status(event, session),
            EventKind::ServiceStatus => self.on_service_status(event, session),
            EventKind::Response | EventKind::PartialResponse => self.on_response(event, session),
            EventKind::Other(_) => self.on_misc(event),
        };

        if let Err(e) = result {
            if e.is_fatal() {
                error!(kind = %event.kind(), error = %e, "event handling failed");
            } else {
                warn!(kind = %event.kind(), error = %e, "event not handled");
            }
        }
    }
}
