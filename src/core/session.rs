use std::fmt;

use crate::core::{CorrelationId, Event, RankError};
use crate::rank::QueryRequest;

/// Lifecycle of a session as observed through its status events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Not started yet, or stopped/terminated.
    #[default]
    Disconnected,
    /// The session reported `SessionStarted`.
    Started,
    /// The service has been requested and the answer is pending.
    ServiceOpening,
    /// The service is open and accepts requests.
    ServiceOpen,
    /// Startup or service open failed. Terminal for this session.
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Started => "started",
            SessionState::ServiceOpening => "service-opening",
            SessionState::ServiceOpen => "service-open",
            SessionState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// The outbound half of a connection to the rank service.
///
/// Every method returns without waiting for the remote side. Outcomes come back
/// later as [`Event`]s delivered to the [`EventHandler`] registered with the
/// implementation, on whatever thread or task the implementation owns.
/// Implementations must not call back into the handler from inside these
/// methods.
pub trait Session: Send + Sync {
    /// Begins session startup. Completion is reported as `SessionStarted` or
    /// `SessionStartupFailure`.
    fn start_async(&self) -> Result<(), RankError>;

    /// Asks for the named service. Completion is reported as `ServiceOpened`
    /// or `ServiceOpenFailure`.
    fn open_service_async(&self, service: &str) -> Result<(), RankError>;

    /// Submits a query on an opened service, tagged with `cid`.
    fn send_request(
        &self,
        service: &str,
        request: &QueryRequest,
        cid: CorrelationId,
    ) -> Result<(), RankError>;

    /// Requests shutdown. Calling it more than once is harmless.
    fn stop(&self);
}

/// Receives every event a [`Session`] produces.
///
/// Implementations run synchronously on the delivering thread and must not
/// panic or block; failures are logged, not returned.
pub trait EventHandler: Send + Sync {
    fn process_event(&self, event: &Event, session: &dyn Session);
}
