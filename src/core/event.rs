//! Events and messages as delivered by a [`Session`](crate::core::Session).
//!
//! An [`Event`] carries a kind and an ordered batch of [`Message`]s. The kind is a
//! closed set so that the dispatcher can match on it exhaustively; anything the
//! crate does not model lands in [`EventKind::Other`] with its original name.

use std::fmt;

use serde_json::Value;

use crate::core::CorrelationId;

/// The category of an inbound event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Session lifecycle: started, startup failure, terminated, connection up/down.
    SessionStatus,
    /// Service lifecycle: opened, open failure.
    ServiceStatus,
    /// Terminal answer to a request.
    Response,
    /// Non-terminal answer; more messages follow for the same correlation id.
    PartialResponse,
    /// Any other event kind (admin, timeout, ...), kept by name.
    Other(String),
}

impl EventKind {
    /// Maps a wire name such as `"PARTIAL_RESPONSE"` to a kind.
    pub fn from_name(name: &str) -> Self {
        match name {
            "SESSION_STATUS" => EventKind::SessionStatus,
            "SERVICE_STATUS" => EventKind::ServiceStatus,
            "RESPONSE" => EventKind::Response,
            "PARTIAL_RESPONSE" => EventKind::PartialResponse,
            other => EventKind::Other(other.to_string()),
        }
    }

    /// The wire name of this kind.
    pub fn name(&self) -> &str {
        match self {
            EventKind::SessionStatus => "SESSION_STATUS",
            EventKind::ServiceStatus => "SERVICE_STATUS",
            EventKind::Response => "RESPONSE",
            EventKind::PartialResponse => "PARTIAL_RESPONSE",
            EventKind::Other(name) => name,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The type name of a single message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageType {
    SessionStarted,
    SessionStartupFailure,
    SessionTerminated,
    SessionConnectionUp,
    SessionConnectionDown,
    ServiceOpened,
    ServiceOpenFailure,
    SlowConsumerWarning,
    SlowConsumerWarningCleared,
    ErrorInfo,
    Report,
    Other(String),
}

impl MessageType {
    /// Maps a wire name such as `"ServiceOpened"` to a message type.
    pub fn from_name(name: &str) -> Self {
        match name {
            "SessionStarted" => MessageType::SessionStarted,
            "SessionStartupFailure" => MessageType::SessionStartupFailure,
            "SessionTerminated" => MessageType::SessionTerminated,
            "SessionConnectionUp" => MessageType::SessionConnectionUp,
            "SessionConnectionDown" => MessageType::SessionConnectionDown,
            "ServiceOpened" => MessageType::ServiceOpened,
            "ServiceOpenFailure" => MessageType::ServiceOpenFailure,
            "SlowConsumerWarning" => MessageType::SlowConsumerWarning,
            "SlowConsumerWarningCleared" => MessageType::SlowConsumerWarningCleared,
            "ErrorInfo" => MessageType::ErrorInfo,
            "Report" => MessageType::Report,
            other => MessageType::Other(other.to_string()),
        }
    }

    /// The wire name of this message type.
    pub fn name(&self) -> &str {
        match self {
            MessageType::SessionStarted => "SessionStarted",
            MessageType::SessionStartupFailure => "SessionStartupFailure",
            MessageType::SessionTerminated => "SessionTerminated",
            MessageType::SessionConnectionUp => "SessionConnectionUp",
            MessageType::SessionConnectionDown => "SessionConnectionDown",
            MessageType::ServiceOpened => "ServiceOpened",
            MessageType::ServiceOpenFailure => "ServiceOpenFailure",
            MessageType::SlowConsumerWarning => "SlowConsumerWarning",
            MessageType::SlowConsumerWarningCleared => "SlowConsumerWarningCleared",
            MessageType::ErrorInfo => "ErrorInfo",
            MessageType::Report => "Report",
            MessageType::Other(name) => name,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One message inside an [`Event`].
///
/// The payload stays as an untyped element tree until the response decoder
/// in [`crate::rank`] turns it into typed records.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    message_type: MessageType,
    correlation_ids: Vec<CorrelationId>,
    elements: Value,
}

impl Message {
    /// A message of the given type with no correlation ids and an empty payload.
    pub fn new(message_type: MessageType) -> Self {
        Self {
            message_type,
            correlation_ids: Vec::new(),
            elements: Value::Null,
        }
    }

    /// Appends a correlation id.
    pub fn with_correlation_id(mut self, cid: CorrelationId) -> Self {
        self.correlation_ids.push(cid);
        self
    }

    /// Replaces the payload.
    pub fn with_elements(mut self, elements: Value) -> Self {
        self.elements = elements;
        self
    }

    pub fn message_type(&self) -> &MessageType {
        &self.message_type
    }

    /// The first correlation id, which is the one responses are matched on.
    pub fn correlation_id(&self) -> Option<CorrelationId> {
        self.correlation_ids.first().copied()
    }

    pub fn correlation_ids(&self) -> &[CorrelationId] {
        &self.correlation_ids
    }

    pub fn elements(&self) -> &Value {
        &self.elements
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message_type)?;
        if !self.correlation_ids.is_empty() {
            let ids: Vec<String> = self.correlation_ids.iter().map(ToString::to_string).collect();
            write!(f, " [{}]", ids.join(","))?;
        }
        if !self.elements.is_null() {
            write!(f, " {}", self.elements)?;
        }
        Ok(())
    }
}

/// A batch of messages of one kind, delivered together.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    kind: EventKind,
    messages: Vec<Message>,
}

impl Event {
    pub fn new(kind: EventKind, messages: Vec<Message>) -> Self {
        Self { kind, messages }
    }

    /// A session-status event reporting that the session is gone.
    ///
    /// Transports emit this when the underlying connection closes so that
    /// outstanding requests resolve instead of waiting forever.
    pub fn session_terminated() -> Self {
        Self::new(
            EventKind::SessionStatus,
            vec![Message::new(MessageType::SessionTerminated)],
        )
    }

    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}

impl<'a> IntoIterator for &'a Event {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
