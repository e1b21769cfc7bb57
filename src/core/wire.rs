use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::core::{CorrelationId, Event, EventKind, Message, MessageType, RankError};

/// One event as framed by the bridge gateway.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EventFrame {
    pub(crate) event_type: String,
    #[serde(default)]
    pub(crate) messages: Vec<MessageFrame>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MessageFrame {
    pub(crate) message_type: String,
    #[serde(default)]
    pub(crate) correlation_ids: Vec<CorrelationId>,
    #[serde(default)]
    pub(crate) elements: Value,
}

impl From<EventFrame> for Event {
    fn from(frame: EventFrame) -> Self {
        let messages = frame
            .messages
            .into_iter()
            .map(|m| {
                m.correlation_ids.into_iter().fold(
                    Message::new(MessageType::from_name(&m.message_type))
                        .with_elements(m.elements),
                    Message::with_correlation_id,
                )
            })
            .collect();
        Event::new(EventKind::from_name(&frame.event_type), messages)
    }
}

pub(crate) fn decode_event(text: &str) -> Result<Event, RankError> {
    let frame: EventFrame = serde_json::from_str(text)
        .map_err(|e| RankError::Data(format!("event frame parse: {e}")))?;
    Ok(frame.into())
}

/// Payload of session/service status messages. Only the failure reason is used.
#[derive(Deserialize, Default)]
pub(crate) struct StatusNode {
    pub(crate) reason: Option<ReasonNode>,
}

#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum ReasonNode {
    Detailed {
        description: Option<String>,
        category: Option<String>,
    },
    Text(String),
}

/// Best-effort human readable reason attached to a status message.
pub(crate) fn status_reason(msg: &Message) -> String {
    let node = StatusNode::deserialize(msg.elements()).unwrap_or_default();
    match node.reason {
        Some(ReasonNode::Text(text)) => text,
        Some(ReasonNode::Detailed {
            description: Some(d),
            ..
        }) => d,
        Some(ReasonNode::Detailed {
            category: Some(c), ..
        }) => c,
        _ => msg.message_type().name().to_string(),
    }
}

/// Accepts integers that were encoded as whole floats (`2.0`).
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn de_i64_from_any_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum AnyNumber {
        I64(i64),
        F64(f64),
    }

    match AnyNumber::deserialize(deserializer)? {
        AnyNumber::I64(i) => Ok(i),
        AnyNumber::F64(f) => {
            if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
                Ok(f as i64)
            } else {
                Err(serde::de::Error::custom(format!(
                    "cannot convert float {f} to integer"
                )))
            }
        }
    }
}
