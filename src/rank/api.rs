use serde::Deserialize;

use crate::{
    core::{Message, MessageType, RankError},
    rank::{
        model::{Broker, ErrorInfo, ReportRecord, SecurityId},
        wire::{ErrorInfoNode, RecordNode, ReportNode, SecurityNode},
    },
};

/// A response message after decoding.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Payload {
    Error(ErrorInfo),
    Report(Vec<ReportRecord>),
    /// A message type this crate does not model, kept by name.
    Unknown(String),
}

pub(crate) fn decode_message(msg: &Message) -> Result<Payload, RankError> {
    match msg.message_type() {
        MessageType::ErrorInfo => {
            let node = ErrorInfoNode::deserialize(msg.elements())
                .map_err(|e| RankError::Data(format!("ErrorInfo: {e}")))?;
            let code = i32::try_from(node.error_code).map_err(|_| {
                RankError::Data(format!("ErrorInfo: code {} out of range", node.error_code))
            })?;
            Ok(Payload::Error(ErrorInfo {
                code,
                message: node.error_message,
                timestamp_utc: node.timestamp_utc,
            }))
        }
        MessageType::Report => {
            let node = ReportNode::deserialize(msg.elements())
                .map_err(|e| RankError::Data(format!("Report: {e}")))?;
            let records = node
                .records
                .into_iter()
                .map(map_record)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Payload::Report(records))
        }
        other => Ok(Payload::Unknown(other.name().to_string())),
    }
}

fn map_record(node: RecordNode) -> Result<ReportRecord, RankError> {
    let security = node.security.map(map_security).transpose()?;
    Ok(ReportRecord {
        broker: Broker {
            acronym: node.broker.acronym,
            rank: node.broker.rank,
        },
        bought: node.bought,
        crossed: node.crossed,
        high_touch: node.high_touch,
        low_touch: node.low_touch,
        num_reports: node.num_reports,
        security,
        sold: node.sold,
        total: node.total,
        traded: node.traded,
    })
}

fn map_security(node: SecurityNode) -> Result<SecurityId, RankError> {
    match (node.ticker, node.figi) {
        (Some(t), _) => Ok(SecurityId::Ticker(t)),
        (None, Some(f)) => Ok(SecurityId::Figi(f)),
        (None, None) => Err(RankError::Data(
            "record security has neither ticker nor figi".into(),
        )),
    }
}
