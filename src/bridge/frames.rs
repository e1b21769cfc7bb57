use serde::Serialize;

use crate::core::CorrelationId;
use crate::rank::QueryRequest;

/// Session options forwarded to the gateway on start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartOptions {
    pub server_host: String,
    pub server_port: u16,
    pub max_pending_requests: usize,
}

/// Client to gateway frames.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub(crate) enum ClientFrame {
    Start(StartOptions),
    #[serde(rename_all = "camelCase")]
    OpenService { service: String },
    #[serde(rename_all = "camelCase")]
    SendRequest {
        service: String,
        operation: &'static str,
        correlation_id: CorrelationId,
        request: QueryRequest,
    },
    Stop,
}

/// The only operation the rank service exposes.
pub(crate) const QUERY_OPERATION: &str = "Query";
