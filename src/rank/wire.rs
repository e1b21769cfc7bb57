use serde::Deserialize;

use crate::core::wire::de_i64_from_any_number;

#[derive(Deserialize)]
pub(crate) struct ErrorInfoNode {
    #[serde(
        rename = "errorCode",
        alias = "ERROR_CODE",
        alias = "ErrorCode",
        deserialize_with = "de_i64_from_any_number"
    )]
    pub(crate) error_code: i64,
    #[serde(
        rename = "errorMessage",
        alias = "ERROR_MESSAGE",
        alias = "ErrorMsg"
    )]
    pub(crate) error_message: String,
    // Older gateways send this key with a space in it.
    #[serde(rename = "timestampUtc", alias = "timestamp Utc", default)]
    pub(crate) timestamp_utc: Option<f64>,
}

#[derive(Deserialize)]
pub(crate) struct ReportNode {
    #[serde(default)]
    pub(crate) records: Vec<RecordNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RecordNode {
    pub(crate) broker: BrokerNode,
    pub(crate) bought: f64,
    pub(crate) crossed: f64,
    pub(crate) high_touch: f64,
    pub(crate) low_touch: f64,
    #[serde(deserialize_with = "de_i64_from_any_number")]
    pub(crate) num_reports: i64,
    #[serde(default)]
    pub(crate) security: Option<SecurityNode>,
    pub(crate) sold: f64,
    pub(crate) total: f64,
    pub(crate) traded: f64,
}

#[derive(Deserialize)]
pub(crate) struct BrokerNode {
    pub(crate) acronym: String,
    #[serde(default)]
    pub(crate) rank: Option<u32>,
}

#[derive(Deserialize)]
pub(crate) struct SecurityNode {
    pub(crate) ticker: Option<String>,
    pub(crate) figi: Option<String>,
}
