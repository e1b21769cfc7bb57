use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::core::{CorrelationId, RankError};

/// Selects a broker by acronym, full name or league-table rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BrokerSelector {
    Acronym(String),
    Name(String),
    Rank(u32),
}

/// How report rows are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum GroupBy {
    #[default]
    Broker,
    Security,
}

/// A security identifier: Bloomberg-style ticker or FIGI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SecurityId {
    /// e.g. `"AAPL US Equity"`.
    Ticker(String),
    /// e.g. `"BBG000B9XRY4"`.
    Figi(String),
}

impl fmt::Display for SecurityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityId::Ticker(t) => write!(f, "ticker {t}"),
            SecurityId::Figi(id) => write!(f, "figi {id}"),
        }
    }
}

/// An exchange code such as `"US"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExchangeCode {
    pub code: String,
}

/// Restricts the query to whole exchanges or to specific securities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SecurityCriteria {
    Exchanges(Vec<ExchangeCode>),
    Securities(Vec<SecurityId>),
}

impl SecurityCriteria {
    fn is_empty(&self) -> bool {
        match self {
            SecurityCriteria::Exchanges(v) => v.is_empty(),
            SecurityCriteria::Securities(v) => v.is_empty(),
        }
    }
}

/// Where the traded volumes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Source {
    #[default]
    #[serde(rename = "Broker Contributed")]
    BrokerContributed,
}

/// Unit of the reported quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Units {
    #[default]
    Shares,
    /// Local currency of the security.
    Local,
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "GBP")]
    Gbp,
}

/// A validated rank query, ready to be sent.
///
/// Serializes to the outbound request schema of the `Query` operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub brokers: Vec<BrokerSelector>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub group_by: GroupBy,
    pub security_criteria: SecurityCriteria,
    pub source: Source,
    pub units: Units,
}

impl QueryRequest {
    /// A query over `[start, end]` with every other parameter at its default
    /// (all brokers, grouped by broker, broker-contributed, shares).
    pub fn new(
        start: NaiveDate,
        end: NaiveDate,
        security_criteria: SecurityCriteria,
    ) -> Result<Self, RankError> {
        let req = Self {
            brokers: Vec::new(),
            start,
            end,
            group_by: GroupBy::default(),
            security_criteria,
            source: Source::default(),
            units: Units::default(),
        };
        req.validate()?;
        Ok(req)
    }

    /// Checks the invariants a service would otherwise reject.
    pub fn validate(&self) -> Result<(), RankError> {
        if self.start > self.end {
            return Err(RankError::InvalidDates);
        }
        if self.security_criteria.is_empty() {
            return Err(RankError::InvalidParams(
                "securityCriteria needs at least one exchange or security".into(),
            ));
        }
        Ok(())
    }
}

/// The broker a report row belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Broker {
    pub acronym: String,
    pub rank: Option<u32>,
}

/// One row of broker-level trading statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRecord {
    pub broker: Broker,
    pub bought: f64,
    pub crossed: f64,
    pub high_touch: f64,
    pub low_touch: f64,
    pub num_reports: i64,
    /// Present when the query was grouped by security.
    pub security: Option<SecurityId>,
    pub sold: f64,
    pub total: f64,
    pub traded: f64,
}

impl fmt::Display for ReportRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Broker: {}", self.broker.acronym)?;
        if let Some(rank) = self.broker.rank {
            write!(f, " (rank {rank})")?;
        }
        if let Some(sec) = &self.security {
            write!(f, "\tSecurity: {sec}")?;
        }
        write!(
            f,
            "\nBought: {}\tCrossed: {}\tHigh Touch: {}\tLow Touch: {}\
             \nNumber of Reports: {}\tSold: {}\tTotal: {}\tTraded: {}",
            self.bought,
            self.crossed,
            self.high_touch,
            self.low_touch,
            self.num_reports,
            self.sold,
            self.total,
            self.traded
        )
    }
}

/// Error payload returned inside a response envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorInfo {
    pub code: i32,
    pub message: String,
    pub timestamp_utc: Option<f64>,
}

impl From<ErrorInfo> for RankError {
    fn from(info: ErrorInfo) -> Self {
        RankError::Api {
            code: info.code,
            message: info.message,
        }
    }
}

/// The completed answer to one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankReport {
    pub correlation_id: CorrelationId,
    /// Rows in the order the service sent them, partial responses first.
    pub records: Vec<ReportRecord>,
}

impl RankReport {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReportRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a RankReport {
    type Item = &'a ReportRecord;
    type IntoIter = std::slice::Iter<'a, ReportRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
