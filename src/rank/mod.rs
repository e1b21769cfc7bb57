mod api;
mod model;
mod wire;

pub(crate) use api::{Payload, decode_message};
pub use model::{
    Broker, BrokerSelector, ErrorInfo, ExchangeCode, GroupBy, QueryRequest, RankReport,
    ReportRecord, SecurityCriteria, SecurityId, Source, Units,
};

use chrono::NaiveDate;

use crate::{RankClient, RankError};

/// A builder for a broker rank query.
///
/// Collects the parameters of the `Query` operation, validates them in
/// [`build`](Self::build), and can send the result through the client it was
/// created from.
pub struct RankQueryBuilder<'a> {
    client: &'a RankClient,
    brokers: Vec<BrokerSelector>,
    range: Option<(NaiveDate, NaiveDate)>,
    group_by: GroupBy,
    securities: Vec<SecurityId>,
    exchanges: Vec<ExchangeCode>,
    source: Source,
    units: Units,
}

impl<'a> RankQueryBuilder<'a> {
    /// Creates a new `RankQueryBuilder` bound to `client`.
    pub fn new(client: &'a RankClient) -> Self {
        Self {
            client,
            brokers: Vec::new(),
            range: None,
            group_by: GroupBy::default(),
            securities: Vec::new(),
            exchanges: Vec::new(),
            source: Source::default(),
            units: Units::default(),
        }
    }

    /// Restrict to a broker by acronym (e.g. `"BCAP"`).
    pub fn broker_acronym(mut self, acronym: impl Into<String>) -> Self {
        self.brokers.push(BrokerSelector::Acronym(acronym.into()));
        self
    }

    /// Restrict to a broker by its full name.
    pub fn broker_name(mut self, name: impl Into<String>) -> Self {
        self.brokers.push(BrokerSelector::Name(name.into()));
        self
    }

    /// Restrict to the broker at this rank.
    pub fn broker_rank(mut self, rank: u32) -> Self {
        self.brokers.push(BrokerSelector::Rank(rank));
        self
    }

    /// Inclusive date range of the report.
    pub fn between(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.range = Some((start, end));
        self
    }

    pub fn group_by(mut self, group_by: GroupBy) -> Self {
        self.group_by = group_by;
        self
    }

    /// Add a security by ticker (e.g. `"AAPL US Equity"`).
    pub fn ticker(mut self, ticker: impl Into<String>) -> Self {
        self.securities.push(SecurityId::Ticker(ticker.into()));
        self
    }

    /// Add a security by FIGI.
    pub fn figi(mut self, figi: impl Into<String>) -> Self {
        self.securities.push(SecurityId::Figi(figi.into()));
        self
    }

    /// Add a whole exchange by code (e.g. `"US"`). Cannot be combined with securities.
    pub fn exchange(mut self, code: impl Into<String>) -> Self {
        self.exchanges.push(ExchangeCode { code: code.into() });
        self
    }

    pub fn source(mut self, source: Source) -> Self {
        self.source = source;
        self
    }

    pub fn units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    /// Validates the parameters and produces the request.
    ///
    /// # Errors
    /// `InvalidParams` when the date range is missing or securities and exchanges
    /// are both given or both empty; `InvalidDates` when start is after end.
    pub fn build(&self) -> Result<QueryRequest, RankError> {
        let (start, end) = self
            .range
            .ok_or_else(|| RankError::InvalidParams("a date range is required".into()))?;

        let criteria = match (self.securities.is_empty(), self.exchanges.is_empty()) {
            (false, true) => SecurityCriteria::Securities(self.securities.clone()),
            (true, false) => SecurityCriteria::Exchanges(self.exchanges.clone()),
            (false, false) => {
                return Err(RankError::InvalidParams(
                    "choose either securities or exchanges, not both".into(),
                ));
            }
            (true, true) => {
                return Err(RankError::InvalidParams(
                    "at least one security or exchange is required".into(),
                ));
            }
        };

        let mut req = QueryRequest::new(start, end, criteria)?;
        req.brokers = self.brokers.clone();
        req.group_by = self.group_by;
        req.source = self.source;
        req.units = self.units;
        Ok(req)
    }

    /// Builds the request and runs it to completion on a fresh session.
    pub async fn fetch(self) -> Result<RankReport, RankError> {
        let req = self.build()?;
        self.client.fetch(req).await
    }
}
