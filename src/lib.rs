//! rankapi-rs: asynchronous client for broker rank statistics.
//!
//! A session delivers events (session status, service status, responses) to an
//! [`EventHandler`]. [`RankEventHandler`] opens the rank service when the
//! session starts, sends queued [`QueryRequest`]s tagged with fresh
//! [`CorrelationId`]s once the service is open, and resolves each caller's
//! [`Completion`] when the terminal response for its id arrives.
//!
//! [`RankClient::fetch`] wires this to a [`BridgeSession`], a JSON-over-WebSocket
//! link to a local gateway. Any other transport can implement [`Session`].
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use rankapi_rs::RankClient;
//!
//! # async fn run() -> Result<(), rankapi_rs::RankError> {
//! let client = RankClient::builder().build()?;
//! let report = client
//!     .rank()
//!     .broker_acronym("BCAP")
//!     .between(
//!         NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
//!         NaiveDate::from_ymd_opt(2020, 4, 1).unwrap(),
//!     )
//!     .ticker("AAPL US Equity")
//!     .fetch()
//!     .await?;
//! for record in &report {
//!     println!("{record}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod bridge;
pub mod core;
pub mod dispatch;
pub mod rank;

pub use bridge::{BridgeSender, BridgeSession, StartOptions};
pub use crate::core::client::{BETA_SERVICE, PROD_SERVICE};
pub use crate::core::{
    CorrelationId, Event, EventHandler, EventKind, Message, MessageType, RankClient,
    RankClientBuilder, RankError, Session, SessionState,
};
pub use dispatch::{Completion, RankEventHandler};
pub use rank::{
    Broker, BrokerSelector, ErrorInfo, ExchangeCode, GroupBy, QueryRequest, RankQueryBuilder,
    RankReport, ReportRecord, SecurityCriteria, SecurityId, Source, Units,
};
