//! Public client surface + builder.
//! Defaults live in `constants`.

mod constants;

pub use constants::{BETA_SERVICE, PROD_SERVICE};

use std::sync::Arc;
use std::time::Duration;

use constants::{DEFAULT_HOST, DEFAULT_MAX_PENDING_REQUESTS, DEFAULT_PORT};
use tracing::info;
use url::Url;

use crate::bridge::{BridgeSession, StartOptions};
use crate::core::{RankError, Session};
use crate::dispatch::{Completion, RankEventHandler};
use crate::rank::{QueryRequest, RankQueryBuilder, RankReport};

/// Connection settings for the rank service, plus the high-level `fetch`.
#[derive(Debug, Clone)]
pub struct RankClient {
    host: String,
    port: u16,
    service: String,
    max_pending: usize,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl Default for RankClient {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            service: BETA_SERVICE.to_string(),
            max_pending: DEFAULT_MAX_PENDING_REQUESTS,
            timeout: None,
            connect_timeout: None,
        }
    }
}

impl RankClient {
    /// Create a new builder.
    pub fn builder() -> RankClientBuilder {
        RankClientBuilder::default()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// The service name queries are sent to.
    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn max_pending_requests(&self) -> usize {
        self.max_pending
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// WebSocket address of the bridge gateway.
    pub fn bridge_url(&self) -> Result<Url, RankError> {
        Ok(Url::parse(&format!("ws://{}:{}/", self.host, self.port))?)
    }

    /// A fresh dispatcher configured for this client's service.
    pub fn event_handler(&self) -> RankEventHandler {
        RankEventHandler::new(self.service.clone()).with_max_pending(self.max_pending)
    }

    /// Start building a rank query.
    pub fn rank(&self) -> RankQueryBuilder<'_> {
        RankQueryBuilder::new(self)
    }

    /// Runs one query to completion on a new bridge session.
    ///
    /// Connects, starts the session, waits for the terminal response (bounded
    /// by the configured timeout, if any) and stops the session.
    ///
    /// # Errors
    /// Any fatal [`RankError`]: connection, startup, service open, submission,
    /// an error payload from the service, or a timeout.
    #[tracing::instrument(skip(self, request), err, fields(service = %self.service))]
    pub async fn fetch(&self, request: QueryRequest) -> Result<RankReport, RankError> {
        request.validate()?;

        let handler = Arc::new(self.event_handler());
        let completion = handler.submit(request);

        let url = self.bridge_url()?;
        info!(%url, "connecting to rank gateway");
        let options = StartOptions {
            server_host: self.host.clone(),
            server_port: self.port,
            max_pending_requests: self.max_pending,
        };
        let connect = BridgeSession::connect(&url, options, handler);
        let mut session = match self.connect_timeout {
            Some(d) => tokio::time::timeout(d, connect)
                .await
                .map_err(|_| RankError::Timeout(d))??,
            None => connect.await?,
        };

        let outcome = match session.start_async() {
            Ok(()) => self.wait(completion).await,
            Err(e) => Err(e),
        };
        session.stop();
        session.closed().await;
        outcome
    }

    /// Waits on a submitted query, bounded by the configured timeout.
    pub async fn wait(&self, completion: Completion) -> Result<RankReport, RankError> {
        match self.timeout {
            Some(d) => tokio::time::timeout(d, completion.wait())
                .await
                .map_err(|_| RankError::Timeout(d))?,
            None => completion.wait().await,
        }
    }
}

/* ----------------------- Builder ----------------------- */

#[derive(Default)]
pub struct RankClientBuilder {
    host: Option<String>,
    port: Option<u16>,
    service: Option<String>,
    max_pending: Option<usize>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl RankClientBuilder {
    /// Gateway host. Default: `localhost`.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Gateway port. Default: 8194.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Service name. Default: the beta rank service.
    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Queries allowed in flight on one session. Default: 1.
    pub fn max_pending_requests(mut self, n: usize) -> Self {
        self.max_pending = Some(n);
        self
    }

    /// Bound the wait for a terminal response. Default: wait indefinitely.
    pub fn timeout(mut self, dur: Duration) -> Self {
        self.timeout = Some(dur);
        self
    }

    /// Bound the WebSocket connect. Default: none.
    pub fn connect_timeout(mut self, dur: Duration) -> Self {
        self.connect_timeout = Some(dur);
        self
    }

    pub fn build(self) -> Result<RankClient, RankError> {
        let defaults = RankClient::default();

        let host = self.host.unwrap_or(defaults.host);
        if host.trim().is_empty() {
            return Err(RankError::InvalidParams("host must not be empty".into()));
        }
        let port = self.port.unwrap_or(defaults.port);
        if port == 0 {
            return Err(RankError::InvalidParams("port must be non-zero".into()));
        }
        let service = self.service.unwrap_or(defaults.service);
        if service.trim().is_empty() {
            return Err(RankError::InvalidParams("service must not be empty".into()));
        }
        let max_pending = self.max_pending.unwrap_or(defaults.max_pending);
        if max_pending == 0 {
            return Err(RankError::InvalidParams(
                "max_pending_requests must be at least 1".into(),
            ));
        }

        Ok(RankClient {
            host,
            port,
            service,
            max_pending,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
        })
    }
}
