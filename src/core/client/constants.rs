//! Centralized defaults for the connection and service names.

/// Host of the local bridge gateway.
pub(crate) const DEFAULT_HOST: &str = "localhost";

/// Port of the local bridge gateway.
pub(crate) const DEFAULT_PORT: u16 = 8194;

/// Beta rank service; what the sample programs target.
pub const BETA_SERVICE: &str = "//blp/rankapi-beta";

/// Production rank service.
pub const PROD_SERVICE: &str = "//blp/rankapi";

/// Queries allowed in flight at once on one session.
pub(crate) const DEFAULT_MAX_PENDING_REQUESTS: usize = 1;
