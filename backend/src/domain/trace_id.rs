//! Correlation identifier shared by a request's log lines and error bodies.
//!
//! The HTTP layer opens a scope per request; anything running inside it,
//! including blocking password work started through [`TraceId::spawn_blocking`],
//! can read the id back with [`TraceId::current`].

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task::JoinHandle;
use tokio::task_local;
use uuid::Uuid;

/// Header carrying the identifier on requests and responses.
pub const TRACE_ID_HEADER: &str = "trace-id";

task_local! {
    static ACTIVE: TraceId;
}

/// Identifier for one request as it crosses the directory's layers.
///
/// # Examples
/// ```
/// use staff_directory::domain::TraceId;
///
/// let inbound = TraceId::adopt_or_generate(Some("00000000-0000-0000-0000-000000000001"));
/// assert_eq!(inbound.to_string(), "00000000-0000-0000-0000-000000000001");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Reuse a caller-supplied header value when it is a UUID.
    ///
    /// Services calling `/internal/v1` forward their own id so both sides
    /// log under the same value. Anything unparsable is replaced.
    #[must_use]
    pub fn adopt_or_generate(header: Option<&str>) -> Self {
        header
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or_else(Self::generate)
    }

    /// Identifier of the enclosing request scope, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        ACTIVE.try_with(|id| *id).ok()
    }

    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Run `fut` with `self` as the current identifier.
    ///
    /// # Examples
    /// ```
    /// use staff_directory::domain::TraceId;
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let id = TraceId::generate();
    /// assert_eq!(id.scope(async { TraceId::current() }).await, Some(id));
    /// # });
    /// ```
    pub async fn scope<Fut>(self, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        ACTIVE.scope(self, fut).await
    }

    /// `tokio::task::spawn_blocking` that keeps the caller's identifier.
    ///
    /// Task-locals do not follow work onto the blocking pool on their own.
    pub fn spawn_blocking<F, R>(work: F) -> JoinHandle<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        match Self::current() {
            Some(id) => tokio::task::spawn_blocking(move || ACTIVE.sync_scope(id, work)),
            None => tokio::task::spawn_blocking(work),
        }
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}
