//! Per-request context threaded through the handler chain.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::time::Instant;
use userhub_auth::Claims;
use uuid::Uuid;

/// Request metadata written once when the request enters the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Values {
    pub trace_id: Uuid,
    pub now: DateTime<Utc>,
}

impl Values {
    pub fn new() -> Self {
        Self {
            trace_id: Uuid::new_v4(),
            now: Utc::now(),
        }
    }
}

impl Default for Values {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable bag of request-scoped data. Middleware derive a new context
/// with [`Context::with_claims`] rather than mutating the one they were given.
#[derive(Debug, Clone, Default)]
pub struct Context {
    values: Option<Arc<Values>>,
    claims: Option<Arc<Claims>>,
    deadline: Option<Instant>,
}

impl Context {
    pub fn new(values: Values, deadline: Option<Instant>) -> Self {
        Self {
            values: Some(Arc::new(values)),
            claims: None,
            deadline,
        }
    }

    /// A context with no request values, claims or deadline, for work that
    /// does not originate from a request.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn values(&self) -> Option<&Values> {
        self.values.as_deref()
    }

    pub fn claims(&self) -> Option<&Claims> {
        self.claims.as_deref()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn with_claims(self, claims: Claims) -> Self {
        Self {
            claims: Some(Arc::new(claims)),
            ..self
        }
    }

    pub fn with_deadline(self, deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            ..self
        }
    }
}
