//! Unified error type for the dispatch engine.
//!
//! Every failure a task can hit — from an empty prompt to an unreachable
//! provider — collapses into one [`Error`] with a stable machine-readable
//! kind. Callers branch on [`Error::kind`], not on display text.

use thiserror::Error;

/// Failure taxonomy for a dispatched task.
///
/// HTTP failures from the provider are pre-classified by status code
/// (401/429/400/other); transport failures distinguish an exceeded deadline
/// from an unreachable network. Parse failures of expected structured output
/// are deliberately *not* represented here — the generation succeeded, and the
/// assembler returns the raw text instead (see `assemble`).
#[derive(Debug, Error)]
pub enum Error {
    /// The task description had no usable user prompt, even after
    /// legacy-field migration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Provider credentials were never configured; the service cannot
    /// dispatch anything. Maps to a service-unavailable state upstream.
    #[error("AI service is not initialized: {0}")]
    NotInitialized(String),

    /// HTTP 401 from the provider.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// HTTP 429 from the provider.
    #[error("rate limited by provider: {0}")]
    RateLimited(String),

    /// HTTP 400 from the provider.
    #[error("provider rejected request: {0}")]
    BadRequest(String),

    /// Any other non-2xx provider response.
    #[error("provider error (HTTP {status}): {message}")]
    Provider { status: u16, message: String },

    /// The request deadline elapsed before a response arrived.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The provider endpoint could not be reached at all.
    #[error("connection failed: {0}")]
    Connection(String),

    /// A 2xx response whose body does not carry the expected shape
    /// (missing or empty `choices`).
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

impl Error {
    /// Stable machine-readable kind, carried verbatim in failure envelopes.
    #[inline]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotInitialized(_) => "not_initialized",
            Self::Authentication(_) => "authentication_error",
            Self::RateLimited(_) => "rate_limited",
            Self::BadRequest(_) => "bad_request",
            Self::Provider { .. } => "provider_error",
            Self::Timeout(_) => "timeout",
            Self::Connection(_) => "connection_error",
            Self::MalformedResponse(_) => "malformed_response",
        }
    }

    /// Whether this failure is the caller's fault (malformed input) rather
    /// than a provider- or transport-side condition.
    #[inline]
    pub fn is_client_fault(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::BadRequest(_))
    }

    /// Whether the surrounding service should be reported unavailable (503)
    /// instead of failing the individual request.
    #[inline]
    pub fn is_service_unavailable(&self) -> bool {
        matches!(self, Self::NotInitialized(_))
    }
}
