//! # Errors
//!
//! Error kinds surfaced by fetchers, publishers and the configurator.

use thiserror::Error;

use crate::connection::ConnectionDetails;
use crate::crd::ConnectionDetailType;

#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The composite's type does not match the composition's `compositeTypeRef`
    #[error(
        "referenced composition is not compatible with this composite resource: \
         composition expects {expected_api_version}, Kind={expected_kind}, \
         got {api_version}, Kind={kind}"
    )]
    CompositionMismatch {
        expected_api_version: String,
        expected_kind: String,
        api_version: String,
        kind: String,
    },

    /// A `FromConnectionSecretKey` declaration without its source key
    #[error("connection detail of type {detail_type} key is not set")]
    MissingKeyReference { detail_type: ConnectionDetailType },

    #[error("cannot fetch connection secret: {0}")]
    FetchSecret(#[source] anyhow::Error),

    #[error("cannot publish connection details: {0}")]
    Publish(#[source] anyhow::Error),

    #[error("cannot update composite resource: {0}")]
    UpdateComposite(#[source] anyhow::Error),

    #[error("operation cancelled")]
    Cancelled,
}

impl ConnectionError {
    /// Check if the error is worth retrying on a later reconcile.
    ///
    /// Store and persistence failures are retryable; malformed input and
    /// cancellation are not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            ConnectionError::FetchSecret(_)
            | ConnectionError::Publish(_)
            | ConnectionError::UpdateComposite(_) => true,
            ConnectionError::CompositionMismatch { .. }
            | ConnectionError::MissingKeyReference { .. }
            | ConnectionError::Cancelled => false,
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ConnectionError::Cancelled)
    }

    /// Wrap a collaborator failure with `wrap`, unless the collaborator
    /// itself observed cancellation
    pub(crate) fn from_collaborator(
        err: anyhow::Error,
        wrap: fn(anyhow::Error) -> ConnectionError,
    ) -> ConnectionError {
        match err.downcast_ref::<ConnectionError>() {
            Some(ConnectionError::Cancelled) => ConnectionError::Cancelled,
            _ => wrap(err),
        }
    }
}

/// A failed fetch together with whatever details were gathered before it
#[derive(Debug, Error)]
#[error("{source}")]
pub struct FetchError {
    /// Details merged before the failure, if any
    pub partial: Option<ConnectionDetails>,
    #[source]
    pub source: ConnectionError,
}

impl FetchError {
    /// Attach partially gathered details
    #[must_use]
    pub fn with_partial(mut self, partial: ConnectionDetails) -> Self {
        self.partial = Some(partial);
        self
    }
}

impl From<ConnectionError> for FetchError {
    fn from(source: ConnectionError) -> Self {
        Self {
            partial: None,
            source,
        }
    }
}

/// A failed publish together with whether anything was published before it
#[derive(Debug, Error)]
#[error("{source}")]
pub struct PublishError {
    /// True when an earlier publisher already published
    pub published: bool,
    #[source]
    pub source: ConnectionError,
}

impl From<ConnectionError> for PublishError {
    fn from(source: ConnectionError) -> Self {
        Self {
            published: false,
            source,
        }
    }
}
