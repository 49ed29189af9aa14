//! Registry error types.

use crate::aggregate::AggregateId;
use crate::error::{ErrorKind, StatError};

/// Errors raised by [`Registry`](super::Registry) operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("aggregate `{signature}` already exists")]
    AlreadyExists { signature: String },

    #[error("aggregate `{signature}` not found")]
    NotFound { signature: String },

    #[error("aggregate {0} is not registered")]
    UnknownAggregate(AggregateId),

    #[error("aggregate `{signature}` is still a child of `{parent}`")]
    AggregateInUse { signature: String, parent: String },

    #[error("an aggregate needs required flags, children, or both")]
    EmptyAggregate,

    #[error("an aggregate without required flags needs at least {min} children, got {got}")]
    TooFewChildren { min: usize, got: usize },

    #[error("child aggregate {0} is not registered")]
    UnknownChild(AggregateId),

    #[error("child aggregate {0} is listed more than once")]
    DuplicateChild(AggregateId),

    #[error("flags belong to a different category domain than the registry")]
    DomainMismatch,

    #[error("signature index and aggregate store disagree about `{signature}`")]
    Desynchronized { signature: String },
}

impl StatError for RegistryError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyExists { .. }
            | Self::NotFound { .. }
            | Self::UnknownAggregate(_)
            | Self::AggregateInUse { .. } => ErrorKind::Lookup,
            Self::EmptyAggregate
            | Self::TooFewChildren { .. }
            | Self::UnknownChild(_)
            | Self::DuplicateChild(_)
            | Self::DomainMismatch => ErrorKind::Construction,
            Self::Desynchronized { .. } => ErrorKind::Invariant,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyExists { .. } => "AGGREGATE_ALREADY_EXISTS",
            Self::NotFound { .. } => "AGGREGATE_NOT_FOUND",
            Self::UnknownAggregate(_) => "AGGREGATE_UNKNOWN",
            Self::AggregateInUse { .. } => "AGGREGATE_IN_USE",
            Self::EmptyAggregate => "AGGREGATE_EMPTY",
            Self::TooFewChildren { .. } => "AGGREGATE_TOO_FEW_CHILDREN",
            Self::UnknownChild(_) => "AGGREGATE_UNKNOWN_CHILD",
            Self::DuplicateChild(_) => "AGGREGATE_DUPLICATE_CHILD",
            Self::DomainMismatch => "REGISTRY_DOMAIN_MISMATCH",
            Self::Desynchronized { .. } => "REGISTRY_DESYNCHRONIZED",
        }
    }
}
