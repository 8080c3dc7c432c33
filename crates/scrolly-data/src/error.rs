//! Error types for the record store and aggregator

use crate::record::RecordKind;

/// Record store errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A consumer queried the store before `load` completed
    #[error("record store queried before load completed")]
    NotLoaded,

    /// `load` was called on a store that is already populated
    #[error("record store is already loaded")]
    AlreadyLoaded,

    /// A required raw field was absent
    #[error("{kind} row {row}: missing required field `{field}`")]
    MissingField {
        /// Record kind being coerced
        kind: RecordKind,
        /// Zero-based row number in the input sequence
        row: usize,
        /// Field name
        field: String,
    },

    /// A raw field could not be coerced to its typed form
    #[error("{kind} row {row}: cannot coerce `{field}` value {value:?}")]
    Coercion {
        /// Record kind being coerced
        kind: RecordKind,
        /// Zero-based row number in the input sequence
        row: usize,
        /// Field name
        field: String,
        /// Offending raw text
        value: String,
    },
}

impl StoreError {
    /// Query-before-load is a wiring bug rather than a data problem
    #[inline]
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::NotLoaded | Self::AlreadyLoaded)
    }
}

/// Aggregation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregateError {
    /// A reducer needed a numeric field that a record in the partition lacks
    #[error("field `{field}` is not numeric in group `{key}`")]
    InvalidField {
        /// Field the reducer was applied to
        field: String,
        /// Group key of the offending partition
        key: String,
    },
}
