//! Error types for the narrative layer
//!
//! Navigation guard failures are not errors; they surface as
//! [`crate::Outcome::Ignored`]. What remains here is either a wiring bug
//! (querying before load, scene index out of range) or a failed dataset load.

use scrolly_data::StoreError;

/// Scene registry errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Scene index outside `[0, len - 1]`
    #[error("scene index {index} out of range (registry has {len} scenes)")]
    OutOfRange { index: usize, len: usize },

    /// A narrative needs at least one scene
    #[error("scene registry is empty")]
    Empty,

    /// Scene indices must run 0, 1, 2, ... in order
    #[error("scene at position {position} declares index {index}")]
    NonContiguous { position: usize, index: usize },
}

/// Failure reported by a dataset source
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("dataset source failed: {0}")]
pub struct SourceError(pub String);

/// Navigation journal integrity errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JournalError {
    /// Sequence numbers are not consecutive
    #[error("journal sequence gap: expected {expected}, found {found}")]
    SequenceGap { expected: u64, found: u64 },

    /// An entry does not start where the previous one ended
    #[error("journal entry {seq} starts at scene {from}, previous ended at {previous_to}")]
    Discontinuity { seq: u64, from: usize, previous_to: usize },
}

/// Main narrative error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NarrativeError {
    /// Event or query received before the datasets finished loading
    #[error("narrative used before datasets were loaded")]
    NotLoaded,

    /// Record store error
    #[error("store error: {0}")]
    Store(StoreError),

    /// Scene registry error
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Dataset acquisition failed
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Configuration could not be parsed
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<StoreError> for NarrativeError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotLoaded => Self::NotLoaded,
            other => Self::Store(other),
        }
    }
}

impl NarrativeError {
    /// Errors that indicate a wiring bug and must be reported loudly
    #[inline]
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        match self {
            Self::NotLoaded | Self::Registry(RegistryError::OutOfRange { .. }) => true,
            Self::Store(e) => e.is_contract_violation(),
            _ => false,
        }
    }

    /// Errors caused by the input data rather than by the code
    #[inline]
    #[must_use]
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::Source(_)
                | Self::Store(StoreError::Coercion { .. } | StoreError::MissingField { .. })
        )
    }
}
