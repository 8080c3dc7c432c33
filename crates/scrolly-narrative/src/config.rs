//! Narrative configuration

use crate::error::NarrativeError;
use scrolly_data::DateBucket;
use serde::{Deserialize, Serialize};

/// Tunables for scene data and session behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    /// Maximum bars drawn in the per-listing scene
    pub max_listings: usize,
    /// Calendar bucket for the reviews-over-time scene
    pub review_bucket: DateBucket,
    /// Placeholder text shown when a scene has nothing to draw
    pub no_data_message: String,
    /// Number of navigation journal entries retained
    pub journal_capacity: usize,
}

impl NarrativeConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With listing cap
    #[inline]
    #[must_use]
    pub fn with_max_listings(mut self, max: usize) -> Self {
        self.max_listings = max;
        self
    }

    /// With review bucket
    #[inline]
    #[must_use]
    pub fn with_review_bucket(mut self, bucket: DateBucket) -> Self {
        self.review_bucket = bucket;
        self
    }

    /// With placeholder text
    #[inline]
    #[must_use]
    pub fn with_no_data_message(mut self, message: &str) -> Self {
        self.no_data_message = message.to_string();
        self
    }

    /// With journal capacity
    #[inline]
    #[must_use]
    pub fn with_journal_capacity(mut self, capacity: usize) -> Self {
        self.journal_capacity = capacity;
        self
    }

    /// Parse from TOML; missing keys take their defaults
    ///
    /// # Errors
    /// [`NarrativeError::Config`] on malformed TOML or unknown values.
    pub fn from_toml_str(input: &str) -> Result<Self, NarrativeError> {
        toml::from_str(input).map_err(|e| NarrativeError::Config(e.to_string()))
    }
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            max_listings: 25,
            review_bucket: DateBucket::Month,
            no_data_message: "No data available".to_string(),
            journal_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = NarrativeConfig::new()
            .with_max_listings(5)
            .with_review_bucket(DateBucket::Year)
            .with_no_data_message("nothing here");
        assert_eq!(config.max_listings, 5);
        assert_eq!(config.review_bucket, DateBucket::Year);
        assert_eq!(config.no_data_message, "nothing here");
        assert_eq!(config.journal_capacity, 1024);
    }

    #[test]
    fn toml_partial_uses_defaults() {
        let config = NarrativeConfig::from_toml_str("max_listings = 10\nreview_bucket = \"year\"\n").unwrap();
        assert_eq!(config.max_listings, 10);
        assert_eq!(config.review_bucket, DateBucket::Year);
        assert_eq!(config.no_data_message, NarrativeConfig::default().no_data_message);
    }

    #[test]
    fn toml_rejects_bad_bucket() {
        let err = NarrativeConfig::from_toml_str("review_bucket = \"week\"").unwrap_err();
        assert!(matches!(err, NarrativeError::Config(_)));
    }
}
