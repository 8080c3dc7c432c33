//! Drill-down selection context

use scrolly_data::ListingId;
use serde::{Deserialize, Serialize};

/// Choices the viewer made in earlier scenes
///
/// A listing is only ever selected together with the neighbourhood it belongs
/// to; the constructors below are the only way to set the fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionContext {
    selected_neighbourhood: Option<String>,
    selected_listing: Option<ListingId>,
}

impl SelectionContext {
    /// No selection
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Neighbourhood chosen, no listing
    #[must_use]
    pub fn neighbourhood(name: &str) -> Self {
        Self {
            selected_neighbourhood: Some(name.to_string()),
            selected_listing: None,
        }
    }

    /// Listing chosen within its neighbourhood
    #[must_use]
    pub fn listing(neighbourhood: &str, id: ListingId) -> Self {
        Self {
            selected_neighbourhood: Some(neighbourhood.to_string()),
            selected_listing: Some(id),
        }
    }

    #[inline]
    #[must_use]
    pub fn selected_neighbourhood(&self) -> Option<&str> {
        self.selected_neighbourhood.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn selected_listing(&self) -> Option<ListingId> {
        self.selected_listing
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected_neighbourhood.is_none() && self.selected_listing.is_none()
    }

    /// Listing implies neighbourhood
    #[inline]
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.selected_listing.is_none() || self.selected_neighbourhood.is_some()
    }

    /// Human-readable scope, e.g. for scene titles
    #[must_use]
    pub fn scope_label(&self) -> String {
        match (&self.selected_neighbourhood, self.selected_listing) {
            (Some(hood), Some(id)) => format!("listing {id} in {hood}"),
            (Some(hood), None) => hood.clone(),
            (None, _) => "all neighbourhoods".to_string(),
        }
    }
}
