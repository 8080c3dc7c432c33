//! Scene registry
//!
//! Provides [`SceneRegistry`], the fixed, ordered list of scenes that make up
//! the narrative.

use crate::dispatch::RendererId;
use crate::error::RegistryError;
use crate::scene::{DataRequirement, GroupKey, SceneDescriptor, Scope, Selectable};
use scrolly_data::{RecordKind, Reducer, SeriesOrder};
use tracing::error;

/// Ordered, immutable sequence of scene descriptors
///
/// Indices are contiguous from zero. The final scene is always terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneRegistry {
    scenes: Vec<SceneDescriptor>,
}

impl SceneRegistry {
    /// Validate and freeze a list of scenes
    ///
    /// # Errors
    /// [`RegistryError::Empty`] for no scenes, [`RegistryError::NonContiguous`]
    /// when a scene's index does not match its position.
    pub fn new(mut scenes: Vec<SceneDescriptor>) -> Result<Self, RegistryError> {
        if scenes.is_empty() {
            return Err(RegistryError::Empty);
        }
        for (position, scene) in scenes.iter().enumerate() {
            if scene.index != position {
                return Err(RegistryError::NonContiguous {
                    position,
                    index: scene.index,
                });
            }
        }
        if let Some(last) = scenes.last_mut() {
            last.is_terminal = true;
        }
        Ok(Self { scenes })
    }

    /// The standard five-scene narrative
    ///
    /// # Scenes
    /// 0. Average nightly price per neighbourhood (bar, pick a neighbourhood)
    /// 1. Listings in the neighbourhood by price (bar, pick a listing)
    /// 2. Reviews over time for the listing (line+points)
    /// 3. Room type mix in the neighbourhood (pie)
    /// 4. Availability summary (text)
    #[must_use]
    pub fn standard() -> Self {
        let scenes = vec![
            SceneDescriptor::new(
                0,
                "Average nightly price by neighbourhood",
                RendererId::Bar,
                DataRequirement::Aggregate {
                    source: RecordKind::Listing,
                    group_by: GroupKey::field("neighbourhood"),
                    reducer: Reducer::mean("price"),
                    scope: Scope::All,
                    order: SeriesOrder::ValueDescending,
                },
            )
            .with_caption("Click a neighbourhood to explore its listings.")
            .selectable(Selectable::Neighbourhood),
            SceneDescriptor::new(
                1,
                "Listings in {scope}",
                RendererId::Bar,
                DataRequirement::Listings {
                    scope: Scope::Neighbourhood,
                },
            )
            .with_caption("Nightly price per listing. Click one to follow its reviews.")
            .selectable(Selectable::Listing),
            SceneDescriptor::new(
                2,
                "Reviews over time for {scope}",
                RendererId::LinePoints,
                DataRequirement::Aggregate {
                    source: RecordKind::Review,
                    group_by: GroupKey::ReviewDate,
                    reducer: Reducer::Count,
                    scope: Scope::Listing,
                    order: SeriesOrder::KeyAscending,
                },
            )
            .with_caption("Number of reviews per period."),
            SceneDescriptor::new(
                3,
                "Room types in {scope}",
                RendererId::Pie,
                DataRequirement::Aggregate {
                    source: RecordKind::Listing,
                    group_by: GroupKey::field("room_type"),
                    reducer: Reducer::Count,
                    scope: Scope::Neighbourhood,
                    order: SeriesOrder::Insertion,
                },
            )
            .with_caption("Share of listings by room type."),
            SceneDescriptor::new(
                4,
                "Availability",
                RendererId::Text,
                DataRequirement::Summary {
                    scope: Scope::Neighbourhood,
                },
            )
            .terminal(),
        ];
        Self { scenes }
    }

    /// Descriptor at `index`
    ///
    /// # Errors
    /// [`RegistryError::OutOfRange`] outside `[0, len - 1]`.
    pub fn describe(&self, index: usize) -> Result<&SceneDescriptor, RegistryError> {
        self.scenes.get(index).ok_or_else(|| {
            let err = RegistryError::OutOfRange {
                index,
                len: self.scenes.len(),
            };
            error!(%err, "scene lookup out of range");
            #[cfg(feature = "strict-debug")]
            panic!("{err}");
            #[cfg(not(feature = "strict-debug"))]
            err
        })
    }

    /// Number of scenes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Always false for a constructed registry
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Index of the last scene
    #[inline]
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.scenes.len().saturating_sub(1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneDescriptor> {
        self.scenes.iter()
    }
}

impl Default for SceneRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_scene(index: usize) -> SceneDescriptor {
        SceneDescriptor::new(
            index,
            "t",
            RendererId::Text,
            DataRequirement::Summary { scope: Scope::All },
        )
    }

    #[test]
    fn standard_registry_shape() {
        let registry = SceneRegistry::standard();
        assert_eq!(registry.len(), 5);
        assert_eq!(registry.describe(0).unwrap().selectable, Some(Selectable::Neighbourhood));
        assert_eq!(registry.describe(1).unwrap().selectable, Some(Selectable::Listing));
        assert_eq!(registry.describe(2).unwrap().renderer, RendererId::LinePoints);
        assert_eq!(registry.describe(3).unwrap().renderer, RendererId::Pie);
        assert!(registry.describe(4).unwrap().is_terminal);
        assert_eq!(
            registry.iter().filter(|s| s.is_terminal).count(),
            1,
            "only the final scene is terminal"
        );
    }

    #[test]
    #[cfg(not(feature = "strict-debug"))]
    fn describe_out_of_range() {
        let registry = SceneRegistry::standard();
        assert_eq!(
            registry.describe(5).unwrap_err(),
            RegistryError::OutOfRange { index: 5, len: 5 }
        );
    }

    #[test]
    fn new_rejects_empty() {
        assert_eq!(SceneRegistry::new(vec![]).unwrap_err(), RegistryError::Empty);
    }

    #[test]
    fn new_rejects_gaps() {
        let err = SceneRegistry::new(vec![text_scene(0), text_scene(2)]).unwrap_err();
        assert_eq!(err, RegistryError::NonContiguous { position: 1, index: 2 });
    }

    #[test]
    fn new_marks_last_terminal() {
        let registry = SceneRegistry::new(vec![text_scene(0), text_scene(1)]).unwrap();
        assert!(!registry.describe(0).unwrap().is_terminal);
        assert!(registry.describe(1).unwrap().is_terminal);
        assert_eq!(registry.last_index(), 1);
    }
}
