//! Scene descriptors and their data requirements
//!
//! A descriptor is configuration: it names the slice of data a scene needs and
//! the chart that presents it. [`DataRequirement::resolve`] turns that
//! declaration into concrete [`SceneData`] for a given selection.

use crate::config::NarrativeConfig;
use crate::dispatch::RendererId;
use crate::selection::SelectionContext;
use scrolly_data::{
    filter, group_reduce_or_empty, AggregatedSeries, DateBucket, FieldValue, Listing, ListingId,
    Neighbourhood, Record, RecordKind, RecordStore, Reducer, Review, SeriesOrder, StoreError,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which selection field a click on this scene sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selectable {
    Neighbourhood,
    Listing,
}

/// How much of the selection narrows a scene's records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Scope {
    /// Ignore the selection
    #[default]
    All,
    /// Restrict to the selected neighbourhood, when there is one
    Neighbourhood,
    /// Restrict to the selected listing, else the neighbourhood, else nothing
    Listing,
}

/// Grouping key for an aggregate scene
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupKey {
    /// Text projection of a named field
    Field(String),
    /// Review date, bucketed per [`NarrativeConfig::review_bucket`]
    ReviewDate,
}

impl GroupKey {
    #[must_use]
    pub fn field(name: &str) -> Self {
        Self::Field(name.to_string())
    }

    fn key<R: Record>(&self, record: &R, bucket: DateBucket) -> String {
        match self {
            Self::Field(name) => record.field(name).map(|v| v.to_key()).unwrap_or_default(),
            Self::ReviewDate => match record.field("date") {
                Some(FieldValue::Date(d)) => bucket.key(d),
                _ => String::new(),
            },
        }
    }
}

/// Data a scene needs, resolved against the store and the selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataRequirement {
    /// Group one table and reduce each group
    Aggregate {
        source: RecordKind,
        group_by: GroupKey,
        reducer: Reducer,
        scope: Scope,
        order: SeriesOrder,
    },
    /// The scoped listings themselves, most expensive first, capped at
    /// [`NarrativeConfig::max_listings`]
    Listings { scope: Scope },
    /// One-paragraph summary of the scoped listings
    Summary { scope: Scope },
}

/// Resolved scene data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneData {
    Series(AggregatedSeries),
    Listings(Vec<Listing>),
    Text(String),
}

impl SceneData {
    /// Nothing to draw
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Series(s) => s.is_empty(),
            Self::Listings(l) => l.is_empty(),
            Self::Text(t) => t.trim().is_empty(),
        }
    }

    #[must_use]
    pub fn as_series(&self) -> Option<&AggregatedSeries> {
        match self {
            Self::Series(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_listings(&self) -> Option<&[Listing]> {
        match self {
            Self::Listings(l) => Some(l),
            _ => None,
        }
    }
}

impl DataRequirement {
    /// Compute the scene's data for a selection
    ///
    /// Pure with respect to its inputs: the same store, selection and config
    /// always produce the same data.
    ///
    /// # Errors
    /// [`StoreError::NotLoaded`] if the store is empty.
    pub fn resolve(
        &self,
        store: &RecordStore,
        selection: &SelectionContext,
        config: &NarrativeConfig,
    ) -> Result<SceneData, StoreError> {
        match self {
            Self::Aggregate {
                source,
                group_by,
                reducer,
                scope,
                order,
            } => {
                let bucket = config.review_bucket;
                let series = match source {
                    RecordKind::Listing => {
                        let rows = scoped_listings(store, selection, *scope)?;
                        group_reduce_or_empty(&rows, |r: &Listing| group_by.key(r, bucket), reducer)
                    }
                    RecordKind::Review => {
                        let rows = scoped_reviews(store, selection, *scope)?;
                        group_reduce_or_empty(&rows, |r: &Review| group_by.key(r, bucket), reducer)
                    }
                    RecordKind::Neighbourhood => {
                        let rows = scoped_neighbourhoods(store, selection, *scope)?;
                        group_reduce_or_empty(&rows, |r: &Neighbourhood| group_by.key(r, bucket), reducer)
                    }
                };
                Ok(SceneData::Series(series.sorted(*order)))
            }
            Self::Listings { scope } => {
                let mut rows = scoped_listings(store, selection, *scope)?;
                rows.sort_by(|a, b| b.price.total_cmp(&a.price).then(a.id.cmp(&b.id)));
                rows.truncate(config.max_listings);
                Ok(SceneData::Listings(rows))
            }
            Self::Summary { scope } => summary(store, selection, *scope).map(SceneData::Text),
        }
    }
}

fn scoped_listings(
    store: &RecordStore,
    selection: &SelectionContext,
    scope: Scope,
) -> Result<Vec<Listing>, StoreError> {
    let all = store.listings()?;
    let hood = selection.selected_neighbourhood();
    let listing = selection.selected_listing();
    Ok(match (scope, listing, hood) {
        (Scope::Listing, Some(id), _) => filter(all, |l| l.id == id),
        (Scope::Listing | Scope::Neighbourhood, _, Some(h)) => filter(all, |l| l.neighbourhood == h),
        _ => all.to_vec(),
    })
}

fn scoped_reviews(
    store: &RecordStore,
    selection: &SelectionContext,
    scope: Scope,
) -> Result<Vec<Review>, StoreError> {
    let all = store.reviews()?;
    if scope == Scope::All || selection.is_empty() {
        return Ok(all.to_vec());
    }
    let ids: BTreeSet<ListingId> = scoped_listings(store, selection, scope)?
        .iter()
        .map(|l| l.id)
        .collect();
    Ok(filter(all, |r| ids.contains(&r.listing_id)))
}

fn scoped_neighbourhoods(
    store: &RecordStore,
    selection: &SelectionContext,
    scope: Scope,
) -> Result<Vec<Neighbourhood>, StoreError> {
    let all = store.neighbourhoods()?;
    Ok(match (scope, selection.selected_neighbourhood()) {
        (Scope::All, _) | (_, None) => all.to_vec(),
        (_, Some(h)) => filter(all, |n| n.name == h),
    })
}

const SUMMARY_KEY: &str = "scope";

fn summary(
    store: &RecordStore,
    selection: &SelectionContext,
    scope: Scope,
) -> Result<String, StoreError> {
    let rows = scoped_listings(store, selection, scope)?;
    if rows.is_empty() {
        return Ok(String::new());
    }
    let whole = |_: &Listing| SUMMARY_KEY.to_string();
    let price = group_reduce_or_empty(&rows, whole, &Reducer::mean("price"));
    let availability = group_reduce_or_empty(&rows, whole, &Reducer::mean("availability_365"));

    let label = match selection.selected_neighbourhood() {
        Some(hood) => match store.neighbourhoods()?.iter().find(|n| n.name == hood) {
            Some(n) if !n.group.is_empty() => format!("{} ({})", n.name, n.group),
            _ => hood.to_string(),
        },
        None => "All neighbourhoods".to_string(),
    };

    Ok(format!(
        "{label}: {} listings, averaging ${:.0} per night and available {:.0} days a year.",
        rows.len(),
        price.get(SUMMARY_KEY).unwrap_or_default(),
        availability.get(SUMMARY_KEY).unwrap_or_default(),
    ))
}

/// One narrative step: a data requirement paired with a chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneDescriptor {
    /// Zero-based position in the registry
    pub index: usize,
    /// Title; `{scope}` is replaced with the selection's scope label
    pub title: String,
    pub caption: String,
    pub requirement: DataRequirement,
    pub renderer: RendererId,
    pub selectable: Option<Selectable>,
    /// Forward navigation stops here
    pub is_terminal: bool,
}

impl SceneDescriptor {
    #[must_use]
    pub fn new(index: usize, title: &str, renderer: RendererId, requirement: DataRequirement) -> Self {
        Self {
            index,
            title: title.to_string(),
            caption: String::new(),
            requirement,
            renderer,
            selectable: None,
            is_terminal: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_caption(mut self, caption: &str) -> Self {
        self.caption = caption.to_string();
        self
    }

    #[inline]
    #[must_use]
    pub fn selectable(mut self, selectable: Selectable) -> Self {
        self.selectable = Some(selectable);
        self
    }

    #[inline]
    #[must_use]
    pub fn terminal(mut self) -> Self {
        self.is_terminal = true;
        self
    }

    /// Title with the selection's scope filled in
    #[must_use]
    pub fn title_for(&self, selection: &SelectionContext) -> String {
        self.title.replace("{scope}", &selection.scope_label())
    }
}

/// A scene resolved for display, handed to the render dispatcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneFrame {
    pub index: usize,
    pub scene_count: usize,
    pub title: String,
    pub caption: String,
    pub renderer: RendererId,
    pub selectable: Option<Selectable>,
    pub is_terminal: bool,
    pub can_retreat: bool,
    pub data: SceneData,
}

impl SceneFrame {
    pub(crate) fn build(
        descriptor: &SceneDescriptor,
        scene_count: usize,
        selection: &SelectionContext,
        data: SceneData,
    ) -> Self {
        Self {
            index: descriptor.index,
            scene_count,
            title: descriptor.title_for(selection),
            caption: descriptor.caption.clone(),
            renderer: descriptor.renderer,
            selectable: descriptor.selectable,
            is_terminal: descriptor.is_terminal,
            can_retreat: descriptor.index > 0,
            data,
        }
    }
}
