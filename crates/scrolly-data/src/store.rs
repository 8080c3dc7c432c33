//! Record store
//!
//! Holds the three datasets for the lifetime of a session. The store is
//! populated exactly once and is read-only afterwards; share it behind an
//! `Arc` and hand out borrowed slices.

use crate::coerce;
use crate::error::StoreError;
use crate::record::{Listing, ListingId, Neighbourhood, RawRow, RecordKind, Review};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// The three raw tables as delivered by the acquisition collaborator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDatasets {
    pub listings: Vec<RawRow>,
    pub neighbourhoods: Vec<RawRow>,
    pub reviews: Vec<RawRow>,
}

#[derive(Debug)]
struct Tables {
    listings: Vec<Listing>,
    neighbourhoods: Vec<Neighbourhood>,
    reviews: Vec<Review>,
}

/// Borrowed view of one stored table
#[derive(Debug, Clone, Copy)]
pub enum RecordSlice<'a> {
    Listings(&'a [Listing]),
    Neighbourhoods(&'a [Neighbourhood]),
    Reviews(&'a [Review]),
}

impl RecordSlice<'_> {
    /// Number of records in the table
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Listings(s) => s.len(),
            Self::Neighbourhoods(s) => s.len(),
            Self::Reviews(s) => s.len(),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Listings(_) => RecordKind::Listing,
            Self::Neighbourhoods(_) => RecordKind::Neighbourhood,
            Self::Reviews(_) => RecordKind::Review,
        }
    }
}

/// Row counts per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreCounts {
    pub listings: usize,
    pub neighbourhoods: usize,
    pub reviews: usize,
}

/// In-memory, load-once record store
#[derive(Debug, Default)]
pub struct RecordStore {
    tables: OnceCell<Tables>,
}

impl RecordStore {
    /// Create an empty, unloaded store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Coerce and store the three raw tables
    ///
    /// All rows are coerced before anything is stored, so a coercion failure
    /// leaves the store unloaded.
    ///
    /// # Errors
    /// [`StoreError::Coercion`] or [`StoreError::MissingField`] for a bad row,
    /// [`StoreError::AlreadyLoaded`] on a second load.
    #[tracing::instrument(skip_all, fields(
        listings = listings.len(),
        neighbourhoods = neighbourhoods.len(),
        reviews = reviews.len()
    ))]
    pub fn load(
        &self,
        listings: &[RawRow],
        neighbourhoods: &[RawRow],
        reviews: &[RawRow],
    ) -> Result<StoreCounts, StoreError> {
        if self.is_loaded() {
            return Err(StoreError::AlreadyLoaded);
        }
        let listings = coerce::table(listings, coerce::listing)?;
        let neighbourhoods = coerce::table(neighbourhoods, coerce::neighbourhood)?;
        let reviews = coerce::table(reviews, coerce::review)?;
        debug!("raw rows coerced");
        self.load_records(listings, neighbourhoods, reviews)
    }

    /// Store the contents of a [`RawDatasets`] bundle
    ///
    /// # Errors
    /// Same as [`RecordStore::load`].
    pub fn load_raw(&self, raw: &RawDatasets) -> Result<StoreCounts, StoreError> {
        self.load(&raw.listings, &raw.neighbourhoods, &raw.reviews)
    }

    /// Store already-typed records
    ///
    /// # Errors
    /// [`StoreError::AlreadyLoaded`] on a second load.
    pub fn load_records(
        &self,
        listings: Vec<Listing>,
        neighbourhoods: Vec<Neighbourhood>,
        reviews: Vec<Review>,
    ) -> Result<StoreCounts, StoreError> {
        let tables = Tables {
            listings,
            neighbourhoods,
            reviews,
        };
        self.tables
            .set(tables)
            .map_err(|_| StoreError::AlreadyLoaded)?;
        let counts = self.counts()?;
        info!(
            listings = counts.listings,
            neighbourhoods = counts.neighbourhoods,
            reviews = counts.reviews,
            "record store loaded"
        );
        Ok(counts)
    }

    /// Whether `load` has completed
    #[inline]
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.tables.get().is_some()
    }

    fn tables(&self) -> Result<&Tables, StoreError> {
        self.tables.get().ok_or(StoreError::NotLoaded)
    }

    /// Borrow one table by kind
    ///
    /// # Errors
    /// [`StoreError::NotLoaded`] before load.
    pub fn get(&self, kind: RecordKind) -> Result<RecordSlice<'_>, StoreError> {
        let t = self.tables()?;
        Ok(match kind {
            RecordKind::Listing => RecordSlice::Listings(&t.listings),
            RecordKind::Neighbourhood => RecordSlice::Neighbourhoods(&t.neighbourhoods),
            RecordKind::Review => RecordSlice::Reviews(&t.reviews),
        })
    }

    /// # Errors
    /// [`StoreError::NotLoaded`] before load.
    pub fn listings(&self) -> Result<&[Listing], StoreError> {
        Ok(&self.tables()?.listings)
    }

    /// # Errors
    /// [`StoreError::NotLoaded`] before load.
    pub fn neighbourhoods(&self) -> Result<&[Neighbourhood], StoreError> {
        Ok(&self.tables()?.neighbourhoods)
    }

    /// # Errors
    /// [`StoreError::NotLoaded`] before load.
    pub fn reviews(&self) -> Result<&[Review], StoreError> {
        Ok(&self.tables()?.reviews)
    }

    /// Find a listing by id
    ///
    /// # Errors
    /// [`StoreError::NotLoaded`] before load.
    pub fn listing(&self, id: ListingId) -> Result<Option<&Listing>, StoreError> {
        Ok(self.listings()?.iter().find(|l| l.id == id))
    }

    /// Row counts per table
    ///
    /// # Errors
    /// [`StoreError::NotLoaded`] before load.
    pub fn counts(&self) -> Result<StoreCounts, StoreError> {
        let t = self.tables()?;
        Ok(StoreCounts {
            listings: t.listings.len(),
            neighbourhoods: t.neighbourhoods.len(),
            reviews: t.reviews.len(),
        })
    }
}
