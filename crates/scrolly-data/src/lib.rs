//! Scrolly Data
//!
//! Record model, load-once record store and group/reduce aggregation for the
//! scrollytelling narrative.
//!
//! # Core Concepts
//!
//! - [`RecordStore`]: holds the listing, neighbourhood and review tables
//! - [`Record`]: name-addressable view over a typed record
//! - [`group_reduce`]: partition and reduce into an [`AggregatedSeries`]
//! - [`filter`]: order-preserving subsequence
//!
//! # Example
//!
//! ```rust
//! use scrolly_data::{group_reduce, Listing, Reducer};
//!
//! let listings = vec![
//!     Listing::new(1, "X", 100.0),
//!     Listing::new(2, "X", 200.0),
//!     Listing::new(3, "Y", 300.0),
//! ];
//! let series = group_reduce(&listings, |l: &Listing| l.neighbourhood.clone(), &Reducer::mean("price"))?;
//! assert_eq!(series.get("X"), Some(150.0));
//! # Ok::<(), scrolly_data::AggregateError>(())
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod aggregate;
pub mod coerce;
pub mod error;
pub mod record;
pub mod store;

pub use aggregate::{
    by_field, filter, group_reduce, group_reduce_or_empty, AggregatedSeries, DateBucket, Reducer,
    SeriesOrder, SeriesPoint,
};
pub use coerce::{parse_date, parse_number, parse_price};
pub use error::{AggregateError, StoreError};
pub use record::{FieldValue, Listing, ListingId, Neighbourhood, RawRow, Record, RecordKind, Review};
pub use store::{RawDatasets, RecordSlice, RecordStore, StoreCounts};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
