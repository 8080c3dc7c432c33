//! Typed records for the three source tables
//!
//! Every record is a plain struct with typed fields. The aggregator addresses
//! fields by name through [`Record::field`], so scenes can declare reducers such
//! as `mean("price")` without knowing the concrete record type.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The three disjoint record kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Listing,
    Neighbourhood,
    Review,
}

impl RecordKind {
    /// All kinds in load order
    pub const ALL: [RecordKind; 3] = [Self::Listing, Self::Neighbourhood, Self::Review];

    /// Lowercase table name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Listing => "listing",
            Self::Neighbourhood => "neighbourhood",
            Self::Review => "review",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field value addressed by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl FieldValue {
    /// Numeric view, `None` for text and dates
    #[inline]
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Render the value as a grouping key
    #[must_use]
    pub fn to_key(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) if n.fract() == 0.0 && n.is_finite() => format!("{n:.0}"),
            Self::Number(n) => n.to_string(),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Name-addressable view over a typed record
pub trait Record {
    /// Kind of the source table this record came from
    const KIND: RecordKind;

    /// Look up a field by its source column name
    fn field(&self, name: &str) -> Option<FieldValue>;
}

/// One untyped input row: column name to raw text
///
/// This is the shape handed over by the acquisition collaborator. Coercion into
/// typed records happens exactly once, in [`crate::RecordStore::load`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow(BTreeMap<String, String>);

impl RawRow {
    /// Create an empty row
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, field: &str, value: &str) -> Self {
        self.0.insert(field.to_string(), value.to_string());
        self
    }

    /// Raw text of a column, if present
    #[inline]
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Listing identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ListingId(pub u64);

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ListingId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// A rental listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub name: String,
    pub host_id: Option<u64>,
    pub host_name: String,
    pub neighbourhood_group: String,
    pub neighbourhood: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub room_type: String,
    pub price: f64,
    pub minimum_nights: Option<u32>,
    pub number_of_reviews: Option<u32>,
    pub reviews_per_month: Option<f64>,
    pub availability_365: f64,
}

impl Listing {
    /// Minimal listing with the fields every scene depends on
    #[must_use]
    pub fn new(id: u64, neighbourhood: &str, price: f64) -> Self {
        Self {
            id: ListingId(id),
            name: String::new(),
            host_id: None,
            host_name: String::new(),
            neighbourhood_group: String::new(),
            neighbourhood: neighbourhood.to_string(),
            latitude: None,
            longitude: None,
            room_type: "Entire home/apt".to_string(),
            price,
            minimum_nights: None,
            number_of_reviews: None,
            reviews_per_month: None,
            availability_365: 0.0,
        }
    }

    /// With room type
    #[inline]
    #[must_use]
    pub fn with_room_type(mut self, room_type: &str) -> Self {
        self.room_type = room_type.to_string();
        self
    }

    /// With availability in days per year
    #[inline]
    #[must_use]
    pub fn with_availability(mut self, days: f64) -> Self {
        self.availability_365 = days;
        self
    }

    /// With display name
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }
}

impl Record for Listing {
    const KIND: RecordKind = RecordKind::Listing;

    fn field(&self, name: &str) -> Option<FieldValue> {
        let text = |s: &str| Some(FieldValue::Text(s.to_string()));
        let num = |n: f64| Some(FieldValue::Number(n));
        match name {
            "id" => num(self.id.0 as f64),
            "name" => text(&self.name),
            "host_id" => self.host_id.map(|h| FieldValue::Number(h as f64)),
            "host_name" => text(&self.host_name),
            "neighbourhood_group" => text(&self.neighbourhood_group),
            "neighbourhood" => text(&self.neighbourhood),
            "latitude" => self.latitude.map(FieldValue::Number),
            "longitude" => self.longitude.map(FieldValue::Number),
            "room_type" => text(&self.room_type),
            "price" => num(self.price),
            "minimum_nights" => self.minimum_nights.map(|n| FieldValue::Number(f64::from(n))),
            "number_of_reviews" => self
                .number_of_reviews
                .map(|n| FieldValue::Number(f64::from(n))),
            "reviews_per_month" => self.reviews_per_month.map(FieldValue::Number),
            "availability_365" => num(self.availability_365),
            _ => None,
        }
    }
}

/// A neighbourhood and the borough-level group it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Neighbourhood {
    pub group: String,
    pub name: String,
}

impl Neighbourhood {
    #[must_use]
    pub fn new(group: &str, name: &str) -> Self {
        Self {
            group: group.to_string(),
            name: name.to_string(),
        }
    }
}

impl Record for Neighbourhood {
    const KIND: RecordKind = RecordKind::Neighbourhood;

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "neighbourhood_group" => Some(FieldValue::Text(self.group.clone())),
            "neighbourhood" => Some(FieldValue::Text(self.name.clone())),
            _ => None,
        }
    }
}

/// A single dated review of a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub listing_id: ListingId,
    pub date: NaiveDate,
}

impl Review {
    #[must_use]
    pub fn new(listing_id: u64, date: NaiveDate) -> Self {
        Self {
            listing_id: ListingId(listing_id),
            date,
        }
    }
}

impl Record for Review {
    const KIND: RecordKind = RecordKind::Review;

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "listing_id" => Some(FieldValue::Number(self.listing_id.0 as f64)),
            "date" => Some(FieldValue::Date(self.date)),
            _ => None,
        }
    }
}
