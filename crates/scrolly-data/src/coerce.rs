//! One-time coercion of raw rows into typed records
//!
//! Runs inside [`crate::RecordStore::load`] so every downstream consumer sees
//! numeric and date fields already typed.

use crate::error::StoreError;
use crate::record::{Listing, ListingId, Neighbourhood, RawRow, RecordKind, Review};
use chrono::NaiveDate;

/// Per-row coercion context used to label errors
struct RowCtx<'a> {
    kind: RecordKind,
    row: usize,
    raw: &'a RawRow,
}

impl<'a> RowCtx<'a> {
    fn required(&self, field: &str) -> Result<&'a str, StoreError> {
        self.raw
            .get(field)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| StoreError::MissingField {
                kind: self.kind,
                row: self.row,
                field: field.to_string(),
            })
    }

    fn optional(&self, field: &str) -> Option<&'a str> {
        self.raw.get(field).map(str::trim).filter(|v| !v.is_empty())
    }

    fn text(&self, field: &str) -> String {
        self.optional(field).unwrap_or_default().to_string()
    }

    fn fail(&self, field: &str, value: &str) -> StoreError {
        StoreError::Coercion {
            kind: self.kind,
            row: self.row,
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    fn parse<T>(&self, field: &str, value: &str, f: impl FnOnce(&str) -> Option<T>) -> Result<T, StoreError> {
        f(value).ok_or_else(|| self.fail(field, value))
    }

    fn optional_with<T>(
        &self,
        field: &str,
        f: impl FnOnce(&str) -> Option<T>,
    ) -> Result<Option<T>, StoreError> {
        self.optional(field)
            .map(|v| self.parse(field, v, f))
            .transpose()
    }
}

/// Parse a price such as `"$1,250.00"` or `"85"`
#[must_use]
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    parse_number(&cleaned)
}

/// Parse a finite decimal number
#[must_use]
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse an ISO calendar date (`YYYY-MM-DD`)
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

fn parse_u64(raw: &str) -> Option<u64> {
    raw.trim().parse().ok()
}

fn parse_u32(raw: &str) -> Option<u32> {
    raw.trim().parse().ok()
}

pub(crate) fn listing(row: usize, raw: &RawRow) -> Result<Listing, StoreError> {
    let ctx = RowCtx {
        kind: RecordKind::Listing,
        row,
        raw,
    };
    let id = ctx.parse("id", ctx.required("id")?, parse_u64)?;
    let price = ctx.parse("price", ctx.required("price")?, parse_price)?;
    let availability_365 = ctx.parse(
        "availability_365",
        ctx.required("availability_365")?,
        parse_number,
    )?;

    Ok(Listing {
        id: ListingId(id),
        name: ctx.text("name"),
        host_id: ctx.optional_with("host_id", parse_u64)?,
        host_name: ctx.text("host_name"),
        neighbourhood_group: ctx.text("neighbourhood_group"),
        neighbourhood: ctx.required("neighbourhood")?.to_string(),
        latitude: ctx.optional_with("latitude", parse_number)?,
        longitude: ctx.optional_with("longitude", parse_number)?,
        room_type: ctx.required("room_type")?.to_string(),
        price,
        minimum_nights: ctx.optional_with("minimum_nights", parse_u32)?,
        number_of_reviews: ctx.optional_with("number_of_reviews", parse_u32)?,
        reviews_per_month: ctx.optional_with("reviews_per_month", parse_number)?,
        availability_365,
    })
}

pub(crate) fn neighbourhood(row: usize, raw: &RawRow) -> Result<Neighbourhood, StoreError> {
    let ctx = RowCtx {
        kind: RecordKind::Neighbourhood,
        row,
        raw,
    };
    Ok(Neighbourhood {
        group: ctx.text("neighbourhood_group"),
        name: ctx.required("neighbourhood")?.to_string(),
    })
}

pub(crate) fn review(row: usize, raw: &RawRow) -> Result<Review, StoreError> {
    let ctx = RowCtx {
        kind: RecordKind::Review,
        row,
        raw,
    };
    let listing_id = ctx.parse("listing_id", ctx.required("listing_id")?, parse_u64)?;
    let date = ctx.parse("date", ctx.required("date")?, parse_date)?;
    Ok(Review {
        listing_id: ListingId(listing_id),
        date,
    })
}

/// Coerce a whole table, stopping at the first bad row
pub(crate) fn table<T>(
    rows: &[RawRow],
    f: impl Fn(usize, &RawRow) -> Result<T, StoreError>,
) -> Result<Vec<T>, StoreError> {
    rows.iter().enumerate().map(|(i, r)| f(i, r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing_row() -> RawRow {
        RawRow::new()
            .with("id", "2539")
            .with("name", "Clean & quiet apt home by the park")
            .with("neighbourhood_group", "Brooklyn")
            .with("neighbourhood", "Kensington")
            .with("room_type", "Private room")
            .with("price", "$1,149.00")
            .with("availability_365", "365")
            .with("reviews_per_month", "")
    }

    #[test]
    fn price_strips_currency_and_grouping() {
        assert_eq!(parse_price("$1,149.00"), Some(1149.0));
        assert_eq!(parse_price(" 85 "), Some(85.0));
        assert_eq!(parse_price("free"), None);
        assert_eq!(parse_price("NaN"), None);
    }

    #[test]
    fn listing_coerces_numeric_fields() {
        let listing = listing(0, &listing_row()).unwrap();
        assert_eq!(listing.id, ListingId(2539));
        assert_eq!(listing.price, 1149.0);
        assert_eq!(listing.availability_365, 365.0);
        assert_eq!(listing.reviews_per_month, None);
        assert_eq!(listing.neighbourhood_group, "Brooklyn");
    }

    #[test]
    fn listing_reports_bad_price() {
        let raw = listing_row().with("price", "call me");
        let err = listing(4, &raw).unwrap_err();
        assert_eq!(
            err,
            StoreError::Coercion {
                kind: RecordKind::Listing,
                row: 4,
                field: "price".into(),
                value: "call me".into(),
            }
        );
    }

    #[test]
    fn listing_reports_missing_neighbourhood() {
        let raw = listing_row().with("neighbourhood", "  ");
        assert!(matches!(
            listing(1, &raw),
            Err(StoreError::MissingField { field, .. }) if field == "neighbourhood"
        ));
    }

    #[test]
    fn review_coerces_date() {
        let raw = RawRow::new().with("listing_id", "2539").with("date", "2019-05-21");
        let review = review(0, &raw).unwrap();
        assert_eq!(review.date, NaiveDate::from_ymd_opt(2019, 5, 21).unwrap());

        let bad = RawRow::new().with("listing_id", "2539").with("date", "21/05/2019");
        assert!(matches!(review_err(&bad), StoreError::Coercion { field, .. } if field == "date"));
    }

    fn review_err(raw: &RawRow) -> StoreError {
        review(0, raw).unwrap_err()
    }
}
