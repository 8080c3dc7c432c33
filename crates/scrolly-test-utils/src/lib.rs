//! Testing utilities for the scrolly workspace
//!
//! Shared fixtures, a recording render surface and in-memory dataset sources.

#![allow(missing_docs)]

use scrolly_data::{RawDatasets, RawRow, RecordStore};
use scrolly_narrative::{Chart, DatasetSource, RenderSurface, SourceError};
use std::sync::Arc;
use std::time::Duration;

/// `(id, name, group, neighbourhood, room_type, price, availability_365)`
const LISTINGS: &[(&str, &str, &str, &str, &str, &str, &str)] = &[
    ("1", "Sunny loft", "Manhattan", "Harlem", "Entire home/apt", "$120.00", "200"),
    ("2", "Harlem room", "Manhattan", "Harlem", "Private room", "$80.00", "100"),
    ("3", "Chelsea studio", "Manhattan", "Chelsea", "Entire home/apt", "$250.00", "50"),
    ("4", "Chelsea shared", "Manhattan", "Chelsea", "Shared room", "$60.00", "300"),
    ("5", "Williamsburg flat", "Brooklyn", "Williamsburg", "Entire home/apt", "$180.00", "120"),
    ("6", "Bedford penthouse", "Brooklyn", "Williamsburg", "Entire home/apt", "$1,050.00", "10"),
];

const NEIGHBOURHOODS: &[(&str, &str)] = &[
    ("Manhattan", "Harlem"),
    ("Manhattan", "Chelsea"),
    ("Brooklyn", "Williamsburg"),
    ("Queens", "Astoria"),
];

const REVIEWS: &[(&str, &str)] = &[
    ("1", "2019-01-05"),
    ("1", "2019-01-20"),
    ("1", "2019-03-02"),
    ("3", "2019-02-11"),
    ("5", "2018-12-30"),
    ("5", "2019-01-15"),
];

/// Six listings over three neighbourhoods, plus Astoria with no listings
///
/// Listings 2, 4 and 6 have no reviews.
pub fn sample_raw_datasets() -> RawDatasets {
    let listings = LISTINGS
        .iter()
        .map(|&(id, name, group, hood, room, price, avail)| {
            RawRow::new()
                .with("id", id)
                .with("name", name)
                .with("host_id", "100")
                .with("host_name", "Host")
                .with("neighbourhood_group", group)
                .with("neighbourhood", hood)
                .with("latitude", "40.7")
                .with("longitude", "-73.9")
                .with("room_type", room)
                .with("price", price)
                .with("minimum_nights", "1")
                .with("number_of_reviews", "0")
                .with("reviews_per_month", "")
                .with("availability_365", avail)
        })
        .collect();
    let neighbourhoods = NEIGHBOURHOODS
        .iter()
        .map(|&(group, name)| {
            RawRow::new()
                .with("neighbourhood_group", group)
                .with("neighbourhood", name)
        })
        .collect();
    let reviews = REVIEWS
        .iter()
        .map(|&(id, date)| RawRow::new().with("listing_id", id).with("date", date))
        .collect();

    RawDatasets {
        listings,
        neighbourhoods,
        reviews,
    }
}

/// A loaded store over [`sample_raw_datasets`]
pub fn sample_store() -> Arc<RecordStore> {
    let store = RecordStore::new();
    store
        .load_raw(&sample_raw_datasets())
        .expect("sample datasets are valid");
    Arc::new(store)
}

/// One recorded surface call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Bar(Chart),
    Pie(Chart),
    LinePoints(Chart),
    Text { title: String, body: String },
    Placeholder(String),
}

/// Surface that records what is currently drawn
#[derive(Debug, Default)]
pub struct RecordingSurface {
    /// Calls since the last `clear`
    pub calls: Vec<DrawCall>,
    pub clears: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// The single thing on screen, if exactly one call happened since `clear`
    pub fn current(&self) -> Option<&DrawCall> {
        match self.calls.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.current(), Some(DrawCall::Placeholder(_)))
    }

    /// Chart on screen, for any chart kind
    pub fn chart(&self) -> Option<&Chart> {
        match self.current()? {
            DrawCall::Bar(c) | DrawCall::Pie(c) | DrawCall::LinePoints(c) => Some(c),
            _ => None,
        }
    }

    /// Keys of the chart on screen, in draw order
    pub fn keys(&self) -> Vec<String> {
        self.chart()
            .map(|c| c.data.iter().map(|d| d.key.clone()).collect())
            .unwrap_or_default()
    }
}

impl RenderSurface for RecordingSurface {
    fn clear(&mut self) {
        self.calls.clear();
        self.clears += 1;
    }

    fn draw_bar(&mut self, chart: &Chart) {
        self.calls.push(DrawCall::Bar(chart.clone()));
    }

    fn draw_pie(&mut self, chart: &Chart) {
        self.calls.push(DrawCall::Pie(chart.clone()));
    }

    fn draw_line_points(&mut self, chart: &Chart) {
        self.calls.push(DrawCall::LinePoints(chart.clone()));
    }

    fn draw_text(&mut self, title: &str, body: &str) {
        self.calls.push(DrawCall::Text {
            title: title.to_string(),
            body: body.to_string(),
        });
    }

    fn draw_placeholder(&mut self, message: &str) {
        self.calls.push(DrawCall::Placeholder(message.to_string()));
    }
}

/// Source that returns fixed datasets, optionally after a delay
#[derive(Debug, Clone)]
pub struct StaticSource {
    datasets: RawDatasets,
    delay: Option<Duration>,
}

impl StaticSource {
    pub fn new(datasets: RawDatasets) -> Self {
        Self {
            datasets,
            delay: None,
        }
    }

    pub fn sample() -> Self {
        Self::new(sample_raw_datasets())
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait::async_trait]
impl DatasetSource for StaticSource {
    async fn fetch(&self) -> Result<RawDatasets, SourceError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.datasets.clone())
    }
}

/// Source that always fails
#[derive(Debug, Clone)]
pub struct FailingSource(pub String);

impl FailingSource {
    pub fn new(message: &str) -> Self {
        Self(message.to_string())
    }
}

#[async_trait::async_trait]
impl DatasetSource for FailingSource {
    async fn fetch(&self) -> Result<RawDatasets, SourceError> {
        Err(SourceError(self.0.clone()))
    }
}
