//! Render dispatcher
//!
//! One parameterized dispatcher over a closed set of chart kinds. The
//! dispatcher converts a [`SceneFrame`] into draw calls on a [`RenderSurface`]
//! and translates clicks on drawn elements back into navigation events. It
//! holds no selection logic of its own.

use crate::navigation::NavEvent;
use crate::scene::{SceneData, SceneFrame};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, instrument, warn};

/// Chart kinds a scene can be drawn as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RendererId {
    #[serde(rename = "bar")]
    Bar,
    #[serde(rename = "pie")]
    Pie,
    #[serde(rename = "line+points")]
    LinePoints,
    #[serde(rename = "text")]
    Text,
}

impl RendererId {
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Pie => "pie",
            Self::LinePoints => "line+points",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for RendererId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown renderer name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown renderer `{0}`")]
pub struct UnknownRenderer(pub String);

impl FromStr for RendererId {
    type Err = UnknownRenderer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bar" => Ok(Self::Bar),
            "pie" => Ok(Self::Pie),
            "line+points" => Ok(Self::LinePoints),
            "text" => Ok(Self::Text),
            other => Err(UnknownRenderer(other.to_string())),
        }
    }
}

/// One drawable element; `key` is what a click reports back
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDatum {
    pub key: String,
    pub label: String,
    pub value: f64,
}

/// Everything a surface needs to draw one chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub title: String,
    pub caption: String,
    pub data: Vec<ChartDatum>,
    /// Elements respond to clicks
    pub interactive: bool,
}

/// Low-level drawing collaborator (scales, axes, arcs live behind this)
pub trait RenderSurface {
    /// Remove all prior output
    fn clear(&mut self);
    fn draw_bar(&mut self, chart: &Chart);
    fn draw_pie(&mut self, chart: &Chart);
    fn draw_line_points(&mut self, chart: &Chart);
    fn draw_text(&mut self, title: &str, body: &str);
    /// Stand-in when there is nothing to draw
    fn draw_placeholder(&mut self, message: &str);
}

/// Raw interaction reported by the surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interaction {
    /// A drawn element representing `key` was clicked
    ElementActivated { key: String },
}

/// What the last `render` call produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Drawn { renderer: RendererId, elements: usize },
    Placeholder,
}

/// Draws frames and routes element clicks back as `Select` events
#[derive(Debug)]
pub struct RenderDispatcher<S> {
    surface: S,
    no_data_message: String,
    active_keys: Vec<String>,
    interactive: bool,
}

impl<S: RenderSurface> RenderDispatcher<S> {
    #[must_use]
    pub fn new(surface: S, no_data_message: &str) -> Self {
        Self {
            surface,
            no_data_message: no_data_message.to_string(),
            active_keys: Vec::new(),
            interactive: false,
        }
    }

    #[inline]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[inline]
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Give the surface back
    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Keys of the currently drawn interactive elements
    #[must_use]
    pub fn active_keys(&self) -> &[String] {
        if self.interactive {
            &self.active_keys
        } else {
            &[]
        }
    }

    /// Clear prior output and draw `frame`
    ///
    /// Empty data, or data the renderer cannot present, degrades to the
    /// placeholder.
    #[instrument(skip_all, fields(scene = frame.index, renderer = %frame.renderer))]
    pub fn render(&mut self, frame: &SceneFrame) -> RenderOutcome {
        self.surface.clear();
        self.active_keys.clear();
        self.interactive = false;

        if frame.data.is_empty() {
            debug!("scene has no data");
            return self.placeholder();
        }

        let draw: fn(&mut S, &Chart) = match frame.renderer {
            RendererId::Bar => S::draw_bar,
            RendererId::Pie => S::draw_pie,
            RendererId::LinePoints => S::draw_line_points,
            RendererId::Text => return self.render_text(frame),
        };

        let Some(data) = chart_data(&frame.data) else {
            warn!("renderer cannot present text data");
            return self.placeholder();
        };

        let chart = Chart {
            title: frame.title.clone(),
            caption: frame.caption.clone(),
            interactive: frame.selectable.is_some(),
            data,
        };
        draw(&mut self.surface, &chart);

        self.interactive = chart.interactive;
        self.active_keys = chart.data.iter().map(|d| d.key.clone()).collect();
        RenderOutcome::Drawn {
            renderer: frame.renderer,
            elements: chart.data.len(),
        }
    }

    /// Draw the stable "no data" state
    pub fn render_unavailable(&mut self) -> RenderOutcome {
        self.surface.clear();
        self.active_keys.clear();
        self.interactive = false;
        self.placeholder()
    }

    /// Translate a surface interaction into a navigation event
    ///
    /// Clicks on keys that are not currently drawn, or on a non-interactive
    /// chart, come from stale bindings and are dropped.
    pub fn interact(&self, interaction: &Interaction) -> Option<NavEvent> {
        match interaction {
            Interaction::ElementActivated { key } => {
                if self.active_keys().iter().any(|k| k == key) {
                    Some(NavEvent::Select(key.clone()))
                } else {
                    debug!(%key, "click on element not currently drawn");
                    None
                }
            }
        }
    }

    fn render_text(&mut self, frame: &SceneFrame) -> RenderOutcome {
        let body = match &frame.data {
            SceneData::Text(t) => t.clone(),
            SceneData::Series(s) => s
                .iter()
                .map(|p| format!("{}: {}", p.key, p.value))
                .collect::<Vec<_>>()
                .join("\n"),
            SceneData::Listings(l) => l
                .iter()
                .map(|l| format!("{} ({})", display_name(l), l.neighbourhood))
                .collect::<Vec<_>>()
                .join("\n"),
        };
        self.surface.draw_text(&frame.title, &body);
        RenderOutcome::Drawn {
            renderer: RendererId::Text,
            elements: 0,
        }
    }

    fn placeholder(&mut self) -> RenderOutcome {
        self.surface.draw_placeholder(&self.no_data_message);
        RenderOutcome::Placeholder
    }
}

fn display_name(listing: &scrolly_data::Listing) -> String {
    if listing.name.is_empty() {
        format!("Listing {}", listing.id)
    } else {
        listing.name.clone()
    }
}

fn chart_data(data: &SceneData) -> Option<Vec<ChartDatum>> {
    match data {
        SceneData::Series(series) => Some(
            series
                .iter()
                .map(|p| ChartDatum {
                    key: p.key.clone(),
                    label: p.key.clone(),
                    value: p.value,
                })
                .collect(),
        ),
        SceneData::Listings(listings) => Some(
            listings
                .iter()
                .map(|l| ChartDatum {
                    key: l.id.to_string(),
                    label: display_name(l),
                    value: l.price,
                })
                .collect(),
        ),
        SceneData::Text(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Selectable;
    use scrolly_data::{AggregatedSeries, Listing};

    #[derive(Debug, Default)]
    struct Calls(Vec<String>);

    impl RenderSurface for Calls {
        fn clear(&mut self) {
            self.0.clear();
        }
        fn draw_bar(&mut self, chart: &Chart) {
            self.0.push(format!("bar:{}", chart.data.len()));
        }
        fn draw_pie(&mut self, chart: &Chart) {
            self.0.push(format!("pie:{}", chart.data.len()));
        }
        fn draw_line_points(&mut self, chart: &Chart) {
            self.0.push(format!("line:{}", chart.data.len()));
        }
        fn draw_text(&mut self, _title: &str, body: &str) {
            self.0.push(format!("text:{body}"));
        }
        fn draw_placeholder(&mut self, message: &str) {
            self.0.push(format!("placeholder:{message}"));
        }
    }

    fn frame(renderer: RendererId, data: SceneData, selectable: Option<Selectable>) -> SceneFrame {
        SceneFrame {
            index: 0,
            scene_count: 3,
            title: "t".into(),
            caption: String::new(),
            renderer,
            selectable,
            is_terminal: false,
            can_retreat: false,
            data,
        }
    }

    fn series() -> SceneData {
        SceneData::Series(AggregatedSeries::from_pairs([("X", 150.0), ("Y", 300.0)]))
    }

    #[test]
    fn renderer_ids_round_trip_through_strings() {
        for id in [RendererId::Bar, RendererId::Pie, RendererId::LinePoints, RendererId::Text] {
            assert_eq!(id.as_str().parse::<RendererId>().unwrap(), id);
        }
        assert!("scatter".parse::<RendererId>().is_err());
    }

    #[test]
    fn bar_click_becomes_select() {
        let mut d = RenderDispatcher::new(Calls::default(), "none");
        let out = d.render(&frame(RendererId::Bar, series(), Some(Selectable::Neighbourhood)));
        assert_eq!(
            out,
            RenderOutcome::Drawn {
                renderer: RendererId::Bar,
                elements: 2
            }
        );
        assert_eq!(d.surface().0, vec!["bar:2"]);
        assert_eq!(
            d.interact(&Interaction::ElementActivated { key: "X".into() }),
            Some(NavEvent::Select("X".into()))
        );
        assert_eq!(d.interact(&Interaction::ElementActivated { key: "Z".into() }), None);
    }

    #[test]
    fn non_selectable_chart_drops_clicks() {
        let mut d = RenderDispatcher::new(Calls::default(), "none");
        d.render(&frame(RendererId::Pie, series(), None));
        assert!(d.active_keys().is_empty());
        assert_eq!(d.interact(&Interaction::ElementActivated { key: "X".into() }), None);
    }

    #[test]
    fn listings_use_ids_as_keys() {
        let mut d = RenderDispatcher::new(Calls::default(), "none");
        let data = SceneData::Listings(vec![Listing::new(7, "X", 90.0)]);
        d.render(&frame(RendererId::Bar, data, Some(Selectable::Listing)));
        assert_eq!(d.active_keys(), &["7".to_string()]);
    }

    #[test]
    fn empty_data_draws_placeholder_and_clears_previous() {
        let mut d = RenderDispatcher::new(Calls::default(), "No data");
        d.render(&frame(RendererId::Bar, series(), Some(Selectable::Neighbourhood)));
        let out = d.render(&frame(
            RendererId::LinePoints,
            SceneData::Series(AggregatedSeries::new()),
            None,
        ));
        assert_eq!(out, RenderOutcome::Placeholder);
        assert_eq!(d.surface().0, vec!["placeholder:No data"]);
        assert!(d.active_keys().is_empty());
    }

    #[test]
    fn chart_renderer_with_text_data_degrades() {
        let mut d = RenderDispatcher::new(Calls::default(), "No data");
        let out = d.render(&frame(RendererId::Pie, SceneData::Text("hello".into()), None));
        assert_eq!(out, RenderOutcome::Placeholder);
    }

    #[test]
    fn text_renderer_draws_body() {
        let mut d = RenderDispatcher::new(Calls::default(), "No data");
        d.render(&frame(RendererId::Text, SceneData::Text("hello".into()), None));
        assert_eq!(d.surface().0, vec!["text:hello"]);
    }
}
