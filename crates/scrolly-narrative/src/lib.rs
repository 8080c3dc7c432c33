//! Scrolly Narrative
//!
//! A linear sequence of chart scenes with drill-down: a click in one scene
//! narrows what the following scenes show.
//!
//! # Core Concepts
//!
//! - [`SceneRegistry`]: the ordered scenes and what data each needs
//! - [`NavigationState`]: current scene index plus the [`SelectionContext`]
//! - [`transition`]: pure `(state, event) -> state` function
//! - [`RenderDispatcher`]: draws a [`SceneFrame`] on a [`RenderSurface`]
//! - [`Session`]: async load, then a synchronous event loop
//!
//! # Example
//!
//! ```rust
//! use scrolly_data::{Listing, Neighbourhood, RecordStore};
//! use scrolly_narrative::{transition, NavEvent, NavigationState, Outcome, SceneRegistry};
//!
//! let store = RecordStore::new();
//! store.load_records(
//!     vec![Listing::new(1, "X", 100.0), Listing::new(2, "Y", 200.0)],
//!     vec![Neighbourhood::new("Manhattan", "X")],
//!     vec![],
//! )?;
//! let registry = SceneRegistry::standard();
//!
//! let state = NavigationState::initial();
//! let next = transition(&state, &NavEvent::Select("X".into()), &registry, &store)?;
//! assert_eq!(next.outcome, Outcome::Selected { advanced: true });
//! assert_eq!(next.state.current_index, 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod navigation;
pub mod registry;
pub mod scene;
pub mod selection;
pub mod session;
pub mod test_harness;

pub use config::NarrativeConfig;
pub use dispatch::{
    Chart, ChartDatum, Interaction, RenderDispatcher, RenderOutcome, RenderSurface, RendererId,
    UnknownRenderer,
};
pub use error::{JournalError, NarrativeError, RegistryError, SourceError};
pub use logging::{init_tracing, JournalEntry, NavigationJournal, DEFAULT_FILTER};
pub use navigation::{
    can_advance, transition, IgnoreReason, NavEvent, NavigationMachine, NavigationState, Outcome,
    Step, Transition,
};
pub use registry::SceneRegistry;
pub use scene::{DataRequirement, GroupKey, SceneData, SceneDescriptor, SceneFrame, Scope, Selectable};
pub use selection::SelectionContext;
pub use session::{ControlState, DatasetSource, Handled, Session};
pub use test_harness::{run_simulator, SimulatorConfig, TestHarness};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
