//! Narrative session
//!
//! Ties the pieces together: an async dataset load, then a synchronous event
//! loop in which every event is transitioned, resolved and rendered before the
//! next one is looked at.

use crate::config::NarrativeConfig;
use crate::dispatch::{Interaction, RenderDispatcher, RenderOutcome, RenderSurface};
use crate::error::{NarrativeError, SourceError};
use crate::logging::NavigationJournal;
use crate::navigation::{can_advance, NavEvent, NavigationMachine, NavigationState, Outcome};
use crate::registry::SceneRegistry;
use scrolly_data::{RawDatasets, RecordStore, StoreCounts, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Where the three tables come from (files, HTTP, fixtures)
#[async_trait::async_trait]
pub trait DatasetSource: Send + Sync {
    async fn fetch(&self) -> Result<RawDatasets, SourceError>;
}

/// State of the navigation controls, for the UI binding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlState {
    pub can_advance: bool,
    pub can_retreat: bool,
    pub index: usize,
    pub len: usize,
}

/// Result of one handled event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handled {
    pub outcome: Outcome,
    pub render: RenderOutcome,
}

/// One viewer's walk through the narrative
pub struct Session<S> {
    registry: Arc<SceneRegistry>,
    config: NarrativeConfig,
    store: Arc<RecordStore>,
    dispatcher: RenderDispatcher<S>,
    machine: Option<NavigationMachine>,
}

impl<S: RenderSurface> Session<S> {
    #[must_use]
    pub fn new(registry: SceneRegistry, surface: S, config: NarrativeConfig) -> Self {
        let dispatcher = RenderDispatcher::new(surface, &config.no_data_message);
        Self {
            registry: Arc::new(registry),
            config,
            store: Arc::new(RecordStore::new()),
            dispatcher,
            machine: None,
        }
    }

    /// Fetch and load the datasets, then render scene 0
    ///
    /// On failure the surface shows the "no data" placeholder and the session
    /// stays unloaded, so a later `load` may retry.
    ///
    /// # Errors
    /// [`NarrativeError::Source`] when the fetch fails, [`NarrativeError::Store`]
    /// when a row cannot be coerced or the session is already loaded.
    #[instrument(skip_all)]
    pub async fn load<D>(&mut self, source: &D) -> Result<StoreCounts, NarrativeError>
    where
        D: DatasetSource + ?Sized,
    {
        if self.machine.is_some() {
            return Err(NarrativeError::Store(StoreError::AlreadyLoaded));
        }

        let loaded = match source.fetch().await {
            Ok(datasets) => self.store.load_raw(&datasets).map_err(NarrativeError::from),
            Err(e) => Err(e.into()),
        };
        let counts = match loaded {
            Ok(counts) => counts,
            Err(err) => {
                error!(%err, "dataset load failed");
                self.dispatcher.render_unavailable();
                return Err(err);
            }
        };

        let machine = NavigationMachine::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.store),
            self.config.clone(),
        )?;
        let frame = machine.frame()?;
        self.dispatcher.render(&frame);
        self.machine = Some(machine);

        info!(
            listings = counts.listings,
            neighbourhoods = counts.neighbourhoods,
            reviews = counts.reviews,
            "session ready"
        );
        Ok(counts)
    }

    #[inline]
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.machine.is_some()
    }

    /// Apply one navigation event and redraw
    ///
    /// # Errors
    /// [`NarrativeError::NotLoaded`] before a successful load.
    pub fn handle(&mut self, event: NavEvent) -> Result<Handled, NarrativeError> {
        let machine = self.machine.as_mut().ok_or_else(|| {
            error!(%event, "event received before load");
            NarrativeError::NotLoaded
        })?;
        let step = machine.apply(event)?;
        let render = self.dispatcher.render(&step.frame);
        Ok(Handled {
            outcome: step.outcome,
            render,
        })
    }

    /// Route a surface interaction; stale clicks yield `Ok(None)`
    ///
    /// # Errors
    /// [`NarrativeError::NotLoaded`] before a successful load.
    pub fn interact(&mut self, interaction: &Interaction) -> Result<Option<Handled>, NarrativeError> {
        if self.machine.is_none() {
            return Err(NarrativeError::NotLoaded);
        }
        match self.dispatcher.interact(interaction) {
            Some(event) => self.handle(event).map(Some),
            None => Ok(None),
        }
    }

    /// Forward control
    ///
    /// # Errors
    /// See [`Session::handle`].
    #[inline]
    pub fn advance(&mut self) -> Result<Handled, NarrativeError> {
        self.handle(NavEvent::Next)
    }

    /// Back control
    ///
    /// # Errors
    /// See [`Session::handle`].
    #[inline]
    pub fn retreat(&mut self) -> Result<Handled, NarrativeError> {
        self.handle(NavEvent::Back)
    }

    /// Both controls disabled until loaded
    #[must_use]
    pub fn controls(&self) -> ControlState {
        let len = self.registry.len();
        let Some(machine) = &self.machine else {
            return ControlState {
                len,
                ..ControlState::default()
            };
        };
        let index = machine.state().current_index;
        ControlState {
            can_advance: machine
                .current_scene()
                .map(|scene| can_advance(scene, &self.registry))
                .unwrap_or(false),
            can_retreat: index > 0,
            index,
            len,
        }
    }

    /// Current navigation state, once loaded
    #[must_use]
    pub fn state(&self) -> Option<&NavigationState> {
        self.machine.as_ref().map(NavigationMachine::state)
    }

    #[must_use]
    pub fn journal(&self) -> Option<&NavigationJournal> {
        self.machine.as_ref().map(NavigationMachine::journal)
    }

    #[inline]
    #[must_use]
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &NarrativeConfig {
        &self.config
    }

    #[inline]
    pub fn dispatcher(&self) -> &RenderDispatcher<S> {
        &self.dispatcher
    }

    #[inline]
    pub fn surface(&self) -> &S {
        self.dispatcher.surface()
    }
}
