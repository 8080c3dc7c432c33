//! Navigation state machine
//!
//! States are scene indices crossed with the selection context. Every event
//! in every state yields a defined next state:
//!
//! | Event         | Guard                          | Effect                                  |
//! |---------------|--------------------------------|-----------------------------------------|
//! | `Next`        | scene not terminal             | index + 1, selection kept               |
//! | `Next`        | terminal                       | ignored                                 |
//! | `Back`        | index > 0                      | index - 1, selection cleared            |
//! | `Back`        | index == 0                     | ignored                                 |
//! | `Select(key)` | scene selectable, key resolves | selection field set, then as `Next`     |
//! | `Select(key)` | otherwise                      | ignored                                 |
//!
//! [`transition`] is the pure function; [`NavigationMachine`] owns the single
//! mutable [`NavigationState`] and recomputes scene data after each event.

use crate::config::NarrativeConfig;
use crate::error::NarrativeError;
use crate::logging::{JournalEntry, NavigationJournal};
use crate::registry::SceneRegistry;
use crate::scene::{SceneDescriptor, SceneFrame, Selectable};
use crate::selection::SelectionContext;
use scrolly_data::{ListingId, RecordStore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Navigation input
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavEvent {
    Next,
    Back,
    /// A data key was chosen in the current scene
    Select(String),
}

impl fmt::Display for NavEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Next => f.write_str("next"),
            Self::Back => f.write_str("back"),
            Self::Select(key) => write!(f, "select({key})"),
        }
    }
}

/// Current narrative position and accumulated selections
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NavigationState {
    pub current_index: usize,
    pub selection: SelectionContext,
}

impl NavigationState {
    /// `(0, empty selection)`
    #[inline]
    #[must_use]
    pub fn initial() -> Self {
        Self::default()
    }
}

/// Why an event left the state unchanged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IgnoreReason {
    AtTerminal,
    AtStart,
    NotSelectable,
    UnknownKey,
}

/// Classification of a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Advanced,
    Retreated,
    /// Selection recorded; `advanced` is false at a terminal scene
    Selected { advanced: bool },
    Ignored(IgnoreReason),
}

impl Outcome {
    #[inline]
    #[must_use]
    pub fn is_ignored(self) -> bool {
        matches!(self, Self::Ignored(_))
    }
}

/// Result of applying one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: NavigationState,
    pub outcome: Outcome,
}

impl Transition {
    fn ignored(state: &NavigationState, reason: IgnoreReason) -> Self {
        Self {
            state: state.clone(),
            outcome: Outcome::Ignored(reason),
        }
    }
}

/// Whether forward navigation is possible from `scene`
#[inline]
#[must_use]
pub fn can_advance(scene: &SceneDescriptor, registry: &SceneRegistry) -> bool {
    !scene.is_terminal && scene.index < registry.last_index()
}

/// Compute the next state for `event`
///
/// Guard failures are [`Outcome::Ignored`], never errors.
///
/// # Errors
/// Only contract violations: a state index outside the registry, or a
/// listing lookup against an unloaded store.
pub fn transition(
    state: &NavigationState,
    event: &NavEvent,
    registry: &SceneRegistry,
    store: &RecordStore,
) -> Result<Transition, NarrativeError> {
    let scene = registry.describe(state.current_index)?;

    let transition = match event {
        NavEvent::Next => {
            if can_advance(scene, registry) {
                Transition {
                    state: NavigationState {
                        current_index: state.current_index + 1,
                        selection: state.selection.clone(),
                    },
                    outcome: Outcome::Advanced,
                }
            } else {
                Transition::ignored(state, IgnoreReason::AtTerminal)
            }
        }
        NavEvent::Back => {
            if state.current_index > 0 {
                Transition {
                    state: NavigationState {
                        current_index: state.current_index - 1,
                        selection: SelectionContext::empty(),
                    },
                    outcome: Outcome::Retreated,
                }
            } else {
                Transition::ignored(state, IgnoreReason::AtStart)
            }
        }
        NavEvent::Select(key) => match scene.selectable {
            None => Transition::ignored(state, IgnoreReason::NotSelectable),
            Some(kind) => match select(&state.selection, kind, key, store)? {
                None => Transition::ignored(state, IgnoreReason::UnknownKey),
                Some(selection) => {
                    let advanced = can_advance(scene, registry);
                    let current_index = if advanced {
                        state.current_index + 1
                    } else {
                        state.current_index
                    };
                    Transition {
                        state: NavigationState {
                            current_index,
                            selection,
                        },
                        outcome: Outcome::Selected { advanced },
                    }
                }
            },
        },
    };

    Ok(transition)
}

/// New selection for a click on `key`, or `None` if the key does not resolve
fn select(
    current: &SelectionContext,
    kind: Selectable,
    key: &str,
    store: &RecordStore,
) -> Result<Option<SelectionContext>, NarrativeError> {
    match kind {
        Selectable::Neighbourhood => {
            let known = store.neighbourhoods()?.iter().any(|n| n.name == key)
                || store.listings()?.iter().any(|l| l.neighbourhood == key);
            Ok(known.then(|| SelectionContext::neighbourhood(key)))
        }
        Selectable::Listing => {
            let Ok(id) = key.parse::<ListingId>() else {
                return Ok(None);
            };
            let Some(listing) = store.listing(id)? else {
                return Ok(None);
            };
            match current.selected_neighbourhood() {
                Some(hood) if hood != listing.neighbourhood => Ok(None),
                _ => Ok(Some(SelectionContext::listing(&listing.neighbourhood, id))),
            }
        }
    }
}

/// Owner of the session's single [`NavigationState`]
#[derive(Debug)]
pub struct NavigationMachine {
    registry: Arc<SceneRegistry>,
    store: Arc<RecordStore>,
    config: NarrativeConfig,
    state: NavigationState,
    journal: NavigationJournal,
}

/// One processed event: what happened and what to draw now
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub outcome: Outcome,
    pub frame: SceneFrame,
}

impl NavigationMachine {
    /// Start at `(0, empty selection)` over a loaded store
    ///
    /// # Errors
    /// [`NarrativeError::NotLoaded`] if the store has not been loaded.
    pub fn new(
        registry: Arc<SceneRegistry>,
        store: Arc<RecordStore>,
        config: NarrativeConfig,
    ) -> Result<Self, NarrativeError> {
        if !store.is_loaded() {
            return Err(NarrativeError::NotLoaded);
        }
        let journal = NavigationJournal::with_capacity(config.journal_capacity);
        Ok(Self {
            registry,
            store,
            config,
            state: NavigationState::initial(),
            journal,
        })
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &SceneRegistry {
        &self.registry
    }

    #[inline]
    #[must_use]
    pub fn journal(&self) -> &NavigationJournal {
        &self.journal
    }

    /// Descriptor of the current scene
    ///
    /// # Errors
    /// [`NarrativeError::Registry`] if the state index is out of range.
    pub fn current_scene(&self) -> Result<&SceneDescriptor, NarrativeError> {
        Ok(self.registry.describe(self.state.current_index)?)
    }

    /// Resolve the current scene's data and title
    ///
    /// # Errors
    /// Contract violations only.
    pub fn frame(&self) -> Result<SceneFrame, NarrativeError> {
        self.frame_for(&self.state)
    }

    /// Resolve an arbitrary state without touching the machine
    ///
    /// # Errors
    /// Contract violations only.
    pub fn frame_for(&self, state: &NavigationState) -> Result<SceneFrame, NarrativeError> {
        let scene = self.registry.describe(state.current_index)?;
        let data = scene
            .requirement
            .resolve(&self.store, &state.selection, &self.config)?;
        let mut frame = SceneFrame::build(scene, self.registry.len(), &state.selection, data);
        frame.is_terminal = !can_advance(scene, &self.registry);
        Ok(frame)
    }

    /// Apply one event, record it, and return the frame to draw
    ///
    /// # Errors
    /// Contract violations only; the state is unchanged on error.
    pub fn apply(&mut self, event: NavEvent) -> Result<Step, NarrativeError> {
        let from = self.state.clone();
        let Transition { state, outcome } = transition(&from, &event, &self.registry, &self.store)?;
        let frame = self.frame_for(&state)?;

        match outcome {
            Outcome::Ignored(reason) if matches!(event, NavEvent::Select(_)) => {
                warn!(%event, ?reason, index = from.current_index, "selection ignored");
            }
            _ => debug!(%event, ?outcome, from = from.current_index, to = state.current_index, "transition"),
        }

        self.journal.append(JournalEntry::new(
            event,
            from.current_index,
            state.current_index,
            outcome,
        ));
        self.state = state;
        Ok(Step { outcome, frame })
    }
}
