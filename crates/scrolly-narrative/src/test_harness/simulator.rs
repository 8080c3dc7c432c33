//! Narrative simulator
//!
//! Drives a [`NavigationMachine`] with a seeded stream of random events and
//! checks the navigation invariants after every step.

use crate::config::NarrativeConfig;
use crate::error::NarrativeError;
use crate::navigation::{NavEvent, NavigationMachine, NavigationState, Outcome, Step};
use crate::registry::SceneRegistry;
use crate::scene::{SceneData, SceneFrame};
use rand::{rngs::StdRng, Rng, SeedableRng};
use scrolly_data::RecordStore;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

/// Simulator configuration
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// Total events to apply
    pub total_operations: u64,
    pub distribution: EventDistribution,
    pub stop_on_first_violation: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            total_operations: 1_000,
            distribution: EventDistribution::default(),
            stop_on_first_violation: true,
        }
    }
}

/// Probability distribution for event generation
#[derive(Debug, Clone)]
pub struct EventDistribution {
    /// `Next`, `Back`, or a click on a drawn element
    pub valid_ops: f64,
    /// Boundary presses: `Back` at the start, `Next` at the end
    pub edge_cases: f64,
    /// Clicks on keys that do not exist
    pub invalid_ops: f64,
}

impl Default for EventDistribution {
    fn default() -> Self {
        Self {
            valid_ops: 0.70,
            edge_cases: 0.20,
            invalid_ops: 0.10,
        }
    }
}

/// How the simulator expects an event to be classified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedResult {
    /// Not [`Outcome::Ignored`]
    ShouldApply,
    ShouldBeIgnored,
    /// Depends on state the generator does not model
    Either,
}

/// A violation detected during simulation
#[derive(Debug, Clone)]
pub enum Violation {
    UnexpectedOutcome {
        operation_index: u64,
        event: NavEvent,
        expected: ExpectedResult,
        actual: Outcome,
    },
    /// `apply` returned an error
    Error {
        operation_index: u64,
        event: NavEvent,
        error: NarrativeError,
    },
    Invariant(InvariantViolation),
}

#[derive(Debug, Clone)]
pub struct InvariantViolation {
    pub operation_index: u64,
    pub check: InvariantCheck,
    pub details: String,
}

/// Types of invariant checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantCheck {
    IndexInBounds,
    BackResetsSelection,
    ForwardNeverDecreasesIndex,
    IgnoredLeavesStateUnchanged,
    SelectionIsConsistent,
    RerenderIsStable,
    JournalIsContiguous,
}

/// Statistics collected during simulation
#[derive(Debug, Clone, Default)]
pub struct EventStats {
    pub total_operations: u64,
    pub applied: u64,
    pub ignored: u64,
    pub events_by_type: HashMap<String, u64>,
    pub visits_by_scene: HashMap<usize, u64>,
}

impl EventStats {
    fn record(&mut self, event: &NavEvent, outcome: Outcome, index: usize) {
        self.total_operations += 1;
        let name = match event {
            NavEvent::Next => "next",
            NavEvent::Back => "back",
            NavEvent::Select(_) => "select",
        };
        *self.events_by_type.entry(name.to_string()).or_insert(0) += 1;
        *self.visits_by_scene.entry(index).or_insert(0) += 1;
        if outcome.is_ignored() {
            self.ignored += 1;
        } else {
            self.applied += 1;
        }
    }
}

/// Final report from the simulator
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub config: SimulatorConfig,
    pub stats: EventStats,
    pub violations: Vec<Violation>,
    pub final_state: NavigationState,
}

impl SimulationReport {
    /// No violations recorded
    #[must_use]
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    #[must_use]
    pub fn generate_text(&self) -> String {
        let mut report = String::new();
        let _ = writeln!(report, "=== Narrative Simulator Report ===\n");
        let _ = writeln!(report, "Seed: {}", self.config.seed);
        let _ = writeln!(report, "Total Events: {}", self.stats.total_operations);
        let _ = writeln!(report, "Applied: {}", self.stats.applied);
        let _ = writeln!(report, "Ignored: {}", self.stats.ignored);
        let _ = writeln!(report, "Violations: {}", self.violations.len());
        let _ = writeln!(
            report,
            "Final Scene: {} ({})",
            self.final_state.current_index,
            self.final_state.selection.scope_label()
        );

        if !self.violations.is_empty() {
            report.push_str("\n=== Violations ===\n");
            for (i, v) in self.violations.iter().enumerate() {
                let _ = writeln!(report, "{}. {v:?}", i + 1);
            }
        }

        let _ = writeln!(
            report,
            "\n=== Result: {} ===",
            if self.passed() { "PASS" } else { "FAIL" }
        );
        report
    }
}

/// Run the simulator over a loaded store
///
/// # Errors
/// [`NarrativeError::NotLoaded`] if the store is empty; everything after
/// start-up is reported as a [`Violation`].
pub fn run_simulator(
    config: SimulatorConfig,
    registry: SceneRegistry,
    store: Arc<RecordStore>,
) -> Result<SimulationReport, NarrativeError> {
    let registry = Arc::new(registry);
    let mut machine = NavigationMachine::new(registry, store, NarrativeConfig::default())?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut stats = EventStats::default();
    let mut violations = Vec::new();
    let mut frame = machine.frame()?;

    for i in 0..config.total_operations {
        let (event, expected) = generate_event(&mut rng, &config.distribution, &frame);
        let before = machine.state().clone();

        let Step { outcome, frame: next } = match machine.apply(event.clone()) {
            Ok(step) => step,
            Err(error) => {
                violations.push(Violation::Error {
                    operation_index: i,
                    event,
                    error,
                });
                if config.stop_on_first_violation {
                    break;
                }
                continue;
            }
        };

        let matches = match expected {
            ExpectedResult::ShouldApply => !outcome.is_ignored(),
            ExpectedResult::ShouldBeIgnored => outcome.is_ignored(),
            ExpectedResult::Either => true,
        };
        if !matches {
            violations.push(Violation::UnexpectedOutcome {
                operation_index: i,
                event: event.clone(),
                expected,
                actual: outcome,
            });
        }

        let found = NavigationInvariants::check_all(i, &machine, &before, &event, outcome, &next);
        let failed = !matches || !found.is_empty();
        violations.extend(found.into_iter().map(Violation::Invariant));

        stats.record(&event, outcome, machine.state().current_index);
        frame = next;

        if failed && config.stop_on_first_violation {
            break;
        }
    }

    Ok(SimulationReport {
        config,
        stats,
        violations,
        final_state: machine.state().clone(),
    })
}

fn generate_event(rng: &mut StdRng, distribution: &EventDistribution, frame: &SceneFrame) -> (NavEvent, ExpectedResult) {
    let r: f64 = rng.gen();
    if r < distribution.valid_ops {
        generate_valid_event(rng, frame)
    } else if r < distribution.valid_ops + distribution.edge_cases {
        generate_edge_case_event(rng, frame)
    } else {
        generate_invalid_event(rng, frame)
    }
}

fn generate_valid_event(rng: &mut StdRng, frame: &SceneFrame) -> (NavEvent, ExpectedResult) {
    let keys = drawn_keys(frame);
    match rng.gen_range(0..3) {
        0 if frame.selectable.is_some() && !keys.is_empty() => {
            let key = keys[rng.gen_range(0..keys.len())].clone();
            (NavEvent::Select(key), ExpectedResult::ShouldApply)
        }
        1 if frame.can_retreat => (NavEvent::Back, ExpectedResult::ShouldApply),
        _ if !frame.is_terminal => (NavEvent::Next, ExpectedResult::ShouldApply),
        _ => (NavEvent::Next, ExpectedResult::ShouldBeIgnored),
    }
}

fn generate_edge_case_event(rng: &mut StdRng, frame: &SceneFrame) -> (NavEvent, ExpectedResult) {
    match rng.gen_range(0..3) {
        0 if frame.index == 0 => (NavEvent::Back, ExpectedResult::ShouldBeIgnored),
        1 if frame.is_terminal => (NavEvent::Next, ExpectedResult::ShouldBeIgnored),
        2 if frame.selectable.is_none() => {
            let key = drawn_keys(frame).into_iter().next().unwrap_or_default();
            (NavEvent::Select(key), ExpectedResult::ShouldBeIgnored)
        }
        _ => (NavEvent::Back, ExpectedResult::Either),
    }
}

fn generate_invalid_event(rng: &mut StdRng, _frame: &SceneFrame) -> (NavEvent, ExpectedResult) {
    let key = match rng.gen_range(0..3) {
        0 => String::new(),
        1 => format!("missing-{}", rng.gen::<u32>()),
        _ => u64::MAX.to_string(),
    };
    (NavEvent::Select(key), ExpectedResult::ShouldBeIgnored)
}

fn drawn_keys(frame: &SceneFrame) -> Vec<String> {
    match &frame.data {
        SceneData::Series(series) => series.keys().map(str::to_string).collect(),
        SceneData::Listings(listings) => listings.iter().map(|l| l.id.to_string()).collect(),
        SceneData::Text(_) => Vec::new(),
    }
}

/// Navigation invariant checks
pub struct NavigationInvariants;

impl NavigationInvariants {
    /// Run every check against one completed step
    #[must_use]
    pub fn check_all(
        operation_index: u64,
        machine: &NavigationMachine,
        before: &NavigationState,
        event: &NavEvent,
        outcome: Outcome,
        frame: &SceneFrame,
    ) -> Vec<InvariantViolation> {
        let after = machine.state();
        let mut found = Vec::new();
        let mut check = |ok: bool, check: InvariantCheck, details: String| {
            if !ok {
                found.push(InvariantViolation {
                    operation_index,
                    check,
                    details,
                });
            }
        };

        check(
            after.current_index < machine.registry().len(),
            InvariantCheck::IndexInBounds,
            format!("index {} with {} scenes", after.current_index, machine.registry().len()),
        );
        check(
            !matches!(outcome, Outcome::Retreated) || after.selection.is_empty(),
            InvariantCheck::BackResetsSelection,
            format!("selection after back: {:?}", after.selection),
        );
        check(
            matches!(event, NavEvent::Back) || after.current_index >= before.current_index,
            InvariantCheck::ForwardNeverDecreasesIndex,
            format!("{event} moved {} -> {}", before.current_index, after.current_index),
        );
        check(
            !outcome.is_ignored() || after == before,
            InvariantCheck::IgnoredLeavesStateUnchanged,
            format!("{event} ignored but state changed"),
        );
        check(
            after.selection.is_consistent(),
            InvariantCheck::SelectionIsConsistent,
            format!("{:?}", after.selection),
        );
        check(
            machine.frame().as_ref() == Ok(frame),
            InvariantCheck::RerenderIsStable,
            format!("scene {} resolved differently on re-render", after.current_index),
        );
        check(
            machine.journal().verify().is_ok(),
            InvariantCheck::JournalIsContiguous,
            format!("{:?}", machine.journal().verify()),
        );

        found
    }
}
