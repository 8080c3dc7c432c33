//! Randomised navigation testing

pub mod simulator;

pub use simulator::*;

use crate::error::NarrativeError;
use crate::registry::SceneRegistry;
use scrolly_data::RecordStore;
use std::sync::Arc;

/// Multi-seed runs of the simulator over the standard registry
pub struct TestHarness;

impl TestHarness {
    /// Run `seeds` independent simulations of `events` events each
    ///
    /// # Errors
    /// [`NarrativeError::NotLoaded`] if the store is empty.
    pub fn run_certification(
        store: &Arc<RecordStore>,
        seeds: u64,
        events: u64,
    ) -> Result<CertificationReport, NarrativeError> {
        let mut total_violations = 0;
        let mut failed_seeds = Vec::new();

        for seed in 0..seeds {
            let config = SimulatorConfig {
                seed,
                total_operations: events,
                ..Default::default()
            };
            let report = run_simulator(config, SceneRegistry::standard(), Arc::clone(store))?;
            if !report.passed() {
                failed_seeds.push(seed);
            }
            total_violations += report.violations.len();
        }

        Ok(CertificationReport {
            passed: failed_seeds.is_empty(),
            total_violations,
            seeds_tested: seeds,
            failed_seeds,
        })
    }
}

/// Outcome of a multi-seed run
#[derive(Debug, Clone)]
pub struct CertificationReport {
    pub passed: bool,
    pub total_violations: usize,
    pub seeds_tested: u64,
    pub failed_seeds: Vec<u64>,
}
