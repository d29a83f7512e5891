//! Load-then-evaluate driver for one job

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::host::HostContext;
use runjs_core::{ExecutionOutcome, Job, RunError};

/// Runs a job: reads its source unit once and evaluates it at most once
#[derive(Debug, Clone)]
pub struct Runner {
    config: EngineConfig,
    host: HostContext,
}

impl Runner {
    #[must_use]
    pub const fn new(config: EngineConfig, host: HostContext) -> Self {
        Self { config, host }
    }

    /// Run the job to completion and report how it ended
    #[must_use]
    pub fn run(&self, job: &Job) -> ExecutionOutcome {
        let outcome = ExecutionOutcome::from(self.try_run(job));
        let directory = job.code_directory().display();
        match &outcome {
            ExecutionOutcome::Success => log::info!("job in {directory} completed"),
            ExecutionOutcome::Failure { stage, .. } => {
                log::info!("job in {directory} failed at {stage:?} stage");
            }
        }
        outcome
    }

    /// Same as [`Runner::run`] but keeps the typed error
    ///
    /// # Errors
    ///
    /// Returns the first `RunError` raised while reading or evaluating
    pub fn try_run(&self, job: &Job) -> Result<(), RunError> {
        let unit = runjs_loader::load(job)?;
        if unit.is_empty() {
            log::debug!("{} is empty", unit.path().display());
        }
        Engine::new(self.config.clone(), self.host.clone())?.evaluate(&unit)
    }
}
