use std::str::FromStr;
use std::time::Duration;

use log::warn;

use crate::SearchError;

pub const MAX_ITERATIONS_ENV: &str = "LAYOUT_SEARCH_MAX_ITERATIONS";
pub const SEED_ENV: &str = "LAYOUT_SEARCH_SEED";
pub const TIME_BUDGET_ENV: &str = "LAYOUT_SEARCH_TIME_BUDGET_MS";

#[derive(Clone, Debug, PartialEq)]
pub struct OptimizerConfig {
    pub max_iterations: usize,
    /// Half-width of the uniform location perturbation.
    pub location_step: f64,
    /// Half-width of the uniform orientation perturbation, in degrees.
    pub orientation_step: f64,
    /// Fixed seed for reproducible runs; `None` draws from OS entropy.
    pub seed: Option<u64>,
    pub time_budget: Option<Duration>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            location_step: 0.5,
            orientation_step: 5.0,
            seed: None,
            time_budget: None,
        }
    }
}

impl OptimizerConfig {
    /// Defaults overridden by `LAYOUT_SEARCH_*` environment variables.
    /// Values that do not parse are ignored with a warning.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_iterations: env_value(MAX_ITERATIONS_ENV).unwrap_or(defaults.max_iterations),
            seed: env_value(SEED_ENV).or(defaults.seed),
            time_budget: env_value(TIME_BUDGET_ENV)
                .map(Duration::from_millis)
                .or(defaults.time_budget),
            ..defaults
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        for (name, step) in [
            ("location_step", self.location_step),
            ("orientation_step", self.orientation_step),
        ] {
            if !step.is_finite() || step < 0.0 {
                return Err(SearchError::Config(format!(
                    "{name} must be a finite, non-negative number (got {step})"
                )));
            }
        }
        Ok(())
    }
}

fn env_value<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("ignoring unparsable {key}={raw:?}");
            None
        }
    }
}
