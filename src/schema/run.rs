//! Command-line run configuration and report.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{ConfigError, Dtype, SearchConfig, SearchStats};
use crate::objectives::Builtin;

/// A run of one or more independent searches over a built-in objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RunConfig {
    /// Built-in objective to maximize.
    pub objective: Builtin,
    /// Element kind name (`u8`, `i32`, `f64`, ...).
    pub dtype: String,
    /// Genome length.
    pub n_genes: usize,
    /// Independent searches run in parallel.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Search parameters shared by every worker.
    #[serde(default)]
    pub search: SearchConfig,
    /// Candidates reported per worker.
    #[serde(default = "default_top")]
    pub top: usize,
}

fn default_workers() -> usize {
    1
}

fn default_top() -> usize {
    3
}

impl RunConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parsed element kind.
    pub fn dtype(&self) -> Result<Dtype, ConfigError> {
        self.dtype.parse()
    }

    /// Check everything a search would check, plus the run-level keys.
    pub fn validate(&self) -> Result<Dtype, ConfigError> {
        let dtype = self.dtype()?;
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        let n_objectives = self.objective.objectives::<f64>().len();
        self.search.validate(self.n_genes, dtype, n_objectives)?;
        Ok(dtype)
    }

    /// Configuration printed by `--example`.
    pub fn example() -> Self {
        Self {
            objective: Builtin::Sum,
            dtype: Dtype::U8.to_string(),
            n_genes: 50,
            workers: 2,
            search: SearchConfig {
                pop_size: 200,
                time_out_ms: 5_000,
                random_seed: Some(42),
                log_level: super::LogLevel::Quiet,
                ..Default::default()
            },
            top: 3,
        }
    }
}

/// One reported candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCandidate {
    pub rank: usize,
    /// Gene values widened to `f64`.
    pub genome: Vec<f64>,
    /// Raw score per objective.
    pub scores: Vec<f64>,
}

/// Result of one worker's search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerReport {
    pub worker: usize,
    pub seed: u64,
    pub top: Vec<RankedCandidate>,
    pub stats: SearchStats,
}

/// Result of a whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub objective: Builtin,
    pub dtype: Dtype,
    pub n_genes: usize,
    pub workers: Vec<WorkerReport>,
    /// Index into `workers` of the worker whose best candidate ranks first.
    pub best_worker: usize,
}

impl RunReport {
    /// Best candidate across all workers.
    pub fn best(&self) -> Option<&RankedCandidate> {
        self.workers.get(self.best_worker)?.top.first()
    }
}
