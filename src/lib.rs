//! Genetic Search - Evolutionary optimization over fixed-length numeric genomes.
//!
//! This crate provides an embeddable genetic search engine. Given one or more
//! objective functions over genomes of a fixed numeric element kind, it
//! evolves a population with elitism, tournament selection, mutation and
//! uniform crossover until a time budget, a round budget or a fitness
//! plateau stops it.
//!
//! # Architecture
//!
//! The crate is split into three modules:
//!
//! - `schema`: Configuration, element kinds and result types
//! - `compute`: The search engine (schedules, population, ranking, operators, driver)
//! - `objectives`: Built-in objective functions
//!
//! # Example
//!
//! ```rust,no_run
//! use genetic_search::{
//!     compute::GeneticSearch,
//!     schema::SearchConfig,
//! };
//!
//! let config = SearchConfig {
//!     time_out_ms: 2_000,
//!     random_seed: Some(42),
//!     ..Default::default()
//! };
//!
//! // Maximize the sum of 20 unsigned bytes.
//! let mut search = GeneticSearch::<u8>::single(
//!     |genome| genome.iter().map(|&g| g as f64).sum(),
//!     20,
//!     &config,
//! )?;
//! let outcome = search.search();
//!
//! println!("Best: {:?} ({:?})", outcome.best(), outcome.stop_reason());
//! # Ok::<(), genetic_search::schema::ConfigError>(())
//! ```

pub mod compute;
pub mod objectives;
pub mod schema;

// Re-export commonly used types
pub use compute::{GeneticSearch, SearchEvent, SearchOutcome};
pub use schema::{ConfigError, Dtype, Gene, SearchConfig, StopReason};
