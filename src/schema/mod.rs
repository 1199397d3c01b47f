//! Schema module - Configuration, element kinds and result types.

mod config;
pub mod dtype;
mod events;
mod run;

pub use config::*;
pub use dtype::{Dtype, Gene};
pub use events::*;
pub use run::*;
