//! Compute module - The genetic search engine.

mod convergence;
mod fitness;
mod listener;
mod niching;
mod operators;
mod population;
mod ranking;
mod rng;
mod runner;
mod schedule;
mod search;
mod selection;

pub use convergence::*;
pub use fitness::*;
pub use listener::*;
pub use niching::*;
pub use operators::*;
pub use population::*;
pub use ranking::*;
pub use rng::*;
pub use runner::*;
pub use schedule::*;
pub use search::*;
pub use selection::*;
