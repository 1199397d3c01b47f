//! Built-in objective functions.
//!
//! Used by the command-line runner, the demos and the tests.

use serde::{Deserialize, Serialize};

use crate::compute::Objective;
use crate::schema::Gene;

/// Objective set selectable by name from a run configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Builtin {
    /// Maximize the sum of all genes.
    Sum,
    /// Find a root of `log2(x1) * x2^x3 / x4 + x5^log2(x6)`.
    Roots,
    /// Three competing objectives: small genes, even genes, multiples of 3.
    Parity,
}

impl Builtin {
    pub fn as_str(self) -> &'static str {
        match self {
            Builtin::Sum => "sum",
            Builtin::Roots => "roots",
            Builtin::Parity => "parity",
        }
    }

    /// Objective functions for genomes of `T`.
    pub fn objectives<T: Gene>(self) -> Vec<Objective<T>> {
        match self {
            Builtin::Sum => vec![Box::new(sum::<T>)],
            Builtin::Roots => vec![Box::new(roots::<T>)],
            Builtin::Parity => vec![
                Box::new(|g: &[T]| -sum(g)),
                Box::new(|g: &[T]| count_multiples(g, 2.0)),
                Box::new(|g: &[T]| count_multiples(g, 3.0)),
            ],
        }
    }
}

/// Sum of all genes.
pub fn sum<T: Gene>(genome: &[T]) -> f64 {
    genome.iter().map(|g| g.to_f64()).sum()
}

/// Negated distance of the first six genes from a root of
/// `log2(x1) * x2^x3 / x4 + x5^log2(x6)`. Zero at a root.
///
/// Any non-finite intermediate (e.g. division by zero) scores negative
/// infinity, never NaN. Genomes shorter than six genes score negative
/// infinity too.
pub fn roots<T: Gene>(genome: &[T]) -> f64 {
    let [x1, x2, x3, x4, x5, x6] = match genome.get(..6) {
        Some(&[a, b, c, d, e, f]) => [a, b, c, d, e, f].map(Gene::to_f64),
        _ => return f64::NEG_INFINITY,
    };
    let value = -(x1.log2() * x2.powf(x3) / x4 + x5.powf(x6.log2())).abs();
    if value.is_finite() {
        value
    } else {
        f64::NEG_INFINITY
    }
}

/// Number of genes that are exact multiples of `divisor`.
pub fn count_multiples<T: Gene>(genome: &[T], divisor: f64) -> f64 {
    genome
        .iter()
        .filter(|g| g.to_f64() % divisor == 0.0)
        .count() as f64
}
