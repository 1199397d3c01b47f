//! Quick search performance test

use genetic_search::{
    GeneticSearch,
    objectives::{Builtin, sum},
    schema::SearchConfig,
};
use std::time::Instant;

fn main() {
    env_logger::init();

    println!("=== Search Performance Test ===\n");

    // Test different genome lengths
    for n_genes in [10, 100, 1000] {
        println!("Genome: {} x u8", n_genes);

        let config = SearchConfig {
            pop_size: 300,
            n_rounds: 100,
            random_seed: Some(42),
            ..Default::default()
        };

        let start = Instant::now();
        let mut search = match GeneticSearch::<u8>::single(sum::<u8>, n_genes, &config) {
            Ok(search) => search,
            Err(e) => {
                eprintln!("Invalid configuration: {}", e);
                return;
            }
        };
        let outcome = search.search();
        let elapsed = start.elapsed();

        let stats = outcome.stats();
        let max = 255.0 * n_genes as f64;

        println!("  Rounds:         {}", stats.rounds);
        println!("  Evaluations:    {}", stats.evaluations);
        println!("  Elapsed:        {:.2}s", elapsed.as_secs_f64());
        println!("  Evals/sec:      {:.1}", stats.evaluations_per_second);
        println!(
            "  Best score:     {:.0} ({:.1}% of max)",
            stats.best_scores[0],
            100.0 * stats.best_scores[0] / max
        );
        println!();
    }

    println!("=== Scalability Test (parity, 300 genes) ===\n");

    // Test different population sizes
    for pop_size in [50, 100, 200, 400] {
        let config = SearchConfig {
            pop_size,
            n_rounds: 50,
            random_seed: Some(42),
            ..Default::default()
        };

        let start = Instant::now();
        let mut search = match GeneticSearch::<u8>::new(Builtin::Parity.objectives(), 300, &config)
        {
            Ok(search) => search,
            Err(e) => {
                eprintln!("Invalid configuration: {}", e);
                return;
            }
        };
        let outcome = search.search();
        let elapsed = start.elapsed();

        println!(
            "  pop={:4}: {:.2}s, {:.1} evals/sec, best {:?}",
            pop_size,
            elapsed.as_secs_f64(),
            outcome.stats().evaluations_per_second,
            outcome.scores(0)
        );
    }
}
