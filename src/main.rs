//! Genetic Search CLI - Run built-in objectives from JSON configuration.

use std::path::PathBuf;
use std::time::Instant;

use genetic_search::{compute, schema::RunConfig};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <run.json>", args[0]);
        eprintln!();
        eprintln!("Run a genetic search over a built-in objective from JSON configuration.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  run.json  Path to run configuration file");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let config_path = PathBuf::from(&args[1]);
    let config = RunConfig::load(&config_path).unwrap_or_else(|e| {
        eprintln!("Error loading config: {}", e);
        std::process::exit(1);
    });

    println!("Genetic Search");
    println!("==============");
    println!("Objective: {}", config.objective.as_str());
    println!("Genome: {} x {}", config.n_genes, config.dtype);
    println!("Population: {}", config.search.pop_size);
    println!("Workers: {}", config.workers);
    println!();

    let start = Instant::now();
    let report = compute::run(&config).unwrap_or_else(|e| {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    });
    let elapsed = start.elapsed();

    for worker in &report.workers {
        let stats = &worker.stats;
        println!(
            "Worker {} (seed {}): {} after {} rounds, {} evaluations ({:.0}/s)",
            worker.worker,
            worker.seed,
            stats.stop_reason.as_str(),
            stats.rounds,
            stats.evaluations,
            stats.evaluations_per_second
        );
        for candidate in &worker.top {
            println!(
                "  #{}: scores={:?} genome={:?}",
                candidate.rank, candidate.scores, candidate.genome
            );
        }
    }

    println!();
    if let Some(best) = report.best() {
        println!("Best (worker {}): {:?}", report.best_worker, best.scores);
        println!("  {:?}", best.genome);
    }
    println!("Time: {:.2}s", elapsed.as_secs_f32());
}

fn print_example_config() {
    let config = RunConfig::example();
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing example: {}", e),
    }
}
