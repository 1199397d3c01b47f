//! Tunes the search's own parameters by running nested searches.
//!
//! Each outer candidate encodes a configuration; its fitness is how well an
//! inner search with that configuration maximizes a sum of `i32` genes.

use genetic_search::{
    GeneticSearch,
    objectives::sum,
    schema::{LogLevel, ParamOption, SearchConfig, Trend},
};

const INNER_GENES: usize = 100;

fn decode(candidate: &[u8]) -> SearchConfig {
    let pop_size = 40 + candidate[0] as usize;
    let max_mutations = 1.0 + (candidate[1] % 20) as f64;
    SearchConfig {
        pop_size,
        n_elite: ParamOption::constant((2 + candidate[2] as usize % (pop_size / 2)) as f64),
        n_mutations: Some(ParamOption::scheduled(
            max_mutations,
            1.0,
            Trend::DecreasesWithRank,
        )),
        p_mutate: ParamOption::constant(candidate[3] as f64 / 255.0),
        n_track: 10 + candidate[4] as usize,
        n_rounds: 200,
        time_out_ms: 2_000,
        random_seed: Some(7),
        ..Default::default()
    }
}

fn inner_fitness(candidate: &[u8]) -> f64 {
    match GeneticSearch::<i32>::single(sum::<i32>, INNER_GENES, &decode(candidate)) {
        Ok(mut search) => search.search().stats().best_scores[0],
        Err(_) => f64::NEG_INFINITY,
    }
}

fn main() {
    env_logger::init();

    let config = SearchConfig {
        pop_size: 20,
        n_elite: ParamOption::constant(3.0),
        time_out_ms: 120_000,
        n_rounds: 20,
        multimodal: true,
        log_level: LogLevel::Normal,
        random_seed: Some(1),
        ..Default::default()
    };

    let mut meta = match GeneticSearch::<u8>::single(inner_fitness, 5, &config) {
        Ok(search) => search,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return;
        }
    };

    let outcome = meta.search();
    println!(
        "Meta search {} after {} rounds",
        outcome.stop_reason().as_str(),
        outcome.stats().rounds
    );

    for (rank, candidate) in outcome.candidates().take(3).enumerate() {
        let tuned = decode(candidate);
        println!(
            "#{} score {:.0}: popSize {}, nElite {:?}, nMutations {:?}, pMutate {:?}, nTrack {}",
            rank,
            outcome.score(0, rank),
            tuned.pop_size,
            tuned.n_elite,
            tuned.n_mutations,
            tuned.p_mutate,
            tuned.n_track
        );
    }
}
