//! End-to-end tests of the search loop.

use std::sync::{Arc, Mutex};

use std::cmp::Ordering;

use genetic_search::{
    compute::{
        Comparator, Crossover, GeneRng, GeneSampler, GeneticSearch, Mutator, RoundStatus,
        ScoreTable, SearchEvent, Terminator, TruncationSelector,
    },
    objectives::{Builtin, roots, sum},
    schema::{ConfigError, Operation, ParamOption, SearchConfig, StopReason, Trend},
};

fn seeded(seed: u64) -> SearchConfig {
    SearchConfig {
        random_seed: Some(seed),
        ..Default::default()
    }
}

#[test]
fn test_single_round_budget() {
    let config = SearchConfig {
        pop_size: 20,
        n_rounds: 1,
        ..seeded(1)
    };
    let outcome = GeneticSearch::<u8>::single(sum::<u8>, 10, &config)
        .unwrap()
        .search();

    assert_eq!(outcome.stop_reason(), StopReason::RoundsExhausted);
    assert_eq!(outcome.stats().rounds, 1);
}

#[test]
fn test_zero_time_budget() {
    let config = SearchConfig {
        pop_size: 20,
        time_out_ms: 0,
        ..seeded(2)
    };
    let outcome = GeneticSearch::<f32>::single(sum::<f32>, 10, &config)
        .unwrap()
        .search();

    assert_eq!(outcome.stop_reason(), StopReason::TimedOut);
    assert_eq!(outcome.stats().rounds, 0);
    // The initial population is still evaluated and ranked.
    assert_eq!(outcome.stats().evaluations, 20);
}

#[test]
fn test_constant_objective_gets_stuck() {
    let config = SearchConfig {
        pop_size: 10,
        n_track: 5,
        min_improve: 1e-12,
        ..seeded(3)
    };
    let outcome = GeneticSearch::<i32>::single(|_: &[i32]| 7.0, 4, &config)
        .unwrap()
        .search();

    assert_eq!(outcome.stop_reason(), StopReason::Stuck);
    assert_eq!(outcome.stats().rounds, 5);
}

#[test]
fn test_sum_reaches_near_maximum() {
    let n_genes = 10;
    let config = SearchConfig {
        pop_size: 100,
        n_rounds: 300,
        time_out_ms: 60_000,
        ..seeded(42)
    };

    let best_per_round = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&best_per_round);
    let outcome = GeneticSearch::<u8>::single(sum::<u8>, n_genes, &config)
        .unwrap()
        .on_event(move |event| {
            if let SearchEvent::Score { best_scores, .. } = event {
                sink.lock().unwrap().push(best_scores[0]);
            }
        })
        .search();

    let max = 2f64.powi(8) * n_genes as f64;
    let best = sum(outcome.best());
    assert!(best > 0.85 * max, "best {best} of {max}");

    // Elites are never varied, so the best score cannot drop.
    let history = best_per_round.lock().unwrap();
    assert!(history.windows(2).all(|w| w[1] >= w[0]));
}

#[test]
fn test_root_finding() {
    let config = SearchConfig {
        pop_size: 500,
        n_track: 100,
        n_mutations: Some(ParamOption::scheduled(2.0, 1.0, Trend::DecreasesWithRank)),
        time_out_ms: 20_000,
        n_rounds: 400,
        ..seeded(7)
    };
    let outcome = GeneticSearch::<u8>::single(roots::<u8>, 6, &config)
        .unwrap()
        .search();

    // x5 = 0 with x6 > 1 and x1 = 1 (or x2 = 0) is an exact root.
    let best = outcome.score(0, 0);
    assert!(best > -1e-2, "best {best}");
    for rank in 0..outcome.len() {
        assert!(!outcome.score(0, rank).is_nan());
    }
}

#[test]
fn test_multi_objective() {
    let config = SearchConfig {
        pop_size: 60,
        n_rounds: 40,
        weights: Some(vec![1.0, 2.0, 2.0]),
        ..seeded(11)
    };
    let outcome = GeneticSearch::<u8>::new(Builtin::Parity.objectives(), 30, &config)
        .unwrap()
        .search();

    assert_eq!(outcome.stats().best_scores.len(), 3);
    assert_eq!(outcome.scores(0).len(), 3);
    // Random u8 genes are even about half the time.
    assert!(outcome.stats().best_scores[1] > 15.0);
}

#[test]
fn test_genes_stay_within_bounds() {
    let config = SearchConfig {
        pop_size: 30,
        n_rounds: 30,
        rand_val_min: Some(-10.0),
        rand_val_max: Some(10.0),
        ..seeded(5)
    };
    let outcome = GeneticSearch::<i8>::single(|g: &[i8]| -sum(g).abs(), 12, &config)
        .unwrap()
        .search();

    for genome in &outcome {
        assert!(genome.iter().all(|&g| (-10..=10).contains(&g)));
    }
}

#[test]
fn test_custom_sampler_and_selector() {
    /// Only ever proposes multiples of 10.
    struct Tens;

    impl GeneSampler<u16> for Tens {
        fn sample(&mut self, _gene: usize, _bounds: (f64, f64), rng: &mut GeneRng) -> u16 {
            rng.index(100) as u16 * 10
        }
    }

    let config = SearchConfig {
        pop_size: 20,
        n_rounds: 10,
        ..seeded(9)
    };
    let outcome = GeneticSearch::<u16>::single(sum::<u16>, 5, &config)
        .unwrap()
        .with_sampler(Tens)
        .with_selector(TruncationSelector)
        .search();

    for genome in outcome.candidates() {
        assert!(genome.iter().all(|g| g % 10 == 0));
    }
}

#[test]
fn test_random_bounds_wider_than_kind() {
    let config = SearchConfig::from_json(
        r#"{"popSize": 10, "nRounds": 2, "randomSeed": 3,
            "randValMin": -1e308, "randValMax": 1e308}"#,
    )
    .unwrap();
    let outcome = GeneticSearch::<f64>::single(sum::<f64>, 4, &config)
        .unwrap()
        .search();
    assert_eq!(outcome.stop_reason(), StopReason::RoundsExhausted);
    assert!(outcome.candidates().flatten().all(|g| g.is_finite()));

    // Draws stay uniform over the kind instead of piling up at its maximum.
    let config = SearchConfig {
        pop_size: 100,
        n_rounds: 1,
        rand_val_max: Some(100_000.0),
        ..seeded(4)
    };
    let outcome = GeneticSearch::<u8>::single(|_: &[u8]| 0.0, 10, &config)
        .unwrap()
        .search();
    let saturated = outcome.candidates().flatten().filter(|&&g| g == 255).count();
    assert!(saturated < 100, "{saturated} of 1000 genes at 255");
}

#[test]
fn test_custom_terminator() {
    /// Stops after a fixed number of rounds and reports a plateau.
    struct StopAfter(u64);

    impl Terminator for StopAfter {
        fn check(&mut self, status: &RoundStatus<'_>) -> Option<StopReason> {
            (status.round >= self.0).then_some(StopReason::Stuck)
        }
    }

    let config = SearchConfig {
        pop_size: 10,
        ..seeded(17)
    };
    let outcome = GeneticSearch::<u8>::single(sum::<u8>, 4, &config)
        .unwrap()
        .with_terminator(StopAfter(3))
        .search();

    assert_eq!(outcome.stop_reason(), StopReason::Stuck);
    assert_eq!(outcome.stats().rounds, 3);
}

#[test]
fn test_custom_mutator_and_crossover() {
    /// Sets every gene it is asked to touch to 7.
    struct Sevens(Arc<Mutex<usize>>);

    impl Mutator<u8> for Sevens {
        fn mutate(
            &mut self,
            genome: &mut [u8],
            _n_mutations: usize,
            _sampler: &mut dyn GeneSampler<u8>,
            _bounds: (f64, f64),
            _rng: &mut GeneRng,
        ) {
            *self.0.lock().unwrap() += 1;
            genome.fill(7);
        }
    }

    /// Child is the gene-wise maximum of its parents.
    struct Maximum(Arc<Mutex<usize>>);

    impl Crossover<u8> for Maximum {
        fn crossover(&mut self, child: &mut [u8], parents: [&[u8]; 2], _rng: &mut GeneRng) {
            *self.0.lock().unwrap() += 1;
            for (gene, (a, b)) in child.iter_mut().zip(parents[0].iter().zip(parents[1])) {
                *gene = *a.max(b);
            }
        }
    }

    let mutations = Arc::new(Mutex::new(0));
    let crossovers = Arc::new(Mutex::new(0));
    let config = SearchConfig {
        pop_size: 20,
        n_elite: ParamOption::constant(2.0),
        p_mutate: ParamOption::constant(0.5),
        n_rounds: 5,
        ..seeded(23)
    };
    let outcome = GeneticSearch::<u8>::single(|g: &[u8]| -sum(g), 6, &config)
        .unwrap()
        .with_mutator(Sevens(Arc::clone(&mutations)))
        .with_crossover(Maximum(Arc::clone(&crossovers)))
        .search();

    let mutations = *mutations.lock().unwrap();
    let crossovers = *crossovers.lock().unwrap();
    // Every non-elite candidate is varied once per round.
    assert_eq!(mutations + crossovers, 5 * 18);
    assert!(mutations > 0 && crossovers > 0);
    assert!(outcome.candidates().any(|g| g.iter().all(|&x| x == 7)));
}

#[test]
fn test_custom_comparator() {
    /// Ranks the lowest score first, turning maximization into minimization.
    struct Lowest;

    impl Comparator for Lowest {
        fn compare(&self, scores: &ScoreTable, a: usize, b: usize) -> Ordering {
            scores.get(0, a).total_cmp(&scores.get(0, b))
        }
    }

    let config = SearchConfig {
        pop_size: 50,
        n_rounds: 60,
        ..seeded(29)
    };
    let outcome = GeneticSearch::<u8>::single(sum::<u8>, 5, &config)
        .unwrap()
        .with_comparator(Lowest)
        .search();

    let scores: Vec<f64> = (0..outcome.len()).map(|rank| outcome.score(0, rank)).collect();
    assert!(scores.windows(2).all(|w| w[0] <= w[1]));
    assert!(sum(outcome.best()) < 0.25 * 255.0 * 5.0);
}

#[test]
fn test_multimodal_run() {
    let config = SearchConfig {
        pop_size: 40,
        n_rounds: 25,
        multimodal: true,
        ..seeded(13)
    };
    let outcome = GeneticSearch::<f64>::single(|g: &[f64]| -g[0].abs(), 3, &config)
        .unwrap()
        .search();

    assert_eq!(outcome.stop_reason(), StopReason::RoundsExhausted);
    assert_eq!(outcome.candidates().count(), 40);
    assert!(outcome.stats().best_scores[0] <= 0.0);
}

#[test]
fn test_nested_meta_search() {
    // Tune the inner pMutate with an outer search.
    let inner = |genome: &[u8]| {
        let config = SearchConfig {
            pop_size: 10,
            n_rounds: 5,
            p_mutate: ParamOption::constant(genome[0] as f64 / 255.0),
            random_seed: Some(1),
            ..Default::default()
        };
        match GeneticSearch::<u8>::single(sum::<u8>, 8, &config) {
            Ok(mut search) => search.search().stats().best_scores[0],
            Err(_) => f64::NEG_INFINITY,
        }
    };

    let config = SearchConfig {
        pop_size: 6,
        n_elite: ParamOption::constant(2.0),
        n_rounds: 3,
        ..seeded(4)
    };
    let outcome = GeneticSearch::<u8>::single(inner, 1, &config)
        .unwrap()
        .search();

    assert_eq!(outcome.stop_reason(), StopReason::RoundsExhausted);
    assert!(outcome.score(0, 0) > 0.0);
}

#[test]
fn test_constant_options_hold_through_run() {
    let config = SearchConfig {
        pop_size: 25,
        n_elite: ParamOption::constant(4.0),
        p_mutate: ParamOption::constant(0.5),
        n_mutations: Some(ParamOption::constant(2.0)),
        n_rounds: 10,
        ..seeded(21)
    };

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    GeneticSearch::<u8>::single(sum::<u8>, 6, &config)
        .unwrap()
        .on_event(move |event| {
            if let SearchEvent::Op {
                rank, p_mutate, op, ..
            } = *event
            {
                sink.lock().unwrap().push((rank, p_mutate, op));
            }
        })
        .search();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 10 * 21);
    for &(rank, p_mutate, op) in seen.iter() {
        assert!(rank >= 4);
        assert_eq!(p_mutate, 0.5);
        if let Operation::Mutate { genes } = op {
            assert_eq!(genes, 2);
        }
    }
}

#[test]
fn test_validation_errors() {
    let objective = |g: &[u8]| sum(g);
    let err = |config: SearchConfig, n_genes| {
        GeneticSearch::<u8>::single(objective, n_genes, &config).err()
    };

    assert!(matches!(err(seeded(0), 0), Some(ConfigError::NoGenes)));
    assert!(matches!(
        err(SearchConfig { pop_size: 4, ..seeded(0) }, 3),
        Some(ConfigError::PopulationTooSmall(4))
    ));
    assert!(matches!(
        err(
            SearchConfig {
                pop_size: 10,
                n_elite: ParamOption::constant(11.0),
                ..seeded(0)
            },
            3
        ),
        Some(ConfigError::EliteExceedsPopulation { .. })
    ));
    assert!(matches!(
        err(
            SearchConfig {
                p_mutate: ParamOption::scheduled(0.5, 1.5, Trend::Constant),
                ..seeded(0)
            },
            3
        ),
        Some(ConfigError::InvalidProbability { name: "pMutate", .. })
    ));
    assert!(matches!(
        err(
            SearchConfig {
                rand_val_min: Some(-1.0),
                ..seeded(0)
            },
            3
        ),
        Some(ConfigError::NegativeUnsignedBound(_))
    ));
    assert!(matches!(
        GeneticSearch::<u8>::new(Vec::new(), 3, &seeded(0)).err(),
        Some(ConfigError::NoObjectives)
    ));
}

#[test]
fn test_engine_is_send() {
    fn assert_send<T: Send>() {}
    assert_send::<GeneticSearch<u8>>();
    assert_send::<GeneticSearch<f64>>();
}
