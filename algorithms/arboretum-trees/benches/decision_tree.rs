use arboretum::prelude::*;
use arboretum_trees::{DecisionTree, RandomForest, SplitCriterion};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Categorical blobs: every class prefers one value per attribute, with some noise
fn generate_blobs(n_classes: usize, n_features: usize, samples: usize, rng: &mut SmallRng) -> Dataset<u8> {
    let rows = (0..n_classes)
        .flat_map(|class| std::iter::repeat(class).take(samples))
        .map(|class| {
            let mut row = (0..n_features)
                .map(|_| {
                    if rng.gen_bool(0.7) {
                        class as u8
                    } else {
                        rng.gen_range(0..n_classes as u8)
                    }
                })
                .collect::<Vec<_>>();
            row.push(class as u8);
            row
        })
        .collect();

    Dataset::from_rows(rows, n_features).unwrap()
}

fn decision_tree_bench(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(42);

    // Controls how many samples for each class are generated
    let training_set_sizes = &[100, 1000, 10000];

    let n_classes = 4;
    let n_features = 6;

    let hyperparams = DecisionTree::params().split_criterion(SplitCriterion::Entropy);

    let mut group = c.benchmark_group("decision_tree");
    group.sample_size(10);

    for n in training_set_sizes.iter() {
        let dataset = generate_blobs(n_classes, n_features, *n, &mut rng);

        group.bench_with_input(BenchmarkId::from_parameter(n), &dataset, |b, d| {
            b.iter(|| hyperparams.fit(d))
        });
    }

    group.finish();
}

fn random_forest_bench(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(42);
    let dataset = generate_blobs(4, 6, 1000, &mut rng);

    let mut group = c.benchmark_group("random_forest");
    group.sample_size(10);

    for num_bags in [5, 20].iter() {
        let hyperparams = RandomForest::params().num_bags(*num_bags).min_feature_size(3);

        group.bench_with_input(BenchmarkId::from_parameter(num_bags), &dataset, |b, d| {
            b.iter(|| hyperparams.fit(d))
        });
    }

    group.finish();
}

criterion_group!(benches, decision_tree_bench, random_forest_bench);
criterion_main!(benches);
