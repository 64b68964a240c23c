use criterion::{black_box, criterion_group, criterion_main, Criterion};
use feature_engine::{EncodingTables, Feature, FeatureVector, PatientProfile};
use inference_engine::{DecisionTree, ForestClassifier, TreeNode};
use rulenet::RuleNet;
use std::sync::Arc;

fn forest() -> ForestClassifier {
    let trees = (0..32)
        .map(|i| {
            DecisionTree::new(vec![
                TreeNode::Split {
                    feature: Feature::Bmi.index(),
                    threshold: 20.0 + (i % 10) as f64,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf {
                    distribution: [0.8, 0.2],
                },
                TreeNode::Split {
                    feature: Feature::Stroke.index(),
                    threshold: 0.5,
                    left: 3,
                    right: 4,
                },
                TreeNode::Leaf {
                    distribution: [0.6, 0.4],
                },
                TreeNode::Leaf {
                    distribution: [0.3, 0.7],
                },
            ])
            .expect("valid tree")
        })
        .collect();
    ForestClassifier::new("bench", trees).expect("valid forest")
}

fn patients(n: usize) -> Vec<FeatureVector> {
    let tables = EncodingTables::default();
    (0..n)
        .map(|i| {
            let profile = PatientProfile {
                bmi: 18.0 + (i % 25) as f64,
                smoking: i % 3 == 0,
                physical_health_days: (i % 31) as f64,
                mental_health_days: (i % 4) as f64,
                stroke: i % 7 == 0,
                sleep_hours: 5.0 + (i % 5) as f64,
                ..Default::default()
            };
            tables.encode(&profile).expect("encodable profile")
        })
        .collect()
}

fn bench_classify(c: &mut Criterion) {
    let engine = RuleNet::new(Arc::new(forest()));
    let batch = patients(256);

    c.bench_function("classify_single", |b| {
        b.iter(|| engine.classify(black_box(&batch[1])))
    });

    c.bench_function("classify_batch_256", |b| {
        b.iter(|| engine.classify_batch(black_box(&batch)))
    });
}

criterion_group!(benches, bench_classify);
criterion_main!(benches);
