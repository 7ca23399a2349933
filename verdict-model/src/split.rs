use crate::dataset::Dataset;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::model_selection::{BaseKFold, KFold};
use std::collections::BTreeMap;
use tracing::{debug, warn};
use verdict_core::ConfigError;

/// Shuffles with `seed` and holds out `ceil(test_size * n)` examples.
///
/// Returns `(train, test)`.
pub fn train_test_split(
    dataset: &Dataset,
    test_size: f64,
    seed: u64,
) -> Result<(Dataset, Dataset), ConfigError> {
    let n = dataset.len();
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(ConfigError::InvalidValue {
            field: "trainer.test_size".to_string(),
            value: test_size.to_string(),
        });
    }

    let n_test = (test_size * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(ConfigError::ValidationFailed {
            reason: format!(
                "test_size {} leaves no training or test examples out of {}",
                test_size, n
            ),
        });
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let pick = |idx: &[usize]| Dataset {
        bodies: idx.iter().map(|&i| dataset.bodies[i].clone()).collect(),
        verdicts: idx.iter().map(|&i| dataset.verdicts[i].clone()).collect(),
    };
    let (test_idx, train_idx) = indices.split_at(n_test);

    debug!("Split {} examples into {} train / {} test", n, train_idx.len(), n_test);
    Ok((pick(train_idx), pick(test_idx)))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Stratified k-fold: samples of each class are dealt to the folds in turn,
/// continuing where the previous class stopped, so every fold keeps roughly
/// the overall class proportions.
///
/// The folds themselves come from an unshuffled smartcore `KFold`, which
/// cuts contiguous blocks; samples are ordered by their dealt fold first,
/// so each block is exactly one dealt fold.
pub fn stratified_k_fold(labels: &[String], k: usize) -> Result<Vec<Fold>, ConfigError> {
    if k < 2 {
        return Err(ConfigError::InvalidValue {
            field: "trainer.folds".to_string(),
            value: k.to_string(),
        });
    }
    if labels.len() < k {
        return Err(ConfigError::InsufficientSamples {
            samples: labels.len(),
            folds: k,
        });
    }

    let mut by_class: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (index, label) in labels.iter().enumerate() {
        by_class.entry(label.as_str()).or_default().push(index);
    }

    if let Some((class, members)) = by_class.iter().min_by_key(|(_, m)| m.len()) {
        if members.len() < k {
            warn!(
                "Least populated class '{}' has {} members, fewer than {} folds",
                class,
                members.len(),
                k
            );
        }
    }

    let mut assignment = vec![0usize; labels.len()];
    let mut position = 0usize;
    for members in by_class.values() {
        for &index in members {
            assignment[index] = position % k;
            position += 1;
        }
    }

    let mut order: Vec<usize> = (0..labels.len()).collect();
    order.sort_by_key(|&index| (assignment[index], index));

    let placeholder = DenseMatrix::from_2d_vec(&vec![vec![0.0_f64]; labels.len()]);
    let folds = KFold::default()
        .with_n_splits(k)
        .with_shuffle(false)
        .split(&placeholder)
        .map(|(train, test)| {
            let resolve = |positions: Vec<usize>| {
                let mut indices: Vec<usize> = positions.into_iter().map(|p| order[p]).collect();
                indices.sort_unstable();
                indices
            };
            Fold {
                train: resolve(train),
                test: resolve(test),
            }
        })
        .collect();
    Ok(folds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn dataset(n: usize) -> Dataset {
        Dataset {
            bodies: (0..n).map(|i| format!("body {}", i)).collect(),
            verdicts: (0..n).map(|i| if i % 2 == 0 { "NTA" } else { "YTA" }.to_string()).collect(),
        }
    }

    #[test]
    fn test_split_sizes() {
        let (train, test) = train_test_split(&dataset(100), 0.2, 42).unwrap();
        assert_eq!(train.len(), 80);
        assert_eq!(test.len(), 20);

        let (train, test) = train_test_split(&dataset(11), 0.2, 42).unwrap();
        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 8);
    }

    #[test]
    fn test_split_is_seeded_and_keeps_pairs() {
        let data = dataset(30);
        let (a_train, a_test) = train_test_split(&data, 0.2, 7).unwrap();
        let (b_train, b_test) = train_test_split(&data, 0.2, 7).unwrap();
        assert_eq!(a_train, b_train);
        assert_eq!(a_test, b_test);

        for (body, verdict) in a_test.bodies.iter().zip(&a_test.verdicts) {
            let i: usize = body.trim_start_matches("body ").parse().unwrap();
            assert_eq!(verdict, &data.verdicts[i]);
        }
    }

    #[test]
    fn test_split_rejects_degenerate_sizes() {
        assert!(train_test_split(&dataset(10), 0.0, 1).is_err());
        assert!(train_test_split(&dataset(1), 0.2, 1).is_err());
    }

    #[test]
    fn test_folds_partition_samples() {
        let y = labels(&["a", "a", "a", "a", "b", "b", "b", "b", "b", "b"]);
        let folds = stratified_k_fold(&y, 5).unwrap();
        assert_eq!(folds.len(), 5);

        let mut seen: Vec<usize> = folds.iter().flat_map(|f| f.test.clone()).collect();
        seen.sort();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());

        for fold in &folds {
            assert_eq!(fold.test.len(), 2);
            assert_eq!(fold.train.len() + fold.test.len(), 10);
            assert!(fold.train.iter().all(|i| !fold.test.contains(i)));
        }
    }

    #[test]
    fn test_folds_are_stratified() {
        let y: Vec<String> = (0..50)
            .map(|i| if i < 25 { "NTA" } else { "YTA" }.to_string())
            .collect();
        for fold in stratified_k_fold(&y, 5).unwrap() {
            let nta = fold.test.iter().filter(|&&i| y[i] == "NTA").count();
            assert_eq!(nta, 5);
            assert_eq!(fold.test.len(), 10);
        }
    }

    #[test]
    fn test_uneven_folds_take_the_extra_sample_first() {
        let y = labels(&["a", "b", "a", "b", "a", "b", "a"]);
        let folds = stratified_k_fold(&y, 3).unwrap();
        let sizes: Vec<usize> = folds.iter().map(|f| f.test.len()).collect();
        assert_eq!(sizes, vec![3, 2, 2]);

        // a-members 0,2,4,6 then b-members 1,3,5 dealt round-robin
        assert_eq!(folds[0].test, vec![0, 5, 6]);
        assert_eq!(folds[1].test, vec![1, 2]);
        assert_eq!(folds[2].test, vec![3, 4]);
        assert_eq!(folds[0].train, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_fold_errors() {
        let y = labels(&["a", "b", "a"]);
        assert!(matches!(
            stratified_k_fold(&y, 5),
            Err(ConfigError::InsufficientSamples {
                samples: 3,
                folds: 5
            })
        ));
        assert!(matches!(
            stratified_k_fold(&y, 1),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
