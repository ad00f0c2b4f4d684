use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::{
    error::{BayesError, Result},
    record::{RecordStore, StudentId},
};

/// Disjoint train/test partition of record keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<StudentId>,
    pub test: Vec<StudentId>,
}

/// Shuffles `keys` with a seeded RNG and takes the first `ceil(n * test_fraction)`
/// as the test subset. Keys are sorted first, so the split only depends on the
/// key set and the seed.
pub fn train_test_split<I>(keys: I, test_fraction: f64, seed: u64) -> Result<Split>
where
    I: IntoIterator<Item = StudentId>,
{
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(BayesError::InvalidSplit(test_fraction));
    }

    let mut keys: Vec<StudentId> = keys.into_iter().collect();
    keys.sort_unstable();
    keys.dedup();

    let mut rng = StdRng::seed_from_u64(seed);
    keys.shuffle(&mut rng);

    let n_test = ((keys.len() as f64) * test_fraction).ceil() as usize;
    let train = keys.split_off(n_test.min(keys.len()));

    Ok(Split { train, test: keys })
}

/// Fails on the first key of either subset that has no record.
pub fn verify(split: &Split, records: &RecordStore) -> Result<()> {
    for (subset, keys) in [("train", &split.train), ("test", &split.test)] {
        if let Some(&key) = keys.iter().find(|&&key| !records.contains(key)) {
            return Err(BayesError::PartitionIntegrity { subset, key });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{
        fixtures::{evidence_with, record},
        Label,
    };
    use std::collections::HashSet;

    #[test]
    fn test_thirty_percent_of_thousand() {
        let split = train_test_split(0..1000, 0.3, 42).unwrap();

        assert_eq!(split.test.len(), 300);
        assert_eq!(split.train.len(), 700);

        let train: HashSet<_> = split.train.iter().copied().collect();
        let test: HashSet<_> = split.test.iter().copied().collect();
        assert!(train.is_disjoint(&test));

        let all: HashSet<_> = train.union(&test).copied().collect();
        assert_eq!(all, (0..1000).collect::<HashSet<_>>());
    }

    #[test]
    fn test_partition_law_across_fractions() {
        for fraction in [0.01, 0.25, 0.5, 0.75, 0.99] {
            let split = train_test_split(0..137, fraction, 7).unwrap();
            let train: HashSet<_> = split.train.iter().copied().collect();
            let test: HashSet<_> = split.test.iter().copied().collect();

            assert!(train.is_disjoint(&test), "fraction {fraction}");
            assert_eq!(train.len() + test.len(), 137, "fraction {fraction}");
        }
    }

    #[test]
    fn test_seeded_split_is_reproducible() {
        let a = train_test_split(0..50, 0.3, 42).unwrap();
        let b = train_test_split((0..50).rev(), 0.3, 42).unwrap();
        assert_eq!(a, b);

        let c = train_test_split(0..50, 0.3, 43).unwrap();
        assert_ne!(a.test, c.test);
    }

    #[test]
    fn test_invalid_fraction() {
        for fraction in [0.0, 1.0, -0.2, 1.5, f64::NAN] {
            assert!(matches!(
                train_test_split(0..10, fraction, 42),
                Err(BayesError::InvalidSplit(_))
            ));
        }
    }

    #[test]
    fn test_verify_reports_missing_key() {
        let records: RecordStore = (0..4)
            .map(|id| (id, record(Label::NotDropped, evidence_with(0))))
            .collect();

        let good = Split {
            train: vec![0, 1],
            test: vec![2, 3],
        };
        assert!(verify(&good, &records).is_ok());

        let bad = Split {
            train: vec![0, 1],
            test: vec![2, 9],
        };
        assert!(matches!(
            verify(&bad, &records),
            Err(BayesError::PartitionIntegrity {
                subset: "test",
                key: 9
            })
        ));
    }
}
