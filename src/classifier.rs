use crate::{
    error::{BayesError, Result},
    estimate,
    record::{Evidence, Feature, Label, RecordStore, StudentId},
};

/// Normalized class probabilities for one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Posterior {
    pub dropped: f64,
    pub not_dropped: f64,
}

impl Posterior {
    /// Ties go to not dropped.
    pub fn decision(&self) -> Label {
        if self.dropped > self.not_dropped {
            Label::Dropped
        } else {
            Label::NotDropped
        }
    }
}

/// Prior and per-feature likelihoods estimated once over a record set.
///
/// Predictions made through a fitted model are identical to recomputing every
/// estimate from the same store on each call.
#[derive(Debug, Clone)]
pub struct NaiveBayes {
    prior: f64,
    likelihoods: [f64; Feature::COUNT],
}

impl NaiveBayes {
    pub fn fit(records: &RecordStore) -> Result<Self> {
        let prior = estimate::prior(records)?;

        let mut likelihoods = [0.0; Feature::COUNT];
        for (slot, &feature) in likelihoods.iter_mut().zip(Feature::ALL.iter()) {
            *slot = estimate::likelihood(records, feature)?;
        }

        Ok(NaiveBayes { prior, likelihoods })
    }

    pub fn prior(&self) -> f64 {
        self.prior
    }

    pub fn likelihood(&self, feature: Feature) -> f64 {
        Feature::ALL
            .iter()
            .position(|&f| f == feature)
            .map_or(0.0, |i| self.likelihoods[i])
    }

    /// Folds every feature of `evidence` into the prior, assuming independence,
    /// then normalizes.
    pub fn posterior(&self, evidence: &Evidence) -> Result<Posterior> {
        let mut dropped = self.prior;
        let mut not_dropped = 1.0 - self.prior;

        for (&feature, &likelihood) in Feature::ALL.iter().zip(self.likelihoods.iter()) {
            let likelihood_dropped = if evidence.is_present(feature) {
                likelihood
            } else {
                1.0 - likelihood
            };
            let likelihood_not_dropped = 1.0 - likelihood_dropped;

            dropped *= likelihood_dropped;
            not_dropped *= likelihood_not_dropped;
        }

        let total = dropped + not_dropped;
        if total == 0.0 {
            return Err(BayesError::DivisionByZero("posterior normalization"));
        }

        Ok(Posterior {
            dropped: dropped / total,
            not_dropped: not_dropped / total,
        })
    }

    pub fn predict(&self, evidence: &Evidence) -> Result<Label> {
        Ok(self.posterior(evidence)?.decision())
    }
}

/// Posterior for the record stored under `id`, estimated over all of `records`.
pub fn posterior(records: &RecordStore, id: StudentId) -> Result<Posterior> {
    let record = records.get(id).ok_or(BayesError::KeyNotFound(id))?;
    NaiveBayes::fit(records)?.posterior(&record.evidence)
}

pub fn predict(records: &RecordStore, id: StudentId) -> Result<Label> {
    Ok(posterior(records, id)?.decision())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::fixtures::{evidence_with, store};

    fn majority_dropped() -> RecordStore {
        store(vec![
            (Label::Dropped, evidence_with(1)),
            (Label::Dropped, evidence_with(1)),
            (Label::Dropped, evidence_with(1)),
            (Label::NotDropped, evidence_with(0)),
        ])
    }

    #[test]
    fn test_majority_modal_record_gets_majority_label() {
        let records = majority_dropped();
        assert_eq!(predict(&records, 0).unwrap(), Label::Dropped);

        let records = store(vec![
            (Label::NotDropped, evidence_with(1)),
            (Label::NotDropped, evidence_with(1)),
            (Label::NotDropped, evidence_with(1)),
            (Label::Dropped, evidence_with(0)),
        ]);
        assert_eq!(predict(&records, 1).unwrap(), Label::NotDropped);
    }

    #[test]
    fn test_predict_is_deterministic() {
        let records = majority_dropped();

        let first = posterior(&records, 3).unwrap();
        for _ in 0..10 {
            assert_eq!(posterior(&records, 3).unwrap(), first);
        }
    }

    #[test]
    fn test_posterior_is_normalized() {
        let records = majority_dropped();

        for id in records.keys() {
            let p = posterior(&records, id).unwrap();
            assert!((p.dropped + p.not_dropped - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_fitted_model_matches_direct_prediction() {
        let mut mixed = evidence_with(0);
        mixed.fafsa = 1;
        mixed.balance = 1.0;
        let records = store(vec![
            (Label::Dropped, evidence_with(1)),
            (Label::NotDropped, mixed.clone()),
            (Label::NotDropped, evidence_with(0)),
            (Label::Dropped, mixed),
        ]);
        let model = NaiveBayes::fit(&records).unwrap();

        for id in records.keys() {
            let direct = posterior(&records, id).unwrap();
            let cached = model.posterior(&records.get(id).unwrap().evidence).unwrap();
            assert_eq!(direct.dropped.to_bits(), cached.dropped.to_bits());
            assert_eq!(direct.not_dropped.to_bits(), cached.not_dropped.to_bits());
        }
        assert_eq!(
            model.likelihood(Feature::Fafsa),
            estimate::likelihood(&records, Feature::Fafsa).unwrap()
        );
    }

    #[test]
    fn test_tie_resolves_to_not_dropped() {
        let tie = Posterior {
            dropped: 0.5,
            not_dropped: 0.5,
        };
        assert_eq!(tie.decision(), Label::NotDropped);
    }

    #[test]
    fn test_missing_key() {
        let records = majority_dropped();
        assert!(matches!(
            predict(&records, 42),
            Err(BayesError::KeyNotFound(42))
        ));
    }
}
