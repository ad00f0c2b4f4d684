//! Probability estimates over a record set.
//!
//! Each function counts over whatever store it is handed; nothing is cached
//! here. Features are tested with [`Evidence::is_present`](crate::record::Evidence::is_present),
//! so every column is read as a 0/1 flag.

use crate::{
    error::{BayesError, Result},
    record::{Feature, Label, RecordStore},
};

/// Additive smoothing applied by [`likelihood`].
pub const SMOOTHING: f64 = 1.0;

/// Fraction of records labelled as dropped.
pub fn prior(records: &RecordStore) -> Result<f64> {
    if records.is_empty() {
        return Err(BayesError::EmptyDataset);
    }

    let dropped = records
        .records()
        .filter(|record| record.label == Label::Dropped)
        .count();

    Ok(dropped as f64 / records.len() as f64)
}

/// Smoothed probability of dropping given that `feature` is present.
///
/// This is a complete single-feature Bayes update rather than a class-conditional
/// likelihood:
///
/// ```text
/// p_dropped     = (d + s) / (n + 2s)
/// p_f_dropped   = (fd + s) / (d + 2s)
/// p_f_retained  = (fn + s) / (n - d + 2s)
/// p_f           = p_f_dropped * p_dropped + p_f_retained * (1 - p_dropped)
/// likelihood    = p_f_dropped * p_dropped / p_f
/// ```
///
/// where `n` is the record count, `d` the dropped count, and `fd`/`fn` the
/// dropped/retained records with the feature present.
pub fn likelihood(records: &RecordStore, feature: Feature) -> Result<f64> {
    let (num_students, num_dropped, num_feature_dropped, num_feature_not_dropped) = records
        .records()
        .fold((0u64, 0u64, 0u64, 0u64), |(n, d, fd, fnd), record| {
            let present = record.evidence.is_present(feature) as u64;
            match record.label {
                Label::Dropped => (n + 1, d + 1, fd + present, fnd),
                Label::NotDropped => (n + 1, d, fd, fnd + present),
            }
        });

    let n = num_students as f64;
    let d = num_dropped as f64;

    let p_dropped = (d + SMOOTHING) / (n + 2.0 * SMOOTHING);
    let p_not_dropped = 1.0 - p_dropped;
    let p_feature_given_dropped = (num_feature_dropped as f64 + SMOOTHING) / (d + 2.0 * SMOOTHING);
    let p_feature_given_not_dropped =
        (num_feature_not_dropped as f64 + SMOOTHING) / (n - d + 2.0 * SMOOTHING);

    let p_feature =
        p_feature_given_dropped * p_dropped + p_feature_given_not_dropped * p_not_dropped;
    if p_feature == 0.0 {
        return Err(BayesError::DivisionByZero("feature probability"));
    }

    Ok(p_feature_given_dropped * p_dropped / p_feature)
}

/// Fraction of records with `feature` present, regardless of label.
pub fn marginal(records: &RecordStore, feature: Feature) -> Result<f64> {
    if records.is_empty() {
        return Err(BayesError::EmptyDataset);
    }

    let present = records
        .records()
        .filter(|record| record.evidence.is_present(feature))
        .count();

    Ok(present as f64 / records.len() as f64)
}

pub fn bayes_theorem(prior: f64, likelihood: f64, evidence: f64) -> Result<f64> {
    if evidence == 0.0 {
        return Err(BayesError::DivisionByZero("evidence"));
    }
    Ok(likelihood * prior / evidence)
}
