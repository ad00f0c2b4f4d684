use std::{
    io::{self, Write},
    time::{Duration, Instant},
};

use tracing::{debug, info, warn};

use crate::{
    classifier::NaiveBayes,
    error::{BayesError, Result},
    record::{Label, RecordStore, StudentId},
    split::{self, train_test_split},
};

pub const DEFAULT_TEST_FRACTION: f64 = 0.3;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_PREDICTION_CAP: usize = 100;

#[derive(Debug, Clone)]
pub struct EvaluationConfig {
    pub test_fraction: f64,
    pub seed: u64,
    /// Scoring stops after this many successful predictions.
    pub prediction_cap: usize,
    /// Print an in-place `Predicted count` line while scoring.
    pub progress: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        EvaluationConfig {
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: DEFAULT_SEED,
            prediction_cap: DEFAULT_PREDICTION_CAP,
            progress: false,
        }
    }
}

/// Counts of predicted against actual labels, dropped being the positive class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub true_positive: usize,
    pub true_negative: usize,
    pub false_positive: usize,
    pub false_negative: usize,
}

impl ConfusionMatrix {
    pub fn record(&mut self, actual: Label, predicted: Label) {
        match (actual, predicted) {
            (Label::Dropped, Label::Dropped) => self.true_positive += 1,
            (Label::NotDropped, Label::NotDropped) => self.true_negative += 1,
            (Label::NotDropped, Label::Dropped) => self.false_positive += 1,
            (Label::Dropped, Label::NotDropped) => self.false_negative += 1,
        }
    }

    /// True positive rate. `None` when no scored record was a dropout.
    pub fn sensitivity(&self) -> Option<f64> {
        let positives = self.true_positive + self.false_negative;
        (positives > 0).then(|| self.true_positive as f64 / positives as f64)
    }

    /// True negative rate. `None` when every scored record was a dropout.
    pub fn specificity(&self) -> Option<f64> {
        let negatives = self.true_negative + self.false_positive;
        (negatives > 0).then(|| self.true_negative as f64 / negatives as f64)
    }
}

#[derive(Debug, Clone, Default)]
pub struct EvaluationReport {
    /// Size of the test subset, whether or not every key was scored.
    pub total: usize,
    pub predicted: usize,
    pub correct: usize,
    /// Test keys with no record behind them.
    pub errors: usize,
    pub confusion: ConfusionMatrix,
    pub elapsed: Duration,
}

impl EvaluationReport {
    /// `correct / total`. The denominator is the full test subset, even when the
    /// prediction cap stopped scoring early.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f64 / self.total as f64
    }
}

/// Splits the store, checks the split, and scores the test keys.
///
/// Predictions are made against the full record set. The training subset is
/// built and logged but plays no part in the estimates.
pub fn evaluate(records: &RecordStore, config: &EvaluationConfig) -> Result<EvaluationReport> {
    let start = Instant::now();

    let split = train_test_split(records.keys(), config.test_fraction, config.seed)?;
    split::verify(&split, records)?;

    let trained = records.subset(&split.train);
    info!(
        train = trained.len(),
        test = split.test.len(),
        seed = config.seed,
        "partitioned record store"
    );

    let mut report = score(records, &split.test, config)?;
    report.elapsed = start.elapsed();

    Ok(report)
}

/// Predicts each of `test_keys` against `records` and tallies the results.
///
/// A key with no record counts as an error and scoring moves on; any other
/// failure aborts.
pub fn score(
    records: &RecordStore,
    test_keys: &[StudentId],
    config: &EvaluationConfig,
) -> Result<EvaluationReport> {
    let start = Instant::now();
    // Fitted on the first key that resolves, so missing keys are reported
    // before any estimate runs.
    let mut model: Option<NaiveBayes> = None;

    let mut report = EvaluationReport {
        total: test_keys.len(),
        ..Default::default()
    };
    let mut stdout = io::stdout();

    for &key in test_keys {
        if report.predicted >= config.prediction_cap {
            debug!(cap = config.prediction_cap, "prediction cap reached");
            break;
        }

        let outcome = match records.get(key) {
            Some(record) => {
                let fitted = match model {
                    Some(ref fitted) => fitted,
                    None => &*model.insert(NaiveBayes::fit(records)?),
                };
                fitted
                    .predict(&record.evidence)
                    .map(|predicted| (record.label, predicted))
            }
            None => Err(BayesError::KeyNotFound(key)),
        };

        match outcome {
            Ok((actual, predicted)) => {
                report.predicted += 1;
                if actual == predicted {
                    report.correct += 1;
                }
                report.confusion.record(actual, predicted);
                debug!(student_id = key, %actual, %predicted, "scored record");

                if config.progress {
                    print!("Predicted count: {}/{}\r", report.predicted, report.total);
                    let _ = stdout.flush();
                }
            }
            Err(BayesError::KeyNotFound(key)) => {
                warn!(student_id = key, "no record for test key");
                report.errors += 1;
            }
            Err(err) => return Err(err),
        }
    }
    if config.progress && report.predicted > 0 {
        println!();
    }

    report.elapsed = start.elapsed();
    Ok(report)
}
