use std::{io, path::PathBuf};

use thiserror::Error;

use crate::record::StudentId;

/// Errors raised while loading records, estimating probabilities or evaluating.
#[derive(Debug, Error)]
pub enum BayesError {
    #[error("unsupported input format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("value '{value}' was not seen when fitting the '{column}' encoder")]
    UnknownCategory { column: &'static str, value: String },

    #[error("cannot estimate probabilities over an empty record set")]
    EmptyDataset,

    #[error("division by zero while computing {0}")]
    DivisionByZero(&'static str),

    #[error("no record for student {0}")]
    KeyNotFound(StudentId),

    #[error("{subset} subset references student {key}, which is not in the record store")]
    PartitionIntegrity { subset: &'static str, key: StudentId },

    #[error("test fraction must lie strictly between 0 and 1, got {0}")]
    InvalidSplit(f64),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, BayesError>;
