use std::{
    fs::File,
    io::{self, Read, Write},
    path::Path,
};

use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    encoder::{Encoders, LabelEncoder},
    error::{BayesError, Result},
    record::{Evidence, Label, Record, RecordStore, StudentId},
};

/// Column layout of one input row, read by position.
#[derive(Debug, Deserialize)]
struct RawRow {
    student_id: StudentId,
    label: String,
    year: i64,
    semester: String,
    term: String,
    deadline: String,
    days_to_deadline: i64,
    balance: f64,
    fafsa: i64,
    verification: i64,
    academic_level: String,
    international: i64,
    waiver: i64,
    total_cc: i64,
    total_check_cash: i64,
    flywire: i64,
    sponsored: i64,
    returned_checks: i64,
}

/// Everything one load produces: the records and the vocabularies used to encode them.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: RecordStore,
    pub encoders: Encoders,
}

pub fn load<P: AsRef<Path>>(path: P, progress: bool) -> Result<Dataset> {
    let path = path.as_ref();
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(BayesError::UnsupportedFormat {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path)?;
    let dataset = load_from_reader(file, progress)?;
    info!(
        path = %path.display(),
        records = dataset.records.len(),
        "loaded record store"
    );

    Ok(dataset)
}

/// Reads a header row followed by data rows. Encoders are fitted over every row
/// before any row is encoded.
///
/// Cells are taken as written: a padded label is not a dropout, and padded
/// category strings are classes of their own.
pub fn load_from_reader<R: Read>(reader: R, progress: bool) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::None)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in reader.records() {
        let row: RawRow = record?.deserialize(None)?;
        rows.push(row);
    }

    let encoders = Encoders {
        semester: LabelEncoder::fit("semester", rows.iter().map(|row| &row.semester)),
        term: LabelEncoder::fit("term", rows.iter().map(|row| &row.term)),
        deadline: LabelEncoder::fit("deadline", rows.iter().map(|row| &row.deadline)),
        academic_level: LabelEncoder::fit(
            "academic_level",
            rows.iter().map(|row| &row.academic_level),
        ),
    };
    for encoder in encoders.iter() {
        debug!(
            column = encoder.column(),
            classes = encoder.len(),
            "fitted encoder"
        );
    }

    let mut records = RecordStore::new();
    let mut stdout = io::stdout();
    for (i, row) in rows.into_iter().enumerate() {
        if progress {
            print!("Loading row {}...\r", i + 1);
            let _ = stdout.flush();
        }

        let evidence = Evidence {
            year: row.year,
            semester: encoders.semester.encode(&row.semester)?,
            term: encoders.term.encode(&row.term)?,
            deadline: encoders.deadline.encode(&row.deadline)?,
            days_to_deadline: row.days_to_deadline,
            balance: row.balance,
            fafsa: row.fafsa,
            verification: row.verification,
            academic_level: encoders.academic_level.encode(&row.academic_level)?,
            international: row.international,
            waiver: row.waiver,
            total_cc: row.total_cc,
            total_check_cash: row.total_check_cash,
            flywire: row.flywire,
            sponsored: row.sponsored,
            returned_checks: row.returned_checks,
        };
        let record = Record {
            evidence,
            label: Label::from_cell(&row.label),
        };

        if records.insert(row.student_id, record).is_some() {
            debug!(student_id = row.student_id, "duplicate student id replaced");
        }
    }
    if progress {
        println!();
    }

    Ok(Dataset { records, encoders })
}
