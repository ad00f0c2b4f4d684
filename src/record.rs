use std::{
    collections::{hash_map::Entry, HashMap},
    fmt,
};

/// Raw student identifier taken from the first column. Not guaranteed unique.
pub type StudentId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    NotDropped,
    Dropped,
}

impl Label {
    /// Label cells other than exactly `"1"` count as not dropped.
    pub fn from_cell(cell: &str) -> Self {
        if cell == "1" {
            Label::Dropped
        } else {
            Label::NotDropped
        }
    }

    pub fn as_int(self) -> u8 {
        match self {
            Label::NotDropped => 0,
            Label::Dropped => 1,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_int())
    }
}

/// One of the sixteen evidence fields of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Year,
    Semester,
    Term,
    Deadline,
    DaysToDeadline,
    Balance,
    Fafsa,
    Verification,
    AcademicLevel,
    International,
    Waiver,
    TotalCc,
    TotalCheckCash,
    Flywire,
    Sponsored,
    ReturnedChecks,
}

impl Feature {
    pub const COUNT: usize = 16;

    /// Every feature, in input column order. Posterior products run in this order.
    pub const ALL: [Feature; Feature::COUNT] = [
        Feature::Year,
        Feature::Semester,
        Feature::Term,
        Feature::Deadline,
        Feature::DaysToDeadline,
        Feature::Balance,
        Feature::Fafsa,
        Feature::Verification,
        Feature::AcademicLevel,
        Feature::International,
        Feature::Waiver,
        Feature::TotalCc,
        Feature::TotalCheckCash,
        Feature::Flywire,
        Feature::Sponsored,
        Feature::ReturnedChecks,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Feature::Year => "year",
            Feature::Semester => "semester",
            Feature::Term => "term",
            Feature::Deadline => "deadline",
            Feature::DaysToDeadline => "days_to_deadline",
            Feature::Balance => "balance",
            Feature::Fafsa => "fafsa",
            Feature::Verification => "verification",
            Feature::AcademicLevel => "academic_level",
            Feature::International => "international",
            Feature::Waiver => "waiver",
            Feature::TotalCc => "total_cc",
            Feature::TotalCheckCash => "total_check_cash",
            Feature::Flywire => "flywire",
            Feature::Sponsored => "sponsored",
            Feature::ReturnedChecks => "returned_checks",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Feature values of one record. Categorical columns hold encoder codes.
#[derive(Debug, Clone, PartialEq)]
pub struct Evidence {
    pub year: i64,
    pub semester: u32,
    pub term: u32,
    pub deadline: u32,
    pub days_to_deadline: i64,
    pub balance: f64,
    pub fafsa: i64,
    pub verification: i64,
    pub academic_level: u32,
    pub international: i64,
    pub waiver: i64,
    pub total_cc: i64,
    pub total_check_cash: i64,
    pub flywire: i64,
    pub sponsored: i64,
    pub returned_checks: i64,
}

impl Evidence {
    pub fn value(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Year => self.year as f64,
            Feature::Semester => self.semester as f64,
            Feature::Term => self.term as f64,
            Feature::Deadline => self.deadline as f64,
            Feature::DaysToDeadline => self.days_to_deadline as f64,
            Feature::Balance => self.balance,
            Feature::Fafsa => self.fafsa as f64,
            Feature::Verification => self.verification as f64,
            Feature::AcademicLevel => self.academic_level as f64,
            Feature::International => self.international as f64,
            Feature::Waiver => self.waiver as f64,
            Feature::TotalCc => self.total_cc as f64,
            Feature::TotalCheckCash => self.total_check_cash as f64,
            Feature::Flywire => self.flywire as f64,
            Feature::Sponsored => self.sponsored as f64,
            Feature::ReturnedChecks => self.returned_checks as f64,
        }
    }

    /// Every feature is treated as a flag: present means the value is exactly 1,
    /// whatever the column's actual type.
    pub fn is_present(&self, feature: Feature) -> bool {
        self.value(feature) == 1.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub evidence: Evidence,
    pub label: Label,
}

/// Records keyed by student id. A later insert for the same id replaces the
/// earlier record.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: HashMap<StudentId, Record>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record this one replaced, if the id was already present.
    pub fn insert(&mut self, id: StudentId, record: Record) -> Option<Record> {
        match self.records.entry(id) {
            Entry::Occupied(mut entry) => Some(entry.insert(record)),
            Entry::Vacant(entry) => {
                entry.insert(record);
                None
            }
        }
    }

    pub fn get(&self, id: StudentId) -> Option<&Record> {
        self.records.get(&id)
    }

    pub fn contains(&self, id: StudentId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = StudentId> + '_ {
        self.records.keys().copied()
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// Copies the records for `ids` into a new store. Ids with no record are skipped.
    pub fn subset(&self, ids: &[StudentId]) -> RecordStore {
        ids.iter()
            .filter_map(|&id| self.records.get(&id).map(|record| (id, record.clone())))
            .collect()
    }
}

impl FromIterator<(StudentId, Record)> for RecordStore {
    fn from_iter<T: IntoIterator<Item = (StudentId, Record)>>(iter: T) -> Self {
        let mut store = RecordStore::new();
        for (id, record) in iter {
            store.insert(id, record);
        }
        store
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Evidence with every field set to `value`.
    pub fn evidence_with(value: i64) -> Evidence {
        Evidence {
            year: value,
            semester: value as u32,
            term: value as u32,
            deadline: value as u32,
            days_to_deadline: value,
            balance: value as f64,
            fafsa: value,
            verification: value,
            academic_level: value as u32,
            international: value,
            waiver: value,
            total_cc: value,
            total_check_cash: value,
            flywire: value,
            sponsored: value,
            returned_checks: value,
        }
    }

    pub fn record(label: Label, evidence: Evidence) -> Record {
        Record { evidence, label }
    }

    /// Store keyed 0..n from `(label, evidence)` pairs.
    pub fn store(rows: Vec<(Label, Evidence)>) -> RecordStore {
        rows.into_iter()
            .enumerate()
            .map(|(i, (label, evidence))| (i as StudentId, record(label, evidence)))
            .collect()
    }
}
