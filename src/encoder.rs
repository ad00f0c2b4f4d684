use std::collections::{BTreeSet, HashMap};

use crate::error::{BayesError, Result};

/// Maps the distinct strings of one column to integer codes.
///
/// Codes follow the sorted order of the distinct values, so two encoders fitted
/// over the same multiset of strings always agree. The vocabulary is fixed once
/// fitted.
#[derive(Debug, Clone)]
pub struct LabelEncoder {
    column: &'static str,
    classes: Vec<String>,
    codes: HashMap<String, u32>,
}

impl LabelEncoder {
    pub fn fit<I, S>(column: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let distinct: BTreeSet<String> = values
            .into_iter()
            .map(|value| value.as_ref().to_string())
            .collect();

        let classes: Vec<String> = distinct.into_iter().collect();
        let codes = classes
            .iter()
            .enumerate()
            .map(|(code, class)| (class.clone(), code as u32))
            .collect();

        LabelEncoder {
            column,
            classes,
            codes,
        }
    }

    pub fn encode(&self, value: &str) -> Result<u32> {
        self.codes
            .get(value)
            .copied()
            .ok_or_else(|| BayesError::UnknownCategory {
                column: self.column,
                value: value.to_string(),
            })
    }

    pub fn decode(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(String::as_str)
    }

    pub fn column(&self) -> &'static str {
        self.column
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// The four fitted vocabularies of one load, handed to whoever needs to map
/// raw strings to codes or back.
#[derive(Debug, Clone)]
pub struct Encoders {
    pub semester: LabelEncoder,
    pub term: LabelEncoder,
    pub deadline: LabelEncoder,
    pub academic_level: LabelEncoder,
}

impl Encoders {
    pub fn iter(&self) -> impl Iterator<Item = &LabelEncoder> {
        [
            &self.semester,
            &self.term,
            &self.deadline,
            &self.academic_level,
        ]
        .into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_follow_sorted_order() {
        let encoder = LabelEncoder::fit("term", ["Spring", "Fall", "Summer", "Fall"]);

        assert_eq!(encoder.len(), 3);
        assert_eq!(encoder.encode("Fall").unwrap(), 0);
        assert_eq!(encoder.encode("Spring").unwrap(), 1);
        assert_eq!(encoder.encode("Summer").unwrap(), 2);
    }

    #[test]
    fn test_same_multiset_same_codes() {
        let a = LabelEncoder::fit("semester", ["B", "A", "C", "A"]);
        let b = LabelEncoder::fit("semester", ["A", "C", "A", "B"]);

        for value in ["A", "B", "C"] {
            assert_eq!(a.encode(value).unwrap(), b.encode(value).unwrap());
        }
    }

    #[test]
    fn test_round_trip() {
        let encoder = LabelEncoder::fit("deadline", ["census", "first_day", "midterm"]);

        for class in encoder.classes() {
            let code = encoder.encode(class).unwrap();
            assert_eq!(encoder.decode(code), Some(class.as_str()));
        }
        assert_eq!(encoder.decode(3), None);
    }

    #[test]
    fn test_empty_column() {
        let encoder = LabelEncoder::fit("semester", Vec::<String>::new());

        assert!(encoder.is_empty());
        assert_eq!(encoder.len(), 0);
        assert!(!LabelEncoder::fit("semester", ["Fall"]).is_empty());
    }

    #[test]
    fn test_unknown_category() {
        let encoder = LabelEncoder::fit("academic_level", ["UG", "GR"]);

        match encoder.encode("PhD") {
            Err(BayesError::UnknownCategory { column, value }) => {
                assert_eq!(column, "academic_level");
                assert_eq!(value, "PhD");
            }
            other => panic!("expected UnknownCategory, got {other:?}"),
        }
    }
}
