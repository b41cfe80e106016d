//! Field-level validation accumulator.
//!
//! A [`Validator`] collects one message per field while a request is being
//! checked, so every problem can be reported in a single response. Create one
//! per request; it holds no shared state.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::hash::Hash;

use serde::Serialize;

/// Field name to message map produced by a failed validation.
///
/// Serializes as a plain JSON object, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Message recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Accumulates validation failures keyed by field name.
///
/// The first message recorded for a field is kept; later ones are ignored.
#[derive(Debug, Default)]
pub struct Validator {
    errors: ValidationErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when no errors have been recorded.
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record `message` under `field` unless the field already has one.
    pub fn add_error(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    /// Record `message` under `field` when `ok` is false.
    pub fn check(&mut self, ok: bool, field: &str, message: impl Into<String>) {
        if !ok {
            self.add_error(field, message);
        }
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn into_errors(self) -> ValidationErrors {
        self.errors
    }

    /// `Ok(())` when valid, otherwise the collected errors.
    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.valid() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// `true` if `value` is one of `permitted`.
pub fn permitted_value<T: PartialEq>(value: &T, permitted: &[T]) -> bool {
    permitted.contains(value)
}

/// `true` if every element of `values` is distinct.
pub fn unique<T: Eq + Hash>(values: &[T]) -> bool {
    let mut seen = HashSet::with_capacity(values.len());
    values.iter().all(|v| seen.insert(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_validator_is_valid() {
        assert!(Validator::new().valid());
    }

    #[test]
    fn check_records_only_failures() {
        let mut v = Validator::new();
        v.check(true, "title", "must be provided");
        assert!(v.valid());

        v.check(false, "title", "must be provided");
        assert!(!v.valid());
        assert_eq!(v.errors().get("title"), Some("must be provided"));
    }

    #[test]
    fn first_error_per_field_wins() {
        let mut v = Validator::new();
        v.add_error("year", "must be provided");
        v.add_error("year", "must be greater than 1888");
        v.check(false, "year", "must not be in the future");

        assert_eq!(v.errors().len(), 1);
        assert_eq!(v.errors().get("year"), Some("must be provided"));
    }

    #[test]
    fn errors_accumulate_across_fields() {
        let mut v = Validator::new();
        v.check(false, "page", "must be greater than zero");
        v.check(false, "sort", "invalid sort value");

        let errors = v.into_errors();
        assert_eq!(errors.len(), 2);
        assert!(errors.contains("page"));
        assert!(errors.contains("sort"));
    }

    #[test]
    fn finish_returns_errors_when_invalid() {
        let mut v = Validator::new();
        v.add_error("genres", "must contain at least 1 genre");
        let errors = v.finish().unwrap_err();
        assert_eq!(errors.get("genres"), Some("must contain at least 1 genre"));

        assert!(Validator::new().finish().is_ok());
    }

    #[test]
    fn display_lists_fields_in_name_order() {
        let mut v = Validator::new();
        v.add_error("title", "must be provided");
        v.add_error("runtime", "must be provided");
        assert_eq!(
            v.into_errors().to_string(),
            "runtime: must be provided, title: must be provided"
        );
    }

    #[test]
    fn permitted_value_checks_membership() {
        let list = ["id", "-id"];
        assert!(permitted_value(&"-id", &list));
        assert!(!permitted_value(&"id; DROP TABLE movies", &list));
    }

    #[test]
    fn unique_detects_duplicates() {
        assert!(unique(&["drama", "war"]));
        assert!(!unique(&["drama", "war", "drama"]));
        assert!(unique::<&str>(&[]));
    }
}
