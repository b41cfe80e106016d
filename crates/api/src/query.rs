//! Query-string helpers for list endpoints.
//!
//! Readers never fail the request: a malformed integer is recorded on the
//! caller's [`Validator`] and the default is used in its place.

use std::collections::HashMap;

use movies_core::validator::Validator;

/// Typed access to raw `?key=value` pairs.
#[derive(Debug, Default)]
pub struct QueryReader {
    params: HashMap<String, String>,
}

impl QueryReader {
    pub fn new(params: HashMap<String, String>) -> Self {
        Self { params }
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.params
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// The value for `key`, or `default` if absent or empty.
    pub fn read_string(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    /// The comma-separated values for `key`, or `default` if absent or empty.
    pub fn read_csv(&self, key: &str, default: &[&str]) -> Vec<String> {
        match self.get(key) {
            Some(value) => value.split(',').map(str::to_string).collect(),
            None => default.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// The integer value for `key`, or `default` if absent or empty.
    ///
    /// A value that is not an integer records `"must be an integer value"`
    /// under `key` and yields `default`.
    pub fn read_int(&self, key: &str, default: i64, v: &mut Validator) -> i64 {
        let Some(value) = self.get(key) else {
            return default;
        };
        match value.parse() {
            Ok(n) => n,
            Err(_) => {
                v.add_error(key, "must be an integer value");
                default
            }
        }
    }
}
