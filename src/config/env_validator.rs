//! Validation of enumerated environment overrides
//!
//! An invalid value keeps the current setting and prints a warning; when the
//! value looks like a typo the warning names the closest valid value.

use std::fmt::Display;
use std::io::Write;

/// Largest edit distance still reported as a likely typo
const MAX_TYPO_DISTANCE: usize = 2;

/// Validator for one environment variable with a fixed set of values
pub struct EnvVarValidator<'a> {
    var_name: &'a str,
    valid_values: &'a [&'a str],
}

impl<'a> EnvVarValidator<'a> {
    pub fn new(var_name: &'a str, valid_values: &'a [&'a str]) -> Self {
        Self {
            var_name,
            valid_values,
        }
    }

    /// Parse `value`, or warn on `warnings` and keep `current`
    pub fn parse_with_writer<T, F, W>(
        &self,
        value: &str,
        parser: F,
        current: T,
        warnings: &mut W,
    ) -> T
    where
        T: Display,
        F: Fn(&str) -> Option<T>,
        W: Write,
    {
        if let Some(parsed) = parser(value) {
            return parsed;
        }

        let hint = closest_match(&value.trim().to_lowercase(), self.valid_values)
            .map(|valid| format!(" Did you mean '{}'?", valid))
            .unwrap_or_default();
        let _ = writeln!(
            warnings,
            "Warning: invalid {} value '{}', keeping '{}'.{} Valid values: {}",
            self.var_name,
            value,
            current,
            hint,
            self.valid_values.join(", ")
        );
        current
    }
}

/// Closest candidate within typo distance of `input`
pub fn closest_match<'c>(input: &str, candidates: &[&'c str]) -> Option<&'c str> {
    candidates
        .iter()
        .map(|candidate| (*candidate, levenshtein(input, candidate)))
        .filter(|(_, dist)| *dist <= MAX_TYPO_DISTANCE)
        .min_by_key(|(_, dist)| *dist)
        .map(|(candidate, _)| candidate)
}

/// Edit distance over bytes; names and values here are ASCII
pub fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = (above + 1)
                .min(row[j] + 1)
                .min(diagonal + usize::from(ca != cb));
            diagonal = above;
        }
    }

    row[b.len()]
}
