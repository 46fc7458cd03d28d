use std::fmt;

use thiserror::Error;

/// A constraint declared on a single field
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Rule {
    /// Field must be present and non-empty
    Required,
    /// Field, when present, must be strictly greater than the bound
    GreaterThan(i64),
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required => write!(f, "required"),
            Rule::GreaterThan(bound) => write!(f, "gt={}", bound),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub rule: Rule,
}

impl FieldViolation {
    pub fn new(field: &'static str, rule: Rule) -> Self {
        Self { field, rule }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "field '{}' failed on the '{}' rule",
            self.field, self.rule
        )
    }
}

/// Every violation found while checking a payload, in field declaration order
#[derive(Error, Clone, Debug, PartialEq)]
pub struct ValidationErrors(pub Vec<FieldViolation>);

impl ValidationErrors {
    pub fn violations(&self) -> &[FieldViolation] {
        &self.0
    }

    pub fn has_violation(&self, field: &str, rule: Rule) -> bool {
        self.0.iter().any(|v| v.field == field && v.rule == rule)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(|v| v.to_string()).collect();

        write!(f, "{}", messages.join("; "))
    }
}

/// Collects rule failures for one payload. Checks never short circuit, so the caller sees
/// every failing field at once.
#[derive(Default)]
pub struct Validator {
    violations: Vec<FieldViolation>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, field: &'static str, value: Option<&str>) -> Self {
        if value.map_or(true, str::is_empty) {
            self.violations.push(FieldViolation::new(field, Rule::Required));
        }
        self
    }

    pub fn greater_than(mut self, field: &'static str, value: Option<i64>, bound: i64) -> Self {
        if let Some(value) = value {
            if value <= bound {
                self.violations
                    .push(FieldViolation::new(field, Rule::GreaterThan(bound)));
            }
        }
        self
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.violations.is_empty() {
            return Ok(());
        }

        Err(ValidationErrors(self.violations))
    }
}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}
