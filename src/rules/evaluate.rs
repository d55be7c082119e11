//! Rule evaluation against a flattened pull request.

use std::fmt;

use serde_json::Value;
use tracing::debug;

use super::config::{ConfigError, RuleSet};
use super::pattern::RulePattern;
use crate::flatten::{FlattenedPullRequest, scalar_to_string};

/// What a failure says.
///
/// Rule failures carry human text written for the status description. Errors
/// (a rules file that did not decode, a pattern that did not compile) carry the
/// error's own text and are reported differently when they stand alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureMessage {
    Rule(String),
    Error(String),
}

impl fmt::Display for FailureMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureMessage::Rule(text) | FailureMessage::Error(text) => f.write_str(text),
        }
    }
}

/// A single failed rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFailure {
    pub message: FailureMessage,
    pub details_url: String,
}

/// Ordered failures from one evaluation. Empty means every rule passed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    failures: Vec<RuleFailure>,
}

impl ValidationOutcome {
    pub fn passed() -> Self {
        Self::default()
    }

    /// Outcome for a rules file that could not be decoded.
    pub fn misconfigured(error: &ConfigError, default_url: &str) -> Self {
        ValidationOutcome {
            failures: vec![RuleFailure {
                message: FailureMessage::Error(error.to_string()),
                details_url: default_url.to_string(),
            }],
        }
    }

    pub fn is_pass(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[RuleFailure] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs every rule in `rules` against `pr`.
///
/// Fields are visited in declaration order and rules in list order, so the
/// first failure is the first failing rule in the file. A rule fails when
/// its field is missing or `null`, when its pattern does not match the
/// field's string form, or when its pattern does not compile.
pub fn evaluate(rules: &RuleSet, pr: &FlattenedPullRequest, default_url: &str) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::passed();

    for (field, field_rules) in rules.fields() {
        let value = pr.get(field).filter(|v| !v.is_null());

        for (index, rule) in field_rules.iter().enumerate() {
            let pattern = match RulePattern::compile(&rule.pattern, rule.flags.as_deref()) {
                Ok(pattern) => pattern,
                Err(e) => {
                    debug!(field = %field, index, error = %e, "Rule pattern failed to compile");
                    outcome.failures.push(RuleFailure {
                        message: FailureMessage::Error(e.to_string()),
                        details_url: default_url.to_string(),
                    });
                    continue;
                }
            };

            if value.is_some_and(|v| matches_value(&pattern, v)) {
                continue;
            }

            let message = rule
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| format!("Rule `{field}[{index}]` failed"));
            let details_url = rule.details_url().unwrap_or(default_url).to_string();
            outcome.failures.push(RuleFailure {
                message: FailureMessage::Rule(message),
                details_url,
            });
        }
    }

    outcome
}

fn matches_value(pattern: &RulePattern, value: &Value) -> bool {
    pattern.is_match(&scalar_to_string(value))
}
