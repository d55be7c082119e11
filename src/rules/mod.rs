//! Rule configuration and evaluation.
//!
//! A repository opts in by committing `.github/prlint.json`: a JSON object whose
//! keys are flattened pull-request paths and whose values are ordered lists of
//! regex rules. This module decodes that file and runs the rules.

pub mod config;
pub mod evaluate;
pub mod pattern;

pub use config::{ConfigError, Rule, RuleSet, decode_contents};
pub use evaluate::{FailureMessage, RuleFailure, ValidationOutcome, evaluate};
pub use pattern::{PatternError, RulePattern};

/// Path of the rules file inside the linted repository.
pub const CONFIG_FILE_PATH: &str = ".github/prlint.json";
