//! Decoding of `.github/prlint.json` from the contents API.
//!
//! The contents API wraps the file in a JSON envelope whose `content` field is
//! base64 with embedded line breaks. Every decoding failure surfaces as a
//! [`ConfigError`]; the pipeline reports it on the pull request as a failed
//! validation rather than as an internal error.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::flatten::is_truthy;

/// Errors decoding a fetched rules file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The contents API response was not the expected JSON envelope.
    #[error("unexpected contents API response: {0}")]
    Envelope(#[source] serde_json::Error),

    /// The `content` field was not valid base64.
    #[error("rules file is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded bytes were not UTF-8.
    #[error("rules file is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The rules file was not valid JSON.
    #[error("rules file is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),

    /// The top-level JSON value was not an object.
    #[error("rules file must contain a JSON object of field rules")]
    NotAnObject,

    /// A field's rules were not a list.
    #[error("rules for `{field}` must be a list")]
    NotAList { field: String },

    /// A single rule could not be read.
    #[error("rule `{field}[{index}]` is invalid: {source}")]
    InvalidRule {
        field: String,
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// A single regex assertion against one flattened field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Regex source. A missing pattern is empty and matches anything.
    #[serde(default)]
    pub pattern: String,
    #[serde(default)]
    pub flags: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "detailsURL")]
    pub details_url: Option<String>,
}

impl Rule {
    pub fn new(pattern: impl Into<String>) -> Self {
        Rule {
            pattern: pattern.into(),
            ..Rule::default()
        }
    }

    /// The rule's own message, ignoring empty strings.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.is_empty())
    }

    /// The rule's own details URL, ignoring empty strings.
    pub fn details_url(&self) -> Option<&str> {
        self.details_url.as_deref().filter(|u| !u.is_empty())
    }
}

/// Field rules in the order the file declares them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    fields: Vec<(String, Vec<Rule>)>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends rules for a field, keeping declaration order.
    pub fn with_field(mut self, field: impl Into<String>, rules: Vec<Rule>) -> Self {
        self.fields.push((field.into(), rules));
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &[Rule])> {
        self.fields.iter().map(|(f, r)| (f.as_str(), r.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parses the rules file text.
    ///
    /// Fields whose value is `null`, `false`, `0` or `""` are treated as
    /// switched off and skipped.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let root: Value = serde_json::from_str(text).map_err(ConfigError::Json)?;
        let Value::Object(map) = root else {
            return Err(ConfigError::NotAnObject);
        };

        let mut rule_set = RuleSet::new();
        for (field, value) in map {
            if !is_truthy(&value) {
                continue;
            }
            let Value::Array(items) = value else {
                return Err(ConfigError::NotAList { field });
            };
            let mut rules = Vec::with_capacity(items.len());
            for (index, item) in items.into_iter().enumerate() {
                let rule: Rule = serde_json::from_value(item).map_err(|source| {
                    ConfigError::InvalidRule {
                        field: field.clone(),
                        index,
                        source,
                    }
                })?;
                rules.push(rule);
            }
            rule_set.fields.push((field, rules));
        }
        Ok(rule_set)
    }
}

/// Envelope returned by `GET /repos/{repo}/contents/{path}`.
#[derive(Debug, Deserialize)]
struct ContentsEnvelope {
    content: String,
}

/// Decodes a contents API response body into a [`RuleSet`].
pub fn decode_contents(body: &str) -> Result<RuleSet, ConfigError> {
    let envelope: ContentsEnvelope = serde_json::from_str(body).map_err(ConfigError::Envelope)?;
    let compact: String = envelope
        .content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD.decode(compact)?;
    let text = String::from_utf8(bytes)?;
    RuleSet::from_json(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::contents_response;

    #[test]
    fn decodes_contents_envelope() {
        let body = contents_response(r#"{"title":[{"pattern":"^\\[FIX\\]","flags":"i"}]}"#);
        let rules = decode_contents(&body).unwrap();

        let fields: Vec<_> = rules.fields().collect();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].0, "title");
        assert_eq!(fields[0].1[0].pattern, "^\\[FIX\\]");
        assert_eq!(fields[0].1[0].flags.as_deref(), Some("i"));
    }

    #[test]
    fn tolerates_line_wrapped_base64() {
        let body = contents_response(r#"{"body":[{"pattern":".+","message":"Add a description please"}]}"#);
        let mut envelope: Value = serde_json::from_str(&body).unwrap();
        let content = envelope["content"].as_str().unwrap().to_string();
        let (a, b) = content.split_at(10);
        envelope["content"] = Value::String(format!("{a}\n{b}\n"));

        let rules = decode_contents(&envelope.to_string()).unwrap();
        assert!(!rules.is_empty());
    }

    #[test]
    fn preserves_declaration_order() {
        let rules = RuleSet::from_json(
            r#"{"title":[{"pattern":"a"}],"body":[{"pattern":"b"}],"head.ref":[{"pattern":"c"}]}"#,
        )
        .unwrap();

        let order: Vec<_> = rules.fields().map(|(field, _)| field).collect();
        assert_eq!(order, vec!["title", "body", "head.ref"]);
    }

    #[test]
    fn reads_details_url_key() {
        let rules = RuleSet::from_json(
            r#"{"title":[{"pattern":"a","message":"m","detailsURL":"https://example.com/rules"}]}"#,
        )
        .unwrap();
        let (_, field_rules) = rules.fields().next().unwrap();

        assert_eq!(field_rules[0].message(), Some("m"));
        assert_eq!(field_rules[0].details_url(), Some("https://example.com/rules"));
    }

    #[test]
    fn empty_message_and_url_are_ignored() {
        let rule = Rule {
            message: Some(String::new()),
            details_url: Some(String::new()),
            ..Rule::new("x")
        };
        assert_eq!(rule.message(), None);
        assert_eq!(rule.details_url(), None);
    }

    #[test]
    fn null_field_rules_are_skipped() {
        let rules = RuleSet::from_json(r#"{"title":null,"body":[{"pattern":"b"}]}"#).unwrap();
        let order: Vec<_> = rules.fields().map(|(field, _)| field).collect();
        assert_eq!(order, vec!["body"]);
    }

    #[test]
    fn missing_pattern_defaults_to_empty() {
        let rules = RuleSet::from_json(r#"{"title":[{"message":"anything goes"}]}"#).unwrap();
        let (_, field_rules) = rules.fields().next().unwrap();
        assert_eq!(field_rules[0].pattern, "");
    }

    #[test]
    fn rejects_invalid_json() {
        let body = contents_response("{ not json");
        assert!(matches!(decode_contents(&body), Err(ConfigError::Json(_))));
    }

    #[test]
    fn rejects_non_object_root() {
        assert!(matches!(
            RuleSet::from_json("[1, 2]"),
            Err(ConfigError::NotAnObject)
        ));
    }

    #[test]
    fn rejects_non_list_rules() {
        assert!(matches!(
            RuleSet::from_json(r#"{"title":{"pattern":"a"}}"#),
            Err(ConfigError::NotAList { field }) if field == "title"
        ));
    }

    #[test]
    fn rejects_malformed_rule() {
        assert!(matches!(
            RuleSet::from_json(r#"{"title":[{"pattern":"a"},{"pattern":5}]}"#),
            Err(ConfigError::InvalidRule { index: 1, .. })
        ));
    }

    #[test]
    fn rejects_bad_base64() {
        let body = r#"{"content":"***not base64***"}"#;
        assert!(matches!(decode_contents(body), Err(ConfigError::Base64(_))));
    }

    #[test]
    fn rejects_unexpected_envelope() {
        assert!(matches!(
            decode_contents(r#"{"message":"hello"}"#),
            Err(ConfigError::Envelope(_))
        ));
    }
}
