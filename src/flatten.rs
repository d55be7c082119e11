//! Dot-path flattening of the pull-request object.
//!
//! Rules address pull-request fields by dotted path (`head.repo.full_name`,
//! `labels.0.name`). Flattening the payload once per event turns every rule
//! lookup into a single map access.

use std::collections::BTreeMap;

use serde_json::Value;

/// Flat view of a pull request: dotted path to scalar JSON value.
///
/// Only scalars (`string`, `number`, `bool`, `null`) are stored. Empty objects
/// and arrays have no leaves and therefore no entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlattenedPullRequest {
    fields: BTreeMap<String, Value>,
}

impl FlattenedPullRequest {
    /// Flattens a nested JSON value.
    ///
    /// A scalar root has no addressable path and yields an empty map.
    pub fn from_value(root: &Value) -> Self {
        let mut fields = BTreeMap::new();
        match root {
            Value::Object(map) => {
                for (key, value) in map {
                    flatten_into(key.clone(), value, &mut fields);
                }
            }
            Value::Array(items) => {
                for (index, value) in items.iter().enumerate() {
                    flatten_into(index.to_string(), value, &mut fields);
                }
            }
            _ => {}
        }
        FlattenedPullRequest { fields }
    }

    /// Returns the scalar at `path`, if present.
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.fields.get(path)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn flatten_into(path: String, value: &Value, out: &mut BTreeMap<String, Value>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_into(format!("{path}.{key}"), child, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(format!("{path}.{index}"), child, out);
            }
        }
        scalar => {
            out.insert(path, scalar.clone());
        }
    }
}

/// Renders a scalar the way a regex test sees it.
///
/// Strings are used verbatim; numbers use their shortest decimal form with
/// integral floats printed without a fraction (`3.0` becomes `"3"`).
pub fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                n.to_string()
            } else {
                match n.as_f64() {
                    Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e21 => {
                        format!("{f:.0}")
                    }
                    Some(f) => f.to_string(),
                    None => n.to_string(),
                }
            }
        }
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        // Containers never end up in a flattened map.
        other => other.to_string(),
    }
}

/// JavaScript truthiness: everything except `null`, `false`, `0`, and `""`.
/// Empty arrays and objects are truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn truthiness_follows_javascript() {
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!(-0.0), json!("")] {
            assert!(!is_truthy(&falsy), "{falsy} should be falsy");
        }
        for truthy in [json!(true), json!(1), json!(-2.5), json!("0"), json!("false"), json!([]), json!({})] {
            assert!(is_truthy(&truthy), "{truthy} should be truthy");
        }
    }

    #[test]
    fn nested_objects_use_dotted_paths() {
        let flat = FlattenedPullRequest::from_value(&json!({
            "title": "Fix bug",
            "head": { "repo": { "full_name": "octocat/hello-world", "fork": false } },
        }));

        assert_eq!(flat.get("title"), Some(&json!("Fix bug")));
        assert_eq!(
            flat.get("head.repo.full_name"),
            Some(&json!("octocat/hello-world"))
        );
        assert_eq!(flat.get("head.repo.fork"), Some(&json!(false)));
        assert_eq!(flat.get("head.repo"), None);
    }

    #[test]
    fn arrays_use_index_qualified_paths() {
        let flat = FlattenedPullRequest::from_value(&json!({
            "labels": [ { "name": "bug" }, { "name": "docs" } ],
            "assignees": [],
        }));

        assert_eq!(flat.get("labels.0.name"), Some(&json!("bug")));
        assert_eq!(flat.get("labels.1.name"), Some(&json!("docs")));
        assert_eq!(flat.get("assignees"), None);
        assert_eq!(flat.len(), 2);
    }

    #[test]
    fn null_leaves_are_kept() {
        let flat = FlattenedPullRequest::from_value(&json!({ "body": null }));
        assert_eq!(flat.get("body"), Some(&Value::Null));
    }

    #[test]
    fn scalar_root_is_empty() {
        assert!(FlattenedPullRequest::from_value(&json!("not a pr")).is_empty());
        assert!(FlattenedPullRequest::from_value(&Value::Null).is_empty());
    }

    #[test]
    fn scalar_to_string_matches_regex_input() {
        assert_eq!(scalar_to_string(&json!("text")), "text");
        assert_eq!(scalar_to_string(&json!(42)), "42");
        assert_eq!(scalar_to_string(&json!(-7)), "-7");
        assert_eq!(scalar_to_string(&json!(3.0)), "3");
        assert_eq!(scalar_to_string(&json!(2.5)), "2.5");
        assert_eq!(scalar_to_string(&json!(true)), "true");
        assert_eq!(scalar_to_string(&Value::Null), "null");
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            "[a-zA-Z0-9 ]{0,12}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 32, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z_]{1,6}", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    fn count_leaves(value: &Value) -> usize {
        match value {
            Value::Object(map) => map.values().map(count_leaves).sum(),
            Value::Array(items) => items.iter().map(count_leaves).sum(),
            _ => 1,
        }
    }

    /// Walks a dotted path back through the original value.
    fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
        path.split('.').try_fold(root, |node, segment| match node {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }

    proptest! {
        #[test]
        fn every_leaf_is_addressable(
            fields in prop::collection::btree_map("[a-z_]{1,6}", arb_json(), 0..5)
        ) {
            let root = Value::Object(fields.into_iter().collect());
            let flat = FlattenedPullRequest::from_value(&root);

            prop_assert_eq!(flat.len(), count_leaves(&root));
            for (path, value) in flat.iter() {
                prop_assert_eq!(lookup(&root, path), Some(value));
            }
        }
    }
}
