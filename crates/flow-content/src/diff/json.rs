//! Semantic comparison of JSON documents

use serde_json::Value;

/// Maximum recursion depth for diff operations
const MAX_DIFF_DEPTH: usize = 128;

/// Result of comparing two JSON values semantically
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JsonDiff {
    /// Are the documents semantically equivalent?
    pub is_equivalent: bool,
    /// List of changes with their dotted paths
    pub changes: Vec<JsonChange>,
}

/// A change between two JSON documents
#[derive(Debug, Clone, PartialEq)]
pub enum JsonChange {
    Added { path: String, value: Value },
    Removed { path: String, value: Value },
    Modified { path: String, old: Value, new: Value },
}

impl JsonChange {
    /// Dotted path of the changed value
    pub fn path(&self) -> &str {
        match self {
            Self::Added { path, .. } | Self::Removed { path, .. } | Self::Modified { path, .. } => path,
        }
    }
}

impl JsonDiff {
    /// Compare two values, tracking every change with its path
    /// (`d.Version`, `items[2]`). Object key order never matters.
    pub fn compute(old: &Value, new: &Value) -> Self {
        let mut changes = Vec::new();
        diff_values(old, new, String::new(), &mut changes, 0);
        Self {
            is_equivalent: changes.is_empty(),
            changes,
        }
    }

    /// Paths of every change, in discovery order
    pub fn changed_paths(&self) -> Vec<&str> {
        self.changes.iter().map(JsonChange::path).collect()
    }
}

fn child_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn diff_values(old: &Value, new: &Value, path: String, changes: &mut Vec<JsonChange>, depth: usize) {
    // Too deep: report the whole subtree as one modification
    if depth > MAX_DIFF_DEPTH {
        if old != new {
            changes.push(JsonChange::Modified {
                path,
                old: old.clone(),
                new: new.clone(),
            });
        }
        return;
    }

    match (old, new) {
        (Value::Object(old_obj), Value::Object(new_obj)) => {
            for (key, old_value) in old_obj {
                let child = child_path(&path, key);
                match new_obj.get(key) {
                    Some(new_value) => diff_values(old_value, new_value, child, changes, depth + 1),
                    None => changes.push(JsonChange::Removed {
                        path: child,
                        value: old_value.clone(),
                    }),
                }
            }
            for (key, new_value) in new_obj {
                if !old_obj.contains_key(key) {
                    changes.push(JsonChange::Added {
                        path: child_path(&path, key),
                        value: new_value.clone(),
                    });
                }
            }
        }
        (Value::Array(old_arr), Value::Array(new_arr)) => {
            for i in 0..old_arr.len().max(new_arr.len()) {
                let child = format!("{path}[{i}]");
                match (old_arr.get(i), new_arr.get(i)) {
                    (Some(o), Some(n)) => diff_values(o, n, child, changes, depth + 1),
                    (Some(o), None) => changes.push(JsonChange::Removed {
                        path: child,
                        value: o.clone(),
                    }),
                    (None, Some(n)) => changes.push(JsonChange::Added {
                        path: child,
                        value: n.clone(),
                    }),
                    (None, None) => unreachable!(),
                }
            }
        }
        _ => {
            if old != new {
                changes.push(JsonChange::Modified {
                    path,
                    old: old.clone(),
                    new: new.clone(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_order_is_irrelevant() {
        let old: Value = serde_json::from_str(r#"{"d":{"Id":"P","Version":"1.0.0"}}"#).unwrap();
        let new: Value = serde_json::from_str(r#"{"d":{"Version":"1.0.0","Id":"P"}}"#).unwrap();
        assert!(JsonDiff::compute(&old, &new).is_equivalent);
    }

    #[test]
    fn nested_modification_has_dotted_path() {
        let diff = JsonDiff::compute(&json!({"d": {"Version": "1.0.0"}}), &json!({"d": {"Version": "1.0.1"}}));
        assert!(!diff.is_equivalent);
        assert!(matches!(&diff.changes[0], JsonChange::Modified { path, .. } if path == "d.Version"));
    }

    #[test]
    fn changed_paths_name_each_field() {
        let old = json!({"d": {"Id": "P", "ShortText": "old", "Vendor": "ACME"}});
        let new = json!({"d": {"Id": "P", "ShortText": "new", "Keywords": "orders"}});
        let diff = JsonDiff::compute(&old, &new);
        assert_eq!(diff.changed_paths(), vec!["d.ShortText", "d.Vendor", "d.Keywords"]);
    }

    #[test]
    fn added_and_removed_keys() {
        let diff = JsonDiff::compute(&json!({"a": 1}), &json!({"b": 2}));
        assert_eq!(diff.changes.len(), 2);
        assert!(diff.changes.iter().any(|c| matches!(c, JsonChange::Removed { path, .. } if path == "a")));
        assert!(diff.changes.iter().any(|c| matches!(c, JsonChange::Added { path, .. } if path == "b")));
    }

    #[test]
    fn deep_nesting_does_not_overflow() {
        fn nested(depth: usize, leaf: &str) -> Value {
            let mut current = json!({"leaf": leaf});
            for _ in 0..depth {
                current = json!({"nested": current});
            }
            current
        }
        assert!(!JsonDiff::compute(&nested(150, "old"), &nested(150, "new")).is_equivalent);
    }
}
