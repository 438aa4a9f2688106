//! Structural change detection for resource inputs
//!
//! Inputs are compared as JSON values: mappings ignore key order, sequences
//! are order-sensitive, numbers compare numerically, and a missing key is
//! the same as an explicit `null`. The last rule keeps serialization
//! differences in the host (a field written as `null` versus omitted) from
//! looking like a change.

use crate::types::PlanAction;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::{BTreeSet, HashMap};

/// Deep structural equality.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| values_equal(a, b))
        }
        (Value::Object(x), Value::Object(y)) => objects_equal(x, y),
        _ => false,
    }
}

fn objects_equal(x: &Map<String, Value>, y: &Map<String, Value>) -> bool {
    x.keys()
        .chain(y.keys())
        .all(|key| values_equal(field(x, key), field(y, key)))
}

fn numbers_equal(x: &Number, y: &Number) -> bool {
    if let (Some(a), Some(b)) = (x.as_i64(), y.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (x.as_u64(), y.as_u64()) {
        return a == b;
    }
    match (x.as_f64(), y.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn field<'a>(map: &'a Map<String, Value>, key: &str) -> &'a Value {
    map.get(key).unwrap_or(&Value::Null)
}

/// Whether `new` differs from `old` anywhere.
pub fn has_changed(old: &Value, new: &Value) -> bool {
    !values_equal(old, new)
}

/// Names of the top-level fields that differ, sorted.
///
/// Non-object values that differ are reported as a single empty name.
pub fn changed_fields(old: &Value, new: &Value) -> Vec<String> {
    match (old, new) {
        (Value::Object(x), Value::Object(y)) => {
            let keys: BTreeSet<&String> = x.keys().chain(y.keys()).collect();
            keys.into_iter()
                .filter(|key| !values_equal(field(x, key), field(y, key)))
                .cloned()
                .collect()
        }
        _ if values_equal(old, new) => Vec::new(),
        _ => vec![String::new()],
    }
}

/// Compare two typed inputs through their JSON form.
///
/// Anything that cannot be serialized counts as changed, so a broken
/// comparison errs toward re-running the side effect.
pub fn inputs_changed<T: Serialize + ?Sized>(old: &T, new: &T) -> bool {
    match (serde_json::to_value(old), serde_json::to_value(new)) {
        (Ok(old), Ok(new)) => has_changed(&old, &new),
        _ => true,
    }
}

/// What would happen to one resource on apply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDiff {
    /// Declared name of the resource
    pub resource_id: String,
    /// Type of the resource
    pub resource_type: String,
    /// Planned lifecycle call
    pub action: PlanAction,
}

impl ResourceDiff {
    /// Check if this diff represents a first creation
    pub fn is_addition(&self) -> bool {
        matches!(self.action, PlanAction::Create)
    }

    /// Check if this diff re-runs an existing resource
    pub fn is_modification(&self) -> bool {
        matches!(self.action, PlanAction::Update { .. })
    }

    /// Check if apply would run anything for this resource
    pub fn has_changes(&self) -> bool {
        !matches!(self.action, PlanAction::NoChange)
    }
}

/// Diff summary statistics
#[derive(Debug, Clone, Default)]
pub struct DiffSummary {
    /// Number of resources to create
    pub additions: usize,
    /// Number of resources whose side effect re-runs
    pub modifications: usize,
    /// Number of resources left alone
    pub unchanged: usize,
}

impl DiffSummary {
    /// Create a summary from a list of diffs
    pub fn from_diffs(diffs: &[ResourceDiff]) -> Self {
        let mut summary = Self::default();
        for diff in diffs {
            match diff.action {
                PlanAction::Create => summary.additions += 1,
                PlanAction::Update { .. } => summary.modifications += 1,
                PlanAction::NoChange => summary.unchanged += 1,
            }
        }
        summary
    }

    /// Total number of side effects apply would run
    pub fn total(&self) -> usize {
        self.additions + self.modifications
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}

/// Group diffs by resource type
pub fn group_by_type(diffs: &[ResourceDiff]) -> HashMap<String, Vec<&ResourceDiff>> {
    let mut groups: HashMap<String, Vec<&ResourceDiff>> = HashMap::new();
    for diff in diffs {
        groups
            .entry(diff.resource_type.clone())
            .or_default()
            .push(diff);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_order_insensitive() {
        let a: Value = serde_json::from_str(r#"{"a":1,"b":2}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"b":2,"a":1}"#).unwrap();
        assert!(!has_changed(&a, &b));
        assert!(has_changed(&json!({"a": 1}), &json!({"a": 2})));
    }

    #[test]
    fn test_nested_difference_detected() {
        let old = json!({"payload": {"env": "dev", "tags": ["a", "b"]}});
        let new = json!({"payload": {"env": "dev", "tags": ["a", "c"]}});
        assert!(has_changed(&old, &new));
    }

    #[test]
    fn test_sequences_are_order_sensitive() {
        assert!(has_changed(&json!(["a", "b"]), &json!(["b", "a"])));
        assert!(has_changed(&json!([1]), &json!([1, 1])));
    }

    #[test]
    fn test_missing_equals_null() {
        let old = json!({"script": "x", "qualifier": null});
        let new = json!({"script": "x"});
        assert!(!has_changed(&old, &new));
        assert!(!has_changed(&new, &old));
    }

    #[test]
    fn test_numbers_compare_numerically() {
        assert!(values_equal(&json!(1), &json!(1.0)));
        assert!(values_equal(&json!(u64::MAX), &json!(u64::MAX)));
        assert!(!values_equal(&json!(-1), &json!(1)));
    }

    #[test]
    fn test_mismatched_kinds_are_unequal() {
        assert!(has_changed(&json!("1"), &json!(1)));
        assert!(has_changed(&json!(false), &Value::Null));
        assert!(has_changed(&json!({}), &json!([])));
    }

    #[test]
    fn test_changed_fields_lists_sorted_names() {
        let old = json!({"b": 1, "a": 1, "same": true});
        let new = json!({"a": 2, "c": 3, "same": true, "b": null});
        assert_eq!(changed_fields(&old, &new), vec!["a", "b", "c"]);
        assert_eq!(changed_fields(&json!(1), &json!(2)), vec![String::new()]);
        assert!(changed_fields(&json!(1), &json!(1.0)).is_empty());
    }

    #[test]
    fn test_inputs_changed_typed() {
        #[derive(Serialize)]
        struct Inputs {
            script: String,
        }
        let a = Inputs {
            script: "echo a".into(),
        };
        let b = Inputs {
            script: "echo b".into(),
        };
        assert!(!inputs_changed(&a, &a));
        assert!(inputs_changed(&a, &b));
    }

    #[test]
    fn test_summary_counts() {
        let diffs = vec![
            ResourceDiff {
                resource_id: "a".into(),
                resource_type: "script".into(),
                action: PlanAction::Create,
            },
            ResourceDiff {
                resource_id: "b".into(),
                resource_type: "script".into(),
                action: PlanAction::NoChange,
            },
            ResourceDiff {
                resource_id: "c".into(),
                resource_type: "lambda".into(),
                action: PlanAction::Update {
                    fields: vec!["payload".into()],
                },
            },
        ];
        let summary = DiffSummary::from_diffs(&diffs);
        assert_eq!(summary.additions, 1);
        assert_eq!(summary.modifications, 1);
        assert_eq!(summary.unchanged, 1);
        assert_eq!(summary.total(), 2);
        assert_eq!(group_by_type(&diffs)["script"].len(), 2);
    }
}
