use serde_json::json;

use super::*;

#[test]
fn identical_objects() {
    let node = json!({"metadata": {"name": "spot-1"}, "spec": {"podCIDR": "10.0.0.0/24"}});
    let patch = diff(&node, &node);
    assert_eq!(patch, json!({}));
    assert!(is_empty(&patch));
}

#[test]
fn added_nested_field() {
    let old = json!({"metadata": {"name": "spot-1"}, "spec": {"podCIDR": "10.0.0.0/24"}});
    let new = json!({"metadata": {"name": "spot-1"}, "spec": {"podCIDR": "10.0.0.0/24", "unschedulable": true}});
    assert_eq!(diff(&old, &new), json!({"spec": {"unschedulable": true}}));
}

#[test]
fn added_object() {
    let old = json!({"metadata": {"name": "spot-1"}});
    let new = json!({"metadata": {"name": "spot-1"}, "spec": {"unschedulable": true}});
    assert_eq!(diff(&old, &new), json!({"spec": {"unschedulable": true}}));
}

#[test]
fn removed_field_becomes_null() {
    let old = json!({"metadata": {"labels": {"a": "1", "b": "2"}}});
    let new = json!({"metadata": {"labels": {"a": "1"}}});
    assert_eq!(diff(&old, &new), json!({"metadata": {"labels": {"b": null}}}));
}

#[test]
fn arrays_are_replaced() {
    let old = json!({"spec": {"taints": [{"key": "a", "effect": "NoSchedule"}]}});
    let new = json!({"spec": {"taints": [{"key": "a", "effect": "NoSchedule"}, {"key": "b", "effect": "NoExecute"}]}});
    assert_eq!(
        diff(&old, &new),
        json!({"spec": {"taints": [{"key": "a", "effect": "NoSchedule"}, {"key": "b", "effect": "NoExecute"}]}})
    );
}

#[test]
fn scalar_root_is_replaced() {
    assert_eq!(diff(&json!(1), &json!({"a": 1})), json!({"a": 1}));
    assert!(!is_empty(&json!(null)));
}
