//! Strategic merge patch generation.
//!
//! Computes a two-way patch between a "before" and "after" snapshot of the
//! same object. Object fields are diffed recursively, and lists that carry a
//! merge key in the core/v1 Node schema are diffed entry by entry, so removing
//! one condition produces a single `$patch: delete` directive instead of a
//! rewrite of the whole list.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Directive marking a list entry for deletion
pub const PATCH_DIRECTIVE: &str = "$patch";

/// Prefix of the directive that fixes the order of a merged list
pub const SET_ELEMENT_ORDER_PREFIX: &str = "$setElementOrder/";

/// List fields of a Node that are merged by key rather than replaced.
const MERGE_KEYS: &[(&str, &str)] = &[
    ("conditions", "type"),
    ("addresses", "type"),
    ("taints", "key"),
    ("volumesAttached", "name"),
];

fn merge_key_for(field: &str) -> Option<&'static str> {
    MERGE_KEYS
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, key)| *key)
}

/// Serialize two versions of an object and compute the patch between them.
pub fn create_patch_for<T: Serialize>(original: &T, modified: &T) -> Result<Value> {
    let original = serde_json::to_value(original)?;
    let modified = serde_json::to_value(modified)?;
    create_two_way_merge_patch(&original, &modified)
}

/// Compute a strategic merge patch that turns `original` into `modified`.
///
/// Both values must be JSON objects. Identical inputs yield `{}`.
pub fn create_two_way_merge_patch(original: &Value, modified: &Value) -> Result<Value> {
    match (original, modified) {
        (Value::Object(original), Value::Object(modified)) => {
            Ok(Value::Object(diff_objects(original, modified)))
        }
        _ => Err(Error::Patch(
            "both snapshots must be JSON objects".to_string(),
        )),
    }
}

/// Check whether a patch carries no changes
pub fn is_empty_patch(patch: &Value) -> bool {
    patch.as_object().is_some_and(Map::is_empty)
}

fn diff_objects(original: &Map<String, Value>, modified: &Map<String, Value>) -> Map<String, Value> {
    let mut patch = Map::new();

    for key in original.keys() {
        if !modified.contains_key(key) {
            patch.insert(key.clone(), Value::Null);
        }
    }

    for (key, new_value) in modified {
        let Some(old_value) = original.get(key) else {
            patch.insert(key.clone(), new_value.clone());
            continue;
        };
        if old_value == new_value {
            continue;
        }

        match (old_value, new_value) {
            (Value::Object(old), Value::Object(new)) => {
                let nested = diff_objects(old, new);
                if !nested.is_empty() {
                    patch.insert(key.clone(), Value::Object(nested));
                }
            }
            (Value::Array(old), Value::Array(new)) => match merge_key_for(key) {
                Some(merge_key) => match diff_keyed_list(old, new, merge_key) {
                    Some((entries, order)) => {
                        patch.insert(format!("{}{}", SET_ELEMENT_ORDER_PREFIX, key), order);
                        patch.insert(key.clone(), entries);
                    }
                    None => {
                        patch.insert(key.clone(), new_value.clone());
                    }
                },
                None => {
                    patch.insert(key.clone(), new_value.clone());
                }
            },
            _ => {
                patch.insert(key.clone(), new_value.clone());
            }
        }
    }

    patch
}

/// Diff two lists addressed by `merge_key`.
///
/// Returns the patch entries and the `$setElementOrder` value, or `None` when
/// some entry lacks the merge key and the list must be replaced wholesale.
fn diff_keyed_list(old: &[Value], new: &[Value], merge_key: &str) -> Option<(Value, Value)> {
    let key_of = |item: &Value| item.get(merge_key).cloned();

    let old_keys: Vec<Value> = old.iter().map(key_of).collect::<Option<_>>()?;
    let new_keys: Vec<Value> = new.iter().map(key_of).collect::<Option<_>>()?;

    let mut entries = Vec::new();

    for (item, item_key) in new.iter().zip(&new_keys) {
        let previous = old_keys
            .iter()
            .position(|k| k == item_key)
            .and_then(|idx| old.get(idx));

        match previous {
            None => entries.push(item.clone()),
            Some(prev) if prev == item => {}
            Some(prev) => match (prev, item) {
                (Value::Object(prev), Value::Object(next)) => {
                    let mut entry = diff_objects(prev, next);
                    entry.insert(merge_key.to_string(), item_key.clone());
                    entries.push(Value::Object(entry));
                }
                _ => entries.push(item.clone()),
            },
        }
    }

    for old_key in old_keys.iter().filter(|k| !new_keys.contains(k)) {
        let mut entry = Map::new();
        entry.insert(PATCH_DIRECTIVE.to_string(), Value::String("delete".to_string()));
        entry.insert(merge_key.to_string(), old_key.clone());
        entries.push(Value::Object(entry));
    }

    let order = new_keys
        .into_iter()
        .map(|k| {
            let mut entry = Map::new();
            entry.insert(merge_key.to_string(), k);
            Value::Object(entry)
        })
        .collect();

    Some((Value::Array(entries), Value::Array(order)))
}
