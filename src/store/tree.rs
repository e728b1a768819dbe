// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Helpers for editing a JSON tree the way the store does.
//!
//! The store has no notion of an empty object or an explicit `null`: writing
//! `null` deletes a key, and a parent whose last child disappears is removed
//! too.

use serde_json::{Map, Value};

use super::StorePath;

/// Returns the value at `path`, or `None` if nothing is stored there.
pub(crate) fn value_at<'a>(root: &'a Value, path: &StorePath) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.segments() {
        current = current.as_object()?.get(segment)?;
    }
    if current.is_null() { None } else { Some(current) }
}

/// Replaces the value at `path`, creating intermediate objects as needed.
pub(crate) fn set_at(root: &mut Value, path: &StorePath, value: Value) {
    let value = prune(value);
    let Some((last, parents)) = path.segments().split_last() else {
        *root = value;
        return;
    };

    if value.is_null() {
        remove_at(root, path.segments());
        return;
    }

    let mut current = root;
    for segment in parents {
        current = ensure_object(current)
            .entry(segment.clone())
            .or_insert(Value::Null);
    }
    ensure_object(current).insert(last.clone(), value);
}

/// Drops `null` members and empty objects, recursively.
pub(crate) fn prune(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let pruned: Map<String, Value> = map
                .into_iter()
                .map(|(key, child)| (key, prune(child)))
                .filter(|(_, child)| !child.is_null())
                .collect();
            if pruned.is_empty() {
                Value::Null
            } else {
                Value::Object(pruned)
            }
        }
        other => other,
    }
}

fn remove_at(node: &mut Value, segments: &[String]) {
    let Some((first, rest)) = segments.split_first() else {
        *node = Value::Null;
        return;
    };
    let Value::Object(map) = node else {
        return;
    };

    if rest.is_empty() {
        map.remove(first);
    } else if let Some(child) = map.get_mut(first) {
        remove_at(child, rest);
        if child.is_null() {
            map.remove(first);
        }
    }

    if map.is_empty() {
        *node = Value::Null;
    }
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    let Value::Object(map) = value else {
        unreachable!("value was just replaced with an object");
    };
    map
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn path(p: &str) -> StorePath {
        StorePath::new(p).unwrap()
    }

    #[test]
    fn set_creates_parents() {
        let mut root = Value::Null;
        set_at(&mut root, &path("relay/relay1"), json!(true));
        assert_eq!(root, json!({"relay": {"relay1": true}}));
    }

    #[test]
    fn set_replaces_scalars_with_objects() {
        let mut root = json!({"relay": 5});
        set_at(&mut root, &path("relay/relay1"), json!(false));
        assert_eq!(root, json!({"relay": {"relay1": false}}));
    }

    #[test]
    fn null_deletes_and_prunes_parents() {
        let mut root = json!({"relay": {"relay1": true}, "schedule": {"enabled": true}});
        set_at(&mut root, &path("relay/relay1"), Value::Null);
        assert_eq!(root, json!({"schedule": {"enabled": true}}));
    }

    #[test]
    fn deleting_everything_leaves_null() {
        let mut root = json!({"relay": {"relay1": true}});
        set_at(&mut root, &path("relay/relay1"), Value::Null);
        assert_eq!(root, Value::Null);
    }

    #[test]
    fn set_root_replaces_tree() {
        let mut root = json!({"a": 1});
        set_at(&mut root, &StorePath::root(), json!({"b": {"c": null}, "d": 2}));
        assert_eq!(root, json!({"d": 2}));
    }

    #[test]
    fn value_at_walks_objects() {
        let root = json!({"schedule": {"onTime": "6:00 PM"}});
        assert_eq!(
            value_at(&root, &path("schedule/onTime")),
            Some(&json!("6:00 PM"))
        );
        assert_eq!(value_at(&root, &path("schedule/offTime")), None);
        assert_eq!(value_at(&root, &path("schedule/onTime/deeper")), None);
    }
}
