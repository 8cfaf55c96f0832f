//! Layer merging for config sections.

use serde_json::{Map, Value};

/// Merge `update` into `target`.
///
/// Mappings present on both sides merge key by key; every other value in
/// `update` (scalars, arrays, a mapping replacing a scalar) replaces the
/// target outright. Arrays are never concatenated.
pub fn merge_values(target: &mut Value, update: &Value) {
    match (target, update) {
        (Value::Object(target_map), Value::Object(update_map)) => {
            for (key, value) in update_map {
                match target_map.get_mut(key) {
                    Some(slot) => merge_values(slot, value),
                    None => {
                        target_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target_slot, _) => {
            *target_slot = update.clone();
        }
    }
}

/// Fold `layers` left to right into a single mapping.
///
/// Layers that are not mappings (for example a section written as `~`)
/// contribute nothing.
pub fn merge_layers<'a>(layers: impl IntoIterator<Item = &'a Value>) -> Map<String, Value> {
    let mut merged = Value::Object(Map::new());
    for layer in layers {
        if layer.is_object() {
            merge_values(&mut merged, layer);
        }
    }
    match merged {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn later_scalar_wins() {
        let mut base = json!({"minify": false, "target": "browser"});
        merge_values(&mut base, &json!({"minify": true}));
        assert_eq!(base, json!({"minify": true, "target": "browser"}));
    }

    #[test]
    fn nested_mappings_merge_recursively() {
        let mut base = json!({"define": {"A": "1", "B": "2"}});
        merge_values(&mut base, &json!({"define": {"B": "3"}}));
        assert_eq!(base, json!({"define": {"A": "1", "B": "3"}}));
    }

    #[test]
    fn arrays_are_replaced_not_concatenated() {
        let mut base = json!({"entrypoints": ["a.js", "b.js"]});
        merge_values(&mut base, &json!({"entrypoints": ["c.js"]}));
        assert_eq!(base, json!({"entrypoints": ["c.js"]}));
    }

    #[test]
    fn mapping_replaces_scalar() {
        let mut base = json!({"commands": "bun run build"});
        merge_values(&mut base, &json!({"commands": {"build": "bun build"}}));
        assert_eq!(base, json!({"commands": {"build": "bun build"}}));
    }

    #[test]
    fn null_layers_are_skipped() {
        let merged = merge_layers([&json!({"a": 1}), &Value::Null, &json!({"b": 2})]);
        assert_eq!(Value::Object(merged), json!({"a": 1, "b": 2}));
    }
}
