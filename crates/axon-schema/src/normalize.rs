//! Single-pass recursive schema rewriting
//!
//! Every object node is rewritten in one depth-first traversal; rule order
//! within a node is fixed because later rules observe the effects of earlier
//! ones (union flattening splices subtrees that the ongoing walk then visits).
//! Nullable properties discovered mid-walk are recorded by tree path and
//! stripped from their owners' `required` lists in a post-pass.

use std::collections::HashMap;

use serde_json::{Map, Value, json};

/// Description given to the synthetic `reason` property on empty objects
const PLACEHOLDER_REASON_DESCRIPTION: &str = "Brief explanation of why you are calling this tool";

/// Scalar-valued keywords the target dialect rejects; demoted to hints
const DEMOTED_CONSTRAINTS: [&str; 10] = [
    "minLength",
    "maxLength",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "pattern",
    "minItems",
    "maxItems",
    "format",
    "default",
    "examples",
];

/// Keywords dropped unconditionally at the end of each node's rewrite
const REMOVED_KEYWORDS: [&str; 9] = [
    "$schema",
    "$defs",
    "definitions",
    "$ref",
    "$id",
    "propertyNames",
    "patternProperties",
    "enumTitles",
    "prefill",
];

/// One step in a tree path
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
enum PathSegment {
    Key(String),
    Index(usize),
}

/// Owning-object path -> property names typed nullable at that object
type NullableFieldIndex = HashMap<Vec<PathSegment>, Vec<String>>;

/// Rewrite a parsed schema tree in place
pub(crate) fn normalize_tree(root: &mut Value) {
    let mut nullable = NullableFieldIndex::new();
    let mut path = Vec::new();
    walk(root, &mut path, &mut nullable);
    apply_nullable_fields(root, &nullable);
}

fn walk(node: &mut Value, path: &mut Vec<PathSegment>, nullable: &mut NullableFieldIndex) {
    match node {
        Value::Object(_) => {
            rewrite_object(node, path, nullable);

            // Children are visited after the node's own rewrite, so subtrees
            // spliced in by union flattening are themselves normalized
            if let Value::Object(map) = node {
                let keys: Vec<String> = map.keys().cloned().collect();
                for key in keys {
                    if let Some(child) = map.get_mut(&key) {
                        path.push(PathSegment::Key(key.clone()));
                        walk(child, path, nullable);
                        path.pop();
                    }
                }
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter_mut().enumerate() {
                path.push(PathSegment::Index(index));
                walk(item, path, nullable);
                path.pop();
            }
        }
        _ => {}
    }
}

/// Apply every rewrite rule to a single object node, in fixed order
fn rewrite_object(node: &mut Value, path: &[PathSegment], nullable: &mut NullableFieldIndex) {
    let Value::Object(map) = node else { return };

    // $ref nodes collapse to a textual hint; no further rules apply.
    // References are never resolved — cycle detection is avoided entirely
    // at the cost of structural fidelity for referenced types.
    if let Some(target) = map.get("$ref").and_then(Value::as_str) {
        let def_name = target.rsplit('/').next().unwrap_or(target);
        let mut hint = format!("See: {def_name}");
        if let Some(existing) = map.get("description").and_then(Value::as_str)
            && !existing.is_empty()
        {
            hint = format!("{existing} ({hint})");
        }
        *node = json!({"type": "object", "description": hint});
        return;
    }

    convert_const_to_enum(map);
    stringify_enum(map);
    demote_additional_properties(map);
    demote_constraints(map);
    merge_all_of(map);
    flatten_unions(map);
    flatten_type_array(map, path, nullable);
    inject_placeholders(map, path);
    cleanup_required(map);

    for keyword in REMOVED_KEYWORDS {
        map.remove(keyword);
    }
}

/// `const` becomes a single-member `enum` unless one is already present
fn convert_const_to_enum(map: &mut Map<String, Value>) {
    if let Some(const_value) = map.remove("const")
        && !map.contains_key("enum")
    {
        map.insert("enum".to_owned(), Value::Array(vec![const_value]));
    }
}

/// Stringify every enum member; small enums get an "Allowed" hint
fn stringify_enum(map: &mut Map<String, Value>) {
    let Some(Value::Array(members)) = map.get_mut("enum") else {
        return;
    };

    let mut rendered = Vec::with_capacity(members.len());
    for member in members.iter_mut() {
        let text = scalar_to_string(member);
        *member = Value::String(text.clone());
        rendered.push(text);
    }

    if (2..=10).contains(&rendered.len()) {
        append_hint(map, &format!("Allowed: {}", rendered.join(", ")));
    }
}

/// `additionalProperties: false` becomes a hint; the keyword never survives
fn demote_additional_properties(map: &mut Map<String, Value>) {
    if let Some(additional) = map.remove("additionalProperties")
        && additional == Value::Bool(false)
    {
        append_hint(map, "No extra properties allowed");
    }
}

/// Scalar constraint keywords become "key: value" hints; object- or
/// array-valued instances are left untouched
fn demote_constraints(map: &mut Map<String, Value>) {
    for key in DEMOTED_CONSTRAINTS {
        let hint = match map.get(key) {
            Some(value) if !value.is_object() && !value.is_array() => {
                format!("{key}: {}", scalar_to_string(value))
            }
            _ => continue,
        };
        map.remove(key);
        append_hint(map, &hint);
    }
}

/// Union `properties` and `required` across `allOf` members into the parent
fn merge_all_of(map: &mut Map<String, Value>) {
    if !map.get("allOf").is_some_and(Value::is_array) {
        return;
    }
    let Some(Value::Array(members)) = map.remove("allOf") else {
        return;
    };

    let mut required: Vec<String> = map
        .get("required")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(|name| name.as_str().map(ToOwned::to_owned))
                .collect()
        })
        .unwrap_or_default();

    if !map.contains_key("properties") {
        map.insert("properties".to_owned(), json!({}));
    }

    for member in &members {
        let Some(member) = member.as_object() else {
            continue;
        };

        if let Some(member_props) = member.get("properties").and_then(Value::as_object) {
            if let Some(props) = map.get_mut("properties").and_then(Value::as_object_mut) {
                for (name, schema) in member_props {
                    props.insert(name.clone(), schema.clone());
                }
            }
        }

        if let Some(member_required) = member.get("required").and_then(Value::as_array) {
            for name in member_required {
                if let Some(name) = name.as_str()
                    && !required.iter().any(|existing| existing == name)
                {
                    required.push(name.to_owned());
                }
            }
        }
    }

    if !required.is_empty() {
        map.insert("required".to_owned(), json!(required));
    }
}

/// Flatten `anyOf`/`oneOf` by merging the best member into the parent
fn flatten_unions(map: &mut Map<String, Value>) {
    for keyword in ["anyOf", "oneOf"] {
        if !map
            .get(keyword)
            .and_then(Value::as_array)
            .is_some_and(|members| !members.is_empty())
        {
            continue;
        }
        let Some(Value::Array(members)) = map.remove(keyword) else {
            continue;
        };

        let parent_description = map
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_owned();

        let (best_index, types) = select_best_member(&members);
        let Some(Value::Object(best)) = members.into_iter().nth(best_index) else {
            continue;
        };

        for (key, value) in best {
            if key == "description" {
                if let Value::String(child_description) = value {
                    if !parent_description.is_empty()
                        && !child_description.is_empty()
                        && child_description != parent_description
                    {
                        map.insert(
                            key,
                            Value::String(format!("{parent_description} ({child_description})")),
                        );
                    } else if !child_description.is_empty() {
                        map.insert(key, Value::String(child_description));
                    }
                }
            } else {
                map.insert(key, value);
            }
        }

        if types.len() > 1 {
            append_hint(map, &format!("Accepts: {}", types.join(" | ")));
        }
    }
}

/// Pick the union member to keep: object > array > other-typed > null,
/// first seen winning ties. Also collects the distinct member types.
fn select_best_member(members: &[Value]) -> (usize, Vec<String>) {
    let mut best_index = 0;
    let mut best_score = -1_i32;
    let mut types: Vec<String> = Vec::new();

    for (index, member) in members.iter().enumerate() {
        let Some(member) = member.as_object() else {
            continue;
        };

        let mut member_type = member
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_owned();

        let score = if member_type == "object" || member.contains_key("properties") {
            if member_type.is_empty() {
                member_type = "object".to_owned();
            }
            3
        } else if member_type == "array" || member.contains_key("items") {
            if member_type.is_empty() {
                member_type = "array".to_owned();
            }
            2
        } else if !member_type.is_empty() && member_type != "null" {
            1
        } else {
            if member_type.is_empty() {
                member_type = "null".to_owned();
            }
            0
        };

        if !types.contains(&member_type) {
            types.push(member_type);
        }

        if score > best_score {
            best_score = score;
            best_index = index;
        }
    }

    (best_index, types)
}

/// Collapse `type: [...]` to its first non-null member, recording nullable
/// properties for the post-pass
fn flatten_type_array(
    map: &mut Map<String, Value>,
    path: &[PathSegment],
    nullable: &mut NullableFieldIndex,
) {
    let Some(Value::Array(members)) = map.get("type") else {
        return;
    };
    if members.is_empty() {
        return;
    }

    let mut has_null = false;
    let mut non_null: Vec<String> = Vec::new();
    for member in members {
        let Some(member) = member.as_str() else {
            continue;
        };
        if member == "null" {
            has_null = true;
        } else if !member.is_empty() {
            non_null.push(member.to_owned());
        }
    }

    let first = non_null
        .first()
        .cloned()
        .unwrap_or_else(|| "string".to_owned());
    map.insert("type".to_owned(), Value::String(first));

    if non_null.len() > 1 {
        append_hint(map, &format!("Accepts: {}", non_null.join(" | ")));
    }

    if has_null && let Some((owner, field)) = property_context(path) {
        append_hint(map, "(nullable)");
        nullable.entry(owner).or_default().push(field);
    }
}

/// The target API rejects object schemas describing no fields, so empty
/// objects get a synthetic `reason` property; non-root objects without any
/// required field get a minimal `_` placeholder
fn inject_placeholders(map: &mut Map<String, Value>, path: &[PathSegment]) {
    if map.get("type").and_then(Value::as_str) != Some("object") {
        return;
    }

    let properties_empty = map
        .get("properties")
        .and_then(Value::as_object)
        .is_none_or(Map::is_empty);

    if properties_empty {
        let properties = map
            .entry("properties".to_owned())
            .or_insert_with(|| json!({}));
        if !properties.is_object() {
            *properties = json!({});
        }
        if let Some(properties) = properties.as_object_mut() {
            properties.insert(
                "reason".to_owned(),
                json!({
                    "type": "string",
                    "description": PLACEHOLDER_REASON_DESCRIPTION
                }),
            );
        }
        map.insert("required".to_owned(), json!(["reason"]));
        return;
    }

    let has_required = map
        .get("required")
        .and_then(Value::as_array)
        .is_some_and(|names| !names.is_empty());

    if !has_required && !path.is_empty() {
        if let Some(properties) = map.get_mut("properties").and_then(Value::as_object_mut) {
            properties
                .entry("_".to_owned())
                .or_insert_with(|| json!({"type": "boolean"}));
        }
        map.insert("required".to_owned(), json!(["_"]));
    }
}

/// Drop required names that are not present in `properties`
fn cleanup_required(map: &mut Map<String, Value>) {
    let Some(properties) = map.get("properties").and_then(Value::as_object) else {
        return;
    };
    let names: Vec<String> = properties.keys().cloned().collect();

    let Some(Value::Array(required)) = map.get("required") else {
        return;
    };

    let valid: Vec<Value> = required
        .iter()
        .filter(|name| {
            name.as_str()
                .is_some_and(|name| names.iter().any(|known| known == name))
        })
        .cloned()
        .collect();

    if valid.len() != required.len() {
        if valid.is_empty() {
            map.remove("required");
        } else {
            map.insert("required".to_owned(), Value::Array(valid));
        }
    }
}

/// Strip recorded nullable properties from their owners' `required` lists
fn apply_nullable_fields(root: &mut Value, nullable: &NullableFieldIndex) {
    for (owner_path, fields) in nullable {
        let Some(Value::Object(map)) = value_at_path_mut(root, owner_path) else {
            continue;
        };
        let Some(Value::Array(required)) = map.get_mut("required") else {
            continue;
        };

        required.retain(|name| {
            name.as_str()
                .is_some_and(|name| !fields.iter().any(|field| field == name))
        });

        if required.is_empty() {
            map.remove("required");
        }
    }
}

fn value_at_path_mut<'tree>(
    root: &'tree mut Value,
    path: &[PathSegment],
) -> Option<&'tree mut Value> {
    let mut current = root;
    for segment in path {
        current = match segment {
            PathSegment::Key(key) => current.as_object_mut()?.get_mut(key)?,
            PathSegment::Index(index) => current.as_array_mut()?.get_mut(*index)?,
        };
    }
    Some(current)
}

/// The (owning object path, property name) pair when the current node sits
/// directly under a `properties` entry
fn property_context(path: &[PathSegment]) -> Option<(Vec<PathSegment>, String)> {
    if path.len() < 2 {
        return None;
    }
    match (&path[path.len() - 2], &path[path.len() - 1]) {
        (PathSegment::Key(container), PathSegment::Key(field)) if container == "properties" => {
            Some((path[..path.len() - 2].to_vec(), field.clone()))
        }
        _ => None,
    }
}

/// Append a parenthesized hint to a node's description, skipping hints the
/// description already carries so repeated normalization is stable
fn append_hint(map: &mut Map<String, Value>, hint: &str) {
    let existing = map
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or("");
    let description = if existing.is_empty() {
        hint.to_owned()
    } else if existing.contains(hint) {
        return;
    } else {
        format!("{existing} ({hint})")
    };
    map.insert("description".to_owned(), Value::String(description));
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null => "null".to_owned(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    fn normalize(mut schema: Value) -> Value {
        super::normalize_tree(&mut schema);
        schema
    }

    fn description(value: &Value) -> &str {
        value.get("description").and_then(Value::as_str).unwrap_or("")
    }

    #[test]
    fn ref_collapses_to_hint() {
        let out = normalize(json!({"$ref": "#/$defs/Location"}));
        assert_eq!(out, json!({"type": "object", "description": "See: Location"}));
    }

    #[test]
    fn ref_keeps_existing_description() {
        let out = normalize(json!({
            "$ref": "#/$defs/Location",
            "description": "Where to search"
        }));
        assert_eq!(description(&out), "Where to search (See: Location)");
    }

    #[test]
    fn const_becomes_single_member_enum() {
        let out = normalize(json!({"const": "fixed"}));
        assert_eq!(out.get("enum"), Some(&json!(["fixed"])));
        assert!(out.get("const").is_none());
    }

    #[test]
    fn const_does_not_override_existing_enum() {
        let out = normalize(json!({"const": "a", "enum": ["b", "c"]}));
        assert_eq!(out.get("enum"), Some(&json!(["b", "c"])));
    }

    #[test]
    fn enum_members_are_stringified_with_hint() {
        let out = normalize(json!({"enum": [1, 2, true]}));
        assert_eq!(out.get("enum"), Some(&json!(["1", "2", "true"])));
        assert_eq!(description(&out), "Allowed: 1, 2, true");
    }

    #[test]
    fn large_enums_get_no_hint() {
        let members: Vec<String> = (0..11).map(|n| n.to_string()).collect();
        let out = normalize(json!({"enum": members}));
        assert_eq!(description(&out), "");
    }

    #[test]
    fn additional_properties_false_becomes_hint() {
        let out = normalize(json!({
            "type": "object",
            "properties": {"a": {"type": "string"}},
            "required": ["a"],
            "additionalProperties": false
        }));
        assert!(out.get("additionalProperties").is_none());
        assert_eq!(description(&out), "No extra properties allowed");
    }

    #[test]
    fn additional_properties_true_is_dropped_silently() {
        let out = normalize(json!({"type": "string", "additionalProperties": true}));
        assert!(out.get("additionalProperties").is_none());
        assert_eq!(description(&out), "");
    }

    #[test]
    fn scalar_constraints_are_demoted_to_hints() {
        let out = normalize(json!({
            "type": "string",
            "minLength": 1,
            "format": "uri"
        }));
        assert!(out.get("minLength").is_none());
        assert!(out.get("format").is_none());
        let text = description(&out);
        assert!(text.contains("minLength: 1"));
        assert!(text.contains("format: uri"));
    }

    #[test]
    fn object_valued_constraints_are_left_untouched() {
        let out = normalize(json!({
            "type": "object",
            "properties": {"a": {"type": "string"}},
            "required": ["a"],
            "default": {"a": "x"}
        }));
        assert_eq!(out.get("default"), Some(&json!({"a": "x"})));
        assert_eq!(description(&out), "");
    }

    #[test]
    fn all_of_members_merge_into_parent() {
        let out = normalize(json!({
            "type": "object",
            "allOf": [
                {"properties": {"a": {"type": "string"}}, "required": ["a"]},
                {"properties": {"b": {"type": "integer"}}, "required": ["b", "a"]}
            ]
        }));
        assert!(out.get("allOf").is_none());
        assert!(out.pointer("/properties/a").is_some());
        assert!(out.pointer("/properties/b").is_some());
        assert_eq!(out.get("required"), Some(&json!(["a", "b"])));
    }

    #[test]
    fn any_of_flattens_to_best_member_with_type_hint() {
        let out = normalize(json!({
            "anyOf": [
                {"type": "object", "properties": {"a": {"type": "string"}}},
                {"type": "null"}
            ]
        }));
        assert!(out.get("anyOf").is_none());
        assert_eq!(out.get("type"), Some(&json!("object")));
        assert!(out.pointer("/properties/a").is_some());
        assert!(description(&out).contains("Accepts: object | null"));
    }

    #[test]
    fn one_of_prefers_object_over_scalar() {
        let out = normalize(json!({
            "oneOf": [
                {"type": "string"},
                {"type": "object", "properties": {"a": {"type": "string"}}, "required": ["a"]}
            ]
        }));
        assert_eq!(out.get("type"), Some(&json!("object")));
        assert!(description(&out).contains("Accepts: string | object"));
    }

    #[test]
    fn union_merges_parent_and_member_descriptions() {
        let out = normalize(json!({
            "description": "outer",
            "anyOf": [{"type": "string", "description": "inner"}]
        }));
        assert_eq!(description(&out), "outer (inner)");
    }

    #[test]
    fn type_array_collapses_to_first_non_null() {
        let out = normalize(json!({"type": ["integer", "null"]}));
        assert_eq!(out.get("type"), Some(&json!("integer")));
    }

    #[test]
    fn all_null_type_array_defaults_to_string() {
        let out = normalize(json!({"type": ["null"]}));
        assert_eq!(out.get("type"), Some(&json!("string")));
    }

    #[test]
    fn multi_member_type_array_gets_accepts_hint() {
        let out = normalize(json!({"type": ["string", "integer"]}));
        assert_eq!(out.get("type"), Some(&json!("string")));
        assert!(description(&out).contains("Accepts: string | integer"));
    }

    #[test]
    fn nullable_property_is_removed_from_required() {
        let out = normalize(json!({
            "type": "object",
            "properties": {
                "age": {"type": ["integer", "null"]},
                "name": {"type": "string"}
            },
            "required": ["age", "name"]
        }));
        assert_eq!(out.pointer("/properties/age/type"), Some(&json!("integer")));
        assert!(
            out.pointer("/properties/age/description")
                .and_then(Value::as_str)
                .is_some_and(|d| d.contains("(nullable)"))
        );
        assert_eq!(out.get("required"), Some(&json!(["name"])));
    }

    #[test]
    fn required_is_dropped_when_every_member_was_nullable() {
        let out = normalize(json!({
            "type": "object",
            "properties": {"age": {"type": ["integer", "null"]}},
            "required": ["age"]
        }));
        assert!(out.get("required").is_none());
    }

    #[test]
    fn nested_nullable_property_is_stripped_at_the_right_depth() {
        let out = normalize(json!({
            "type": "object",
            "properties": {
                "person": {
                    "type": "object",
                    "properties": {
                        "age": {"type": ["integer", "null"]},
                        "name": {"type": "string"}
                    },
                    "required": ["age", "name"]
                }
            },
            "required": ["person"]
        }));
        assert_eq!(out.pointer("/properties/person/required"), Some(&json!(["name"])));
        assert_eq!(out.get("required"), Some(&json!(["person"])));
    }

    #[test]
    fn empty_object_gets_reason_placeholder() {
        let out = normalize(json!({"type": "object"}));
        assert_eq!(
            out.pointer("/properties/reason/type"),
            Some(&json!("string"))
        );
        assert_eq!(out.get("required"), Some(&json!(["reason"])));
    }

    #[test]
    fn nested_object_without_required_gets_underscore_placeholder() {
        let out = normalize(json!({
            "type": "object",
            "properties": {
                "opts": {
                    "type": "object",
                    "properties": {"verbose": {"type": "boolean"}}
                }
            },
            "required": ["opts"]
        }));
        assert_eq!(
            out.pointer("/properties/opts/properties/_/type"),
            Some(&json!("boolean"))
        );
        assert_eq!(out.pointer("/properties/opts/required"), Some(&json!(["_"])));
    }

    #[test]
    fn root_object_with_properties_gets_no_underscore_placeholder() {
        let out = normalize(json!({
            "type": "object",
            "properties": {"verbose": {"type": "boolean"}}
        }));
        assert!(out.pointer("/properties/_").is_none());
        assert!(out.get("required").is_none());
    }

    #[test]
    fn required_names_missing_from_properties_are_dropped() {
        let out = normalize(json!({
            "type": "object",
            "properties": {"a": {"type": "string"}},
            "required": ["a", "ghost"]
        }));
        assert_eq!(out.get("required"), Some(&json!(["a"])));
    }

    #[test]
    fn bookkeeping_keywords_are_removed() {
        let out = normalize(json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "$id": "https://example.com/s",
            "$defs": {"X": {"type": "string"}},
            "definitions": {"Y": {"type": "string"}},
            "propertyNames": {"pattern": "^a"},
            "patternProperties": {"^x": {"type": "string"}},
            "type": "object",
            "properties": {"a": {"type": "string"}},
            "required": ["a"]
        }));
        for keyword in super::REMOVED_KEYWORDS {
            assert!(out.get(keyword).is_none(), "{keyword} should be removed");
        }
        assert!(out.pointer("/properties/a").is_some());
    }

    #[test]
    fn every_required_name_exists_in_properties_after_normalization() {
        let out = normalize(json!({
            "type": "object",
            "allOf": [{"properties": {"a": {"type": "string"}}, "required": ["a", "zombie"]}],
            "properties": {
                "nested": {
                    "type": "object",
                    "properties": {"x": {"type": ["string", "null"]}},
                    "required": ["x", "phantom"]
                }
            },
            "required": ["nested", "missing"]
        }));

        fn check(node: &Value) {
            if let Value::Object(map) = node {
                if let (Some(required), Some(properties)) = (
                    map.get("required").and_then(Value::as_array),
                    map.get("properties").and_then(Value::as_object),
                ) {
                    for name in required {
                        let name = name.as_str().unwrap();
                        assert!(properties.contains_key(name), "required {name} has no property");
                    }
                }
            }
            match node {
                Value::Object(map) => map.values().for_each(check),
                Value::Array(items) => items.iter().for_each(check),
                _ => {}
            }
        }
        check(&out);
    }
}
