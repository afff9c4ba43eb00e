use std::fmt;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::Result;

/// A dynamically typed configuration tree.
///
/// A node is either undefined, a scalar, an ordered object of uniquely named
/// fields, or an ordered list. Objects compare equal when they hold the same
/// fields with equal values, regardless of field order.
///
/// # Examples
///
/// ```
/// use ee_subsystem::core::model::ModelNode;
///
/// let mut module = ModelNode::new();
/// module.set("name", "org.jboss.logging");
/// module.set("slot", "main");
///
/// let mut modules = ModelNode::new();
/// modules.push(module);
///
/// assert_eq!(modules.as_list().unwrap().len(), 1);
/// assert_eq!(
///     modules.as_list().unwrap()[0].get("slot").and_then(ModelNode::as_str),
///     Some("main")
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub enum ModelNode {
    #[default]
    Undefined,
    Boolean(bool),
    Int(i64),
    Double(f64),
    String(String),
    Object(Vec<(String, ModelNode)>),
    List(Vec<ModelNode>),
}

impl ModelNode {
    /// Creates an undefined node.
    pub fn new() -> Self {
        ModelNode::Undefined
    }

    /// Creates an empty object node.
    pub fn object() -> Self {
        ModelNode::Object(Vec::new())
    }

    /// Creates an empty list node.
    pub fn list() -> Self {
        ModelNode::List(Vec::new())
    }

    pub fn is_defined(&self) -> bool {
        !matches!(self, ModelNode::Undefined)
    }

    /// Returns the field `name` of an object node.
    pub fn get(&self, name: &str) -> Option<&ModelNode> {
        match self {
            ModelNode::Object(fields) => fields
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    /// Returns true if this is an object holding a defined field `name`.
    pub fn has_defined(&self, name: &str) -> bool {
        self.get(name).is_some_and(ModelNode::is_defined)
    }

    /// Sets the field `name`, replacing an existing value in place.
    ///
    /// An undefined node (or any scalar or list) becomes an object first.
    pub fn set<V: Into<ModelNode>>(&mut self, name: &str, value: V) -> &mut Self {
        let value = value.into();
        if !matches!(self, ModelNode::Object(_)) {
            *self = ModelNode::object();
        }
        if let ModelNode::Object(fields) = self {
            match fields.iter_mut().find(|(key, _)| key == name) {
                Some((_, existing)) => *existing = value,
                None => fields.push((name.to_string(), value)),
            }
        }
        self
    }

    /// Appends `value`, turning a non-list node into an empty list first.
    pub fn push<V: Into<ModelNode>>(&mut self, value: V) -> &mut Self {
        if !matches!(self, ModelNode::List(_)) {
            *self = ModelNode::list();
        }
        if let ModelNode::List(items) = self {
            items.push(value.into());
        }
        self
    }

    /// Field names of an object node in insertion order.
    pub fn keys(&self) -> Vec<&str> {
        match self {
            ModelNode::Object(fields) => fields.iter().map(|(key, _)| key.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    pub fn as_list(&self) -> Option<&[ModelNode]> {
        match self {
            ModelNode::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ModelNode::String(value) => Some(value),
            _ => None,
        }
    }

    /// Boolean view of the node. Strings `"true"` and `"false"` convert
    /// (ignoring case), every other kind yields `None`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ModelNode::Boolean(value) => Some(*value),
            ModelNode::String(value) if value.eq_ignore_ascii_case("true") => Some(true),
            ModelNode::String(value) if value.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }

    /// Serializes the node as compact JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a JSON document into a node. Object field order follows
    /// `serde_json`'s map ordering.
    pub fn from_json_str(json: &str) -> Result<ModelNode> {
        let value: Value = serde_json::from_str(json)?;
        Ok(ModelNode::from(value))
    }
}

impl PartialEq for ModelNode {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ModelNode::Undefined, ModelNode::Undefined) => true,
            (ModelNode::Boolean(a), ModelNode::Boolean(b)) => a == b,
            (ModelNode::Int(a), ModelNode::Int(b)) => a == b,
            (ModelNode::Double(a), ModelNode::Double(b)) => a == b,
            (ModelNode::String(a), ModelNode::String(b)) => a == b,
            (ModelNode::List(a), ModelNode::List(b)) => a == b,
            (ModelNode::Object(a), ModelNode::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(key, value)| other.get(key).is_some_and(|v| v == value))
                    && b.iter().all(|(key, _)| self.get(key).is_some())
            }
            _ => false,
        }
    }
}

impl Serialize for ModelNode {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ModelNode::Undefined => serializer.serialize_none(),
            ModelNode::Boolean(value) => serializer.serialize_bool(*value),
            ModelNode::Int(value) => serializer.serialize_i64(*value),
            ModelNode::Double(value) => serializer.serialize_f64(*value),
            ModelNode::String(value) => serializer.serialize_str(value),
            ModelNode::Object(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (key, value) in fields {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            ModelNode::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

impl fmt::Display for ModelNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl From<Value> for ModelNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ModelNode::Undefined,
            Value::Bool(value) => ModelNode::Boolean(value),
            Value::Number(number) => match number.as_i64() {
                Some(value) => ModelNode::Int(value),
                None => ModelNode::Double(number.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(value) => ModelNode::String(value),
            Value::Array(items) => ModelNode::List(items.into_iter().map(ModelNode::from).collect()),
            Value::Object(fields) => ModelNode::Object(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, ModelNode::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for ModelNode {
    fn from(value: bool) -> Self {
        ModelNode::Boolean(value)
    }
}

impl From<i64> for ModelNode {
    fn from(value: i64) -> Self {
        ModelNode::Int(value)
    }
}

impl From<f64> for ModelNode {
    fn from(value: f64) -> Self {
        ModelNode::Double(value)
    }
}

impl From<&str> for ModelNode {
    fn from(value: &str) -> Self {
        ModelNode::String(value.to_string())
    }
}

impl From<String> for ModelNode {
    fn from(value: String) -> Self {
        ModelNode::String(value)
    }
}

impl From<Vec<ModelNode>> for ModelNode {
    fn from(items: Vec<ModelNode>) -> Self {
        ModelNode::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(name: &str, slot: &str) -> ModelNode {
        let mut node = ModelNode::new();
        node.set("name", name).set("slot", slot);
        node
    }

    #[test]
    fn set_replaces_existing_field_in_place() {
        let mut node = ModelNode::new();
        node.set("a", 1i64).set("b", 2i64).set("a", 3i64);

        assert_eq!(node.keys(), vec!["a", "b"]);
        assert_eq!(node.get("a"), Some(&ModelNode::Int(3)));
    }

    #[test]
    fn has_defined_ignores_undefined_fields() {
        let mut node = ModelNode::new();
        node.set("flag", ModelNode::Undefined);

        assert!(node.get("flag").is_some());
        assert!(!node.has_defined("flag"));
        assert!(!node.has_defined("missing"));
    }

    #[test]
    fn object_equality_ignores_field_order() {
        let mut left = ModelNode::new();
        left.set("x", true).set("y", "value");
        let mut right = ModelNode::new();
        right.set("y", "value").set("x", true);

        assert_eq!(left, right);

        right.set("z", 1i64);
        assert_ne!(left, right);
    }

    #[test]
    fn list_equality_respects_order() {
        let first: ModelNode = vec![module("a", "main"), module("b", "main")].into();
        let second: ModelNode = vec![module("b", "main"), module("a", "main")].into();

        assert_ne!(first, second);
    }

    #[test]
    fn as_bool_accepts_boolean_strings() {
        assert_eq!(ModelNode::Boolean(false).as_bool(), Some(false));
        assert_eq!(ModelNode::from("TRUE").as_bool(), Some(true));
        assert_eq!(ModelNode::from("no").as_bool(), None);
        assert_eq!(ModelNode::Int(1).as_bool(), None);
    }

    #[test]
    fn json_projection_preserves_insertion_order() {
        let mut node = ModelNode::new();
        node.set("ear-subdeployments-isolated", true);
        node.set("global-modules", vec![module("a", "main")]);
        node.set("missing", ModelNode::Undefined);

        assert_eq!(
            node.to_json_string().unwrap(),
            r#"{"ear-subdeployments-isolated":true,"global-modules":[{"name":"a","slot":"main"}],"missing":null}"#
        );
        assert_eq!(node.to_string(), node.to_json_string().unwrap());
    }

    #[test]
    fn from_json_builds_equal_tree() {
        let parsed =
            ModelNode::from_json_str(r#"{"global-modules":[{"slot":"main","name":"a"}],"n":1.5}"#)
                .unwrap();

        let mut expected = ModelNode::new();
        expected.set("n", 1.5f64);
        expected.set("global-modules", vec![module("a", "main")]);

        assert_eq!(parsed, expected);
    }

    #[test]
    fn invalid_json_is_reported() {
        let result = ModelNode::from_json_str("{not json");
        assert!(matches!(
            result,
            Err(crate::error::SubsystemError::Json(_))
        ));
    }
}
