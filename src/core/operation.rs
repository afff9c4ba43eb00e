use std::fmt;

use super::model::ModelNode;

/// Name of the operation that creates a resource.
pub const ADD: &str = "add";
/// Name of the operation that describes a resource as a list of add operations.
pub const DESCRIBE: &str = "describe";
/// Address key of a subsystem resource.
pub const SUBSYSTEM: &str = "subsystem";
/// Field of a generic operation node holding the operation name.
pub const OP: &str = "operation";
/// Field of a generic operation node holding the target address.
pub const OP_ADDR: &str = "address";

/// One `(type, name)` step of a resource address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathElement {
    pub key: String,
    pub value: String,
}

impl PathElement {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Address of a resource, from the root of the management model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathAddress(Vec<PathElement>);

impl PathAddress {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn append(mut self, element: PathElement) -> Self {
        self.0.push(element);
        self
    }

    pub fn elements(&self) -> &[PathElement] {
        &self.0
    }

    pub fn last(&self) -> Option<&PathElement> {
        self.0.last()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Generic form: a list of single-field objects, e.g. `[{"subsystem": "ee"}]`.
    pub fn to_model_node(&self) -> ModelNode {
        let mut list = ModelNode::list();
        for element in &self.0 {
            let mut step = ModelNode::new();
            step.set(&element.key, element.value.as_str());
            list.push(step);
        }
        list
    }
}

impl fmt::Display for PathAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for element in &self.0 {
            write!(f, "/{}", element)?;
        }
        if self.0.is_empty() {
            f.write_str("/")?;
        }
        Ok(())
    }
}

/// An instruction to perform `operation` at `address` with `parameters`.
///
/// Parameters are always an object node; absent parameters are simply not
/// present in it.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelUpdate {
    operation: String,
    address: PathAddress,
    parameters: ModelNode,
}

impl ModelUpdate {
    pub fn new(operation: &str, address: PathAddress) -> Self {
        Self {
            operation: operation.to_string(),
            address,
            parameters: ModelNode::object(),
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn address(&self) -> &PathAddress {
        &self.address
    }

    pub fn parameters(&self) -> &ModelNode {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&ModelNode> {
        self.parameters.get(name)
    }

    pub fn has_defined(&self, name: &str) -> bool {
        self.parameters.has_defined(name)
    }

    /// Sets parameter `name`, replacing any previous value.
    pub fn set_parameter<V: Into<ModelNode>>(&mut self, name: &str, value: V) -> &mut Self {
        self.parameters.set(name, value);
        self
    }

    /// Generic operation node: `{"operation": .., "address": [..], ..parameters}`.
    pub fn to_model_node(&self) -> ModelNode {
        let mut node = ModelNode::new();
        node.set(OP, self.operation.as_str());
        node.set(OP_ADDR, self.address.to_model_node());
        if let ModelNode::Object(fields) = &self.parameters {
            for (key, value) in fields {
                node.set(key, value.clone());
            }
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subsystem_address() -> PathAddress {
        PathAddress::empty().append(PathElement::new(SUBSYSTEM, "ee"))
    }

    #[test]
    fn address_display() {
        assert_eq!(subsystem_address().to_string(), "/subsystem=ee");
        assert_eq!(PathAddress::empty().to_string(), "/");
    }

    #[test]
    fn new_update_has_empty_parameters() {
        let update = ModelUpdate::new(ADD, subsystem_address());

        assert_eq!(update.operation(), "add");
        assert_eq!(update.parameters(), &ModelNode::object());
        assert!(!update.has_defined("global-modules"));
    }

    #[test]
    fn generic_node_contains_operation_address_and_parameters() {
        let mut update = ModelUpdate::new(ADD, subsystem_address());
        update.set_parameter("ear-subdeployments-isolated", false);

        let node = update.to_model_node();

        assert_eq!(
            node.to_json_string().unwrap(),
            r#"{"operation":"add","address":[{"subsystem":"ee"}],"ear-subdeployments-isolated":false}"#
        );
    }
}
