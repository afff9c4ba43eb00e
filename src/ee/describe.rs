use log::debug;

use crate::core::extension::{OperationContext, OperationStepHandler};
use crate::core::model::ModelNode;
use crate::core::operation::ModelUpdate;
use crate::error::Result;

use super::{create_add_operation, EAR_SUBDEPLOYMENTS_ISOLATED, GLOBAL_MODULES};

const FIELDS: [&str; 2] = [GLOBAL_MODULES, EAR_SUBDEPLOYMENTS_ISOLATED];

/// Projects a subsystem model onto the `add` operation that recreates it.
///
/// Only defined fields are copied.
///
/// # Examples
///
/// ```
/// use ee_subsystem::core::model::ModelNode;
/// use ee_subsystem::ee::describe;
///
/// let mut model = ModelNode::new();
/// model
///     .set("ear-subdeployments-isolated", true)
///     .set("global-modules", ModelNode::Undefined);
///
/// let add = describe(&model);
/// assert_eq!(add.parameters().keys(), vec!["ear-subdeployments-isolated"]);
/// ```
pub fn describe(model: &ModelNode) -> ModelUpdate {
    let mut add = create_add_operation();
    for field in FIELDS {
        if let Some(value) = model.get(field).filter(|value| value.is_defined()) {
            add.set_parameter(field, value.clone());
        }
    }
    add
}

/// The `describe` operation: reports the subsystem as the list of operations
/// that recreate it.
#[derive(Debug, Clone, Copy, Default)]
pub struct EeSubsystemDescribeHandler;

impl OperationStepHandler for EeSubsystemDescribeHandler {
    fn execute(&self, context: &mut dyn OperationContext, _operation: &ModelUpdate) -> Result<()> {
        let add = describe(&context.read_model());
        debug!("Described EE subsystem as {}", add.to_model_node());
        context.add_result(add.to_model_node());
        context.complete_step();
        Ok(())
    }
}

/// The `add` operation: stores the defined parameters in the subsystem model.
#[derive(Debug, Clone, Copy, Default)]
pub struct EeSubsystemAddHandler;

impl OperationStepHandler for EeSubsystemAddHandler {
    fn execute(&self, context: &mut dyn OperationContext, operation: &ModelUpdate) -> Result<()> {
        let mut model = context.read_model();
        for field in FIELDS {
            if let Some(value) = operation.parameter(field).filter(|value| value.is_defined()) {
                model.set(field, value.clone());
            }
        }
        if !model.is_defined() {
            model = ModelNode::object();
        }
        context.write_model(model);
        context.complete_step();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::extension::ModelContext;
    use crate::core::operation::ADD;

    fn populated_model() -> ModelNode {
        let mut module = ModelNode::new();
        module.set("name", "org.jboss.logging").set("slot", "main");
        let mut model = ModelNode::new();
        model
            .set(GLOBAL_MODULES, vec![module])
            .set(EAR_SUBDEPLOYMENTS_ISOLATED, true);
        model
    }

    #[test]
    fn describe_copies_defined_fields() {
        let add = describe(&populated_model());

        assert_eq!(add.operation(), ADD);
        assert_eq!(add.parameters(), &populated_model());
    }

    #[test]
    fn describe_of_empty_model_has_no_parameters() {
        assert!(describe(&ModelNode::new()).parameters().keys().is_empty());
    }

    #[test]
    fn describe_handler_adds_result_and_completes() {
        let mut context = ModelContext::new(populated_model());

        EeSubsystemDescribeHandler
            .execute(&mut context, &create_add_operation())
            .unwrap();

        assert!(context.is_completed());
        assert_eq!(context.results(), &[describe(&populated_model()).to_model_node()]);
    }

    #[test]
    fn add_handler_populates_model() {
        let mut operation = create_add_operation();
        operation.set_parameter(EAR_SUBDEPLOYMENTS_ISOLATED, false);
        let mut context = ModelContext::default();

        EeSubsystemAddHandler.execute(&mut context, &operation).unwrap();

        let mut expected = ModelNode::new();
        expected.set(EAR_SUBDEPLOYMENTS_ISOLATED, false);
        assert_eq!(context.model(), &expected);
        assert!(context.is_completed());
    }

    #[test]
    fn add_handler_without_parameters_defines_an_empty_model() {
        let mut context = ModelContext::default();

        EeSubsystemAddHandler
            .execute(&mut context, &create_add_operation())
            .unwrap();

        assert_eq!(context.model(), &ModelNode::object());
    }
}
