use log::debug;

use crate::core::extension::{MarshallingContext, XmlElementWriter};
use crate::core::model::ModelNode;
use crate::error::{Result, SubsystemError};
use crate::xml::{Location, XmlEventSink};

use super::schema::{Attribute, Element};
use super::{EAR_SUBDEPLOYMENTS_ISOLATED, GLOBAL_MODULES, NAME, NAMESPACE, SLOT};

/// Writes the EE subsystem model as a `<subsystem>` element.
///
/// `ear-subdeployments-isolated` is written before `global-modules`, and
/// undefined fields are omitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct EeSubsystemWriter;

impl XmlElementWriter for EeSubsystemWriter {
    fn write_content(
        &self,
        writer: &mut dyn XmlEventSink,
        context: &MarshallingContext<'_>,
    ) -> Result<()> {
        // Nothing reaches the sink until the whole snapshot is valid.
        let content = SubsystemContent::from_model(context.model_node())?;
        debug!("Writing EE subsystem");
        context.start_subsystem_element(writer, NAMESPACE)?;

        if let Some(isolated) = content.ear_subdeployments_isolated {
            writer.write_start_element(None, Element::EarSubdeploymentsIsolated.local_name())?;
            writer.write_characters(if isolated { "true" } else { "false" })?;
            writer.write_end_element()?;
        }
        if let Some(modules) = content.global_modules {
            writer.write_start_element(None, Element::GlobalModules.local_name())?;
            for module in modules {
                writer.write_start_element(None, Element::Module.local_name())?;
                writer.write_attribute(Attribute::Name.local_name(), module.name)?;
                writer.write_attribute(Attribute::Slot.local_name(), module.slot)?;
                writer.write_end_element()?;
            }
            writer.write_end_element()?;
        }

        writer.write_end_element()
    }
}

struct ModuleRef<'a> {
    name: &'a str,
    slot: &'a str,
}

/// Validated view of the model fields that are written.
struct SubsystemContent<'a> {
    ear_subdeployments_isolated: Option<bool>,
    global_modules: Option<Vec<ModuleRef<'a>>>,
}

impl<'a> SubsystemContent<'a> {
    fn from_model(model: &'a ModelNode) -> Result<Self> {
        let ear_subdeployments_isolated = defined(model, EAR_SUBDEPLOYMENTS_ISOLATED)
            .map(|value| {
                value
                    .as_bool()
                    .ok_or_else(|| invalid(Element::EarSubdeploymentsIsolated, value))
            })
            .transpose()?;

        let global_modules = defined(model, GLOBAL_MODULES)
            .map(|modules| {
                modules
                    .as_list()
                    .ok_or_else(|| invalid(Element::GlobalModules, modules))?
                    .iter()
                    .map(module_ref)
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?;

        Ok(Self {
            ear_subdeployments_isolated,
            global_modules,
        })
    }
}

fn defined<'a>(model: &'a ModelNode, name: &str) -> Option<&'a ModelNode> {
    model.get(name).filter(|value| value.is_defined())
}

fn invalid(element: Element, value: &ModelNode) -> SubsystemError {
    SubsystemError::InvalidValue {
        element: element.local_name().to_string(),
        value: value.to_string(),
        location: Location::default(),
    }
}

/// A defined attribute value must be a string.
fn module_attribute<'a>(item: &'a ModelNode, name: &str) -> Result<Option<&'a str>> {
    match defined(item, name) {
        Some(value) => value
            .as_str()
            .map(Some)
            .ok_or_else(|| invalid(Element::Module, value)),
        None => Ok(None),
    }
}

fn module_ref(item: &ModelNode) -> Result<ModuleRef<'_>> {
    let name = module_attribute(item, NAME)?;
    let slot = module_attribute(item, SLOT)?;
    match (name, slot) {
        (Some(name), Some(slot)) => Ok(ModuleRef { name, slot }),
        _ => {
            let missing = [(Attribute::Name, name), (Attribute::Slot, slot)]
                .into_iter()
                .filter(|(_, value)| value.is_none())
                .map(|(attribute, _)| attribute.local_name().to_string())
                .collect();
            Err(SubsystemError::MissingRequiredAttribute {
                names: missing,
                location: Location::default(),
            })
        }
    }
}
