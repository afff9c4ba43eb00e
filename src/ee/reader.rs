use std::collections::HashSet;

use log::debug;

use crate::core::extension::XmlElementReader;
use crate::core::model::ModelNode;
use crate::core::operation::ModelUpdate;
use crate::error::Result;
use crate::xml::parse_utils::{
    duplicate_attribute, duplicate_element, invalid_value, missing_required,
    require_no_attributes, require_no_content, require_no_namespace_attribute,
    unexpected_attribute, unexpected_element, unexpected_namespace,
};
use crate::xml::{TagEvent, XmlEventStream};

use super::schema::{Attribute, Element, Namespace};
use super::{create_add_operation, DEFAULT_SLOT, EAR_SUBDEPLOYMENTS_ISOLATED, GLOBAL_MODULES, NAME, SLOT};

/// How the text of a boolean element is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BooleanParsing {
    /// Only `true` and `false` are accepted.
    #[default]
    Strict,
    /// `true` in any case is true, any other non-empty text is false.
    Lenient,
}

/// Builder for [`EeSubsystemReader`].
///
/// # Examples
///
/// ```
/// use ee_subsystem::core::extension::XmlElementReader;
/// use ee_subsystem::ee::{BooleanParsing, EeSubsystemReaderBuilder};
/// use ee_subsystem::xml::{XmlEventStream, XmlStreamReaderBuilder};
///
/// let xml = r#"<subsystem xmlns="urn:jboss:domain:ee:1.0">
///     <ear-subdeployments-isolated>yes</ear-subdeployments-isolated>
/// </subsystem>"#;
/// let mut reader = XmlStreamReaderBuilder::new().from_str(xml);
/// reader.next_tag().unwrap();
///
/// let parser = EeSubsystemReaderBuilder::new()
///     .boolean_parsing(BooleanParsing::Lenient)
///     .build();
/// let mut updates = Vec::new();
/// parser.read_element(&mut reader, &mut updates).unwrap();
///
/// assert_eq!(
///     updates[0].parameter("ear-subdeployments-isolated").and_then(|v| v.as_bool()),
///     Some(false)
/// );
/// ```
#[derive(Debug, Default)]
pub struct EeSubsystemReaderBuilder {
    boolean_parsing: BooleanParsing,
}

impl EeSubsystemReaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boolean_parsing(mut self, boolean_parsing: BooleanParsing) -> Self {
        self.boolean_parsing = boolean_parsing;
        self
    }

    pub fn build(self) -> EeSubsystemReader {
        EeSubsystemReader {
            boolean_parsing: self.boolean_parsing,
        }
    }
}

/// Reads a `<subsystem>` element of the EE namespace into a single `add`
/// operation.
///
/// Both child elements are optional and may appear at most once, in any
/// order. Fields whose element is absent are left out of the operation.
#[derive(Debug, Clone, Default)]
pub struct EeSubsystemReader {
    boolean_parsing: BooleanParsing,
}

impl XmlElementReader for EeSubsystemReader {
    fn read_element(
        &self,
        reader: &mut dyn XmlEventStream,
        updates: &mut Vec<ModelUpdate>,
    ) -> Result<()> {
        require_no_attributes(reader)?;

        let mut add = create_add_operation();
        let mut seen = HashSet::new();

        while reader.has_next() && reader.next_tag()? != TagEvent::End {
            let namespace = Namespace::for_uri(reader.namespace_uri());
            if !namespace.is_known() {
                return Err(unexpected_namespace(reader));
            }
            let element = Element::for_name(namespace, reader.local_name())
                .ok_or_else(|| unexpected_element(reader))?;
            if !seen.insert(element) {
                return Err(duplicate_element(reader));
            }
            debug!("Reading element '{}'", element.local_name());

            match element {
                Element::GlobalModules => {
                    let modules = parse_global_modules(reader)?;
                    add.set_parameter(GLOBAL_MODULES, modules);
                }
                Element::EarSubdeploymentsIsolated => {
                    let isolated = self.parse_boolean(reader)?;
                    add.set_parameter(EAR_SUBDEPLOYMENTS_ISOLATED, isolated);
                }
                Element::Module => return Err(unexpected_element(reader)),
            }
        }

        updates.push(add);
        Ok(())
    }
}

impl EeSubsystemReader {
    fn parse_boolean(&self, reader: &mut dyn XmlEventStream) -> Result<bool> {
        require_no_attributes(reader)?;
        let element = reader.local_name().to_string();
        let text = reader.element_text()?;
        let value = text.trim();
        if value.is_empty() {
            return Err(invalid_value(reader, &element, &text));
        }
        match self.boolean_parsing {
            BooleanParsing::Strict => match value {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(invalid_value(reader, &element, value)),
            },
            BooleanParsing::Lenient => Ok(value.eq_ignore_ascii_case("true")),
        }
    }
}

/// Reads `<module>` children in document order. An empty container yields an
/// empty list.
fn parse_global_modules(reader: &mut dyn XmlEventStream) -> Result<ModelNode> {
    require_no_attributes(reader)?;

    let mut modules = ModelNode::list();
    while reader.next_tag()? != TagEvent::End {
        let namespace = Namespace::for_uri(reader.namespace_uri());
        if !namespace.is_known() {
            return Err(unexpected_namespace(reader));
        }
        match Element::for_name(namespace, reader.local_name()) {
            Some(Element::Module) => {
                modules.push(parse_module(reader)?);
            }
            _ => return Err(unexpected_element(reader)),
        }
    }
    Ok(modules)
}

fn parse_module(reader: &mut dyn XmlEventStream) -> Result<ModelNode> {
    let mut name = None;
    let mut slot = None;

    for index in 0..reader.attribute_count() {
        require_no_namespace_attribute(reader, index)?;
        let Some((local_name, value)) = reader
            .attribute(index)
            .map(|attribute| (attribute.local_name.clone(), attribute.value.clone()))
        else {
            break;
        };
        match Attribute::for_name(&local_name) {
            Some(Attribute::Name) if name.is_none() => name = Some(value),
            Some(Attribute::Slot) if slot.is_none() => slot = Some(value),
            Some(_) => return Err(duplicate_attribute(reader, index)),
            None => return Err(unexpected_attribute(reader, index)),
        }
    }

    let name = name.ok_or_else(|| missing_required(reader, &[Attribute::Name.local_name()]))?;
    let slot = slot.unwrap_or_else(|| DEFAULT_SLOT.to_string());
    require_no_content(reader)?;

    let mut module = ModelNode::new();
    module.set(NAME, name).set(SLOT, slot);
    Ok(module)
}
