//! The `ee` subsystem: XML reader and writer, describe and add operations,
//! and the [`EeExtension`] that registers them with an
//! [`ExtensionRegistry`].
//!
//! # Examples
//!
//! ```
//! use ee_subsystem::core::extension::ExtensionRegistry;
//! use ee_subsystem::core::model::ModelNode;
//! use ee_subsystem::ee::{EeExtension, SUBSYSTEM_NAME};
//! use ee_subsystem::xml::XmlStreamWriterBuilder;
//!
//! let mut registry = ExtensionRegistry::new();
//! registry.load(&EeExtension);
//!
//! let mut model = ModelNode::new();
//! model.set("ear-subdeployments-isolated", true);
//!
//! let mut writer = XmlStreamWriterBuilder::new().from_writer(Vec::new());
//! registry.marshal_subsystem(SUBSYSTEM_NAME, &model, &mut writer).unwrap();
//!
//! assert_eq!(
//!     String::from_utf8(writer.into_inner()).unwrap(),
//!     "<subsystem xmlns=\"urn:jboss:domain:ee:1.0\">\
//!      <ear-subdeployments-isolated>true</ear-subdeployments-isolated>\
//!      </subsystem>"
//! );
//! ```

pub mod describe;
pub mod reader;
pub mod schema;
pub mod writer;

use std::sync::Arc;

use log::debug;

use crate::core::extension::{EntryType, Extension, ExtensionRegistry};
use crate::core::operation::{ModelUpdate, PathAddress, PathElement, ADD, DESCRIBE, SUBSYSTEM};

pub use describe::{describe, EeSubsystemAddHandler, EeSubsystemDescribeHandler};
pub use reader::{BooleanParsing, EeSubsystemReader, EeSubsystemReaderBuilder};
pub use writer::EeSubsystemWriter;

pub const SUBSYSTEM_NAME: &str = "ee";
pub const NAMESPACE: &str = "urn:jboss:domain:ee:1.0";

/// Model field holding the list of global module references.
pub const GLOBAL_MODULES: &str = "global-modules";
/// Model field holding the EAR sub-deployment isolation flag.
pub const EAR_SUBDEPLOYMENTS_ISOLATED: &str = "ear-subdeployments-isolated";
pub const NAME: &str = "name";
pub const SLOT: &str = "slot";
/// Slot of a module reference that does not name one.
pub const DEFAULT_SLOT: &str = "main";

const ADD_DESCRIPTION: &str = "Adds the EE subsystem";
const DESCRIBE_DESCRIPTION: &str = "Describes the EE subsystem as the operations that recreate it";

/// `/subsystem=ee`
pub fn subsystem_address() -> PathAddress {
    PathAddress::empty().append(PathElement::new(SUBSYSTEM, SUBSYSTEM_NAME))
}

/// An `add` operation for the subsystem, without parameters.
pub fn create_add_operation() -> ModelUpdate {
    ModelUpdate::new(ADD, subsystem_address())
}

/// Registers the `ee` subsystem with a host registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct EeExtension;

impl Extension for EeExtension {
    fn initialize(&self, registry: &mut ExtensionRegistry) {
        debug!("Initializing EE subsystem extension");
        registry
            .register_subsystem(SUBSYSTEM_NAME)
            .register_operation_handler(
                ADD,
                Arc::new(EeSubsystemAddHandler),
                ADD_DESCRIPTION,
                EntryType::Public,
            )
            .register_operation_handler(
                DESCRIBE,
                Arc::new(EeSubsystemDescribeHandler),
                DESCRIBE_DESCRIPTION,
                EntryType::Private,
            )
            .register_xml_element_writer(Arc::new(EeSubsystemWriter));
    }

    fn initialize_parsers(&self, registry: &mut ExtensionRegistry) {
        registry.set_subsystem_xml_mapping(NAMESPACE, Arc::new(EeSubsystemReader::default()));
    }
}
