use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;

use crate::error::{Result, SubsystemError};
use crate::xml::parse_utils::{unexpected_element, unexpected_namespace};
use crate::xml::{TagEvent, XmlEventSink, XmlEventStream};

use super::model::ModelNode;
use super::operation::{ModelUpdate, SUBSYSTEM};

/// Reads one subsystem element into model updates.
///
/// The stream is positioned on the subsystem's start tag when called, and
/// must be left on its matching end tag.
pub trait XmlElementReader {
    fn read_element(
        &self,
        reader: &mut dyn XmlEventStream,
        updates: &mut Vec<ModelUpdate>,
    ) -> Result<()>;
}

/// Writes a subsystem model as XML.
pub trait XmlElementWriter {
    fn write_content(
        &self,
        writer: &mut dyn XmlEventSink,
        context: &MarshallingContext<'_>,
    ) -> Result<()>;
}

/// Access to the management model while an operation executes.
pub trait OperationContext {
    /// Snapshot of the model of the addressed resource.
    fn read_model(&self) -> ModelNode;

    /// Replaces the model of the addressed resource.
    fn write_model(&mut self, model: ModelNode);

    fn add_result(&mut self, result: ModelNode);

    /// Signals that the handler has finished its work.
    fn complete_step(&mut self);
}

/// Body of a management operation.
pub trait OperationStepHandler {
    fn execute(&self, context: &mut dyn OperationContext, operation: &ModelUpdate) -> Result<()>;
}

/// Hook through which a subsystem plugs itself into the registry.
pub trait Extension {
    /// Registers the subsystem, its operations and its XML writer.
    fn initialize(&self, registry: &mut ExtensionRegistry);

    /// Maps the subsystem namespaces to their XML readers.
    fn initialize_parsers(&self, registry: &mut ExtensionRegistry);
}

/// Model snapshot handed to an [`XmlElementWriter`].
pub struct MarshallingContext<'a> {
    model: &'a ModelNode,
}

impl<'a> MarshallingContext<'a> {
    pub fn new(model: &'a ModelNode) -> Self {
        Self { model }
    }

    pub fn model_node(&self) -> &ModelNode {
        self.model
    }

    /// Opens the `<subsystem>` element bound to `namespace`.
    pub fn start_subsystem_element(
        &self,
        writer: &mut dyn XmlEventSink,
        namespace: &str,
    ) -> Result<()> {
        writer.write_start_element(Some(namespace), SUBSYSTEM)
    }
}

/// Visibility of a registered operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    Public,
    /// Used internally by the host, hidden from clients.
    Private,
}

struct OperationEntry {
    handler: Arc<dyn OperationStepHandler>,
    description: String,
    entry_type: EntryType,
}

#[derive(Default)]
struct SubsystemEntry {
    operations: BTreeMap<String, OperationEntry>,
    writer: Option<Arc<dyn XmlElementWriter>>,
}

/// Registration handle returned by [`ExtensionRegistry::register_subsystem`].
pub struct SubsystemRegistration<'a> {
    name: String,
    entry: &'a mut SubsystemEntry,
}

impl SubsystemRegistration<'_> {
    pub fn register_operation_handler(
        &mut self,
        operation: &str,
        handler: Arc<dyn OperationStepHandler>,
        description: &str,
        entry_type: EntryType,
    ) -> &mut Self {
        debug!(
            "Registering operation '{}' ({:?}) for subsystem '{}'",
            operation, entry_type, self.name
        );
        self.entry.operations.insert(
            operation.to_string(),
            OperationEntry {
                handler,
                description: description.to_string(),
                entry_type,
            },
        );
        self
    }

    pub fn register_xml_element_writer(&mut self, writer: Arc<dyn XmlElementWriter>) -> &mut Self {
        debug!("Registering XML writer for subsystem '{}'", self.name);
        self.entry.writer = Some(writer);
        self
    }
}

/// In-process host for subsystem extensions.
///
/// Holds the operation handlers and XML writer of each registered subsystem,
/// and the XML reader mapped to each namespace.
///
/// # Examples
///
/// ```
/// use ee_subsystem::core::extension::ExtensionRegistry;
/// use ee_subsystem::ee::EeExtension;
/// use ee_subsystem::xml::XmlStreamReaderBuilder;
///
/// let mut registry = ExtensionRegistry::new();
/// registry.load(&EeExtension);
///
/// let xml = r#"<subsystem xmlns="urn:jboss:domain:ee:1.0">
///     <ear-subdeployments-isolated>false</ear-subdeployments-isolated>
/// </subsystem>"#;
/// let mut reader = XmlStreamReaderBuilder::new().from_str(xml);
/// let updates = registry.parse_subsystem(&mut reader).unwrap();
///
/// assert_eq!(updates.len(), 1);
/// assert_eq!(updates[0].operation(), "add");
/// ```
#[derive(Default)]
pub struct ExtensionRegistry {
    subsystems: BTreeMap<String, SubsystemEntry>,
    xml_mappings: BTreeMap<String, Arc<dyn XmlElementReader>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs both initialization phases of `extension`.
    pub fn load(&mut self, extension: &dyn Extension) {
        extension.initialize(self);
        extension.initialize_parsers(self);
    }

    pub fn register_subsystem(&mut self, name: &str) -> SubsystemRegistration<'_> {
        debug!("Registering subsystem '{}'", name);
        SubsystemRegistration {
            name: name.to_string(),
            entry: self.subsystems.entry(name.to_string()).or_default(),
        }
    }

    pub fn set_subsystem_xml_mapping(&mut self, namespace: &str, reader: Arc<dyn XmlElementReader>) {
        debug!("Mapping namespace '{}' to subsystem reader", namespace);
        self.xml_mappings.insert(namespace.to_string(), reader);
    }

    /// Namespaces that have a reader mapped to them.
    pub fn namespaces(&self) -> Vec<&str> {
        self.xml_mappings.keys().map(String::as_str).collect()
    }

    pub fn subsystem_names(&self) -> Vec<&str> {
        self.subsystems.keys().map(String::as_str).collect()
    }

    pub fn operation_names(&self, subsystem: &str) -> Vec<&str> {
        self.subsystems
            .get(subsystem)
            .map(|entry| entry.operations.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn operation_description(&self, subsystem: &str, operation: &str) -> Option<&str> {
        self.operation(subsystem, operation)
            .map(|entry| entry.description.as_str())
    }

    pub fn operation_entry_type(&self, subsystem: &str, operation: &str) -> Option<EntryType> {
        self.operation(subsystem, operation).map(|entry| entry.entry_type)
    }

    /// True for operations registered with [`EntryType::Private`].
    pub fn is_private(&self, subsystem: &str, operation: &str) -> bool {
        self.operation_entry_type(subsystem, operation) == Some(EntryType::Private)
    }

    fn operation(&self, subsystem: &str, operation: &str) -> Option<&OperationEntry> {
        self.subsystems.get(subsystem)?.operations.get(operation)
    }

    /// Reads the subsystem element the stream is on (or advances to the next
    /// start tag) with the reader mapped to its namespace.
    pub fn parse_subsystem(&self, reader: &mut dyn XmlEventStream) -> Result<Vec<ModelUpdate>> {
        if reader.event() != Some(TagEvent::Start) && reader.next_tag()? != TagEvent::Start {
            return Err(unexpected_element(reader));
        }
        let root = reader.local_name().to_string();
        let handler = reader
            .namespace_uri()
            .and_then(|namespace| self.xml_mappings.get(namespace))
            .cloned()
            .ok_or_else(|| unexpected_namespace(reader))?;
        debug!(
            "Parsing element '{}' in namespace '{}'",
            root,
            reader.namespace_uri().unwrap_or_default()
        );

        let mut updates = Vec::new();
        handler.read_element(reader, &mut updates)?;

        if reader.event() != Some(TagEvent::End) || reader.local_name() != root {
            return Err(SubsystemError::UnexpectedContent {
                element: root,
                location: reader.location(),
            });
        }
        debug!("Parsed {} model update(s)", updates.len());
        Ok(updates)
    }

    /// Writes `model` with the XML writer registered for `subsystem`.
    pub fn marshal_subsystem(
        &self,
        subsystem: &str,
        model: &ModelNode,
        writer: &mut dyn XmlEventSink,
    ) -> Result<()> {
        let handler = self
            .subsystems
            .get(subsystem)
            .and_then(|entry| entry.writer.clone())
            .ok_or_else(|| SubsystemError::UnknownSubsystem(subsystem.to_string()))?;
        handler.write_content(writer, &MarshallingContext::new(model))?;
        writer.flush()
    }

    /// Executes `operation` against `subsystem` with the registered handler.
    pub fn execute(
        &self,
        subsystem: &str,
        operation: &ModelUpdate,
        context: &mut dyn OperationContext,
    ) -> Result<()> {
        if !self.subsystems.contains_key(subsystem) {
            return Err(SubsystemError::UnknownSubsystem(subsystem.to_string()));
        }
        let entry = self
            .operation(subsystem, operation.operation())
            .ok_or_else(|| SubsystemError::UnknownOperation {
                subsystem: subsystem.to_string(),
                operation: operation.operation().to_string(),
            })?;
        debug!(
            "Executing '{}' at {}",
            operation.operation(),
            operation.address()
        );
        entry.handler.execute(context, operation)
    }
}

/// A self-contained [`OperationContext`] over a single resource model.
#[derive(Debug, Default)]
pub struct ModelContext {
    model: ModelNode,
    results: Vec<ModelNode>,
    completed: bool,
}

impl ModelContext {
    pub fn new(model: ModelNode) -> Self {
        Self {
            model,
            ..Self::default()
        }
    }

    pub fn model(&self) -> &ModelNode {
        &self.model
    }

    pub fn results(&self) -> &[ModelNode] {
        &self.results
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }
}

impl OperationContext for ModelContext {
    fn read_model(&self) -> ModelNode {
        self.model.clone()
    }

    fn write_model(&mut self, model: ModelNode) {
        self.model = model;
    }

    fn add_result(&mut self, result: ModelNode) {
        self.results.push(result);
    }

    fn complete_step(&mut self) {
        self.completed = true;
    }
}
