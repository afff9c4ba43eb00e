use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use log::{debug, error};
use quick_xml::encoding::Decoder;
use quick_xml::escape::{resolve_predefined_entity, EscapeError};
use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::name::{NamespaceError, ResolveResult};
use quick_xml::reader::NsReader;

use crate::error::{Result, SubsystemError};

use super::Location;

/// Kind of tag the cursor is positioned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagEvent {
    Start,
    End,
}

/// An attribute of the current start tag, with its prefix already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub namespace: Option<String>,
    pub local_name: String,
    pub value: String,
}

/// A forward-only, namespace-aware cursor over the tags of an XML document.
///
/// Namespace declarations are not reported as attributes. Empty elements are
/// reported as a start tag immediately followed by an end tag.
pub trait XmlEventStream {
    /// Returns false once the document element has been closed or the input
    /// is exhausted.
    fn has_next(&self) -> bool;

    /// Advances to the next start or end tag, skipping whitespace, comments
    /// and processing instructions. Any other character data is an error.
    fn next_tag(&mut self) -> Result<TagEvent>;

    /// The tag the cursor is positioned on, if any.
    fn event(&self) -> Option<TagEvent>;

    /// Namespace URI of the current element.
    fn namespace_uri(&self) -> Option<&str>;

    /// Local name of the current element.
    fn local_name(&self) -> &str;

    /// Number of attributes on the current start tag.
    fn attribute_count(&self) -> usize;

    fn attribute(&self, index: usize) -> Option<&XmlAttribute>;

    /// Reads the text content of the current start tag and moves to its end
    /// tag. Nested elements are rejected.
    fn element_text(&mut self) -> Result<String>;

    /// Current position in the input.
    fn location(&self) -> Location;
}

#[derive(Debug, Clone, Default)]
struct ElementName {
    namespace: Option<String>,
    local_name: String,
}

/// A builder for [`XmlStreamReader`].
///
/// # Examples
///
/// ```
/// use ee_subsystem::xml::{TagEvent, XmlEventStream, XmlStreamReaderBuilder};
///
/// let xml = r#"<module name="org.slf4j" slot="main"/>"#;
/// let mut reader = XmlStreamReaderBuilder::new()
///     .capacity(4096)
///     .from_reader(xml.as_bytes());
///
/// assert_eq!(reader.next_tag().unwrap(), TagEvent::Start);
/// assert_eq!(reader.attribute_count(), 2);
/// assert_eq!(reader.attribute(0).unwrap().value, "org.slf4j");
/// ```
pub struct XmlStreamReaderBuilder {
    capacity: usize,
}

impl Default for XmlStreamReaderBuilder {
    fn default() -> Self {
        Self { capacity: 1024 }
    }
}

impl XmlStreamReaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the buffer capacity used when reading from a file or `Read`.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn from_reader<R: Read>(self, rdr: R) -> XmlStreamReader<BufReader<R>> {
        XmlStreamReader::new(BufReader::with_capacity(self.capacity, rdr))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(self, xml: &str) -> XmlStreamReader<&[u8]> {
        XmlStreamReader::new(xml.as_bytes())
    }

    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<XmlStreamReader<BufReader<File>>> {
        let file_path = path.as_ref();
        let file = File::open(file_path).map_err(|e| {
            error!("Failed to open XML file {}: {}", file_path.display(), e);
            SubsystemError::Io(e)
        })?;
        Ok(self.from_reader(file))
    }
}

/// [`XmlEventStream`] implementation backed by `quick_xml::NsReader`.
pub struct XmlStreamReader<R> {
    reader: NsReader<R>,
    buffer: Vec<u8>,
    open: Vec<ElementName>,
    current: ElementName,
    attributes: Vec<XmlAttribute>,
    event: Option<TagEvent>,
    finished: bool,
}

impl<R: BufRead> XmlStreamReader<R> {
    pub fn new(rdr: R) -> Self {
        let mut reader = NsReader::from_reader(rdr);
        let config = reader.config_mut();
        config.expand_empty_elements = true;
        config.check_end_names = true;

        Self {
            reader,
            buffer: Vec::with_capacity(1024),
            open: Vec::new(),
            current: ElementName::default(),
            attributes: Vec::new(),
            event: None,
            finished: false,
        }
    }

    fn unexpected_content(&self) -> SubsystemError {
        SubsystemError::UnexpectedContent {
            element: self
                .open
                .last()
                .map(|name| name.local_name.clone())
                .unwrap_or_default(),
            location: self.location(),
        }
    }

    fn unexpected_eof(&mut self) -> SubsystemError {
        self.finished = true;
        SubsystemError::UnexpectedEof {
            location: self.location(),
        }
    }

    fn enter(&mut self, name: ElementName, attributes: Vec<XmlAttribute>) -> TagEvent {
        debug!("Start tag: '{}'", name.local_name);
        self.open.push(name.clone());
        self.current = name;
        self.attributes = attributes;
        self.event = Some(TagEvent::Start);
        TagEvent::Start
    }

    fn leave(&mut self) -> TagEvent {
        if let Some(name) = self.open.pop() {
            debug!("End tag: '{}'", name.local_name);
            self.current = name;
        }
        self.attributes.clear();
        self.event = Some(TagEvent::End);
        if self.open.is_empty() {
            debug!("Document element closed");
            self.finished = true;
        }
        TagEvent::End
    }
}

/// Outcome of a single read, detached from the reader's buffer.
enum Step {
    Start(ElementName, Vec<XmlAttribute>),
    End,
    Text(String),
    Eof,
    Skip,
}

impl<R: BufRead> XmlStreamReader<R> {
    /// Reads one event; any failure ends the stream.
    fn read_step(&mut self) -> Result<Step> {
        let step = self.read_event();
        if step.is_err() {
            self.finished = true;
        }
        step
    }

    fn read_event(&mut self) -> Result<Step> {
        self.buffer.clear();
        let decoder = self.reader.decoder();
        let (resolved, event) = match self.reader.read_resolved_event_into(&mut self.buffer) {
            Ok((namespace, event)) => (owned_namespace(namespace), event),
            Err(e) => {
                return Err(SubsystemError::Xml {
                    source: e,
                    location: Location::new(self.reader.error_position()),
                });
            }
        };
        let position = Location::new(self.reader.buffer_position());

        let step = match event {
            Event::Start(start) => {
                let namespace = resolved.map_err(|e| SubsystemError::Xml {
                    source: e,
                    location: position,
                })?;
                let local_name = decode(decoder, start.local_name().as_ref(), position)?;
                let attributes = read_attributes(&self.reader, decoder, &start, position)?;
                Step::Start(
                    ElementName {
                        namespace,
                        local_name,
                    },
                    attributes,
                )
            }
            Event::End(_) => Step::End,
            Event::Text(text) => Step::Text(
                text.decode()
                    .map_err(|e| SubsystemError::Xml {
                        source: e.into(),
                        location: position,
                    })?
                    .into_owned(),
            ),
            Event::CData(cdata) => Step::Text(
                cdata
                    .decode()
                    .map_err(|e| SubsystemError::Xml {
                        source: e.into(),
                        location: position,
                    })?
                    .into_owned(),
            ),
            Event::GeneralRef(reference) => Step::Text(resolve_reference(&reference, position)?),
            Event::Eof => Step::Eof,
            // Empty tags are expanded by the reader configuration.
            Event::Empty(_)
            | Event::Comment(_)
            | Event::Decl(_)
            | Event::PI(_)
            | Event::DocType(_) => Step::Skip,
        };
        Ok(step)
    }
}

impl<R: BufRead> XmlEventStream for XmlStreamReader<R> {
    fn has_next(&self) -> bool {
        !self.finished
    }

    fn next_tag(&mut self) -> Result<TagEvent> {
        if self.finished {
            return Err(self.unexpected_eof());
        }
        loop {
            match self.read_step()? {
                Step::Start(name, attributes) => return Ok(self.enter(name, attributes)),
                Step::End => return Ok(self.leave()),
                Step::Text(text) if text.trim().is_empty() => continue,
                Step::Text(_) => return Err(self.unexpected_content()),
                Step::Eof => return Err(self.unexpected_eof()),
                Step::Skip => continue,
            }
        }
    }

    fn event(&self) -> Option<TagEvent> {
        self.event
    }

    fn namespace_uri(&self) -> Option<&str> {
        self.current.namespace.as_deref()
    }

    fn local_name(&self) -> &str {
        &self.current.local_name
    }

    fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    fn attribute(&self, index: usize) -> Option<&XmlAttribute> {
        self.attributes.get(index)
    }

    fn element_text(&mut self) -> Result<String> {
        if self.event != Some(TagEvent::Start) {
            return Err(self.unexpected_content());
        }
        let mut text = String::new();
        loop {
            match self.read_step()? {
                Step::Text(chunk) => text.push_str(&chunk),
                Step::End => {
                    self.leave();
                    return Ok(text);
                }
                Step::Start(..) => return Err(self.unexpected_content()),
                Step::Eof => return Err(self.unexpected_eof()),
                Step::Skip => continue,
            }
        }
    }

    fn location(&self) -> Location {
        Location::new(self.reader.buffer_position())
    }
}

impl<R> XmlStreamReader<R> {
    /// Consumes the stream and returns the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }
}

impl<R: BufRead> std::fmt::Debug for XmlStreamReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlStreamReader")
            .field("element", &self.current.local_name)
            .field("event", &self.event)
            .field("depth", &self.open.len())
            .finish()
    }
}

fn owned_namespace(
    resolved: ResolveResult<'_>,
) -> std::result::Result<Option<String>, quick_xml::Error> {
    match resolved {
        ResolveResult::Bound(namespace) => {
            Ok(Some(String::from_utf8_lossy(namespace.as_ref()).into_owned()))
        }
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(NamespaceError::UnknownPrefix(prefix).into()),
    }
}

fn decode(decoder: Decoder, bytes: &[u8], location: Location) -> Result<String> {
    decoder
        .decode(bytes)
        .map(Cow::into_owned)
        .map_err(|e| SubsystemError::Xml {
            source: e.into(),
            location,
        })
}

fn read_attributes<R>(
    reader: &NsReader<R>,
    decoder: Decoder,
    start: &BytesStart<'_>,
    location: Location,
) -> Result<Vec<XmlAttribute>> {
    let to_error = |source: quick_xml::Error| SubsystemError::Xml { source, location };

    let mut attributes = Vec::new();
    // Duplicates are reported by the subsystem parsers, with their own error kind.
    let mut iter = start.attributes();
    iter.with_checks(false);
    for attr in iter {
        let attr = attr.map_err(|e| to_error(e.into()))?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let (resolved, local_name) = reader.resolver().resolve_attribute(attr.key);
        let namespace = owned_namespace(resolved).map_err(to_error)?;
        let local_name = decode(decoder, local_name.as_ref(), location)?;
        let value = attr
            .decode_and_unescape_value(decoder)
            .map_err(to_error)?
            .into_owned();
        attributes.push(XmlAttribute {
            namespace,
            local_name,
            value,
        });
    }
    Ok(attributes)
}

fn resolve_reference(reference: &BytesRef<'_>, location: Location) -> Result<String> {
    let to_error = |source: quick_xml::Error| SubsystemError::Xml { source, location };

    if let Some(ch) = reference.resolve_char_ref().map_err(to_error)? {
        return Ok(ch.to_string());
    }
    let name = reference.decode().map_err(|e| to_error(e.into()))?;
    match resolve_predefined_entity(&name) {
        Some(value) => Ok(value.to_string()),
        None => Err(to_error(
            EscapeError::UnrecognizedEntity(0..name.len(), name.into_owned()).into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const NS: &str = "urn:jboss:domain:ee:1.0";

    #[test]
    fn reports_namespaces_and_local_names() {
        let xml = format!(
            r#"<?xml version="1.0"?>
            <!-- leading comment -->
            <p:subsystem xmlns:p="{NS}">
                <p:global-modules/>
            </p:subsystem>"#
        );
        let mut reader = XmlStreamReaderBuilder::new().from_str(&xml);

        assert_eq!(reader.next_tag().unwrap(), TagEvent::Start);
        assert_eq!(reader.local_name(), "subsystem");
        assert_eq!(reader.namespace_uri(), Some(NS));
        // namespace declarations are not attributes
        assert_eq!(reader.attribute_count(), 0);

        assert_eq!(reader.next_tag().unwrap(), TagEvent::Start);
        assert_eq!(reader.local_name(), "global-modules");
        assert_eq!(reader.namespace_uri(), Some(NS));
        assert_eq!(reader.next_tag().unwrap(), TagEvent::End);
        assert_eq!(reader.local_name(), "global-modules");

        assert!(reader.has_next());
        assert_eq!(reader.next_tag().unwrap(), TagEvent::End);
        assert_eq!(reader.local_name(), "subsystem");
        assert!(!reader.has_next());
    }

    #[test]
    fn unprefixed_elements_without_default_namespace_are_unbound() {
        let mut reader = XmlStreamReaderBuilder::new().from_str("<subsystem/>");

        reader.next_tag().unwrap();
        assert_eq!(reader.namespace_uri(), None);
    }

    #[test]
    fn resolves_attribute_values_and_prefixes() {
        let xml = r#"<module xmlns:x="urn:other" name="a&amp;b" x:slot="main"/>"#;
        let mut reader = XmlStreamReaderBuilder::new().from_str(xml);

        reader.next_tag().unwrap();
        assert_eq!(reader.attribute_count(), 2);

        let name = reader.attribute(0).unwrap();
        assert_eq!(name.namespace, None);
        assert_eq!(name.local_name, "name");
        assert_eq!(name.value, "a&b");

        let slot = reader.attribute(1).unwrap();
        assert_eq!(slot.namespace.as_deref(), Some("urn:other"));
        assert_eq!(slot.local_name, "slot");
        assert!(reader.attribute(2).is_none());
    }

    #[test]
    fn duplicate_attributes_are_reported_to_the_caller() {
        let mut reader =
            XmlStreamReaderBuilder::new().from_str(r#"<module name="a" name="b"/>"#);

        reader.next_tag().unwrap();
        assert_eq!(reader.attribute_count(), 2);
        assert_eq!(reader.attribute(1).unwrap().value, "b");
    }

    #[test]
    fn element_text_resolves_references() {
        let xml = "<flag> t&#114;u&#x65; <!-- c --></flag>";
        let mut reader = XmlStreamReaderBuilder::new().from_str(xml);

        reader.next_tag().unwrap();
        assert_eq!(reader.element_text().unwrap(), " true ");
        assert_eq!(reader.event(), Some(TagEvent::End));
        assert!(!reader.has_next());
    }

    #[test]
    fn element_text_rejects_nested_elements() {
        let mut reader = XmlStreamReaderBuilder::new().from_str("<flag><inner/></flag>");

        reader.next_tag().unwrap();
        let result = reader.element_text();
        assert!(matches!(
            result,
            Err(SubsystemError::UnexpectedContent { ref element, .. }) if element == "flag"
        ));
    }

    #[test]
    fn next_tag_rejects_character_data() {
        let mut reader = XmlStreamReaderBuilder::new().from_str("<list>text<item/></list>");

        reader.next_tag().unwrap();
        assert!(matches!(
            reader.next_tag(),
            Err(SubsystemError::UnexpectedContent { .. })
        ));
    }

    #[test]
    fn truncated_document_is_an_error() {
        let mut reader = XmlStreamReaderBuilder::new().from_str("<subsystem><global-modules>");

        reader.next_tag().unwrap();
        reader.next_tag().unwrap();
        let result = reader.next_tag();
        assert!(result.is_err());
        assert!(!reader.has_next());
    }

    #[test]
    fn mismatched_end_tag_is_an_xml_error() {
        let mut reader = XmlStreamReaderBuilder::new().from_str("<a><b></a>");

        reader.next_tag().unwrap();
        reader.next_tag().unwrap();
        assert!(matches!(reader.next_tag(), Err(SubsystemError::Xml { .. })));
    }

    #[test]
    fn unknown_prefix_is_an_xml_error() {
        let mut reader = XmlStreamReaderBuilder::new().from_str("<q:subsystem/>");

        assert!(matches!(reader.next_tag(), Err(SubsystemError::Xml { .. })));
    }

    #[test]
    fn location_advances() {
        let mut reader = XmlStreamReaderBuilder::new().from_str("<a><b/></a>");

        reader.next_tag().unwrap();
        let first = reader.location();
        reader.next_tag().unwrap();
        assert!(reader.location().offset() > first.offset());
    }

    #[test]
    fn reads_from_path() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(format!(r#"<subsystem xmlns="{NS}"></subsystem>"#).as_bytes())
            .unwrap();

        let mut reader = XmlStreamReaderBuilder::new()
            .capacity(64)
            .from_path(temp_file.path())
            .unwrap();

        assert_eq!(reader.next_tag().unwrap(), TagEvent::Start);
        assert_eq!(reader.namespace_uri(), Some(NS));
        assert_eq!(reader.next_tag().unwrap(), TagEvent::End);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = XmlStreamReaderBuilder::new().from_path("/nonexistent/ee.xml");
        assert!(matches!(result, Err(SubsystemError::Io(_))));
    }
}
