//! Validation helpers for hand-written subsystem parsers.
//!
//! Each helper builds the error for the element or attribute the stream is
//! positioned on, so every failure carries the current [`Location`](super::Location).

use crate::error::{Result, SubsystemError};

use super::stream_reader::{TagEvent, XmlEventStream};

/// The current element is not valid in this context.
pub fn unexpected_element(reader: &dyn XmlEventStream) -> SubsystemError {
    SubsystemError::UnrecognizedElement {
        name: reader.local_name().to_string(),
        location: reader.location(),
    }
}

/// The current element belongs to a namespace this parser does not handle.
pub fn unexpected_namespace(reader: &dyn XmlEventStream) -> SubsystemError {
    SubsystemError::Namespace {
        namespace: reader.namespace_uri().map(str::to_string),
        name: reader.local_name().to_string(),
        location: reader.location(),
    }
}

/// The current element was already seen where it may appear once.
pub fn duplicate_element(reader: &dyn XmlEventStream) -> SubsystemError {
    SubsystemError::DuplicateElement {
        name: reader.local_name().to_string(),
        location: reader.location(),
    }
}

/// Attribute `index` of the current element is not allowed.
pub fn unexpected_attribute(reader: &dyn XmlEventStream, index: usize) -> SubsystemError {
    SubsystemError::UnrecognizedAttribute {
        name: attribute_name(reader, index),
        location: reader.location(),
    }
}

/// Attribute `index` repeats an attribute already read on the current element.
pub fn duplicate_attribute(reader: &dyn XmlEventStream, index: usize) -> SubsystemError {
    SubsystemError::DuplicateAttribute {
        name: attribute_name(reader, index),
        location: reader.location(),
    }
}

pub fn missing_required(reader: &dyn XmlEventStream, names: &[&str]) -> SubsystemError {
    SubsystemError::MissingRequiredAttribute {
        names: names.iter().map(|name| name.to_string()).collect(),
        location: reader.location(),
    }
}

pub fn invalid_value(reader: &dyn XmlEventStream, element: &str, value: &str) -> SubsystemError {
    SubsystemError::InvalidValue {
        element: element.to_string(),
        value: value.to_string(),
        location: reader.location(),
    }
}

/// Fails on the first attribute of the current element, if any.
pub fn require_no_attributes(reader: &dyn XmlEventStream) -> Result<()> {
    if reader.attribute_count() > 0 {
        return Err(unexpected_attribute(reader, 0));
    }
    Ok(())
}

/// Fails if attribute `index` is bound to a namespace.
pub fn require_no_namespace_attribute(reader: &dyn XmlEventStream, index: usize) -> Result<()> {
    match reader.attribute(index) {
        Some(attribute) if attribute.namespace.is_some() => Err(unexpected_attribute(reader, index)),
        _ => Ok(()),
    }
}

/// Consumes the end tag of the current element, failing on any child element.
pub fn require_no_content(reader: &mut dyn XmlEventStream) -> Result<()> {
    let element = reader.local_name().to_string();
    match reader.next_tag()? {
        TagEvent::End => Ok(()),
        TagEvent::Start => Err(SubsystemError::UnexpectedContent {
            element,
            location: reader.location(),
        }),
    }
}

fn attribute_name(reader: &dyn XmlEventStream, index: usize) -> String {
    reader
        .attribute(index)
        .map(|attribute| match &attribute.namespace {
            Some(namespace) => format!("{{{}}}{}", namespace, attribute.local_name),
            None => attribute.local_name.clone(),
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlStreamReaderBuilder;

    #[test]
    fn require_no_attributes_reports_first_attribute() {
        let mut reader = XmlStreamReaderBuilder::new().from_str(r#"<subsystem foo="1" bar="2"/>"#);
        reader.next_tag().unwrap();

        let err = require_no_attributes(&reader).unwrap_err();
        assert!(matches!(
            err,
            SubsystemError::UnrecognizedAttribute { ref name, .. } if name == "foo"
        ));
    }

    #[test]
    fn namespaced_attribute_names_are_qualified() {
        let mut reader = XmlStreamReaderBuilder::new()
            .from_str(r#"<module xmlns:x="urn:x" name="a" x:slot="b"/>"#);
        reader.next_tag().unwrap();

        assert!(require_no_namespace_attribute(&reader, 0).is_ok());
        let err = require_no_namespace_attribute(&reader, 1).unwrap_err();
        assert!(matches!(
            err,
            SubsystemError::UnrecognizedAttribute { ref name, .. } if name == "{urn:x}slot"
        ));
    }

    #[test]
    fn require_no_content_accepts_empty_and_rejects_children() {
        let mut reader = XmlStreamReaderBuilder::new().from_str("<list><a/><b><c/></b></list>");
        reader.next_tag().unwrap();

        reader.next_tag().unwrap();
        assert!(require_no_content(&mut reader).is_ok());

        reader.next_tag().unwrap();
        let err = require_no_content(&mut reader).unwrap_err();
        assert!(matches!(
            err,
            SubsystemError::UnexpectedContent { ref element, .. } if element == "b"
        ));
    }

    #[test]
    fn helpers_work_through_trait_objects() {
        let mut concrete = XmlStreamReaderBuilder::new().from_str("<unknown/>");
        concrete.next_tag().unwrap();
        let reader: &dyn XmlEventStream = &concrete;

        let err = unexpected_element(reader);
        assert!(matches!(
            err,
            SubsystemError::UnrecognizedElement { ref name, .. } if name == "unknown"
        ));
        assert!(matches!(
            unexpected_namespace(reader),
            SubsystemError::Namespace { namespace: None, .. }
        ));
    }
}
