//! Streaming XML plumbing shared by subsystem readers and writers.
//!
//! The [`stream_reader`] module exposes a forward-only, namespace-aware cursor
//! over start and end tags ([`XmlEventStream`]), and the [`stream_writer`]
//! module the matching output sink ([`XmlEventSink`]). Both are backed by
//! `quick-xml`.
//!
//! # Examples
//!
//! ```
//! use ee_subsystem::xml::{TagEvent, XmlEventStream, XmlStreamReaderBuilder};
//!
//! let xml = r#"<subsystem xmlns="urn:jboss:domain:ee:1.0"><global-modules/></subsystem>"#;
//! let mut reader = XmlStreamReaderBuilder::new().from_str(xml);
//!
//! assert_eq!(reader.next_tag().unwrap(), TagEvent::Start);
//! assert_eq!(reader.local_name(), "subsystem");
//! assert_eq!(reader.namespace_uri(), Some("urn:jboss:domain:ee:1.0"));
//!
//! assert_eq!(reader.next_tag().unwrap(), TagEvent::Start);
//! assert_eq!(reader.local_name(), "global-modules");
//! assert_eq!(reader.next_tag().unwrap(), TagEvent::End);
//! assert_eq!(reader.next_tag().unwrap(), TagEvent::End);
//! assert!(!reader.has_next());
//! ```
pub mod parse_utils;
pub mod stream_reader;
pub mod stream_writer;

use std::fmt;

pub use stream_reader::{TagEvent, XmlAttribute, XmlEventStream, XmlStreamReader, XmlStreamReaderBuilder};
pub use stream_writer::{XmlEventSink, XmlStreamWriter, XmlStreamWriterBuilder};

/// Position in the XML input, as a byte offset from the start of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    offset: u64,
}

impl Location {
    pub fn new(offset: u64) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "byte offset {}", self.offset)
    }
}
