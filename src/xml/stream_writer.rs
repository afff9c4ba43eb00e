use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::error;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{Result, SubsystemError};

/// A streaming XML output sink.
///
/// Attributes belong to the most recent start element and must be written
/// before any content or end tag of that element.
pub trait XmlEventSink {
    /// Opens an element. When `namespace` differs from the namespace in scope,
    /// it is declared as the default namespace of the new element.
    fn write_start_element(&mut self, namespace: Option<&str>, local_name: &str) -> Result<()>;

    fn write_attribute(&mut self, local_name: &str, value: &str) -> Result<()>;

    /// Writes escaped character data.
    fn write_characters(&mut self, text: &str) -> Result<()>;

    /// Closes the innermost open element.
    fn write_end_element(&mut self) -> Result<()>;

    fn flush(&mut self) -> Result<()>;
}

/// Builder for [`XmlStreamWriter`].
///
/// # Examples
///
/// ```
/// use ee_subsystem::xml::{XmlEventSink, XmlStreamWriterBuilder};
///
/// let mut writer = XmlStreamWriterBuilder::new().from_writer(Vec::new());
/// writer.write_start_element(Some("urn:jboss:domain:ee:1.0"), "subsystem").unwrap();
/// writer.write_end_element().unwrap();
///
/// assert_eq!(
///     String::from_utf8(writer.into_inner()).unwrap(),
///     r#"<subsystem xmlns="urn:jboss:domain:ee:1.0"></subsystem>"#
/// );
/// ```
#[derive(Default)]
pub struct XmlStreamWriterBuilder {
    indent: Option<(u8, usize)>,
    declaration: bool,
}

impl XmlStreamWriterBuilder {
    /// Creates a builder producing compact output without an XML declaration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretty-prints the output, indenting each level by `indent_size`
    /// repetitions of `indent_char`.
    pub fn indent(mut self, indent_char: u8, indent_size: usize) -> Self {
        self.indent = Some((indent_char, indent_size));
        self
    }

    /// Emits `<?xml version="1.0" encoding="UTF-8"?>` before the first element.
    pub fn declaration(mut self, declaration: bool) -> Self {
        self.declaration = declaration;
        self
    }

    pub fn from_writer<W: Write>(self, wtr: W) -> XmlStreamWriter<W> {
        let writer = match self.indent {
            Some((indent_char, indent_size)) => Writer::new_with_indent(wtr, indent_char, indent_size),
            None => Writer::new(wtr),
        };
        XmlStreamWriter {
            writer,
            pending: None,
            open: Vec::new(),
            declaration: self.declaration,
        }
    }

    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<XmlStreamWriter<BufWriter<File>>> {
        let file_path = path.as_ref();
        let file = File::create(file_path).map_err(|e| {
            error!("Failed to create XML file {}: {}", file_path.display(), e);
            SubsystemError::Io(e)
        })?;
        Ok(self.from_writer(BufWriter::new(file)))
    }
}

struct OpenElement {
    local_name: String,
    namespace: Option<String>,
}

/// [`XmlEventSink`] implementation backed by `quick_xml::Writer`.
///
/// Start tags are buffered until the next content, so attributes can be added
/// after [`XmlEventSink::write_start_element`]. Elements are always written as
/// a start/end pair, never in the self-closing form.
pub struct XmlStreamWriter<W: Write> {
    writer: Writer<W>,
    pending: Option<BytesStart<'static>>,
    open: Vec<OpenElement>,
    declaration: bool,
}

impl<W: Write> XmlStreamWriter<W> {
    fn flush_pending(&mut self) -> Result<()> {
        if let Some(start) = self.pending.take() {
            self.writer.write_event(Event::Start(start))?;
        }
        Ok(())
    }

    /// Depth of currently open elements.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Returns the underlying writer. Any pending start tag is discarded.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write> XmlEventSink for XmlStreamWriter<W> {
    fn write_start_element(&mut self, namespace: Option<&str>, local_name: &str) -> Result<()> {
        self.flush_pending()?;
        if self.declaration {
            self.declaration = false;
            self.writer
                .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        }

        let in_scope = self.open.last().and_then(|e| e.namespace.clone());
        let mut start = BytesStart::new(local_name.to_string());
        if let Some(uri) = namespace.filter(|uri| Some(*uri) != in_scope.as_deref()) {
            start.push_attribute(("xmlns", uri));
        }

        self.open.push(OpenElement {
            local_name: local_name.to_string(),
            namespace: namespace.map(str::to_string).or(in_scope),
        });
        self.pending = Some(start);
        Ok(())
    }

    fn write_attribute(&mut self, local_name: &str, value: &str) -> Result<()> {
        match self.pending.as_mut() {
            Some(start) => {
                start.push_attribute((local_name, value));
                Ok(())
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("attribute '{}' written outside of a start tag", local_name),
            )
            .into()),
        }
    }

    fn write_characters(&mut self, text: &str) -> Result<()> {
        self.flush_pending()?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        Ok(())
    }

    fn write_end_element(&mut self) -> Result<()> {
        self.flush_pending()?;
        let element = self.open.pop().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "no open element to close")
        })?;
        self.writer
            .write_event(Event::End(BytesEnd::new(element.local_name)))?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.flush_pending()?;
        self.writer.get_mut().flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::read_to_string;
    use tempfile::NamedTempFile;

    const NS: &str = "urn:jboss:domain:ee:1.0";

    fn output(writer: XmlStreamWriter<Vec<u8>>) -> String {
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn declares_namespace_only_when_it_changes() {
        let mut writer = XmlStreamWriterBuilder::new().from_writer(Vec::new());
        writer.write_start_element(Some(NS), "subsystem").unwrap();
        writer.write_start_element(Some(NS), "global-modules").unwrap();
        writer.write_end_element().unwrap();
        writer.write_start_element(Some("urn:other"), "extra").unwrap();
        writer.write_end_element().unwrap();
        writer.write_end_element().unwrap();

        assert_eq!(
            output(writer),
            r#"<subsystem xmlns="urn:jboss:domain:ee:1.0"><global-modules></global-modules><extra xmlns="urn:other"></extra></subsystem>"#
        );
    }

    #[test]
    fn attributes_and_text_are_escaped() {
        let mut writer = XmlStreamWriterBuilder::new().from_writer(Vec::new());
        writer.write_start_element(None, "module").unwrap();
        writer.write_attribute("name", "a<b&\"c\"").unwrap();
        writer.write_characters("x & y").unwrap();
        writer.write_end_element().unwrap();

        assert_eq!(
            output(writer),
            r#"<module name="a&lt;b&amp;&quot;c&quot;">x &amp; y</module>"#
        );
    }

    #[test]
    fn attribute_after_content_is_rejected() {
        let mut writer = XmlStreamWriterBuilder::new().from_writer(Vec::new());
        writer.write_start_element(None, "flag").unwrap();
        writer.write_characters("true").unwrap();

        let result = writer.write_attribute("name", "a");
        assert!(matches!(result, Err(SubsystemError::Io(_))));
    }

    #[test]
    fn unbalanced_end_is_rejected() {
        let mut writer = XmlStreamWriterBuilder::new().from_writer(Vec::new());
        assert!(writer.write_end_element().is_err());
    }

    #[test]
    fn writes_declaration_once() {
        let mut writer = XmlStreamWriterBuilder::new()
            .declaration(true)
            .from_writer(Vec::new());
        writer.write_start_element(None, "a").unwrap();
        writer.write_start_element(None, "b").unwrap();
        writer.write_end_element().unwrap();
        writer.write_end_element().unwrap();

        assert_eq!(
            output(writer),
            r#"<?xml version="1.0" encoding="UTF-8"?><a><b></b></a>"#
        );
    }

    #[test]
    fn writes_to_path_with_indentation() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut writer = XmlStreamWriterBuilder::new()
            .indent(b' ', 4)
            .from_path(temp_file.path())
            .unwrap();
        writer.write_start_element(Some(NS), "subsystem").unwrap();
        writer.write_start_element(None, "ear-subdeployments-isolated").unwrap();
        writer.write_characters("true").unwrap();
        writer.write_end_element().unwrap();
        writer.write_end_element().unwrap();
        writer.flush().unwrap();
        assert_eq!(writer.depth(), 0);

        let content = read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("\n    <ear-subdeployments-isolated>true</ear-subdeployments-isolated>"));
    }
}
