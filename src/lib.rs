#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # EE subsystem XML

 Reads and writes the persisted XML configuration of the `ee` subsystem of an
 application server, and converts it to and from the generic management model.

 ## Core Concepts

- **ModelNode:** the dynamically typed configuration tree (booleans, numbers,
  strings, objects and lists).
- **ModelUpdate:** an operation (such as `add`) against a resource address,
  with its parameters.
- **Reader:** turns the `<subsystem>` element into `ModelUpdate`s, enforcing
  the schema of the subsystem.
- **Writer:** turns a model snapshot back into XML accepted by the reader.
- **Extension:** registers the reader, the writer and the `add` and
  `describe` operations with an `ExtensionRegistry`.

 ## Persisted layout

```xml
<subsystem xmlns="urn:jboss:domain:ee:1.0">
    <global-modules>
        <module name="org.jboss.logging" slot="main"/>
    </global-modules>
    <ear-subdeployments-isolated>true</ear-subdeployments-isolated>
</subsystem>
```

 ## Getting Started

```rust
use ee_subsystem::core::extension::{ExtensionRegistry, ModelContext};
use ee_subsystem::ee::{EeExtension, SUBSYSTEM_NAME};
use ee_subsystem::xml::{XmlStreamReaderBuilder, XmlStreamWriterBuilder};
use ee_subsystem::SubsystemError;

fn main() -> Result<(), SubsystemError> {
    let xml = r#"<subsystem xmlns="urn:jboss:domain:ee:1.0">
        <global-modules>
            <module name="org.jboss.logging"/>
        </global-modules>
    </subsystem>"#;

    let mut registry = ExtensionRegistry::new();
    registry.load(&EeExtension);

    // Load
    let mut reader = XmlStreamReaderBuilder::new().from_str(xml);
    let updates = registry.parse_subsystem(&mut reader)?;

    // Apply
    let mut context = ModelContext::default();
    for update in &updates {
        registry.execute(SUBSYSTEM_NAME, update, &mut context)?;
    }

    // Persist
    let mut writer = XmlStreamWriterBuilder::new().from_writer(Vec::new());
    registry.marshal_subsystem(SUBSYSTEM_NAME, context.model(), &mut writer)?;

    let output = String::from_utf8(writer.into_inner()).unwrap();
    assert!(output.contains(r#"<module name="org.jboss.logging" slot="main">"#));
    Ok(())
}
```
 */

/// Model, operations and the extension host
pub mod core;

/// The `ee` subsystem
pub mod ee;

/// Error types
pub mod error;

#[doc(inline)]
pub use error::*;

/// Streaming XML reader and writer
pub mod xml;
