use thiserror::Error;

use crate::xml::Location;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, SubsystemError>;

#[derive(Error, Debug)]
/// Subsystem error
pub enum SubsystemError {
    #[error("Unexpected element '{name}' in namespace '{}' at {location}", .namespace.as_deref().unwrap_or(""))]
    Namespace {
        namespace: Option<String>,
        name: String,
        location: Location,
    },

    #[error("Unexpected element '{name}' at {location}")]
    UnrecognizedElement { name: String, location: Location },

    #[error("Unexpected attribute '{name}' at {location}")]
    UnrecognizedAttribute { name: String, location: Location },

    #[error("Duplicate element '{name}' at {location}")]
    DuplicateElement { name: String, location: Location },

    #[error("Duplicate attribute '{name}' at {location}")]
    DuplicateAttribute { name: String, location: Location },

    #[error("Missing required attribute(s): {} at {location}", .names.join(", "))]
    MissingRequiredAttribute {
        names: Vec<String>,
        location: Location,
    },

    #[error("Unexpected content in element '{element}' at {location}")]
    UnexpectedContent { element: String, location: Location },

    #[error("Invalid value: '{value}' for '{element}' element at {location}")]
    InvalidValue {
        element: String,
        value: String,
        location: Location,
    },

    #[error("XML error at {location}: {source}")]
    Xml {
        source: quick_xml::Error,
        location: Location,
    },

    #[error("Unexpected end of document at {location}")]
    UnexpectedEof { location: Location },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No operation '{operation}' registered for subsystem '{subsystem}'")]
    UnknownOperation {
        subsystem: String,
        operation: String,
    },

    #[error("No subsystem registered under '{0}'")]
    UnknownSubsystem(String),
}

impl SubsystemError {
    /// Location in the input at which a read-side error was raised.
    pub fn location(&self) -> Option<Location> {
        match self {
            SubsystemError::Namespace { location, .. }
            | SubsystemError::UnrecognizedElement { location, .. }
            | SubsystemError::UnrecognizedAttribute { location, .. }
            | SubsystemError::DuplicateElement { location, .. }
            | SubsystemError::DuplicateAttribute { location, .. }
            | SubsystemError::MissingRequiredAttribute { location, .. }
            | SubsystemError::UnexpectedContent { location, .. }
            | SubsystemError::InvalidValue { location, .. }
            | SubsystemError::Xml { location, .. }
            | SubsystemError::UnexpectedEof { location } => Some(*location),
            _ => None,
        }
    }
}
