//! Element, attribute and namespace names of the EE subsystem schema.

use super::NAMESPACE;

/// Schema versions of the subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Any namespace not known to this version of the subsystem.
    Unknown,
    Ee1_0,
}

impl Namespace {
    /// The namespace written by the subsystem writer.
    pub const CURRENT: Namespace = Namespace::Ee1_0;

    pub fn for_uri(uri: Option<&str>) -> Namespace {
        match uri {
            Some(NAMESPACE) => Namespace::Ee1_0,
            _ => Namespace::Unknown,
        }
    }

    pub fn uri(&self) -> Option<&'static str> {
        match self {
            Namespace::Ee1_0 => Some(NAMESPACE),
            Namespace::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        *self != Namespace::Unknown
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    GlobalModules,
    EarSubdeploymentsIsolated,
    Module,
}

impl Element {
    /// Looks up an element of `namespace`. Elements of an unknown namespace
    /// are never recognized.
    pub fn for_name(namespace: Namespace, local_name: &str) -> Option<Element> {
        if !namespace.is_known() {
            return None;
        }
        match local_name {
            "global-modules" => Some(Element::GlobalModules),
            "ear-subdeployments-isolated" => Some(Element::EarSubdeploymentsIsolated),
            "module" => Some(Element::Module),
            _ => None,
        }
    }

    pub fn local_name(&self) -> &'static str {
        match self {
            Element::GlobalModules => "global-modules",
            Element::EarSubdeploymentsIsolated => "ear-subdeployments-isolated",
            Element::Module => "module",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Name,
    Slot,
}

impl Attribute {
    pub fn for_name(local_name: &str) -> Option<Attribute> {
        match local_name {
            "name" => Some(Attribute::Name),
            "slot" => Some(Attribute::Slot),
            _ => None,
        }
    }

    pub fn local_name(&self) -> &'static str {
        match self {
            Attribute::Name => "name",
            Attribute::Slot => "slot",
        }
    }
}
