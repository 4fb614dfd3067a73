//! Resource identity and the outcome of declaring a resource.

use std::fmt;

use serde::Serialize;

/// The kind of resource being declared against the search service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ResourceKind {
    DataSource,
    Index,
    Skillset,
    Indexer,
}

impl ResourceKind {
    /// All kinds, in the order they must be declared.
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::DataSource,
        ResourceKind::Index,
        ResourceKind::Skillset,
        ResourceKind::Indexer,
    ];

    /// The REST collection the resource lives under.
    pub fn collection(&self) -> &'static str {
        match self {
            ResourceKind::DataSource => "datasources",
            ResourceKind::Index => "indexes",
            ResourceKind::Skillset => "skillsets",
            ResourceKind::Indexer => "indexers",
        }
    }

    /// Human readable label used in status lines.
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::DataSource => "Datasource",
            ResourceKind::Index => "Index",
            ResourceKind::Skillset => "Skillset",
            ResourceKind::Indexer => "Indexer",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identity of a declared resource. A second declaration with the same
/// descriptor replaces the first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceDescriptor {
    pub kind: ResourceKind,
    pub name: String,
}

impl ResourceDescriptor {
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind, self.name)
    }
}

/// Result of a successful create-or-replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The service reported a new resource (HTTP 201).
    Created,
    /// The service accepted the PUT over an existing resource (any other 2xx,
    /// kept as returned).
    Replaced(u16),
}

impl Outcome {
    /// Classify a successful HTTP status. Returns `None` outside `[200, 300)`.
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            201 => Some(Outcome::Created),
            200..=299 => Some(Outcome::Replaced(status)),
            _ => None,
        }
    }

    /// The HTTP status the service answered with.
    pub fn status(&self) -> u16 {
        match self {
            Outcome::Created => 201,
            Outcome::Replaced(status) => *status,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Created => f.write_str("created"),
            Outcome::Replaced(_) => f.write_str("replaced"),
        }
    }
}

/// A payload that can be PUT to the search service.
pub trait ResourceDefinition: Serialize + Send + Sync {
    /// The collection this definition is declared under.
    const KIND: ResourceKind;

    /// Resource name, used as the last path segment of the PUT.
    fn name(&self) -> &str;

    fn descriptor(&self) -> ResourceDescriptor {
        ResourceDescriptor::new(Self::KIND, self.name())
    }
}
