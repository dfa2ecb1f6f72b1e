//! Shared error types for inheritmap

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Key used to look up a node, echoed back in lookup errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKey {
    Id(usize),
    Name(String),
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => write!(f, "{name}"),
        }
    }
}

impl From<usize> for NodeKey {
    fn from(id: usize) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for NodeKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for NodeKey {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<&String> for NodeKey {
    fn from(name: &String) -> Self {
        Self::Name(name.clone())
    }
}

/// Main error type for inheritmap operations
#[derive(Debug, Error)]
pub enum Error {
    /// Root (or any requested) type is not known to the provider
    #[error("Type not found: {0}")]
    TypeNotFound(String),

    /// Tracked operation does not resolve on the root type
    #[error("{member} is not an attribute of {ty}")]
    MemberNotFound { ty: String, member: String },

    /// Source text could not be retrieved
    #[error("Source unavailable for {name}.{op}")]
    SourceUnavailable { name: String, op: String },

    /// Lookup by id or name failed
    #[error("Could not find node for {key}")]
    NodeNotFound { key: NodeKey },

    /// Node exists but keeps the inherited implementation
    #[error("{name} does not override the chosen function, {op}")]
    NotOverridden { name: String, op: String },

    /// Source lookups need a tracked operation
    #[error("this functionality requires function tracking.")]
    TrackingDisabled,

    /// Unknown similarity method name
    #[error("Provided method not recognized: {given}, must be one of {valid:?}")]
    InvalidMethod {
        given: String,
        valid: &'static [&'static str],
    },

    /// Reference strategy invoked without a reference key
    #[error("The reference strategy requires a reference node id")]
    MissingReference,

    /// Reference key absent from the source map
    #[error("The reference {reference} is not in the source map")]
    ReferenceNotFound { reference: usize },

    /// Dotted root path is malformed
    #[error("module_class must be of the form module.Class, found {0}")]
    InvalidRootPath(String),

    /// Color string or triple could not be understood
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Registry consistency errors (duplicates, unknown parents, cycles)
    #[error("Registry error: {0}")]
    Registry(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Manifest read or parse failures with file context
    #[error("Failed to load manifest {}: {message}", path.display())]
    Manifest { path: PathBuf, message: String },

    /// Another error with added context; the wrapped error stays the source
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// TOML errors
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Create a not-found error for any key type
    pub fn node_not_found(key: impl Into<NodeKey>) -> Self {
        Self::NodeNotFound { key: key.into() }
    }

    /// Create a manifest parse error with path context
    pub fn manifest(path: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        Self::Manifest {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Whether the error came from a lookup that found nothing
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NodeNotFound { .. } | Self::TypeNotFound(_) => true,
            Self::WithContext { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_key() {
        let err = Error::node_not_found("does_not_exist");
        assert_eq!(err.to_string(), "Could not find node for does_not_exist");
        assert!(err.is_not_found());

        let err = Error::node_not_found(10usize);
        assert_eq!(err.to_string(), "Could not find node for 10");
    }

    #[test]
    fn not_overridden_is_not_a_lookup_failure() {
        let err = Error::NotOverridden {
            name: "Square".into(),
            op: "area".into(),
        };
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("does not override the chosen"));
    }

    #[test]
    fn context_wraps_message() {
        let result: Result<()> = Err(Error::TrackingDisabled);
        let err = result.context("loading sources").unwrap_err();
        assert_eq!(
            err.to_string(),
            "loading sources: this functionality requires function tracking."
        );
    }

    #[test]
    fn context_keeps_the_wrapped_error() {
        use std::error::Error as _;

        let err = Error::node_not_found("Square").with_context("drawing");
        assert!(err.is_not_found());
        let source = err.source().expect("wrapped error is the source");
        assert_eq!(source.to_string(), "Could not find node for Square");
        match err {
            Error::WithContext { source, .. } => {
                assert!(matches!(*source, Error::NodeNotFound { .. }))
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
