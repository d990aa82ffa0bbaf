//! Generation-time errors.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Where in a declaration an error was found: the trait and, for method-level
/// problems, the method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub interface: String,
    pub method: Option<String>,
}

impl Location {
    pub fn interface(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            method: None,
        }
    }

    pub fn method(interface: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            method: Some(method.into()),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.method {
            Some(method) => write!(f, "{}::{}", self.interface, method),
            None => f.write_str(&self.interface),
        }
    }
}

/// Errors that abort generation for one trait declaration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{location}: malformed annotation `{tag}`: {reason}")]
    MalformedAnnotation {
        location: Location,
        tag: String,
        reason: String,
    },

    #[error("{interface}: missing endpoint annotation (@GET, @POST, @PUT or @DELETE)")]
    MissingEndpointAnnotation { interface: String },

    #[error("{interface}: more than one endpoint annotation")]
    DuplicateEndpointAnnotation { interface: String },

    #[error("{location}: annotation `{tag}` is not allowed here")]
    MisplacedAnnotation { location: Location, tag: String },

    #[error("{interface}::{method}: method has no binding or terminal annotation")]
    UnannotatedMethod { interface: String, method: String },

    #[error("{interface}::{method}: method carries more than one annotation")]
    ConflictingAnnotations { interface: String, method: String },

    #[error("{interface}::{method}: {reason}")]
    InvalidSignature {
        interface: String,
        method: String,
        reason: String,
    },

    #[error("{interface}::{method}: only one @BODY binding is allowed per interface")]
    DuplicateBodyBinding { interface: String, method: String },

    #[error("{interface}::{method}: duplicate {kind} terminal")]
    DuplicateTerminal {
        interface: String,
        method: String,
        kind: &'static str,
    },

    #[error("{interface}: no @SYNC or @ASYNC terminal method")]
    MissingTerminal { interface: String },

    #[error("{interface}: @ASYNC terminal requires a @SYNC terminal for its result type")]
    AsyncWithoutSync { interface: String },

    #[error("{location}: {reason}")]
    Unsupported { location: Location, reason: String },

    #[error("Syntax error: {0}")]
    Syntax(#[from] syn::Error),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type alias for generation
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_names_method_when_present() {
        assert_eq!(Location::interface("GetPhoto").to_string(), "GetPhoto");
        assert_eq!(
            Location::method("GetPhoto", "photo_id").to_string(),
            "GetPhoto::photo_id"
        );
    }

    #[test]
    fn messages_carry_positional_context() {
        let err = Error::UnannotatedMethod {
            interface: "GetPhoto".into(),
            method: "size".into(),
        };
        assert_eq!(
            err.to_string(),
            "GetPhoto::size: method has no binding or terminal annotation"
        );
    }
}
