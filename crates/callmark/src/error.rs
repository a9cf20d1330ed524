//! Error types for renderers and the dispatch bridge.

use std::fmt;
use std::str::Utf8Error;

use crate::construct::ConstructKind;
use crate::dispatch::Phase;

/// Error returned by a renderer method.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct RendererError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl RendererError {
    /// Create an error from a message.
    pub fn new(message: impl fmt::Display) -> Self {
        Self {
            message: message.to_string(),
            source: None,
        }
    }

    /// Wrap an underlying error.
    pub fn wrap(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self {
            message: error.to_string(),
            source: Some(Box::new(error)),
        }
    }

    /// Error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<fmt::Error> for RendererError {
    fn from(error: fmt::Error) -> Self {
        Self::wrap(error)
    }
}

impl From<Utf8Error> for RendererError {
    fn from(error: Utf8Error) -> Self {
        Self::wrap(error)
    }
}

/// Error returned by a render.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A renderer method failed.
    #[error("Renderer failed on {construct} at byte {offset}: {source}")]
    Renderer {
        /// Construct being rendered.
        construct: ConstructKind,
        /// Byte offset of the construct in the source.
        offset: usize,
        /// Failure reported by the renderer.
        #[source]
        source: RendererError,
    },
    /// Rendered content could not be passed on as text.
    #[error("Invalid UTF-8 in {construct} at byte {offset}: {source}")]
    Marshal {
        /// Construct whose arguments or output could not be marshalled.
        construct: ConstructKind,
        /// Byte offset of the construct in the source.
        offset: usize,
        /// Underlying decoding error.
        #[source]
        source: Utf8Error,
    },
    /// The scanner produced a malformed event stream.
    #[error("Scanner error at byte {offset}: {message}")]
    Scanner {
        /// Byte offset where the problem was detected.
        offset: usize,
        /// Description of the problem.
        message: String,
    },
    /// A construct was dispatched outside of an active render.
    #[error("Cannot dispatch {construct} while {phase}")]
    Phase {
        /// Construct that was refused.
        construct: ConstructKind,
        /// Phase the dispatcher was in.
        phase: Phase,
    },
}

impl RenderError {
    /// Construct kind the error is attached to, if any.
    #[must_use]
    pub fn construct(&self) -> Option<ConstructKind> {
        match self {
            Self::Renderer { construct, .. }
            | Self::Marshal { construct, .. }
            | Self::Phase { construct, .. } => Some(*construct),
            Self::Scanner { .. } => None,
        }
    }

    /// Byte offset in the source the error is attached to, if any.
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::Renderer { offset, .. }
            | Self::Marshal { offset, .. }
            | Self::Scanner { offset, .. } => Some(*offset),
            Self::Phase { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_renderer_error_message() {
        let error = RendererError::new("boom");
        assert_eq!(error.to_string(), "boom");
        assert!(error.source().is_none());
    }

    #[test]
    fn test_renderer_error_wraps_source() {
        let error = RendererError::from(fmt::Error);
        assert!(error.source().is_some());
    }

    #[test]
    fn test_render_error_display() {
        let error = RenderError::Renderer {
            construct: ConstructKind::Emphasis,
            offset: 12,
            source: RendererError::new("boom"),
        };
        assert_eq!(
            error.to_string(),
            "Renderer failed on emphasis at byte 12: boom"
        );
        assert_eq!(error.construct(), Some(ConstructKind::Emphasis));
        assert_eq!(error.offset(), Some(12));
    }

    #[test]
    fn test_scanner_error_has_no_construct() {
        let error = RenderError::Scanner {
            offset: 3,
            message: "unbalanced end tag".to_owned(),
        };
        assert_eq!(error.construct(), None);
        assert_eq!(error.to_string(), "Scanner error at byte 3: unbalanced end tag");
    }
}
