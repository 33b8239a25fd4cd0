use crate::id::{ContextId, ElementId};
use crate::markup::MarkupError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by contexts and reconcilers.
#[derive(Debug, Error)]
pub enum Error {
    /// No context is registered under the identifier.
    #[error("no context with id {0}")]
    NotFound(ContextId),
    /// A context with the identifier is already registered.
    #[error("context id {0} is already registered")]
    DuplicateId(ContextId),
    /// A tag outside the vocabulary of the context.
    #[error("<{tag}> is not supported in a menu context; valid tags are menu and menuitem")]
    UnsupportedMarkup { tag: String },
    /// An element placed under a parent it can’t belong to.
    #[error("<{tag}> {element} can’t have {} as parent", parent_name(.parent))]
    InvalidComposition {
        element: ElementId,
        tag: String,
        parent: Option<String>,
    },
    /// An icon or other resource path is unusable.
    #[error("invalid resource {}: {reason}", .path.display())]
    ResourceInvalid { path: PathBuf, reason: String },
    #[error(transparent)]
    Markup(#[from] MarkupError),
    #[error("native backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// Contexts can only be created and mounted once the app has launched.
    #[error("creating and interacting with contexts requires the app to be launched")]
    NotLaunched,
    #[error("{kind} {id} can’t be closed")]
    NotClosable { id: ContextId, kind: &'static str },
    #[error("context {id} is not a {expected}")]
    WrongKind { id: ContextId, expected: &'static str },
    /// The event channel is gone.
    #[error("event channel disconnected")]
    Disconnected,
}

fn parent_name(parent: &Option<String>) -> String {
    match parent {
        Some(tag) => format!("<{}>", tag),
        None => "no element".to_string(),
    }
}

impl Error {
    pub fn backend<E: std::error::Error + Send + Sync + 'static>(err: E) -> Error {
        Error::Backend(Box::new(err))
    }
}
