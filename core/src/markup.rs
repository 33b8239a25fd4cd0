//! The markup collaborator.

use crate::change::Change;
use crate::element::{ComponentRef, Element};
use crate::id::{ContextId, ElementId};
use thiserror::Error;

/// Errors reported by the markup collaborator.
#[derive(Debug, Error)]
pub enum MarkupError {
    /// The component’s template could not be parsed or rendered.
    #[error("invalid template for {component}: {reason}")]
    Template { component: String, reason: String },
    /// No mounted component owns the element.
    #[error("no mounted component owns element {0}")]
    UnknownComponent(ElementId),
    /// The component has no such method.
    #[error("component has no method `{0}`")]
    UnknownMethod(String),
    /// The method argument could not be decoded.
    #[error("bad argument for `{method}`: {source}")]
    Argument {
        method: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Turns components into element trees and dispatches calls to them.
///
/// Implemented by the templating layer.
pub trait Markup {
    /// Mounts a component on behalf of a context and returns its rendered root.
    fn mount(&self, component: &ComponentRef, owner: ContextId) -> Result<Element, MarkupError>;

    /// Dismounts a component, releasing everything the collaborator holds for it.
    fn dismount(&self, component: &ComponentRef);

    /// Returns the rendered root of an already mounted (sub-)component.
    fn root(&self, component: &ComponentRef) -> Result<Element, MarkupError>;

    /// Returns the full rendered markup of a mounted component as a document string.
    fn markup(&self, component: &ComponentRef) -> Result<String, MarkupError> {
        let root = self.root(component)?;
        self.element_markup(&root)
    }

    /// Serializes an element subtree, expanding sub-components.
    fn element_markup(&self, element: &Element) -> Result<String, MarkupError> {
        let mut out = String::new();
        element.write_markup(&mut out, &mut |c| self.root(c))?;
        Ok(out)
    }

    /// Invokes a method on the component owning `target`.
    ///
    /// `argument` is JSON, or empty for no-argument calls.
    fn call(&self, target: ElementId, method: &str, argument: &str) -> Result<(), MarkupError>;

    /// Returns the changes accumulated since the component was last rendered.
    fn changes(&self, component: &ComponentRef) -> Result<Vec<Change>, MarkupError>;
}
