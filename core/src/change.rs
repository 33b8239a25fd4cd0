use crate::element::{AttributeMap, Element};
use crate::id::ElementId;

/// A change produced by re-rendering a component.
///
/// Consumed exactly once by the reconciler of the owning context.
#[derive(Debug, Clone)]
pub enum Change {
    /// Substitutes the whole subtree rooted at the element.
    Full(Element),
    /// Only some attributes of an existing element changed.
    ///
    /// `element` is the element in its updated state; `changed` holds just the changed pairs.
    Attributes {
        element: Element,
        changed: AttributeMap,
    },
}

impl Change {
    /// The element the change is rooted at.
    pub fn element(&self) -> &Element {
        match self {
            Change::Full(element) => element,
            Change::Attributes { element, .. } => element,
        }
    }

    /// Identifier of the targeted element.
    pub fn target(&self) -> ElementId {
        self.element().id
    }

    pub fn into_element(self) -> Element {
        match self {
            Change::Full(element) => element,
            Change::Attributes { element, .. } => element,
        }
    }

    pub fn is_full(&self) -> bool {
        match self {
            Change::Full(_) => true,
            Change::Attributes { .. } => false,
        }
    }
}
