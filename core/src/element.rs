//! The rendered markup tree.
//!
//! Elements are produced by the markup collaborator; this crate only reads them.

use crate::id::ElementId;
use core::any::Any;
use core::fmt;
use indexmap::IndexMap;
use std::sync::Arc;

/// Ordered attribute map; iteration follows document order.
pub type AttributeMap = IndexMap<String, String>;

/// A component instance owned by the markup collaborator.
///
/// Components are opaque here: they are only passed back to the collaborator.
pub trait Component: Any + fmt::Debug + Send + Sync {
    /// For downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// Shared reference to a component instance.
pub type ComponentRef = Arc<dyn Component>;

/// Returns true if both references point at the same component instance.
pub fn same_component(a: &ComponentRef, b: &ComponentRef) -> bool {
    Arc::ptr_eq(a, b)
}

/// Lookup-only reference to an element’s parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    pub id: ElementId,
    pub tag: String,
}

/// A child node of an element.
#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(String),
    /// A sub-component embedded in markup; its rendered root stands in for it.
    Component(ComponentRef),
}

/// A node in a rendered markup tree.
#[derive(Debug, Clone)]
pub struct Element {
    pub id: ElementId,
    pub tag: String,
    pub attributes: AttributeMap,
    pub parent: Option<ParentRef>,
    pub children: Vec<Node>,
}

impl Element {
    /// Creates a parentless element with a fresh identifier.
    pub fn new(tag: impl Into<String>) -> Element {
        Element::with_id(ElementId::new(), tag)
    }

    /// Creates a parentless element with the given identifier.
    pub fn with_id(id: ElementId, tag: impl Into<String>) -> Element {
        Element {
            id,
            tag: tag.into(),
            attributes: AttributeMap::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// Sets an attribute.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Element {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Appends a child element, pointing its parent reference at `self`.
    pub fn child(mut self, mut child: Element) -> Element {
        child.parent = Some(self.as_parent());
        self.children.push(Node::Element(child));
        self
    }

    /// Appends a text node.
    pub fn text(mut self, text: impl Into<String>) -> Element {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Appends a sub-component reference.
    pub fn component(mut self, component: ComponentRef) -> Element {
        self.children.push(Node::Component(component));
        self
    }

    /// A parent reference pointing at this element.
    pub fn as_parent(&self) -> ParentRef {
        ParentRef {
            id: self.id,
            tag: self.tag.clone(),
        }
    }

    /// Returns an attribute value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Returns the parent’s tag, if there is a parent.
    pub fn parent_tag(&self) -> Option<&str> {
        self.parent.as_ref().map(|p| p.tag.as_str())
    }

    /// Finds a descendant (or self) by identifier.
    ///
    /// Sub-component children are not searched.
    pub fn find(&self, id: ElementId) -> Option<&Element> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| match child {
            Node::Element(e) => e.find(id),
            _ => None,
        })
    }

    /// Writes this element as markup.
    ///
    /// Every element carries its identifier in a `data-perch-id` attribute so patches can find
    /// it again. Sub-components are expanded with `expand`.
    pub fn write_markup<E>(
        &self,
        out: &mut String,
        expand: &mut dyn FnMut(&ComponentRef) -> Result<Element, E>,
    ) -> Result<(), E> {
        out.push('<');
        out.push_str(&self.tag);
        out.push_str(" data-perch-id=\"");
        out.push_str(&self.id.to_string());
        out.push('"');
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            escape_into(out, value);
            out.push('"');
        }
        out.push('>');

        for child in &self.children {
            match child {
                Node::Element(e) => e.write_markup(out, expand)?,
                Node::Text(text) => escape_into(out, text),
                Node::Component(c) => expand(c)?.write_markup(out, expand)?,
            }
        }

        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
        Ok(())
    }
}

/// Escapes text for use in markup content or a quoted attribute value.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    escape_into(&mut out, s);
    out
}

fn escape_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}
