//! Core types for perch.
//!
//! # Conceptual overview
//! Perch connects a declarative, component-based UI description to native UI surfaces
//! (windows, menus, the menu bar, context menus and the dock) that are addressed by opaque
//! identifiers.
//!
//! ## Contexts
//! A context is any native surface that can hold a mounted component. Every context has a
//! [`ContextId`] that is generated when it is created and that the native layer hands back in
//! its callbacks. Contexts live in a registry until their close has been finalized.
//!
//! ## Elements and components
//! Components are owned by a markup collaborator (see [`Markup`]) which renders them into
//! [`Element`] trees. Element identifiers are stable across re-renders of the same logical
//! node, so later changes can be addressed at the native counterpart of that node. A re-render
//! produces [`Change`]s: either a full replacement of a subtree or a patch of a few attributes.
//!
//! ## Menus
//! Menu contexts only understand two tags: `menu` (a container) and `menuitem` (an item). A
//! [`MenuTree`] validates an element tree against those rules and turns it into the ordered
//! [`MenuPatch`]es that build the native menu. Menus are never diffed; they are rebuilt.
//!
//! ## Windows
//! Windows host a rendering surface that receives the component as a document and is kept in
//! sync with [`SurfaceInstruction`]s.
//!
//! ## Backends
//! Backends are platform-specific UI toolkits abstracted to the [`Backend`] trait. They own the
//! native handles; a handle is released only when its context is finalized.

pub mod backend;
mod change;
pub mod color;
mod element;
mod error;
mod id;
mod markup;
pub mod menu_tree;
mod rect;
pub mod resources;

pub use backend::{Backend, SurfaceInstruction, WindowSettings};
pub use change::Change;
pub use color::Color;
pub use element::{
    escape, same_component, AttributeMap, Component, ComponentRef, Element, Node, ParentRef,
};
pub use error::{Error, Result};
pub use id::{ContextId, ElementId};
pub use markup::{Markup, MarkupError};
pub use menu_tree::{MenuContainer, MenuItem, MenuNode, MenuPatch, MenuTree};
pub use rect::Rect;
pub use resources::{ResourceDir, Resources};

pub use cgmath::{Point2, Vector2};
