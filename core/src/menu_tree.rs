//! Native menu projection of an element tree.
//!
//! A [`MenuTree`] is built from an element subtree in one pass that validates the menu
//! vocabulary and composition rules and records the native instructions to create it. Nothing
//! reaches the backend until the whole subtree is valid.

use crate::element::{Element, Node, ParentRef};
use crate::error::{Error, Result};
use crate::id::ElementId;
use crate::markup::Markup;
use crate::resources::Resources;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

pub const MENU_TAG: &str = "menu";
pub const MENU_ITEM_TAG: &str = "menuitem";

/// A menu that may contain other menus and items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuContainer {
    pub id: ElementId,
    pub label: String,
}

/// A clickable menu entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub id: ElementId,
    pub label: String,
    /// Resolved and validated icon path.
    pub icon: Option<PathBuf>,
    pub shortcut: Option<String>,
    /// Native selector passed through untouched (e.g. `terminate:`).
    pub selector: Option<String>,
    /// Name of the component method called on click.
    pub on_click: Option<String>,
    pub disabled: bool,
    /// Draw a separator before this item.
    pub separator: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuNode {
    Container(MenuContainer),
    Item(MenuItem),
}

impl MenuNode {
    pub fn id(&self) -> ElementId {
        match self {
            MenuNode::Container(c) => c.id,
            MenuNode::Item(i) => i.id,
        }
    }

    pub fn is_container(&self) -> bool {
        match self {
            MenuNode::Container(_) => true,
            MenuNode::Item(_) => false,
        }
    }
}

/// Instructions for the native menu, in the order they must be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuPatch {
    /// Creates or replaces a container.
    Container(MenuContainer),
    /// Creates or replaces an item.
    Item(MenuItem),
    /// Sets up a parent-child relationship.
    Associate { parent: ElementId, child: ElementId },
}

struct MenuTreeNode {
    node: MenuNode,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

/// A validated menu subtree and the patches that build it.
pub struct MenuTree {
    root: ElementId,
    nodes: HashMap<ElementId, MenuTreeNode>,
    patches: Vec<MenuPatch>,
}

impl MenuTree {
    /// Projects an element subtree.
    ///
    /// The root is validated against its own parent reference; descendants against the node
    /// they were walked from. Sub-components are replaced with their rendered roots.
    pub fn build<M, R>(root: &Element, markup: &M, resources: &R) -> Result<MenuTree>
    where
        M: Markup + ?Sized,
        R: Resources + ?Sized,
    {
        let mut tree = MenuTree {
            root: root.id,
            nodes: HashMap::new(),
            patches: Vec::new(),
        };
        tree.walk(root, root.parent.as_ref(), markup, resources)?;
        Ok(tree)
    }

    fn walk<M, R>(
        &mut self,
        element: &Element,
        parent: Option<&ParentRef>,
        markup: &M,
        resources: &R,
    ) -> Result<()>
    where
        M: Markup + ?Sized,
        R: Resources + ?Sized,
    {
        let node = match element.tag.as_str() {
            MENU_TAG => MenuNode::Container(container(element, parent)?),
            MENU_ITEM_TAG => MenuNode::Item(item(element, parent, resources)?),
            tag => {
                return Err(Error::UnsupportedMarkup {
                    tag: tag.to_string(),
                })
            }
        };

        self.patches.push(match &node {
            MenuNode::Container(c) => MenuPatch::Container(c.clone()),
            MenuNode::Item(i) => MenuPatch::Item(i.clone()),
        });
        self.nodes.insert(
            element.id,
            MenuTreeNode {
                node,
                parent: parent.map(|p| p.id),
                children: Vec::new(),
            },
        );

        let as_parent = element.as_parent();

        for child in &element.children {
            let child = match child {
                Node::Element(e) => Cow::Borrowed(e),
                Node::Component(c) => Cow::Owned(markup.root(c)?),
                Node::Text(text) if text.trim().is_empty() => continue,
                Node::Text(_) => {
                    return Err(Error::UnsupportedMarkup {
                        tag: "#text".to_string(),
                    })
                }
            };

            self.walk(&child, Some(&as_parent), markup, resources)?;
            self.patches.push(MenuPatch::Associate {
                parent: element.id,
                child: child.id,
            });
            if let Some(node) = self.nodes.get_mut(&element.id) {
                node.children.push(child.id);
            }
        }

        Ok(())
    }

    /// Identifier of the subtree root.
    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: ElementId) -> Option<&MenuNode> {
        self.nodes.get(&id).map(|n| &n.node)
    }

    /// The parent of a node; for the root, the parent outside the subtree (if any).
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.nodes.get(&id).map_or(&[], |n| &n.children)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &MenuNode> {
        self.nodes.values().map(|n| &n.node)
    }

    pub fn patches(&self) -> &[MenuPatch] {
        &self.patches
    }

    pub fn into_patches(self) -> Vec<MenuPatch> {
        self.patches
    }
}

fn check_parent(element: &Element, parent: Option<&ParentRef>, allow_root: bool) -> Result<()> {
    match parent {
        Some(p) if p.tag == MENU_TAG => Ok(()),
        None if allow_root => Ok(()),
        _ => Err(Error::InvalidComposition {
            element: element.id,
            tag: element.tag.clone(),
            parent: parent.map(|p| p.tag.clone()),
        }),
    }
}

fn container(element: &Element, parent: Option<&ParentRef>) -> Result<MenuContainer> {
    check_parent(element, parent, true)?;

    Ok(MenuContainer {
        id: element.id,
        label: element.get("label").unwrap_or_default().to_string(),
    })
}

fn item<R: Resources + ?Sized>(
    element: &Element,
    parent: Option<&ParentRef>,
    resources: &R,
) -> Result<MenuItem> {
    check_parent(element, parent, false)?;

    let non_empty = |key: &str| {
        element
            .get(key)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let icon = match element.get("icon").filter(|v| !v.is_empty()) {
        Some(icon) => Some(icon_path(icon, resources)?),
        None => None,
    };

    Ok(MenuItem {
        id: element.id,
        label: element.get("label").unwrap_or_default().to_string(),
        icon,
        shortcut: non_empty("shortcut"),
        selector: non_empty("selector"),
        on_click: non_empty("_onclick"),
        disabled: element.get("disabled").map_or(false, parse_bool),
        separator: element.get("separator").map_or(false, parse_bool),
    })
}

fn icon_path<R: Resources + ?Sized>(icon: &str, resources: &R) -> Result<PathBuf> {
    let path = resources.resolve(icon);

    if !resources.is_supported_image(&path) {
        return Err(Error::ResourceInvalid {
            path,
            reason: "image extension is not supported".to_string(),
        });
    }

    if let Err(err) = fs::metadata(&path) {
        return Err(Error::ResourceInvalid {
            path,
            reason: err.to_string(),
        });
    }

    Ok(path)
}

/// Lenient boolean attribute parsing; anything unrecognized is false.
pub fn parse_bool(value: &str) -> bool {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => true,
        _ => false,
    }
}
