//! A backend without a screen.
//!
//! Records every instruction it receives and keeps a model of the native menus and windows it
//! would have built.

use cgmath::{Point2, Vector2};
use parking_lot::Mutex;
use perch_core::{
    Backend, ContextId, ElementId, MenuContainer, MenuItem, MenuNode, Rect, SurfaceInstruction,
    WindowSettings,
};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// A call received by the headless backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    NewMenu(ContextId),
    ClearMenu(ContextId),
    MountContainer {
        menu: ContextId,
        container: MenuContainer,
    },
    MountItem {
        menu: ContextId,
        item: MenuItem,
    },
    Associate {
        menu: ContextId,
        parent: ElementId,
        child: ElementId,
    },
    ActivateMenu {
        menu: ContextId,
        root: ElementId,
    },
    SetMenuBar(ContextId),
    SetDockMenu(ContextId),
    ShowContextMenu(ContextId),
    NewWindow {
        context: ContextId,
        settings: WindowSettings,
        document: String,
    },
    Surface {
        window: ContextId,
        instruction: SurfaceInstruction,
    },
    Move {
        window: ContextId,
        origin: Point2<f64>,
    },
    Resize {
        window: ContextId,
        size: Vector2<f64>,
    },
    Close(ContextId),
    Release(ContextId),
}

/// Shared log of instructions; clones see the same log.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Instruction>>>);

impl Journal {
    fn push(&self, instruction: Instruction) {
        self.0.lock().push(instruction);
    }

    pub fn instructions(&self) -> Vec<Instruction> {
        self.0.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }

    /// Surface instructions sent to a window, in order.
    pub fn surface(&self, window: ContextId) -> Vec<SurfaceInstruction> {
        self.0
            .lock()
            .iter()
            .filter_map(|i| match i {
                Instruction::Surface {
                    window: w,
                    instruction,
                } if *w == window => Some(instruction.clone()),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Error)]
pub enum HeadlessError {
    #[error("no native resource for context {0}")]
    UnknownContext(ContextId),
    #[error("menu {menu} has no node {node}")]
    NoSuchNode { menu: ContextId, node: ElementId },
}

/// Handle to a headless menu or window.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct HeadlessHandle {
    context: ContextId,
}

impl HeadlessHandle {
    pub fn context(&self) -> ContextId {
        self.context
    }
}

#[derive(Debug, Default)]
struct NativeMenu {
    nodes: HashMap<ElementId, MenuNode>,
    parents: HashMap<ElementId, ElementId>,
    children: HashMap<ElementId, Vec<ElementId>>,
    root: Option<ElementId>,
}

impl NativeMenu {
    /// Drops every node below `id`, keeping `id` itself.
    fn drop_descendants(&mut self, id: ElementId) {
        let mut pending = self.children.insert(id, Vec::new()).unwrap_or_default();
        while let Some(child) = pending.pop() {
            self.nodes.remove(&child);
            self.parents.remove(&child);
            if self.root == Some(child) {
                self.root = None;
            }
            pending.extend(self.children.remove(&child).into_iter().flatten());
        }
    }

    fn collect_items(&self, id: ElementId, items: &mut Vec<MenuItem>) {
        match self.nodes.get(&id) {
            Some(MenuNode::Item(item)) => items.push(item.clone()),
            Some(MenuNode::Container(_)) => {}
            None => return,
        }
        for child in self.children.get(&id).into_iter().flatten() {
            self.collect_items(*child, items);
        }
    }
}

/// See the module documentation.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    journal: Journal,
    menus: HashMap<ContextId, NativeMenu>,
    windows: HashMap<ContextId, Rect>,
}

impl HeadlessBackend {
    pub fn new() -> HeadlessBackend {
        HeadlessBackend::default()
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Whether a native resource for the context still exists.
    pub fn is_live(&self, context: ContextId) -> bool {
        self.menus.contains_key(&context) || self.windows.contains_key(&context)
    }

    /// The active root of a menu.
    pub fn menu_root(&self, menu: ContextId) -> Option<ElementId> {
        self.menus.get(&menu).and_then(|m| m.root)
    }

    pub fn menu_node(&self, menu: ContextId, node: ElementId) -> Option<&MenuNode> {
        self.menus.get(&menu).and_then(|m| m.nodes.get(&node))
    }

    pub fn menu_parent(&self, menu: ContextId, node: ElementId) -> Option<ElementId> {
        self.menus
            .get(&menu)
            .and_then(|m| m.parents.get(&node))
            .copied()
    }

    /// Items reachable from the active root, depth first.
    pub fn menu_items(&self, menu: ContextId) -> Vec<MenuItem> {
        let mut items = Vec::new();
        if let Some(menu) = self.menus.get(&menu) {
            if let Some(root) = menu.root {
                menu.collect_items(root, &mut items);
            }
        }
        items
    }

    /// Discards the native resources of a context as if the platform had torn them down. Later
    /// calls through its handle fail with [`HeadlessError::UnknownContext`].
    pub fn discard(&mut self, context: ContextId) {
        self.menus.remove(&context);
        self.windows.remove(&context);
    }

    fn menu_mut(&mut self, menu: &HeadlessHandle) -> Result<&mut NativeMenu, HeadlessError> {
        self.menus
            .get_mut(&menu.context)
            .ok_or(HeadlessError::UnknownContext(menu.context))
    }

    fn mount_node(&mut self, menu: &HeadlessHandle, node: MenuNode) -> Result<(), HeadlessError> {
        let native = self.menu_mut(menu)?;
        if native.nodes.contains_key(&node.id()) {
            native.drop_descendants(node.id());
        } else {
            native.children.insert(node.id(), Vec::new());
        }
        native.nodes.insert(node.id(), node);
        Ok(())
    }
}

impl Backend for HeadlessBackend {
    type Handle = HeadlessHandle;
    type Error = HeadlessError;

    fn new_menu(&mut self, context: ContextId) -> Result<HeadlessHandle, HeadlessError> {
        self.journal.push(Instruction::NewMenu(context));
        self.menus.insert(context, NativeMenu::default());
        Ok(HeadlessHandle { context })
    }

    fn clear_menu(&mut self, menu: &mut HeadlessHandle) -> Result<(), HeadlessError> {
        self.journal.push(Instruction::ClearMenu(menu.context));
        *self.menu_mut(menu)? = NativeMenu::default();
        Ok(())
    }

    fn mount_container(
        &mut self,
        menu: &mut HeadlessHandle,
        container: &MenuContainer,
    ) -> Result<(), HeadlessError> {
        self.journal.push(Instruction::MountContainer {
            menu: menu.context,
            container: container.clone(),
        });
        self.mount_node(menu, MenuNode::Container(container.clone()))
    }

    fn mount_item(
        &mut self,
        menu: &mut HeadlessHandle,
        item: &MenuItem,
    ) -> Result<(), HeadlessError> {
        self.journal.push(Instruction::MountItem {
            menu: menu.context,
            item: item.clone(),
        });
        self.mount_node(menu, MenuNode::Item(item.clone()))
    }

    fn associate(
        &mut self,
        menu: &mut HeadlessHandle,
        parent: ElementId,
        child: ElementId,
    ) -> Result<(), HeadlessError> {
        self.journal.push(Instruction::Associate {
            menu: menu.context,
            parent,
            child,
        });

        let context = menu.context;
        let native = self.menu_mut(menu)?;
        for node in &[parent, child] {
            if !native.nodes.contains_key(node) {
                return Err(HeadlessError::NoSuchNode {
                    menu: context,
                    node: *node,
                });
            }
        }

        if let Some(previous) = native.parents.insert(child, parent) {
            if let Some(siblings) = native.children.get_mut(&previous) {
                siblings.retain(|id| *id != child);
            }
        }
        native.children.entry(parent).or_insert_with(Vec::new).push(child);
        Ok(())
    }

    fn activate_menu(
        &mut self,
        menu: &mut HeadlessHandle,
        root: ElementId,
    ) -> Result<(), HeadlessError> {
        self.journal.push(Instruction::ActivateMenu {
            menu: menu.context,
            root,
        });

        let context = menu.context;
        let native = self.menu_mut(menu)?;
        if !native.nodes.contains_key(&root) {
            return Err(HeadlessError::NoSuchNode {
                menu: context,
                node: root,
            });
        }
        native.root = Some(root);
        Ok(())
    }

    fn set_menu_bar(&mut self, menu: &HeadlessHandle) -> Result<(), HeadlessError> {
        self.journal.push(Instruction::SetMenuBar(menu.context));
        Ok(())
    }

    fn set_dock_menu(&mut self, menu: &HeadlessHandle) -> Result<(), HeadlessError> {
        self.journal.push(Instruction::SetDockMenu(menu.context));
        Ok(())
    }

    fn show_context_menu(&mut self, menu: &mut HeadlessHandle) -> Result<(), HeadlessError> {
        self.journal.push(Instruction::ShowContextMenu(menu.context));
        Ok(())
    }

    fn new_window(
        &mut self,
        context: ContextId,
        settings: &WindowSettings,
        document: &str,
    ) -> Result<HeadlessHandle, HeadlessError> {
        self.journal.push(Instruction::NewWindow {
            context,
            settings: settings.clone(),
            document: document.to_string(),
        });
        self.windows.insert(context, settings.frame);
        Ok(HeadlessHandle { context })
    }

    fn surface(
        &mut self,
        window: &mut HeadlessHandle,
        instruction: &SurfaceInstruction,
    ) -> Result<(), HeadlessError> {
        if !self.windows.contains_key(&window.context) {
            return Err(HeadlessError::UnknownContext(window.context));
        }
        self.journal.push(Instruction::Surface {
            window: window.context,
            instruction: instruction.clone(),
        });
        Ok(())
    }

    fn frame(&self, window: &HeadlessHandle) -> Rect {
        self.windows
            .get(&window.context)
            .copied()
            .unwrap_or_else(Rect::zero)
    }

    fn move_to(&mut self, window: &mut HeadlessHandle, origin: Point2<f64>) {
        self.journal.push(Instruction::Move {
            window: window.context,
            origin,
        });
        if let Some(frame) = self.windows.get_mut(&window.context) {
            *frame = frame.with_origin(origin);
        }
    }

    fn resize(&mut self, window: &mut HeadlessHandle, size: Vector2<f64>) {
        self.journal.push(Instruction::Resize {
            window: window.context,
            size,
        });
        if let Some(frame) = self.windows.get_mut(&window.context) {
            *frame = frame.with_size(size);
        }
    }

    fn close(&mut self, handle: &mut HeadlessHandle) {
        self.journal.push(Instruction::Close(handle.context));
    }

    fn release(&mut self, handle: HeadlessHandle) {
        self.journal.push(Instruction::Release(handle.context));
        self.menus.remove(&handle.context);
        self.windows.remove(&handle.context);
    }
}
