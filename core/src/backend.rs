//! Traits for backends.

use crate::color::Color;
use crate::id::{ContextId, ElementId};
use crate::menu_tree::{MenuContainer, MenuItem, MenuPatch};
use crate::rect::Rect;
use cgmath::{Point2, Vector2};

/// Native window attributes fixed at creation.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSettings {
    pub title: String,
    pub frame: Rect,
    pub background: Option<Color>,
    pub borderless: bool,
    pub fixed_size: bool,
    pub close_hidden: bool,
    pub minimize_hidden: bool,
    pub titlebar_hidden: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        WindowSettings {
            title: String::new(),
            frame: Rect::default(),
            background: None,
            borderless: false,
            fixed_size: false,
            close_hidden: false,
            minimize_hidden: false,
            titlebar_hidden: false,
        }
    }
}

/// One-way instructions for a window’s rendering surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceInstruction {
    /// Loads a component’s whole document.
    LoadDocument { context: ContextId, document: String },
    /// Replaces the subtree of an element.
    ReplaceElement { element: ElementId, markup: String },
    /// Sets attributes on an element; `attributes` is a JSON object of the changed pairs.
    PatchAttributes { element: ElementId, attributes: String },
}

impl SurfaceInstruction {
    /// Renders the instruction as the script call the surface bridge evaluates.
    pub fn to_script(&self) -> String {
        let quote = |s: &str| serde_json::Value::from(s).to_string();

        match self {
            SurfaceInstruction::LoadDocument { context, document } => {
                format!("Mount(\"{}\", {})", context, quote(document))
            }
            SurfaceInstruction::ReplaceElement { element, markup } => {
                format!("RenderFull(\"{}\", {})", element, quote(markup))
            }
            SurfaceInstruction::PatchAttributes {
                element,
                attributes,
            } => format!("RenderAttributes(\"{}\", {})", element, attributes),
        }
    }
}

/// A native UI backend.
///
/// All methods are called from the thread that owns the driver. Handles are released exactly
/// once, through [`Backend::release`].
pub trait Backend {
    /// A native menu or window.
    type Handle: Send + 'static;

    /// Error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Creates an empty native menu for a context.
    fn new_menu(&mut self, context: ContextId) -> Result<Self::Handle, Self::Error>;

    /// Removes everything from a menu.
    fn clear_menu(&mut self, menu: &mut Self::Handle) -> Result<(), Self::Error>;

    /// Creates a container, or replaces the one with the same id along with its children.
    fn mount_container(
        &mut self,
        menu: &mut Self::Handle,
        container: &MenuContainer,
    ) -> Result<(), Self::Error>;

    /// Creates an item, or replaces the one with the same id.
    fn mount_item(&mut self, menu: &mut Self::Handle, item: &MenuItem) -> Result<(), Self::Error>;

    /// Sets up a parent-child relationship.
    fn associate(
        &mut self,
        menu: &mut Self::Handle,
        parent: ElementId,
        child: ElementId,
    ) -> Result<(), Self::Error>;

    /// Makes the node the visible root of the menu.
    fn activate_menu(&mut self, menu: &mut Self::Handle, root: ElementId)
        -> Result<(), Self::Error>;

    /// Applies a menu patch.
    fn patch_menu(
        &mut self,
        menu: &mut Self::Handle,
        patch: &MenuPatch,
    ) -> Result<(), Self::Error> {
        match patch {
            MenuPatch::Container(container) => self.mount_container(menu, container),
            MenuPatch::Item(item) => self.mount_item(menu, item),
            MenuPatch::Associate { parent, child } => self.associate(menu, *parent, *child),
        }
    }

    fn set_menu_bar(&mut self, menu: &Self::Handle) -> Result<(), Self::Error>;

    fn set_dock_menu(&mut self, menu: &Self::Handle) -> Result<(), Self::Error>;

    /// Pops up a context menu at the pointer.
    fn show_context_menu(&mut self, menu: &mut Self::Handle) -> Result<(), Self::Error>;

    /// Creates a window showing `document`.
    fn new_window(
        &mut self,
        context: ContextId,
        settings: &WindowSettings,
        document: &str,
    ) -> Result<Self::Handle, Self::Error>;

    /// Sends an instruction to a window’s rendering surface. Does not wait for it to apply.
    fn surface(
        &mut self,
        window: &mut Self::Handle,
        instruction: &SurfaceInstruction,
    ) -> Result<(), Self::Error>;

    /// The window frame.
    fn frame(&self, window: &Self::Handle) -> Rect;

    fn move_to(&mut self, window: &mut Self::Handle, origin: Point2<f64>);

    fn resize(&mut self, window: &mut Self::Handle, size: Vector2<f64>);

    /// Starts closing a window or menu.
    ///
    /// The native layer reports completion later with a close-finalized notification.
    fn close(&mut self, handle: &mut Self::Handle);

    /// Frees the native resource.
    fn release(&mut self, handle: Self::Handle);
}
