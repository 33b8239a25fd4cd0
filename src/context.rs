use crate::menu;
use crate::window::{self, WindowConfig};
use perch_core::{Backend, Change, ComponentRef, ContextId, Error, Markup, Resources, Result};

/// Close lifecycle of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Normal operation.
    Live,
    /// A close was requested and the close handler is deciding.
    ClosingRequested,
    /// The native layer is closing; waiting for it to finalize.
    ClosePending,
    /// Resources released and unregistered.
    Finalized,
}

/// The kinds of native surfaces.
#[derive(Debug)]
pub enum ContextKind {
    Window(WindowConfig),
    Menu,
    MenuBar,
    ContextMenu,
    Dock,
}

impl ContextKind {
    pub fn name(&self) -> &'static str {
        match self {
            ContextKind::Window(_) => "window",
            ContextKind::Menu => "menu",
            ContextKind::MenuBar => "menu bar",
            ContextKind::ContextMenu => "context menu",
            ContextKind::Dock => "dock",
        }
    }

    /// Whether the context is backed by a native menu.
    pub fn is_menu(&self) -> bool {
        match self {
            ContextKind::Window(_) => false,
            _ => true,
        }
    }

    /// The menu bar and the dock live as long as the app and refuse to close.
    pub fn is_closable(&self) -> bool {
        match self {
            ContextKind::MenuBar | ContextKind::Dock => false,
            _ => true,
        }
    }
}

/// Outcome of a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rendered {
    /// The change reached the native layer.
    Applied,
    /// The change was rejected and logged; the previous UI is untouched.
    Skipped,
}

/// What reconcilers need besides the context itself.
pub(crate) struct Env<'a, B, M, R> {
    pub backend: &'a mut B,
    pub markup: &'a M,
    pub resources: &'a R,
}

/// A native UI surface that components can be mounted into.
#[derive(Debug)]
pub struct Context<H> {
    id: ContextId,
    kind: ContextKind,
    handle: Option<H>,
    component: Option<ComponentRef>,
    phase: Phase,
}

impl<H> Context<H> {
    pub fn new(id: ContextId, kind: ContextKind, handle: H) -> Context<H> {
        Context {
            id,
            kind,
            handle: Some(handle),
            component: None,
            phase: Phase::Live,
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn kind(&self) -> &ContextKind {
        &self.kind
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The mounted component, if any.
    pub fn component(&self) -> Option<&ComponentRef> {
        self.component.as_ref()
    }

    pub fn window_config(&self) -> Option<&WindowConfig> {
        match &self.kind {
            ContextKind::Window(config) => Some(config),
            _ => None,
        }
    }

    /// The native handle; gone once released.
    pub fn handle(&self) -> Option<&H> {
        self.handle.as_ref()
    }

    pub(crate) fn native(&mut self) -> Result<&mut H> {
        let id = self.id;
        self.handle.as_mut().ok_or(Error::NotFound(id))
    }

    pub(crate) fn take_handle(&mut self) -> Option<H> {
        self.handle.take()
    }

    pub(crate) fn take_component(&mut self) -> Option<ComponentRef> {
        self.component.take()
    }

    pub(crate) fn set_component(&mut self, component: ComponentRef) {
        debug_assert!(self.component.is_none());
        self.component = Some(component);
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Mounts a component, replacing the current one.
    ///
    /// Errors are fatal to this mount: the context is left without a component.
    pub(crate) fn mount<B, M, R>(
        &mut self,
        env: &mut Env<'_, B, M, R>,
        component: ComponentRef,
    ) -> Result<()>
    where
        B: Backend<Handle = H>,
        M: Markup,
        R: Resources,
    {
        if self.kind.is_menu() {
            menu::mount(env, self, component)?;
        } else {
            return window::mount(env, self, component);
        }

        let id = self.id;
        let menu = self.handle.as_mut().ok_or(Error::NotFound(id))?;
        let shown = match self.kind {
            ContextKind::MenuBar => env.backend.set_menu_bar(menu),
            ContextKind::Dock => env.backend.set_dock_menu(menu),
            ContextKind::ContextMenu => env.backend.show_context_menu(menu),
            _ => Ok(()),
        };
        shown.map_err(Error::backend)
    }

    /// Applies a change to the mounted component’s native counterpart.
    pub(crate) fn render<B, M, R>(&mut self, env: &mut Env<'_, B, M, R>, change: Change) -> Rendered
    where
        B: Backend<Handle = H>,
        M: Markup,
        R: Resources,
    {
        if self.kind.is_menu() {
            menu::render(env, self, change)
        } else {
            window::render(env, self, change)
        }
    }
}
