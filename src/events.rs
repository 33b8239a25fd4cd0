//! Native-originated events.

use cgmath::{Point2, Vector2};
use crossbeam::channel::Sender;
use parking_lot::Mutex;
use perch_core::{ContextId, ElementId};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Reply channel for questions the native layer needs answered synchronously.
pub type Reply = Sender<bool>;

/// Notifications from the native layer.
///
/// All of these are funneled through the event channel and handled one at a time.
#[derive(Debug)]
pub enum NativeEvent {
    /// The app finished launching.
    Launched,
    /// The app became active.
    Focused,
    /// The app resigned active.
    Blurred,
    /// The app was reopened (e.g. its dock icon was clicked).
    Reopened { has_visible_windows: bool },
    /// The app was asked to open a file.
    FileOpened(PathBuf),
    /// The app is about to terminate; reply false to cancel.
    TerminateRequested(Reply),
    /// The app is terminating.
    Finalized,

    WindowMoved {
        context: ContextId,
        origin: Point2<f64>,
    },
    WindowResized {
        context: ContextId,
        size: Vector2<f64>,
    },
    WindowFocused(ContextId),
    WindowBlurred(ContextId),
    WindowMinimized(ContextId),
    WindowDeminimized(ContextId),
    WindowFullScreen(ContextId),
    WindowExitFullScreen(ContextId),

    /// The user asked to close a context; reply false to veto.
    CloseRequested { context: ContextId, reply: Reply },
    /// The native layer finished closing a context. May be delivered more than once.
    CloseFinalized(ContextId),

    /// A menu item with a click handler was clicked.
    MenuItemClicked {
        context: ContextId,
        item: ElementId,
        handler: String,
    },

    /// A rendering surface called a component method.
    ScriptCall {
        element: ElementId,
        method: String,
        /// JSON-encoded argument.
        argument: String,
    },
    /// A rendering surface raised an alert.
    ScriptAlert(String),
}

#[derive(Deserialize)]
struct ScriptMessage {
    id: String,
    method: String,
    #[serde(default)]
    arg: String,
}

impl NativeEvent {
    /// Decodes a message posted by the surface bridge script.
    ///
    /// Messages look like `{"id": "<element id>", "method": "OnClick", "arg": "<json>"}`.
    pub fn script_call(message: &str) -> Result<NativeEvent, serde_json::Error> {
        use serde::de::Error as _;

        let msg: ScriptMessage = serde_json::from_str(message)?;
        let element = msg.id.parse().map_err(serde_json::Error::custom)?;

        Ok(NativeEvent::ScriptCall {
            element,
            method: msg.method,
            argument: msg.arg,
        })
    }
}

/// A callback registered by the app.
pub struct Handler<A, R = ()>(Arc<Mutex<dyn FnMut(A) -> R + Send>>);

impl<A, R> Clone for Handler<A, R> {
    fn clone(&self) -> Self {
        Handler(Arc::clone(&self.0))
    }
}

impl<A, R> Handler<A, R> {
    pub fn new<F: 'static + FnMut(A) -> R + Send>(handler: F) -> Self {
        Handler(Arc::new(Mutex::new(handler)))
    }

    pub fn call(&self, arg: A) -> R {
        let mut handler = self.0.lock();
        (&mut *handler)(arg)
    }
}

impl<A, R> fmt::Debug for Handler<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Handler")
    }
}

/// Application-level callbacks.
#[derive(Debug, Clone, Default)]
pub struct AppHandlers {
    pub on_launch: Option<Handler<()>>,
    pub on_focus: Option<Handler<()>>,
    pub on_blur: Option<Handler<()>>,
    /// Receives whether any window is visible.
    pub on_reopen: Option<Handler<bool>>,
    pub on_file_open: Option<Handler<PathBuf>>,
    /// Returning false cancels termination.
    pub on_terminate: Option<Handler<(), bool>>,
    pub on_finalize: Option<Handler<()>>,
}

impl AppHandlers {
    pub fn on_launch<F: 'static + FnMut(()) + Send>(mut self, f: F) -> Self {
        self.on_launch = Some(Handler::new(f));
        self
    }

    pub fn on_focus<F: 'static + FnMut(()) + Send>(mut self, f: F) -> Self {
        self.on_focus = Some(Handler::new(f));
        self
    }

    pub fn on_blur<F: 'static + FnMut(()) + Send>(mut self, f: F) -> Self {
        self.on_blur = Some(Handler::new(f));
        self
    }

    pub fn on_reopen<F: 'static + FnMut(bool) + Send>(mut self, f: F) -> Self {
        self.on_reopen = Some(Handler::new(f));
        self
    }

    pub fn on_file_open<F: 'static + FnMut(PathBuf) + Send>(mut self, f: F) -> Self {
        self.on_file_open = Some(Handler::new(f));
        self
    }

    pub fn on_terminate<F: 'static + FnMut(()) -> bool + Send>(mut self, f: F) -> Self {
        self.on_terminate = Some(Handler::new(f));
        self
    }

    pub fn on_finalize<F: 'static + FnMut(()) + Send>(mut self, f: F) -> Self {
        self.on_finalize = Some(Handler::new(f));
        self
    }
}
