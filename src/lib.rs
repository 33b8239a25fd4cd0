//! Reconciles component trees into native windows and menus.
//!
//! See [`perch_core`] for the element model and the collaborator traits.

mod config;
mod context;
mod driver;
pub mod events;
pub mod headless;
mod host;
mod menu;
#[cfg(test)]
mod mock;
mod registry;
mod teardown;
mod window;

pub use config::Config;
pub use context::{Context, ContextKind, Phase, Rendered};
pub use driver::Driver;
pub use events::{AppHandlers, Handler, NativeEvent};
pub use host::{EventSender, Task};
pub use registry::{Registry, SharedContext};
pub use teardown::CloseOutcome;
pub use window::{WindowConfig, WindowHandlers, BRIDGE_STATEMENT};

pub use perch_core;
