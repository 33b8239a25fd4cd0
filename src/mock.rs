//! A scripted markup collaborator for tests.

use parking_lot::Mutex;
use perch_core::{
    Change, Component, ComponentRef, ContextId, Element, ElementId, Markup, MarkupError,
};
use std::any::Any;
use std::sync::Arc;

/// A component whose rendered root is fixed.
#[derive(Debug)]
pub struct Fixture {
    pub name: &'static str,
    root: Option<Element>,
}

impl Component for Fixture {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn component(name: &'static str, root: Element) -> ComponentRef {
    Arc::new(Fixture {
        name,
        root: Some(root),
    })
}

/// A component whose template doesn’t parse.
pub fn invalid_component(name: &'static str) -> ComponentRef {
    Arc::new(Fixture { name, root: None })
}

fn fixture(component: &ComponentRef) -> &Fixture {
    component
        .as_any()
        .downcast_ref::<Fixture>()
        .expect("mock markup only handles fixtures")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupEvent {
    Mounted(&'static str, ContextId),
    Dismounted(&'static str),
    Called(ElementId, String, String),
}

#[derive(Default)]
pub struct MockMarkup {
    events: Mutex<Vec<MarkupEvent>>,
    pending: Mutex<Vec<Change>>,
}

impl MockMarkup {
    pub fn new() -> MockMarkup {
        MockMarkup::default()
    }

    pub fn events(&self) -> Vec<MarkupEvent> {
        self.events.lock().clone()
    }

    pub fn dismounts(&self, name: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, MarkupEvent::Dismounted(n) if *n == name))
            .count()
    }

    /// Queues a change for the next `changes` call.
    pub fn push_change(&self, change: Change) {
        self.pending.lock().push(change);
    }
}

impl Markup for MockMarkup {
    fn mount(&self, component: &ComponentRef, owner: ContextId) -> Result<Element, MarkupError> {
        let root = self.root(component)?;
        self.events
            .lock()
            .push(MarkupEvent::Mounted(fixture(component).name, owner));
        Ok(root)
    }

    fn dismount(&self, component: &ComponentRef) {
        self.events
            .lock()
            .push(MarkupEvent::Dismounted(fixture(component).name));
    }

    fn root(&self, component: &ComponentRef) -> Result<Element, MarkupError> {
        let fixture = fixture(component);
        fixture.root.clone().ok_or_else(|| MarkupError::Template {
            component: fixture.name.to_string(),
            reason: "unclosed tag".to_string(),
        })
    }

    fn call(&self, target: ElementId, method: &str, argument: &str) -> Result<(), MarkupError> {
        if method == "Missing" {
            return Err(MarkupError::UnknownMethod(method.to_string()));
        }
        self.events.lock().push(MarkupEvent::Called(
            target,
            method.to_string(),
            argument.to_string(),
        ));
        Ok(())
    }

    fn changes(&self, _: &ComponentRef) -> Result<Vec<Change>, MarkupError> {
        Ok(self.pending.lock().drain(..).collect())
    }
}
