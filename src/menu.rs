//! Menu reconciler.
//!
//! Menus are never diffed: mounting rebuilds the whole native menu, and re-rendering rebuilds
//! the changed subtree from its root element.

use crate::context::{Context, Env, Rendered};
use perch_core::{
    Backend, Change, ComponentRef, Error, Markup, MenuPatch, MenuTree, Resources, Result,
};

pub(crate) fn mount<B, M, R>(
    env: &mut Env<'_, B, M, R>,
    context: &mut Context<B::Handle>,
    component: ComponentRef,
) -> Result<()>
where
    B: Backend,
    M: Markup,
    R: Resources,
{
    let id = context.id();

    if let Some(previous) = context.take_component() {
        let cleared = context
            .native()
            .and_then(|menu| env.backend.clear_menu(menu).map_err(Error::backend));
        env.markup.dismount(&previous);
        cleared?;
    }

    let root = env.markup.mount(&component, id)?;

    // build everything before touching the native menu so a bad template leaves nothing behind
    let tree = match MenuTree::build(&root, env.markup, env.resources) {
        Ok(tree) => tree,
        Err(err) => {
            env.markup.dismount(&component);
            return Err(err);
        }
    };

    let menu = context.native()?;
    let applied = apply(env.backend, menu, tree.patches())
        .and_then(|_| env.backend.activate_menu(menu, tree.root()));

    if let Err(err) = applied {
        if let Err(err) = env.backend.clear_menu(menu) {
            log::error!("menu {}: failed to clear after a failed mount: {}", id, err);
        }
        env.markup.dismount(&component);
        return Err(Error::backend(err));
    }

    log::debug!("menu {}: mounted {} nodes", id, tree.len());
    context.set_component(component);
    Ok(())
}

pub(crate) fn render<B, M, R>(
    env: &mut Env<'_, B, M, R>,
    context: &mut Context<B::Handle>,
    change: Change,
) -> Rendered
where
    B: Backend,
    M: Markup,
    R: Resources,
{
    let id = context.id();
    let target = change.target();

    match remount(env, context, change) {
        Ok(()) => Rendered::Applied,
        Err(err) => {
            log::error!("menu {}: render of {} skipped: {}", id, target, err);
            Rendered::Skipped
        }
    }
}

/// Rebuilds the subtree rooted at the change’s element; attribute-only changes included.
fn remount<B, M, R>(
    env: &mut Env<'_, B, M, R>,
    context: &mut Context<B::Handle>,
    change: Change,
) -> Result<()>
where
    B: Backend,
    M: Markup,
    R: Resources,
{
    let tree = MenuTree::build(change.element(), env.markup, env.resources)?;
    let menu = context.native()?;
    apply(env.backend, menu, tree.patches()).map_err(Error::backend)
}

fn apply<B: Backend>(
    backend: &mut B,
    menu: &mut B::Handle,
    patches: &[MenuPatch],
) -> std::result::Result<(), B::Error> {
    for patch in patches {
        backend.patch_menu(menu, patch)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextKind;
    use crate::headless::{HeadlessBackend, Instruction};
    use crate::mock::{self, MarkupEvent, MockMarkup};
    use perch_core::{AttributeMap, ContextId, Element, MenuNode, ResourceDir};

    struct Setup {
        backend: HeadlessBackend,
        markup: MockMarkup,
        resources: ResourceDir,
        context: Context<<HeadlessBackend as Backend>::Handle>,
    }

    impl Setup {
        fn new() -> Setup {
            let mut backend = HeadlessBackend::new();
            let id = ContextId::new();
            let handle = backend.new_menu(id).unwrap();
            Setup {
                backend,
                markup: MockMarkup::new(),
                resources: ResourceDir::new(env!("CARGO_MANIFEST_DIR")),
                context: Context::new(id, ContextKind::Menu, handle),
            }
        }

        fn mount(&mut self, component: ComponentRef) -> Result<()> {
            let mut env = Env {
                backend: &mut self.backend,
                markup: &self.markup,
                resources: &self.resources,
            };
            mount(&mut env, &mut self.context, component)
        }

        fn render(&mut self, change: Change) -> Rendered {
            let mut env = Env {
                backend: &mut self.backend,
                markup: &self.markup,
                resources: &self.resources,
            };
            render(&mut env, &mut self.context, change)
        }

        fn labels(&self) -> Vec<String> {
            self.backend
                .menu_items(self.context.id())
                .into_iter()
                .map(|item| item.label)
                .collect()
        }
    }

    fn menu_with(label: &str) -> Element {
        Element::new("menu").child(Element::new("menuitem").attr("label", label))
    }

    #[test]
    fn remount_replaces_everything() {
        let mut setup = Setup::new();
        let a = mock::component("A", menu_with("hello"));
        let b = mock::component("B", menu_with("world"));

        setup.mount(a).unwrap();
        assert_eq!(setup.labels(), ["hello"]);

        setup.backend.journal().clear();
        setup.mount(b.clone()).unwrap();

        assert_eq!(setup.labels(), ["world"]);
        assert!(setup.context.component().map_or(false, |c| perch_core::same_component(c, &b)));

        // A is dismounted and the menu cleared before B is constructed
        let events = setup.markup.events();
        let dismount_a = events
            .iter()
            .position(|e| *e == MarkupEvent::Dismounted("A"))
            .expect("A should be dismounted");
        let mount_b = events
            .iter()
            .position(|e| matches!(e, MarkupEvent::Mounted("B", _)))
            .expect("B should be mounted");
        assert!(dismount_a < mount_b);

        let instructions = setup.backend.journal().instructions();
        assert!(matches!(instructions.first(), Some(Instruction::ClearMenu(_))));
        assert!(matches!(instructions.last(), Some(Instruction::ActivateMenu { .. })));
    }

    #[test]
    fn sub_components_are_expanded() {
        let mut setup = Setup::new();
        let window_menu = mock::component(
            "WindowMenu",
            Element::new("menu")
                .attr("label", "Window")
                .child(Element::new("menuitem").attr("label", "Close")),
        );

        let root = Element::new("menu")
            .child(
                Element::new("menu")
                    .attr("label", "app")
                    .child(Element::new("menuitem").attr("label", "About")),
            )
            .component(window_menu);
        setup.mount(mock::component("AppMainMenu", root)).unwrap();

        let mut labels = setup.labels();
        labels.sort();
        assert_eq!(labels, ["About", "Close"]);
    }

    #[test]
    fn unsupported_tag_aborts_mount() {
        let mut setup = Setup::new();
        let root = menu_with("ok").child(Element::new("div"));

        match setup.mount(mock::component("Broken", root)) {
            Err(Error::UnsupportedMarkup { tag }) => assert_eq!(tag, "div"),
            other => panic!("expected UnsupportedMarkup, got {:?}", other),
        }

        assert!(setup.context.component().is_none());
        assert!(setup.labels().is_empty(), "nothing is built natively");
        assert_eq!(setup.backend.menu_root(setup.context.id()), None);
        assert!(setup
            .markup
            .events()
            .contains(&MarkupEvent::Dismounted("Broken")));
    }

    #[test]
    fn icon_validation() {
        let mut setup = Setup::new();
        let icon = |path: &str| {
            Element::new("menu").child(
                Element::new("menuitem")
                    .attr("label", "x")
                    .attr("icon", path),
            )
        };

        assert!(matches!(
            setup.mount(mock::component("Missing", icon("nope.png"))),
            Err(Error::ResourceInvalid { .. })
        ));
        assert!(matches!(
            setup.mount(mock::component("Extension", icon("Cargo.toml"))),
            Err(Error::ResourceInvalid { .. })
        ));
        assert!(setup
            .mount(mock::component("NoIcon", menu_with("plain")))
            .is_ok());
    }

    #[test]
    fn template_errors_are_fatal() {
        let mut setup = Setup::new();
        let component = mock::invalid_component("Unparseable");
        assert!(matches!(setup.mount(component), Err(Error::Markup(_))));
        assert!(setup.context.component().is_none());
    }

    #[test]
    fn attribute_change_remounts_subtree() {
        let mut setup = Setup::new();
        let item = Element::new("menuitem")
            .attr("label", "Quit")
            .attr("disabled", "false");
        let item_id = item.id;
        let root = Element::new("menu").child(item);
        let mut updated = root.find(item_id).unwrap().clone();
        setup.mount(mock::component("Menu", root)).unwrap();

        updated.attributes.insert("disabled".into(), "true".into());
        let mut changed = AttributeMap::new();
        changed.insert("disabled".into(), "true".into());
        assert_eq!(
            setup.render(Change::Attributes {
                element: updated,
                changed,
            }),
            Rendered::Applied
        );

        match setup.backend.menu_node(setup.context.id(), item_id) {
            Some(MenuNode::Item(item)) => assert!(item.disabled),
            other => panic!("expected an item, got {:?}", other),
        }
    }

    #[test]
    fn failed_render_leaves_menu_untouched() {
        let mut setup = Setup::new();
        let root = menu_with("hello");
        let root_id = root.id;
        setup.mount(mock::component("Menu", root)).unwrap();
        setup.backend.journal().clear();

        let broken = Element::with_id(root_id, "menu").child(Element::new("button"));
        assert_eq!(setup.render(Change::Full(broken)), Rendered::Skipped);
        assert!(setup.backend.journal().instructions().is_empty());
        assert_eq!(setup.labels(), ["hello"]);

        let with_icon = Element::with_id(root_id, "menu")
            .child(Element::new("menuitem").attr("icon", "gone.png"));
        assert_eq!(setup.render(Change::Full(with_icon)), Rendered::Skipped);
        assert_eq!(setup.labels(), ["hello"]);
    }

    #[test]
    fn failed_clear_still_dismounts_previous() {
        let mut setup = Setup::new();
        setup.mount(mock::component("A", menu_with("hello"))).unwrap();

        setup.backend.discard(setup.context.id());
        assert!(matches!(
            setup.mount(mock::component("B", menu_with("world"))),
            Err(Error::Backend(_))
        ));

        let events = setup.markup.events();
        assert!(events.contains(&MarkupEvent::Dismounted("A")));
        assert!(!events.iter().any(|e| matches!(e, MarkupEvent::Mounted("B", _))));
        assert!(setup.context.component().is_none());
    }

    #[test]
    fn full_render_drops_removed_children() {
        let mut setup = Setup::new();
        let a = Element::new("menuitem").attr("label", "a");
        let b = Element::new("menuitem").attr("label", "b");
        let (a_id, b_id) = (a.id, b.id);
        let root = Element::new("menu").child(a).child(b);
        let root_id = root.id;
        setup.mount(mock::component("Menu", root)).unwrap();
        assert_eq!(setup.labels(), ["a", "b"]);

        let kept = Element::with_id(a_id, "menuitem").attr("label", "a");
        let full = Element::with_id(root_id, "menu").child(kept);
        assert_eq!(setup.render(Change::Full(full)), Rendered::Applied);

        let id = setup.context.id();
        assert_eq!(setup.labels(), ["a"]);
        assert!(setup.backend.menu_node(id, b_id).is_none());
        assert_eq!(setup.backend.menu_parent(id, b_id), None);
        assert_eq!(setup.backend.menu_parent(id, a_id), Some(root_id));
        assert_eq!(setup.backend.menu_root(id), Some(root_id));
    }

    #[test]
    fn full_render_reorders_children() {
        let mut setup = Setup::new();
        let a = Element::new("menuitem").attr("label", "a");
        let b = Element::new("menuitem").attr("label", "b");
        let (a_id, b_id) = (a.id, b.id);
        let root = Element::new("menu").child(a).child(b);
        let root_id = root.id;
        setup.mount(mock::component("Menu", root)).unwrap();

        let full = Element::with_id(root_id, "menu")
            .child(Element::with_id(b_id, "menuitem").attr("label", "b"))
            .child(Element::with_id(a_id, "menuitem").attr("label", "a"));
        assert_eq!(setup.render(Change::Full(full)), Rendered::Applied);

        let id = setup.context.id();
        assert_eq!(setup.labels(), ["b", "a"]);
        assert_eq!(setup.backend.menu_parent(id, a_id), Some(root_id));
        assert_eq!(setup.backend.menu_parent(id, b_id), Some(root_id));
    }
}
