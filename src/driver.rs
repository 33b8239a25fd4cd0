use crate::config::Config;
use crate::context::{Context, ContextKind, Env, Rendered};
use crate::events::{AppHandlers, Handler, NativeEvent, Reply};
use crate::host::{EventSender, Host, Message};
use crate::registry::{Registry, SharedContext};
use crate::teardown::{self, CloseOrigin, CloseOutcome};
use crate::window::{self, WindowConfig, WindowHandlers, BRIDGE_STATEMENT};
use cgmath::{Point2, Vector2};
use perch_core::{Backend, Change, ComponentRef, ContextId, Error, Markup, Resources, Result};
use std::sync::Arc;
use std::time::Duration;

/// Owns the native backend and every context, and drains the event channel.
///
/// Everything that touches a context runs on the thread that owns the driver: caller operations
/// take `&mut self`, and native callbacks and other threads go through an [`EventSender`].
pub struct Driver<B: Backend, M, R> {
    backend: B,
    markup: M,
    resources: R,
    registry: Arc<Registry<B::Handle>>,
    host: Host<Driver<B, M, R>>,
    config: Config,
    handlers: AppHandlers,
    launched: bool,
    menu_bar: ContextId,
    dock: ContextId,
}

impl<B, M, R> Driver<B, M, R>
where
    B: Backend + 'static,
    M: Markup + 'static,
    R: Resources + 'static,
{
    /// Creates a driver along with its menu bar and dock contexts.
    pub fn new(mut backend: B, markup: M, resources: R, config: Config) -> Result<Self> {
        let registry = Arc::new(Registry::new());
        let menu_bar = register_menu(&mut backend, &registry, ContextKind::MenuBar)?;
        let dock = register_menu(&mut backend, &registry, ContextKind::Dock)?;

        Ok(Driver {
            backend,
            markup,
            resources,
            registry,
            host: Host::new(config.queue_capacity.max(1)),
            config,
            handlers: AppHandlers::default(),
            launched: false,
            menu_bar,
            dock,
        })
    }

    pub fn with_handlers(mut self, handlers: AppHandlers) -> Self {
        self.handlers = handlers;
        self
    }

    /// Returns a sender for native callbacks and other threads.
    pub fn sender(&self) -> EventSender<Self> {
        self.host.sender()
    }

    pub fn registry(&self) -> &Arc<Registry<B::Handle>> {
        &self.registry
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn markup(&self) -> &M {
        &self.markup
    }

    pub fn resources(&self) -> &R {
        &self.resources
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether the native layer reported the end of launching.
    pub fn is_launched(&self) -> bool {
        self.launched
    }

    pub fn menu_bar(&self) -> ContextId {
        self.menu_bar
    }

    pub fn dock(&self) -> ContextId {
        self.dock
    }

    /// The statement web content uses to post calls back to the driver.
    pub fn bridge_script() -> &'static str {
        BRIDGE_STATEMENT
    }

    fn ensure_launched(&self) -> Result<()> {
        if self.launched {
            Ok(())
        } else {
            Err(Error::NotLaunched)
        }
    }

    /// Creates a window. It stays empty until a component is mounted.
    pub fn new_window(&mut self, config: WindowConfig) -> Result<ContextId> {
        self.ensure_launched()?;

        let id = ContextId::new();
        let document = window::shell(id, &config, &self.resources);
        let handle = self
            .backend
            .new_window(id, &config.settings, &document)
            .map_err(Error::backend)?;
        self.registry
            .register(Context::new(id, ContextKind::Window(config), handle))?;

        log::debug!("created window {}", id);
        Ok(id)
    }

    /// Creates a context menu; it pops up when a component is mounted.
    pub fn new_context_menu(&mut self) -> Result<ContextId> {
        self.ensure_launched()?;
        register_menu(&mut self.backend, &self.registry, ContextKind::ContextMenu)
    }

    /// Creates a free-standing menu.
    pub fn new_menu(&mut self) -> Result<ContextId> {
        self.ensure_launched()?;
        register_menu(&mut self.backend, &self.registry, ContextKind::Menu)
    }

    /// Mounts a component into a context, replacing what was mounted before.
    pub fn mount(&mut self, id: ContextId, component: ComponentRef) -> Result<()> {
        let shared = self.registry.lookup(id)?;
        let mut context = shared.lock();
        match context.kind() {
            ContextKind::MenuBar | ContextKind::Dock => self.ensure_launched()?,
            _ => {}
        }

        let mut env = Env {
            backend: &mut self.backend,
            markup: &self.markup,
            resources: &self.resources,
        };
        context.mount(&mut env, component)
    }

    /// Applies a change to a context. Rejected changes are logged and reported as skipped.
    pub fn render(&mut self, id: ContextId, change: Change) -> Result<Rendered> {
        let shared = self.registry.lookup(id)?;
        let mut context = shared.lock();
        if context.component().is_none() {
            log::debug!("render on {} skipped: nothing mounted", id);
            return Ok(Rendered::Skipped);
        }

        let mut env = Env {
            backend: &mut self.backend,
            markup: &self.markup,
            resources: &self.resources,
        };
        Ok(context.render(&mut env, change))
    }

    /// Renders the changes the mounted component accumulated. Returns how many were applied.
    pub fn sync(&mut self, id: ContextId) -> Result<usize> {
        let shared = self.registry.lookup(id)?;
        let mut context = shared.lock();
        let component = match context.component() {
            Some(component) => Arc::clone(component),
            None => return Ok(0),
        };

        let mut env = Env {
            backend: &mut self.backend,
            markup: &self.markup,
            resources: &self.resources,
        };
        let mut applied = 0;
        for change in env.markup.changes(&component)? {
            if context.render(&mut env, change) == Rendered::Applied {
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// Asks a context to close, running its close handler.
    pub fn close(&mut self, id: ContextId) -> Result<CloseOutcome> {
        let shared = self.registry.lookup(id)?;
        teardown::request_close(&mut self.backend, &shared, CloseOrigin::Caller)
    }

    pub fn position(&mut self, id: ContextId) -> Result<Point2<f64>> {
        let shared = self.registry.lookup(id)?;
        let mut context = shared.lock();
        window::position(&self.backend, &mut context)
    }

    pub fn size(&mut self, id: ContextId) -> Result<Vector2<f64>> {
        let shared = self.registry.lookup(id)?;
        let mut context = shared.lock();
        window::size(&self.backend, &mut context)
    }

    pub fn move_to(&mut self, id: ContextId, origin: Point2<f64>) -> Result<()> {
        let shared = self.registry.lookup(id)?;
        let mut context = shared.lock();
        window::move_to(&mut self.backend, &mut context, origin)
    }

    pub fn resize(&mut self, id: ContextId, size: Vector2<f64>) -> Result<()> {
        let shared = self.registry.lookup(id)?;
        let mut context = shared.lock();
        window::resize(&mut self.backend, &mut context, size)
    }

    /// Handles every queued message without blocking. Returns how many were handled.
    pub fn poll(&mut self) -> usize {
        let mut handled = 0;
        while let Some(message) = self.host.try_next() {
            handled += 1;
            if !self.handle(message) {
                break;
            }
        }
        handled
    }

    /// Waits up to `timeout` for a message, then handles everything queued.
    pub fn wait(&mut self, timeout: Duration) -> usize {
        match self.host.next_timeout(timeout) {
            Some(message) => {
                if self.handle(message) {
                    1 + self.poll()
                } else {
                    1
                }
            }
            None => 0,
        }
    }

    /// Handles messages until [`EventSender::quit`] is called.
    pub fn run(&mut self) {
        while let Some(message) = self.host.next() {
            if !self.handle(message) {
                break;
            }
        }
    }

    /// Returns false to stop.
    fn handle(&mut self, message: Message<Self>) -> bool {
        match message {
            Message::Event(event) => self.handle_event(event),
            Message::Task(task) => task(self),
            Message::Finalize(id) => {
                if teardown::finalize(&mut self.backend, &self.markup, &self.registry, id) {
                    log::debug!("finalized {}", id);
                }
            }
            Message::Quit => return false,
        }
        true
    }

    fn handle_event(&mut self, event: NativeEvent) {
        match event {
            NativeEvent::Launched => {
                self.launched = true;
                if let Some(handler) = &self.handlers.on_launch {
                    handler.call(());
                }
            }
            NativeEvent::Focused => {
                if let Some(handler) = &self.handlers.on_focus {
                    handler.call(());
                }
            }
            NativeEvent::Blurred => {
                if let Some(handler) = &self.handlers.on_blur {
                    handler.call(());
                }
            }
            NativeEvent::Reopened {
                has_visible_windows,
            } => {
                if let Some(handler) = &self.handlers.on_reopen {
                    handler.call(has_visible_windows);
                }
            }
            NativeEvent::FileOpened(path) => {
                if let Some(handler) = &self.handlers.on_file_open {
                    handler.call(path);
                }
            }
            NativeEvent::TerminateRequested(reply) => {
                let allowed = self
                    .handlers
                    .on_terminate
                    .as_ref()
                    .map_or(true, |handler| handler.call(()));
                answer(reply, allowed);
            }
            NativeEvent::Finalized => {
                if let Some(handler) = &self.handlers.on_finalize {
                    handler.call(());
                }
            }

            NativeEvent::WindowMoved { context, origin } => {
                if let Some(handler) = self.window_handlers(context).and_then(|h| h.on_move) {
                    handler.call(origin);
                }
            }
            NativeEvent::WindowResized { context, size } => {
                if let Some(handler) = self.window_handlers(context).and_then(|h| h.on_resize) {
                    handler.call(size);
                }
            }
            NativeEvent::WindowFocused(context) => {
                self.window_event(context, |h| h.on_focus);
            }
            NativeEvent::WindowBlurred(context) => {
                self.window_event(context, |h| h.on_blur);
            }
            NativeEvent::WindowMinimized(context) => {
                self.window_event(context, |h| h.on_minimize);
            }
            NativeEvent::WindowDeminimized(context) => {
                self.window_event(context, |h| h.on_deminimize);
            }
            NativeEvent::WindowFullScreen(context) => {
                self.window_event(context, |h| h.on_full_screen);
            }
            NativeEvent::WindowExitFullScreen(context) => {
                self.window_event(context, |h| h.on_exit_full_screen);
            }

            NativeEvent::CloseRequested { context, reply } => {
                let allowed = match self.registry.lookup(context) {
                    Ok(shared) => {
                        let origin = CloseOrigin::Native;
                        match teardown::request_close(&mut self.backend, &shared, origin) {
                            Ok(CloseOutcome::Pending) => true,
                            Ok(CloseOutcome::Vetoed) => false,
                            Err(Error::NotClosable { .. }) => false,
                            Err(err) => {
                                log::error!("close request for {} failed: {}", context, err);
                                false
                            }
                        }
                    }
                    Err(_) => {
                        log::debug!("close request for unknown context {}", context);
                        true
                    }
                };
                answer(reply, allowed);
            }
            NativeEvent::CloseFinalized(context) => match self.registry.lookup(context) {
                Ok(shared) => {
                    if teardown::close_finalized(&shared) {
                        self.sender()
                            .finalize_after(context, self.config.finalize_delay);
                    }
                }
                Err(_) => log::debug!("finalize signal for unknown context {}", context),
            },

            NativeEvent::MenuItemClicked {
                context,
                item,
                handler,
            } => {
                if !self.registry.contains(context) {
                    log::debug!("click on {} in closed menu {}", item, context);
                    return;
                }
                if let Err(err) = self.markup.call(item, &handler, "") {
                    log::error!("menu {}: {} on {} failed: {}", context, handler, item, err);
                }
            }

            NativeEvent::ScriptCall {
                element,
                method,
                argument,
            } => {
                if let Err(err) = self.markup.call(element, &method, &argument) {
                    log::error!("{} on {} failed: {}", method, element, err);
                }
            }
            NativeEvent::ScriptAlert(message) => log::warn!("alert: {}", message),
        }
    }

    /// A copy of a window’s handlers, so they can be called without holding its lock.
    fn window_handlers(&self, id: ContextId) -> Option<WindowHandlers> {
        let shared = match self.registry.lookup(id) {
            Ok(shared) => shared,
            Err(_) => {
                log::debug!("event for unknown window {}", id);
                return None;
            }
        };
        let context = shared.lock();
        context.window_config().map(|config| config.handlers.clone())
    }

    fn window_event<F>(&self, id: ContextId, select: F)
    where
        F: FnOnce(WindowHandlers) -> Option<Handler<()>>,
    {
        if let Some(handler) = self.window_handlers(id).and_then(select) {
            handler.call(());
        }
    }
}

fn register_menu<B: Backend>(
    backend: &mut B,
    registry: &Registry<B::Handle>,
    kind: ContextKind,
) -> Result<ContextId> {
    let id = ContextId::new();
    let handle = backend.new_menu(id).map_err(Error::backend)?;
    let shared: SharedContext<B::Handle> = registry.register(Context::new(id, kind, handle))?;
    log::debug!("created {} {}", shared.lock().kind().name(), id);
    Ok(id)
}

fn answer(reply: Reply, allowed: bool) {
    if reply.send(allowed).is_err() {
        log::debug!("nobody waiting for the answer");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Phase;
    use crate::headless::{HeadlessBackend, Instruction};
    use crate::mock::{self, MarkupEvent, MockMarkup};
    use perch_core::{AttributeMap, Color, Element, Node, Rect, ResourceDir, SurfaceInstruction};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    type TestDriver = Driver<HeadlessBackend, MockMarkup, ResourceDir>;

    fn driver() -> TestDriver {
        Driver::new(
            HeadlessBackend::new(),
            MockMarkup::new(),
            ResourceDir::new(env!("CARGO_MANIFEST_DIR")),
            Config::default().with_finalize_delay(Duration::from_millis(50)),
        )
        .unwrap()
    }

    fn launched() -> TestDriver {
        let mut driver = driver();
        driver.sender().send(NativeEvent::Launched).unwrap();
        assert_eq!(driver.poll(), 1);
        assert!(driver.is_launched());
        driver
    }

    fn labels(driver: &TestDriver, id: ContextId) -> Vec<String> {
        driver
            .backend()
            .menu_items(id)
            .into_iter()
            .map(|item| item.label)
            .collect()
    }

    fn menu_with(label: &str) -> Element {
        Element::new("menu").child(Element::new("menuitem").attr("label", label))
    }

    /// Handles messages until `count` more have been handled.
    fn pump(driver: &mut TestDriver, count: usize) {
        let mut handled = 0;
        while handled < count {
            let n = driver.wait(Duration::from_secs(5));
            assert!(n > 0, "timed out waiting for messages");
            handled += n;
        }
    }

    #[test]
    fn creation_requires_launch() {
        let mut driver = driver();
        assert_eq!(driver.registry().len(), 2);
        assert!(matches!(
            driver.new_window(WindowConfig::new("w")),
            Err(Error::NotLaunched)
        ));
        assert!(matches!(driver.new_context_menu(), Err(Error::NotLaunched)));
        let menu_bar = driver.menu_bar();
        assert!(matches!(
            driver.mount(menu_bar, mock::component("Main", menu_with("x"))),
            Err(Error::NotLaunched)
        ));

        let mut driver = launched();
        assert!(driver.new_window(WindowConfig::new("w")).is_ok());
        assert!(driver.new_context_menu().is_ok());
        let dock = driver.dock();
        driver
            .mount(dock, mock::component("Dock", menu_with("New window")))
            .unwrap();
        assert!(driver
            .backend()
            .journal()
            .instructions()
            .contains(&Instruction::SetDockMenu(dock)));
    }

    #[test]
    fn menu_bar_remount() {
        let mut driver = launched();
        let menu_bar = driver.menu_bar();

        driver
            .mount(menu_bar, mock::component("A", menu_with("hello")))
            .unwrap();
        driver
            .mount(menu_bar, mock::component("B", menu_with("world")))
            .unwrap();

        assert_eq!(labels(&driver, menu_bar), ["world"]);
        assert_eq!(driver.markup().dismounts("A"), 1);
        assert_eq!(driver.markup().dismounts("B"), 0);
        let set = driver
            .backend()
            .journal()
            .instructions()
            .into_iter()
            .filter(|i| *i == Instruction::SetMenuBar(menu_bar))
            .count();
        assert_eq!(set, 2);
    }

    #[test]
    fn sync_sends_one_attribute_patch() {
        let mut driver = launched();
        let id = driver
            .new_window(WindowConfig::new("w").with_frame(Rect::from_xywh(0., 0., 400., 300.)))
            .unwrap();

        let button = Element::new("button").attr("disabled", "false");
        let root = Element::new("div").child(button);
        let button = match &root.children[0] {
            Node::Element(e) => e.clone(),
            _ => unreachable!(),
        };
        driver.mount(id, mock::component("Form", root)).unwrap();

        let mut changed = AttributeMap::new();
        changed.insert("disabled".into(), "true".into());
        driver.markup().push_change(Change::Attributes {
            element: button.clone(),
            changed,
        });
        assert_eq!(driver.sync(id).unwrap(), 1);
        assert_eq!(driver.sync(id).unwrap(), 0);

        let surface = driver.backend().journal().surface(id);
        assert_eq!(surface.len(), 2);
        assert!(matches!(surface[0], SurfaceInstruction::LoadDocument { .. }));
        assert_eq!(
            surface[1],
            SurfaceInstruction::PatchAttributes {
                element: button.id,
                attributes: "{\"disabled\":\"true\"}".into(),
            }
        );
    }

    #[test]
    fn render_without_component_is_skipped() {
        let mut driver = launched();
        let id = driver.new_context_menu().unwrap();
        assert_eq!(
            driver.render(id, Change::Full(menu_with("x"))).unwrap(),
            Rendered::Skipped
        );
        assert!(matches!(
            driver.render(ContextId::new(), Change::Full(menu_with("x"))),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn native_close_veto() {
        let mut driver = launched();
        let asked = Arc::new(AtomicUsize::new(0));
        let config = {
            let asked = Arc::clone(&asked);
            WindowConfig::new("w").on_close(move |_| {
                asked.fetch_add(1, Ordering::SeqCst);
                false
            })
        };
        let id = driver.new_window(config).unwrap();

        let sender = driver.sender();
        let native = thread::spawn(move || sender.ask_close(id));
        pump(&mut driver, 1);

        assert_eq!(native.join().unwrap().unwrap(), false);
        assert_eq!(asked.load(Ordering::SeqCst), 1);
        let shared = driver.registry().lookup(id).unwrap();
        assert_eq!(shared.lock().phase(), Phase::Live);
    }

    #[test]
    fn menu_bar_and_dock_stay_open() {
        let mut driver = launched();
        let menu_bar = driver.menu_bar();
        let dock = driver.dock();
        assert!(matches!(driver.close(menu_bar), Err(Error::NotClosable { .. })));
        assert!(matches!(driver.close(dock), Err(Error::NotClosable { .. })));

        let sender = driver.sender();
        let native = thread::spawn(move || sender.ask_close(menu_bar));
        pump(&mut driver, 1);
        assert_eq!(native.join().unwrap().unwrap(), false);
        assert!(driver.registry().contains(menu_bar));
    }

    #[test]
    fn double_finalize_frees_once() {
        let mut driver = launched();
        let id = driver.new_window(WindowConfig::new("w")).unwrap();
        driver
            .mount(id, mock::component("Page", Element::new("div")))
            .unwrap();

        assert_eq!(driver.close(id).unwrap(), CloseOutcome::Pending);
        let sender = driver.sender();
        sender.send(NativeEvent::CloseFinalized(id)).unwrap();
        sender.send(NativeEvent::CloseFinalized(id)).unwrap();
        assert_eq!(driver.poll(), 2);

        // deferred: still registered until the timers fire
        assert!(driver.registry().contains(id));
        pump(&mut driver, 2);

        assert_eq!(driver.markup().dismounts("Page"), 1);
        assert!(!driver.registry().contains(id));
        assert!(!driver.backend().is_live(id));
        assert!(matches!(driver.close(id), Err(Error::NotFound(_))));

        // a late signal is ignored
        sender.send(NativeEvent::CloseFinalized(id)).unwrap();
        assert_eq!(driver.poll(), 1);
    }

    #[test]
    fn dismissed_context_menu_is_finalized() {
        let mut driver = launched();
        let id = driver.new_context_menu().unwrap();
        driver
            .mount(id, mock::component("Popup", menu_with("Copy")))
            .unwrap();
        assert!(driver
            .backend()
            .journal()
            .instructions()
            .contains(&Instruction::ShowContextMenu(id)));

        driver
            .sender()
            .send(NativeEvent::CloseFinalized(id))
            .unwrap();
        pump(&mut driver, 2);

        assert_eq!(driver.markup().dismounts("Popup"), 1);
        assert!(!driver.registry().contains(id));
    }

    #[test]
    fn clicks_reach_the_component() {
        let mut driver = launched();
        let id = driver.new_context_menu().unwrap();
        let item = Element::new("menuitem")
            .attr("label", "Quit")
            .attr("_onclick", "OnQuit");
        let item_id = item.id;
        driver
            .mount(id, mock::component("Popup", Element::new("menu").child(item)))
            .unwrap();

        let sender = driver.sender();
        sender
            .send(NativeEvent::MenuItemClicked {
                context: id,
                item: item_id,
                handler: "OnQuit".into(),
            })
            .unwrap();
        sender
            .send(NativeEvent::MenuItemClicked {
                context: ContextId::new(),
                item: item_id,
                handler: "OnQuit".into(),
            })
            .unwrap();
        sender
            .send(NativeEvent::MenuItemClicked {
                context: id,
                item: item_id,
                handler: "Missing".into(),
            })
            .unwrap();
        assert_eq!(driver.poll(), 3);

        let calls: Vec<_> = driver
            .markup()
            .events()
            .into_iter()
            .filter(|e| matches!(e, MarkupEvent::Called(..)))
            .collect();
        assert_eq!(
            calls,
            [MarkupEvent::Called(item_id, "OnQuit".into(), String::new())]
        );
    }

    #[test]
    fn script_calls_are_forwarded() {
        let mut driver = launched();
        let element = perch_core::ElementId::new();
        let message = format!(
            "{{\"id\": \"{}\", \"method\": \"OnInput\", \"arg\": \"42\"}}",
            element
        );
        driver
            .sender()
            .send(NativeEvent::script_call(&message).unwrap())
            .unwrap();
        driver.poll();
        assert!(driver
            .markup()
            .events()
            .contains(&MarkupEvent::Called(element, "OnInput".into(), "42".into())));
    }

    #[test]
    fn window_geometry_and_events() {
        let mut driver = launched();
        let moves = Arc::new(AtomicUsize::new(0));
        let config = {
            let moves = Arc::clone(&moves);
            WindowConfig::new("w")
                .with_frame(Rect::from_xywh(10., 10., 800., 600.))
                .with_background(Color::from_hex("#336699").unwrap())
                .on_move(move |_| {
                    moves.fetch_add(1, Ordering::SeqCst);
                })
        };
        let id = driver.new_window(config).unwrap();

        match driver.backend().journal().instructions().last() {
            Some(Instruction::NewWindow {
                context,
                settings,
                document,
            }) => {
                assert_eq!(*context, id);
                assert_eq!(settings.background.map(|c| c.to_string()), Some("#336699ff".into()));
                assert!(document.contains(&format!("data-perch-context=\"{}\"", id)));
            }
            other => panic!("expected a new window, got {:?}", other),
        }
        assert_eq!(driver.size(id).unwrap(), Vector2::new(800., 600.));
        driver.move_to(id, Point2::new(100., 50.)).unwrap();
        driver.resize(id, Vector2::new(320., 240.)).unwrap();
        assert_eq!(driver.position(id).unwrap(), Point2::new(100., 50.));
        assert_eq!(driver.size(id).unwrap(), Vector2::new(320., 240.));

        let menu_bar = driver.menu_bar();
        assert!(matches!(
            driver.position(menu_bar),
            Err(Error::WrongKind { .. })
        ));

        let sender = driver.sender();
        sender
            .send(NativeEvent::WindowMoved {
                context: id,
                origin: Point2::new(1., 2.),
            })
            .unwrap();
        sender
            .send(NativeEvent::WindowMoved {
                context: ContextId::new(),
                origin: Point2::new(1., 2.),
            })
            .unwrap();
        driver.poll();
        assert_eq!(moves.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn app_lifecycle_and_tasks() {
        let launches = Arc::new(AtomicUsize::new(0));
        let handlers = {
            let launches = Arc::clone(&launches);
            AppHandlers::default()
                .on_launch(move |_| {
                    launches.fetch_add(1, Ordering::SeqCst);
                })
                .on_terminate(|_| false)
        };
        let mut driver = driver().with_handlers(handlers);
        let sender = driver.sender();
        sender.send(NativeEvent::Launched).unwrap();

        let remote = sender.clone();
        let worker = thread::spawn(move || {
            remote
                .dispatch(|driver: &mut TestDriver| {
                    driver.new_window(WindowConfig::new("from a task")).unwrap();
                })
                .unwrap();
            remote.ask_terminate()
        });
        pump(&mut driver, 3);

        assert_eq!(worker.join().unwrap().unwrap(), false);
        assert_eq!(launches.load(Ordering::SeqCst), 1);
        assert_eq!(driver.registry().len(), 3);

        sender.quit().unwrap();
        sender.send(NativeEvent::Focused).unwrap();
        driver.run();
        assert_eq!(driver.poll(), 1, "run stops at quit");
    }

    #[test]
    fn bridge_statement() {
        assert_eq!(
            TestDriver::bridge_script(),
            "window.webkit.messageHandlers.Call.postMessage(msg);"
        );
    }
}
