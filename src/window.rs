//! Window reconciler.
//!
//! Windows host a rendering surface. Mounting loads the component’s document; later changes
//! are sent either as a replaced subtree or, for attribute-only changes, as a small JSON patch
//! so high-frequency updates don’t re-serialize unchanged markup.

use crate::context::{Context, Env, Rendered};
use crate::events::Handler;
use cgmath::{Point2, Vector2};
use perch_core::{
    escape, Backend, Change, Color, ComponentRef, ContextId, Error, Markup, Rect, Resources,
    Result, SurfaceInstruction, WindowSettings,
};

/// Statement the surface uses to post a message back to the driver.
pub const BRIDGE_STATEMENT: &str = "window.webkit.messageHandlers.Call.postMessage(msg);";

/// Window callbacks.
#[derive(Debug, Clone, Default)]
pub struct WindowHandlers {
    pub on_move: Option<Handler<Point2<f64>>>,
    pub on_resize: Option<Handler<Vector2<f64>>>,
    pub on_focus: Option<Handler<()>>,
    pub on_blur: Option<Handler<()>>,
    pub on_minimize: Option<Handler<()>>,
    pub on_deminimize: Option<Handler<()>>,
    pub on_full_screen: Option<Handler<()>>,
    pub on_exit_full_screen: Option<Handler<()>>,
    /// Returning false vetoes the close.
    pub on_close: Option<Handler<(), bool>>,
}

/// Configuration of a window context.
#[derive(Debug, Clone, Default)]
pub struct WindowConfig {
    pub settings: WindowSettings,
    /// Document language.
    pub lang: String,
    pub handlers: WindowHandlers,
}

impl WindowConfig {
    pub fn new(title: impl Into<String>) -> WindowConfig {
        WindowConfig {
            settings: WindowSettings {
                title: title.into(),
                ..WindowSettings::default()
            },
            lang: "en".to_string(),
            handlers: WindowHandlers::default(),
        }
    }

    pub fn with_frame(mut self, frame: Rect) -> Self {
        self.settings.frame = frame;
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.settings.background = Some(color);
        self
    }

    pub fn borderless(mut self) -> Self {
        self.settings.borderless = true;
        self
    }

    pub fn fixed_size(mut self) -> Self {
        self.settings.fixed_size = true;
        self
    }

    pub fn titlebar_hidden(mut self) -> Self {
        self.settings.titlebar_hidden = true;
        self
    }

    pub fn on_close<F: 'static + FnMut(()) -> bool + Send>(mut self, f: F) -> Self {
        self.handlers.on_close = Some(Handler::new(f));
        self
    }

    pub fn on_move<F: 'static + FnMut(Point2<f64>) + Send>(mut self, f: F) -> Self {
        self.handlers.on_move = Some(Handler::new(f));
        self
    }

    pub fn on_resize<F: 'static + FnMut(Vector2<f64>) + Send>(mut self, f: F) -> Self {
        self.handlers.on_resize = Some(Handler::new(f));
        self
    }

    pub fn on_focus<F: 'static + FnMut(()) + Send>(mut self, f: F) -> Self {
        self.handlers.on_focus = Some(Handler::new(f));
        self
    }

    pub fn on_blur<F: 'static + FnMut(()) + Send>(mut self, f: F) -> Self {
        self.handlers.on_blur = Some(Handler::new(f));
        self
    }
}

/// Builds the initial document a new window is created with.
///
/// The component is mounted into the body later.
pub(crate) fn shell<R: Resources + ?Sized>(
    id: ContextId,
    config: &WindowConfig,
    resources: &R,
) -> String {
    let title = serde_json::Value::from(config.settings.title.as_str()).to_string();
    let mut doc = String::new();

    doc.push_str("<!doctype html>\n");
    doc.push_str(&format!("<html lang=\"{}\">\n<head>\n", escape(&config.lang)));
    doc.push_str("<meta charset=\"utf-8\">\n");
    doc.push_str(&format!(
        "<script>document.title = {};</script>\n",
        title
    ));
    for css in resources.css() {
        doc.push_str(&format!("<link rel=\"stylesheet\" href=\"{}\">\n", escape(&css)));
    }
    doc.push_str("<script>\n");
    doc.push_str(&surface_script());
    doc.push_str("</script>\n");
    for js in resources.js() {
        doc.push_str(&format!("<script src=\"{}\"></script>\n", escape(&js)));
    }
    doc.push_str(&format!(
        "</head>\n<body data-perch-context=\"{}\"></body>\n</html>\n",
        id
    ));
    doc
}

/// Script defining the functions surface instructions call, and `CallComponent` for posting
/// calls back.
pub(crate) fn surface_script() -> String {
    format!(
        r#"function perchElement(id) {{
  return document.querySelector('[data-perch-id="' + id + '"]');
}}
function Mount(context, markup) {{
  document.body.innerHTML = markup;
}}
function RenderFull(id, markup) {{
  const el = perchElement(id);
  if (el) el.outerHTML = markup;
}}
function RenderAttributes(id, attrs) {{
  const el = perchElement(id);
  if (!el) return;
  for (const key in attrs) el.setAttribute(key, attrs[key]);
}}
function CallComponent(id, method, arg) {{
  const msg = JSON.stringify({{id: id, method: method, arg: JSON.stringify(arg)}});
  {}
}}
"#,
        BRIDGE_STATEMENT
    )
}

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
        env.markup.dismount(&previous);
    }

    env.markup.mount(&component, id)?;
    let document = match env.markup.markup(&component) {
        Ok(document) => document,
        Err(err) => {
            env.markup.dismount(&component);
            return Err(err.into());
        }
    };

    let loaded = env.backend.surface(
        context.native()?,
        &SurfaceInstruction::LoadDocument {
            context: id,
            document,
        },
    );
    if let Err(err) = loaded {
        env.markup.dismount(&component);
        return Err(Error::backend(err));
    }

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

    match sync(env, context, change) {
        Ok(()) => Rendered::Applied,
        Err(err) => {
            log::error!("window {}: render of {} skipped: {}", id, target, err);
            Rendered::Skipped
        }
    }
}

fn sync<B, M, R>(
    env: &mut Env<'_, B, M, R>,
    context: &mut Context<B::Handle>,
    change: Change,
) -> Result<()>
where
    B: Backend,
    M: Markup,
    R: Resources,
{
    let instruction = match change {
        Change::Full(element) => SurfaceInstruction::ReplaceElement {
            element: element.id,
            markup: env.markup.element_markup(&element)?,
        },
        Change::Attributes { element, changed } => SurfaceInstruction::PatchAttributes {
            element: element.id,
            attributes: serde_json::to_string(&changed).map_err(Error::backend)?,
        },
    };

    env.backend
        .surface(context.native()?, &instruction)
        .map_err(Error::backend)
}

fn window<H>(context: &mut Context<H>) -> Result<&mut H> {
    if context.window_config().is_none() {
        return Err(Error::WrongKind {
            id: context.id(),
            expected: "window",
        });
    }
    context.native()
}

pub(crate) fn position<B: Backend>(
    backend: &B,
    context: &mut Context<B::Handle>,
) -> Result<Point2<f64>> {
    Ok(backend.frame(window(context)?).origin)
}

pub(crate) fn size<B: Backend>(
    backend: &B,
    context: &mut Context<B::Handle>,
) -> Result<Vector2<f64>> {
    Ok(backend.frame(window(context)?).size)
}

pub(crate) fn move_to<B: Backend>(
    backend: &mut B,
    context: &mut Context<B::Handle>,
    origin: Point2<f64>,
) -> Result<()> {
    backend.move_to(window(context)?, origin);
    Ok(())
}

pub(crate) fn resize<B: Backend>(
    backend: &mut B,
    context: &mut Context<B::Handle>,
    size: Vector2<f64>,
) -> Result<()> {
    backend.resize(window(context)?, size);
    Ok(())
}
