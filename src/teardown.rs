//! Close lifecycle.
//!
//! A close either comes from the app or from the native layer asking for permission. Once
//! accepted, the native layer closes the surface and reports back with a finalize signal, which
//! may arrive more than once. Finalization is deferred and re-validated, so stale or repeated
//! signals are dropped instead of freeing a context twice.

use crate::context::{ContextKind, Phase};
use crate::registry::{Registry, SharedContext};
use perch_core::{Backend, ContextId, Error, Markup, Result};

/// Result of a close request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// The close handler refused; the context stays live.
    Vetoed,
    /// The context is closing and will be finalized once the native layer confirms.
    Pending,
}

/// Who asked for the close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CloseOrigin {
    /// The app; the native surface still has to be told to close.
    Caller,
    /// The native layer, which closes the surface itself once allowed to.
    Native,
}

pub(crate) fn request_close<B: Backend>(
    backend: &mut B,
    shared: &SharedContext<B::Handle>,
    origin: CloseOrigin,
) -> Result<CloseOutcome> {
    let on_close = {
        let mut context = shared.lock();
        if !context.kind().is_closable() {
            return Err(Error::NotClosable {
                id: context.id(),
                kind: context.kind().name(),
            });
        }
        if context.phase() != Phase::Live {
            return Ok(CloseOutcome::Pending);
        }

        context.set_phase(Phase::ClosingRequested);
        match context.kind() {
            ContextKind::Window(config) => config.handlers.on_close.clone(),
            _ => None,
        }
    };

    // the handler may look the context up again, so it runs unlocked
    let allowed = on_close.map_or(true, |handler| handler.call(()));

    let mut context = shared.lock();
    if !allowed {
        log::debug!("close of {} vetoed", context.id());
        context.set_phase(Phase::Live);
        return Ok(CloseOutcome::Vetoed);
    }

    context.set_phase(Phase::ClosePending);
    if origin == CloseOrigin::Caller {
        backend.close(context.native()?);
    }
    Ok(CloseOutcome::Pending)
}

/// Handles a finalize signal from the native layer. Returns whether a finalize should be
/// scheduled.
pub(crate) fn close_finalized<H>(shared: &SharedContext<H>) -> bool {
    let mut context = shared.lock();
    match context.phase() {
        // menus are dismissed without asking
        Phase::Live | Phase::ClosingRequested => {
            context.set_phase(Phase::ClosePending);
            true
        }
        Phase::ClosePending => true,
        Phase::Finalized => false,
    }
}

/// Frees a context whose close is pending. Returns false if there was nothing to do.
pub(crate) fn finalize<B, M>(
    backend: &mut B,
    markup: &M,
    registry: &Registry<B::Handle>,
    id: ContextId,
) -> bool
where
    B: Backend,
    M: Markup,
{
    let shared = match registry.lookup(id) {
        Ok(shared) => shared,
        Err(_) => {
            log::debug!("finalize of {} dropped: not registered", id);
            return false;
        }
    };

    {
        let mut context = shared.lock();
        if context.phase() != Phase::ClosePending {
            log::debug!("finalize of {} dropped: {:?}", id, context.phase());
            return false;
        }

        if let Some(component) = context.take_component() {
            markup.dismount(&component);
        }
        if let Some(handle) = context.take_handle() {
            backend.release(handle);
        }
        context.set_phase(Phase::Finalized);
    }

    if let Err(err) = registry.unregister(id) {
        log::debug!("finalize of {}: {}", id, err);
    }
    true
}
