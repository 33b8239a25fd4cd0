use crate::events::NativeEvent;
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use perch_core::{ContextId, Error, Result};
use std::thread;
use std::time::Duration;

/// A unit of work for the thread that owns `D`.
pub type Task<D> = Box<dyn FnOnce(&mut D) + Send>;

pub(crate) enum Message<D> {
    Event(NativeEvent),
    Task(Task<D>),
    /// A deferred close finalization is due.
    Finalize(ContextId),
    Quit,
}

/// The event serialization channel.
///
/// Native callbacks and other threads enqueue onto it through [`EventSender`]s; the owner of
/// `D` drains it, so everything it carries is handled one message at a time.
pub(crate) struct Host<D> {
    sender: Sender<Message<D>>,
    receiver: Receiver<Message<D>>,
}

impl<D> Host<D> {
    pub(crate) fn new(capacity: usize) -> Host<D> {
        let (sender, receiver) = channel::bounded(capacity);
        Host { sender, receiver }
    }

    pub(crate) fn sender(&self) -> EventSender<D> {
        EventSender {
            sender: self.sender.clone(),
        }
    }

    /// Returns the next message if one is queued.
    pub(crate) fn try_next(&self) -> Option<Message<D>> {
        match self.receiver.try_recv() {
            Ok(message) => Some(message),
            // the host holds a sender, so the channel can’t disconnect
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Blocks until a message arrives.
    pub(crate) fn next(&self) -> Option<Message<D>> {
        self.receiver.recv().ok()
    }

    /// Blocks until a message arrives or the timeout elapses.
    pub(crate) fn next_timeout(&self, timeout: Duration) -> Option<Message<D>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(message) => Some(message),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

/// Enqueues work onto a driver’s event channel. Cheap to clone and usable from any thread.
///
/// The blocking methods (`ask_close`, `ask_terminate`) wait for the driver to handle the
/// question and must not be called from the driver’s own thread.
pub struct EventSender<D> {
    sender: Sender<Message<D>>,
}

impl<D> Clone for EventSender<D> {
    fn clone(&self) -> Self {
        EventSender {
            sender: self.sender.clone(),
        }
    }
}

impl<D> EventSender<D> {
    fn enqueue(&self, message: Message<D>) -> Result<()> {
        self.sender.send(message).map_err(|_| Error::Disconnected)
    }

    /// Sends a notification without waiting for it to be handled.
    pub fn send(&self, event: NativeEvent) -> Result<()> {
        self.enqueue(Message::Event(event))
    }

    /// Runs a closure on the driver thread, serialized with event handling.
    pub fn dispatch<F: 'static + FnOnce(&mut D) + Send>(&self, task: F) -> Result<()> {
        self.enqueue(Message::Task(Box::new(task)))
    }

    /// Asks whether a context may close. Blocks until answered.
    pub fn ask_close(&self, context: ContextId) -> Result<bool> {
        let (reply, answer) = channel::bounded(1);
        self.send(NativeEvent::CloseRequested { context, reply })?;
        answer.recv().map_err(|_| Error::Disconnected)
    }

    /// Asks whether the app may terminate. Blocks until answered.
    pub fn ask_terminate(&self) -> Result<bool> {
        let (reply, answer) = channel::bounded(1);
        self.send(NativeEvent::TerminateRequested(reply))?;
        answer.recv().map_err(|_| Error::Disconnected)
    }

    /// Stops a running driver loop.
    pub fn quit(&self) -> Result<()> {
        self.enqueue(Message::Quit)
    }
}

impl<D: 'static> EventSender<D> {
    /// Enqueues a finalize message for the context after `delay`, without blocking the caller.
    pub(crate) fn finalize_after(&self, context: ContextId, delay: Duration) {
        let sender = self.sender.clone();
        let spawned = thread::Builder::new()
            .name("perch-finalize".to_string())
            .spawn(move || {
                thread::sleep(delay);
                if sender.send(Message::Finalize(context)).is_err() {
                    log::debug!("driver gone before finalizing {}", context);
                }
            });

        if let Err(err) = spawned {
            log::error!("failed to schedule finalize of {}: {}", context, err);
        }
    }
}
