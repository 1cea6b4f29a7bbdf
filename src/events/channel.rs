//! Event channel built on crossbeam-channel.
//!
//! Lets the single-threaded core report progress to a UI thread
//! without depending on how it is rendered.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::path::Path;

use super::{Event, Progress};

/// Sending half handed to the core stages.
///
/// A sender built by [`null_sender`] has no channel behind it and drops
/// every event.
#[derive(Clone)]
pub struct EventSender {
    inner: Option<Sender<Event>>,
}

impl EventSender {
    /// Wrap a raw crossbeam sender.
    pub fn new(sender: Sender<Event>) -> Self {
        Self {
            inner: Some(sender),
        }
    }

    /// Send an event, discarding it if nobody is listening.
    pub fn send(&self, event: Event) {
        if let Some(sender) = &self.inner {
            let _ = sender.send(event);
        }
    }

    /// Whether events go anywhere.
    pub fn is_connected(&self) -> bool {
        self.inner.is_some()
    }
}

/// Receiving half held by the UI layer.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Block until the next event arrives, or `None` once all senders are gone
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    /// Non-blocking receive
    pub fn try_recv(&self) -> Option<Event> {
        self.inner.try_recv().ok()
    }

    /// Iterate until every sender is dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

/// Factory for connected sender/receiver pairs.
pub struct EventChannel;

impl EventChannel {
    /// Create an unbounded channel. Events are small and the core never
    /// produces them faster than it can hash files.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (EventSender::new(sender), EventReceiver { inner: receiver })
    }
}

/// A sender that drops everything, for tests and library callers.
pub fn null_sender() -> EventSender {
    EventSender { inner: None }
}

/// Counts processed items and logs a percentage every `every` items.
///
/// The event is emitted on every tick so a progress bar stays smooth; the
/// log line is throttled.
pub(crate) struct ProgressTicker<'a> {
    stage: &'static str,
    total: usize,
    every: usize,
    completed: usize,
    events: &'a EventSender,
    wrap: fn(Progress) -> Event,
}

impl<'a> ProgressTicker<'a> {
    pub(crate) fn new(
        stage: &'static str,
        total: usize,
        every: usize,
        events: &'a EventSender,
        wrap: fn(Progress) -> Event,
    ) -> Self {
        Self {
            stage,
            total,
            every: every.max(1),
            completed: 0,
            events,
            wrap,
        }
    }

    /// Record one processed item.
    pub(crate) fn tick(&mut self, current: &Path) {
        self.completed += 1;
        let progress = Progress {
            completed: self.completed,
            total: self.total,
            current_path: current.to_path_buf(),
        };

        if self.completed % self.every == 0 {
            tracing::info!("{} {:.3}%", self.stage, progress.percent());
        }

        self.events.send((self.wrap)(progress));
    }

    #[cfg(test)]
    pub(crate) fn completed(&self) -> usize {
        self.completed
    }
}
