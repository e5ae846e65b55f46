//! Queues connecting the engine, the listener worker and the UI thread

use crate::messages::InboundEvent;
use crate::playback::PlaybackSink;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::time::{Duration, Instant};
use tracing::warn;

/// Producer side of the inbound event queue, handed to the engine
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: Sender<InboundEvent>,
}

impl EventSink {
    /// Push an engine notification. Returns `false` once the listener is gone.
    pub fn emit(&self, event: InboundEvent) -> bool {
        match self.tx.send(event) {
            Ok(()) => true,
            Err(e) => {
                warn!("Dropping engine event, listener gone: {:?}", e.into_inner().kind);
                false
            }
        }
    }
}

/// Create the inbound event queue.
///
/// Unbounded so an engine emitting from inside `send_message` never blocks
/// on a listener that is itself waiting on the bridge.
pub fn event_channel() -> (EventSink, Receiver<InboundEvent>) {
    let (tx, rx) = unbounded();
    (EventSink { tx }, rx)
}

/// Work that must run on the UI-owning thread
pub type UiTask = Box<dyn FnOnce(&mut PlaybackSink) + Send + 'static>;

struct Posted {
    due: Instant,
    task: UiTask,
}

/// Posting side of the UI task queue; cheap to clone, usable from any thread
#[derive(Clone)]
pub struct UiQueue {
    tx: Sender<Posted>,
}

impl UiQueue {
    /// Run `task` on the next drain
    pub fn post(&self, task: impl FnOnce(&mut PlaybackSink) + Send + 'static) -> bool {
        self.post_at(Instant::now(), Box::new(task))
    }

    /// Run `task` once, on the first drain at least `delay` from now
    pub fn post_delayed(
        &self,
        delay: Duration,
        task: impl FnOnce(&mut PlaybackSink) + Send + 'static,
    ) -> bool {
        self.post_at(Instant::now() + delay, Box::new(task))
    }

    fn post_at(&self, due: Instant, task: UiTask) -> bool {
        if self.tx.send(Posted { due, task }).is_err() {
            warn!("UI looper gone, task dropped");
            return false;
        }
        true
    }
}

/// Draining side of the UI task queue, owned by the UI thread
pub struct UiLooper {
    rx: Receiver<Posted>,
    pending: Vec<Posted>,
}

impl UiLooper {
    pub fn new() -> (UiQueue, UiLooper) {
        let (tx, rx) = unbounded();
        (
            UiQueue { tx },
            UiLooper {
                rx,
                pending: Vec::new(),
            },
        )
    }

    /// Run every task due at `now`, earliest first. Returns how many ran.
    ///
    /// Tasks posted while draining are picked up by the next call.
    pub fn run_due(&mut self, now: Instant, sink: &mut PlaybackSink) -> usize {
        self.pending.extend(self.rx.try_iter());
        if self.pending.is_empty() {
            return 0;
        }

        // stable, so tasks due at the same instant keep posting order
        self.pending.sort_by_key(|posted| posted.due);
        let ready = self.pending.partition_point(|posted| posted.due <= now);
        let due: Vec<Posted> = self.pending.drain(..ready).collect();

        let count = due.len();
        for posted in due {
            (posted.task)(sink);
        }
        count
    }

    /// Number of tasks waiting, including not yet received ones
    pub fn pending(&self) -> usize {
        self.pending.len() + self.rx.len()
    }

    /// Earliest deadline among received tasks
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|posted| posted.due).min()
    }
}
