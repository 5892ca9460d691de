/*!
 * Registry of style observers and fan-out of style events.
 *
 * Each observer owns a bounded queue and a delivery worker, so a slow or
 * failing observer never holds up the caller or the other observers. When an
 * observer's queue is full, further events for it are coalesced into the most
 * recent whole-style event until the worker catches up.
 */

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};
use parking_lot::{Condvar, Mutex};
use serde::Serialize;
use tokio::sync::mpsc::error::{TryRecvError, TrySendError};
use tokio::sync::{mpsc, oneshot};

use crate::errors::{ObserverError, TextTrackError, TextTrackResult};
use crate::style::{ClosedCaptionsStyle, StyleEvent};

/// Batches queued per observer before its events are coalesced
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Receiver of style notifications
pub trait StyleObserver: Send + Sync {
    fn on_style_event(&self, event: &StyleEvent) -> Result<(), ObserverError>;
}

impl<F> StyleObserver for F
where
    F: Fn(&StyleEvent) -> Result<(), ObserverError> + Send + Sync,
{
    fn on_style_event(&self, event: &StyleEvent) -> Result<(), ObserverError> {
        self(event)
    }
}

/// Stable identity of a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ObserverId(u64);

impl std::fmt::Display for ObserverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "observer-{}", self.0)
    }
}

type EventBatch = Arc<Vec<StyleEvent>>;

/// Events that did not fit in an observer's queue
#[derive(Default)]
struct Overflow {
    /// Set while the queue is full; publishers coalesce instead of queueing
    lagging: bool,
    latest: Option<StyleEvent>,
}

impl Overflow {
    /// Keep only the newest whole-style event of `batch`
    fn coalesce(&mut self, batch: &[StyleEvent], backlog: &Backlog) {
        if let Some(style) = batch.iter().rev().find(|e| !e.is_field_change()) {
            if self.latest.replace(style.clone()).is_none() {
                backlog.add(1);
            }
        }
    }

    fn take_latest(&mut self) -> Option<StyleEvent> {
        self.lagging = false;
        self.latest.take()
    }
}

struct Registration {
    observer: Arc<dyn StyleObserver>,
    queue: mpsc::Sender<EventBatch>,
    overflow: Arc<Mutex<Overflow>>,
}

/// Identity of an observer is the address of its shared allocation
fn same_observer(a: &Arc<dyn StyleObserver>, b: &Arc<dyn StyleObserver>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

fn find_observer(
    observers: &HashMap<ObserverId, Registration>,
    observer: &Arc<dyn StyleObserver>,
) -> Option<ObserverId> {
    observers
        .iter()
        .find(|(_, r)| same_observer(&r.observer, observer))
        .map(|(id, _)| *id)
}

fn deliver(id: ObserverId, observer: &dyn StyleObserver, event: &StyleEvent) {
    match catch_unwind(AssertUnwindSafe(|| observer.on_style_event(event))) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("{} failed to handle style event: {}", id, e),
        Err(_) => warn!("{} panicked while handling a style event", id),
    }
}

/// Count of queued but undelivered events across all observers
#[derive(Default)]
struct Backlog {
    count: Mutex<usize>,
    idle: Condvar,
}

impl Backlog {
    fn add(&self, n: usize) {
        *self.count.lock() += n;
    }

    fn done(&self, n: usize) {
        let mut count = self.count.lock();
        *count = count.saturating_sub(n);
        if *count == 0 {
            self.idle.notify_all();
        }
    }
}

/// Observer registry with per-observer non-blocking dispatch
pub struct NotificationHub {
    observers: Mutex<HashMap<ObserverId, Registration>>,
    next_id: AtomicU64,
    backlog: Arc<Backlog>,
    queue_capacity: usize,
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::with_queue_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    /// Hub whose observers queue at most `capacity` batches each
    pub fn with_queue_capacity(capacity: usize) -> Self {
        Self {
            observers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            backlog: Arc::new(Backlog::default()),
            queue_capacity: capacity.max(1),
        }
    }

    /// Register an observer.
    ///
    /// `baseline` is delivered synchronously to a newly registered observer
    /// before any queued change events. Registering the same observer again
    /// returns its existing id and delivers nothing. Fails with `Unavailable`
    /// when the delivery worker cannot be started; nothing is registered then.
    pub fn register(
        &self,
        observer: Arc<dyn StyleObserver>,
        baseline: impl FnOnce() -> ClosedCaptionsStyle,
    ) -> TextTrackResult<ObserverId> {
        if let Some(id) = find_observer(&self.observers.lock(), &observer) {
            debug!("{} already registered", id);
            return Ok(id);
        }

        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let (queue, receiver) = mpsc::channel(self.queue_capacity);
        let (start, started) = oneshot::channel();
        let overflow = Arc::new(Mutex::new(Overflow::default()));

        // The worker exists before the observer is visible to publishers
        self.spawn_worker(id, Arc::clone(&observer), receiver, started, Arc::clone(&overflow))
            .map_err(|e| {
                warn!("Could not start delivery worker for {}: {}", id, e);
                TextTrackError::Unavailable(format!("delivery worker for {}: {}", id, e))
            })?;

        {
            let mut observers = self.observers.lock();
            if let Some(existing) = find_observer(&observers, &observer) {
                // Dropping `start` stops the unused worker
                debug!("{} already registered", existing);
                return Ok(existing);
            }
            observers.insert(
                id,
                Registration {
                    observer: Arc::clone(&observer),
                    queue,
                    overflow,
                },
            );
        }

        // Changes committed from here on are already queued for this observer,
        // so the baseline can only be equal to or older than what follows it.
        let style = baseline();
        deliver(id, observer.as_ref(), &StyleEvent::StyleChanged { style });

        // The worker only drains the queue once the baseline is out
        let _ = start.send(());
        debug!("{} registered", id);
        Ok(id)
    }

    fn spawn_worker(
        &self,
        id: ObserverId,
        observer: Arc<dyn StyleObserver>,
        mut receiver: mpsc::Receiver<EventBatch>,
        started: oneshot::Receiver<()>,
        overflow: Arc<Mutex<Overflow>>,
    ) -> std::io::Result<()> {
        let backlog = Arc::clone(&self.backlog);
        thread::Builder::new()
            .name(format!("texttrack-{}", id))
            .spawn(move || {
                if started.blocking_recv().is_err() {
                    debug!("{} delivery worker discarded", id);
                    return;
                }

                loop {
                    let batch = match receiver.try_recv() {
                        Ok(batch) => batch,
                        Err(TryRecvError::Empty) => {
                            let latest = overflow.lock().take_latest();
                            if let Some(event) = latest {
                                deliver(id, observer.as_ref(), &event);
                                backlog.done(1);
                                continue;
                            }
                            match receiver.blocking_recv() {
                                Some(batch) => batch,
                                None => break,
                            }
                        }
                        Err(TryRecvError::Disconnected) => break,
                    };

                    for event in batch.iter() {
                        deliver(id, observer.as_ref(), event);
                    }
                    backlog.done(batch.len());
                }

                let latest = overflow.lock().take_latest();
                if let Some(event) = latest {
                    deliver(id, observer.as_ref(), &event);
                    backlog.done(1);
                }
                debug!("{} delivery worker stopped", id);
            })
            .map(|_| ())
    }

    /// Remove an observer; fails with `NotFound` when it was never registered
    pub fn unregister(&self, observer: &Arc<dyn StyleObserver>) -> TextTrackResult<ObserverId> {
        let mut observers = self.observers.lock();
        let id = find_observer(&observers, observer)
            .ok_or_else(|| TextTrackError::NotFound("observer is not registered".to_string()))?;

        // Dropping the queue sender lets the worker drain and exit
        observers.remove(&id);
        debug!("{} unregistered", id);
        Ok(id)
    }

    /// Queue events for every registered observer. Never blocks on observers.
    pub fn publish(&self, events: Vec<StyleEvent>) {
        if events.is_empty() {
            return;
        }

        let batch: EventBatch = Arc::new(events);
        let mut observers = self.observers.lock();
        observers.retain(|id, registration| {
            let mut overflow = registration.overflow.lock();
            if overflow.lagging {
                overflow.coalesce(&batch, &self.backlog);
                return true;
            }

            self.backlog.add(batch.len());
            match registration.queue.try_send(Arc::clone(&batch)) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    self.backlog.done(batch.len());
                    warn!("{} is falling behind, keeping only the latest style", id);
                    overflow.lagging = true;
                    overflow.coalesce(&batch, &self.backlog);
                    true
                }
                Err(TrySendError::Closed(_)) => {
                    self.backlog.done(batch.len());
                    warn!("{} delivery worker is gone, dropping registration", id);
                    false
                }
            }
        });
        debug!("Published {} style event(s) to {} observer(s)", batch.len(), observers.len());
    }

    pub fn observer_count(&self) -> usize {
        self.observers.lock().len()
    }

    /// Wait until every queued event has been delivered.
    ///
    /// Returns false if events are still pending when `timeout` expires.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut count = self.backlog.count.lock();
        while *count > 0 {
            if self.backlog.idle.wait_until(&mut count, deadline).timed_out() {
                return *count == 0;
            }
        }
        true
    }
}
