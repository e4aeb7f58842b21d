//! FIFO rate-limited request dispatch.
//!
//! Callers acquire a ticket per logical call. A background tick loop marks
//! the head-of-queue ticket releasable once per tick (`1000 / rps` ms), so
//! queued calls proceed strictly in submission order, one per tick. Callers
//! hold a [`TicketPermit`] for the duration of their call; dropping it
//! removes the ticket and lets a later tick promote the next waiter.
//! Immediate-mode calls bypass the queue entirely.

mod queue;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::metrics;

pub use queue::{TicketId, TicketQueue};

/// Waiters poll for their release at this fixed interval, independent of the
/// dispatcher's own tick.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Whether a call goes through the FIFO throttle or bypasses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// Wait for a dispatch slot in submission order.
    #[default]
    Queued,
    /// Skip the queue entirely; the call races the transport directly.
    Immediate,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    /// The dispatcher was not started, or was stopped while waiting.
    #[error("dispatcher is not running")]
    NotRunning,

    #[error("timed out after {0:?} waiting for a dispatch slot")]
    AcquireTimeout(Duration),
}

// Queue mutations are single steps, so a poisoned lock cannot leave the
// queue in a torn state; recover the guard instead of propagating the panic.
fn lock_queue(queue: &Mutex<TicketQueue>) -> MutexGuard<'_, TicketQueue> {
    queue.lock().unwrap_or_else(PoisonError::into_inner)
}

fn remove_ticket(queue: &Mutex<TicketQueue>, id: TicketId) {
    let mut queue = lock_queue(queue);
    queue.remove(id);
    metrics::DISPATCH_QUEUE_DEPTH.set(queue.len() as i64);
}

/// Serializes request release against a requests-per-second budget.
#[derive(Debug)]
pub struct Dispatcher {
    queue: Arc<Mutex<TicketQueue>>,
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
    tick_interval: Duration,
    acquire_timeout: Option<Duration>,
}

impl Dispatcher {
    /// Create a stopped dispatcher ticking every `1000 / requests_per_second`
    /// ms (integer division, floored to 1 ms).
    pub fn new(requests_per_second: u32, acquire_timeout: Option<Duration>) -> Self {
        let tick_ms = (1000 / u64::from(requests_per_second.max(1))).max(1);
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            queue: Arc::new(Mutex::new(TicketQueue::new())),
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
            tick_interval: Duration::from_millis(tick_ms),
            acquire_timeout,
        }
    }

    /// Start the tick loop. Warns and does nothing if already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Dispatcher already running");
            return;
        }

        info!(
            tick_ms = self.tick_interval.as_millis() as u64,
            "Dispatcher started"
        );
        self.spawn_tick_loop();
    }

    /// Stop the tick loop so the process can exit cleanly. Warns and does
    /// nothing if not running. Pending [`Dispatcher::acquire`] calls fail
    /// with [`DispatchError::NotRunning`].
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Dispatcher not running");
            return;
        }

        let _ = self.shutdown_tx.send(());
        info!("Dispatcher stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Number of tickets currently queued.
    pub fn queue_depth(&self) -> usize {
        lock_queue(&self.queue).len()
    }

    /// Obtain permission for one call.
    ///
    /// In `Queued` mode this enqueues a fresh ticket and suspends, polling
    /// every [`POLL_INTERVAL`], until the tick loop marks that ticket
    /// releasable. Releases are strictly FIFO, at most one per tick. In
    /// `Immediate` mode it returns a bypassed permit without touching the
    /// queue.
    ///
    /// When an acquire timeout is configured, expiry removes the caller's
    /// own ticket (leaving the rest of the queue untouched) and fails with
    /// [`DispatchError::AcquireTimeout`]. Dropping the returned future after
    /// it has enqueued leaves the ticket queued until the process exits;
    /// bound waits with the timeout instead of cancelling.
    pub async fn acquire(&self, mode: DispatchMode) -> Result<TicketPermit, DispatchError> {
        if mode == DispatchMode::Immediate {
            metrics::DISPATCH_BYPASS_TOTAL.inc();
            return Ok(TicketPermit::bypassed());
        }

        if !self.is_running() {
            return Err(DispatchError::NotRunning);
        }

        let id = TicketId::new();
        {
            let mut queue = lock_queue(&self.queue);
            queue.enqueue(id);
            metrics::DISPATCH_QUEUE_DEPTH.set(queue.len() as i64);
        }
        debug!(ticket = %id, "Ticket enqueued");

        let started = Instant::now();
        loop {
            if lock_queue(&self.queue).is_releasable(id) {
                break;
            }

            if let Some(timeout) = self.acquire_timeout {
                if started.elapsed() >= timeout {
                    remove_ticket(&self.queue, id);
                    metrics::DISPATCH_TIMEOUTS_TOTAL.inc();
                    warn!(ticket = %id, ?timeout, "Timed out waiting for a dispatch slot");
                    return Err(DispatchError::AcquireTimeout(timeout));
                }
            }

            if !self.is_running() {
                remove_ticket(&self.queue, id);
                return Err(DispatchError::NotRunning);
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }

        metrics::DISPATCH_WAIT_SECONDS.observe(started.elapsed().as_secs_f64());
        debug!(
            ticket = %id,
            waited_ms = started.elapsed().as_millis() as u64,
            "Ticket released"
        );
        Ok(TicketPermit::granted(id, Arc::clone(&self.queue)))
    }

    fn spawn_tick_loop(&self) {
        let queue = Arc::clone(&self.queue);
        let running = Arc::clone(&self.running);
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let tick = self.tick_interval;

        tokio::spawn(async move {
            debug!("Dispatch tick loop started");
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                    _ = tokio::time::sleep(tick) => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        lock_queue(&queue).promote_head();
                    }
                }
            }
            debug!("Dispatch tick loop stopped");
        });
    }
}

/// Permission for one call, released on drop.
///
/// For queued acquisitions the permit owns the ticket: dropping it removes
/// the ticket from the queue, after which the next tick promotes the next
/// waiter. A leaked permit therefore starves every later queued call
/// (head-of-line blocking). Immediate permits hold no ticket and dropping
/// them is a no-op.
#[must_use = "dropping the permit releases the dispatch slot"]
#[derive(Debug)]
pub struct TicketPermit {
    id: Option<TicketId>,
    queue: Option<Arc<Mutex<TicketQueue>>>,
}

impl TicketPermit {
    fn bypassed() -> Self {
        Self {
            id: None,
            queue: None,
        }
    }

    fn granted(id: TicketId, queue: Arc<Mutex<TicketQueue>>) -> Self {
        Self {
            id: Some(id),
            queue: Some(queue),
        }
    }

    /// Ticket id for queued permits; `None` for immediate bypasses.
    pub fn id(&self) -> Option<TicketId> {
        self.id
    }

    /// Remove the ticket from the queue. Equivalent to dropping the permit;
    /// a no-op for immediate bypasses.
    pub fn release(self) {}
}

impl Drop for TicketPermit {
    fn drop(&mut self) {
        if let (Some(id), Some(queue)) = (self.id.take(), self.queue.take()) {
            remove_ticket(&queue, id);
            debug!(ticket = %id, "Ticket removed");
        }
    }
}
