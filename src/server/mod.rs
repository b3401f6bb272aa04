//! Server runtime: acceptor, readiness multiplexer, worker pool, and the
//! process-wide lifecycle flag.
//!
//! The lifecycle flag transitions from running to stopped exactly once.
//! Workers and connection handlers observe it between poll slices so a
//! shutdown request is noticed within one slice.

pub mod listener;
pub mod poller;
pub mod pool;
pub mod socket;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use mio::Waker;

static RUNNING: AtomicBool = AtomicBool::new(true);
static SHUTDOWN_WAKER: Mutex<Option<Arc<Waker>>> = Mutex::new(None);

/// Whether the server is accepting and serving.
pub fn is_running() -> bool {
    RUNNING.load(Ordering::SeqCst)
}

/// Stops the server: clears the running flag and wakes the acceptor's
/// multiplexer so the main loop returns promptly.
pub fn request_shutdown() {
    RUNNING.store(false, Ordering::SeqCst);
    if let Ok(slot) = SHUTDOWN_WAKER.lock() {
        if let Some(waker) = slot.as_ref() {
            let _ = waker.wake();
        }
    }
}

/// Signal handlers only flip the flag; the acceptor's bounded wait notices
/// it within one timeout. Waking the multiplexer from a handler would
/// require taking a lock, which is not async-signal-safe.
pub(crate) fn stop_from_signal() {
    RUNNING.store(false, Ordering::SeqCst);
}

pub(crate) fn arm_lifecycle(waker: Arc<Waker>) {
    RUNNING.store(true, Ordering::SeqCst);
    if let Ok(mut slot) = SHUTDOWN_WAKER.lock() {
        *slot = Some(waker);
    }
}

pub(crate) fn disarm_lifecycle() {
    if let Ok(mut slot) = SHUTDOWN_WAKER.lock() {
        *slot = None;
    }
}
