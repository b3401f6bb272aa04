use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;

use crate::http::builders::BuilderRegistry;
use crate::http::connection::Connection;
use crate::server::socket::ClientSocket;

/// Fixed-size pool of workers consuming accepted sockets from a FIFO queue.
///
/// With zero workers the pool is inactive and `enqueue` runs the connection
/// handler synchronously on the caller's thread. Shutdown is idempotent:
/// it stops the workers, joins them exactly once, and drops any tasks that
/// were queued but never started.
pub struct WorkerPool {
    inner: Arc<PoolInner>,
    workers: Vec<thread::JoinHandle<()>>,
    handlers: Arc<BuilderRegistry>,
}

struct PoolInner {
    queue: Mutex<VecDeque<ClientSocket>>,
    available: Condvar,
    stop: AtomicBool,
}

impl WorkerPool {
    pub fn new(worker_count: usize, handlers: Arc<BuilderRegistry>) -> io::Result<Self> {
        let inner = Arc::new(PoolInner {
            queue: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
            stop: AtomicBool::new(false),
        });

        if worker_count == 0 {
            tracing::warn!("Worker pool inactive; handling connections on the acceptor thread");
        }

        let mut workers = Vec::with_capacity(worker_count);
        for id in 0..worker_count {
            let inner = Arc::clone(&inner);
            let handlers = Arc::clone(&handlers);
            let handle = thread::Builder::new()
                .name(format!("worker-{id}"))
                .spawn(move || worker_loop(id, inner, handlers))?;
            workers.push(handle);
        }

        Ok(Self {
            inner,
            workers,
            handlers,
        })
    }

    /// Hands an accepted socket to the pool.
    ///
    /// Ownership transfers to exactly one worker. After shutdown this is a
    /// no-op and the socket is dropped, closing the connection.
    pub fn enqueue(&self, socket: ClientSocket) {
        if self.workers.is_empty() {
            Connection::new(socket, Arc::clone(&self.handlers)).run();
            return;
        }

        {
            let mut queue = self.inner.queue.lock().expect("worker queue lock poisoned");
            if self.inner.stop.load(Ordering::SeqCst) {
                tracing::debug!("Dropping connection enqueued during shutdown");
                return;
            }
            queue.push_back(socket);
        }
        self.inner.available.notify_one();
    }

    /// Stops and joins the workers. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if self.inner.stop.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.available.notify_all();

        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
        tracing::debug!("Worker pool stopped");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(id: usize, inner: Arc<PoolInner>, handlers: Arc<BuilderRegistry>) {
    loop {
        let socket = {
            let mut queue = inner.queue.lock().expect("worker queue lock poisoned");
            loop {
                if inner.stop.load(Ordering::SeqCst) {
                    // Queued-but-unstarted tasks are dropped with the pool.
                    return;
                }
                if let Some(socket) = queue.pop_front() {
                    break socket;
                }
                queue = inner
                    .available
                    .wait(queue)
                    .expect("worker queue lock poisoned");
            }
        };

        tracing::debug!(worker = id, "Connection dequeued");
        Connection::new(socket, Arc::clone(&handlers)).run();
    }
}
