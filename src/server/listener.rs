use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use mio::net::TcpListener;
use mio::Interest;
use nix::sys::signal::{signal, SigHandler, Signal};
use socket2::{Domain, Socket, Type};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::files::resolver::Resolver;
use crate::http::builders::BuilderRegistry;
use crate::server::poller::{Poller, LISTENER, WAKE};
use crate::server::pool::WorkerPool;
use crate::server::socket::ClientSocket;

/// Maximum number of pending connections on the listening socket.
const BACKLOG: i32 = 10;
/// How long the acceptor blocks in the multiplexer per iteration.
const ACCEPT_WAIT_MS: u64 = 500;

/// Runs the accept loop until shutdown is requested.
///
/// Wires the shared dependencies (resolver, builder registry, worker pool,
/// multiplexer), binds the listening socket on all interfaces, and drains
/// pending accepts on every readiness event. Accepted sockets are handed to
/// the pool; the pool and multiplexer are torn down before returning.
pub fn run(cfg: &Config) -> anyhow::Result<()> {
    let resolver = Resolver::new(cfg.root.clone(), cfg.index.clone());
    let handlers = Arc::new(BuilderRegistry::new(resolver));
    let mut pool = WorkerPool::new(cfg.workers, Arc::clone(&handlers))
        .context("Failed to spawn worker threads")?;

    let mut poller = Poller::new().context("Failed to create event multiplexer")?;
    crate::server::arm_lifecycle(poller.waker());
    register_signal_handlers().context("Failed to register signal handlers")?;

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let mut listener = bind_listener(addr)
        .with_context(|| format!("Failed to bind listening socket on {addr}"))?;
    poller
        .add(&mut listener, LISTENER, Interest::READABLE)
        .context("Failed to register listening socket")?;

    info!("Listening on {}", addr);

    while crate::server::is_running() {
        let ready = poller.wait(Some(Duration::from_millis(ACCEPT_WAIT_MS)))?;
        if !crate::server::is_running() {
            break;
        }

        for token in ready {
            if token == WAKE {
                // Self-wake only breaks the wait.
                continue;
            }
            if token == LISTENER {
                accept_pending(&mut listener, &pool);
            }
        }
    }

    info!("Server shutting down");
    let _ = poller.remove(&mut listener);
    pool.shutdown();
    crate::server::disarm_lifecycle();
    Ok(())
}

/// Creates the listening socket: SO_REUSEADDR, non-blocking, bound and
/// listening with the configured backlog.
fn bind_listener(addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = Socket::new(Domain::IPV4, Type::STREAM, None)?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(BACKLOG)?;
    Ok(TcpListener::from_std(socket.into()))
}

/// Drains pending accepts until the listener reports would-block.
fn accept_pending(listener: &mut TcpListener, pool: &WorkerPool) {
    loop {
        if !crate::server::is_running() {
            break;
        }

        match listener.accept() {
            Ok((stream, peer)) => {
                debug!(%peer, "Accepted connection");
                pool.enqueue(ClientSocket::new(stream));
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                error!(error = %e, "Failed to accept connection");
                continue;
            }
        }
    }
}

extern "C" fn handle_shutdown_signal(_signal: nix::libc::c_int) {
    crate::server::stop_from_signal();
}

fn register_signal_handlers() -> nix::Result<()> {
    unsafe {
        // Broken pipes surface as EPIPE write errors instead of killing the
        // process.
        signal(Signal::SIGPIPE, SigHandler::SigIgn)?;
        signal(Signal::SIGINT, SigHandler::Handler(handle_shutdown_signal))?;
        signal(Signal::SIGTERM, SigHandler::Handler(handle_shutdown_signal))?;
    }
    Ok(())
}
