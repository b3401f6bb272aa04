use std::io;
use std::sync::Arc;
use std::time::Duration;

use mio::event::Source;
use mio::{Events, Interest, Poll, Token, Waker};

/// Token of the listening socket.
pub const LISTENER: Token = Token(0);
/// Token of the self-wake handle.
pub const WAKE: Token = Token(1);

/// Readiness-notification multiplexer for the acceptor thread.
///
/// Wraps a mio `Poll` together with a `Waker` registered on [`WAKE`], so a
/// concurrent `wait` can be interrupted from another thread. The waker is
/// drained internally; the acceptor just skips its token.
pub struct Poller {
    poll: Poll,
    events: Events,
    waker: Arc<Waker>,
}

impl Poller {
    pub fn new() -> io::Result<Self> {
        let poll = Poll::new()?;
        let waker = Arc::new(Waker::new(poll.registry(), WAKE)?);
        Ok(Self {
            poll,
            events: Events::with_capacity(64),
            waker,
        })
    }

    /// Registers a source for the given interests under `token`.
    pub fn add(&self, source: &mut impl Source, token: Token, interests: Interest) -> io::Result<()> {
        self.poll.registry().register(source, token, interests)
    }

    pub fn remove(&self, source: &mut impl Source) -> io::Result<()> {
        self.poll.registry().deregister(source)
    }

    /// Waits up to `timeout` for readiness and returns the ready tokens.
    ///
    /// `None` blocks indefinitely. An interrupted wait reports no tokens
    /// rather than an error so the caller can re-check its running flag.
    pub fn wait(&mut self, timeout: Option<Duration>) -> io::Result<Vec<Token>> {
        match self.poll.poll(&mut self.events, timeout) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::Interrupted => return Ok(Vec::new()),
            Err(e) => return Err(e),
        }
        Ok(self.events.iter().map(|event| event.token()).collect())
    }

    /// Handle that makes a concurrent `wait` return promptly.
    pub fn waker(&self) -> Arc<Waker> {
        Arc::clone(&self.waker)
    }
}
