use std::fs::File;
use std::io::{self, Read, Write};
use std::net::Shutdown;
use std::os::fd::{AsRawFd, BorrowedFd};

use mio::net::TcpStream;
use nix::errno::Errno;
use nix::libc::off_t;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use nix::sys::sendfile::sendfile;

/// How long a blocked send waits for writability before re-checking.
const SEND_POLL_SLICE_MS: u16 = 100;

/// Outcome of a single non-blocking read.
pub enum ReadOutcome {
    /// This many bytes were received
    Data(usize),
    /// The peer closed its end of the connection
    Closed,
    /// No data available right now
    WouldBlock,
}

/// Owned non-blocking client socket.
///
/// Wraps the accepted stream with the read/write primitives the connection
/// handler needs: would-block-aware reads, bounded readiness waits, and
/// send/sendfile loops that retry until the payload is fully written. The
/// descriptor is closed exactly once, on drop.
pub struct ClientSocket {
    stream: TcpStream,
}

impl ClientSocket {
    pub fn new(stream: TcpStream) -> Self {
        Self { stream }
    }

    fn fd(&self) -> BorrowedFd<'_> {
        // The stream outlives the borrow; mio only hands out raw fds.
        unsafe { BorrowedFd::borrow_raw(self.stream.as_raw_fd()) }
    }

    /// Waits up to `timeout_ms` for the socket to become readable.
    pub fn wait_readable(&self, timeout_ms: u16) -> io::Result<bool> {
        self.wait_for(PollFlags::POLLIN, timeout_ms)
    }

    /// Blocks a stalled send until the socket is writable again. During
    /// shutdown a peer that accepts no data aborts the transfer instead of
    /// pinning the worker.
    fn await_write_pressure(&self) -> io::Result<()> {
        let writable = self.wait_for(PollFlags::POLLOUT, SEND_POLL_SLICE_MS)?;
        if !writable && !crate::server::is_running() {
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "send stalled during shutdown",
            ));
        }
        Ok(())
    }

    fn wait_for(&self, flags: PollFlags, timeout_ms: u16) -> io::Result<bool> {
        let mut fds = [PollFd::new(self.fd(), flags)];
        match poll(&mut fds, PollTimeout::from(timeout_ms)) {
            Ok(0) => Ok(false),
            Ok(_) => Ok(fds[0]
                .revents()
                .map(|revents| revents.intersects(flags))
                .unwrap_or(false)),
            Err(Errno::EINTR) => Ok(false),
            Err(e) => Err(io::Error::from(e)),
        }
    }

    /// Performs one non-blocking read into `buf`.
    pub fn recv(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome> {
        match self.stream.read(buf) {
            Ok(0) => Ok(ReadOutcome::Closed),
            Ok(n) => Ok(ReadOutcome::Data(n)),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(ReadOutcome::WouldBlock),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(ReadOutcome::WouldBlock),
            Err(e) => Err(e),
        }
    }

    /// Writes the whole buffer, awaiting writability on would-block.
    pub fn send_all(&mut self, data: &[u8]) -> io::Result<()> {
        let mut written = 0;
        while written < data.len() {
            match self.stream.write(&data[written..]) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "peer stopped accepting data",
                    ));
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    self.await_write_pressure()?;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Transmits `count` bytes of `file` from offset zero via sendfile,
    /// awaiting writability on would-block.
    pub fn send_file(&mut self, file: &File, count: u64) -> io::Result<()> {
        let mut offset: off_t = 0;
        let mut sent: u64 = 0;

        while sent < count {
            let remaining = usize::try_from(count - sent).unwrap_or(usize::MAX);
            match sendfile(self.fd(), file, Some(&mut offset), remaining) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "file ended before advertised length",
                    ));
                }
                Ok(n) => sent += n as u64,
                Err(Errno::EAGAIN) => {
                    self.await_write_pressure()?;
                }
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(io::Error::from(e)),
            }
        }
        Ok(())
    }

    /// Half-closes both directions before the descriptor is dropped.
    pub fn shutdown(&self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}
