use std::fs::File;
use std::io;
use std::sync::Arc;
use std::time::Instant;

use bytes::{Buf, BytesMut};
use tracing::{debug, error, info};

use crate::http::builders::BuilderRegistry;
use crate::http::composer;
use crate::http::parser::{self, parse_request, ParseError};
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};
use crate::server::socket::{ClientSocket, ReadOutcome};

/// Total time a keep-alive connection may sit idle between requests.
const KEEP_ALIVE_TIMEOUT_MS: u64 = 60_000;
/// A fresh connection must start sending its first request within this.
const PROACTIVE_TIMEOUT_MS: u64 = 500;
/// Idle waits are sliced so the running flag is observed between slices.
const POLL_SLICE_MS: u16 = 100;
/// Requests served on one connection before it is closed.
const MAX_KEEP_ALIVE_REQUESTS: u32 = 100;
const READ_CHUNK_SIZE: usize = 8 * 1024;
/// Prevent unbounded header growth.
const MAX_HEADER_BYTES: usize = 64 * 1024;

/// Handles a single client connection with HTTP/1.1 keep-alive.
///
/// The handler owns the socket for the connection's lifetime, cycling
/// through a state machine until the exchange ends:
///
/// 1. **WaitForData**: bounded wait for the next request to arrive
/// 2. **ReadRequest**: accumulates bytes and parses the request
/// 3. **Build**: dispatches to the registered response builder
/// 4. **Send**: serializes headers, then transmits the body or file
/// 5. **Continue**: loops back for keep-alive or falls through to close
/// 6. **Close**: shuts the socket down and returns
///
/// Errors within one request are localized to that request: builders
/// return a status code and the composer synthesizes the error response,
/// so there is always something to send. Transport errors terminate the
/// connection without further attempts.
pub struct Connection {
    socket: ClientSocket,
    handlers: Arc<BuilderRegistry>,
    buffer: BytesMut,
    request_count: u32,
    request_start: Option<Instant>,
}

enum State {
    WaitForData,
    ReadRequest,
    Build(Request),
    /// Response ready to transmit, plus whether the connection survives it
    Send(Response, bool),
    Continue(bool),
    Close,
}

impl Connection {
    pub fn new(socket: ClientSocket, handlers: Arc<BuilderRegistry>) -> Self {
        Self {
            socket,
            handlers,
            buffer: BytesMut::with_capacity(READ_CHUNK_SIZE),
            request_count: 0,
            request_start: None,
        }
    }

    /// Drives the connection to completion.
    ///
    /// Returns once the connection is closed; the socket is shut down in
    /// both directions before it is dropped.
    pub fn run(mut self) {
        let mut state = State::WaitForData;

        loop {
            state = match state {
                State::WaitForData => {
                    if self.wait_for_data() {
                        State::ReadRequest
                    } else {
                        State::Close
                    }
                }

                State::ReadRequest => self.read_request(),

                State::Build(request) => self.build_response(request),

                State::Send(response, keep_alive) => match self.send_response(&response) {
                    Ok(()) => {
                        if let Some(start) = self.request_start.take() {
                            info!(
                                status = response.status.as_u16(),
                                duration_ms = start.elapsed().as_millis() as u64,
                                "Request completed"
                            );
                        }
                        State::Continue(keep_alive)
                    }
                    Err(e) => {
                        if matches!(
                            e.kind(),
                            io::ErrorKind::BrokenPipe | io::ErrorKind::ConnectionReset
                        ) {
                            debug!("Client went away during send");
                        } else {
                            error!(error = %e, "Failed to send response");
                        }
                        State::Close
                    }
                },

                State::Continue(keep_alive) => {
                    self.request_count += 1;
                    if self.request_count >= MAX_KEEP_ALIVE_REQUESTS {
                        debug!("Max keep-alive requests reached");
                        State::Close
                    } else if keep_alive {
                        State::WaitForData
                    } else {
                        State::Close
                    }
                }

                State::Close => break,
            };
        }

        self.socket.shutdown();
        debug!("Connection closed");
    }

    /// Bounded wait for readability, sliced so shutdown is observed.
    ///
    /// A connection that has not yet produced a request is given the short
    /// proactive budget; established keep-alive connections get the full
    /// keep-alive envelope.
    fn wait_for_data(&self) -> bool {
        let budget_ms = if self.request_count == 0 && self.buffer.is_empty() {
            PROACTIVE_TIMEOUT_MS
        } else {
            KEEP_ALIVE_TIMEOUT_MS
        };

        let mut elapsed_ms: u64 = 0;
        while crate::server::is_running() && elapsed_ms < budget_ms {
            match self.socket.wait_readable(POLL_SLICE_MS) {
                Ok(true) => return true,
                Ok(false) => elapsed_ms += u64::from(POLL_SLICE_MS),
                Err(e) => {
                    error!(error = %e, "Poll failed on client socket");
                    return false;
                }
            }
        }

        if elapsed_ms >= budget_ms {
            if budget_ms == PROACTIVE_TIMEOUT_MS {
                debug!("No request within {}ms of connecting", PROACTIVE_TIMEOUT_MS);
            } else {
                debug!("Keep-alive timeout reached");
            }
        }
        false
    }

    /// Accumulates bytes until a full request parses, then hands it to the
    /// builder stage. Malformed input turns into a `400` response.
    fn read_request(&mut self) -> State {
        loop {
            match parse_request(&self.buffer) {
                Ok((request, consumed)) => {
                    self.buffer.advance(consumed);
                    self.request_start = Some(Instant::now());
                    info!(method = ?request.method, uri = %request.target, "Received request");
                    return State::Build(request);
                }
                Err(ParseError::Incomplete) => {
                    // Need more data; fall through to read
                }
                Err(e) => {
                    debug!(error = ?e, "Malformed request");
                    return State::Send(composer::error_response(StatusCode::BadRequest), false);
                }
            }

            if parser::find_headers_end(&self.buffer).is_none()
                && self.buffer.len() > MAX_HEADER_BYTES
            {
                debug!("Request headers exceed {} bytes", MAX_HEADER_BYTES);
                return State::Send(composer::error_response(StatusCode::BadRequest), false);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            match self.socket.recv(&mut chunk) {
                Ok(ReadOutcome::Data(n)) => self.buffer.extend_from_slice(&chunk[..n]),
                Ok(ReadOutcome::Closed) => {
                    debug!("Client closed connection");
                    return State::Close;
                }
                Ok(ReadOutcome::WouldBlock) => {
                    if !self.wait_for_data() {
                        return State::Close;
                    }
                }
                Err(e) => {
                    if e.kind() == io::ErrorKind::ConnectionReset {
                        debug!("Client reset the connection");
                    } else {
                        error!(error = %e, "Failed to read request");
                    }
                    return State::Close;
                }
            }
        }
    }

    /// Dispatches to the builder registry and settles the keep-alive
    /// decision for the exchange.
    fn build_response(&mut self, request: Request) -> State {
        let mut response = match self.handlers.build(&request) {
            Some(Ok(response)) => response,
            Some(Err(code)) => composer::error_response(code),
            None => {
                debug!(uri = %request.target, "No builder registered for method");
                composer::error_response(StatusCode::NotImplemented)
            }
        };

        // A Connection header already on the response (POST echo, error
        // responses) forces the close; otherwise the client's choice is
        // echoed back, defaulting to keep-alive.
        let mut keep_alive = request.keep_alive();
        match response.headers.get("Connection") {
            Some(value) => {
                if value.eq_ignore_ascii_case("close") {
                    keep_alive = false;
                }
            }
            None => {
                let value = if keep_alive { "keep-alive" } else { "close" };
                response.headers.set("Connection", value);
            }
        }

        State::Send(response, keep_alive)
    }

    /// Serializes and transmits the head, then the payload.
    ///
    /// Static responses stream the referenced file through sendfile using
    /// the stored `Content-Length`, falling back to a fresh stat.
    fn send_response(&mut self, response: &Response) -> io::Result<()> {
        let head = composer::compose_head(response);
        self.socket.send_all(&head)?;

        if response.is_static {
            let path = response.file_path.as_ref().ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "static response without a file path")
            })?;
            let file = File::open(path).map_err(|e| {
                error!(path = %path.display(), error = %e, "Failed to open static file");
                e
            })?;

            let count = match response
                .headers
                .get("Content-Length")
                .and_then(|v| v.parse::<u64>().ok())
            {
                Some(count) => count,
                None => file.metadata()?.len(),
            };

            self.socket.send_file(&file, count)?;
        } else if !response.body.is_empty() {
            self.socket.send_all(&response.body)?;
        }

        Ok(())
    }
}
