use std::net::SocketAddr;
use std::time::SystemTime;

use tokio::io::AsyncWrite;
use tokio::time::Instant;

use crate::config::Limits;
use crate::http::page::{self, PageContext};
use crate::http::parser::{parse_http_request, ParseError};
use crate::http::request::Method;
use crate::http::response::StatusCode;
use crate::http::writer::ResponseWriter;

/// One active peer session, owned by a slot of the connection table.
///
/// Dropping the connection closes its stream.
pub struct Connection<S> {
    pub stream: S,
    pub peer: SocketAddr,
    /// Set from the last successfully parsed request
    pub keep_alive: bool,
    /// Last successful read plus the idle budget
    pub deadline: Instant,
}

/// Server-wide values a message is answered with.
#[derive(Debug, Clone, Copy)]
pub struct ServeContext<'a> {
    pub server_name: &'a str,
    pub limits: &'a Limits,
    pub now: SystemTime,
}

/// What happened to one received message.
#[derive(Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// A 200 response was written
    Served {
        method: Method,
        target: String,
        status: StatusCode,
        keep_alive: bool,
    },
    /// The request was malformed; a 400 response was written
    Rejected(ParseError),
    /// The request exceeded a capacity; nothing was written
    Dropped(ParseError),
}

impl Dispatch {
    /// Whether the slot holding the connection must be released.
    pub fn closes(&self) -> bool {
        match self {
            Dispatch::Served { keep_alive, .. } => !keep_alive,
            Dispatch::Rejected(_) | Dispatch::Dropped(_) => true,
        }
    }
}

impl<S> Connection<S> {
    pub fn new(stream: S, peer: SocketAddr, deadline: Instant) -> Self {
        Self {
            stream,
            peer,
            keep_alive: false,
            deadline,
        }
    }
}

impl<S: AsyncWrite + Unpin> Connection<S> {
    /// Tokenizes one received message, answers it, and records the
    /// keep-alive decision.
    ///
    /// Errors are write failures on this connection only.
    pub async fn handle_message(
        &mut self,
        message: &[u8],
        ctx: &ServeContext<'_>,
    ) -> anyhow::Result<Dispatch> {
        let page_ctx = PageContext {
            peer: self.peer,
            server_name: ctx.server_name,
            now: ctx.now,
        };

        let request = match parse_http_request(message, ctx.limits) {
            Ok(request) => request,
            Err(e) if e.is_too_large() => {
                self.keep_alive = false;
                return Ok(Dispatch::Dropped(e));
            }
            Err(e) => {
                self.keep_alive = false;
                let response = page::bad_request(&e, &page_ctx);
                ResponseWriter::new(&response)?
                    .write_to_stream(&mut self.stream)
                    .await?;
                return Ok(Dispatch::Rejected(e));
            }
        };

        let response = match page::render(&request, &page_ctx, ctx.limits) {
            Ok(response) => response,
            Err(e) => {
                self.keep_alive = false;
                return Ok(Dispatch::Dropped(e));
            }
        };

        let keep_alive = request.keep_alive();
        ResponseWriter::new(&response)?
            .write_to_stream(&mut self.stream)
            .await?;
        self.keep_alive = keep_alive;

        Ok(Dispatch::Served {
            method: request.method,
            target: request.target.to_string(),
            status: response.status,
            keep_alive,
        })
    }
}
