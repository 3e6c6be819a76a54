//! Readiness-driven event loop.
//!
//! One task owns the listening endpoint and the connection table. Each turn
//! waits (at most one poll interval) until the listener or any occupied slot
//! is readable, admits at most one new peer, serves every readable slot in
//! index order, then evicts idle connections.

use std::io;
use std::net::SocketAddr;
use std::task::Poll;
use std::time::SystemTime;

use tokio::net::{TcpListener, TcpStream};
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use crate::config::{Config, Limits};
use crate::http::connection::{Dispatch, ServeContext};
use crate::server::access_log::AccessLog;
use crate::server::table::{ConnectionTable, TableFull};

/// Result of one readiness wait.
enum Readiness {
    /// Nothing became ready within the poll interval
    Timeout,
    Ready {
        accepted: Option<io::Result<(TcpStream, SocketAddr)>>,
        /// Readable slots in index order
        slots: Vec<usize>,
    },
}

pub struct EventLoop {
    listener: TcpListener,
    table: ConnectionTable<TcpStream>,
    limits: Limits,
    server_name: String,
    access_log: AccessLog,
}

impl EventLoop {
    pub fn new(listener: TcpListener, cfg: &Config, access_log: AccessLog) -> Self {
        Self {
            listener,
            table: ConnectionTable::new(cfg.limits.connections, cfg.limits.idle_timeout()),
            limits: cfg.limits.clone(),
            server_name: cfg.server.name.clone(),
            access_log,
        }
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs until the process ends.
    pub async fn run(mut self) -> anyhow::Result<()> {
        loop {
            self.turn().await;
        }
    }

    /// One iteration: wait, dispatch, evict.
    pub async fn turn(&mut self) {
        match self.wait().await {
            Readiness::Timeout => {
                trace!("no message within poll interval");
            }
            Readiness::Ready { accepted, slots } => {
                if let Some(accepted) = accepted {
                    self.admit(accepted);
                }

                for slot in slots {
                    self.dispatch(slot).await;
                }
            }
        }

        for slot in self.table.evict_expired(Instant::now()) {
            debug!(slot, "evicted idle connection");
        }
    }

    async fn wait(&self) -> Readiness {
        let listener = &self.listener;
        let table = &self.table;
        let sleep = tokio::time::sleep(self.limits.poll_interval());
        tokio::pin!(sleep);

        std::future::poll_fn(|cx| {
            let accepted = match listener.poll_accept(cx) {
                Poll::Ready(res) => Some(res),
                Poll::Pending => None,
            };

            // An error readiness counts as readable; the read surfaces it.
            let slots: Vec<usize> = table
                .iter()
                .filter(|(_, conn)| conn.stream.poll_read_ready(cx).is_ready())
                .map(|(slot, _)| slot)
                .collect();

            if accepted.is_some() || !slots.is_empty() {
                return Poll::Ready(Readiness::Ready { accepted, slots });
            }

            if sleep.as_mut().poll(cx).is_ready() {
                return Poll::Ready(Readiness::Timeout);
            }

            Poll::Pending
        })
        .await
    }

    fn admit(&mut self, accepted: io::Result<(TcpStream, SocketAddr)>) {
        let (stream, peer) = match accepted {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(error = %e, "readiness wait failed on listener");
                return;
            }
        };

        match self.table.try_admit(stream, peer, Instant::now()) {
            Ok(slot) => {
                debug!(slot, peer = %peer, "connection admitted");
            }
            Err(TableFull(stream)) => {
                warn!(peer = %peer, capacity = self.table.capacity(), "connection table full, rejecting");
                drop(stream);
            }
        }
    }

    async fn dispatch(&mut self, slot: usize) {
        let Some(conn) = self.table.get_mut(slot) else {
            return;
        };

        let mut message = vec![0u8; self.limits.message_buffer];
        let n = match conn.stream.try_read(&mut message) {
            Ok(0) => {
                self.release(slot, "peer closed");
                return;
            }
            Ok(n) => n,
            // Spurious readiness
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return,
            Err(e) => {
                debug!(slot, error = %e, "read failed");
                self.release(slot, "read error");
                return;
            }
        };

        let now = SystemTime::now();
        let ctx = ServeContext {
            server_name: &self.server_name,
            limits: &self.limits,
            now,
        };
        let peer = conn.peer;

        let dispatch = match conn.handle_message(&message[..n], &ctx).await {
            Ok(dispatch) => dispatch,
            Err(e) => {
                debug!(slot, peer = %peer, error = %e, "write failed");
                self.release(slot, "write error");
                return;
            }
        };

        match &dispatch {
            Dispatch::Served { method, target, status, keep_alive } => {
                debug!(
                    slot,
                    peer = %peer,
                    method = %method,
                    target = %target,
                    status = status.as_u16(),
                    keep_alive,
                    "request served"
                );
                self.access_log
                    .record(now, peer, *method, target, *status)
                    .await;
            }
            Dispatch::Rejected(e) => {
                warn!(slot, peer = %peer, error = %e, "malformed request");
            }
            Dispatch::Dropped(e) => {
                warn!(slot, peer = %peer, error = %e, "request too large");
            }
        }

        self.table.touch(slot, Instant::now());

        if dispatch.closes() {
            self.release(slot, "closing after request");
        }
    }

    fn release(&mut self, slot: usize, reason: &'static str) {
        if let Some(peer) = self.table.release(slot) {
            debug!(slot, peer = %peer, reason, "connection released");
        }
    }
}
