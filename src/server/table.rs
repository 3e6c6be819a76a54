//! Fixed-capacity registry of active connections.
//!
//! Slots are addressed by index. A connection keeps its slot for its whole
//! lifetime, and a slot is emptied (closing the stream) before it can be
//! reused, so the index doubles as the connection id.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::time::Instant;

use crate::http::connection::Connection;

/// Returned by [`ConnectionTable::try_admit`] when every slot is occupied.
///
/// Hands the stream back so the caller can close it.
#[derive(Debug)]
pub struct TableFull<S>(pub S);

pub struct ConnectionTable<S> {
    slots: Vec<Option<Connection<S>>>,
    idle_timeout: Duration,
}

impl<S> ConnectionTable<S> {
    pub fn new(capacity: usize, idle_timeout: Duration) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            idle_timeout,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(|s| s.is_some())
    }

    /// Places a new connection in the first empty slot.
    ///
    /// The connection's deadline starts at `now` plus the idle budget.
    pub fn try_admit(
        &mut self,
        stream: S,
        peer: SocketAddr,
        now: Instant,
    ) -> Result<usize, TableFull<S>> {
        let Some(index) = self.slots.iter().position(|s| s.is_none()) else {
            return Err(TableFull(stream));
        };

        self.slots[index] = Some(Connection::new(stream, peer, now + self.idle_timeout));
        Ok(index)
    }

    /// Refreshes the deadline of the connection in `slot`.
    pub fn touch(&mut self, slot: usize, now: Instant) {
        let idle_timeout = self.idle_timeout;
        if let Some(conn) = self.get_mut(slot) {
            conn.deadline = now + idle_timeout;
        }
    }

    /// Empties `slot`, closing its stream.
    ///
    /// Returns the released connection's peer, or `None` if the slot was
    /// already empty; releasing twice never closes twice.
    pub fn release(&mut self, slot: usize) -> Option<SocketAddr> {
        let conn = self.slots.get_mut(slot)?.take()?;
        Some(conn.peer)
    }

    /// Releases every connection whose deadline lies before `now`.
    ///
    /// Returns the evicted slot indices in ascending order.
    pub fn evict_expired(&mut self, now: Instant) -> Vec<usize> {
        let expired: Vec<usize> = self
            .iter()
            .filter(|(_, conn)| conn.deadline < now)
            .map(|(index, _)| index)
            .collect();

        for &index in &expired {
            self.release(index);
        }

        expired
    }

    pub fn get(&self, slot: usize) -> Option<&Connection<S>> {
        self.slots.get(slot)?.as_ref()
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut Connection<S>> {
        self.slots.get_mut(slot)?.as_mut()
    }

    /// Occupied slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Connection<S>)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|conn| (index, conn)))
    }
}
