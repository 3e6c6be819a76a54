//! Connection lifecycle: the slot table, the event loop driving it, and the
//! access log it reports served requests to.

pub mod access_log;
pub mod event_loop;
pub mod listener;
pub mod table;

pub use event_loop::EventLoop;
pub use table::{ConnectionTable, TableFull};
