//! Wire encoding of responses.

use std::fmt::Write as _;

use anyhow::{ensure, Context};
use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::Response;

const HTTP_VERSION: &str = "HTTP/1.1";

/// Encodes the status line, header block and body.
///
/// Fails when a header name or value would break the header block, i.e.
/// contains CR, LF or (for names) a colon.
pub fn serialize_response(resp: &Response) -> anyhow::Result<Bytes> {
    let mut head = String::with_capacity(128);
    let _ = write!(
        head,
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );

    for (name, value) in &resp.headers {
        ensure!(
            !name.is_empty() && !name.contains([':', '\r', '\n']),
            "invalid header name {:?}",
            name
        );
        ensure!(
            !value.contains(['\r', '\n']),
            "line break in value of header {}",
            name
        );
        let _ = write!(head, "{}: {}\r\n", name, value);
    }
    head.push_str("\r\n");

    let mut buf = BytesMut::with_capacity(head.len() + resp.body.len());
    buf.put_slice(head.as_bytes());
    buf.put_slice(&resp.body);
    Ok(buf.freeze())
}

/// An encoded response waiting to be flushed to a peer.
#[derive(Debug)]
pub struct ResponseWriter {
    pending: Bytes,
}

impl ResponseWriter {
    pub fn new(response: &Response) -> anyhow::Result<Self> {
        Ok(Self {
            pending: serialize_response(response)?,
        })
    }

    /// Bytes not yet accepted by the stream.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// Writes whatever is still pending, resuming after short writes.
    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        stream
            .write_all_buf(&mut self.pending)
            .await
            .context("writing response")?;
        stream.flush().await.context("flushing response")?;
        Ok(())
    }
}
