//! Handlers shared by the dispatch and transport tests.

use async_trait::async_trait;

use crate::envelope::{EnvelopeBuilder, STATUS_OK};
use crate::stream::Stream;

use super::{Handler, HandlerError};

/// Replies with a success envelope carrying its tag as a length-prefixed
/// string, without reading anything.
pub(crate) struct TaggedHandler {
    tag: &'static str,
}

impl TaggedHandler {
    pub(crate) fn new(tag: &'static str) -> Self {
        Self { tag }
    }
}

#[async_trait]
impl Handler for TaggedHandler {
    async fn handle(&self, stream: &mut dyn Stream) -> Result<(), HandlerError> {
        let mut builder = EnvelopeBuilder::new(4 + self.tag.len());
        builder.set_status(STATUS_OK).append_string(self.tag)?;
        builder.finalize()?.send(stream).await?;
        Ok(())
    }
}

/// Reads a `u32` length and that many bytes, then replies with the bytes as
/// the raw payload.
pub(crate) struct EchoHandler;

#[async_trait]
impl Handler for EchoHandler {
    async fn handle(&self, stream: &mut dyn Stream) -> Result<(), HandlerError> {
        let length = stream.read_u32().await? as usize;
        let mut body = vec![0_u8; length];
        stream.read_exact(&mut body).await?;

        let mut builder = EnvelopeBuilder::new(length);
        builder.set_status(STATUS_OK).append_bytes(&body);
        builder.finalize()?.send(stream).await?;
        Ok(())
    }
}

/// Fails without writing a response.
pub(crate) struct FailingHandler;

#[async_trait]
impl Handler for FailingHandler {
    async fn handle(&self, _stream: &mut dyn Stream) -> Result<(), HandlerError> {
        Err(HandlerError::failed("deliberate failure"))
    }
}

/// Panics mid-connection.
pub(crate) struct PanickingHandler;

#[async_trait]
impl Handler for PanickingHandler {
    async fn handle(&self, _stream: &mut dyn Stream) -> Result<(), HandlerError> {
        panic!("deliberate handler panic");
    }
}
