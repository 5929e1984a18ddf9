use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use yai_core::envelope::{EnvelopeBuilder, EnvelopeError, STATUS_OK};
use yai_core::{Handler, HandlerError, Stream};

use crate::store::ConsultantStore;

use super::{HANDLER_TARGET, log_store_failure, reply_errors};

/// Per-row reservation when sizing the reply.
const ROW_SIZE_HINT: usize = 128;

/// Replies with every consultant: a `u32` count, then per row the `u32` id
/// and the length-prefixed name. Reads no request bytes.
pub struct ListConsultants {
    store: Arc<dyn ConsultantStore>,
}

impl ListConsultants {
    /// Creates the handler over `store`.
    pub fn new(store: Arc<dyn ConsultantStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Handler for ListConsultants {
    fn name(&self) -> &'static str {
        "ListConsultants"
    }

    async fn handle(&self, stream: &mut dyn Stream) -> Result<(), HandlerError> {
        let consultants = match self.store.list().await {
            Ok(consultants) => consultants,
            Err(error) => {
                log_store_failure(self.name(), &error);
                return reply_errors(stream, [error.client_message()]).await;
            }
        };

        let count = u32::try_from(consultants.len()).map_err(|_| EnvelopeError::TooLarge {
            what: "consultant count",
            size: consultants.len(),
        })?;
        let mut builder = EnvelopeBuilder::new(consultants.len() * ROW_SIZE_HINT);
        builder.set_status(STATUS_OK).append_u32(count);
        for consultant in &consultants {
            builder
                .append_u32(consultant.id)
                .append_string(&consultant.name)?;
        }
        builder.finalize()?.send(stream).await?;
        debug!(target: HANDLER_TARGET, count, "listed consultants");
        Ok(())
    }
}
