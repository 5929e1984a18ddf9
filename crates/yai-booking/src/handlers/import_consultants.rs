use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use yai_core::envelope::{EnvelopeBuilder, STATUS_OK};
use yai_core::{Handler, HandlerError, Stream};

use crate::store::ConsultantStore;

use super::names::{InvalidName, parse_names};
use super::{HANDLER_TARGET, log_store_failure, reply_errors};

/// Largest import body accepted, in bytes.
pub const MAX_IMPORT_BYTES: u32 = 1024 * 1024;

/// Imports newline-separated consultant names.
///
/// The request is a `u32` body length followed by that many UTF-8 bytes. A
/// body with any invalid name is rejected as a whole. On success the reply
/// payload is the `u32` number of names inserted.
pub struct ImportConsultants {
    store: Arc<dyn ConsultantStore>,
}

impl ImportConsultants {
    /// Creates the handler over `store`.
    pub fn new(store: Arc<dyn ConsultantStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Handler for ImportConsultants {
    fn name(&self) -> &'static str {
        "ImportConsultants"
    }

    async fn handle(&self, stream: &mut dyn Stream) -> Result<(), HandlerError> {
        let length = stream.read_u32().await?;
        if length > MAX_IMPORT_BYTES {
            info!(target: HANDLER_TARGET, length, "import request too large");
            return reply_errors(stream, ["Request too large"]).await;
        }

        let mut body = vec![0_u8; length as usize];
        stream.read_exact(&mut body).await?;
        let Ok(body) = String::from_utf8(body) else {
            return reply_errors(stream, ["Request is not valid UTF-8"]).await;
        };

        let names = match parse_names(&body) {
            Ok(names) => names,
            Err(invalid) => {
                info!(
                    target: HANDLER_TARGET,
                    rejected = invalid.len(),
                    "import rejected invalid names"
                );
                return reply_errors(stream, invalid.iter().map(InvalidName::client_message))
                    .await;
            }
        };

        let inserted = match self.store.insert_missing(&names).await {
            Ok(inserted) => inserted,
            Err(error) => {
                log_store_failure(self.name(), &error);
                return reply_errors(stream, [error.client_message()]).await;
            }
        };

        let mut builder = EnvelopeBuilder::new(4);
        builder.set_status(STATUS_OK).append_u32(inserted);
        builder.finalize()?.send(stream).await?;
        debug!(
            target: HANDLER_TARGET,
            received = names.len(),
            inserted,
            "imported consultants"
        );
        Ok(())
    }
}
