//! Booking handlers, listed in wire order by [`handler_table`].

mod import_consultants;
mod list_consultants;
mod names;

use std::sync::Arc;

use tracing::warn;

use yai_core::envelope::EnvelopeBuilder;
use yai_core::{DispatchTable, HandlerError, Stream};

use crate::store::{ConsultantStore, StoreError};

pub use import_consultants::{ImportConsultants, MAX_IMPORT_BYTES};
pub use list_consultants::ListConsultants;
pub use names::{InvalidName, parse_names};

/// Identifier of [`ListConsultants`].
pub const LIST_CONSULTANTS: u32 = 0;
/// Identifier of [`ImportConsultants`].
pub const IMPORT_CONSULTANTS: u32 = 1;

pub(crate) const HANDLER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::handlers");

/// Builds the booking table. Entry order is the wire contract.
pub fn handler_table(store: Arc<dyn ConsultantStore>) -> DispatchTable {
    DispatchTable::new(vec![
        Box::new(ListConsultants::new(Arc::clone(&store))),
        Box::new(ImportConsultants::new(store)),
    ])
}

async fn reply_errors<I, S>(stream: &mut dyn Stream, errors: I) -> Result<(), HandlerError>
where
    I: IntoIterator<Item = S> + Send,
    S: AsRef<str>,
{
    EnvelopeBuilder::make_error(errors)?.send(stream).await?;
    Ok(())
}

fn log_store_failure(handler: &'static str, error: &StoreError) {
    warn!(target: HANDLER_TARGET, handler, %error, "consultant store failed");
}
