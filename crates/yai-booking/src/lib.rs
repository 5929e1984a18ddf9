//! Consultant booking service served over the yAI dispatch protocol.
//!
//! Two handlers are registered, in wire order: [`ListConsultants`] at
//! identifier `0` and [`ImportConsultants`] at identifier `1`. Persistence
//! sits behind [`ConsultantStore`]; the binary uses a seeded
//! [`MemoryStore`].

pub mod handlers;
pub mod store;

pub use handlers::{
    IMPORT_CONSULTANTS, ImportConsultants, LIST_CONSULTANTS, ListConsultants, handler_table,
};
pub use store::{Consultant, ConsultantStore, MemoryStore, StoreError};
