//! Entry point for the booking server.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use yai_booking::{MemoryStore, handler_table};
use yai_core::{SystemConfigLoader, SystemShutdownSignal, run_server};

fn main() -> ExitCode {
    let table = handler_table(Arc::new(MemoryStore::seeded()));
    match run_server(&SystemConfigLoader, table, &SystemShutdownSignal::new()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            writeln!(io::stderr().lock(), "yai-booking: {error}").ok();
            ExitCode::FAILURE
        }
    }
}
