//! Test harness utilities for the behavioural suites.

mod world;

pub use world::DispatchWorld;
