//! Behavioural suites for the dispatch server.

mod support;
