//! Black-box test and benchmarking harness for a caching HTTP proxy
//! and its backend application server.
//!
//! The harness implements neither the proxy nor the backend; both are
//! opaque HTTP endpoints. It checks connectivity, runs the large-object
//! cache scenario and the user lifecycle scenario sequentially, records
//! every request into an in-memory sample store, and reports summary
//! statistics plus a chart image.

pub mod config;
pub mod connectivity;
pub mod metrics;
pub mod probe;
pub mod report;
pub mod scenarios;
