//! Web interface module
//!
//! Exposes the store over HTTP: object reads and writes, health probes,
//! Prometheus metrics and store statistics. Handlers only translate between
//! HTTP and `StorageEngine` calls.

mod server;
mod handlers;

pub use handlers::{ApiError, AppState};
pub use server::{router, run_web_server};
