//! # funnel-observability
//!
//! Logging setup for applications built on `funnel-core`.
//!
//! `funnel-core` only emits `tracing` events; it never installs a
//! subscriber. Call [`init_tracing`] once at startup to see them.
//! Lane registration and conversions log at `debug`, per-input accepts and
//! skipped lanes at `trace`, and failing lanes at `warn`.

pub mod tracing_setup;

pub use tracing_setup::{init_tracing, LogConfig};
