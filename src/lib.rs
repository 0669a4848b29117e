// src/lib.rs
// ────────────────────────────────────────────────────────────────────────────
// Public library entry point.  Re-export everything for both `main.rs` and
// integration tests.

mod macros;

pub mod agent;
pub mod config;
pub mod events;
pub mod logging;
pub mod pipeline;
pub mod scoring;
pub mod telemetry;
