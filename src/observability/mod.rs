//! Observability module providing structured logging.
//!
//! This module initializes structured logging with configurable formats
//! (pretty, compact, JSON) and environment-based filtering.

mod tracing_init;

pub use tracing_init::*;
