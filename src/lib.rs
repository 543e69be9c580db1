//! Company CSR profiles assembled from web-grounded generative search.
//!
//! The `Profiler` service ties the pieces together: prompts and response
//! merging live in `intelligence`, the HTTP client in `gemini`, persistence
//! in `store`, and CSV interchange in `csv`.

pub mod commands;
pub mod config;
pub mod csv;
pub mod error;
pub mod gemini;
pub mod intelligence;
pub mod lens;
pub mod services;
pub mod store;
pub mod types;
pub mod util;
pub mod view;

pub use error::ProfilerError;
pub use services::Profiler;
