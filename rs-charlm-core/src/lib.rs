//! Character-level n-gram text generation library.
//!
//! This crate provides:
//! - A model learning, for every fixed-length context window of a corpus,
//!   how often each character follows it
//! - Probabilistic generation by inverse-CDF sampling over those counts
//! - Seeded or injected random sources for reproducible output
//! - Corpus file helpers for the front-ends

/// Language model, follower tables and their parameters.
pub mod model;

/// Error type shared by the whole crate.
pub mod error;

/// I/O utilities (corpus loading, path helpers).
pub mod io;

pub use error::{LmError, Result};
