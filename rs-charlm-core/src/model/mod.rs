//! Top-level module for the character-level language model.
//!
//! This module provides:
//! - Per-window follower tables (`FrequencyTable`, `CharRecord`)
//! - The trainable, sampling language model (`LanguageModel`)
//! - Construction and generation parameters (`ModelConfig`, `GenerateParams`)

/// Ordered table of the characters observed after one context window.
///
/// Supports update-or-insert with front insertion, indexed access and
/// the probability pass used for inverse-CDF sampling.
pub mod frequency_table;

/// Window-keyed language model.
///
/// Handles corpus ingestion, probability refresh, weighted sampling
/// and text generation from an owned random source.
pub mod language_model;

/// Deserializable model and generation parameters, shared by the front-ends.
pub mod config;

pub use config::{GenerateParams, ModelConfig};
pub use frequency_table::{CharRecord, FrequencyTable};
pub use language_model::{FALLBACK_CHAR, LanguageModel};
