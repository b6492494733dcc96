use serde::Deserialize;

use super::language_model::LanguageModel;
use crate::error::Result;

/// Default number of characters appended by a generation request.
pub const DEFAULT_LENGTH: usize = 200;

/// Construction parameters of a `LanguageModel`.
///
/// # Fields
/// - `window_length`: characters per context window (must be >= 1).
/// - `seed`: when set, every draw of the built model is reproducible;
///   otherwise the model is seeded from the OS.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct ModelConfig {
	pub window_length: usize,
	pub seed: Option<u64>,
}

impl ModelConfig {
	pub fn new(window_length: usize, seed: Option<u64>) -> Self {
		Self { window_length, seed }
	}

	/// Builds an empty model from this configuration.
	///
	/// # Errors
	/// Returns an error if `window_length` is 0.
	pub fn build(&self) -> Result<LanguageModel> {
		match self.seed {
			Some(seed) => LanguageModel::with_seed(self.window_length, seed),
			None => LanguageModel::new(self.window_length),
		}
	}
}

/// Parameters of a single `generate` call.
///
/// Missing fields fall back to an empty initial text and `DEFAULT_LENGTH`.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct GenerateParams {
	#[serde(default)]
	pub initial_text: String,
	#[serde(default = "default_length")]
	pub length: usize,
}

fn default_length() -> usize {
	DEFAULT_LENGTH
}

impl GenerateParams {
	/// Runs the generation described by these parameters on `model`.
	pub fn apply<R: rand::RngCore>(&self, model: &mut LanguageModel<R>) -> String {
		model.generate(&self.initial_text, self.length)
	}
}
