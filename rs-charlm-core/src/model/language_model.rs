use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::path::Path;

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use super::frequency_table::FrequencyTable;
use crate::error::{LmError, Result};
use crate::io::read_corpus;

/// Character returned by `sample_next` when no cumulative probability
/// exceeds the random draw (rounding miss, or an empty table).
pub const FALLBACK_CHAR: char = ' ';

/// Character-level n-gram language model.
///
/// The model maps every context window (exactly `window_length` characters)
/// seen in the training corpora to the table of characters that followed it,
/// and generates text by a weighted random walk over those tables.
///
/// # Responsibilities
/// - Scan corpora once, accumulating follower counts per window
/// - Keep every table's distribution in sync with its counts after training
/// - Extend a text one sampled character at a time until the target length
///   or an unseen window is reached
///
/// # Invariants
/// - `window_length` is >= 1 and never changes
/// - Every key of `tables` has exactly `window_length` characters
/// - The random source is owned and only drawn from by sampling
///
/// # Notes
/// - Training is cumulative: training twice on the same text doubles every count.
/// - Nothing here is synchronized. Share a model between threads behind a
///   single lock, otherwise the draw order of a seeded source is lost.
#[derive(Debug)]
pub struct LanguageModel<R = StdRng> {
	/// Mapping from a context window to the characters that followed it.
	tables: HashMap<String, FrequencyTable>,

	/// Number of characters in a context window.
	window_length: usize,

	/// Source of the uniform draws used by `sample_next`.
	rng: R,
}

impl LanguageModel<StdRng> {
	/// Creates an empty model drawing from an OS-seeded generator.
	///
	/// Generated texts differ from run to run.
	///
	/// # Errors
	/// Returns an error if `window_length` is 0.
	pub fn new(window_length: usize) -> Result<Self> {
		Self::with_rng(window_length, StdRng::from_os_rng())
	}

	/// Creates an empty model whose draws are fully determined by `seed`.
	///
	/// Two models built with the same seed and trained on the same corpora
	/// produce the same sequence of generated texts.
	///
	/// # Errors
	/// Returns an error if `window_length` is 0.
	pub fn with_seed(window_length: usize, seed: u64) -> Result<Self> {
		Self::with_rng(window_length, StdRng::seed_from_u64(seed))
	}
}

impl<R: RngCore> LanguageModel<R> {
	/// Creates an empty model drawing from the given random source.
	///
	/// # Errors
	/// Returns an error if `window_length` is 0.
	pub fn with_rng(window_length: usize, rng: R) -> Result<Self> {
		if window_length == 0 {
			return Err(LmError::invalid_argument("window_length", "must be >= 1"));
		}
		Ok(Self { tables: HashMap::new(), window_length, rng })
	}

	pub fn window_length(&self) -> usize {
		self.window_length
	}

	/// Number of distinct context windows learned so far.
	pub fn len(&self) -> usize {
		self.tables.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tables.is_empty()
	}

	/// The follower table of `window`, if it was seen during training.
	pub fn table(&self, window: &str) -> Option<&FrequencyTable> {
		self.tables.get(window)
	}

	/// Iterates over the learned windows, in no particular order.
	pub fn windows(&self) -> impl Iterator<Item = &str> {
		self.tables.keys().map(String::as_str)
	}

	/// Adds a corpus to the model.
	///
	/// Slides a window of `window_length` characters over `corpus` and, for
	/// every following character, records one occurrence in the window's
	/// table (created on first sight). Afterwards the distribution of every
	/// table in the model is recomputed, not only the ones touched here.
	///
	/// # Notes
	/// - A corpus of at most `window_length` characters adds nothing.
	/// - Counts accumulate across calls.
	pub fn train(&mut self, corpus: &str) {
		let chars: Vec<char> = corpus.chars().collect();
		if chars.len() <= self.window_length {
			debug!(
				"corpus of {} chars is too short for a window of {}, nothing learned",
				chars.len(),
				self.window_length
			);
			return;
		}

		let mut window: String = chars[..self.window_length].iter().collect();
		for &next_char in &chars[self.window_length..] {
			match self.tables.get_mut(&window) {
				Some(table) => table.update(next_char),
				None => {
					let mut table = FrequencyTable::new();
					table.update(next_char);
					self.tables.insert(window.clone(), table);
				}
			}
			window.remove(0);
			window.push(next_char);
		}

		self.compute_probabilities();
		debug!(
			"trained on {} chars, model now holds {} windows",
			chars.len(),
			self.tables.len()
		);
	}

	/// Reads a corpus file and trains on its whole content.
	///
	/// # Errors
	/// Returns `LmError::ResourceUnavailable` if the file cannot be read;
	/// the model is left untouched in that case.
	pub fn train_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
		let corpus = read_corpus(&path)?;
		debug!("training on {}", path.as_ref().display());
		self.train(&corpus);
		Ok(())
	}

	/// Recomputes the distribution of every table from its current counts.
	pub fn compute_probabilities(&mut self) {
		for table in self.tables.values_mut() {
			table.compute_probabilities();
		}
	}

	/// Draws one character from `table` by inverse-CDF sampling.
	///
	/// A uniform value `r` in `[0, 1)` is drawn and the first record, in
	/// table order, whose cumulative probability exceeds `r` is selected.
	///
	/// Returns `FALLBACK_CHAR` if no record qualifies, which only happens
	/// when rounding leaves the last cumulative probability below `r`, or
	/// when the table is empty. The distribution is not renormalized.
	pub fn sample_next(&mut self, table: &FrequencyTable) -> char {
		let r: f64 = self.rng.random();
		Self::select(table, r)
	}

	/// Extends `initial_text` by up to `length` sampled characters.
	///
	/// The window starts as the last `window_length` characters of
	/// `initial_text` and slides over each generated character. Generation
	/// stops early, without error, as soon as the window was never seen
	/// during training.
	///
	/// # Returns
	/// `initial_text` followed by every generated character. If
	/// `initial_text` is shorter than the window, it is returned unchanged.
	pub fn generate(&mut self, initial_text: &str, length: usize) -> String {
		let initial_len = initial_text.chars().count();
		if initial_len < self.window_length {
			return initial_text.to_owned();
		}

		let mut text = String::from(initial_text);
		let mut window: VecDeque<char> =
			initial_text.chars().skip(initial_len - self.window_length).collect();
		let mut key: String = window.iter().collect();

		for produced in 0..length {
			let Some(table) = self.tables.get(&key) else {
				debug!("window {:?} never seen, halting after {} chars", key, produced);
				break;
			};
			// Disjoint field borrows: `table` lives in `tables`, the draw in `rng`
			let r: f64 = self.rng.random();
			let next_char = Self::select(table, r);

			text.push(next_char);
			window.pop_front();
			window.push_back(next_char);
			key.clear();
			key.extend(window.iter());
		}

		text
	}

	/// First record of `table` whose cumulative probability exceeds `r`.
	fn select(table: &FrequencyTable, r: f64) -> char {
		match table.iter().find(|record| r < record.cumulative_probability) {
			Some(record) => record.character,
			None => {
				trace!("no record above draw {}, falling back to {:?}", r, FALLBACK_CHAR);
				FALLBACK_CHAR
			}
		}
	}
}

impl<R> fmt::Display for LanguageModel<R> {
	/// One `window : table` line per window, windows sorted.
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let mut windows: Vec<&String> = self.tables.keys().collect();
		windows.sort();
		for window in windows {
			writeln!(f, "{} : {}", window, self.tables[window])?;
		}
		Ok(())
	}
}
