use std::fmt;
use std::slice;

use serde::Serialize;

use crate::error::{LmError, Result};

/// One distinct character observed after a given context window.
///
/// `probability` and `cumulative_probability` are derived values: they are
/// only meaningful after `FrequencyTable::compute_probabilities` ran on the
/// current counts.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct CharRecord {
	/// The observed character.
	pub character: char,
	/// How many times `character` followed the window (always >= 1).
	pub count: usize,
	/// `count / total count` of the owning table.
	pub probability: f64,
	/// Running sum of `probability` in table order, up to and including this record.
	pub cumulative_probability: f64,
}

impl CharRecord {
	fn new(character: char) -> Self {
		Self { character, count: 1, probability: 0.0, cumulative_probability: 0.0 }
	}
}

impl fmt::Display for CharRecord {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(
			f,
			"({} {} {} {})",
			self.character, self.count, self.probability, self.cumulative_probability
		)
	}
}

/// The followers of one context window, with their counts and distribution.
///
/// Conceptually, this is a node in a Markov chain where outgoing edges are
/// weighted by their number of observations. Unlike a map, the table keeps a
/// fixed enumeration order: a character seen for the first time is placed at
/// the front. That order defines how cumulative probabilities partition
/// `[0, 1)`, so it must stay stable for seeded generation to be reproducible.
///
/// ## Invariants
/// - A character appears in at most one record
/// - Every record count is strictly positive
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct FrequencyTable {
	records: Vec<CharRecord>,
}

impl FrequencyTable {
	/// Creates an empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of distinct characters recorded.
	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	/// The front record, i.e. the most recently inserted character.
	pub fn first(&self) -> Option<&CharRecord> {
		self.records.first()
	}

	/// Records an occurrence of `character`.
	///
	/// - If a record exists, its count is increased.
	/// - Otherwise, a new record with a count of 1 is inserted at the front.
	///
	/// Probabilities are left untouched; they go stale until the next
	/// `compute_probabilities`.
	pub fn update(&mut self, character: char) {
		match self.index_of(character) {
			Some(index) => self.records[index].count += 1,
			None => self.records.insert(0, CharRecord::new(character)),
		}
	}

	/// Position of `character` in the enumeration order, if recorded.
	pub fn index_of(&self, character: char) -> Option<usize> {
		self.records.iter().position(|record| record.character == character)
	}

	/// Returns the record at `index`.
	///
	/// # Errors
	/// Returns `LmError::OutOfRange` if `index >= len()`.
	pub fn get(&self, index: usize) -> Result<&CharRecord> {
		self.records
			.get(index)
			.ok_or(LmError::OutOfRange { index, size: self.records.len() })
	}

	/// Removes the record for `character`, returning whether one was removed.
	pub fn remove(&mut self, character: char) -> bool {
		match self.index_of(character) {
			Some(index) => {
				self.records.remove(index);
				true
			}
			None => false,
		}
	}

	/// Iterates over the records front to back.
	pub fn iter(&self) -> slice::Iter<'_, CharRecord> {
		self.records.iter()
	}

	/// Iterates over the records starting at position `index`.
	///
	/// Yields nothing when `index` is past the end.
	pub fn iter_from(&self, index: usize) -> slice::Iter<'_, CharRecord> {
		self.records.get(index..).unwrap_or_default().iter()
	}

	/// Copies the records out, front to back.
	pub fn to_vec(&self) -> Vec<CharRecord> {
		self.records.clone()
	}

	/// Sum of all counts.
	pub fn total_count(&self) -> usize {
		self.records.iter().map(|record| record.count).sum()
	}

	/// Sets `probability` and `cumulative_probability` of every record from
	/// the current counts.
	///
	/// The cumulative value is a running sum in enumeration order, so the
	/// first record's cumulative probability is its own probability and the
	/// last one is 1.0 up to rounding. Calling it twice on unchanged counts
	/// gives identical results.
	pub fn compute_probabilities(&mut self) {
		let total = self.total_count() as f64;
		let mut cumulative = 0.0;
		for record in &mut self.records {
			record.probability = record.count as f64 / total;
			cumulative += record.probability;
			record.cumulative_probability = cumulative;
		}
	}
}

impl<'a> IntoIterator for &'a FrequencyTable {
	type Item = &'a CharRecord;
	type IntoIter = slice::Iter<'a, CharRecord>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

impl fmt::Display for FrequencyTable {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		if self.records.is_empty() {
			return Ok(());
		}
		write!(f, "(")?;
		for (i, record) in self.records.iter().enumerate() {
			if i > 0 {
				write!(f, " ")?;
			}
			write!(f, "{}", record)?;
		}
		write!(f, ")")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn table_of(text: &str) -> FrequencyTable {
		let mut table = FrequencyTable::new();
		for c in text.chars() {
			table.update(c);
		}
		table
	}

	fn characters(table: &FrequencyTable) -> String {
		table.iter().map(|record| record.character).collect()
	}

	#[test]
	fn new_characters_go_to_the_front() {
		let table = table_of("committee ");
		assert_eq!(characters(&table), " etimoc");
		assert_eq!(table.len(), 7);
		assert_eq!(table.first().map(|r| r.character), Some(' '));
	}

	#[test]
	fn update_counts_existing_characters() {
		let table = table_of("committee ");
		let counts: Vec<usize> = table.iter().map(|record| record.count).collect();
		assert_eq!(counts, vec![1, 2, 2, 1, 2, 1, 1]);
		assert_eq!(table.total_count(), 10);
	}

	#[test]
	fn index_of_and_get() {
		let table = table_of("abc");
		assert_eq!(table.index_of('c'), Some(0));
		assert_eq!(table.index_of('a'), Some(2));
		assert_eq!(table.index_of('z'), None);
		assert_eq!(table.get(1).unwrap().character, 'b');
	}

	#[test]
	fn get_out_of_range() {
		let table = table_of("ab");
		match table.get(2) {
			Err(LmError::OutOfRange { index, size }) => assert_eq!((index, size), (2, 2)),
			other => panic!("unexpected result: {:?}", other),
		}
		assert!(FrequencyTable::new().get(0).is_err());
	}

	#[test]
	fn remove_front_middle_and_missing() {
		let mut table = table_of("abcd");
		assert!(table.remove('d'));
		assert!(table.remove('b'));
		assert!(!table.remove('b'));
		assert!(!table.remove('z'));
		assert_eq!(characters(&table), "ca");
		assert!(table.remove('c'));
		assert!(table.remove('a'));
		assert!(table.is_empty());
		assert!(!table.remove('a'));
	}

	#[test]
	fn probabilities_follow_enumeration_order() {
		let mut table = table_of("aab");
		table.compute_probabilities();

		let b = table.get(0).unwrap();
		assert_eq!(b.character, 'b');
		assert!((b.probability - 1.0 / 3.0).abs() < 1e-12);
		assert!((b.cumulative_probability - 1.0 / 3.0).abs() < 1e-12);

		let a = table.get(1).unwrap();
		assert!((a.probability - 2.0 / 3.0).abs() < 1e-12);
		assert!((a.cumulative_probability - 1.0).abs() < 1e-12);
	}

	#[test]
	fn compute_probabilities_is_idempotent() {
		let mut table = table_of("the quick brown fox");
		table.compute_probabilities();
		let once = table.to_vec();
		table.compute_probabilities();
		assert_eq!(table.to_vec(), once);
	}

	#[test]
	fn probabilities_go_stale_until_recomputed() {
		let mut table = table_of("ab");
		table.compute_probabilities();
		table.update('a');
		assert_eq!(table.get(1).unwrap().probability, 0.5);
		table.compute_probabilities();
		assert!((table.get(1).unwrap().probability - 2.0 / 3.0).abs() < 1e-12);
	}

	#[test]
	fn iter_from_position() {
		let table = table_of("abc");
		let rest: String = table.iter_from(1).map(|r| r.character).collect();
		assert_eq!(rest, "ba");
		assert_eq!(table.iter_from(3).count(), 0);
		assert_eq!(table.iter_from(10).count(), 0);
	}

	#[test]
	fn display() {
		assert_eq!(FrequencyTable::new().to_string(), "");
		let mut table = table_of("ab");
		table.compute_probabilities();
		assert_eq!(table.to_string(), "((b 1 0.5 0.5) (a 1 0.5 1))");
	}
}
