//! Errors surfaced by the language model and its corpus boundary.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

pub type Result<T, E = LmError> = std::result::Result<T, E>;

/// Every failure the core can report.
///
/// Degenerate inputs (a corpus shorter than the window, an initial text
/// shorter than the window, an unseen context during generation) are not
/// errors and never produce one of these.
#[derive(Debug)]
pub enum LmError {
	/// A table position outside `[0, size)` was requested.
	OutOfRange { index: usize, size: usize },

	/// The corpus source could not be opened or read.
	ResourceUnavailable { path: PathBuf, source: io::Error },

	/// A configuration value was rejected at construction.
	InvalidArgument { arg: &'static str, msg: String },
}

impl LmError {
	pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
	where
		S: Into<String>,
	{
		Self::InvalidArgument { arg, msg: msg.into() }
	}
}

impl fmt::Display for LmError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::OutOfRange { index, size } => {
				write!(f, "OutOfRange: index {} is outside a table of size {}", index, size)
			}
			Self::ResourceUnavailable { path, source } => {
				write!(f, "ResourceUnavailable: {}: {}", path.display(), source)
			}
			Self::InvalidArgument { arg, msg } => write!(f, "InvalidArgument: {}: {}", arg, msg),
		}
	}
}

impl Error for LmError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			Self::ResourceUnavailable { source, .. } => Some(source),
			_ => None,
		}
	}
}
