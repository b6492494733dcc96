use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::{env, fs};

use crate::error::{LmError, Result};

/// Reads a whole corpus file into memory.
///
/// - Line endings are kept as-is, they are characters like any other
/// - Any open/read failure becomes `LmError::ResourceUnavailable`
pub fn read_corpus<P: AsRef<Path>>(filename: P) -> Result<String> {
	let path = filename.as_ref();
	let unavailable = |source| LmError::ResourceUnavailable { path: path.to_path_buf(), source };

	let mut contents = String::new();
	File::open(path)
		.map_err(unavailable)?
		.read_to_string(&mut contents)
		.map_err(unavailable)?;
	Ok(contents)
}

/// Extracts the base filename without extension.
///
/// Examples:
/// - `"./data/alice.txt"` → `"alice"`
/// - `"alice.txt"` → `"alice"`
pub fn get_filename<P: AsRef<Path>>(input_path: P) -> Option<String> {
	input_path
		.as_ref()
		.file_stem()
		.map(|stem| stem.to_string_lossy().to_string())
}

/// Normalize a folder path.
///
/// - `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub fn normalize_folder(input: &str) -> PathBuf {
	if input == "." || input == "./" {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		PathBuf::from(input)
	}
}

/// Lists the stems of all files with a given extension in a directory, sorted.
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<String>> {
	let dir = dir.as_ref();
	let unavailable = |source| LmError::ResourceUnavailable { path: dir.to_path_buf(), source };

	let mut files = Vec::new();
	for entry in fs::read_dir(dir).map_err(unavailable)? {
		let path = entry.map_err(unavailable)?.path();

		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			if let Some(name) = get_filename(&path) {
				files.push(name);
			}
		}
	}
	files.sort();

	Ok(files)
}
