use std::{
	fs,
	path::{Path, PathBuf},
};

use serde::{ser::SerializeMap, Serialize, Serializer};
use strum::Display;

use crate::error::PlanError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum EntryKind {
	Instance,
	Config,
}

/// One line of an instance or config list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedEntry {
	pub name: String,
	pub raw_line: String,
	pub line_number: usize,
}

/// An ordered list of entries loaded from a single list file.
///
/// Entries are named `instanceK` / `configK`, where `K` is the 1-based position of the line
/// in the file. Skipped lines (blank or starting with `#`) still advance `K`; output directory
/// names are derived from these names and depend on it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntrySet {
	source: PathBuf,
	entries: Vec<NamedEntry>,
}

impl EntrySet {
	pub fn load<P: AsRef<Path>>(path: P, kind: EntryKind) -> Result<Self, PlanError> {
		let path = path.as_ref();
		if !path.exists() {
			return Err(PlanError::NotFound(path.to_path_buf()));
		}
		let text = fs::read_to_string(path).map_err(|source| PlanError::Io {
			source,
			path: path.to_path_buf(),
		})?;
		let set = Self::parse(path, &text, kind);
		tracing::debug!(path = %path.display(), entries = set.len(), "loaded {kind} list");
		Ok(set)
	}

	pub fn parse<P: Into<PathBuf>>(source: P, text: &str, kind: EntryKind) -> Self {
		let entries = text
			.lines()
			.enumerate()
			.filter_map(|(idx, line)| {
				let line = line.trim();
				if line.is_empty() || line.starts_with('#') {
					return None;
				}
				let line_number = idx + 1;
				Some(NamedEntry {
					name: format!("{kind}{line_number}"),
					raw_line: line.to_string(),
					line_number,
				})
			})
			.collect();

		Self {
			source: source.into(),
			entries,
		}
	}

	pub fn source(&self) -> &Path {
		&self.source
	}

	pub fn get(&self, name: &str) -> Option<&NamedEntry> {
		self.entries.iter().find(|entry| entry.name == name)
	}

	pub fn iter(&self) -> impl Iterator<Item = &NamedEntry> {
		self.entries.iter()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

/// Serialized as a `name -> line` mapping, in load order.
impl Serialize for EntrySet {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.entries.len()))?;
		for entry in &self.entries {
			map.serialize_entry(&entry.name, &entry.raw_line)?;
		}
		map.end()
	}
}
