use std::{
	collections::{HashMap, HashSet},
	path::{Path, PathBuf},
};

use benchplan_stdx::path::{strip_archive_suffix, with_counter};
use serde::Serialize;
use strum::Display;

/// Directory below the scratch root that receives every staged input.
pub const INPUT_DIR: &str = "input";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StagingKind {
	/// Exactly one file.
	File,
	/// Everything inside the source directory, copied into the destination directory.
	FolderContents,
}

/// A copy into the job's scratch root. `destination` is relative to that root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagingEntry {
	pub source: PathBuf,
	pub destination: PathBuf,
	pub kind: StagingKind,
}

impl StagingEntry {
	/// Stages `source` as `input/<basename>`.
	pub fn file<P: Into<PathBuf>>(source: P) -> Self {
		let source = source.into();
		let destination = match source.file_name() {
			Some(name) => Path::new(INPUT_DIR).join(name),
			None => PathBuf::from(INPUT_DIR),
		};
		Self {
			source,
			destination,
			kind: StagingKind::File,
		}
	}

	pub fn folder_contents<P: Into<PathBuf>>(source: P) -> Self {
		Self {
			source: source.into(),
			destination: PathBuf::from(INPUT_DIR),
			kind: StagingKind::FolderContents,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecompressionTask {
	pub compressed: PathBuf,
	pub decompressed: PathBuf,
}

impl DecompressionTask {
	/// `None` unless the entry's destination carries an archive suffix.
	pub fn for_entry(entry: &StagingEntry) -> Option<Self> {
		strip_archive_suffix(&entry.destination).map(|decompressed| Self {
			compressed: entry.destination.clone(),
			decompressed,
		})
	}
}

/// Makes the destinations of one job's file entries unique.
///
/// The first entry with a given destination keeps it; later ones get a counter before the
/// extension (`data.txt`, `data1.txt`, `data2.txt`, ...). Counters skip names that another entry
/// of the list already uses, which keeps the result unique and makes the function idempotent.
/// Order and length of the list are preserved. Folder contents all land in the input root
/// and are left alone.
pub fn dedupe(mut entries: Vec<StagingEntry>) -> Vec<StagingEntry> {
	let taken: HashSet<PathBuf> = entries
		.iter()
		.filter(|entry| entry.kind == StagingKind::File)
		.map(|entry| entry.destination.clone())
		.collect();
	let mut seen: HashSet<PathBuf> = HashSet::with_capacity(taken.len());
	let mut counters: HashMap<PathBuf, usize> = HashMap::new();

	for entry in entries.iter_mut().filter(|entry| entry.kind == StagingKind::File) {
		if seen.insert(entry.destination.clone()) {
			continue;
		}
		let counter = counters.entry(entry.destination.clone()).or_insert(0);
		let renamed = loop {
			*counter += 1;
			let candidate = with_counter(&entry.destination, *counter);
			if !taken.contains(&candidate) && !seen.contains(&candidate) {
				break candidate;
			}
		};
		tracing::debug!(from = %entry.destination.display(), to = %renamed.display(), "renamed staging destination");
		seen.insert(renamed.clone());
		entry.destination = renamed;
	}
	entries
}

/// Decompression tasks for the entries at `archives`, in that order.
pub fn decompression_tasks(entries: &[StagingEntry], archives: &[usize]) -> Vec<DecompressionTask> {
	archives
		.iter()
		.filter_map(|&idx| entries.get(idx))
		.filter_map(DecompressionTask::for_entry)
		.collect()
}
