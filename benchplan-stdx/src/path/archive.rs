use std::path::{Path, PathBuf};

/// Suffixes of compressed inputs that have to be unpacked after staging.
pub const ARCHIVE_SUFFIXES: [&str; 5] = [".lzma", ".zip", ".gz", ".xz", ".bz2"];

/// Returns the archive suffix `path` ends with, compared case-insensitively.
pub fn archive_suffix<P: AsRef<Path>>(path: P) -> Option<&'static str> {
	let name = path.as_ref().to_string_lossy().to_lowercase();
	ARCHIVE_SUFFIXES.iter().copied().find(|suffix| name.ends_with(suffix))
}

/// Strips the archive suffix from `path`, or returns `None` for anything that is not an archive.
pub fn strip_archive_suffix<P: AsRef<Path>>(path: P) -> Option<PathBuf> {
	let path = path.as_ref();
	let suffix = archive_suffix(path)?;
	let name = path.to_string_lossy();
	Some(PathBuf::from(&name[..name.len() - suffix.len()]))
}
