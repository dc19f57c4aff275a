use std::path::{Path, PathBuf};

/// Inserts `n` between the file stem and the extension: `data.txt` becomes `data1.txt`.
pub fn with_counter<P: AsRef<Path>>(path: P, n: usize) -> PathBuf {
	let path = path.as_ref();
	let stem = path.file_stem().unwrap_or_default().to_string_lossy();
	let name = match path.extension() {
		Some(extension) => format!("{stem}{n}.{}", extension.to_string_lossy()),
		None => format!("{stem}{n}"),
	};
	path.with_file_name(name)
}
