use path_clean::PathClean;
use std::{
	ffi::OsStr,
	path::{Path, PathBuf},
};

pub trait Expand {
	fn expand_user(self, home: &Path) -> PathBuf
	where
		Self: Sized;
}

impl<T: Into<PathBuf>> Expand for T {
	fn expand_user(self, home: &Path) -> PathBuf {
		let path = self.into();
		let mut components = path.components();
		if let Some(component) = components.next() {
			if component.as_os_str() == OsStr::new("~") {
				let mut path = home.to_path_buf();
				path.extend(components);
				return path;
			}
		}
		path
	}
}

/// Rewrites an absolute path below `home` into the `~/...` form.
/// Paths outside of `home` are returned cleaned but otherwise untouched.
pub trait HomeRelative {
	fn home_relative(&self, home: &Path) -> PathBuf;
}

impl<T: AsRef<Path>> HomeRelative for T {
	fn home_relative(&self, home: &Path) -> PathBuf {
		let path = self.as_ref().clean();
		match path.strip_prefix(home.clean()) {
			Ok(rest) if rest.as_os_str().is_empty() => PathBuf::from("~"),
			Ok(rest) => Path::new("~").join(rest),
			Err(_) => path,
		}
	}
}
