use std::path::{Path, PathBuf};

use benchplan_stdx::path::{Expand, HomeRelative};
use path_clean::PathClean;

/// Turns the paths written in templates and instance lists into the canonical form used as
/// staging sources.
pub trait PathResolver {
	/// `base` is the directory relative paths fall back to when no working directory is configured.
	fn resolve(&self, raw: &str, base: &Path) -> PathBuf;
}

/// Resolves paths into their home-relative (`~/...`) form.
///
/// Exactly one mode applies to a path: absolute and `~` paths are taken as they are,
/// relative paths are joined to the working directory when one is configured,
/// and to the caller-supplied base directory otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeResolver {
	home: PathBuf,
	working_dir: Option<PathBuf>,
}

impl HomeResolver {
	pub fn new<P: Into<PathBuf>>(home: P, working_dir: Option<PathBuf>) -> Self {
		let home = home.into();
		let working_dir = working_dir.map(|dir| dir.expand_user(&home).clean());
		Self { home, working_dir }
	}

	/// Builds a resolver for a benchmark description living in `description_dir`.
	/// A relative working directory is taken relative to the description.
	pub fn for_description<P: Into<PathBuf>>(home: P, working_dir: Option<&str>, description_dir: &Path) -> Self {
		let home = home.into();
		let working_dir = working_dir.map(|dir| {
			let dir = PathBuf::from(dir).expand_user(&home);
			if dir.is_absolute() {
				dir
			} else {
				description_dir.join(dir)
			}
		});
		Self::new(home, working_dir)
	}

	pub fn home(&self) -> &Path {
		&self.home
	}

	pub fn working_dir(&self) -> Option<&Path> {
		self.working_dir.as_deref()
	}
}

impl PathResolver for HomeResolver {
	fn resolve(&self, raw: &str, base: &Path) -> PathBuf {
		let expanded = raw.expand_user(&self.home);
		let absolute = if expanded.is_absolute() {
			expanded
		} else {
			match &self.working_dir {
				Some(working_dir) => working_dir.join(expanded),
				None => base.join(expanded),
			}
		};
		absolute.home_relative(&self.home)
	}
}
