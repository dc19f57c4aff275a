use std::{
	collections::{HashMap, HashSet},
	path::{Path, PathBuf},
};

use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};
use uuid::{Builder, Uuid};

use crate::{error::PlanError, prompt::Confirmation};

/// Upper bound (inclusive) of the values drawn for `$seed`.
pub const MAX_SEED: u64 = 1 << 32;
pub const DEFAULT_LARGE_JOB_THRESHOLD: usize = 1000;

const PROCEED_PROMPT: &str = "Do you want to proceed?";

/// State shared by every job of one invocation: the random generator, the instance tokens
/// bound so far, the output directories already handed out and the job counter.
pub struct Session<'c> {
	rng: StdRng,
	tokens: HashMap<String, PathBuf>,
	outputs: HashSet<PathBuf>,
	jobs: usize,
	warn_above: Option<usize>,
	confirmation: &'c dyn Confirmation,
}

impl<'c> Session<'c> {
	/// Seeds the generator once. Without a seed it draws from the operating system.
	/// `warn_above` is the job count past which the user is asked to confirm, `None` disables the prompt.
	pub fn new(seed: Option<u64>, warn_above: Option<usize>, confirmation: &'c dyn Confirmation) -> Self {
		let rng = match seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_os_rng(),
		};
		Self {
			rng,
			tokens: HashMap::new(),
			outputs: HashSet::new(),
			jobs: 0,
			warn_above,
			confirmation,
		}
	}

	pub fn draw_seed(&mut self) -> u64 {
		self.rng.random_range(0..=MAX_SEED)
	}

	pub fn scratch_id(&mut self) -> Uuid {
		let mut bytes = [0u8; 16];
		self.rng.fill_bytes(&mut bytes);
		Builder::from_random_bytes(bytes).into_uuid()
	}

	/// Records that the literal instance token `token` stands for `resolved`.
	/// A token may be bound to a single path per invocation.
	pub fn bind_token(&mut self, token: &str, resolved: &Path) -> Result<(), PlanError> {
		match self.tokens.get(token) {
			Some(first) if first != resolved => Err(PlanError::Conflict {
				token: token.to_string(),
				first: first.clone(),
				second: resolved.to_path_buf(),
			}),
			Some(_) => Ok(()),
			None => {
				self.tokens.insert(token.to_string(), resolved.to_path_buf());
				Ok(())
			}
		}
	}

	/// Reserves `dir` for a single job. `root` is where the directory would be created.
	pub fn claim_output(&mut self, dir: &Path, root: &Path, overwrite: bool) -> Result<(), PlanError> {
		if !self.outputs.insert(dir.to_path_buf()) {
			return Err(PlanError::DuplicateOutput { path: dir.to_path_buf() });
		}
		ensure_vacant(dir, root, overwrite)
	}

	/// Counts one more job and asks for confirmation the first time the threshold is crossed.
	pub fn count_job(&mut self) -> Result<(), PlanError> {
		self.jobs += 1;
		let Some(threshold) = self.warn_above else {
			return Ok(());
		};
		if self.jobs <= threshold {
			return Ok(());
		}

		tracing::warn!(jobs = self.jobs, "you already generated {} jobs", self.jobs);
		let proceed = self
			.confirmation
			.confirm(PROCEED_PROMPT)
			.map_err(|source| PlanError::Interaction {
				source,
				prompt: PROCEED_PROMPT.to_string(),
			})?;
		if !proceed {
			return Err(PlanError::Declined { jobs: self.jobs });
		}
		self.warn_above = None;
		Ok(())
	}

	pub fn jobs(&self) -> usize {
		self.jobs
	}
}

/// Fails when `root/dir` already exists and may not be overwritten.
pub fn ensure_vacant(dir: &Path, root: &Path, overwrite: bool) -> Result<(), PlanError> {
	let path = root.join(dir);
	if !overwrite && path.exists() {
		return Err(PlanError::DuplicateOutput { path });
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::prompt::AssumeYes;
	use pretty_assertions::assert_eq;
	use std::{cell::Cell, io::Error};

	struct Scripted {
		answer: bool,
		asked: Cell<usize>,
	}

	impl Confirmation for Scripted {
		fn confirm(&self, _prompt: &str) -> Result<bool, Error> {
			self.asked.set(self.asked.get() + 1);
			Ok(self.answer)
		}
	}

	#[test]
	fn same_seed_same_draws() {
		let mut a = Session::new(Some(7), None, &AssumeYes);
		let mut b = Session::new(Some(7), None, &AssumeYes);
		let drawn_a: Vec<u64> = (0..5).map(|_| a.draw_seed()).collect();
		let drawn_b: Vec<u64> = (0..5).map(|_| b.draw_seed()).collect();
		assert_eq!(drawn_a, drawn_b);
		assert!(drawn_a.iter().all(|&seed| seed <= MAX_SEED));
		assert_eq!(a.scratch_id(), b.scratch_id());
	}

	#[test]
	fn same_token_same_path() {
		let mut session = Session::new(Some(1), None, &AssumeYes);
		session.bind_token("/data/a.txt", Path::new("/data/a.txt")).unwrap();
		session.bind_token("/data/a.txt", Path::new("/data/a.txt")).unwrap();
	}

	#[test]
	fn same_token_different_paths() {
		let mut session = Session::new(Some(1), None, &AssumeYes);
		session.bind_token("a.txt", Path::new("~/set1/a.txt")).unwrap();
		let err = session.bind_token("a.txt", Path::new("~/set2/a.txt")).unwrap_err();
		assert!(matches!(err, PlanError::Conflict { token, .. } if token == "a.txt"));
	}

	#[test]
	fn output_claimed_twice() {
		let root = tempfile::tempdir().unwrap();
		let mut session = Session::new(Some(1), None, &AssumeYes);
		let dir = Path::new("bench/config1/instance1/run1");
		session.claim_output(dir, root.path(), false).unwrap();
		let err = session.claim_output(dir, root.path(), true).unwrap_err();
		assert!(matches!(err, PlanError::DuplicateOutput { .. }));
	}

	#[test]
	fn existing_output_needs_overwrite() {
		let root = tempfile::tempdir().unwrap();
		std::fs::create_dir_all(root.path().join("bench/run1")).unwrap();
		let dir = Path::new("bench/run1");
		assert!(matches!(
			ensure_vacant(dir, root.path(), false),
			Err(PlanError::DuplicateOutput { path }) if path == root.path().join(dir)
		));
		assert!(ensure_vacant(dir, root.path(), true).is_ok());
	}

	#[test]
	fn asks_once_past_threshold() {
		let confirmation = Scripted {
			answer: true,
			asked: Cell::new(0),
		};
		let mut session = Session::new(Some(1), Some(2), &confirmation);
		for _ in 0..5 {
			session.count_job().unwrap();
		}
		assert_eq!(confirmation.asked.get(), 1);
		assert_eq!(session.jobs(), 5);
	}

	#[test]
	fn declining_aborts() {
		let confirmation = Scripted {
			answer: false,
			asked: Cell::new(0),
		};
		let mut session = Session::new(Some(1), Some(1), &confirmation);
		session.count_job().unwrap();
		let err = session.count_job().unwrap_err();
		assert!(matches!(err, PlanError::Declined { jobs: 2 }));
	}
}
